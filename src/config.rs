use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }

    /// Shared deployments log JSON lines for the log collector; local and
    /// dev keep the human-readable format.
    #[must_use]
    pub fn json_logs(&self) -> bool {
        matches!(self, Self::Stage | Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // API settings
    pub api_host: String,
    pub api_port: u16,
    pub request_timeout_ms: u64,

    // Geolocation provider
    pub geo_provider_url: String,
    pub geo_timeout_ms: u64,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_period_seconds: u64,
    pub rate_limit_burst: u32,

    // Application metadata
    pub deployment: Deployment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            request_timeout_ms: 10_000,
            geo_provider_url: "http://ip-api.com".to_string(),
            geo_timeout_ms: 3000,
            disable_rate_limiting: false,
            rate_limit_period_seconds: 1,
            rate_limit_burst: 30,
            deployment: Deployment::Local,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default. Only `PORT` is strict: a value that is set
    /// but is not a valid port number aborts startup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `PORT` cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_port = match env::var("PORT") {
            Ok(raw) if !raw.trim().is_empty() => {
                raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    var: "PORT",
                    value: raw.clone(),
                })?
            }
            _ => defaults.api_port,
        };

        Ok(Self {
            // API settings
            api_host: env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port,
            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),

            // Geolocation provider
            geo_provider_url: env::var("GEO_PROVIDER_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.geo_provider_url),
            geo_timeout_ms: env::var("GEO_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.geo_timeout_ms),

            // Rate limiting
            disable_rate_limiting: env::var("DISABLE_RATE_LIMITING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.disable_rate_limiting),
            rate_limit_period_seconds: env::var("RATE_LIMIT_PERIOD_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_period_seconds),
            rate_limit_burst: env::var("RATE_LIMIT_BURST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_burst),

            // Application metadata
            deployment: Deployment::from_str(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub fn geo_timeout(&self) -> Duration {
        Duration::from_millis(self.geo_timeout_ms)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}
