use reqwest::Client;

use crate::config::Config;
use crate::error::{AppError, AppResult, GeoError};
use crate::geo::cache::GeoCache;
use crate::geo::models::{GeoRecord, IpApiResponse, PROVIDER_FIELDS};

/// Client for the ip-api.com compatible geolocation provider, fronted by a
/// [`GeoCache`].
pub struct GeoClient {
    http_client: Client,
    base_url: String,
    cache: GeoCache,
}

impl GeoClient {
    /// Build a client whose requests are bounded by `config.geo_timeout()`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the HTTP client cannot be constructed.
    pub fn new(config: &Config, cache: GeoCache) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(config.geo_timeout())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.geo_provider_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    #[must_use]
    pub fn cache(&self) -> &GeoCache {
        &self.cache
    }

    /// Geolocate `ip`, serving from the cache while the entry is fresh.
    ///
    /// On a miss (or a stale entry) a single request goes to the provider.
    /// The request runs outside the cache lock, so concurrent misses for the
    /// same address each reach the provider and the last one to finish wins.
    /// Only successful lookups are cached.
    ///
    /// # Errors
    ///
    /// - `GeoError::Network` if the request fails or times out
    /// - `GeoError::Read` if the body cannot be read
    /// - `GeoError::Parse` if the body is not the expected JSON
    /// - `GeoError::Provider` if the provider reports anything but success
    pub async fn lookup(&self, ip: &str) -> Result<GeoRecord, GeoError> {
        if let Some(cached) = self.cache.get(ip).await {
            if cached.fresh {
                tracing::debug!(ip = %ip, "geo_cache_hit");
                return Ok(cached.record);
            }
            tracing::debug!(ip = %ip, "geo_cache_stale");
        }

        let record = self.fetch(ip).await?;

        self.cache.put(ip.to_string(), record.clone()).await;
        tracing::debug!(ip = %ip, "geo_cache_stored");

        Ok(record)
    }

    async fn fetch(&self, ip: &str) -> Result<GeoRecord, GeoError> {
        let url = format!("{}/json/{}?fields={}", self.base_url, ip, PROVIDER_FIELDS);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(GeoError::Network)?;

        let status = response.status();

        let body = response.bytes().await.map_err(GeoError::Read)?;

        if !status.is_success() {
            return Err(GeoError::Provider {
                status: status.to_string(),
                message: String::from_utf8_lossy(&body).chars().take(200).collect(),
            });
        }

        let raw: IpApiResponse = serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body_preview = %String::from_utf8_lossy(&body).chars().take(500).collect::<String>(),
                "Failed to parse geo provider response"
            );
            GeoError::Parse(e)
        })?;

        if !raw.is_success() {
            return Err(GeoError::Provider {
                status: raw.status,
                message: raw.message,
            });
        }

        Ok(raw.into_record(ip))
    }
}
