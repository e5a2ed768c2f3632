use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Status value the provider uses for a successful lookup.
pub const PROVIDER_SUCCESS: &str = "success";

/// Fields requested from the provider. Anything else is left out of the payload.
pub const PROVIDER_FIELDS: &str =
    "status,message,country,countryCode,region,regionName,city,lat,lon,timezone,isp,org,as,query";

/// Geolocation record returned by `/json`, in the ipinfo.io response shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoRecord {
    pub ip: String,
    pub city: String,
    pub region: String,
    /// ISO 3166-1 alpha-2 country code
    pub country: String,
    /// `"lat,lon"` with four decimal places
    pub loc: String,
    /// Autonomous system, e.g. `"AS15169 Google LLC"`
    pub org: String,
    pub timezone: String,
}

impl GeoRecord {
    /// Record carrying only the address, served when enrichment fails.
    #[must_use]
    pub fn ip_only(ip: &str) -> Self {
        Self {
            ip: ip.to_string(),
            ..Self::default()
        }
    }
}

/// Response from the provider's `/json/{ip}` endpoint.
///
/// Only `status` is required; failed lookups carry just `status`,
/// `message` and `query`. Optional fields that are missing or `null` take
/// their zero value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpApiResponse {
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lat: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lon: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timezone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub isp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub org: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "as")]
    pub as_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub query: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl IpApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == PROVIDER_SUCCESS
    }

    /// Map onto the service's own record, keyed by the address that was
    /// looked up rather than the provider's echoed `query`.
    #[must_use]
    pub fn into_record(self, ip: &str) -> GeoRecord {
        GeoRecord {
            ip: ip.to_string(),
            city: self.city,
            region: self.region_name,
            country: self.country_code,
            loc: format!("{:.4},{:.4}", self.lat, self.lon),
            org: self.as_name,
            timezone: self.timezone,
        }
    }
}
