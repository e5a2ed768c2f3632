use axum::{extract::State, Json};

use crate::client_ip::AddressCandidates;
use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::geo::GeoRecord;

/// Geolocation of the client address (ipinfo.io response shape)
///
/// Provider failures are logged and answered with a record that carries
/// only `ip`; they never turn into an error status.
#[utoipa::path(
    get,
    path = "/json",
    responses(
        (status = 200, description = "Geolocation record, possibly with empty geo fields", body = GeoRecord),
        (status = 400, description = "No client address could be determined"),
    ),
    tag = "geo"
)]
pub async fn geo_lookup(
    State(state): State<AppState>,
    candidates: AddressCandidates,
) -> AppResult<Json<GeoRecord>> {
    let ip = candidates.preferred().ok_or(AppError::AddressUndeterminable)?;

    match state.geo_client.lookup(ip).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            tracing::warn!(ip = %ip, error = %e, "Geo lookup failed, serving address only");
            Ok(Json(GeoRecord::ip_only(ip)))
        }
    }
}
