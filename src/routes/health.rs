use axum::http::StatusCode;

/// Health check endpoint
///
/// Always 200 while the process is serving. Never rate-limited and never
/// touches the geolocation provider.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "health"
)]
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
