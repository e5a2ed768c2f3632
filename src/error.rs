use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures of a single outbound geolocation lookup.
///
/// None of these reach the client as an HTTP error; the `/json` handler
/// degrades to an IP-only record and logs the error instead.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Geo lookup request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Geo lookup body could not be read: {0}")]
    Read(#[source] reqwest::Error),

    #[error("Geo lookup response could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Geo provider rejected lookup: status={status} message={message}")]
    Provider { status: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("could not determine client IP")]
    AddressUndeterminable,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::AddressUndeterminable => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
