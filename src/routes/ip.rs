use axum::{
    http::{
        header::{self, HeaderMap, HeaderValue},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::client_ip::AddressCandidates;

#[derive(Debug, Serialize, ToSchema)]
pub struct IpDetailsResponse {
    /// Best IPv4 candidate (empty if none)
    pub ipv4: String,
    /// Best IPv6 candidate (empty if none)
    pub ipv6: String,
    /// Raw `X-Forwarded-For` header
    pub x_forwarded_for: String,
    /// Normalized TCP peer address
    pub remote_addr: String,
    /// `User-Agent` header
    pub ua: String,
}

/// Client address as plain text
///
/// IPv6 is returned when both families are known.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Client address followed by a newline", body = String, content_type = "text/plain"),
        (status = 204, description = "No client address could be determined"),
    ),
    tag = "ip"
)]
pub async fn client_ip_text(candidates: AddressCandidates) -> Response {
    match candidates.preferred() {
        Some(ip) => (
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )],
            format!("{ip}\n"),
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Every address candidate seen for this request
#[utoipa::path(
    get,
    path = "/ip",
    responses(
        (status = 200, description = "Address candidates and user agent", body = IpDetailsResponse),
    ),
    tag = "ip"
)]
pub async fn ip_details(headers: HeaderMap, candidates: AddressCandidates) -> Json<IpDetailsResponse> {
    let ua = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    Json(IpDetailsResponse {
        ipv4: candidates.ipv4,
        ipv6: candidates.ipv6,
        x_forwarded_for: candidates.forwarded_for,
        remote_addr: candidates.remote_peer,
        ua,
    })
}
