use axum::{
    extract::{connect_info::MockConnectInfo, ConnectInfo, FromRequestParts},
    http::{request::Parts, Extensions, HeaderMap},
};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use super::normalize::{classify, normalize, split_host_port};

/// Real client address injected by Cloudflare (or by a proxy via `header_up`).
pub const CF_CONNECTING_IP: &str = "cf-connecting-ip";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Candidate client addresses gathered from one request.
///
/// `ipv4` and `ipv6` are either empty or a canonical address of that family.
/// Both can be set at once when the headers carry one of each.
/// `forwarded_for` and `remote_peer` are diagnostic only.
///
/// Forwarding headers are trusted as sent; no proxy chain validation happens
/// here, so anything taken from them can be spoofed by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressCandidates {
    pub ipv4: String,
    pub ipv6: String,
    /// Raw `X-Forwarded-For` value, exactly as received.
    pub forwarded_for: String,
    /// Normalized host of the transport peer.
    pub remote_peer: String,
}

impl AddressCandidates {
    /// Collect candidates from request headers and the transport peer address.
    ///
    /// Priority: `CF-Connecting-IP`, then every `X-Forwarded-For` entry from
    /// left to right (only while a family slot is still empty), then the peer
    /// address (only if both slots are still empty). Malformed tokens are
    /// skipped. Header values that are not valid UTF-8 count as absent.
    #[must_use]
    pub fn extract(headers: &HeaderMap, peer: Option<&str>) -> Self {
        let mut candidates = Self {
            forwarded_for: header_str(headers, X_FORWARDED_FOR)
                .unwrap_or_default()
                .to_string(),
            ..Self::default()
        };

        if let Some(ip) = header_str(headers, CF_CONNECTING_IP).and_then(classify) {
            candidates.fill(ip);
        }

        if !candidates.forwarded_for.is_empty() && !candidates.is_complete() {
            let chain = candidates.forwarded_for.clone();
            for ip in chain.split(',').filter_map(classify) {
                candidates.fill(ip);
                if candidates.is_complete() {
                    break;
                }
            }
        }

        if let Some((host, _port)) = peer.and_then(split_host_port) {
            candidates.remote_peer = normalize(host);
            if candidates.ipv4.is_empty() && candidates.ipv6.is_empty() {
                if let Some(ip) = classify(&candidates.remote_peer) {
                    candidates.fill(ip);
                }
            }
        }

        candidates
    }

    /// The single address to report for this client, IPv6 first.
    ///
    /// Preferring IPv6 is a policy choice for when both families are present;
    /// it gives no protection against spoofed forwarding headers.
    #[must_use]
    pub fn preferred(&self) -> Option<&str> {
        [&self.ipv6, &self.ipv4]
            .into_iter()
            .find(|ip| !ip.is_empty())
            .map(String::as_str)
    }

    fn fill(&mut self, ip: IpAddr) {
        let slot = match ip {
            IpAddr::V4(_) => &mut self.ipv4,
            IpAddr::V6(_) => &mut self.ipv6,
        };
        if slot.is_empty() {
            *slot = ip.to_string();
        }
    }

    fn is_complete(&self) -> bool {
        !self.ipv4.is_empty() && !self.ipv6.is_empty()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Peer address of the connection, if the server was started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
///
/// Falls back to `MockConnectInfo`, the same way axum's `ConnectInfo`
/// extractor does.
pub fn peer_address(extensions: &Extensions) -> Option<String> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr)
        .or_else(|| {
            extensions
                .get::<MockConnectInfo<SocketAddr>>()
                .map(|MockConnectInfo(addr)| addr)
        })
        .map(ToString::to_string)
}

impl<S> FromRequestParts<S> for AddressCandidates
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = peer_address(&parts.extensions);
        Ok(Self::extract(&parts.headers, peer.as_deref()))
    }
}
