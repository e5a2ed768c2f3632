use axum::http::Request;
use std::net::{IpAddr, Ipv4Addr};
use tower_governor::{key_extractor::KeyExtractor, GovernorError};

use crate::client_ip::{peer_address, AddressCandidates};

/// Rate-limit key: the same client address the handlers report.
///
/// Requests with no determinable address share the `127.0.0.1` bucket, which
/// keeps limiting in effect behind proxies that strip everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let peer = peer_address(req.extensions());
        let candidates = AddressCandidates::extract(req.headers(), peer.as_deref());

        Ok(candidates
            .preferred()
            .and_then(|ip| ip.parse().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)))
    }
}
