//! Client address resolution.
//!
//! Candidates come from `CF-Connecting-IP`, `X-Forwarded-For` and the TCP
//! peer, in that order, after each raw token has been normalized.

mod candidates;
mod normalize;

pub use candidates::{peer_address, AddressCandidates, CF_CONNECTING_IP, X_FORWARDED_FOR};
pub use normalize::{classify, normalize};
