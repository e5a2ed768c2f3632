//! IP Echo - client IP echo and geolocation lookup API
//!
//! This library exposes the core modules for testing and reuse.

pub mod client_ip;
pub mod common;
pub mod config;
pub mod error;
pub mod geo;
pub mod routes;
