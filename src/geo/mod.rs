pub mod cache;
pub mod client;
pub mod models;

pub use cache::{CacheLookup, GeoCache};
pub use client::GeoClient;
pub use models::GeoRecord;
