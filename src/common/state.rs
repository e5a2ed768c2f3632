use std::sync::Arc;

use crate::config::Config;
use crate::geo::GeoClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub geo_client: Arc<GeoClient>,
}

impl AppState {
    pub fn new(config: Config, geo_client: GeoClient) -> Self {
        Self {
            config: Arc::new(config),
            geo_client: Arc::new(geo_client),
        }
    }
}
