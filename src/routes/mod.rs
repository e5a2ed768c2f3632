pub mod geo;
pub mod health;
pub mod ip;
mod rate_limit;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{any, get},
    BoxError, Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use rate_limit::ClientIpKeyExtractor;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;
use crate::error::{AppError, AppResult};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        ip::client_ip_text,
        ip::ip_details,
        geo::geo_lookup,
    ),
    components(
        schemas(
            ip::IpDetailsResponse,
            crate::geo::GeoRecord,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "ip", description = "Client address echo"),
        (name = "geo", description = "Client address geolocation"),
    ),
    info(
        title = "IP Echo API",
        description = "Client IP echo and geolocation lookup",
        version = "0.1.0"
    )
)]
struct ApiDoc;

/// Build the application router.
///
/// # Errors
///
/// Returns `AppError::Internal` if the rate limiter configuration is rejected.
pub fn build_router(state: AppState) -> AppResult<Router> {
    let config = &state.config;

    // Any path or method not claimed elsewhere echoes the address as text
    let ip_routes = Router::new()
        .route("/", any(ip::client_ip_text))
        .route("/ip", any(ip::ip_details))
        .route("/json", any(geo::geo_lookup))
        .fallback(ip::client_ip_text);

    let ip_routes = if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
        ip_routes
    } else {
        tracing::info!(
            period_secs = config.rate_limit_period_seconds,
            burst = config.rate_limit_burst,
            "Rate limiting configured"
        );

        let limiter = GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor)
            .per_second(config.rate_limit_period_seconds)
            .burst_size(config.rate_limit_burst)
            .finish()
            .ok_or_else(|| {
                AppError::Internal("Invalid rate limiter configuration".to_string())
            })?;

        ip_routes.layer(GovernorLayer {
            config: Arc::new(limiter),
        })
    }
    .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1MB body limit

    // Health check routes (NO rate limiting)
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Ok(Router::new()
        .merge(ip_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(config.request_timeout())),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Turn a request that outlived `REQUEST_TIMEOUT_MS` into a 408.
async fn handle_timeout_error(err: BoxError) -> (StatusCode, Json<serde_json::Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "request timed out" })),
        )
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error" })),
        )
    }
}
