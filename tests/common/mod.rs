//! Shared test fixtures: an in-process stand-in for the geolocation provider.

#![allow(dead_code)]

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use ip_echo::config::Config;
use ip_echo::geo::{GeoCache, GeoClient};

pub const SUCCESS_BODY: &str = r#"{
    "status": "success",
    "country": "United States",
    "countryCode": "US",
    "region": "VA",
    "regionName": "Virginia",
    "city": "Ashburn",
    "lat": 39.03,
    "lon": -77.5,
    "timezone": "America/New_York",
    "isp": "Google LLC",
    "org": "Google Public DNS",
    "as": "AS15169 Google LLC",
    "query": "{ip}"
}"#;

pub const FAIL_BODY: &str = r#"{"status":"fail","message":"reserved range","query":"{ip}"}"#;

#[derive(Clone)]
struct ProviderState {
    hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<String>>>,
    status: StatusCode,
    body: String,
    delay: Duration,
}

/// Running fake provider. `url` is the base URL to put in `Config`.
pub struct FakeProvider {
    pub url: String,
    hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<String>>>,
}

impl FakeProvider {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().unwrap().clone()
    }
}

async fn lookup(
    State(state): State<ProviderState>,
    Path(ip): Path<String>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_query.lock().unwrap() = query;
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.replace("{ip}", &ip),
    )
}

/// Serve `body` (with `{ip}` substituted) from `/json/{ip}`.
pub async fn spawn_provider(status: StatusCode, body: &str) -> FakeProvider {
    spawn_provider_with_delay(status, body, Duration::ZERO).await
}

pub async fn spawn_provider_with_delay(
    status: StatusCode,
    body: &str,
    delay: Duration,
) -> FakeProvider {
    let hits = Arc::new(AtomicUsize::new(0));
    let last_query = Arc::new(Mutex::new(None));
    let state = ProviderState {
        hits: hits.clone(),
        last_query: last_query.clone(),
        status,
        body: body.to_string(),
        delay,
    };

    let app = Router::new()
        .route("/json/{ip}", get(lookup))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeProvider {
        url: format!("http://{addr}"),
        hits,
        last_query,
    }
}

/// Provider that promises a longer body than it sends, then hangs up.
pub async fn spawn_truncating_provider() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 500\r\n\r\n{\"status\":",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{addr}")
}

/// Base URL of a port that nothing listens on.
pub async fn closed_provider_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn test_config(provider_url: &str) -> Config {
    Config {
        geo_provider_url: provider_url.to_string(),
        disable_rate_limiting: true,
        ..Config::default()
    }
}

pub fn geo_client(provider_url: &str) -> GeoClient {
    GeoClient::new(&test_config(provider_url), GeoCache::new()).unwrap()
}
