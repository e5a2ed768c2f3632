//! Tests for the geolocation client against an in-process fake provider.
//!
//! Run with: cargo test --test geo_client_test

mod common;

use axum::http::StatusCode;
use ip_echo::error::GeoError;
use ip_echo::geo::{GeoCache, GeoClient, GeoRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use common::{
    closed_provider_url, geo_client, spawn_provider, spawn_provider_with_delay,
    spawn_truncating_provider, test_config, FAIL_BODY, SUCCESS_BODY,
};

#[tokio::test]
async fn success_maps_fields_and_populates_cache() {
    let provider = spawn_provider(StatusCode::OK, SUCCESS_BODY).await;
    let client = geo_client(&provider.url);

    let record = assert_ok!(client.lookup("8.8.8.8").await);
    assert_eq!(
        record,
        GeoRecord {
            ip: "8.8.8.8".to_string(),
            city: "Ashburn".to_string(),
            region: "Virginia".to_string(),
            country: "US".to_string(),
            loc: "39.0300,-77.5000".to_string(),
            org: "AS15169 Google LLC".to_string(),
            timezone: "America/New_York".to_string(),
        }
    );

    let cached = client.cache().get("8.8.8.8").await.unwrap();
    assert!(cached.fresh);
    assert_eq!(cached.record, record);
}

#[tokio::test]
async fn requests_only_the_needed_fields() {
    let provider = spawn_provider(StatusCode::OK, SUCCESS_BODY).await;
    let client = geo_client(&provider.url);

    assert_ok!(client.lookup("8.8.8.8").await);

    let query = provider.last_query().unwrap();
    assert!(query.starts_with("fields="));
    for field in ["status", "countryCode", "regionName", "city", "lat", "lon", "timezone", "as", "query"] {
        assert!(
            query.split('=').nth(1).unwrap().split(',').any(|f| f == field),
            "missing field {field} in {query}"
        );
    }
}

#[tokio::test]
async fn fresh_cache_hit_skips_provider() {
    let provider = spawn_provider(StatusCode::OK, SUCCESS_BODY).await;
    let client = geo_client(&provider.url);

    assert_ok!(client.lookup("8.8.8.8").await);
    assert_ok!(client.lookup("8.8.8.8").await);
    assert_ok!(client.lookup("8.8.8.8").await);

    assert_eq!(provider.hits(), 1);
}

#[tokio::test]
async fn stale_entry_is_refetched_and_overwritten() {
    let provider = spawn_provider(StatusCode::OK, SUCCESS_BODY).await;
    let cache = GeoCache::with_ttl(Duration::from_millis(50));
    cache
        .put("8.8.8.8".to_string(), GeoRecord::ip_only("8.8.8.8"))
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let client = GeoClient::new(&test_config(&provider.url), cache).unwrap();

    let record = assert_ok!(client.lookup("8.8.8.8").await);
    assert_eq!(record.city, "Ashburn");
    assert_eq!(provider.hits(), 1);

    let cached = client.cache().get("8.8.8.8").await.unwrap();
    assert!(cached.fresh);
    assert_eq!(cached.record.city, "Ashburn");
}

#[tokio::test]
async fn cache_is_keyed_by_requested_ip_not_echoed_query() {
    let body = SUCCESS_BODY.replace("{ip}", "203.0.113.200");
    let provider = spawn_provider(StatusCode::OK, &body).await;
    let client = geo_client(&provider.url);

    let record = assert_ok!(client.lookup("203.0.113.1").await);
    assert_eq!(record.ip, "203.0.113.1");
    assert!(client.cache().get("203.0.113.1").await.is_some());
    assert!(client.cache().get("203.0.113.200").await.is_none());
}

#[tokio::test]
async fn provider_failure_status_is_not_cached() {
    let provider = spawn_provider(StatusCode::OK, FAIL_BODY).await;
    let client = geo_client(&provider.url);

    let err = assert_err!(client.lookup("10.0.0.1").await);
    match err {
        GeoError::Provider { status, message } => {
            assert_eq!(status, "fail");
            assert_eq!(message, "reserved range");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
    assert!(client.cache().get("10.0.0.1").await.is_none());

    // No negative caching: the next call goes out again
    assert_err!(client.lookup("10.0.0.1").await);
    assert_eq!(provider.hits(), 2);
}

#[tokio::test]
async fn provider_failure_leaves_existing_entry_untouched() {
    let provider = spawn_provider(StatusCode::OK, FAIL_BODY).await;
    let cache = GeoCache::with_ttl(Duration::from_millis(50));
    cache
        .put("10.0.0.1".to_string(), GeoRecord::ip_only("10.0.0.1"))
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let client = GeoClient::new(&test_config(&provider.url), cache).unwrap();

    assert_err!(client.lookup("10.0.0.1").await);

    let entry = client.cache().get("10.0.0.1").await.unwrap();
    assert!(!entry.fresh);
    assert_eq!(entry.record, GeoRecord::ip_only("10.0.0.1"));
}

#[tokio::test]
async fn http_error_status_is_a_provider_error() {
    let provider = spawn_provider(StatusCode::TOO_MANY_REQUESTS, "slow down").await;
    let client = geo_client(&provider.url);

    let err = assert_err!(client.lookup("8.8.8.8").await);
    assert!(matches!(err, GeoError::Provider { ref status, .. } if status.starts_with("429")));
    assert!(client.cache().is_empty().await);
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let provider = spawn_provider(StatusCode::OK, "<html>nope</html>").await;
    let client = geo_client(&provider.url);

    let err = assert_err!(client.lookup("8.8.8.8").await);
    assert!(matches!(err, GeoError::Parse(_)));

    let provider = spawn_provider(StatusCode::OK, r#"{"country":"US"}"#).await;
    let client = geo_client(&provider.url);
    assert!(matches!(client.lookup("8.8.8.8").await, Err(GeoError::Parse(_))));
}

#[tokio::test]
async fn null_geo_fields_become_empty() {
    let provider = spawn_provider(
        StatusCode::OK,
        r#"{"status":"success","countryCode":"UA","city":null,"regionName":null,"lat":50.45,"lon":30.5234,"timezone":null,"as":null,"query":"{ip}"}"#,
    )
    .await;
    let client = geo_client(&provider.url);

    let record = assert_ok!(client.lookup("192.0.2.1").await);
    assert_eq!(record.country, "UA");
    assert_eq!(record.city, "");
    assert_eq!(record.region, "");
    assert_eq!(record.loc, "50.4500,30.5234");
    assert_eq!(record.org, "");
}

#[tokio::test]
async fn unreachable_provider_is_a_network_error() {
    let client = geo_client(&closed_provider_url().await);

    let err = assert_err!(client.lookup("8.8.8.8").await);
    assert!(matches!(err, GeoError::Network(_)));
    assert!(client.cache().is_empty().await);
}

#[tokio::test]
async fn slow_provider_times_out_as_network_error() {
    let provider =
        spawn_provider_with_delay(StatusCode::OK, SUCCESS_BODY, Duration::from_secs(5)).await;
    let config = ip_echo::config::Config {
        geo_timeout_ms: 200,
        ..test_config(&provider.url)
    };
    let client = GeoClient::new(&config, GeoCache::new()).unwrap();

    let err = assert_err!(client.lookup("8.8.8.8").await);
    match err {
        GeoError::Network(e) => assert!(e.is_timeout()),
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn truncated_body_is_a_read_error() {
    let client = geo_client(&spawn_truncating_provider().await);

    let err = assert_err!(client.lookup("8.8.8.8").await);
    assert!(matches!(err, GeoError::Read(_)), "got {err:?}");
}

#[tokio::test]
async fn concurrent_misses_leave_a_single_entry() {
    let provider =
        spawn_provider_with_delay(StatusCode::OK, SUCCESS_BODY, Duration::from_millis(50)).await;
    let client = Arc::new(geo_client(&provider.url));

    let lookups = (0..8).map(|_| {
        let client = client.clone();
        async move { client.lookup("8.8.8.8").await }
    });
    for result in futures::future::join_all(lookups).await {
        assert_ok!(result);
    }

    // No single-flight: several calls may reach the provider, but they all
    // land on the same key.
    assert!(provider.hits() >= 1);
    assert_eq!(client.cache().len().await, 1);
}
