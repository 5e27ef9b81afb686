//! Shared test utilities for integration tests.
#![allow(dead_code)]

use std::time::Duration;

use httpmock::MockServer;

use mr_api::{ApiClient, RetryConfig};
use mr_core::config::ServerConfig;

/// Client pointed at `server` with the given retry settings.
pub fn client_with_retries(server: &MockServer, retry: RetryConfig) -> ApiClient {
    let config = ServerConfig {
        origin: server.base_url(),
        ..ServerConfig::default()
    };
    ApiClient::new(&config).unwrap().with_retry_config(retry)
}

/// Client pointed at `server` with fast retries.
pub fn client_for(server: &MockServer) -> ApiClient {
    client_with_retries(server, fast_retries())
}

pub fn fast_retries() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(20),
        ..RetryConfig::default()
    }
}

/// Retries slow enough for a test to swap mocks between attempts.
pub fn slow_retries() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        base_delay: Duration::from_millis(300),
        max_delay: Duration::from_millis(300),
        ..RetryConfig::default()
    }
}

pub fn idle_status() -> serde_json::Value {
    serde_json::json!({
        "recording": false,
        "zoom_status": "未検出",
        "meeting_active": false,
        "meeting_title": null,
        "start_time": null,
        "duration": 0
    })
}
