//! HTTP client for the meeting recorder REST API.
//!
//! Handles bearer authentication, timeout management, exponential backoff
//! retry for idempotent requests, and mapping of error responses.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use mr_core::config::{AppConfig, ServerConfig};
use mr_core::error::{MrError, MrResult};

use crate::response::error_detail;

/// Retry configuration for HTTP requests.
///
/// Only GET requests are retried; starting or stopping a recording twice
/// is not harmless.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Base delay between retries (doubles each attempt).
    pub base_delay: Duration,
    /// Maximum delay cap.
    pub max_delay: Duration,
    /// HTTP status codes that trigger a retry.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(4),
            retryable_statuses: vec![502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// HTTP client for communicating with the recorder backend.
///
/// Wraps reqwest::Client with bearer authentication, retry logic, and
/// error handling. Clones share the same token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Client,
    /// Base URL the `/api/...` paths are appended to.
    base_url: String,
    /// Default request timeout.
    timeout: Duration,
    /// Bearer token sent with every request once logged in.
    token: Arc<RwLock<Option<String>>>,
    /// Retry configuration.
    retry_config: RetryConfig,
}

impl ApiClient {
    /// Create a new ApiClient from server configuration.
    pub fn new(config: &ServerConfig) -> MrResult<Self> {
        let base_url = resolve_api_base(Some(&config.api_base_url), &config.origin)?;
        let timeout = Duration::from_millis(config.api_timeout_ms);

        let inner = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| MrError::Http(format!("failed to build HTTP client: {e}")))?;

        debug!("api base url: {base_url}");

        Ok(Self {
            inner,
            base_url,
            timeout,
            token: Arc::new(RwLock::new(None)),
            retry_config: RetryConfig::default(),
        })
    }

    /// Set custom retry configuration.
    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Start out authenticated with a stored token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Arc::new(RwLock::new(Some(token.into())));
        self
    }

    /// Get the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace (or with `None`, forget) the bearer token.
    pub async fn set_token(&self, token: Option<String>) {
        let mut guard = self.token.write().await;
        *guard = token;
        if guard.is_some() {
            debug!("bearer token set");
        } else {
            debug!("bearer token cleared");
        }
    }

    /// Whether a bearer token is currently held.
    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Internal: build a request for the given method, URL, and optional JSON body.
    async fn build_request(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> RequestBuilder {
        let mut builder = self.inner.request(method, url).timeout(self.timeout);
        if let Some(token) = self.token.read().await.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(b) = body {
            builder = builder.json(b);
        }
        builder
    }

    /// Execute a request, retrying GETs with exponential backoff.
    async fn request_with_retry(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> MrResult<Response> {
        let url = self.url(path);
        debug!("{} {}", method, path);

        let max_retries = if method == Method::GET {
            self.retry_config.max_retries
        } else {
            0
        };
        let mut last_error: Option<MrError> = None;

        for attempt in 0..=max_retries {
            if attempt > 0 {
                let delay = self.calculate_retry_delay(attempt - 1);
                warn!(
                    "retrying {} {} (attempt {}/{}) after {:.1}s",
                    method,
                    path,
                    attempt + 1,
                    max_retries + 1,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }

            let builder = self.build_request(method.clone(), &url, body).await;

            match builder.send().await {
                Ok(response) => {
                    let status = response.status();

                    if self
                        .retry_config
                        .retryable_statuses
                        .contains(&status.as_u16())
                        && attempt < max_retries
                    {
                        warn!("retryable status {} from {}", status.as_u16(), path);
                        last_error = Some(MrError::ServerError {
                            status: status.as_u16(),
                            message: format!("retryable status {status}"),
                        });
                        continue;
                    }

                    let checked = Self::check_status(response).await;
                    if let Err(MrError::AuthFailed(_)) = &checked {
                        // the server no longer accepts this token
                        self.set_token(None).await;
                    }
                    return checked;
                }
                Err(e) => {
                    let is_retryable = e.is_timeout() || e.is_connect();
                    let err = Self::classify_error(e);

                    if is_retryable && attempt < max_retries {
                        warn!("retryable error on {}: {}", path, err);
                        last_error = Some(err);
                        continue;
                    }

                    return Err(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| MrError::Http("max retries exceeded".into())))
    }

    /// Calculate retry delay with exponential backoff.
    fn calculate_retry_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.retry_config.base_delay.as_millis() as u64;
        let delay_ms = base_ms.saturating_mul(1u64 << attempt.min(32));
        let max_ms = self.retry_config.max_delay.as_millis() as u64;
        Duration::from_millis(delay_ms.min(max_ms))
    }

    // --- Public HTTP methods ---

    /// Execute a GET request with automatic retry.
    pub async fn get(&self, path: &str) -> MrResult<Response> {
        self.request_with_retry(Method::GET, path, None).await
    }

    /// Execute a POST request with a JSON body. Never retried.
    pub async fn post(&self, path: &str, body: &serde_json::Value) -> MrResult<Response> {
        self.request_with_retry(Method::POST, path, Some(body)).await
    }

    // --- Response helpers ---

    /// Deserialize a response body.
    pub async fn parse_response<T: DeserializeOwned>(response: Response) -> MrResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| MrError::Serialization(format!("failed to parse response: {e}")))
    }

    /// Convenience: GET + parse.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> MrResult<T> {
        let resp = self.get(path).await?;
        Self::parse_response(resp).await
    }

    /// Convenience: POST a serializable body + parse.
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> MrResult<T> {
        let body = serde_json::to_value(body)?;
        let resp = self.post(path, &body).await?;
        Self::parse_response(resp).await
    }

    /// Check the HTTP status code and convert to MrError if needed.
    async fn check_status(response: Response) -> MrResult<Response> {
        let status = response.status();
        if !status.is_client_error() && !status.is_server_error() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(&body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("no response body")
                    .to_string()
            } else {
                body.clone()
            }
        });

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MrError::AuthFailed(detail));
        }

        if status.is_server_error() {
            return Err(MrError::ServerError {
                status: status.as_u16(),
                message: detail,
            });
        }

        Err(MrError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    /// Classify a reqwest error into an MrError variant.
    fn classify_error(e: reqwest::Error) -> MrError {
        if e.is_timeout() {
            MrError::Timeout(e.to_string())
        } else if e.is_connect() {
            MrError::Http(format!("connection failed: {e}"))
        } else {
            MrError::Http(e.to_string())
        }
    }
}

/// Resolve the REST base URL.
///
/// A non-empty `explicit` base is used as given, minus a trailing slash.
/// Otherwise the base is the origin (scheme, host and port) of `origin`.
pub fn resolve_api_base(explicit: Option<&str>, origin: &str) -> MrResult<String> {
    if let Some(explicit) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        let explicit = explicit.trim_end_matches('/');
        Url::parse(explicit)?;
        return Ok(explicit.to_string());
    }

    let origin = AppConfig::sanitize_address(origin);
    if origin.is_empty() {
        return Err(MrError::MissingConfig("server origin".into()));
    }
    derive_origin(&origin)
}

/// Derive the origin (scheme + host + optional port) from a server address.
fn derive_origin(address: &str) -> MrResult<String> {
    let url = Url::parse(address)?;
    let host = url
        .host_str()
        .ok_or_else(|| MrError::InvalidAddress(format!("{address} has no host")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(MrError::InvalidAddress(format!(
            "unsupported scheme {} in {address}",
            url.scheme()
        )));
    }

    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}
