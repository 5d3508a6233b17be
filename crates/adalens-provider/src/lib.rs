//! # adalens Provider
//!
//! HTTP gateway to Blockfrost-compatible blockchain indexing APIs.
//!
//! The gateway is thin: an endpoint path plus named query
//! parameters go in, parsed JSON comes out, and every non-success outcome is
//! reported through [`ProviderError`]. It never retries; the transport
//! deadline is whatever the caller configured in [`HttpClientConfig`].
//!
//! ## Features
//!
//! - Connection pooling with configurable limits
//! - Static API-key header on every request
//! - Absent query parameters omitted from the query string
//! - Optional client-side request rate cap
//!
//! ## Example
//!
//! ```ignore
//! use adalens_provider::{Gateway, GatewayConfig, QueryParams};
//!
//! let config = GatewayConfig::new("https://cardano-preview.blockfrost.io/api/v0", "previewKey")
//!     .with_request_timeout(30);
//!
//! let gateway = Gateway::new(config)?;
//! let params = QueryParams::new().with("count", 100).with("page", 1);
//! let utxos = gateway.request("/addresses/addr_test1.../utxos", &params).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Header Blockfrost expects the project key in
pub const DEFAULT_API_KEY_HEADER: &str = "project_id";

/// Gateway errors
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid gateway configuration
    #[error("Invalid gateway configuration: {0}")]
    InvalidConfig(String),

    /// No response was received (connect failure, timeout, broken body)
    #[error("Network error: {0}")]
    Network(String),

    /// The remote API answered with a non-success status
    #[error("Remote API error: status={status_code}, message={message}")]
    RemoteApi {
        /// HTTP status code
        status_code: u16,
        /// Server-supplied message, or the status text
        message: String,
    },

    /// A success response whose body is not the expected JSON
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Returns the HTTP status code for remote API errors
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::RemoteApi { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// True if the remote API reported the requested object as missing
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, ProviderError>;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,
    /// Idle connection timeout
    pub pool_idle_timeout_secs: u64,
    /// Connection timeout
    pub connect_timeout_secs: u64,
    /// Request timeout
    pub request_timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
    /// Enable gzip compression
    pub gzip: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 10,
            pool_idle_timeout_secs: 90,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            user_agent: format!("adalens/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
        }
    }
}

/// Client-side request rate cap.
///
/// This only spaces requests out before they are sent; a rejected request is
/// never retried by the gateway.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per second
    pub requests_per_second: u32,
    /// Burst size (max requests in a burst)
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 20,
        }
    }
}

impl RateLimitConfig {
    fn quota(&self) -> Result<Quota> {
        let per_second = NonZeroU32::new(self.requests_per_second).ok_or_else(|| {
            ProviderError::InvalidConfig("requests_per_second must be non-zero".to_string())
        })?;
        let burst = NonZeroU32::new(self.burst_size)
            .ok_or_else(|| ProviderError::InvalidConfig("burst_size must be non-zero".to_string()))?;
        Ok(Quota::per_second(per_second).allow_burst(burst))
    }
}

/// Configuration for a [`Gateway`]
#[derive(Clone)]
pub struct GatewayConfig {
    /// API root, e.g. `https://cardano-mainnet.blockfrost.io/api/v0`
    pub base_url: String,
    /// Static API key sent with every request
    pub api_key: String,
    /// Header carrying the API key
    pub api_key_header: String,
    /// HTTP client settings
    pub http: HttpClientConfig,
    /// Optional client-side rate cap
    pub rate_limit: Option<RateLimitConfig>,
}

impl GatewayConfig {
    /// Creates a new gateway configuration
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            http: HttpClientConfig::default(),
            rate_limit: None,
        }
    }

    /// Sets the header name carrying the API key
    pub fn with_api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    /// Replaces the HTTP client settings
    pub fn with_http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    /// Sets the request timeout
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.http.request_timeout_secs = secs;
        self
    }

    /// Enables the client-side rate cap
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(ProviderError::InvalidUrl(format!(
                "{} cannot be used as an API root",
                self.base_url
            )));
        }
        HeaderName::from_bytes(self.api_key_header.as_bytes())
            .map_err(|e| ProviderError::InvalidConfig(format!("api key header: {e}")))?;
        HeaderValue::from_str(&self.api_key)
            .map_err(|e| ProviderError::InvalidConfig(format!("api key: {e}")))?;
        if let Some(rate_limit) = &self.rate_limit {
            rate_limit.quota()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key_header", &self.api_key_header)
            .field("http", &self.http)
            .field("rate_limit", &self.rate_limit)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Query parameters
// ============================================================================

/// Ordered set of named query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    /// Appends a parameter only when a value is present
    pub fn with_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// True if no parameter is set
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the value of the first parameter named `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the parameters in insertion order
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Renders the parameters as an urlencoded query string (no leading `?`)
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

// ============================================================================
// Gateway
// ============================================================================

/// HTTP gateway to the indexing API
pub struct Gateway {
    client: Client,
    base_url: String,
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    request_count: AtomicU64,
}

impl Gateway {
    /// Creates a new gateway
    pub fn new(config: GatewayConfig) -> Result<Self> {
        config.validate()?;

        let header = HeaderName::from_bytes(config.api_key_header.as_bytes())
            .map_err(|e| ProviderError::InvalidConfig(e.to_string()))?;
        let mut key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| ProviderError::InvalidConfig(e.to_string()))?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(header, key);

        let http = &config.http;
        let client = Client::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(http.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(http.pool_idle_timeout_secs))
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .timeout(Duration::from_secs(http.request_timeout_secs))
            .user_agent(&http.user_agent)
            .gzip(http.gzip)
            .build()
            .map_err(|e| ProviderError::InvalidConfig(e.to_string()))?;

        let rate_limiter = match &config.rate_limit {
            Some(rate_limit) => Some(RateLimiter::direct(rate_limit.quota()?)),
            None => None,
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter,
            request_count: AtomicU64::new(0),
        })
    }

    /// Returns the API root this gateway talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the number of requests sent so far
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Performs a GET request and returns the parsed JSON body
    pub async fn request(&self, endpoint: &str, params: &QueryParams) -> Result<Value> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.url_for(endpoint);
        let mut request = self.client.get(&url);
        if !params.is_empty() {
            request = request.query(params.pairs());
        }

        self.request_count.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();
        tracing::debug!(endpoint, query = %params.to_query_string(), "gateway request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(endpoint, error = %e, "gateway request failed without a response");
            ProviderError::Network(e.to_string())
        })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if !status.is_success() {
            // An unparseable error body must not hide the status code.
            let data: Value =
                serde_json::from_slice(&body).unwrap_or_else(|_| Value::Object(Default::default()));
            let message = remote_error_message(&data).unwrap_or_else(|| status_text(status));
            tracing::warn!(
                endpoint,
                status = status.as_u16(),
                elapsed_ms,
                message = %message,
                "remote API returned an error"
            );
            return Err(ProviderError::RemoteApi {
                status_code: status.as_u16(),
                message,
            });
        }

        tracing::debug!(endpoint, status = status.as_u16(), elapsed_ms, "gateway response");
        serde_json::from_slice(&body)
            .map_err(|e| ProviderError::MalformedResponse(format!("{endpoint}: {e}")))
    }

    /// Performs a GET request and deserializes the body into `T`
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &QueryParams) -> Result<T> {
        let value = self.request(endpoint, params).await?;
        serde_json::from_value(value)
            .map_err(|e| ProviderError::MalformedResponse(format!("{endpoint}: {e}")))
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.base_url)
            .field("request_count", &self.request_count())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish()
    }
}

/// Picks the most specific message out of an error body.
fn remote_error_message(body: &Value) -> Option<String> {
    let message = body.get("message").and_then(Value::as_str).or_else(|| match body.get("error") {
        Some(Value::Object(error)) => error.get("message").and_then(Value::as_str),
        Some(Value::String(error)) => Some(error.as_str()),
        _ => None,
    })?;
    if message.trim().is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
