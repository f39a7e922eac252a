//! Authenticated transport for the management API
//!
//! A single [`HttpClient`] is shared by every resource handler. Each attempt
//! waits on the rate limiter, attaches the current bearer token and sorts the
//! response into an [`Outcome`]; [`HttpClient::send`] turns outcomes into
//! retries, one token refresh, or a final result.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::TokenStore;
use crate::config::DEFAULT_HOST;
use crate::error::{Error, Result};
use crate::types::BackoffType;
use rand::Rng;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

// ============================================================================
// Retry policy
// ============================================================================

/// Backoff schedule for transient failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Ceiling for any single delay, including server `retry-after` hints
    pub max_delay: Duration,
    /// How the delay grows between attempts
    pub backoff: BackoffType,
    /// Add up to 50% random jitter on top of each delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff: BackoffType::Exponential,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Same delay between every attempt, no jitter
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay: delay,
            max_delay: delay,
            backoff: BackoffType::Constant,
            jitter: false,
        }
    }

    /// Delay before retry number `attempt` (zero-based), without jitter
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            BackoffType::Constant => self.initial_delay,
            BackoffType::Linear => self.initial_delay.saturating_mul(attempt + 1),
            BackoffType::Exponential => self
                .initial_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max_delay)
    }

    /// Delay actually slept before retry number `attempt`
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        if !self.jitter {
            return base;
        }
        let spread = base.as_millis() as u64 / 2;
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..=spread));
        (base + jitter).min(self.max_delay)
    }
}

// ============================================================================
// Client configuration
// ============================================================================

/// Transport settings
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// API host every request path is joined onto
    pub base_url: String,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Retry schedule for transient failures
    pub retry: RetryPolicy,
    /// Client-side throttle, `None` to disable
    pub rate_limit: Option<RateLimiterConfig>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_HOST.to_string(),
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
            rate_limit: Some(RateLimiterConfig::default()),
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for [`HttpClientConfig`]
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the API host
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Replace the retry schedule
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Keep the schedule, change only the retry count
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.retry.max_retries = retries;
        self
    }

    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

// ============================================================================
// Requests
// ============================================================================

/// One API call: method, path relative to the host, query and JSON body
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Sent in insertion order
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).json(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).json(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Whether repeating the call after an answered failure is safe.
    /// A POST that reached the server may already have created something.
    pub fn is_idempotent(&self) -> bool {
        matches!(self.method, Method::GET | Method::PUT | Method::DELETE)
    }
}

impl std::fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Result of a single attempt
#[derive(Debug)]
enum Outcome {
    Success(Response),
    /// 401; worth one token refresh
    Unauthorized(Error),
    /// Safe to retry, optionally after a server-provided delay
    Transient(Error, Option<Duration>),
    Failed(Error),
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client with retry, rate limiting and token injection
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    token_store: Option<Arc<TokenStore>>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Client against the default host with default settings
    pub fn new() -> Self {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Self {
        // Building only fails when the TLS backend cannot initialize
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .unwrap_or_else(|_| Client::new());
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Self {
            client,
            config,
            token_store: None,
            rate_limiter,
        }
    }

    /// Attach a token store; every request then carries its bearer token
    #[must_use]
    pub fn with_token_store(mut self, store: Arc<TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// The pooled reqwest client, shared with the token store
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn token_store(&self) -> Option<&Arc<TokenStore>> {
        self.token_store.as_ref()
    }

    /// Send a request, retrying transient failures.
    ///
    /// GET, PUT and DELETE are retried on 429, 5xx and any transport error.
    /// POST is retried only when the connection was never established.
    /// A 401 invalidates the cached token and retries once.
    pub async fn send(&self, request: &ApiRequest) -> Result<Response> {
        let policy = &self.config.retry;
        let mut attempt = 0;
        let mut reauthenticated = false;

        loop {
            match self.attempt(request).await {
                Outcome::Success(response) => {
                    debug!(%request, status = response.status().as_u16(), "Request succeeded");
                    return Ok(response);
                }
                Outcome::Unauthorized(_) if !reauthenticated && self.token_store.is_some() => {
                    warn!(%request, "Received 401, refreshing token");
                    if let Some(store) = &self.token_store {
                        store.invalidate().await;
                    }
                    reauthenticated = true;
                }
                Outcome::Transient(error, hint) if attempt < policy.max_retries => {
                    let delay = hint.map_or_else(|| policy.delay(attempt), |d| d.min(policy.max_delay));
                    warn!(
                        %request,
                        attempt = attempt + 1,
                        of = policy.max_retries + 1,
                        ?delay,
                        "Transient failure, retrying: {error}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Outcome::Unauthorized(error)
                | Outcome::Transient(error, _)
                | Outcome::Failed(error) => {
                    debug!(%request, kind = %error.kind(), "Request failed");
                    return Err(error);
                }
            }
        }
    }

    /// Send a request and decode the JSON body; an empty body decodes as `null`
    pub async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Whether a client-side throttle is active
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    async fn attempt(&self, request: &ApiRequest) -> Outcome {
        if let Some(limiter) = &self.rate_limiter {
            limiter.wait().await;
        }

        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path))
            .timeout(self.config.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(store) = &self.token_store {
            match store.token().await {
                Ok(token) => builder = builder.bearer_auth(token),
                Err(e) => return Outcome::Failed(e),
            }
        }

        match builder.send().await {
            Ok(response) => Self::classify(request, response).await,
            Err(e) if e.is_connect() => Outcome::Transient(Error::Http(e), None),
            Err(e) if e.is_timeout() => {
                let error = Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                };
                if request.is_idempotent() {
                    Outcome::Transient(error, None)
                } else {
                    Outcome::Failed(error)
                }
            }
            // Dropped or reset connections may have reached the server
            Err(e) if request.is_idempotent() => Outcome::Transient(Error::Http(e), None),
            Err(e) => Outcome::Failed(Error::Http(e)),
        }
    }

    async fn classify(request: &ApiRequest, response: Response) -> Outcome {
        let status = response.status();
        if status.is_success() {
            return Outcome::Success(response);
        }

        let hint = if status == StatusCode::TOO_MANY_REQUESTS {
            retry_after(&response)
        } else {
            None
        };
        let error = Error::http_status(status.as_u16(), response.text().await.unwrap_or_default());

        if status == StatusCode::UNAUTHORIZED {
            Outcome::Unauthorized(error)
        } else if error.is_retryable() && request.is_idempotent() {
            Outcome::Transient(error, hint)
        } else {
            Outcome::Failed(error)
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("retry", &self.config.retry)
            .field("has_token_store", &self.token_store.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// `retry-after` in whole seconds
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
        .map(Duration::from_secs)
}
