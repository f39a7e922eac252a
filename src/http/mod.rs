//! HTTP client module
//!
//! Provides the transport shared by every API call.
//!
//! # Features
//!
//! - **Token Injection**: Bearer token from the shared `TokenStore`, one refresh on 401
//! - **Automatic Retries**: Transient failures retried with backoff and jitter
//! - **Method-Aware Safety**: POST is only retried when no request reached the server
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod rate_limit;

pub use client::{ApiRequest, HttpClient, HttpClientConfig, HttpClientConfigBuilder, RetryPolicy};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
