//! Shared fixtures for unit tests

use crate::api::StreamkapClient;
use crate::auth::{Credentials, TokenStore};
use crate::http::{HttpClient, HttpClientConfig, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount a token endpoint that always grants `test-token`
pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accessToken": "test-token",
            "expiresIn": 3600
        })))
        .mount(server)
        .await;
}

/// Client against a mock server with fast retries and no throttling
pub async fn mock_client(server: &MockServer) -> StreamkapClient {
    mount_token(server).await;

    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .retry(RetryPolicy::fixed(2, Duration::from_millis(5)))
        .no_rate_limit()
        .build();
    let http = HttpClient::with_config(config);
    let store = TokenStore::with_client(
        Credentials::new(server.uri(), "client", "secret"),
        http.inner().clone(),
    );
    StreamkapClient::with_http(http.with_token_store(Arc::new(store)))
}

/// Wrap entities in the paged envelope
pub fn paged(items: serde_json::Value) -> serde_json::Value {
    let total = items.as_array().map_or(0, Vec::len);
    serde_json::json!({
        "result": items,
        "total": total,
        "page": 1,
        "page_size": 100
    })
}
