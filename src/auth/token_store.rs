//! Token store implementation
//!
//! Acquires, caches and refreshes the Streamkap access token.

use super::types::{CachedToken, Credentials, TokenRequest, TokenResponse};
use crate::error::{Error, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Shared access-token cache for one set of client credentials
pub struct TokenStore {
    /// Client credentials
    credentials: Credentials,
    /// Cached token
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
    /// Deadline for a single token request
    timeout: Option<Duration>,
}

impl TokenStore {
    /// Create a new token store with the given credentials
    pub fn new(credentials: Credentials) -> Self {
        Self::with_client(credentials, Client::new())
    }

    /// Create a token store with a custom HTTP client
    pub fn with_client(credentials: Credentials, http_client: Client) -> Self {
        Self {
            credentials,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
            timeout: None,
        }
    }

    /// Bound every token request; a stalled token endpoint then fails
    /// instead of hanging the caller
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get a valid token, refreshing if necessary
    pub async fn token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.needs_refresh() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        // Write lock serializes refreshes; held only across the token request
        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited
        if let Some(token) = cached.as_ref() {
            if !token.needs_refresh() {
                return Ok(token.access_token.clone());
            }
        }

        let refreshing = cached.is_some();
        let new_token = match self.fetch_new_token().await {
            Ok(token) => token,
            Err(e) if refreshing => {
                return Err(Error::TokenRefresh {
                    source: Box::new(e),
                })
            }
            Err(e) => return Err(e),
        };

        debug!(
            expires_at = ?new_token.expires_at,
            refreshed = refreshing,
            "Obtained Streamkap access token"
        );
        let token_str = new_token.access_token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    /// Drop the cached token so the next call fetches a fresh one
    pub async fn invalidate(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Snapshot of the cached token
    pub async fn cached(&self) -> Option<CachedToken> {
        self.cached_token.read().await.clone()
    }

    /// Exchange the client credentials for a token
    async fn fetch_new_token(&self) -> Result<CachedToken> {
        let body = TokenRequest {
            client_id: &self.credentials.client_id,
            secret: &self.credentials.secret,
        };

        let mut request = self
            .http_client
            .post(self.credentials.token_url())
            .json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth {
                message: format!("Token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(Error::Http)?;
        Ok(token_response.into_cached_token())
    }

    /// Get the configured credentials
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
