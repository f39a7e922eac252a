//! Auth types
//!
//! Credentials, the cached token, and the wire shapes of the
//! `/api/auth/access-token` endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Path of the token endpoint, relative to the API host
pub const TOKEN_PATH: &str = "/api/auth/access-token";

/// Refresh once the token has this many seconds or fewer left
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// Client credentials used to obtain access tokens
#[derive(Clone)]
pub struct Credentials {
    /// API host, without trailing slash
    pub base_url: String,
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub secret: String,
}

impl Credentials {
    /// Create a new credential set
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            secret: secret.into(),
        }
    }

    /// Full URL of the token endpoint
    pub fn token_url(&self) -> String {
        format!("{}{TOKEN_PATH}", self.base_url)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("secret", &crate::types::REDACTED)
            .finish()
    }
}

/// Body of the token request
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenRequest<'a> {
    pub client_id: &'a str,
    pub secret: &'a str,
}

/// Body of the token response
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    pub(crate) fn into_cached_token(self) -> CachedToken {
        let expires_at = self
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        CachedToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

/// Cached token with expiration
#[derive(Clone)]
pub struct CachedToken {
    /// The bearer token
    pub access_token: String,
    /// Refresh token issued alongside, if any
    pub refresh_token: Option<String>,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a token that expires in N seconds from now
    pub fn expires_in(access_token: impl Into<String>, seconds: i64) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: Some(Utc::now() + chrono::Duration::seconds(seconds)),
        }
    }

    /// Check if the token is inside the refresh margin
    pub fn needs_refresh(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                Utc::now() + chrono::Duration::seconds(REFRESH_MARGIN_SECS) >= expires_at
            }
            None => false, // No expiration = never expires
        }
    }
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &crate::types::REDACTED)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_cached_token_fresh() {
        let token = CachedToken::expires_in("test", 3600);
        assert!(!token.needs_refresh());
    }

    #[test]
    fn test_cached_token_inside_margin() {
        let token = CachedToken::expires_in("test", 59);
        assert!(token.needs_refresh());

        let token = CachedToken::expires_in("test", -100);
        assert!(token.needs_refresh());
    }

    #[test]
    fn test_cached_token_no_expiration() {
        let token = CachedToken {
            access_token: "test".into(),
            refresh_token: None,
            expires_at: None,
        };
        assert!(!token.needs_refresh());
    }

    #[test]
    fn test_token_url() {
        let creds = Credentials::new("https://api.example.com/", "id", "secret");
        assert_eq!(
            creds.token_url(),
            "https://api.example.com/api/auth/access-token"
        );
    }

    #[test]
    fn test_token_response_wire_names() {
        let response: TokenResponse = serde_json::from_value(serde_json::json!({
            "accessToken": "a",
            "refreshToken": "r",
            "expiresIn": 3600
        }))
        .unwrap();
        let token = response.into_cached_token();
        assert_eq!(token.access_token, "a");
        assert_eq!(token.refresh_token.as_deref(), Some("r"));
        assert!(!token.needs_refresh());
    }

    #[test]
    fn test_debug_redacts() {
        let token = CachedToken::expires_in("very-secret-token", 10);
        assert!(!format!("{token:?}").contains("very-secret-token"));

        let creds = Credentials::new("https://h", "id", "very-secret");
        assert!(!format!("{creds:?}").contains("very-secret"));
    }
}
