//! Provider configuration
//!
//! Settings are resolved once on init from three layers, highest
//! precedence first: explicit configuration (inline or file, YAML or JSON),
//! `STREAMKAP_*` environment variables, then built-in defaults.

use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default API host
pub const DEFAULT_HOST: &str = "https://api.streamkap.com";

/// Environment variable for the API host
pub const ENV_HOST: &str = "STREAMKAP_HOST";

/// Environment variable for the client id
pub const ENV_CLIENT_ID: &str = "STREAMKAP_CLIENT_ID";

/// Environment variable for the client secret
pub const ENV_SECRET: &str = "STREAMKAP_SECRET";

// ============================================================================
// Provider Config
// ============================================================================

/// Provider block as written by the user
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API host
    #[serde(default)]
    pub host: Option<String>,

    /// OAuth client id
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[serde(default)]
    pub secret: Option<String>,

    /// HTTP transport tuning
    #[serde(default)]
    pub http: HttpSettings,
}

/// HTTP transport tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Client-side request rate ceiling
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_requests_per_second() -> u32 {
    10
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

impl HttpSettings {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("host", &self.host)
            .field("client_id", &self.client_id)
            .field("secret", &self.secret.as_ref().map(|_| crate::types::REDACTED))
            .field("http", &self.http)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a config with explicit credentials
    pub fn new(client_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            secret: Some(secret.into()),
            ..Default::default()
        }
    }

    /// Set the API host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Parse a config from YAML or JSON text
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse provider config: {e}")))
    }

    /// Load a config file (YAML or JSON)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read provider config '{}': {e}",
                path.display()
            ))
        })?;
        Self::parse(&content)
    }

    /// Config populated from the process environment only
    pub fn from_env() -> Self {
        Self::default().with_env_from(|key| std::env::var(key).ok())
    }

    /// Fill unset fields from the process environment
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Fill unset fields from an arbitrary variable lookup
    #[must_use]
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |key: &str| lookup(key).none_if_empty();

        if self.host.clone().none_if_empty().is_none() {
            self.host = from_env(ENV_HOST);
        }
        if self.client_id.clone().none_if_empty().is_none() {
            self.client_id = from_env(ENV_CLIENT_ID);
        }
        if self.secret.clone().none_if_empty().is_none() {
            self.secret = from_env(ENV_SECRET);
        }
        self
    }

    /// Validate and produce the settings used to build the API client
    pub fn resolve(self) -> Result<ResolvedConfig> {
        let host = self
            .host
            .none_if_empty()
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        url::Url::parse(&host).map_err(|e| Error::InvalidConfigValue {
            field: "host".to_string(),
            message: e.to_string(),
        })?;

        let client_id = self
            .client_id
            .none_if_empty()
            .ok_or_else(|| Error::missing_field(format!("client_id (or {ENV_CLIENT_ID})")))?;
        let secret = self
            .secret
            .none_if_empty()
            .ok_or_else(|| Error::missing_field(format!("secret (or {ENV_SECRET})")))?;

        if self.http.max_retries > 10 {
            return Err(Error::InvalidConfigValue {
                field: "http.max_retries".to_string(),
                message: "must be at most 10".to_string(),
            });
        }

        Ok(ResolvedConfig {
            host: host.trim_end_matches('/').to_string(),
            client_id,
            secret,
            http: self.http,
        })
    }
}

/// Validated provider settings
#[derive(Clone)]
pub struct ResolvedConfig {
    /// API host without trailing slash
    pub host: String,
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub secret: String,
    /// HTTP transport tuning
    pub http: HttpSettings,
}

impl std::fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("host", &self.host)
            .field("client_id", &self.client_id)
            .field("secret", &crate::types::REDACTED)
            .field("http", &self.http)
            .finish()
    }
}
