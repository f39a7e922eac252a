//! Error types for the Streamkap provider
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Every variant classifies into an [`ErrorKind`], which drives retry
//! decisions in the HTTP client and state handling in the lifecycle layer.

use thiserror::Error;

/// Classification of an error, independent of where it was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 404 or an empty paged result
    NotFound,
    /// 401, or a failure to obtain a token
    Unauthorized,
    /// 403
    Forbidden,
    /// 400/422 from the server, or a local schema violation
    Validation,
    /// 409
    Conflict,
    /// 429, 5xx and network I/O; eligible for retry
    Transient,
    /// Operation deadline elapsed
    Cancelled,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Transient => "transient",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// The main error type for the provider
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Token refresh failed: {source}")]
    TokenRefresh {
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ============================================================================
    // Resource Errors
    // ============================================================================
    #[error("{resource} '{id}' not found")]
    NotFound { resource: String, id: String },

    #[error("Attribute '{attribute}': {message}")]
    Attribute { attribute: String, message: String },

    #[error("Cannot convert '{key}' to {expected}: {message}")]
    Conversion {
        key: String,
        expected: String,
        message: String,
    },

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("{operation} cancelled after {timeout_ms}ms")]
    Cancelled { operation: String, timeout_ms: u64 },

    // ============================================================================
    // Connector Definition Errors
    // ============================================================================
    #[error("Invalid connector definition '{connector}': {message}")]
    ConnectorDefinition { connector: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an attribute-scoped validation error
    pub fn attribute(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Attribute {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Create a value conversion error
    pub fn conversion(
        key: impl Into<String>,
        expected: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            key: key.into(),
            expected: expected.into(),
            message: message.into(),
        }
    }

    /// Create a connector definition error
    pub fn connector_definition(connector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectorDefinition {
            connector: connector.into(),
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::HttpStatus { status, .. } => classify_status(*status),
            Error::Http(e) => {
                if let Some(status) = e.status() {
                    classify_status(status.as_u16())
                } else if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() {
                    ErrorKind::Transient
                } else {
                    ErrorKind::Unknown
                }
            }
            Error::Timeout { .. } => ErrorKind::Transient,
            Error::Auth { .. } | Error::TokenRefresh { .. } => ErrorKind::Unauthorized,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Attribute { .. }
            | Error::Conversion { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. } => ErrorKind::Validation,
            Error::Cancelled { .. } => ErrorKind::Cancelled,
            Error::Io(_) => ErrorKind::Transient,
            _ => ErrorKind::Unknown,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Check if this error means the resource is gone
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Map an HTTP status code to an error kind
pub fn classify_status(status: u16) -> ErrorKind {
    match status {
        404 => ErrorKind::NotFound,
        401 => ErrorKind::Unauthorized,
        403 => ErrorKind::Forbidden,
        400 | 422 => ErrorKind::Validation,
        409 => ErrorKind::Conflict,
        429 | 500..=599 => ErrorKind::Transient,
        _ => ErrorKind::Unknown,
    }
}

/// Result type alias for the provider
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
