//! Error types for the EODH client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the EODH client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Argument Errors
    // ============================================================================
    #[error("Invalid argument '{argument}': {message}")]
    Validation { argument: String, message: String },

    #[error("API does not conform to {uri}")]
    Conformance { uri: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Empty response from {url}")]
    EmptyResponse { url: String },

    // ============================================================================
    // Record Model Errors
    // ============================================================================
    #[error("{record} does not contain a link with relation '{rel}'")]
    MissingLink { record: String, rel: String },

    #[error("Did not receive {header} header from {url}")]
    MissingHeader { header: String, url: String },

    #[error("Failed to project {record}: {message}")]
    Projection { record: String, message: String },

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Next url not specified")]
    NoNextPage,

    #[error("Index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

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

    /// Create a validation error for a caller-supplied argument
    pub fn validation(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Create a conformance error naming the missing capability
    pub fn conformance(uri: impl Into<String>) -> Self {
        Self::Conformance { uri: uri.into() }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a missing link error
    pub fn missing_link(record: impl Into<String>, rel: impl Into<String>) -> Self {
        Self::MissingLink {
            record: record.into(),
            rel: rel.into(),
        }
    }

    /// Create a projection error
    pub fn projection(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Projection {
            record: record.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from the transport rather than from this crate
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::HttpStatus { .. }
                | Error::RateLimited { .. }
                | Error::Timeout { .. }
        )
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// HTTP status code, if the error carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for the EODH client
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        assert_eq!(Error::NoNextPage.to_string(), "Next url not specified");
    }

    #[test]
    fn test_conformance_names_uri() {
        let err = Error::conformance("https://api.stacspec.org/v1.0.0/collections");
        assert_eq!(
            err.to_string(),
            "API does not conform to https://api.stacspec.org/v1.0.0/collections"
        );
    }

    #[test]
    fn test_missing_link_names_relation() {
        let err = Error::missing_link("Collection 'cmip6'", "items");
        assert!(err.to_string().contains("relation 'items'"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::http_status(503, "").is_retryable());

        assert!(!Error::http_status(404, "").is_retryable());
        assert!(!Error::NoNextPage.is_retryable());
        assert!(!Error::conformance("x").is_retryable());
    }

    #[test]
    fn test_status() {
        assert_eq!(Error::http_status(409, "").status(), Some(409));
        assert_eq!(Error::validation("limit", "bad").status(), None);
        assert!(Error::http_status(500, "").is_transport());
        assert!(!Error::NoNextPage.is_transport());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
