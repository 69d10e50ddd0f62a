//! Artsy Error Types
//!
//! Error hierarchy for catalog requests and the X-App token lifecycle.
//!
//! Every error is `Clone`: a single failed token refresh is delivered to all
//! requests that were waiting on it.

use std::time::Duration;
use thiserror::Error;

/// Root error type for the Artsy integration.
#[derive(Error, Debug, Clone)]
pub enum ArtsyError {
    #[error("Authentication failed: {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Decoding error: {0}")]
    Decoding(#[from] DecodingError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    #[error("Request was cancelled")]
    Cancelled,
}

impl ArtsyError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "ARTSY_AUTH",
            Self::Network(_) => "ARTSY_NETWORK",
            Self::Decoding(_) => "ARTSY_DECODING",
            Self::Configuration(_) => "ARTSY_CONFIG",
            Self::Response(_) => "ARTSY_RESPONSE",
            Self::Cancelled => "ARTSY_CANCELLED",
        }
    }

    /// Check if re-issuing the same request may succeed.
    ///
    /// Nothing is retried automatically; callers decide.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_retryable(),
            Self::Authentication(AuthenticationError::Unreachable { .. }) => true,
            Self::Response(ResponseError::RateLimited { .. }) => true,
            Self::Response(ResponseError::ServerError { .. }) => true,
            _ => false,
        }
    }

    /// Check if the failure means the current token should be discarded.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, Self::Response(ResponseError::Unauthorized { .. }))
    }

    /// Get retry-after duration if applicable.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Response(ResponseError::RateLimited { retry_after }) => *retry_after,
            _ => None,
        }
    }
}

/// Credential exchange error.
#[derive(Error, Debug, Clone)]
pub enum AuthenticationError {
    #[error("credentials rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("token endpoint unreachable: {message}")]
    Unreachable { message: String },

    #[error("malformed token response: {message}")]
    InvalidTokenResponse { message: String },

    #[error("token refresh was aborted before completing")]
    RefreshAborted,
}

/// Network/transport error.
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },
}

impl NetworkError {
    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }
}

/// Response body did not match the declared shape.
#[derive(Error, Debug, Clone)]
pub enum DecodingError {
    #[error("Invalid JSON for {target}: {message}")]
    InvalidJson {
        target: &'static str,
        message: String,
    },
}

/// Configuration error.
#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    #[error("Missing required field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("Malformed persisted token field {key}: {message}")]
    MalformedToken { key: String, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Non-success HTTP status from a catalog endpoint.
#[derive(Error, Debug, Clone)]
pub enum ResponseError {
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    #[error("Unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Rate limited")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Server error: {message}")]
    ServerError { status: u16, message: String },

    #[error("Unexpected HTTP {status}: {message}")]
    Unexpected { status: u16, message: String },
}

/// Persistence error from the key-value defaults store.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Read failed: {message}")]
    ReadFailed { message: String },

    #[error("Write failed: {message}")]
    WriteFailed { message: String },

    #[error("Corrupted data: {message}")]
    CorruptedData { message: String },
}

/// Result type for Artsy operations.
pub type ArtsyResult<T> = Result<T, ArtsyError>;

/// Error body returned by the Artsy API.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ArtsyErrorResponse {
    #[serde(default, alias = "error")]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Parse error response from HTTP body.
pub fn parse_error_response(body: &str) -> Option<ArtsyErrorResponse> {
    serde_json::from_str(body).ok()
}

/// Create error from a non-success HTTP response.
pub fn create_error_from_response(
    status: u16,
    body: &str,
    retry_after: Option<Duration>,
) -> ArtsyError {
    let message = parse_error_response(body)
        .and_then(|r| r.message)
        .unwrap_or_else(|| format!("HTTP {}", status));

    let error = match status {
        404 => ResponseError::NotFound { message },
        401 | 403 => ResponseError::Unauthorized { status, message },
        429 => ResponseError::RateLimited { retry_after },
        500..=599 => ResponseError::ServerError { status, message },
        _ => ResponseError::Unexpected { status, message },
    };

    ArtsyError::Response(error)
}
