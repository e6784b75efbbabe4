//! Upstream API client error types.

use std::sync::Arc;

/// Errors from the data.gov.in client.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Missing data.gov.in API key.
    #[error("missing API key: MGNREGA_API_KEY not set")]
    MissingApiKey,

    /// Invalid query parameters.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Circuit breaker rejected the call before any I/O.
    #[error("circuit breaker open")]
    CircuitOpen,

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// Rate limited by the upstream API.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { UpstreamError::Timeout } else { UpstreamError::Network(Arc::new(err)) }
    }
}

impl From<UpstreamError> for mgnrega_core::Error {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::CircuitOpen => mgnrega_core::Error::CircuitOpen,
            UpstreamError::InvalidQuery(msg) => mgnrega_core::Error::InvalidInput(msg),
            other => mgnrega_core::Error::Upstream(other.to_string()),
        }
    }
}
