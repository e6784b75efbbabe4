//! Unified error types for the metrics mirror.
//!
//! Cache failures are deliberately absent: the key-value cache soft-fails to
//! a miss at the client wrapper and never surfaces here.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the metrics mirror.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., missing coordinates).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// No tier produced data for the requested key.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Circuit breaker rejected the call before any I/O.
    #[error("CIRCUIT_OPEN: upstream calls suspended")]
    CircuitOpen,

    /// Transient upstream failure (network/timeout/non-2xx).
    #[error("UPSTREAM_ERROR: {0}")]
    Upstream(String),

    /// Reverse geocoding failed.
    #[error("GEOCODE_FAILED: {0}")]
    Geocode(String),

    /// Coordinates resolve outside the configured target state.
    #[error("OUT_OF_REGION: location is in {detected}")]
    OutOfRegion { detected: String },
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::NotFound(msg) => (-32004, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::CircuitOpen => (-32010, "upstream calls suspended".to_string()),
            Error::Upstream(msg) => (-32011, msg.clone()),
            Error::Geocode(msg) => (-32012, msg.clone()),
            Error::OutOfRegion { detected } => (-32013, format!("location is in {detected}")),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("LUCKNOW 2024-2025".to_string());
        assert!(err.to_string().contains("NOT_FOUND"));
        assert!(err.to_string().contains("LUCKNOW"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::NotFound("LUCKNOW 2024-2025".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32004);
    }

    #[test]
    fn test_circuit_open_code() {
        let mcp_err: McpError = Error::CircuitOpen.into();
        assert_eq!(mcp_err.code.0, -32010);
    }
}
