//! # HTTP Errors
//!
//! Error types for outbound HTTP calls to the fee oracle and the swap
//! aggregator.
//!
//! # Examples
//!
//! ```
//! use swap_executor::infrastructure::http::error::HttpError;
//!
//! let error = HttpError::timeout("request timed out after 5000ms");
//! assert!(error.is_retryable());
//!
//! let error = HttpError::status(400, "{\"error\":\"invalid token\"}");
//! assert_eq!(error.body(), Some("{\"error\":\"invalid token\"}"));
//! ```

use thiserror::Error;

/// Error type for HTTP client operations.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// Request timed out.
    #[error("http timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// Network or connection error.
    #[error("http connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Non-2xx response. The body is kept verbatim.
    #[error("http status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Response body could not be decoded.
    #[error("http decode error: {message}")]
    Decode {
        /// Error message.
        message: String,
    },

    /// Client construction or URL error.
    #[error("http internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl HttpError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a status error carrying the raw response body.
    #[must_use]
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error is transient.
    ///
    /// Nothing in the trade pipeline retries on its own; callers use this
    /// to decide whether a whole-batch re-run is worthwhile.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connection { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode { .. } | Self::Internal { .. } => false,
        }
    }

    /// Returns the status code for non-2xx responses.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body for non-2xx responses.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }
}

/// Result type for HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;
