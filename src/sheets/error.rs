//! Sheet backend error types

use thiserror::Error;

/// Backend error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SheetError {
    pub kind: SheetErrorKind,
    pub message: String,
}

impl SheetError {
    pub fn new(kind: SheetErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SheetErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(SheetErrorKind::Timeout, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(SheetErrorKind::Auth, message)
    }

    #[allow(dead_code)] // Used by the in-memory backend
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SheetErrorKind::NotFound, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(SheetErrorKind::Malformed, message)
    }

    /// Classify an HTTP status returned by the backend
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => SheetErrorKind::Auth,
            404 => SheetErrorKind::NotFound,
            429 => SheetErrorKind::RateLimit,
            500..=599 => SheetErrorKind::ServerError,
            400..=499 => SheetErrorKind::InvalidRequest,
            _ => SheetErrorKind::Unknown,
        };
        Self::new(kind, format!("HTTP {status}: {body}"))
    }
}

impl From<reqwest::Error> for SheetError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SheetError::timeout(e.to_string())
        } else if e.is_decode() {
            SheetError::malformed(e.to_string())
        } else if let Some(status) = e.status() {
            SheetError::from_status(status.as_u16(), &e.to_string())
        } else {
            SheetError::network(e.to_string())
        }
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetErrorKind {
    /// Connection failures
    Network,
    /// Request exceeded the configured timeout
    Timeout,
    /// Too many requests (429)
    RateLimit,
    /// Backend failure (5xx)
    ServerError,
    /// Credentials rejected (401, 403) or unreadable
    Auth,
    /// Spreadsheet or range does not exist (404)
    NotFound,
    /// Bad request (other 4xx)
    InvalidRequest,
    /// Response body did not have the expected shape
    Malformed,
    Unknown,
}

impl SheetErrorKind {
    /// Whether trying again later could succeed without operator action
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::RateLimit | Self::ServerError
        )
    }
}
