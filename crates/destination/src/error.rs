//! Destination Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A destination error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for destination operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service-account key could not be parsed or used for signing.
    #[display("invalid service account credentials")]
    Credentials,
    /// The token endpoint rejected the assertion or returned no token.
    #[display("authentication with the storage service failed")]
    Authentication,
    /// The HTTP request could not be sent or its body could not be read.
    #[display("request to the storage service failed")]
    Request,
    /// The storage service answered with a non-success status code.
    #[display("storage service responded with HTTP {_0}")]
    Status(#[error(not(source))] u16),
    /// A response body did not have the expected shape.
    #[display("unexpected response from the storage service")]
    Decode,
    /// Referenced folder does not exist (mock backend only).
    #[display("folder not found: {_0}")]
    NotFound(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}
