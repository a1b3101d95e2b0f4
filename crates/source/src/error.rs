//! Source Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A source error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The OAuth token exchange was rejected or returned no token.
    #[display("authentication with the source system failed")]
    Authentication,
    /// An object or field name cannot be safely interpolated into a query.
    #[display("invalid identifier: {_0:?}")]
    InvalidIdentifier(#[error(not(source))] String),
    /// The HTTP request could not be sent or its body could not be read.
    #[display("request to the source system failed")]
    Request,
    /// The source system answered with a non-success status code.
    #[display("source system responded with HTTP {_0}")]
    Status(#[error(not(source))] u16),
    /// A response body did not have the expected shape.
    #[display("unexpected response from the source system")]
    Decode,
    /// No canned response exists for the query (mock backend only).
    #[display("unknown query: {_0}")]
    UnknownQuery(#[error(not(source))] String),
    /// No blob exists for the locator (mock backend only).
    #[display("blob not found: {_0}")]
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
