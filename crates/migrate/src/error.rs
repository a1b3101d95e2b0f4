//! Migration Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Source and destination errors are
//! kept as children in the tree; the kinds here say which step of a
//! migration failed.

use derive_more::{Display, Error};

/// A migration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which half of a file transfer failed.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    /// Reading the payload from the source system.
    #[display("download")]
    Download,
    /// Writing the payload into the destination folder.
    #[display("upload")]
    Upload,
}

/// Classifies the step of a migration that failed.
///
/// ### Operational Errors
/// - [`ErrorKind::InvalidEntityType`]
///
/// ### Dependency Errors
/// - [`ErrorKind::SourceQuery`]
/// - [`ErrorKind::DestinationInit`]
/// - [`ErrorKind::FolderCreate`]
/// - [`ErrorKind::Transfer`], with a [`SourceDownload`](ErrorKind::SourceDownload)
///   or [`DestinationUpload`](ErrorKind::DestinationUpload) child.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The record type is not a valid object name; nothing was queried.
    #[display("invalid entity type: {_0:?}")]
    InvalidEntityType(#[error(not(source))] String),
    /// A catalog query against the source system failed.
    #[display("failed to query the source system")]
    SourceQuery,
    /// File content could not be read from the source system.
    #[display("failed to download file content")]
    SourceDownload,
    /// Existing destination folders could not be listed.
    #[display("failed to list existing destination folders")]
    DestinationInit,
    /// A folder could not be created, or could not be shared after creation.
    #[display("failed to create destination folder {_0:?}")]
    FolderCreate(#[error(not(source))] String),
    /// File content could not be written to the destination.
    #[display("failed to upload file content")]
    DestinationUpload,
    /// One file could not be transferred.
    #[display("failed to {stage} file {file_id}")]
    Transfer { file_id: String, stage: TransferStage },
}

impl ErrorKind {
    /// Returns `true` if re-running the migration might succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidEntityType(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::FolderCreate("Acme Corp".to_string()).to_string(), "failed to create destination folder \"Acme Corp\"");
        let transfer = ErrorKind::Transfer {
            file_id: "0681".to_string(),
            stage: TransferStage::Upload,
        };
        assert_eq!(transfer.to_string(), "failed to upload file 0681");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(!ErrorKind::InvalidEntityType("Bad Type".to_string()).is_retryable());
        assert!(ErrorKind::SourceQuery.is_retryable());
        assert!(ErrorKind::DestinationInit.is_retryable());
    }
}
