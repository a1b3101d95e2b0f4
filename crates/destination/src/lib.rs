//! Google Drive access for crosscloud.
//!
//! Provides the [`DestinationClient`] capability (list folders, create a
//! folder, share it, upload into it), a Drive v3 implementation in
//! [`DriveClient`], and service-account authentication in [`auth`].

pub mod auth;
pub mod client;
pub mod error;
mod models;

#[cfg(feature = "mock")]
pub use crate::client::{MockDestination, StoredFile};
pub use crate::client::{DestinationClient, DriveClient};
pub use crate::models::{Folder, FolderId, Role};
use std::sync::Arc;

pub type DestinationHandle = Arc<dyn DestinationClient + Send + Sync>;
