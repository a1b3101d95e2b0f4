//! Destination client trait and implementations.
//!
//! The [`DestinationClient`] trait covers the four storage operations a
//! migration needs: list folders, create a folder, share a folder and upload
//! a file into a folder.

mod drive;
#[cfg(feature = "mock")]
mod mock;

pub use self::drive::DriveClient;
#[cfg(feature = "mock")]
pub use self::mock::{MockDestination, StoredFile};
use crate::error::Result;
use crate::models::{Folder, FolderId, Role};
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::pin::Pin;

pub(crate) type FolderStream<'a> = Pin<Box<dyn Stream<Item = Result<Folder>> + Send + 'a>>;

/// Unified interface for the destination storage service.
#[async_trait]
pub trait DestinationClient: Send + Sync {
    /// Name of the client (used for logging only).
    fn name(&self) -> &str;

    /// List every folder visible to the client.
    ///
    /// Default implementation collects [`folder_stream()`](Self::folder_stream)
    /// into a [`Vec`].
    async fn list_folders(&self) -> Result<Vec<Folder>> {
        self.folder_stream().try_collect().await
    }

    /// Stream every folder visible to the client, fetching further pages as
    /// the stream is polled. Trashed folders are not included.
    fn folder_stream(&self) -> FolderStream<'_>;

    /// Create a folder and return its id.
    ///
    /// Does not check for an existing folder of the same name; storage
    /// services happily hold several.
    async fn create_folder(&self, name: &str) -> Result<FolderId>;

    /// Grant `grantee` (an email address) `role` on a folder.
    async fn create_permission(&self, folder: &FolderId, grantee: &str, role: Role) -> Result<()>;

    /// Upload `data` as a new file called `name` inside `parent`, returning the
    /// new file's id.
    async fn create_file(&self, name: &str, parent: &FolderId, data: Vec<u8>) -> Result<String>;
}
