//! In-memory destination client for testing.

use super::FolderStream;
use crate::DestinationClient;
use crate::error::{ErrorKind, Result};
use crate::models::{Folder, FolderId, Role};
use async_stream::stream;
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// A file uploaded into a [`MockDestination`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub parent: FolderId,
    pub data: Vec<u8>,
}

#[derive(Default)]
struct State {
    folders: Vec<Folder>,
    permissions: Vec<(FolderId, String, Role)>,
    files: Vec<StoredFile>,
    folder_creates: usize,
    upload_attempts: Vec<String>,
    next_id: usize,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// In-memory destination client for testing.
///
/// Folders, permissions and files live behind a [`RwLock`]; every call is
/// counted so tests can assert on exactly what reached the "service".
/// `create_folder` yields to the scheduler before committing, which lets
/// concurrent callers interleave the way they would against a real network.
///
/// # Examples
///
/// ```
/// use crosscloud_destination::{DestinationClient, MockDestination};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let drive = MockDestination::with_folders([("existing-id", "Existing")]);
/// let id = drive.create_folder("New").await?;
/// drive.create_file("a.txt", &id, b"data".to_vec()).await?;
/// assert_eq!(drive.list_folders().await?.len(), 2);
/// assert_eq!(drive.files().await.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MockDestination {
    state: RwLock<State>,
    fail_listing: bool,
    failing_folders: HashSet<String>,
    failing_grantees: HashSet<String>,
    failing_uploads: HashSet<String>,
}

impl MockDestination {
    /// Create a mock pre-populated with `(id, name)` folders.
    pub fn with_folders<'a>(folders: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let state = State {
            folders: folders.into_iter().map(|(id, name)| Folder::new(id, name)).collect(),
            ..State::default()
        };
        Self {
            state: RwLock::new(state),
            ..Self::default()
        }
    }

    /// Make folder listing fail with an HTTP 500 status.
    pub fn with_failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Make creating a folder called `name` fail with an HTTP 500 status.
    pub fn with_failing_folder(mut self, name: impl Into<String>) -> Self {
        self.failing_folders.insert(name.into());
        self
    }

    /// Make granting access to `grantee` fail with an HTTP 400 status.
    pub fn with_failing_grantee(mut self, grantee: impl Into<String>) -> Self {
        self.failing_grantees.insert(grantee.into());
        self
    }

    /// Make uploading a file called `name` fail with an HTTP 500 status.
    pub fn with_failing_upload(mut self, name: impl Into<String>) -> Self {
        self.failing_uploads.insert(name.into());
        self
    }

    /// All folders, pre-populated and created.
    pub async fn folders(&self) -> Vec<Folder> {
        self.state.read().await.folders.clone()
    }

    /// Number of `create_folder` calls that reached the mock, including
    /// failed ones.
    pub async fn folder_creates(&self) -> usize {
        self.state.read().await.folder_creates
    }

    /// Every permission granted, as `(folder, grantee, role)`.
    pub async fn permissions(&self) -> Vec<(FolderId, String, Role)> {
        self.state.read().await.permissions.clone()
    }

    /// Every file successfully uploaded.
    pub async fn files(&self) -> Vec<StoredFile> {
        self.state.read().await.files.clone()
    }

    /// Names of every upload attempted, including failed ones.
    pub async fn upload_attempts(&self) -> Vec<String> {
        self.state.read().await.upload_attempts.clone()
    }
}

#[async_trait]
impl DestinationClient for MockDestination {
    fn name(&self) -> &str {
        "mock"
    }

    fn folder_stream(&self) -> FolderStream<'_> {
        Box::pin(stream! {
            if self.fail_listing {
                yield Err(exn::Exn::from(ErrorKind::Status(500)));
                return;
            }
            // Snapshot under the read lock, then drop it before yielding.
            let folders = self.state.read().await.folders.clone();
            for folder in folders {
                yield Ok(folder);
            }
        })
    }

    async fn create_folder(&self, name: &str) -> Result<FolderId> {
        self.state.write().await.folder_creates += 1;
        tokio::task::yield_now().await;
        if self.failing_folders.contains(name) {
            exn::bail!(ErrorKind::Status(500));
        }
        let mut state = self.state.write().await;
        let id = FolderId::new(state.next_id("folder"));
        state.folders.push(Folder::new(id.clone(), name));
        Ok(id)
    }

    async fn create_permission(&self, folder: &FolderId, grantee: &str, role: Role) -> Result<()> {
        if self.failing_grantees.contains(grantee) {
            exn::bail!(ErrorKind::Status(400));
        }
        let mut state = self.state.write().await;
        if !state.folders.iter().any(|f| &f.id == folder) {
            exn::bail!(ErrorKind::NotFound(folder.to_string()));
        }
        state.permissions.push((folder.clone(), grantee.to_string(), role));
        Ok(())
    }

    async fn create_file(&self, name: &str, parent: &FolderId, data: Vec<u8>) -> Result<String> {
        let mut state = self.state.write().await;
        state.upload_attempts.push(name.to_string());
        if self.failing_uploads.contains(name) {
            exn::bail!(ErrorKind::Status(500));
        }
        if !state.folders.iter().any(|f| &f.id == parent) {
            exn::bail!(ErrorKind::NotFound(parent.to_string()));
        }
        let id = state.next_id("file");
        state.files.push(StoredFile {
            id: id.clone(),
            name: name.to_string(),
            parent: parent.clone(),
            data,
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_prepopulated() {
        let drive = MockDestination::with_folders([("a", "Alpha"), ("b", "Beta")]);
        let folders = drive.list_folders().await.unwrap();
        assert_eq!(folders, [Folder::new("a", "Alpha"), Folder::new("b", "Beta")]);
    }

    #[tokio::test]
    async fn test_failing_listing() {
        let drive = MockDestination::default().with_failing_listing();
        assert_eq!(*drive.list_folders().await.unwrap_err(), ErrorKind::Status(500));
    }

    #[tokio::test]
    async fn test_create_folder_counts_calls() {
        let drive = MockDestination::default().with_failing_folder("Broken");
        let id = drive.create_folder("Works").await.unwrap();
        assert!(drive.create_folder("Broken").await.is_err());
        assert_eq!(drive.folder_creates().await, 2);
        assert_eq!(drive.folders().await, [Folder::new(id, "Works")]);
    }

    #[tokio::test]
    async fn test_permission_requires_folder() {
        let drive = MockDestination::with_folders([("a", "Alpha")]);
        drive.create_permission(&FolderId::new("a"), "user@x.com", Role::Writer).await.unwrap();
        let err = drive.create_permission(&FolderId::new("nope"), "user@x.com", Role::Writer).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        assert_eq!(drive.permissions().await, [(FolderId::new("a"), "user@x.com".to_string(), Role::Writer)]);
    }

    #[tokio::test]
    async fn test_upload_records_attempts() {
        let drive = MockDestination::with_folders([("a", "Alpha")]).with_failing_upload("bad.txt");
        let parent = FolderId::new("a");
        drive.create_file("good.txt", &parent, b"1".to_vec()).await.unwrap();
        assert!(drive.create_file("bad.txt", &parent, b"2".to_vec()).await.is_err());
        assert_eq!(drive.upload_attempts().await, ["good.txt", "bad.txt"]);
        let files = drive.files().await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "good.txt");
        assert_eq!(files[0].parent, parent);
    }
}
