//! Destination folder resolution.
//!
//! [`FolderResolver`] owns the process-wide name → id map. Each name gets its
//! own [`OnceCell`], so concurrent requests for a folder that does not exist
//! yet wait on a single creation instead of racing to create duplicates.
//! Unrelated names never wait on each other.

use crate::error::{ErrorKind, Result};
use crosscloud_destination::{DestinationHandle, Folder, FolderId, Role};
use exn::ResultExt;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

type Slot = Arc<OnceCell<FolderId>>;

pub struct FolderResolver {
    client: DestinationHandle,
    folders: Mutex<HashMap<String, Slot>>,
}

impl FolderResolver {
    /// List every existing destination folder and seed the map with it.
    ///
    /// When several folders share a name, the first one listed wins.
    pub async fn initialize(client: DestinationHandle) -> Result<Self> {
        let listed = client.list_folders().await.or_raise(|| ErrorKind::DestinationInit)?;
        let mut folders: HashMap<String, Slot> = HashMap::with_capacity(listed.len());
        for Folder { id, name } in listed {
            match folders.entry(name) {
                Entry::Occupied(entry) => {
                    tracing::warn!(
                        folder = %entry.key(),
                        kept = ?entry.get().get(),
                        ignored = %id,
                        "Duplicate destination folder name"
                    );
                },
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(OnceCell::new_with(Some(id))));
                },
            }
        }
        tracing::info!(client = client.name(), folders = folders.len(), "Loaded existing destination folders");
        Ok(Self {
            client,
            folders: Mutex::new(folders),
        })
    }

    /// Id of the folder called `name`, creating it first if it is unknown.
    ///
    /// A newly created folder is shared with `grantee` as a writer. If the
    /// share fails the folder is left behind unrecorded and the next call
    /// for `name` creates a fresh one.
    pub async fn resolve_or_create(&self, name: &str, grantee: Option<&str>) -> Result<FolderId> {
        let slot = {
            let mut folders = self.folders.lock().await;
            match folders.get(name) {
                Some(slot) => slot.clone(),
                None => folders.entry(name.to_string()).or_default().clone(),
            }
        };
        if let Some(id) = slot.get() {
            tracing::trace!(folder = %name, id = %id, "Folder cache hit");
            return Ok(id.clone());
        }
        let id = slot.get_or_try_init(|| self.create(name, grantee)).await?;
        Ok(id.clone())
    }

    async fn create(&self, name: &str, grantee: Option<&str>) -> Result<FolderId> {
        let id = self.client.create_folder(name).await.or_raise(|| ErrorKind::FolderCreate(name.to_string()))?;
        if let Some(grantee) = grantee.filter(|grantee| !grantee.is_empty()) {
            let shared = self.client.create_permission(&id, grantee, Role::Writer).await;
            if shared.is_err() {
                tracing::warn!(folder = %name, orphan = %id, grantee, "Created folder could not be shared");
            }
            shared.or_raise(|| ErrorKind::FolderCreate(name.to_string()))?;
        }
        tracing::info!(folder = %name, id = %id, grantee = grantee.unwrap_or_default(), "Created destination folder");
        Ok(id)
    }

    /// Cached id for `name`, without creating anything.
    pub async fn get(&self, name: &str) -> Option<FolderId> {
        self.folders.lock().await.get(name).and_then(|slot| slot.get().cloned())
    }

    /// Number of folders with a known id.
    pub async fn len(&self) -> usize {
        self.folders.lock().await.values().filter(|slot| slot.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Copy of the known name → id pairs, sorted by name.
    pub async fn snapshot(&self) -> BTreeMap<String, FolderId> {
        self.folders
            .lock()
            .await
            .iter()
            .filter_map(|(name, slot)| slot.get().map(|id| (name.clone(), id.clone())))
            .collect()
    }
}
