//! Migration models.
//!
//! [`FileRecord`], [`Grouping`] and [`MigrationReport`] are request-scoped:
//! built for one migration call and dropped when it returns.

use crosscloud_destination::FolderId;
use crosscloud_source::models::ContentVersionRow;
use serde::Serialize;
use std::collections::HashMap;

/// Name of a destination folder; compared by exact string equality.
pub type FolderName = String;

fn upload_name(title: &str, extension: &str) -> String {
    if extension.is_empty() {
        title.to_string()
    } else {
        format!("{title}.{extension}")
    }
}

/// A file known to the source system, without its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub id: String,
    pub title: String,
    pub extension: String,
    /// Where the content can be downloaded from.
    pub locator: String,
}

impl FileRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        extension: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            extension: extension.into(),
            locator: locator.into(),
        }
    }

    /// Name the file is uploaded under: `title.extension`, or just the title
    /// when there is no extension.
    pub fn upload_name(&self) -> String {
        upload_name(&self.title, &self.extension)
    }
}

impl From<ContentVersionRow> for FileRecord {
    fn from(row: ContentVersionRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            extension: row.file_extension.unwrap_or_default(),
            locator: row.version_data,
        }
    }
}

/// A file's content, materialized for the duration of one upload.
pub struct FilePayload {
    pub title: String,
    pub extension: String,
    pub data: Vec<u8>,
}

impl FilePayload {
    pub fn upload_name(&self) -> String {
        upload_name(&self.title, &self.extension)
    }
}

/// Why a link row did not produce a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The linked document has no published version.
    MissingVersion,
    /// The version id was not returned by the metadata query.
    VersionNotFound,
}

/// A link row that could not be resolved to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLink {
    pub linked_entity_id: String,
    pub folder: FolderName,
    pub version_id: Option<String>,
    pub reason: SkipReason,
}

/// Files to migrate, grouped by destination folder name.
///
/// Folders keep the order in which they were first seen; files keep the order
/// in which they were added. A file appears at most once per folder.
#[derive(Debug, Default, Clone)]
pub struct Grouping {
    groups: Vec<(FolderName, Vec<FileRecord>)>,
    index: HashMap<FolderName, usize>,
    skipped: Vec<SkippedLink>,
}

impl Grouping {
    /// Add `file` to `folder`. Returns `false` if the folder already held a
    /// file with the same id.
    pub fn push(&mut self, folder: &str, file: FileRecord) -> bool {
        let position = match self.index.get(folder) {
            Some(position) => *position,
            None => {
                self.groups.push((folder.to_string(), Vec::new()));
                self.index.insert(folder.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            },
        };
        let files = &mut self.groups[position].1;
        if files.iter().any(|existing| existing.id == file.id) {
            return false;
        }
        files.push(file);
        true
    }

    pub fn skip(&mut self, link: SkippedLink) {
        self.skipped.push(link);
    }

    /// Files grouped under `folder`.
    pub fn get(&self, folder: &str) -> Option<&[FileRecord]> {
        self.index.get(folder).map(|position| self.groups[*position].1.as_slice())
    }

    /// Folder names in order of first appearance.
    pub fn folders(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    /// Number of folders.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of files across all folders.
    pub fn file_count(&self) -> usize {
        self.groups.iter().map(|(_, files)| files.len()).sum()
    }

    pub fn skipped(&self) -> &[SkippedLink] {
        &self.skipped
    }

    /// Split into the ordered groups and the skipped links.
    pub fn into_parts(self) -> (Vec<(FolderName, Vec<FileRecord>)>, Vec<SkippedLink>) {
        (self.groups, self.skipped)
    }
}

/// A file that reached its destination folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferredFile {
    /// Source record id.
    pub file_id: String,
    pub folder: FolderName,
    pub folder_id: FolderId,
    /// Name it was uploaded under.
    pub name: String,
    /// Id assigned by the destination.
    pub destination_id: String,
}

/// Summary of a completed migration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Folders resolved, in processing order.
    pub folders: Vec<FolderName>,
    pub transferred: Vec<TransferredFile>,
    pub skipped: Vec<SkippedLink>,
}
