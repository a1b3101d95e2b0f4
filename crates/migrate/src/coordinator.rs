//! Migration modes.
//!
//! Both modes run on the calling task, one file at a time, and stop at the
//! first error. Files already transferred before the failure stay at the
//! destination and are visible in the `Transferred file` log lines.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::folders::FolderResolver;
use crate::models::{FileRecord, MigrationReport};
use crate::transfer::Transfer;
use crosscloud_destination::DestinationHandle;
use crosscloud_source::SourceHandle;
use std::sync::Arc;

/// Folder that receives every file in [`Migrator::migrate_all`].
pub const DEFAULT_ROOT_FOLDER: &str = "root";

/// Runs migrations from a source into a destination.
///
/// A `Migrator` is cheap to share behind an [`Arc`]; the folder cache it
/// holds is shared by every run.
pub struct Migrator {
    catalog: Catalog,
    folders: Arc<FolderResolver>,
    transfer: Transfer,
    root_folder: String,
}

impl Migrator {
    pub fn new(source: SourceHandle, destination: DestinationHandle, folders: Arc<FolderResolver>) -> Self {
        Self {
            catalog: Catalog::new(source.clone()),
            folders,
            transfer: Transfer::new(source, destination),
            root_folder: DEFAULT_ROOT_FOLDER.to_string(),
        }
    }

    pub fn with_root_folder(mut self, name: impl Into<String>) -> Self {
        self.root_folder = name.into();
        self
    }

    pub fn folders(&self) -> &FolderResolver {
        &self.folders
    }

    /// Copy every current file into the root folder.
    pub async fn migrate_all(&self, grantee: Option<&str>) -> Result<MigrationReport> {
        let files = self.catalog.fetch_all().await?;
        tracing::info!(files = files.len(), folder = %self.root_folder, "Migrating all files");
        let mut report = MigrationReport::default();
        if !files.is_empty() {
            self.migrate_group(&self.root_folder, &files, grantee, &mut report).await?;
        }
        tracing::info!(transferred = report.transferred.len(), "Migration complete");
        Ok(report)
    }

    /// Copy the files attached to records of `entity_type`, one folder per
    /// record name.
    pub async fn migrate_by_entity_type(&self, entity_type: &str, grantee: Option<&str>) -> Result<MigrationReport> {
        let grouping = self.catalog.fetch_for_entity_type(entity_type).await?;
        tracing::info!(
            entity_type,
            folders = grouping.len(),
            files = grouping.file_count(),
            "Migrating files by record"
        );
        let (groups, skipped) = grouping.into_parts();
        let mut report = MigrationReport {
            skipped,
            ..MigrationReport::default()
        };
        for (folder, files) in &groups {
            self.migrate_group(folder, files, grantee, &mut report).await?;
        }
        tracing::info!(
            entity_type,
            folders = report.folders.len(),
            transferred = report.transferred.len(),
            skipped = report.skipped.len(),
            "Migration complete"
        );
        Ok(report)
    }

    async fn migrate_group(
        &self,
        folder: &str,
        files: &[FileRecord],
        grantee: Option<&str>,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let folder_id = self.folders.resolve_or_create(folder, grantee).await?;
        report.folders.push(folder.to_string());
        for file in files {
            let transferred = self.transfer.transfer(file, folder, &folder_id).await?;
            report.transferred.push(transferred);
        }
        Ok(())
    }
}
