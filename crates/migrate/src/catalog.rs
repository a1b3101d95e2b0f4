//! Source catalog resolution.
//!
//! Turns source queries into [`FileRecord`]s, and for scoped migrations into
//! a [`Grouping`] keyed by the display name of the record each file is
//! attached to.

use crate::error::{ErrorKind, Result};
use crate::models::{FileRecord, Grouping, SkipReason, SkippedLink};
use crosscloud_source::models::{ContentDocumentLinkRow, ContentVersionRow};
use crosscloud_source::{SourceHandle, query_as, soql};
use exn::ResultExt;
use std::collections::{HashMap, HashSet};

const VERSION_FIELDS: &str = "Id, Title, VersionData, FileExtension";
/// Largest number of ids placed in a single `IN (...)` clause.
pub const MAX_IN_LIST: usize = 100;

pub fn all_files_query() -> String {
    format!("SELECT {VERSION_FIELDS} FROM ContentVersion WHERE IsLatest = true")
}

/// Link rows for every record of `entity_type`, which must already be a
/// valid identifier.
pub fn links_query(entity_type: &str) -> String {
    format!(
        "SELECT ContentDocument.LatestPublishedVersionId, LinkedEntityId, LinkedEntity.Name \
         FROM ContentDocumentLink WHERE LinkedEntityId IN (SELECT Id FROM {entity_type})"
    )
}

pub fn versions_query(ids: &[&str]) -> String {
    format!(
        "SELECT {VERSION_FIELDS} FROM ContentVersion WHERE Id IN ({})",
        soql::in_list(ids.iter().copied())
    )
}

pub struct Catalog {
    source: SourceHandle,
}

impl Catalog {
    pub fn new(source: SourceHandle) -> Self {
        Self { source }
    }

    /// Every current file in the source system.
    pub async fn fetch_all(&self) -> Result<Vec<FileRecord>> {
        let rows: Vec<ContentVersionRow> =
            query_as(&*self.source, &all_files_query()).await.or_raise(|| ErrorKind::SourceQuery)?;
        tracing::debug!(source = self.source.name(), files = rows.len(), "Fetched file catalog");
        Ok(rows.into_iter().map(FileRecord::from).collect())
    }

    /// Files attached to records of `entity_type`, grouped by record name.
    ///
    /// Link rows that cannot be resolved to a file are collected in
    /// [`Grouping::skipped`].
    pub async fn fetch_for_entity_type(&self, entity_type: &str) -> Result<Grouping> {
        let entity_type = soql::validate_identifier(entity_type)
            .or_raise(|| ErrorKind::InvalidEntityType(entity_type.to_string()))?;
        let links: Vec<ContentDocumentLinkRow> =
            query_as(&*self.source, &links_query(entity_type)).await.or_raise(|| ErrorKind::SourceQuery)?;
        if links.is_empty() {
            tracing::info!(entity_type, "No files linked to any record");
            return Ok(Grouping::default());
        }

        let mut seen = HashSet::new();
        let version_ids: Vec<&str> = links.iter().filter_map(|link| link.version_id()).filter(|id| seen.insert(*id)).collect();
        let mut records: HashMap<String, FileRecord> = HashMap::with_capacity(version_ids.len());
        for chunk in version_ids.chunks(MAX_IN_LIST) {
            let rows: Vec<ContentVersionRow> =
                query_as(&*self.source, &versions_query(chunk)).await.or_raise(|| ErrorKind::SourceQuery)?;
            records.extend(rows.into_iter().map(|row| (row.id.clone(), FileRecord::from(row))));
        }

        let mut grouping = Grouping::default();
        for link in &links {
            let folder = link.entity_name().unwrap_or(&link.linked_entity_id);
            let reason = match link.version_id() {
                Some(id) => match records.get(id) {
                    Some(record) => {
                        grouping.push(folder, record.clone());
                        continue;
                    },
                    None => SkipReason::VersionNotFound,
                },
                None => SkipReason::MissingVersion,
            };
            tracing::warn!(
                linked_entity_id = %link.linked_entity_id,
                folder,
                version_id = link.version_id().unwrap_or_default(),
                ?reason,
                "Skipping link with no resolvable file"
            );
            grouping.skip(SkippedLink {
                linked_entity_id: link.linked_entity_id.clone(),
                folder: folder.to_string(),
                version_id: link.version_id().map(str::to_string),
                reason,
            });
        }
        tracing::debug!(
            entity_type,
            folders = grouping.len(),
            files = grouping.file_count(),
            skipped = grouping.skipped().len(),
            "Grouped linked files"
        );
        Ok(grouping)
    }
}
