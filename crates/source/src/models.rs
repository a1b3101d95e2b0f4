//! Row shapes returned by the Salesforce query API.
//!
//! Only the fields crosscloud selects are modelled. Relationship fields
//! (`LinkedEntity.Name`, `ContentDocument.LatestPublishedVersionId`) arrive
//! as nested objects and may be `null` when the related record is missing or
//! has no such field.

use serde::Deserialize;

/// A `ContentVersion` row: one version of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentVersionRow {
    pub id: String,
    pub title: String,
    /// Relative URL of the binary content, e.g.
    /// `/services/data/v58.0/sobjects/ContentVersion/068.../VersionData`.
    pub version_data: String,
    #[serde(default)]
    pub file_extension: Option<String>,
}

/// A `ContentDocumentLink` row joining a document to the record it is
/// attached to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentDocumentLinkRow {
    pub linked_entity_id: String,
    #[serde(default)]
    pub linked_entity: Option<LinkedEntity>,
    #[serde(default)]
    pub content_document: Option<ContentDocumentRef>,
}

impl ContentDocumentLinkRow {
    /// Id of the latest published version of the linked document, if any.
    pub fn version_id(&self) -> Option<&str> {
        self.content_document.as_ref()?.latest_published_version_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Display name of the linked record, if it has one.
    pub fn entity_name(&self) -> Option<&str> {
        self.linked_entity.as_ref()?.name.as_deref().filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinkedEntity {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentDocumentRef {
    #[serde(default)]
    pub latest_published_version_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_version_from_query_record() {
        let row: ContentVersionRow = serde_json::from_value(json!({
            "attributes": { "type": "ContentVersion", "url": "/services/data/v58.0/sobjects/ContentVersion/0681" },
            "Id": "0681",
            "Title": "Resume",
            "VersionData": "/services/data/v58.0/sobjects/ContentVersion/0681/VersionData",
            "FileExtension": "pdf"
        }))
        .unwrap();
        assert_eq!(row.id, "0681");
        assert_eq!(row.title, "Resume");
        assert_eq!(row.file_extension.as_deref(), Some("pdf"));
    }

    #[test]
    fn link_row_with_nested_relationships() {
        let row: ContentDocumentLinkRow = serde_json::from_value(json!({
            "attributes": { "type": "ContentDocumentLink" },
            "LinkedEntityId": "001A",
            "LinkedEntity": { "attributes": { "type": "Name" }, "Name": "Acme Corp" },
            "ContentDocument": { "attributes": { "type": "ContentDocument" }, "LatestPublishedVersionId": "0681" }
        }))
        .unwrap();
        assert_eq!(row.entity_name(), Some("Acme Corp"));
        assert_eq!(row.version_id(), Some("0681"));
    }

    #[test]
    fn link_row_with_null_relationships() {
        let row: ContentDocumentLinkRow = serde_json::from_value(json!({
            "LinkedEntityId": "001B",
            "LinkedEntity": null,
            "ContentDocument": { "LatestPublishedVersionId": null }
        }))
        .unwrap();
        assert_eq!(row.entity_name(), None);
        assert_eq!(row.version_id(), None);
    }
}
