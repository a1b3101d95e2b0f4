//! Moves a single file from the source into a destination folder.

use crate::error::{ErrorKind, Result, TransferStage};
use crate::models::{FilePayload, FileRecord, TransferredFile};
use crosscloud_destination::{DestinationHandle, FolderId};
use crosscloud_source::SourceHandle;
use exn::ResultExt;

pub struct Transfer {
    source: SourceHandle,
    destination: DestinationHandle,
}

impl Transfer {
    pub fn new(source: SourceHandle, destination: DestinationHandle) -> Self {
        Self { source, destination }
    }

    /// Download the content behind `file`'s locator.
    pub async fn fetch(&self, file: &FileRecord) -> Result<FilePayload> {
        let data = self.source.download(&file.locator).await.or_raise(|| ErrorKind::SourceDownload)?;
        Ok(FilePayload {
            title: file.title.clone(),
            extension: file.extension.clone(),
            data,
        })
    }

    /// Copy `file` into `folder_id`, which is known as `folder`.
    ///
    /// The whole payload is held in memory for the duration of the upload.
    pub async fn transfer(&self, file: &FileRecord, folder: &str, folder_id: &FolderId) -> Result<TransferredFile> {
        let failed = |stage| ErrorKind::Transfer {
            file_id: file.id.clone(),
            stage,
        };
        let payload = self.fetch(file).await.or_raise(|| failed(TransferStage::Download))?;
        let name = payload.upload_name();
        let size = payload.data.len();
        let destination_id = self
            .destination
            .create_file(&name, folder_id, payload.data)
            .await
            .or_raise(|| ErrorKind::DestinationUpload)
            .or_raise(|| failed(TransferStage::Upload))?;
        tracing::info!(file_id = %file.id, folder, name = %name, size, destination_id = %destination_id, "Transferred file");
        Ok(TransferredFile {
            file_id: file.id.clone(),
            folder: folder.to_string(),
            folder_id: folder_id.clone(),
            name,
            destination_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosscloud_destination::MockDestination;
    use crosscloud_source::MockSource;
    use std::sync::Arc;

    fn resume() -> FileRecord {
        FileRecord::new("0681", "Resume", "pdf", "/blob/0681")
    }

    #[tokio::test]
    async fn test_transfer_uploads_under_full_name() {
        let source = Arc::new(MockSource::default().with_blob("/blob/0681", b"%PDF-1.7".to_vec()));
        let drive = Arc::new(MockDestination::with_folders([("f1", "Acme Corp")]));
        let transferred = Transfer::new(source.clone(), drive.clone())
            .transfer(&resume(), "Acme Corp", &FolderId::new("f1"))
            .await
            .unwrap();
        assert_eq!(transferred.name, "Resume.pdf");
        assert_eq!(transferred.folder, "Acme Corp");
        let files = drive.files().await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "Resume.pdf");
        assert_eq!(files[0].parent, FolderId::new("f1"));
        assert_eq!(files[0].data, b"%PDF-1.7");
        assert_eq!(files[0].id, transferred.destination_id);
        assert_eq!(source.downloads().await, ["/blob/0681"]);
    }

    #[tokio::test]
    async fn test_download_failure_skips_upload() {
        let source = Arc::new(MockSource::default().with_failing_download("/blob/0681"));
        let drive = Arc::new(MockDestination::with_folders([("f1", "Acme Corp")]));
        let err = Transfer::new(source, drive.clone())
            .transfer(&resume(), "Acme Corp", &FolderId::new("f1"))
            .await
            .unwrap_err();
        assert_eq!(
            *err,
            ErrorKind::Transfer {
                file_id: "0681".to_string(),
                stage: TransferStage::Download,
            }
        );
        assert!(drive.upload_attempts().await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure() {
        let source = Arc::new(MockSource::default().with_blob("/blob/0681", b"%PDF".to_vec()));
        let drive = Arc::new(MockDestination::with_folders([("f1", "Acme Corp")]).with_failing_upload("Resume.pdf"));
        let err = Transfer::new(source, drive)
            .transfer(&resume(), "Acme Corp", &FolderId::new("f1"))
            .await
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::Transfer { stage: TransferStage::Upload, .. }));
    }
}
