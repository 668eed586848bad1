//! Document panel: the corpus listing and PDF uploads.
//!
//! The listing is fetched on demand only. A successful upload marks it
//! stale rather than refetching; the front end offers a manual reload.

use std::path::Path;

use tracing::info;

use zeorag_core::{Document, DocumentUpload, RagBackend, ZeoError};
use zeorag_logging::{ClientEvent, EventLogger};

/// Shown after an upload succeeds.
pub const UPLOAD_HINT: &str = "File uploaded successfully! Reload the list to see it.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loaded,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct DocumentPanel {
    documents: Vec<Document>,
    state: LoadState,
    stale: bool,
}

impl DocumentPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// True after an upload that the listing does not reflect yet.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Fetch the listing. On failure the previous listing is kept.
    pub async fn refresh(&mut self, backend: &dyn RagBackend) -> Result<usize, ZeoError> {
        match backend.list_documents().await {
            Ok(documents) => {
                self.documents = documents;
                self.state = LoadState::Loaded;
                self.stale = false;
                info!(count = self.documents.len(), "Documents loaded");
                Ok(self.documents.len())
            }
            Err(e) => {
                EventLogger::log_event(
                    None,
                    ClientEvent::RequestFailed {
                        operation: "list_documents".into(),
                        error_msg: e.to_string(),
                    },
                );
                self.state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Upload the selected file.
    ///
    /// No selection, or a non-PDF file, is rejected before any request.
    pub async fn upload(
        &mut self,
        backend: &dyn RagBackend,
        selection: Option<DocumentUpload>,
    ) -> Result<String, ZeoError> {
        let Some(upload) = selection else {
            return Err(ZeoError::validation("Please select a file"));
        };
        if !upload.is_pdf() {
            return Err(ZeoError::validation(format!(
                "'{}' is not a PDF",
                upload.filename
            )));
        }

        let filename = upload.filename.clone();
        let bytes = upload.bytes.len();
        if let Err(e) = backend.upload_document(upload).await {
            EventLogger::log_event(
                None,
                ClientEvent::RequestFailed {
                    operation: "upload_document".into(),
                    error_msg: e.to_string(),
                },
            );
            return Err(e);
        }

        self.stale = true;
        EventLogger::log_event(
            None,
            ClientEvent::DocumentUploaded {
                filename: filename.clone(),
                bytes,
            },
        );
        Ok(filename)
    }
}

/// Read a file from disk as an upload selection.
pub async fn read_upload(path: &Path) -> Result<DocumentUpload, ZeoError> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ZeoError::validation(format!("'{}' is not a file", path.display())))?
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ZeoError::validation(format!("Cannot read {}: {e}", path.display())))?;
    Ok(DocumentUpload::new(filename, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeorag_core::{MockBackend, MockOp};

    #[tokio::test]
    async fn test_refresh_lists_documents() {
        let backend = MockBackend::new().with_documents(&["attention.pdf"]);
        let mut panel = DocumentPanel::new();
        assert_eq!(panel.state(), &LoadState::NotLoaded);
        assert_eq!(panel.refresh(&backend).await.unwrap(), 1);
        assert_eq!(panel.state(), &LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_upload_without_selection_makes_no_call() {
        let backend = MockBackend::new().with_documents(&["attention.pdf"]);
        let mut panel = DocumentPanel::new();
        panel.refresh(&backend).await.unwrap();

        let err = panel.upload(&backend, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Please select a file");
        assert_eq!(backend.calls(), vec![MockOp::ListDocuments]);
        assert_eq!(panel.documents(), &[Document("attention.pdf".into())]);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let backend = MockBackend::new();
        let mut panel = DocumentPanel::new();
        let selection = DocumentUpload::new("notes.docx", vec![1u8, 2, 3]);
        assert!(panel.upload(&backend, Some(selection)).await.is_err());
        assert!(backend.uploaded().is_empty());
    }

    #[tokio::test]
    async fn test_upload_marks_listing_stale() {
        let backend = MockBackend::new();
        let mut panel = DocumentPanel::new();
        panel.refresh(&backend).await.unwrap();

        let name = panel
            .upload(&backend, Some(DocumentUpload::new("rag.pdf", vec![1u8])))
            .await
            .unwrap();
        assert_eq!(name, "rag.pdf");
        assert!(panel.is_stale());
        assert!(panel.documents().is_empty());

        panel.refresh(&backend).await.unwrap();
        assert!(!panel.is_stale());
        assert_eq!(panel.documents(), &[Document("rag.pdf".into())]);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_listing() {
        let backend = MockBackend::new().failing(MockOp::ListDocuments);
        let mut panel = DocumentPanel::new();
        assert!(panel.refresh(&backend).await.is_err());
        assert!(matches!(panel.state(), LoadState::Failed(_)));
    }

    #[tokio::test]
    async fn test_read_upload_from_disk() {
        let path = std::env::temp_dir().join(format!("zeorag-upload-{}.pdf", std::process::id()));
        tokio::fs::write(&path, b"%PDF-1.7").await.unwrap();
        let upload = read_upload(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();
        assert!(upload.is_pdf());
        assert_eq!(upload.bytes.len(), 8);
    }
}
