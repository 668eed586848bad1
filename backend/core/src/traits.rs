use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::ZeoError;
use crate::types::{Document, DocumentUpload, QueryRequest, Session, Turn};

/// Raw answer body of a query, chunk by chunk.
pub type AnswerStream = BoxStream<'static, Result<Bytes, ZeoError>>;

/// The RAG backend as seen by the client.
///
/// Every call is attempted once; implementations do not retry.
#[async_trait]
pub trait RagBackend: Send + Sync {
    /// All sessions the backend knows about.
    async fn list_sessions(&self) -> Result<Vec<Session>, ZeoError>;

    /// Stored turns of one session, oldest first.
    async fn chat_history(&self, session_id: &str) -> Result<Vec<Turn>, ZeoError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), ZeoError>;

    /// Ask a question; resolves once the response headers arrive.
    async fn query(&self, request: &QueryRequest) -> Result<AnswerStream, ZeoError>;

    async fn list_documents(&self) -> Result<Vec<Document>, ZeoError>;

    async fn upload_document(&self, upload: DocumentUpload) -> Result<(), ZeoError>;
}
