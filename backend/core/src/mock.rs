//! In-memory backend with scripted answers, for tests and offline demos.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};

use crate::error::ZeoError;
use crate::traits::{AnswerStream, RagBackend};
use crate::types::{Document, DocumentUpload, QueryRequest, Session, Turn};

/// Backend operations, used to script failures and inspect calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    ListSessions,
    ChatHistory,
    DeleteSession,
    Query,
    ListDocuments,
    UploadDocument,
}

/// One scripted piece of an answer stream.
#[derive(Debug, Clone)]
pub enum AnswerPart {
    Chunk(Bytes),
    /// Yield a read error at this point.
    Fail(String),
    /// Stop yielding without ever ending the stream.
    Hang,
}

#[derive(Default)]
struct MockState {
    sessions: Vec<Session>,
    histories: HashMap<String, Vec<Turn>>,
    answer: Vec<AnswerPart>,
    documents: Vec<Document>,
    failing: HashSet<MockOp>,
    calls: Vec<MockOp>,
    questions: Vec<QueryRequest>,
    uploads: Vec<String>,
}

/// A `RagBackend` that answers from memory.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, session: Session) -> Self {
        self.with_state(|s| s.sessions.push(session));
        self
    }

    pub fn with_history(self, session_id: impl Into<String>, turns: Vec<Turn>) -> Self {
        let session_id = session_id.into();
        self.with_state(|s| {
            s.histories.insert(session_id, turns);
        });
        self
    }

    /// Answer every query with these text chunks.
    pub fn with_answer(self, chunks: &[&str]) -> Self {
        let parts = chunks
            .iter()
            .map(|c| AnswerPart::Chunk(Bytes::copy_from_slice(c.as_bytes())))
            .collect();
        self.with_answer_parts(parts)
    }

    pub fn with_answer_parts(self, parts: Vec<AnswerPart>) -> Self {
        self.with_state(|s| s.answer = parts);
        self
    }

    pub fn with_documents(self, names: &[&str]) -> Self {
        self.with_state(|s| {
            s.documents = names.iter().map(|n| Document(n.to_string())).collect();
        });
        self
    }

    /// Make every call of `op` fail with a transport error.
    pub fn failing(self, op: MockOp) -> Self {
        self.with_state(|s| {
            s.failing.insert(op);
        });
        self
    }

    /// Operations invoked so far, in order.
    pub fn calls(&self) -> Vec<MockOp> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn questions(&self) -> Vec<QueryRequest> {
        self.with_state(|s| s.questions.clone())
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.with_state(|s| s.uploads.clone())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    fn record(&self, op: MockOp) -> Result<(), ZeoError> {
        self.with_state(|s| {
            s.calls.push(op);
            if s.failing.contains(&op) {
                Err(ZeoError::Transport(format!("mock {op:?} failure")))
            } else {
                Ok(())
            }
        })
    }
}

#[async_trait]
impl RagBackend for MockBackend {
    async fn list_sessions(&self) -> Result<Vec<Session>, ZeoError> {
        self.record(MockOp::ListSessions)?;
        Ok(self.with_state(|s| s.sessions.clone()))
    }

    async fn chat_history(&self, session_id: &str) -> Result<Vec<Turn>, ZeoError> {
        self.record(MockOp::ChatHistory)?;
        Ok(self.with_state(|s| s.histories.get(session_id).cloned().unwrap_or_default()))
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ZeoError> {
        self.record(MockOp::DeleteSession)?;
        self.with_state(|s| {
            s.sessions.retain(|session| session.id != session_id);
            s.histories.remove(session_id);
        });
        Ok(())
    }

    async fn query(&self, request: &QueryRequest) -> Result<AnswerStream, ZeoError> {
        self.record(MockOp::Query)?;
        let parts = self.with_state(|s| {
            s.questions.push(request.clone());
            if !s.sessions.iter().any(|session| session.name == request.session_name) {
                s.sessions.push(Session::named(request.session_name.clone()));
            }
            s.answer.clone()
        });

        let hangs = parts.iter().any(|p| matches!(p, AnswerPart::Hang));
        let items: Vec<Result<Bytes, ZeoError>> = parts
            .into_iter()
            .map_while(|p| match p {
                AnswerPart::Chunk(bytes) => Some(Ok(bytes)),
                AnswerPart::Fail(message) => Some(Err(ZeoError::Transport(message))),
                AnswerPart::Hang => None,
            })
            .collect();

        let body = stream::iter(items);
        if hangs {
            Ok(body.chain(stream::pending()).boxed())
        } else {
            Ok(body.boxed())
        }
    }

    async fn list_documents(&self) -> Result<Vec<Document>, ZeoError> {
        self.record(MockOp::ListDocuments)?;
        Ok(self.with_state(|s| s.documents.clone()))
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<(), ZeoError> {
        self.record(MockOp::UploadDocument)?;
        self.with_state(|s| {
            s.uploads.push(upload.filename.clone());
            s.documents.push(Document(upload.filename));
        });
        Ok(())
    }
}
