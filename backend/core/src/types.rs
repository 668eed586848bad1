use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Author of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking. Older histories label it `human`.
    #[serde(alias = "human")]
    User,
    /// The backend's answer. Older histories label it `ai`.
    #[serde(alias = "ai")]
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One question or answer in a session's transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat session as known to the client.
///
/// `id` keys history lookup and deletion; `name` labels the session in
/// queries and listings. Sessions created client-side use the same string
/// for both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SessionRecord")]
pub struct Session {
    #[serde(rename = "session_id")]
    pub id: String,
    #[serde(rename = "session_name")]
    pub name: String,
}

impl Session {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// A session whose id doubles as its name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
        }
    }
}

/// Wire shape of a session entry in `GET /sessions`.
#[derive(Deserialize)]
struct SessionRecord {
    session_id: String,
    #[serde(default)]
    session_name: Option<String>,
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        let name = match record.session_name {
            Some(name) if !name.is_empty() => name,
            _ => record.session_id.clone(),
        };
        Self {
            id: record.session_id,
            name,
        }
    }
}

/// A document in the backend corpus, identified by file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(pub String);

impl Document {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `GET /list_documents`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentListing {
    #[serde(default)]
    pub documents: Vec<Document>,
}

/// Body of `POST /query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub session_name: String,
}

/// A file chosen for upload to the corpus.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub bytes: Bytes,
}

impl DocumentUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Whether the file name carries a `.pdf` extension (any case).
    pub fn is_pdf(&self) -> bool {
        self.filename.to_ascii_lowercase().ends_with(".pdf")
    }
}
