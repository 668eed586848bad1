//! Core of the ZeoRAG client: domain types, the error taxonomy, the
//! streamed-answer reducer, and the `RagBackend` seam the API client sits
//! behind.

pub mod decoder;
pub mod error;
pub mod mock;
pub mod traits;
pub mod transcript;
pub mod types;

pub use decoder::Utf8StreamDecoder;
pub use error::ZeoError;
pub use mock::{AnswerPart, MockBackend, MockOp};
pub use traits::{AnswerStream, RagBackend};
pub use transcript::{reduce_stream, AnswerReducer, QueryOutcome, QueryPhase, Transcript};
pub use types::{Document, DocumentListing, DocumentUpload, QueryRequest, Role, Session, Turn};
