//! View-level state of the ZeoRAG client.
//!
//! Front ends drive a `Shell`, which owns the session store, the document
//! panel, and the chat view of the active session.

pub mod chat;
pub mod documents;
pub mod notice;
pub mod sessions;
pub mod shell;

pub use chat::{pump_answer, ChatEvent, ChatView, QueryTicket, StreamEvent};
pub use documents::{read_upload, DocumentPanel, LoadState};
pub use notice::{Notice, NoticeLevel};
pub use sessions::{Deleted, SessionEntry, SessionOrigin, SessionStore};
pub use shell::{Shell, View};
