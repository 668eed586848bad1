//! Telemetry and structured logging for the ZeoRAG client.
//!
//! Handles log redaction, JSON file output with rotation, and client event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{ClientEvent, EventLogEntry, EventLogger};
pub use logger::{init_logger, LogTarget};
pub use redact::redact_sensitive_data;
