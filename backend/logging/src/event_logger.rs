//! Client Event Logger
//!
//! Structured client events (queries, session and document changes,
//! failed requests) routed through `tracing`. This is where failures that
//! never reach the transcript are reported.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    QueryStarted {
        question: String,
    },
    QuerySettled {
        outcome: String,
        chunks: usize,
        answer_chars: usize,
    },
    SessionCreated,
    SessionDeleted,
    DocumentUploaded {
        filename: String,
        bytes: usize,
    },
    RequestFailed {
        operation: String,
        error_msg: String,
    },
}

impl ClientEvent {
    fn is_failure(&self) -> bool {
        match self {
            ClientEvent::RequestFailed { .. } => true,
            ClientEvent::QuerySettled { outcome, .. } => outcome != "completed",
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub event: ClientEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Logs a client event, redacting free-text fields first.
    pub fn log_event(session_id: Option<&str>, mut event: ClientEvent) {
        match &mut event {
            ClientEvent::QueryStarted { question } => {
                *question = redact_sensitive_data(question);
            }
            ClientEvent::RequestFailed { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            _ => {}
        }

        let entry = EventLogEntry {
            session_id: session_id.map(str::to_string),
            timestamp: Utc::now(),
            event,
        };

        let json = serde_json::to_string(&entry).unwrap_or_default();
        if entry.event.is_failure() {
            warn!(target: "client_events", event = %json, "Client event");
        } else {
            info!(target: "client_events", event = %json, "Client event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_tag() {
        let entry = EventLogEntry {
            session_id: Some("s1".into()),
            timestamp: Utc::now(),
            event: ClientEvent::RequestFailed {
                operation: "list_sessions".into(),
                error_msg: "connection refused".into(),
            },
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["event"]["type"], "request_failed");
        assert_eq!(value["session_id"], "s1");
    }

    #[test]
    fn test_failure_classification() {
        assert!(ClientEvent::QuerySettled {
            outcome: "interrupted".into(),
            chunks: 2,
            answer_chars: 10
        }
        .is_failure());
        assert!(!ClientEvent::SessionDeleted.is_failure());
    }
}
