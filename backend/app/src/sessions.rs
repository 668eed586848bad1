//! Session store: the sessions the client knows about and which one is active.
//!
//! Sessions created here are `Local` until a query under their name
//! settles; the backend creates its record from that first query, so there
//! is no create call.

use tracing::{info, warn};

use zeorag_core::{RagBackend, Session, ZeoError};
use zeorag_logging::{ClientEvent, EventLogger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// Created client-side, not yet seen by the backend.
    Local,
    /// Listed by the backend or confirmed by a settled query.
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub session: Session,
    pub origin: SessionOrigin,
}

/// Result of a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deleted {
    pub was_active: bool,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    entries: Vec<SessionEntry>,
    active: Option<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    pub fn is_active(&self, session_id: &str) -> bool {
        self.active.as_ref().is_some_and(|s| s.id == session_id)
    }

    pub fn get(&self, session_id: &str) -> Option<&SessionEntry> {
        self.entries.iter().find(|e| e.session.id == session_id)
    }

    /// Replace the held set with the backend's list.
    ///
    /// Local sessions the backend does not list yet are kept. Duplicate ids
    /// keep their first occurrence. On failure nothing changes.
    pub async fn load(&mut self, backend: &dyn RagBackend) -> Result<usize, ZeoError> {
        let sessions = match backend.list_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => {
                EventLogger::log_event(
                    None,
                    ClientEvent::RequestFailed {
                        operation: "list_sessions".into(),
                        error_msg: e.to_string(),
                    },
                );
                return Err(e);
            }
        };

        let locals: Vec<SessionEntry> = self
            .entries
            .drain(..)
            .filter(|e| e.origin == SessionOrigin::Local)
            .collect();

        for session in sessions {
            if self.get(&session.id).is_none() {
                self.entries.push(SessionEntry {
                    session,
                    origin: SessionOrigin::Remote,
                });
            }
        }
        for local in locals {
            if self.get(&local.session.id).is_none() {
                self.entries.push(local);
            }
        }

        info!(count = self.entries.len(), "Sessions loaded");
        Ok(self.entries.len())
    }

    /// Make a session active.
    pub fn select(&mut self, session_id: &str, name: &str) -> Session {
        let session = Session::new(session_id, name);
        self.active = Some(session.clone());
        session
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Create a session from user input and make it active.
    ///
    /// The trimmed input is both id and name. An id already held is selected
    /// as is.
    pub fn create(&mut self, raw: &str) -> Result<SessionEntry, ZeoError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ZeoError::validation("Enter a session name first"));
        }

        let entry = match self.get(name) {
            Some(existing) => existing.clone(),
            None => {
                let entry = SessionEntry {
                    session: Session::named(name),
                    origin: SessionOrigin::Local,
                };
                self.entries.push(entry.clone());
                EventLogger::log_event(Some(name), ClientEvent::SessionCreated);
                entry
            }
        };
        self.select(&entry.session.id, &entry.session.name);
        Ok(entry)
    }

    /// Mark the local session with this name as known to the backend.
    pub fn confirm(&mut self, name: &str) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|e| e.session.name == name && e.origin == SessionOrigin::Local)
        {
            Some(entry) => {
                entry.origin = SessionOrigin::Remote;
                true
            }
            None => false,
        }
    }

    /// Delete a session.
    ///
    /// Local sessions are dropped without a backend call. Remote sessions
    /// are dropped only once the backend confirms; a failed delete leaves
    /// the store untouched.
    pub async fn delete(
        &mut self,
        backend: &dyn RagBackend,
        session_id: &str,
    ) -> Result<Deleted, ZeoError> {
        let origin = self.get(session_id).map(|e| e.origin);
        if origin != Some(SessionOrigin::Local) {
            if let Err(e) = backend.delete_session(session_id).await {
                warn!(session_id, error = %e, "Session delete failed");
                EventLogger::log_event(
                    Some(session_id),
                    ClientEvent::RequestFailed {
                        operation: "delete_session".into(),
                        error_msg: e.to_string(),
                    },
                );
                return Err(e);
            }
        }

        self.entries.retain(|e| e.session.id != session_id);
        let was_active = self.is_active(session_id);
        if was_active {
            self.active = None;
        }
        EventLogger::log_event(Some(session_id), ClientEvent::SessionDeleted);
        Ok(Deleted { was_active })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeorag_core::{MockBackend, MockOp};

    #[tokio::test]
    async fn test_load_dedups_and_keeps_locals() {
        let backend = MockBackend::new()
            .with_session(Session::new("a", "alpha"))
            .with_session(Session::new("a", "alpha again"))
            .with_session(Session::new("b", "beta"));
        let mut store = SessionStore::new();
        store.create("draft").unwrap();

        assert_eq!(store.load(&backend).await.unwrap(), 3);
        let ids: Vec<&str> = store.entries().iter().map(|e| e.session.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "draft"]);
        assert_eq!(store.get("a").unwrap().session.name, "alpha");
        assert_eq!(store.get("draft").unwrap().origin, SessionOrigin::Local);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_state() {
        let backend = MockBackend::new().failing(MockOp::ListSessions);
        let mut store = SessionStore::new();
        store.create("keep").unwrap();
        assert!(store.load(&backend).await.is_err());
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn test_create_rejects_blank_input() {
        let mut store = SessionStore::new();
        assert!(matches!(store.create("   "), Err(ZeoError::Validation(_))));
        assert!(store.entries().is_empty());
        assert!(store.active().is_none());
    }

    #[test]
    fn test_create_selects_and_keeps_ids_unique() {
        let mut store = SessionStore::new();
        let entry = store.create(" thesis ").unwrap();
        assert_eq!(entry.session, Session::named("thesis"));
        store.create("thesis").unwrap();
        assert_eq!(store.entries().len(), 1);
        assert!(store.is_active("thesis"));
    }

    #[test]
    fn test_confirm_promotes_local() {
        let mut store = SessionStore::new();
        store.create("new").unwrap();
        assert!(store.confirm("new"));
        assert_eq!(store.get("new").unwrap().origin, SessionOrigin::Remote);
        assert!(!store.confirm("new"));
    }

    #[tokio::test]
    async fn test_delete_active_remote_session() {
        let backend = MockBackend::new()
            .with_session(Session::new("s1", "one"))
            .with_session(Session::new("s2", "two"));
        let mut store = SessionStore::new();
        store.load(&backend).await.unwrap();
        store.select("s2", "two");

        let deleted = store.delete(&backend, "s2").await.unwrap();
        assert!(deleted.was_active);
        assert!(store.active().is_none());
        assert!(store.get("s2").is_none());
        assert!(backend.calls().contains(&MockOp::DeleteSession));
    }

    #[tokio::test]
    async fn test_delete_local_skips_backend() {
        let backend = MockBackend::new();
        let mut store = SessionStore::new();
        store.create("scratch").unwrap();
        store.delete(&backend, "scratch").await.unwrap();
        assert!(store.entries().is_empty());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_entry() {
        let backend = MockBackend::new()
            .with_session(Session::new("s1", "one"))
            .failing(MockOp::DeleteSession);
        let mut store = SessionStore::new();
        store.load(&backend).await.unwrap();
        store.select("s1", "one");

        assert!(store.delete(&backend, "s1").await.is_err());
        assert!(store.get("s1").is_some());
        assert!(store.is_active("s1"));
    }
}
