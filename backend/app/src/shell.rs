//! Shell: the two-pane view toggle wired to the session store, document
//! panel, and chat view.
//!
//! Every failure ends up as a banner `Notice`; none of them unwinds state
//! that was already applied.

use std::sync::Arc;

use tracing::info;

use zeorag_core::{DocumentUpload, QueryOutcome, RagBackend, ZeoError};

use crate::chat::{ChatEvent, ChatView, QueryTicket, StreamEvent};
use crate::documents::{DocumentPanel, UPLOAD_HINT};
use crate::notice::Notice;
use crate::sessions::{SessionOrigin, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Chat,
    Files,
}

impl View {
    pub fn toggled(self) -> Self {
        match self {
            View::Chat => View::Files,
            View::Files => View::Chat,
        }
    }

    /// Label for the control that switches away from this view.
    pub fn toggle_label(self) -> &'static str {
        match self {
            View::Chat => "Papers",
            View::Files => "Chat",
        }
    }
}

pub struct Shell {
    backend: Arc<dyn RagBackend>,
    view: View,
    sessions: SessionStore,
    documents: DocumentPanel,
    chat: ChatView,
    epoch: u64,
    notice: Option<Notice>,
}

impl Shell {
    pub fn new(backend: Arc<dyn RagBackend>) -> Self {
        Self {
            backend,
            view: View::Chat,
            sessions: SessionStore::new(),
            documents: DocumentPanel::new(),
            chat: ChatView::new(0, None),
            epoch: 0,
            notice: None,
        }
    }

    pub fn backend(&self) -> Arc<dyn RagBackend> {
        Arc::clone(&self.backend)
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn documents(&self) -> &DocumentPanel {
        &self.documents
    }

    pub fn chat(&self) -> &ChatView {
        &self.chat
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Show a banner raised by the front end itself.
    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Initial fetch of sessions and documents.
    pub async fn start(&mut self) {
        self.reload_sessions().await;
        self.refresh_documents().await;
    }

    pub fn toggle_view(&mut self) -> View {
        self.view = self.view.toggled();
        self.view
    }

    pub async fn reload_sessions(&mut self) {
        if let Err(e) = self.sessions.load(self.backend.as_ref()).await {
            self.notice = Some(Notice::from_error("load sessions", &e));
        }
    }

    /// Activate a session and rebuild the chat view around it.
    ///
    /// Any query streaming into the previous view is cancelled.
    pub async fn select_session(&mut self, session_id: &str, name: &str) {
        let session = self.sessions.select(session_id, name);
        let fetch_history = self
            .sessions
            .get(session_id)
            .map_or(true, |e| e.origin == SessionOrigin::Remote);

        let epoch = self.next_epoch();
        self.replace_chat(ChatView::new(epoch, Some(session)));
        info!(session_id, epoch, "Session selected");

        if fetch_history {
            if let Err(e) = self.chat.load_history(self.backend.as_ref()).await {
                self.notice = Some(Notice::from_error("load chat history", &e));
            }
        }
    }

    pub async fn create_session(&mut self, raw: &str) -> bool {
        match self.sessions.create(raw) {
            Ok(entry) => {
                self.select_session(&entry.session.id, &entry.session.name)
                    .await;
                true
            }
            Err(e) => {
                self.notice = Some(Notice::from_error("create session", &e));
                false
            }
        }
    }

    pub async fn delete_session(&mut self, session_id: &str) -> bool {
        match self.sessions.delete(self.backend.as_ref(), session_id).await {
            Ok(deleted) => {
                if deleted.was_active {
                    let epoch = self.next_epoch();
                    self.replace_chat(ChatView::new(epoch, None));
                }
                true
            }
            Err(e) => {
                self.notice = Some(Notice::from_error("delete session", &e));
                false
            }
        }
    }

    /// Submit a question to the active chat.
    ///
    /// The caller streams the answer with `chat::pump_answer` and feeds the
    /// events back through `apply`.
    pub fn submit(&mut self, question: &str) -> Option<QueryTicket> {
        match self.chat.submit(question) {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                self.notice = Some(Notice::from_error("send question", &e));
                None
            }
        }
    }

    pub fn apply(&mut self, event: ChatEvent) -> Option<QueryOutcome> {
        let answered = event.epoch == self.chat.epoch()
            && matches!(event.event, StreamEvent::Chunk(_))
            && self.chat.is_busy();
        let outcome = self.chat.apply(event);
        // answer bytes mean the backend has stored the session
        if answered {
            self.confirm_chat_session();
        }
        let outcome = outcome?;
        self.settle(&outcome);
        Some(outcome)
    }

    /// Submit and stream a question to completion in place.
    pub async fn ask<F>(&mut self, question: &str, on_delta: F) -> Result<QueryOutcome, ZeoError>
    where
        F: FnMut(&str),
    {
        let backend = self.backend();
        match self.chat.ask(backend.as_ref(), question, on_delta).await {
            Ok(outcome) => {
                self.settle(&outcome);
                Ok(outcome)
            }
            Err(e) => {
                self.notice = Some(Notice::from_error("send question", &e));
                Err(e)
            }
        }
    }

    pub async fn refresh_documents(&mut self) {
        if let Err(e) = self.documents.refresh(self.backend.as_ref()).await {
            self.notice = Some(Notice::from_error("load documents", &e));
        }
    }

    pub async fn upload(&mut self, selection: Option<DocumentUpload>) -> bool {
        match self.documents.upload(self.backend.as_ref(), selection).await {
            Ok(_) => {
                self.notice = Some(Notice::info(UPLOAD_HINT));
                true
            }
            Err(e) => {
                self.notice = Some(Notice::from_error("upload document", &e));
                false
            }
        }
    }

    fn next_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    fn replace_chat(&mut self, chat: ChatView) {
        let mut old = std::mem::replace(&mut self.chat, chat);
        if old.cancel().is_some() {
            info!(epoch = old.epoch(), "Cancelled in-flight query of previous session");
        }
    }

    fn confirm_chat_session(&mut self) {
        if let Some(session) = self.chat.session() {
            let name = session.name.clone();
            if self.sessions.confirm(&name) {
                info!(session = %name, "Session confirmed by backend");
            }
        }
    }

    /// A query that completed, or got any answer bytes before it stopped,
    /// has registered its session with the backend.
    fn settle(&mut self, outcome: &QueryOutcome) {
        if outcome.is_completed() || outcome.chunks() > 0 {
            self.confirm_chat_session();
        }
        if let QueryOutcome::Interrupted { error, .. } = outcome {
            self.notice = Some(Notice::error(format!("Answer interrupted: {error}")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{pump_answer, NO_SESSION_PLACEHOLDER};
    use crate::documents::LoadState;
    use bytes::Bytes;
    use tokio::sync::mpsc;
    use zeorag_core::{AnswerPart, MockBackend, MockOp, Session, Turn};

    fn shell(backend: &MockBackend) -> Shell {
        Shell::new(Arc::new(backend.clone()))
    }

    #[tokio::test]
    async fn test_start_loads_sessions_and_documents() {
        let backend = MockBackend::new()
            .with_session(Session::new("s1", "one"))
            .with_documents(&["a.pdf", "b.pdf"]);
        let mut shell = shell(&backend);
        shell.start().await;
        assert_eq!(shell.sessions().entries().len(), 1);
        assert_eq!(shell.documents().documents().len(), 2);
        assert!(shell.notice().is_none());
    }

    #[tokio::test]
    async fn test_start_failure_becomes_notice() {
        let backend = MockBackend::new().failing(MockOp::ListSessions);
        let mut shell = shell(&backend);
        shell.start().await;
        assert!(shell.notice().unwrap().is_error());
        assert_eq!(shell.documents().state(), &LoadState::Loaded);
    }

    #[test]
    fn test_toggle_view() {
        let mut shell = shell(&MockBackend::new());
        assert_eq!(shell.view().toggle_label(), "Papers");
        assert_eq!(shell.toggle_view(), View::Files);
        assert_eq!(shell.view().toggle_label(), "Chat");
        assert_eq!(shell.toggle_view(), View::Chat);
    }

    #[tokio::test]
    async fn test_select_then_ask_scenario() {
        let backend = MockBackend::new()
            .with_session(Session::named("s1"))
            .with_history("s1", vec![Turn::user("hi")])
            .with_answer(&["I am ", "fine, thanks."]);
        let mut shell = shell(&backend);
        shell.start().await;
        shell.select_session("s1", "s1").await;

        let outcome = shell.ask("how are you?", |_| {}).await.unwrap();
        assert!(outcome.is_completed());
        assert_eq!(
            shell.chat().transcript().turns(),
            &[
                Turn::user("hi"),
                Turn::user("how are you?"),
                Turn::assistant("I am fine, thanks."),
            ]
        );
    }

    #[tokio::test]
    async fn test_created_session_confirmed_by_first_answer() {
        let backend = MockBackend::new().with_answer(&["ok"]);
        let mut shell = shell(&backend);
        assert!(shell.create_session("fresh").await);
        assert_eq!(
            shell.sessions().get("fresh").unwrap().origin,
            SessionOrigin::Local
        );
        // no history fetch for a session the backend has never seen
        assert!(!backend.calls().contains(&MockOp::ChatHistory));

        shell.ask("hello", |_| {}).await.unwrap();
        assert_eq!(
            shell.sessions().get("fresh").unwrap().origin,
            SessionOrigin::Remote
        );
    }

    #[tokio::test]
    async fn test_blank_session_name_is_rejected() {
        let backend = MockBackend::new();
        let mut shell = shell(&backend);
        assert!(!shell.create_session("  ").await);
        assert!(shell.sessions().active().is_none());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_switching_session_discards_stream() {
        let backend = MockBackend::new()
            .with_session(Session::named("s1"))
            .with_session(Session::named("s2"))
            .with_history("s2", vec![Turn::user("older question")])
            .with_answer_parts(vec![
                AnswerPart::Chunk(Bytes::from_static(b"for s1 ")),
                AnswerPart::Hang,
            ]);
        let mut shell = shell(&backend);
        shell.start().await;
        shell.select_session("s1", "s1").await;

        let ticket = shell.submit("question for s1").unwrap();
        let cancel = ticket.cancel.clone();
        let (tx, mut rx) = mpsc::channel(16);
        let task = tokio::spawn(pump_answer(shell.backend(), ticket, tx));

        let first = rx.recv().await.unwrap();
        let stale_epoch = first.epoch;
        shell.apply(first);

        shell.select_session("s2", "s2").await;
        assert!(cancel.is_cancelled());
        task.await.unwrap();

        // a late event from the old stream has no effect
        shell.apply(ChatEvent {
            epoch: stale_epoch,
            event: StreamEvent::Chunk(Bytes::from_static(b"leaked")),
        });
        assert_eq!(
            shell.chat().transcript().turns(),
            &[Turn::user("older question")]
        );
        assert!(!shell.chat().is_busy());
    }

    #[tokio::test]
    async fn test_deleting_active_session_clears_chat() {
        let backend = MockBackend::new()
            .with_session(Session::named("s1"))
            .with_session(Session::named("s2"))
            .with_history("s2", vec![Turn::user("q"), Turn::assistant("a")]);
        let mut shell = shell(&backend);
        shell.start().await;
        shell.select_session("s2", "s2").await;
        assert_eq!(shell.chat().transcript().len(), 2);

        assert!(shell.delete_session("s2").await);
        assert!(shell.sessions().active().is_none());
        assert!(shell.chat().session().is_none());
        assert_eq!(shell.chat().placeholder(), Some(NO_SESSION_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_deleting_other_session_keeps_chat() {
        let backend = MockBackend::new()
            .with_session(Session::named("s1"))
            .with_session(Session::named("s2"))
            .with_history("s1", vec![Turn::user("q")]);
        let mut shell = shell(&backend);
        shell.start().await;
        shell.select_session("s1", "s1").await;

        assert!(shell.delete_session("s2").await);
        assert!(shell.sessions().is_active("s1"));
        assert_eq!(shell.chat().transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_without_file() {
        let backend = MockBackend::new().with_documents(&["a.pdf"]);
        let mut shell = shell(&backend);
        shell.start().await;
        let calls_before = backend.calls().len();

        assert!(!shell.upload(None).await);
        assert_eq!(shell.notice().unwrap().message, "Please select a file");
        assert_eq!(backend.calls().len(), calls_before);
        assert_eq!(shell.documents().documents().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_success_shows_reload_hint() {
        let backend = MockBackend::new();
        let mut shell = shell(&backend);
        assert!(shell.upload(Some(DocumentUpload::new("p.pdf", vec![1u8]))).await);
        assert_eq!(shell.notice().unwrap().message, UPLOAD_HINT);
        assert!(shell.documents().is_stale());
    }

    #[tokio::test]
    async fn test_interrupted_answer_raises_notice() {
        let backend = MockBackend::new().with_answer_parts(vec![
            AnswerPart::Chunk(Bytes::from_static(b"half")),
            AnswerPart::Fail("reset by peer".into()),
        ]);
        let mut shell = shell(&backend);
        shell.create_session("s").await;
        let outcome = shell.ask("q", |_| {}).await.unwrap();

        assert!(matches!(outcome, QueryOutcome::Interrupted { chunks: 1, .. }));
        assert_eq!(shell.chat().transcript().last(), Some(&Turn::assistant("half")));
        assert!(shell.notice().unwrap().message.starts_with("Answer interrupted"));
        assert_eq!(
            shell.sessions().get("s").unwrap().origin,
            SessionOrigin::Remote
        );
    }

    #[tokio::test]
    async fn test_interrupted_before_any_bytes_stays_local() {
        let backend =
            MockBackend::new().with_answer_parts(vec![AnswerPart::Fail("refused".into())]);
        let mut shell = shell(&backend);
        shell.create_session("s").await;
        let outcome = shell.ask("q", |_| {}).await.unwrap();

        assert!(matches!(outcome, QueryOutcome::Interrupted { chunks: 0, .. }));
        assert_eq!(
            shell.sessions().get("s").unwrap().origin,
            SessionOrigin::Local
        );
    }

    #[tokio::test]
    async fn test_cancelled_session_history_fetched_on_reselect() {
        let backend = MockBackend::new()
            .with_session(Session::named("s1"))
            .with_history(
                "fresh",
                vec![Turn::user("first question"), Turn::assistant("partial")],
            )
            .with_answer_parts(vec![
                AnswerPart::Chunk(Bytes::from_static(b"partial")),
                AnswerPart::Hang,
            ]);
        let mut shell = shell(&backend);
        shell.start().await;
        assert!(shell.create_session("fresh").await);

        let ticket = shell.submit("first question").unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        let task = tokio::spawn(pump_answer(shell.backend(), ticket, tx));
        shell.apply(rx.recv().await.unwrap());
        assert_eq!(
            shell.sessions().get("fresh").unwrap().origin,
            SessionOrigin::Remote
        );

        shell.select_session("s1", "s1").await;
        task.await.unwrap();
        shell.select_session("fresh", "fresh").await;

        assert_eq!(shell.chat().transcript().len(), 2);
        assert_eq!(
            shell.chat().transcript().last(),
            Some(&Turn::assistant("partial"))
        );
    }
}
