//! TUI App State
//!
//! Wraps the `Shell` with what only the terminal front end needs: focus,
//! the line being edited, the session cursor, and the channel that answer
//! streams report back on.

use std::path::Path;

use ratatui::widgets::ListState;
use tokio::sync::mpsc;

use zeorag_app::{read_upload, ChatEvent, Notice, SessionEntry, Shell, View};

use crate::streaming::start_stream;

/// Capacity of the stream event channel.
const EVENT_BUFFER: usize = 256;

/// Which widget receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Sessions,
    NewSession,
    Question,
    UploadPath,
}

impl Focus {
    pub fn is_text_input(self) -> bool {
        !matches!(self, Focus::Sessions)
    }
}

/// Work requested by a key press that needs the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Submit(String),
    SelectSession { id: String, name: String },
    CreateSession(String),
    DeleteSession(String),
    ReloadSessions,
    ReloadDocuments,
    Upload(String),
}

pub struct TuiApp {
    pub shell: Shell,
    pub input: String,
    pub focus: Focus,
    pub session_list_state: ListState,
    pub should_quit: bool,
    events_tx: mpsc::Sender<ChatEvent>,
    events_rx: mpsc::Receiver<ChatEvent>,
}

impl TuiApp {
    pub fn new(shell: Shell) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        Self {
            shell,
            input: String::new(),
            focus: Focus::Sessions,
            session_list_state: ListState::default(),
            should_quit: false,
            events_tx,
            events_rx,
        }
    }

    pub fn view(&self) -> View {
        self.shell.view()
    }

    /// The session under the cursor.
    pub fn highlighted(&self) -> Option<&SessionEntry> {
        let index = self.session_list_state.selected()?;
        self.shell.sessions().entries().get(index)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.shell.sessions().entries().len();
        if len == 0 {
            self.session_list_state.select(None);
            return;
        }
        let current = self.session_list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.session_list_state.select(Some(next));
    }

    /// Keep the cursor inside the list after it changed size.
    pub fn clamp_cursor(&mut self) {
        let len = self.shell.sessions().entries().len();
        match self.session_list_state.selected() {
            _ if len == 0 => self.session_list_state.select(None),
            None => self.session_list_state.select(Some(0)),
            Some(i) if i >= len => self.session_list_state.select(Some(len - 1)),
            Some(_) => {}
        }
    }

    /// Drain pending stream events into the chat view.
    pub fn pump_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.shell.apply(event);
            applied += 1;
        }
        applied
    }

    /// Run a backend action. Clears the previous banner first.
    pub async fn perform(&mut self, action: Action) {
        self.shell.dismiss_notice();
        match action {
            Action::Submit(question) => {
                if let Some(ticket) = self.shell.submit(&question) {
                    self.input.clear();
                    start_stream(self.shell.backend(), ticket, self.events_tx.clone());
                }
            }
            Action::SelectSession { id, name } => {
                self.shell.select_session(&id, &name).await;
            }
            Action::CreateSession(raw) => {
                if self.shell.create_session(&raw).await {
                    self.clamp_cursor();
                    let active = self.shell.sessions().active().map(|s| s.id.clone());
                    let index = self
                        .shell
                        .sessions()
                        .entries()
                        .iter()
                        .position(|e| Some(&e.session.id) == active.as_ref());
                    self.session_list_state.select(index);
                    self.focus = Focus::Question;
                }
            }
            Action::DeleteSession(id) => {
                self.shell.delete_session(&id).await;
                self.clamp_cursor();
            }
            Action::ReloadSessions => {
                self.shell.reload_sessions().await;
                self.clamp_cursor();
            }
            Action::ReloadDocuments => {
                self.shell.refresh_documents().await;
            }
            Action::Upload(path) => {
                let path = path.trim();
                let selection = if path.is_empty() {
                    None
                } else {
                    match read_upload(Path::new(path)).await {
                        Ok(upload) => Some(upload),
                        Err(e) => {
                            self.shell.set_notice(Notice::from_error("read file", &e));
                            return;
                        }
                    }
                };
                self.shell.upload(selection).await;
            }
        }
    }
}
