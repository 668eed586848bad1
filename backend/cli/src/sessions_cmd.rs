//! CLI Sessions Subcommands
//!
//! List, inspect and delete the chat sessions the backend knows about.

use anyhow::Result;
use clap::Subcommand;

use zeorag_app::{ChatView, SessionEntry, SessionOrigin, SessionStore};
use zeorag_core::{RagBackend, Session};

use crate::terminal_output::{format_turn, note_info, note_success, render_table, Column};

#[derive(Subcommand)]
pub enum SessionCommands {
    /// List all sessions
    List,
    /// Show the chat history of a session
    History {
        /// Session id
        session_id: String,
    },
    /// Delete a session and its history
    Delete {
        /// Session id
        session_id: String,
    },
}

pub async fn run(cmd: SessionCommands, backend: &dyn RagBackend) -> Result<()> {
    match cmd {
        SessionCommands::List => {
            let mut store = SessionStore::new();
            store.load(backend).await?;
            if store.entries().is_empty() {
                note_info("No sessions yet. Start one with `zeorag chat --session <name>`.");
            } else {
                print!("{}", sessions_table(store.entries()));
            }
        }
        SessionCommands::History { session_id } => {
            let mut chat = ChatView::new(0, Some(Session::named(session_id.as_str())));
            chat.load_history(backend).await?;
            if let Some(placeholder) = chat.placeholder() {
                note_info(placeholder);
            }
            for turn in chat.transcript().turns() {
                print!("{}", format_turn(turn));
            }
        }
        SessionCommands::Delete { session_id } => {
            let mut store = SessionStore::new();
            store.load(backend).await?;
            store.delete(backend, &session_id).await?;
            note_success(&format!("Deleted session {session_id}"));
        }
    }
    Ok(())
}

pub fn sessions_table(entries: &[SessionEntry]) -> String {
    let columns = [Column::left("ID"), Column::left("Name").max_width(48)];
    let rows: Vec<Vec<String>> = entries
        .iter()
        .filter(|e| e.origin == SessionOrigin::Remote)
        .map(|e| vec![e.session.id.clone(), e.session.name.clone()])
        .collect();
    render_table(&columns, &rows)
}
