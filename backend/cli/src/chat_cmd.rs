//! CLI Chat Commands
//!
//! `ask` streams a single answer to stdout. `chat` prints the session's
//! history and then reads questions from stdin until an exit word or EOF.

use std::io::Write;

use anyhow::{bail, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use zeorag_app::{ChatView, SessionOrigin, SessionStore};
use zeorag_core::{QueryOutcome, RagBackend, Role, Session};

use crate::terminal_output::{dim, format_turn, note_error, note_info, role_label, stream_write};

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "bye"];

pub fn is_exit_word(line: &str) -> bool {
    let line = line.trim();
    EXIT_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w))
}

/// Resolve `name` against the backend's sessions.
///
/// An unknown name becomes a new session; the backend registers it on the
/// first question.
async fn open_session(backend: &dyn RagBackend, name: &str) -> Result<(ChatView, bool)> {
    let mut store = SessionStore::new();
    store.load(backend).await?;
    let known = store
        .entries()
        .iter()
        .find(|e| e.session.name == name && e.origin == SessionOrigin::Remote)
        .map(|e| e.session.clone());

    match known {
        Some(session) => {
            let mut chat = ChatView::new(0, Some(session));
            chat.load_history(backend).await?;
            Ok((chat, true))
        }
        None => {
            let entry = store.create(name)?;
            Ok((ChatView::new(0, Some(entry.session)), false))
        }
    }
}

/// Stream one answer into `out`. Interrupted answers keep their partial
/// text and report the error.
async fn stream_answer(
    chat: &mut ChatView,
    backend: &dyn RagBackend,
    question: &str,
    out: &mut impl Write,
) -> Result<QueryOutcome> {
    write!(out, "{} ", role_label(Role::Assistant))?;
    out.flush()?;
    let mut write_error = None;
    let outcome = chat
        .ask(backend, question, |delta| {
            if let Err(e) = stream_write(out, delta) {
                write_error.get_or_insert(e);
            }
        })
        .await?;
    writeln!(out)?;
    if let Some(e) = write_error {
        return Err(e.into());
    }
    Ok(outcome)
}

pub async fn ask(backend: &dyn RagBackend, session: &str, question: &str) -> Result<()> {
    let mut chat = ChatView::new(0, Some(Session::named(session)));
    let mut stdout = std::io::stdout();
    match stream_answer(&mut chat, backend, question, &mut stdout).await? {
        QueryOutcome::Interrupted { error, .. } => bail!("answer interrupted: {error}"),
        outcome => {
            debug!(chunks = outcome.chunks(), "Answer streamed");
            Ok(())
        }
    }
}

pub async fn chat(backend: &dyn RagBackend, session: &str) -> Result<()> {
    let (mut view, existing) = open_session(backend, session).await?;
    let mut stdout = std::io::stdout();
    if existing {
        for turn in view.transcript().turns() {
            write!(stdout, "{}", format_turn(turn))?;
        }
    } else {
        note_info(&format!("New session '{session}'"));
    }
    writeln!(stdout, "{}", dim("Type exit, quit or bye to leave."))?;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    chat_loop(&mut view, backend, stdin, &mut stdout).await
}

/// Read questions line by line and stream each answer.
pub async fn chat_loop<R, W>(
    view: &mut ChatView,
    backend: &dyn RagBackend,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(out, "{} ", role_label(Role::User))?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        if is_exit_word(&line) {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let outcome = stream_answer(view, backend, &line, out).await?;
        if let QueryOutcome::Interrupted { error, .. } = outcome {
            note_error(&format!("Answer interrupted: {error}"));
        }
    }
    Ok(())
}
