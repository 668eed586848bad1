//! Chat view: one session's transcript and the query in flight against it.
//!
//! A view is built per selected session and tagged with an epoch. Answer
//! chunks travel as `ChatEvent`s carrying that epoch, so events from a
//! stream opened under an earlier view are dropped instead of bleeding into
//! the current transcript.

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use zeorag_core::{
    AnswerReducer, QueryOutcome, QueryPhase, QueryRequest, RagBackend, Session, Transcript,
    ZeoError,
};
use zeorag_logging::{ClientEvent, EventLogger};

pub const NO_SESSION_PLACEHOLDER: &str = "Select a session or create a new one to start";
pub const EMPTY_PLACEHOLDER: &str = "No messages to show";

/// Something that happened on an answer stream.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Chunk(Bytes),
    Failed(String),
    Finished,
}

/// A stream event addressed to the chat view with the given epoch.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub epoch: u64,
    pub event: StreamEvent,
}

/// Everything needed to run a submitted query outside the view.
#[derive(Debug, Clone)]
pub struct QueryTicket {
    pub epoch: u64,
    pub request: QueryRequest,
    pub cancel: CancellationToken,
}

struct InFlight {
    reducer: AnswerReducer,
    cancel: CancellationToken,
}

pub struct ChatView {
    epoch: u64,
    session: Option<Session>,
    transcript: Transcript,
    inflight: Option<InFlight>,
    phase: QueryPhase,
}

impl ChatView {
    pub fn new(epoch: u64, session: Option<Session>) -> Self {
        Self {
            epoch,
            session,
            transcript: Transcript::new(),
            inflight: None,
            phase: QueryPhase::Idle,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn phase(&self) -> &QueryPhase {
        &self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.inflight.is_some()
    }

    /// Text to show instead of the transcript, if any.
    pub fn placeholder(&self) -> Option<&'static str> {
        if self.session.is_none() {
            Some(NO_SESSION_PLACEHOLDER)
        } else if self.transcript.is_empty() {
            Some(EMPTY_PLACEHOLDER)
        } else {
            None
        }
    }

    /// Replace the transcript with the session's stored history.
    pub async fn load_history(&mut self, backend: &dyn RagBackend) -> Result<usize, ZeoError> {
        let Some(session) = &self.session else {
            return Err(ZeoError::NoActiveSession);
        };
        match backend.chat_history(&session.id).await {
            Ok(turns) => {
                debug!(session_id = %session.id, turns = turns.len(), "History loaded");
                self.transcript = Transcript::from_history(turns);
                Ok(self.transcript.len())
            }
            Err(e) => {
                EventLogger::log_event(
                    Some(&session.id),
                    ClientEvent::RequestFailed {
                        operation: "chat_history".into(),
                        error_msg: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }

    /// Append the question and hand back a ticket for streaming its answer.
    ///
    /// Rejected while another query is in flight.
    pub fn submit(&mut self, question: &str) -> Result<QueryTicket, ZeoError> {
        let Some(session) = &self.session else {
            return Err(ZeoError::NoActiveSession);
        };
        if question.trim().is_empty() {
            return Err(ZeoError::validation("Enter a question first"));
        }
        if self.inflight.is_some() {
            return Err(ZeoError::QueryInFlight);
        }

        let request = QueryRequest {
            question: question.to_string(),
            session_name: session.name.clone(),
        };
        EventLogger::log_event(
            Some(&session.id),
            ClientEvent::QueryStarted {
                question: request.question.clone(),
            },
        );

        let reducer = self.transcript.begin_answer(question);
        let cancel = CancellationToken::new();
        self.phase = reducer.phase();
        self.inflight = Some(InFlight {
            reducer,
            cancel: cancel.clone(),
        });

        Ok(QueryTicket {
            epoch: self.epoch,
            request,
            cancel,
        })
    }

    /// Apply a stream event. Returns the outcome when the query settles.
    ///
    /// Events for another epoch, or arriving with nothing in flight, are
    /// ignored.
    pub fn apply(&mut self, event: ChatEvent) -> Option<QueryOutcome> {
        if event.epoch != self.epoch {
            debug!(
                event_epoch = event.epoch,
                view_epoch = self.epoch,
                "Dropping stale stream event"
            );
            return None;
        }
        match event.event {
            StreamEvent::Chunk(bytes) => {
                self.apply_chunk(&bytes);
                None
            }
            StreamEvent::Failed(error) => self.settle_with(|r, _| r.interrupt(error)),
            StreamEvent::Finished => self.settle_with(|r, t| r.finish(t)),
        }
    }

    /// Abandon the query in flight, keeping what was applied.
    pub fn cancel(&mut self) -> Option<QueryOutcome> {
        let inflight = self.inflight.as_ref()?;
        inflight.cancel.cancel();
        self.settle_with(|r, _| r.cancel())
    }

    /// Submit and stream a query to completion in place.
    ///
    /// `on_delta` sees each decoded fragment. Input problems are errors;
    /// transport failures settle the query as interrupted.
    pub async fn ask<F>(
        &mut self,
        backend: &dyn RagBackend,
        question: &str,
        mut on_delta: F,
    ) -> Result<QueryOutcome, ZeoError>
    where
        F: FnMut(&str),
    {
        let ticket = self.submit(question)?;
        let mut answer = match backend.query(&ticket.request).await {
            Ok(answer) => answer,
            Err(e) => {
                return Ok(self
                    .settle_with(|r, _| r.interrupt(e))
                    .unwrap_or(QueryOutcome::Cancelled { chunks: 0 }));
            }
        };

        while let Some(chunk) = answer.next().await {
            match chunk {
                Ok(bytes) => {
                    if let Some(delta) = self.apply_chunk(&bytes) {
                        on_delta(&delta);
                    }
                }
                Err(e) => {
                    return Ok(self
                        .settle_with(|r, _| r.interrupt(e))
                        .unwrap_or(QueryOutcome::Cancelled { chunks: 0 }));
                }
            }
        }
        Ok(self
            .settle_with(|r, t| r.finish(t))
            .unwrap_or(QueryOutcome::Cancelled { chunks: 0 }))
    }

    fn apply_chunk(&mut self, bytes: &[u8]) -> Option<String> {
        let inflight = self.inflight.as_mut()?;
        let delta = inflight.reducer.apply_chunk(&mut self.transcript, bytes);
        self.phase = inflight.reducer.phase();
        Some(delta)
    }

    fn settle_with<F>(&mut self, settle: F) -> Option<QueryOutcome>
    where
        F: FnOnce(AnswerReducer, &mut Transcript) -> QueryOutcome,
    {
        let inflight = self.inflight.take()?;
        let answer_chars = inflight.reducer.text().chars().count();
        let outcome = settle(inflight.reducer, &mut self.transcript);

        let label = match &outcome {
            QueryOutcome::Completed { .. } => "completed",
            QueryOutcome::Interrupted { error, .. } => {
                warn!(error = %error, "Answer stream interrupted");
                "interrupted"
            }
            QueryOutcome::Cancelled { .. } => "cancelled",
        };
        EventLogger::log_event(
            self.session.as_ref().map(|s| s.id.as_str()),
            ClientEvent::QuerySettled {
                outcome: label.into(),
                chunks: outcome.chunks(),
                answer_chars,
            },
        );

        self.phase = QueryPhase::Settled(outcome.clone());
        Some(outcome)
    }
}

/// Open the query for `ticket` and forward its body as `ChatEvent`s.
///
/// Stops quietly when the ticket is cancelled or the receiver is gone.
pub async fn pump_answer(
    backend: Arc<dyn RagBackend>,
    ticket: QueryTicket,
    tx: mpsc::Sender<ChatEvent>,
) {
    let QueryTicket {
        epoch,
        request,
        cancel,
    } = ticket;

    let opened = tokio::select! {
        _ = cancel.cancelled() => return,
        opened = backend.query(&request) => opened,
    };
    let mut answer = match opened {
        Ok(answer) => answer,
        Err(e) => {
            let _ = tx
                .send(ChatEvent {
                    epoch,
                    event: StreamEvent::Failed(e.to_string()),
                })
                .await;
            return;
        }
    };

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return,
            next = answer.next() => next,
        };
        let event = match next {
            Some(Ok(bytes)) => StreamEvent::Chunk(bytes),
            Some(Err(e)) => StreamEvent::Failed(e.to_string()),
            None => StreamEvent::Finished,
        };
        let settled = !matches!(event, StreamEvent::Chunk(_));
        if tx.send(ChatEvent { epoch, event }).await.is_err() || settled {
            return;
        }
    }
}
