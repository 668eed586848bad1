//! Session transcript and the streamed-answer reducer.
//!
//! A query appends the user's question at once, then grows a single
//! assistant turn as answer chunks arrive. The assistant turn is replaced on
//! every chunk with the full accumulated text; it is never duplicated.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::decoder::Utf8StreamDecoder;
use crate::error::ZeoError;
use crate::types::{Role, Turn};

/// Ordered turns of one session, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_history(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }

    /// Append the question and return a reducer for its answer.
    pub fn begin_answer(&mut self, question: impl Into<String>) -> AnswerReducer {
        self.turns.push(Turn::user(question));
        AnswerReducer::new()
    }

    /// Write `text` into the answer turn at `slot`, or append a new one.
    ///
    /// The slot is reused only while it is still the last turn and still an
    /// assistant turn.
    fn upsert_answer(&mut self, slot: Option<usize>, text: &str) -> usize {
        if let Some(index) = slot {
            let reusable = index + 1 == self.turns.len()
                && self.turns[index].role == Role::Assistant;
            if reusable {
                self.turns[index].content.clear();
                self.turns[index].content.push_str(text);
                return index;
            }
        }
        self.turns.push(Turn::assistant(text));
        self.turns.len() - 1
    }
}

/// How a query settled.
///
/// The transcript keeps whatever was applied before settling in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The stream ended normally.
    Completed { chunks: usize },
    /// Reading the stream failed part way through.
    Interrupted { chunks: usize, error: String },
    /// The query was abandoned, typically because the session changed.
    Cancelled { chunks: usize },
}

impl QueryOutcome {
    pub fn chunks(&self) -> usize {
        match self {
            QueryOutcome::Completed { chunks }
            | QueryOutcome::Interrupted { chunks, .. }
            | QueryOutcome::Cancelled { chunks } => *chunks,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, QueryOutcome::Completed { .. })
    }
}

/// Lifecycle of a single query, as seen by a chat view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueryPhase {
    #[default]
    Idle,
    /// Question appended, no answer bytes yet.
    Submitting,
    /// At least one chunk applied.
    Streaming { chunks: usize },
    Settled(QueryOutcome),
}

impl QueryPhase {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, QueryPhase::Submitting | QueryPhase::Streaming { .. })
    }
}

/// Folds answer chunks into a transcript.
///
/// Holds the decoder state and the accumulated answer text for one query.
/// Chunks must be applied in arrival order.
#[derive(Debug, Default)]
pub struct AnswerReducer {
    decoder: Utf8StreamDecoder,
    text: String,
    slot: Option<usize>,
    chunks: usize,
}

impl AnswerReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one chunk. Returns the newly decoded text.
    pub fn apply_chunk(&mut self, transcript: &mut Transcript, chunk: &[u8]) -> String {
        let delta = self.decoder.decode(chunk);
        self.text.push_str(&delta);
        self.chunks += 1;
        self.slot = Some(transcript.upsert_answer(self.slot, &self.text));
        delta
    }

    /// Settle after the stream ended. Flushes a truncated trailing character.
    pub fn finish(mut self, transcript: &mut Transcript) -> QueryOutcome {
        let tail = self.decoder.finish();
        if !tail.is_empty() && self.slot.is_some() {
            self.text.push_str(&tail);
            transcript.upsert_answer(self.slot, &self.text);
        }
        QueryOutcome::Completed {
            chunks: self.chunks,
        }
    }

    /// Settle after a read failure. Applied text stays; no error turn is added.
    pub fn interrupt(self, error: impl std::fmt::Display) -> QueryOutcome {
        QueryOutcome::Interrupted {
            chunks: self.chunks,
            error: error.to_string(),
        }
    }

    /// Settle without applying anything further.
    pub fn cancel(self) -> QueryOutcome {
        QueryOutcome::Cancelled {
            chunks: self.chunks,
        }
    }

    /// The answer accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn phase(&self) -> QueryPhase {
        if self.chunks == 0 {
            QueryPhase::Submitting
        } else {
            QueryPhase::Streaming {
                chunks: self.chunks,
            }
        }
    }
}

/// Drive a whole answer stream into the transcript.
///
/// `on_delta` sees each decoded fragment as it is applied. A read error
/// settles the query as interrupted instead of failing.
pub async fn reduce_stream<S, F>(
    transcript: &mut Transcript,
    question: impl Into<String>,
    mut stream: S,
    mut on_delta: F,
) -> QueryOutcome
where
    S: Stream<Item = Result<Bytes, ZeoError>> + Unpin,
    F: FnMut(&str),
{
    let mut reducer = transcript.begin_answer(question);
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => {
                let delta = reducer.apply_chunk(transcript, &bytes);
                on_delta(&delta);
            }
            Err(e) => {
                warn!(error = %e, chunks = reducer.chunks(), "Answer stream interrupted");
                return reducer.interrupt(e);
            }
        }
    }
    debug!(chunks = reducer.chunks(), "Answer stream completed");
    reducer.finish(transcript)
}
