//! Streaming Consumer
//!
//! Runs the answer stream of a submitted question on a background task so
//! the draw loop keeps rendering while bytes arrive.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use zeorag_app::{pump_answer, ChatEvent, QueryTicket};
use zeorag_core::RagBackend;

/// Spawn the stream for `ticket`. Events land on `tx` tagged with its epoch.
pub fn start_stream(
    backend: Arc<dyn RagBackend>,
    ticket: QueryTicket,
    tx: mpsc::Sender<ChatEvent>,
) -> JoinHandle<()> {
    debug!(epoch = ticket.epoch, "Starting answer stream");
    tokio::spawn(pump_answer(backend, ticket, tx))
}
