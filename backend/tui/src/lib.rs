//! TUI (Terminal User Interface) for the ZeoRAG client.
//!
//! Exposes the ratatui front end behind `zeorag ui`.

pub mod app;
pub mod input;
pub mod render;
pub mod runner;
pub mod streaming;

pub use app::{Action, Focus, TuiApp};
pub use input::handle_key_event;
pub use render::draw_ui;
pub use runner::run;
pub use streaming::start_stream;
