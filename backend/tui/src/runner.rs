//! Terminal session for `zeorag ui`.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use zeorag_app::Shell;

use crate::app::TuiApp;
use crate::input::handle_key_event;
use crate::render::draw_ui;

const TICK: Duration = Duration::from_millis(50);

/// Restores the terminal even when the loop bails out with an error.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "Failed to disable raw mode");
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
            warn!(error = %e, "Failed to leave alternate screen");
        }
    }
}

/// Run the interactive UI until the user quits.
pub async fn run(shell: Shell) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let mut app = TuiApp::new(shell);
    app.shell.start().await;
    app.clamp_cursor();
    info!("TUI started");

    event_loop(&mut terminal, &mut app).await?;

    info!("TUI stopped");
    Ok(())
}

async fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut TuiApp) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|f| draw_ui(f, app))?;
        app.pump_events();

        if !event::poll(TICK)? {
            // let spawned streams make progress between polls
            tokio::task::yield_now().await;
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(action) = handle_key_event(key, app) {
                app.perform(action).await;
            }
        }
    }
    Ok(())
}
