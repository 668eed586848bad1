//! Keyboard Input Handler
//!
//! Maps crossterm key events onto `TuiApp`. Purely local edits happen in
//! place; anything that talks to the backend comes back as an `Action`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use zeorag_app::View;

use crate::app::{Action, Focus, TuiApp};

/// Handles a single keyboard event.
pub fn handle_key_event(key: KeyEvent, app: &mut TuiApp) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return None;
    }
    if key.code == KeyCode::Tab {
        app.shell.toggle_view();
        leave_input(app);
        return None;
    }

    if app.focus.is_text_input() {
        handle_text_key(key, app)
    } else {
        handle_list_key(key, app)
    }
}

fn handle_list_key(key: KeyEvent, app: &mut TuiApp) -> Option<Action> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.should_quit = true;
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.move_cursor(-1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.move_cursor(1);
            None
        }
        KeyCode::Enter => {
            let entry = app.highlighted()?;
            let action = Action::SelectSession {
                id: entry.session.id.clone(),
                name: entry.session.name.clone(),
            };
            app.focus = Focus::Question;
            Some(action)
        }
        KeyCode::Char('d') => {
            let id = app.highlighted()?.session.id.clone();
            Some(Action::DeleteSession(id))
        }
        KeyCode::Char('n') => {
            app.focus = Focus::NewSession;
            None
        }
        KeyCode::Char('i') if app.view() == View::Chat => {
            app.focus = Focus::Question;
            None
        }
        KeyCode::Char('u') if app.view() == View::Files => {
            app.focus = Focus::UploadPath;
            None
        }
        KeyCode::Char('r') => match app.view() {
            View::Chat => Some(Action::ReloadSessions),
            View::Files => Some(Action::ReloadDocuments),
        },
        _ => None,
    }
}

fn handle_text_key(key: KeyEvent, app: &mut TuiApp) -> Option<Action> {
    match key.code {
        KeyCode::Esc => {
            leave_input(app);
            None
        }
        KeyCode::Enter => {
            // the draft is cleared by `perform` once the shell accepts it
            if app.focus == Focus::Question {
                return Some(Action::Submit(app.input.clone()));
            }
            let text = std::mem::take(&mut app.input);
            match app.focus {
                Focus::NewSession => {
                    app.focus = Focus::Sessions;
                    Some(Action::CreateSession(text))
                }
                Focus::UploadPath => {
                    app.focus = Focus::Sessions;
                    Some(Action::Upload(text))
                }
                Focus::Question | Focus::Sessions => None,
            }
        }
        KeyCode::Backspace => {
            app.input.pop();
            None
        }
        KeyCode::Char(c) => {
            app.input.push(c);
            None
        }
        _ => None,
    }
}

fn leave_input(app: &mut TuiApp) {
    app.input.clear();
    app.focus = Focus::Sessions;
}
