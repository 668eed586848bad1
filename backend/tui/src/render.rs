//! TUI Rendering
//!
//! Translates `TuiApp` into Ratatui widgets and draws to the terminal frame.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use zeorag_app::{LoadState, NoticeLevel, SessionOrigin, View};
use zeorag_core::{QueryPhase, Role};

use crate::app::{Focus, TuiApp};

const SIDEBAR_WIDTH: u16 = 30;

/// Main draw loop function.
pub fn draw_ui(f: &mut Frame, app: &mut TuiApp) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Body
            Constraint::Length(1), // Banner
        ])
        .split(f.size());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(rows[0]);

    draw_sidebar(f, app, columns[0]);
    match app.view() {
        View::Chat => draw_chat(f, app, columns[1]),
        View::Files => draw_files(f, app, columns[1]),
    }
    draw_banner(f, app, rows[1]);
}

fn input_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_sidebar(f: &mut Frame, app: &mut TuiApp, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Sessions
            Constraint::Length(3), // New session
            Constraint::Length(3), // View toggle
        ])
        .split(area);

    let items: Vec<ListItem> = app
        .shell
        .sessions()
        .entries()
        .iter()
        .map(|entry| {
            let mut style = Style::default();
            if app.shell.sessions().is_active(&entry.session.id) {
                style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
            }
            let mut spans = vec![Span::styled(entry.session.name.clone(), style)];
            if entry.origin == SessionOrigin::Local {
                spans.push(Span::styled(" (new)", Style::default().fg(Color::DarkGray)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title("Sessions").borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, parts[0], &mut app.session_list_state);

    let editing = app.focus == Focus::NewSession;
    let text = if editing { app.input.as_str() } else { "" };
    let new_session = Paragraph::new(text)
        .style(input_style(editing))
        .block(Block::default().title("New session [n]").borders(Borders::ALL));
    f.render_widget(new_session, parts[1]);

    let toggle = Paragraph::new(format!("[Tab] {}", app.view().toggle_label()))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(toggle, parts[2]);
}

/// Break `text` into rows of at most `width` columns, at spaces where
/// possible. Words wider than a row are split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_width = 0;
    for word in text.split(' ') {
        let word_width = word.width();
        let gap = usize::from(!row.is_empty());
        if row_width + gap + word_width <= width {
            if gap == 1 {
                row.push(' ');
            }
            row.push_str(word);
            row_width += gap + word_width;
            continue;
        }
        if !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            row_width = 0;
        }
        for ch in word.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if row_width + ch_width > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            row.push(ch);
            row_width += ch_width;
        }
    }
    rows.push(row);
    rows
}

/// One `Line` per screen row, so the row count is exact at this width.
fn transcript_lines(app: &TuiApp, width: usize) -> Vec<Line<'static>> {
    let chat = app.shell.chat();
    if let Some(placeholder) = chat.placeholder() {
        let dimmed = Style::default().fg(Color::DarkGray);
        return wrap_text(placeholder, width)
            .into_iter()
            .map(|row| Line::styled(row, dimmed))
            .collect();
    }

    let mut lines = Vec::new();
    for turn in chat.transcript().turns() {
        let (label, color) = match turn.role {
            Role::User => ("You", Color::Green),
            Role::Assistant => ("Assistant", Color::Cyan),
        };
        lines.push(Line::styled(
            format!("{label}:"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        for line in turn.content.lines() {
            lines.extend(wrap_text(line, width).into_iter().map(Line::raw));
        }
        lines.push(Line::raw(""));
    }
    if chat.phase() == &QueryPhase::Submitting {
        lines.push(Line::styled(
            "Loading...",
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines
}

fn draw_chat(f: &mut Frame, app: &TuiApp, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Chat messages
            Constraint::Length(3), // Input box
        ])
        .split(area);

    let title = match app.shell.chat().session() {
        Some(session) => format!("Chat: {}", session.name),
        None => "Chat".to_string(),
    };
    let lines = transcript_lines(app, parts[0].width.saturating_sub(2) as usize);
    // stick to the bottom
    let visible = parts[0].height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;
    let messages = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(messages, parts[0]);

    let editing = app.focus == Focus::Question;
    let input_title = if app.shell.chat().is_busy() {
        "Question (answering...)"
    } else {
        "Question [i]"
    };
    let text = if editing { app.input.as_str() } else { "" };
    let input = Paragraph::new(text)
        .style(input_style(editing))
        .block(Block::default().title(input_title).borders(Borders::ALL));
    f.render_widget(input, parts[1]);
}

fn draw_files(f: &mut Frame, app: &TuiApp, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Documents
            Constraint::Length(3), // Upload path
        ])
        .split(area);

    let panel = app.shell.documents();
    let title = if panel.is_stale() {
        "Papers (press r to reload)"
    } else {
        "Papers"
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let dimmed = Style::default().fg(Color::DarkGray);

    match panel.state() {
        LoadState::NotLoaded => {
            f.render_widget(Paragraph::new("Loading...").style(dimmed).block(block), parts[0]);
        }
        LoadState::Failed(error) if panel.documents().is_empty() => {
            let text = Paragraph::new(format!("Could not load papers: {error}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block);
            f.render_widget(text, parts[0]);
        }
        _ if panel.documents().is_empty() => {
            f.render_widget(Paragraph::new("No papers yet").style(dimmed).block(block), parts[0]);
        }
        _ => {
            let items: Vec<ListItem> = panel
                .documents()
                .iter()
                .map(|doc| ListItem::new(doc.name().to_string()))
                .collect();
            f.render_widget(List::new(items).block(block), parts[0]);
        }
    }

    let editing = app.focus == Focus::UploadPath;
    let text = if editing { app.input.as_str() } else { "" };
    let upload = Paragraph::new(text)
        .style(input_style(editing))
        .block(Block::default().title("Upload PDF path [u]").borders(Borders::ALL));
    f.render_widget(upload, parts[1]);
}

fn draw_banner(f: &mut Frame, app: &TuiApp, area: Rect) {
    let banner = match app.shell.notice() {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => Color::Green,
                NoticeLevel::Error => Color::Red,
            };
            Paragraph::new(notice.message.clone()).style(Style::default().fg(color))
        }
        None if app.focus.is_text_input() => {
            Paragraph::new("Enter: confirm  Esc: back  Tab: switch view").style(input_style(false))
        }
        None => Paragraph::new("Enter: open  n: new  d: delete  r: reload  Tab: switch view  q: quit")
            .style(input_style(false)),
    };
    f.render_widget(banner, area);
}
