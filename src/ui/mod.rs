//! Screen renderers.
//!
//! One module per screen, dispatched off the app's screen enum. Everything
//! reads store state and view state; no rendering code mutates anything.

mod catalog;
mod details;
mod question_form;
mod results;
mod take;
mod test_form;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};

use crate::app::{App, Screen};
use crate::store::StoreState;

pub fn render(frame: &mut Frame, app: &App, state: &StoreState) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match &app.screen {
        Screen::Catalog => catalog::render(frame, area, app, state),
        Screen::Details(view) => details::render(frame, area, view, state),
        Screen::TestForm(form) => test_form::render(frame, area, form, state),
        Screen::QuestionForm(form) => question_form::render(frame, area, form, state),
        Screen::Take(view) => take::render(frame, area, view, state),
        Screen::Results { scroll } => results::render(frame, area, *scroll, state),
    }
}

/// Footer line listing the active key bindings.
fn controls(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

/// One-line red banner for the store's error string.
fn error_line(error: &str) -> Line<'_> {
    Line::from(Span::styled(error, Style::default().fg(Color::Red).bold()))
}

/// Status suffix shown while a request is in flight.
fn loading_suffix(state: &StoreState) -> &'static str {
    if state.loading { "  ·  loading..." } else { "" }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

/// Centered message with a hint line, for empty and error states.
fn centered_notice(frame: &mut Frame, area: Rect, message: &str, color: Color, hint: &str) {
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(7),
        Constraint::Percentage(40),
    ])
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(color).bold())),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}
