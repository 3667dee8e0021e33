//! Create/edit form for a test's metadata.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::forms::{TestForm, TestFocus};
use crate::store::StoreState;

use super::{controls, error_line, loading_suffix};

pub fn render(frame: &mut Frame, area: Rect, form: &TestForm, state: &StoreState) {
    let chunks = Layout::vertical([
        Constraint::Length(2),  // Header
        Constraint::Length(3),  // Title
        Constraint::Length(3),  // Description
        Constraint::Length(3),  // Tag input
        Constraint::Length(2),  // Tag list
        Constraint::Length(3),  // Save
        Constraint::Min(0),
        Constraint::Length(2),  // Controls
    ])
    .margin(1)
    .split(area);

    let heading = if form.is_editing() { "EDIT TEST" } else { "NEW TEST" };
    let mut header = vec![Line::from(Span::styled(
        format!("{heading}{}", loading_suffix(state)),
        Style::default().fg(Color::Cyan).bold(),
    ))];
    if let Some(error) = &state.error {
        header.push(error_line(error));
    }
    frame.render_widget(
        Paragraph::new(header).alignment(Alignment::Center),
        chunks[0],
    );

    render_input(
        frame,
        chunks[1],
        "Title",
        &form.title,
        form.focus == TestFocus::Title,
        form.errors.get("title").copied(),
    );
    render_input(
        frame,
        chunks[2],
        "Description",
        &form.description,
        form.focus == TestFocus::Description,
        form.errors.get("description").copied(),
    );
    render_input(
        frame,
        chunks[3],
        "Add tag (enter to add)",
        &form.tag_input,
        form.focus == TestFocus::TagInput,
        None,
    );

    let tags = if form.tags.is_empty() {
        Line::from(Span::styled("no tags", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(Span::styled(
            format!("[{}]", form.tags.join("] [")),
            Style::default().fg(Color::Cyan),
        ))
    };
    frame.render_widget(Paragraph::new(tags), chunks[4]);

    render_save(frame, chunks[5], form.focus == TestFocus::Save);

    controls(
        frame,
        chunks[7],
        "tab next field  ·  enter confirm  ·  del drop last tag  ·  esc cancel",
    );
}

fn render_input(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    error: Option<&str>,
) {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else if error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = match error {
        Some(message) => format!(" {label} — {message} "),
        None => format!(" {label} "),
    };

    let content = if focused { format!("{value}_") } else { value.to_string() };

    let widget = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_save(frame: &mut Frame, area: Rect, focused: bool) {
    let style = if focused {
        Style::default().fg(Color::Black).bg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::Gray)
    };
    let widget = Paragraph::new(Span::styled("  SAVE  ", style)).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}
