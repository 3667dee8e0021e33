//! Create/edit form for a question.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::forms::{KindChoice, QuestionForm, QuestionFocus};
use crate::store::StoreState;

use super::{controls, error_line, loading_suffix};

pub fn render(frame: &mut Frame, area: Rect, form: &QuestionForm, state: &StoreState) {
    let answer_rows = match form.kind {
        KindChoice::Text => 3,
        _ => form.options.len() as u16 + 2,
    };

    let chunks = Layout::vertical([
        Constraint::Length(2),           // Header
        Constraint::Length(1),           // Kind selector
        Constraint::Length(3),           // Question text
        Constraint::Length(1),           // Points
        Constraint::Length(answer_rows), // Options / correct answer
        Constraint::Length(3),           // Save
        Constraint::Min(0),
        Constraint::Length(2),           // Controls
    ])
    .margin(1)
    .split(area);

    let heading = if form.is_editing() { "EDIT QUESTION" } else { "NEW QUESTION" };
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

    render_kind(frame, chunks[1], form);
    render_text(frame, chunks[2], form);
    render_points(frame, chunks[3], form);
    match form.kind {
        KindChoice::Text => render_correct_text(frame, chunks[4], form),
        _ => render_options(frame, chunks[4], form),
    }
    render_save(frame, chunks[5], form.focus == QuestionFocus::Save);

    let hint = match form.kind {
        KindChoice::Text => "tab next field  ·  enter confirm  ·  esc cancel",
        _ => "tab next field  ·  enter mark correct  ·  ctrl-a add option  ·  ctrl-d drop option  ·  esc cancel",
    };
    controls(frame, chunks[7], hint);
}

fn field_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_kind(frame: &mut Frame, area: Rect, form: &QuestionForm) {
    let focused = form.focus == QuestionFocus::Kind;
    let mut spans = vec![
        Span::styled(if focused { "> " } else { "  " }, field_style(focused)),
        Span::styled("Type: ", Style::default().fg(Color::Gray)),
        Span::styled(format!("< {} >", form.kind.label()), field_style(focused)),
    ];
    if form.is_editing() {
        spans.push(Span::styled(
            "  (fixed while editing — create a new question to change it)",
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_text(frame: &mut Frame, area: Rect, form: &QuestionForm) {
    let focused = form.focus == QuestionFocus::Text;
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else if form.errors.contains_key("text") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title = match form.errors.get("text") {
        Some(message) => format!(" Question — {message} "),
        None => " Question ".to_string(),
    };
    let content = if focused { format!("{}_", form.text) } else { form.text.clone() };

    let widget = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_points(frame: &mut Frame, area: Rect, form: &QuestionForm) {
    let focused = form.focus == QuestionFocus::Points;
    let line = Line::from(vec![
        Span::styled(if focused { "> " } else { "  " }, field_style(focused)),
        Span::styled("Points: ", Style::default().fg(Color::Gray)),
        Span::styled(format!("< {} >", form.points), field_style(focused)),
        Span::styled("  (1-10)", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_options(frame: &mut Frame, area: Rect, form: &QuestionForm) {
    let marker = match form.kind {
        KindChoice::Single => ("(o)", "( )"),
        _ => ("[x]", "[ ]"),
    };

    let lines: Vec<Line> = form
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let focused = form.focus == QuestionFocus::Option(i);
            let mark = if form.is_correct(i) { marker.0 } else { marker.1 };
            let mark_color = if form.is_correct(i) { Color::Green } else { Color::DarkGray };

            let content = if focused { format!("{option}_") } else { option.clone() };
            Line::from(vec![
                Span::styled(if focused { "> " } else { "  " }, field_style(focused)),
                Span::styled(mark, Style::default().fg(mark_color)),
                Span::raw(" "),
                Span::styled(content, field_style(focused)),
            ])
        })
        .collect();

    let border = if form.errors.contains_key("options") || form.errors.contains_key("correct") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title = match form
        .errors
        .get("options")
        .or_else(|| form.errors.get("correct"))
    {
        Some(message) => format!(" Options — {message} "),
        None => " Options ".to_string(),
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_correct_text(frame: &mut Frame, area: Rect, form: &QuestionForm) {
    let focused = form.focus == QuestionFocus::CorrectText;
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else if form.errors.contains_key("correct") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title = match form.errors.get("correct") {
        Some(message) => format!(" Correct answer — {message} "),
        // Compared case-insensitively by the backend.
        None => " Correct answer (case-insensitive) ".to_string(),
    };
    let content = if focused {
        format!("{}_", form.correct_answer_text)
    } else {
        form.correct_answer_text.clone()
    };

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
