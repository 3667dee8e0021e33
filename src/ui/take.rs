//! Take-test screen: answering, review, and submission states.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Gauge, Padding, Paragraph, Wrap};

use crate::app::TakeView;
use crate::attempt::AttemptPhase;
use crate::models::{AnswerValue, Question, QuestionKind};
use crate::store::StoreState;

use super::{centered_notice, controls, error_line, truncate};

pub fn render(frame: &mut Frame, area: Rect, view: &TakeView, state: &StoreState) {
    match view.attempt.phase() {
        AttemptPhase::Loading => {
            if let Some(error) = &state.error {
                centered_notice(frame, area, error, Color::Red, "Press [b] to go back");
            } else {
                centered_notice(frame, area, "Loading test...", Color::Yellow, "");
            }
        }
        AttemptPhase::Empty => centered_notice(
            frame,
            area,
            "This test has no questions",
            Color::Yellow,
            "Press [b] to go back",
        ),
        AttemptPhase::Answering => render_answering(frame, area, view, state),
        AttemptPhase::Reviewing => render_review(frame, area, view, state),
        AttemptPhase::Submitting => {
            centered_notice(frame, area, "Submitting answers...", Color::Yellow, "")
        }
        AttemptPhase::Submitted => {}
    }
}

fn render_answering(frame: &mut Frame, area: Rect, view: &TakeView, state: &StoreState) {
    let attempt = &view.attempt;
    let Some(question) = attempt.current_question() else { return };

    let chunks = Layout::vertical([
        Constraint::Length(2), // Title
        Constraint::Length(3), // Progress
        Constraint::Length(5), // Question text
        Constraint::Min(6),    // Answer area
        Constraint::Length(2), // Navigation strip
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_title(frame, chunks[0], attempt, state);
    render_progress(frame, chunks[1], view);
    render_question_text(frame, chunks[2], question, attempt.current_index(), attempt.total());

    match &question.kind {
        QuestionKind::Single { options, .. } => {
            render_choices(frame, chunks[3], question, options, view, true)
        }
        QuestionKind::Multiple { options, .. } => {
            render_choices(frame, chunks[3], question, options, view, false)
        }
        QuestionKind::Text { .. } => render_text_input(frame, chunks[3], question, view),
    }

    render_strip(frame, chunks[4], view);

    let hint = match question.kind {
        QuestionKind::Text { .. } => {
            "type your answer  ·  left/right prev/next  ·  esc leave"
        }
        _ => "up/down select  ·  space choose  ·  left/right prev/next  ·  v review  ·  esc leave",
    };
    controls(frame, chunks[5], hint);
}

fn render_title(frame: &mut Frame, area: Rect, attempt: &crate::attempt::Attempt, state: &StoreState) {
    let title = state
        .current_test
        .as_ref()
        .filter(|t| t.id == attempt.test_id())
        .map(|t| t.title.as_str())
        .unwrap_or("Test");

    let mut lines = vec![Line::from(Span::styled(
        truncate(title, 70),
        Style::default().fg(Color::Cyan).bold(),
    ))];
    if let Some(error) = &state.error {
        lines.push(error_line(error));
    }
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_progress(frame: &mut Frame, area: Rect, view: &TakeView) {
    let percent = view.attempt.progress_percent();
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Progress ")
                .title_style(Style::default().fg(Color::Cyan)),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .percent(u16::from(percent))
        .label(format!("{percent}%"));
    frame.render_widget(gauge, area);
}

fn render_question_text(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    index: usize,
    total: usize,
) {
    let title = format!(
        " Question {} of {}  ·  {} pt ",
        index + 1,
        total,
        question.points
    );
    let widget = Paragraph::new(question.text.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title)
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

fn render_choices(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    options: &[String],
    view: &TakeView,
    single: bool,
) {
    let answer = view.attempt.answer_for(&question.id);

    let lines: Vec<Line> = options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let hovered = i == view.cursor;
            let chosen = match answer {
                Some(AnswerValue::Single(s)) => s == option,
                Some(AnswerValue::Multiple(v)) => v.iter().any(|s| s == option),
                _ => false,
            };

            let mark = match (single, chosen) {
                (true, true) => "(o)",
                (true, false) => "( )",
                (false, true) => "[x]",
                (false, false) => "[ ]",
            };

            let style = if hovered {
                Style::default().fg(Color::Yellow).bold()
            } else if chosen {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(if hovered { "> " } else { "  " }, style),
                Span::styled(mark, style),
                Span::raw(" "),
                Span::styled(option.clone(), style),
            ])
        })
        .collect();

    let title = if single { " Pick one " } else { " Pick any " };
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title)
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_text_input(frame: &mut Frame, area: Rect, question: &Question, view: &TakeView) {
    let text = view
        .attempt
        .answer_for(&question.id)
        .and_then(|a| a.as_str())
        .unwrap_or_default();

    let widget = Paragraph::new(format!("{text}_"))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Your answer ")
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

/// Numbered strip showing answered/current state of every question.
fn render_strip(frame: &mut Frame, area: Rect, view: &TakeView) {
    let attempt = &view.attempt;
    let spans: Vec<Span> = attempt
        .questions()
        .iter()
        .enumerate()
        .flat_map(|(i, question)| {
            let style = if i == attempt.current_index() {
                Style::default().fg(Color::Black).bg(Color::Yellow).bold()
            } else if attempt.is_answered(&question.id) {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else {
                Style::default().fg(Color::Gray).bg(Color::DarkGray)
            };
            vec![Span::styled(format!(" {} ", i + 1), style), Span::raw(" ")]
        })
        .collect();

    let widget = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_review(frame: &mut Frame, area: Rect, view: &TakeView, state: &StoreState) {
    let attempt = &view.attempt;

    let chunks = Layout::vertical([
        Constraint::Length(2), // Title
        Constraint::Min(8),    // Question grid
        Constraint::Length(3), // Summary
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    let mut title_lines = vec![Line::from(Span::styled(
        "REVIEW YOUR ANSWERS",
        Style::default().fg(Color::Cyan).bold(),
    ))];
    if let Some(error) = &state.error {
        title_lines.push(error_line(error));
    }
    frame.render_widget(
        Paragraph::new(title_lines).alignment(Alignment::Center),
        chunks[0],
    );

    let lines: Vec<Line> = attempt
        .questions()
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let hovered = i == view.cursor;
            let answered = attempt.is_answered(&question.id);

            let (mark, mark_color) = if answered {
                ("+", Color::Green)
            } else {
                ("-", Color::Yellow)
            };
            let style = if hovered {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(if hovered { "> " } else { "  " }, style),
                Span::styled(format!(" {mark} "), Style::default().fg(mark_color)),
                Span::styled(format!("{:2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(truncate(&question.text, 50), style),
                Span::styled(
                    if answered { "" } else { "  (unanswered)" },
                    Style::default().fg(Color::Yellow),
                ),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Questions ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, chunks[1]);

    let summary = if attempt.all_answered() {
        Line::from(Span::styled(
            "All questions answered. You can submit the test.",
            Style::default().fg(Color::Green),
        ))
    } else {
        Line::from(Span::styled(
            format!(
                "{} of {} answered. You can go back or submit as is.",
                attempt.answered_count(),
                attempt.total()
            ),
            Style::default().fg(Color::Yellow),
        ))
    };
    frame.render_widget(
        Paragraph::new(summary).alignment(Alignment::Center),
        chunks[2],
    );

    controls(
        frame,
        chunks[3],
        "j/k move  ·  enter jump to question  ·  s submit  ·  esc back  ·  q quit",
    );

    if view.confirm_submit {
        render_confirm(frame, area);
    }
}

/// Modal confirmation before the answers leave the client.
fn render_confirm(frame: &mut Frame, area: Rect) {
    let width = 54.min(area.width);
    let height = 7;
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, popup);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Submit your answers?",
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            "You will not be able to change them afterwards.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] submit", Style::default().fg(Color::Green).bold()),
            Span::raw("    "),
            Span::styled("[n] cancel", Style::default().fg(Color::Red).bold()),
        ]),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(widget, popup);
}
