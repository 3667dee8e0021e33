//! Test details screen: metadata plus the question list.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::app::DetailsView;
use crate::store::StoreState;

use super::{centered_notice, controls, error_line, loading_suffix, truncate};

pub fn render(frame: &mut Frame, area: Rect, view: &DetailsView, state: &StoreState) {
    let Some(test) = &state.current_test else {
        if let Some(error) = &state.error {
            centered_notice(frame, area, error, Color::Red, "Press [b] to go back");
        } else if state.loading {
            centered_notice(frame, area, "Loading test...", Color::Yellow, "");
        } else {
            centered_notice(
                frame,
                area,
                "Test not found or deleted",
                Color::Yellow,
                "Press [b] to go back",
            );
        }
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(6), // Header
        Constraint::Min(8),    // Questions
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], state);
    render_questions(frame, chunks[1], view, state);
    controls(
        frame,
        chunks[2],
        "t take  ·  e edit  ·  a add question  ·  enter edit question  ·  x delete question  ·  b back  ·  q quit",
    );
}

fn render_header(frame: &mut Frame, area: Rect, state: &StoreState) {
    let Some(test) = &state.current_test else { return };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{}{}", truncate(&test.title, 70), loading_suffix(state)),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(
            truncate(&test.description, 100),
            Style::default().fg(Color::Gray),
        )),
    ];

    let mut meta = vec![Span::styled(
        format!("{} questions", test.questions.len()),
        Style::default().fg(Color::DarkGray),
    )];
    if !test.tags.is_empty() {
        meta.push(Span::styled(
            format!("  ·  [{}]", test.tags.join(", ")),
            Style::default().fg(Color::Cyan),
        ));
    }
    if let Some(created) = &test.created_at {
        meta.push(Span::styled(
            format!("  ·  created {created}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines.push(Line::from(meta));

    if let Some(error) = &state.error {
        lines.push(error_line(error));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(widget, area);
}

fn render_questions(frame: &mut Frame, area: Rect, view: &DetailsView, state: &StoreState) {
    let Some(test) = &state.current_test else { return };

    if test.questions.is_empty() {
        let widget = Paragraph::new("No questions yet. Press [a] to add one.")
            .alignment(Alignment::Center)
            .fg(Color::Yellow)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        frame.render_widget(widget, area);
        return;
    }

    let lines: Vec<Line> = test
        .questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let is_selected = i == view.selected;
            let armed = view.pending_delete.as_deref() == Some(question.id.as_str());
            let prefix = if is_selected { "> " } else { "  " };

            let style = if is_selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };

            let mut spans = vec![
                Span::styled(prefix, style),
                Span::styled(format!("{:2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(truncate(&question.text, 50), style),
                Span::styled(
                    format!("  ·  {}  ·  {} pt", question.kind.label(), question.points),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if armed {
                spans.push(Span::styled(
                    "  press x again to delete",
                    Style::default().fg(Color::Red).bold(),
                ));
            }
            Line::from(spans)
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
    frame.render_widget(widget, area);
}
