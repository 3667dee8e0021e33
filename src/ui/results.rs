//! Results screen: score summary and per-question breakdown.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::models::{grade, AnswerValue, Question, QuestionKind, ScoringResult};
use crate::store::StoreState;

use super::{centered_notice, controls, truncate};

pub fn render(frame: &mut Frame, area: Rect, scroll: usize, state: &StoreState) {
    let Some(results) = &state.results else {
        centered_notice(
            frame,
            area,
            "No results available. Take the test first.",
            Color::Yellow,
            "Press [b] to go back",
        );
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(7), // Summary
        Constraint::Min(8),    // Breakdown
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_summary(frame, chunks[0], results);
    render_breakdown(frame, chunks[1], results, scroll, state);
    controls(frame, chunks[2], "j/k scroll  ·  r retake  ·  b back  ·  q quit");
}

fn render_summary(frame: &mut Frame, area: Rect, results: &ScoringResult) {
    let summary = &results.summary;
    let percentage = summary.percentage_score;

    let score_color = if percentage >= 80.0 {
        Color::Green
    } else if percentage >= 60.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    let content = vec![
        Line::from(Span::styled(
            "YOUR RESULT",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("{} / {} points", summary.earned_points, summary.total_points),
                Style::default().fg(Color::White).bold(),
            ),
            Span::raw("   "),
            Span::styled(
                format!("{percentage:.0}%  (grade {})", grade(percentage)),
                Style::default().fg(score_color).bold(),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!("{} correct", summary.correct_count),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!("  ·  {} incorrect", summary.incorrect_count),
                Style::default().fg(Color::Red),
            ),
            Span::styled(
                format!("  ·  {} questions", summary.total_questions),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(widget, area);
}

fn render_breakdown(
    frame: &mut Frame,
    area: Rect,
    results: &ScoringResult,
    scroll: usize,
    state: &StoreState,
) {
    // Rows whose question no longer resolves in the loaded test are
    // skipped rather than treated as fatal.
    let mut lines: Vec<Line> = Vec::new();
    for (index, result) in results.results.iter().enumerate() {
        let Some(question) = state
            .current_test
            .as_ref()
            .and_then(|t| t.question_by_id(&result.question_id))
        else {
            continue;
        };

        let (symbol, color) = if result.correct {
            ("+", Color::Green)
        } else {
            ("-", Color::Red)
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {symbol} "), Style::default().fg(color)),
            Span::styled(format!("{:2}. ", index + 1), Style::default().fg(Color::DarkGray)),
            Span::styled(truncate(&question.text, 46), Style::default().fg(Color::White)),
            Span::styled(
                format!("  {}/{} pt", result.points, result.possible_points),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

        let user_answer = format_user_answer(question, results.answers.get(&result.question_id));
        lines.push(Line::from(vec![
            Span::raw("      "),
            Span::styled("your answer: ", Style::default().fg(Color::DarkGray)),
            Span::styled(truncate(&user_answer, 60), Style::default().fg(color)),
        ]));

        if !result.correct {
            lines.push(Line::from(vec![
                Span::raw("      "),
                Span::styled("correct: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    truncate(&question.kind.correct_answer_display(), 60),
                    Style::default().fg(Color::Green),
                ),
            ]));
        }
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines)
        .scroll((scroll as u16, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Breakdown ")
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

fn format_user_answer(question: &Question, answer: Option<&AnswerValue>) -> String {
    let Some(answer) = answer else {
        return "no answer".to_string();
    };

    match &question.kind {
        QuestionKind::Single { .. } => answer.as_str().unwrap_or_default().to_string(),
        QuestionKind::Multiple { .. } => match answer.selections() {
            Some(selected) if !selected.is_empty() => selected.join(", "),
            _ => "no options selected".to_string(),
        },
        QuestionKind::Text { .. } => {
            let text = answer.as_str().unwrap_or_default().trim();
            if text.is_empty() {
                "no answer given".to_string()
            } else {
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(kind: QuestionKind) -> Question {
        Question { id: "q".into(), text: "?".into(), points: 1, kind }
    }

    #[test]
    fn missing_answers_get_placeholders() {
        let multiple = question(QuestionKind::Multiple {
            options: vec!["a".into()],
            correct_answers: vec!["a".into()],
        });
        assert_eq!(format_user_answer(&multiple, None), "no answer");
        assert_eq!(
            format_user_answer(&multiple, Some(&AnswerValue::Multiple(vec![]))),
            "no options selected"
        );

        let text = question(QuestionKind::Text { correct_answer_text: "x".into() });
        assert_eq!(
            format_user_answer(&text, Some(&AnswerValue::Text("  ".into()))),
            "no answer given"
        );
    }

    #[test]
    fn answers_are_joined_for_display() {
        let multiple = question(QuestionKind::Multiple {
            options: vec!["a".into(), "b".into()],
            correct_answers: vec!["a".into()],
        });
        assert_eq!(
            format_user_answer(
                &multiple,
                Some(&AnswerValue::Multiple(vec!["a".into(), "b".into()]))
            ),
            "a, b"
        );
    }
}
