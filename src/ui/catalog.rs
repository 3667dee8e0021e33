//! Catalog screen: paginated test list with search and tag filter.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::app::App;
use crate::store::StoreState;

use super::{controls, error_line, loading_suffix, truncate};

pub fn render(frame: &mut Frame, area: Rect, app: &App, state: &StoreState) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Length(3), // Filters
        Constraint::Min(8),    // Test list
        Constraint::Length(1), // Pagination
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], state);
    render_filters(frame, chunks[1], app);
    render_list(frame, chunks[2], app, state);
    render_pagination(frame, chunks[3], state);
    controls(
        frame,
        chunks[4],
        "enter open  ·  c create  ·  d delete  ·  / search  ·  t tag  ·  x reset  ·  n/p page  ·  r refresh  ·  q quit",
    );
}

fn render_header(frame: &mut Frame, area: Rect, state: &StoreState) {
    let title = format!("QUIZDECK  ·  TEST CATALOG{}", loading_suffix(state));
    let mut lines = vec![Line::from(Span::styled(
        title,
        Style::default().fg(Color::Cyan).bold(),
    ))];
    if let Some(error) = &state.error {
        lines.push(error_line(error));
    }

    let widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_filters(frame: &mut Frame, area: Rect, app: &App) {
    let catalog = &app.catalog;

    let search = if catalog.searching {
        Span::styled(
            format!("search: {}_", catalog.search_input),
            Style::default().fg(Color::Yellow).bold(),
        )
    } else {
        match &catalog.active_search {
            Some(term) => Span::styled(
                format!("search: {term}"),
                Style::default().fg(Color::White),
            ),
            None => Span::styled("search: -", Style::default().fg(Color::DarkGray)),
        }
    };

    let tag = match &catalog.active_tag {
        Some(tag) => Span::styled(format!("tag: {tag}"), Style::default().fg(Color::White)),
        None => Span::styled("tag: all", Style::default().fg(Color::DarkGray)),
    };

    let line = Line::from(vec![search, Span::raw("    "), tag]);
    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_list(frame: &mut Frame, area: Rect, app: &App, state: &StoreState) {
    if state.tests.is_empty() {
        let message = if state.loading {
            "Loading tests..."
        } else {
            "No tests found. Press [c] to create one."
        };
        let widget = Paragraph::new(message)
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

    let lines: Vec<Line> = state
        .tests
        .iter()
        .enumerate()
        .map(|(i, test)| {
            let is_selected = i == app.catalog.selected;
            let armed = app.catalog.pending_delete.as_deref() == Some(test.id.as_str());
            let prefix = if is_selected { "> " } else { "  " };

            let style = if is_selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };

            let mut spans = vec![
                Span::styled(prefix, style),
                Span::styled(truncate(&test.title, 40), style),
                Span::styled(
                    format!("  ({} questions)", test.questions.len()),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if !test.tags.is_empty() {
                spans.push(Span::styled(
                    format!("  [{}]", test.tags.join(", ")),
                    Style::default().fg(Color::Cyan),
                ));
            }
            if armed {
                spans.push(Span::styled(
                    "  press d again to delete",
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
            .title(" Tests ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_pagination(frame: &mut Frame, area: Rect, state: &StoreState) {
    let p = state.pagination;
    let previous = if p.has_previous() { "[p] prev" } else { "       " };
    let next = if p.has_next() { "[n] next" } else { "        " };

    let line = Line::from(vec![
        Span::styled(previous, Style::default().fg(Color::Gray)),
        Span::styled(
            format!("   page {} / {}  ·  {} tests   ", p.page, p.total_pages(), p.total),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(next, Style::default().fg(Color::Gray)),
    ]);

    let widget = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}
