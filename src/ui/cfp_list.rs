//! CFP list screen rendering
//!
//! Renders the main list view showing the filtered and sorted CFPs with
//! their locations and submission deadlines, plus a status bar carrying
//! the active filter, sort, and refresh information.

use chrono::{Local, NaiveDateTime};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, InputMode};
use crate::data::CfpRecord;

/// Color for a submission deadline by how close it is
fn deadline_color(deadline: NaiveDateTime) -> Color {
    let days_left = (deadline - Local::now().naive_local()).num_days();
    if days_left < 0 {
        Color::DarkGray
    } else if days_left <= 7 {
        Color::Red
    } else if days_left <= 21 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Short location string for a list row: full location, top-level
/// city/country, or an online marker.
fn location_summary(record: &CfpRecord) -> String {
    if let Some(full) = record.location_full.as_deref() {
        return full.to_string();
    }
    match (record.city.as_deref(), record.country.as_deref()) {
        (Some(city), Some(country)) => format!("{}, {}", city, country),
        (Some(city), None) => city.to_string(),
        (None, Some(country)) => country.to_string(),
        (None, None) if record.is_online => "Online".to_string(),
        (None, None) => String::new(),
    }
}

/// Renders the CFP list view
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_title(frame, app, chunks[0]);
    render_rows(frame, app, chunks[1]);
    render_status(frame, app, chunks[2]);
    render_input(frame, app, chunks[3]);
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let scope = if app.open_only { "open CFPs" } else { "CFPs" };
    let title = Paragraph::new(format!(" cfpwatch - {} {}", app.results.len(), scope)).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(title, area);
}

fn render_rows(frame: &mut Frame, app: &App, area: Rect) {
    let height = area.height.saturating_sub(2) as usize;

    // Keep the selection inside the visible window
    let offset = if height == 0 {
        0
    } else if app.selected_index >= height {
        app.selected_index + 1 - height
    } else {
        0
    };

    let lines: Vec<Line> = app
        .results
        .iter()
        .enumerate()
        .skip(offset)
        .take(height.max(1))
        .map(|(i, record)| row_line(record, i == app.selected_index))
        .collect();

    let lines = if lines.is_empty() {
        vec![Line::from(Span::styled(
            "  No CFPs match the current filters",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        lines
    };

    let block = Block::default().borders(Borders::TOP | Borders::BOTTOM);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn row_line(record: &CfpRecord, selected: bool) -> Line<'static> {
    let marker = if selected { "> " } else { "  " };
    let name = record.name.clone().unwrap_or_else(|| "(unnamed)".to_string());
    let location = location_summary(record);

    let (deadline_text, deadline_style) = match record.cfp_end {
        Some(end) => (
            format!("closes {}", end.format("%Y-%m-%d")),
            Style::default().fg(deadline_color(end)),
        ),
        None => (
            "no deadline".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let base = if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::styled(marker.to_string(), base.fg(Color::Cyan)),
        Span::styled(format!("{:<38.38}", name), base),
        Span::styled(format!("{:<30.30}", location), base.fg(Color::Gray)),
        Span::styled(deadline_text, deadline_style),
    ])
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        format!(
            " sort: {} {}",
            app.sort_key.label(),
            if app.ascending { "asc" } else { "desc" }
        ),
        Style::default().fg(Color::Cyan),
    )];

    if !app.search_input.is_empty() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("search: {}", app.search_input),
            Style::default().fg(Color::Yellow),
        ));
    }

    if let Some(refreshed) = app.last_refresh {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("refreshed {}", refreshed.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if let Some(message) = &app.status_message {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.input_mode {
        InputMode::Search => Line::from(vec![
            Span::styled(" /", Style::default().fg(Color::Yellow)),
            Span::raw(app.search_input.clone()),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
        InputMode::GotoId => Line::from(vec![
            Span::styled(" #", Style::default().fg(Color::Yellow)),
            Span::raw(app.goto_input.clone()),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
        InputMode::Normal => Line::from(Span::styled(
            " / search  # goto id  o open-only  s sort  a direction  r refresh  ? help  q quit",
            Style::default().fg(Color::DarkGray),
        )),
    };

    frame.render_widget(Paragraph::new(line), area);
}
