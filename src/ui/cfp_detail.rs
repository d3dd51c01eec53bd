//! CFP detail screen rendering
//!
//! Renders the full field set of one CFP, including the derived
//! open/hybrid/free flags, in a scrollable paragraph.

use chrono::NaiveDateTime;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::CfpRecord;

/// Renders the CFP detail view for the record the app is focused on
pub fn render(frame: &mut Frame, app: &App) {
    let Some(record) = app.detail_record() else {
        let message = Paragraph::new("CFP not found. Press Esc to go back.")
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title(" Details "));
        frame.render_widget(message, frame.area());
        return;
    };

    let title = format!(
        " {} (#{}) ",
        record.name.as_deref().unwrap_or("(unnamed)"),
        record.event_id
    );

    let paragraph = Paragraph::new(detail_lines(record))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .scroll((app.detail_scroll_offset, 0));

    frame.render_widget(paragraph, frame.area());
}

fn detail_lines(record: &CfpRecord) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    section(&mut lines, "Call for papers");
    field(&mut lines, "Status", open_status(record));
    field(&mut lines, "Opens", format_opt_date(record.cfp_start));
    field(&mut lines, "Closes", format_opt_date(record.cfp_end));
    field(&mut lines, "Opens (UTC)", format_opt_date(record.cfp_start_utc));
    field(&mut lines, "Closes (UTC)", format_opt_date(record.cfp_end_utc));
    field(&mut lines, "Submit at", text(record.cfp_link.as_deref()));

    section(&mut lines, "Event");
    field(&mut lines, "Organizer", text(record.organizer.as_deref()));
    field(&mut lines, "Website", text(record.website.as_deref()));
    field(&mut lines, "Starts", format_opt_date(record.event_start));
    field(&mut lines, "Ends", format_opt_date(record.event_end));
    field(&mut lines, "All dates", text(record.event_all_dates.as_deref()));
    field(&mut lines, "Format", event_format(record));
    field(&mut lines, "Kind", event_kind(record));
    field(&mut lines, "Speaker costs", expenses(record));

    section(&mut lines, "Location");
    field(&mut lines, "Venue", text(record.location_full.as_deref()));
    field(&mut lines, "City", text(record.location_city.as_deref()));
    field(&mut lines, "State", text(record.location_state.as_deref()));
    field(&mut lines, "Country", text(record.location_country.as_deref()));
    field(&mut lines, "Coordinates", text(record.location_coordinates.as_deref()));
    field(&mut lines, "Listed country", listed_country(record));
    field(&mut lines, "Listed city", text(record.city.as_deref()));
    field(&mut lines, "Timezone", timezone(record));

    section(&mut lines, "Classification");
    field(&mut lines, "Tags", text(record.tags.as_deref()));
    field(&mut lines, "Topics", text(record.topics.as_deref()));
    field(&mut lines, "Session formats", text(record.session_formats.as_deref()));
    field(&mut lines, "Categories", text(record.categories.as_deref()));

    section(&mut lines, "Links");
    field(&mut lines, "Twitter", text(record.links_twitter.as_deref()));
    field(&mut lines, "LinkedIn", text(record.links_linkedin.as_deref()));
    field(&mut lines, "Facebook", text(record.links_facebook.as_deref()));
    field(&mut lines, "Instagram", text(record.links_instagram.as_deref()));

    if let Some(description) = record.description.as_deref() {
        section(&mut lines, "Description");
        lines.push(Line::from(format!("  {}", description)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  fetched {}", record.last_updated.format("%Y-%m-%d %H:%M:%S UTC")),
        Style::default().fg(Color::DarkGray),
    )));

    lines
}

fn section(lines: &mut Vec<Line<'static>>, name: &str) {
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        format!(" {}", name),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
}

fn field(lines: &mut Vec<Line<'static>>, label: &str, value: String) {
    lines.push(Line::from(vec![
        Span::styled(
            format!("  {:<16}", label),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(value),
    ]));
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or("n/a").to_string()
}

fn format_opt_date(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

fn open_status(record: &CfpRecord) -> String {
    if record.is_open() {
        "Open".to_string()
    } else {
        "Closed".to_string()
    }
}

fn event_format(record: &CfpRecord) -> String {
    if record.is_hybrid() {
        "Hybrid".to_string()
    } else if record.is_in_person() {
        "In person".to_string()
    } else if record.is_likely_online_only() {
        "Online (likely online-only)".to_string()
    } else {
        "Online".to_string()
    }
}

fn event_kind(record: &CfpRecord) -> String {
    let mut parts = Vec::new();
    parts.push(if record.is_user_group {
        "User group"
    } else {
        "Conference"
    });
    parts.push(if record.is_paid { "paid entry" } else { "free entry" });
    if record.is_test {
        parts.push("test listing");
    }
    parts.join(", ")
}

fn expenses(record: &CfpRecord) -> String {
    let mut covered = Vec::new();
    if record.is_free() {
        covered.push("conference fee");
    }
    if record.accommodation_covered {
        covered.push("accommodation");
    }
    if record.travel_covered {
        covered.push("travel");
    }
    if covered.is_empty() {
        "not covered".to_string()
    } else {
        format!("covers {}", covered.join(", "))
    }
}

/// The top-level country, which upstream populates independently of the
/// location object and which may disagree with it.
fn listed_country(record: &CfpRecord) -> String {
    match (record.country.as_deref(), record.country_code.as_deref()) {
        (Some(country), Some(code)) => format!("{} ({})", country, code),
        (Some(country), None) => country.to_string(),
        (None, Some(code)) => code.to_string(),
        (None, None) => "n/a".to_string(),
    }
}

fn timezone(record: &CfpRecord) -> String {
    match (
        record.timezone_iana.as_deref(),
        record.timezone_windows.as_deref(),
    ) {
        (Some(iana), _) => iana.to_string(),
        (None, Some(windows)) => windows.to_string(),
        (None, None) => "n/a".to_string(),
    }
}
