use std::fmt::Display;

use chrono::TimeZone;
use risklens_core::{is_critical_severity, DashboardViewModel, RiskEvent};

const RULE: &str = "------------------------------------------------------------";

/// Renders a published view as terminal lines. Times are shown in `tz`.
pub fn render<Tz>(view: &DashboardViewModel, tz: &Tz) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut lines = Vec::new();

    lines.push(header_line(view, tz));
    lines.push(RULE.to_string());

    lines.push("Executive summary".to_string());
    if view.loading && view.summary.is_empty() {
        lines.push("  Loading summary...".to_string());
    } else if view.summary.is_empty() {
        lines.push("  No summary available.".to_string());
    } else {
        lines.extend(view.summary.lines().map(|line| format!("  {line}")));
    }
    lines.push(String::new());

    lines.push(stats_line(view));
    if let Some(error) = &view.error {
        lines.push(format!("! Backend unavailable, showing fallback data: {error}"));
    }
    lines.push(String::new());

    lines.push("Event timeline".to_string());
    if view.events.is_empty() {
        lines.push(if view.loading {
            "  Loading events...".to_string()
        } else {
            "  No events reported.".to_string()
        });
    }
    for event in &view.events {
        lines.push(format_event(event));
        if !event.description.is_empty() {
            lines.push(format!("      {}", event.description));
        }
    }
    lines.push(RULE.to_string());
    lines.push("Commands: r = refresh, q = quit".to_string());

    lines
}

fn header_line<Tz>(view: &DashboardViewModel, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut header = String::from("RiskLens | Operational macro telemetry");
    if let Some(updated) = view.last_updated {
        header.push_str(&format!(
            " | Updated {}",
            updated.with_timezone(tz).format("%H:%M")
        ));
    }
    if view.loading {
        header.push_str(" | refreshing...");
    }
    if view.stats.critical > 0 {
        header.push_str(&format!(" | [{} critical]", view.stats.critical));
    }
    header
}

fn stats_line(view: &DashboardViewModel) -> String {
    let mut parts = vec![format!("Total {}", view.stats.total)];
    let mut shown: Vec<String> = Vec::new();
    for tag in &view.source_tags {
        let key = tag.trim().to_lowercase();
        if key.is_empty() || shown.contains(&key) {
            continue;
        }
        parts.push(format!("{} {}", tag_label(&key), view.stats.source_count(&key)));
        shown.push(key);
    }
    parts.push(format!("Critical {}", view.stats.critical));
    parts.join(" | ")
}

fn format_event(event: &RiskEvent) -> String {
    let severity = event
        .severity
        .as_ref()
        .map(|tag| tag.raw().to_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string());
    let marker = if event.severity_key().is_some_and(is_critical_severity) {
        '!'
    } else {
        ' '
    };
    let source = event
        .source_system
        .as_ref()
        .map_or("Unknown source", |tag| tag.raw());
    format!(
        "{marker} [{severity}] {source} / {kind} ({at})",
        kind = event.event_type,
        at = event.created_at
    )
}

/// Short tags read as acronyms ("HR", "IT"); longer ones are capitalized.
fn tag_label(tag: &str) -> String {
    if tag.chars().count() <= 3 {
        return tag.to_uppercase();
    }
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
