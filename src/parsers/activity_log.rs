//! Parser for the activity log sources (OpenClaw logs, SSH events, cron
//! completions, system events). Lines look like:
//!
//! ```text
//! 2026-07-27T10:00:00Z INFO cron job 'backup-db' completed
//! 2026-07-27T10:00:05Z ERROR agent 'main' crashed
//! ```
//!
//! Produces one combined, time-ordered stream; the collector then splits it
//! into `errors` (level == ERROR) and `recent` (everything, newest-first).

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: f64,
    pub level: String,
    pub message: String,
}

pub fn parse_activity_log(input: &str) -> Vec<LogEntry> {
    input.lines().filter_map(parse_log_line).collect()
}

fn parse_log_line(line: &str) -> Option<LogEntry> {
    let mut parts = line.splitn(3, ' ');
    let timestamp_str = parts.next()?;
    let level = parts.next()?.to_string();
    let message = parts.next().unwrap_or("").to_string();

    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc)
        .timestamp() as f64;

    Some(LogEntry {
        timestamp,
        level,
        message,
    })
}

/// Splits a combined stream into `(errors, recent)`, both newest-first.
pub fn split_errors_and_recent(mut entries: Vec<LogEntry>) -> (Vec<LogEntry>, Vec<LogEntry>) {
    entries.sort_by(|a, b| b.timestamp.partial_cmp(&a.timestamp).unwrap());
    let errors = entries
        .iter()
        .filter(|e| e.level.eq_ignore_ascii_case("ERROR"))
        .cloned()
        .collect();
    (errors, entries)
}
