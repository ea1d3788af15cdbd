//! Formatting and parsing helpers for times and durations.

use chrono::{Duration, NaiveTime};

use crate::types::TIME_FORMAT;

/// Format a duration as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_hms(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Format a time of day as `HH:MM:SS`.
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Parse a time of day typed by the operator.
///
/// Accepts `HH:MM:SS`, `HH:MM`, `HHMMSS` and `HHMM`.
pub fn parse_clock(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    if input.contains(':') {
        return NaiveTime::parse_from_str(input, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
            .ok();
    }

    if !input.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match input.len() {
        4 => NaiveTime::parse_from_str(input, "%H%M").ok(),
        6 => NaiveTime::parse_from_str(input, "%H%M%S").ok(),
        _ => None,
    }
}
