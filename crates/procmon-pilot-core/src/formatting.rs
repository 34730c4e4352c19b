//! Formatting utilities for consistent display across the application
//!
//! Provides functions for formatting bytes, durations, percentages and
//! server timestamps for user display.

use crate::constants::UNSET;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

// Byte size constants
const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;
const TB: u64 = GB * 1024;

/// Format bytes into a human-readable string
///
/// # Examples
///
/// ```
/// use procmon_pilot_core::formatting::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// assert_eq!(format_bytes(1_572_864), "1.5 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Bytes to whole MiB, rounded to nearest
///
/// ```
/// use procmon_pilot_core::formatting::bytes_to_mib;
///
/// assert_eq!(bytes_to_mib(1_048_576), 1);
/// assert_eq!(bytes_to_mib(1_572_864), 2);
/// assert_eq!(bytes_to_mib(0), 0);
/// ```
pub fn bytes_to_mib(bytes: u64) -> u64 {
    (bytes as f64 / MB as f64).round() as u64
}

/// Format a percentage value
///
/// # Examples
///
/// ```
/// use procmon_pilot_core::formatting::format_percent;
///
/// assert_eq!(format_percent(75.5), "75.5%");
/// assert_eq!(format_percent(100.0), "100.0%");
/// ```
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Format a duration in a human-readable way
///
/// Chooses the most appropriate unit for the duration.
pub fn format_duration_human(duration: Duration) -> String {
    let secs = duration.num_seconds().abs();

    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}

/// Parse a server timestamp
///
/// Accepts RFC 3339 and naive ISO forms (taken as UTC), with or without
/// fractional seconds.
pub fn parse_server_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Format a server timestamp in local time
///
/// Empty input gives the unset placeholder; unparseable input is shown as-is.
pub fn format_server_timestamp(raw: &str) -> String {
    if raw.trim().is_empty() {
        return UNSET.to_string();
    }
    match parse_server_timestamp(raw) {
        Some(ts) => ts
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => raw.to_string(),
    }
}

/// Format time relative to now (e.g., "5m ago")
pub fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);

    if duration < Duration::zero() {
        "in the future".to_string()
    } else {
        format!("{} ago", format_duration_human(duration))
    }
}

/// Truncate a string to a maximum length with ellipsis
///
/// # Examples
///
/// ```
/// use procmon_pilot_core::formatting::truncate_string;
///
/// assert_eq!(truncate_string("Hello, World!", 10), "Hello, ...");
/// assert_eq!(truncate_string("Short", 10), "Short");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a count with singular/plural form
///
/// # Examples
///
/// ```
/// use procmon_pilot_core::formatting::pluralize;
///
/// assert_eq!(pluralize(1, "host", "hosts"), "1 host");
/// assert_eq!(pluralize(0, "host", "hosts"), "0 hosts");
/// ```
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
