//! Shared constants
//!
//! Domain values shared between the engine and the front end.

use std::time::Duration;

/// Account names treated as system-owned (compared lower-cased)
pub const SYSTEM_USERS: &[&str] = &[
    "root", "system", "daemon", "bin", "sys", "mail", "www-data", "nobody",
];

/// Default period of the auto-refresh timer
pub const AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Placeholder shown for display fields with no value yet
pub const UNSET: &str = "-";

/// Shown for host details the server did not report
pub const UNKNOWN: &str = "Unknown";

/// Status label used when a process has none
pub const UNKNOWN_STATUS: &str = "unknown";
