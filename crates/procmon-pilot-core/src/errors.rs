//! Error formatting utilities
//!
//! Provides user-friendly error message formatting for monitor API errors.

use procmon_rs::ApiError;

/// Format an ApiError into a user-friendly message
///
/// Transforms technical error messages into actionable, human-readable text.
///
/// # Examples
///
/// ```
/// use procmon_pilot_core::errors::format_api_error;
/// use procmon_rs::ApiError;
///
/// let error = ApiError::Status { status: 404, reason: "Not Found".to_string() };
/// let message = format_api_error(&error);
/// assert!(message.contains("404"));
/// ```
pub fn format_api_error(error: &ApiError) -> String {
    match error {
        ApiError::Http(e) => {
            if e.is_timeout() {
                "Request timed out - server may be slow or unreachable".to_string()
            } else if e.is_connect() {
                format_connection_error(&error_chain(e))
            } else if e.is_decode() {
                "Unexpected response from server - check the API URL".to_string()
            } else {
                format!("Request failed: {}", error_chain(e))
            }
        }
        ApiError::Status { status, reason } => format_status_error(*status, reason),
        ApiError::InvalidUrl(url) => format!("Invalid server URL: {}", url),
        ApiError::ConfigNotFound(path) => format!("Config not found: {}", path),
        ApiError::ConfigInvalid(msg) => format!("Invalid config: {}", msg),
        ApiError::ServerNotFound(name) => format!("Server '{}' not found in config", name),
        _ => error.to_string(),
    }
}

/// Join an error with its sources
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Format a connection error message
fn format_connection_error(msg: &str) -> String {
    let lower = msg.to_lowercase();
    if lower.contains("refused") {
        "Connection refused - is the monitor server running?".to_string()
    } else if lower.contains("dns") || lower.contains("resolve") {
        "DNS resolution failed - check the server hostname".to_string()
    } else if lower.contains("certificate") || lower.contains("tls") {
        "TLS/certificate error - check the server URL scheme".to_string()
    } else {
        format!("Connection failed: {}", msg)
    }
}

/// Format a non-2xx response
fn format_status_error(status: u16, reason: &str) -> String {
    match status {
        404 => "Not found (HTTP 404) - host may have no snapshot yet".to_string(),
        401 | 403 => format!("Access denied (HTTP {})", status),
        500..=599 => format!("Server error (HTTP {} {})", status, reason),
        _ => format!("HTTP {}: {}", status, reason),
    }
}

/// Categorize an error for display purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network/connection issues
    Network,
    /// Server answered with an error status
    Server,
    /// Configuration issues
    Config,
    /// Timeout issues
    Timeout,
    /// Resource not found
    NotFound,
    /// Other/unknown issues
    Other,
}

impl ErrorCategory {
    /// Get a short label for the category
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network",
            ErrorCategory::Server => "Server",
            ErrorCategory::Config => "Config",
            ErrorCategory::Timeout => "Timeout",
            ErrorCategory::NotFound => "Not Found",
            ErrorCategory::Other => "Error",
        }
    }
}

/// Categorize an ApiError
pub fn categorize_error(error: &ApiError) -> ErrorCategory {
    match error {
        ApiError::Http(e) if e.is_timeout() => ErrorCategory::Timeout,
        ApiError::Http(e) if e.is_connect() || e.is_request() => ErrorCategory::Network,
        ApiError::Http(_) => ErrorCategory::Other,
        ApiError::Status { status: 404, .. } => ErrorCategory::NotFound,
        ApiError::Status { .. } => ErrorCategory::Server,
        ApiError::InvalidUrl(_)
        | ApiError::ConfigNotFound(_)
        | ApiError::ConfigInvalid(_)
        | ApiError::ServerNotFound(_)
        | ApiError::NoHomeDirectory
        | ApiError::Yaml(_) => ErrorCategory::Config,
        ApiError::Io(_) => ErrorCategory::Other,
    }
}
