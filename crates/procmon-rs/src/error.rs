//! Error types for the process monitor client

use thiserror::Error;

/// Errors returned by [`MonitorClient`](crate::MonitorClient) and config loading
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network, timeout or body decoding failure reported by reqwest
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    #[error("Invalid config: {0}")]
    ConfigInvalid(String),

    #[error("Server '{0}' not found in config")]
    ServerNotFound(String),

    #[error("Could not determine home directory")]
    NoHomeDirectory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ApiError {
    /// Build a status error from a response status code
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    /// Whether the request never produced a usable response (connect, timeout)
    pub fn is_transport(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}
