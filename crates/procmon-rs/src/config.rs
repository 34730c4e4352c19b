//! Client configuration
//!
//! Servers are described in a small YAML file (default `~/.procmon/config`):
//!
//! ```yaml
//! current: lab
//! servers:
//!   lab:
//!     url: http://10.0.0.5:8000/api/
//!     timeout_secs: 5
//! ```

use crate::error::ApiError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Base URL used when no config file and no explicit URL is given
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000/api/";

/// Request timeout used when a server entry does not set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Contents of the config file
#[derive(Debug, Clone, Deserialize)]
pub struct PilotConfig {
    /// Name of the server used when none is requested explicitly
    pub current: String,
    /// Known servers by name
    pub servers: HashMap<String, ServerEntry>,
}

/// One monitor server
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerEntry {
    /// Base URL of the API (scheme and `/api/` prefix are filled in if missing)
    pub url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerEntry {
    fn default() -> Self {
        Self::from_url(DEFAULT_SERVER_URL)
    }
}

impl PilotConfig {
    /// Load configuration from the default location (~/.procmon/config)
    pub fn load_default() -> Result<Self, ApiError> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: PilotConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Get the default config path (~/.procmon/config)
    pub fn default_path() -> Result<PathBuf, ApiError> {
        let home = dirs_next::home_dir().ok_or(ApiError::NoHomeDirectory)?;
        Ok(home.join(".procmon").join("config"))
    }

    /// Get the server named by `current`
    pub fn current_server(&self) -> Result<&ServerEntry, ApiError> {
        self.get_server(&self.current)
    }

    /// Get a specific server by name
    pub fn get_server(&self, name: &str) -> Result<&ServerEntry, ApiError> {
        self.servers
            .get(name)
            .ok_or_else(|| ApiError::ServerNotFound(name.to_string()))
    }
}

impl ServerEntry {
    /// Entry for an explicit URL with the default timeout
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Pick the server to talk to
    ///
    /// An explicit URL wins. Otherwise the config file is consulted (the given
    /// path or the default one) for the named server or its `current` entry.
    /// A missing default config file falls back to [`DEFAULT_SERVER_URL`];
    /// a missing explicitly requested file or server is an error.
    pub fn resolve(
        url: Option<&str>,
        server: Option<&str>,
        config_path: Option<&Path>,
    ) -> Result<Self, ApiError> {
        if let Some(url) = url {
            return Ok(Self::from_url(url));
        }

        let config = match config_path {
            Some(path) => PilotConfig::load_from(path)?,
            None => match PilotConfig::load_default() {
                Ok(config) => config,
                Err(ApiError::ConfigNotFound(path)) if server.is_none() => {
                    tracing::info!(
                        "No config at {}, using {}",
                        path,
                        DEFAULT_SERVER_URL
                    );
                    return Ok(Self::default());
                }
                Err(e) => return Err(e),
            },
        };

        let entry = match server {
            Some(name) => config.get_server(name)?,
            None => config.current_server()?,
        };
        Ok(entry.clone())
    }

    /// Normalized base URL: scheme present, `/api/` added to a bare authority,
    /// always ending in `/` so relative endpoints resolve under it
    pub fn base_url(&self) -> String {
        let url = self.url.trim();
        let with_scheme = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("http://{}", url)
        };

        let authority_start = with_scheme.find("://").map(|i| i + 3).unwrap_or(0);
        if !with_scheme[authority_start..].contains('/') {
            format!("{}/api/", with_scheme)
        } else if with_scheme.ends_with('/') {
            with_scheme
        } else {
            format!("{}/", with_scheme)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
current: lab
servers:
  lab:
    url: http://10.0.0.5:8000/api/
    timeout_secs: 5
  prod:
    url: monitor.example.com
"#;
        let config: PilotConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.current, "lab");
        assert_eq!(config.servers.len(), 2);

        let lab = config.current_server().unwrap();
        assert_eq!(lab.timeout_secs, 5);

        let prod = config.get_server("prod").unwrap();
        assert_eq!(prod.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_unknown_server() {
        let yaml = "current: missing\nservers: {}\n";
        let config: PilotConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.current_server(),
            Err(ApiError::ServerNotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_base_url_normalization() {
        assert_eq!(
            ServerEntry::from_url("http://10.0.0.5:8000/api/").base_url(),
            "http://10.0.0.5:8000/api/"
        );
        assert_eq!(
            ServerEntry::from_url("10.0.0.5:8000").base_url(),
            "http://10.0.0.5:8000/api/"
        );
        assert_eq!(
            ServerEntry::from_url("https://mon.example.com/monitor/api").base_url(),
            "https://mon.example.com/monitor/api/"
        );
    }

    #[test]
    fn test_resolve_prefers_explicit_url() {
        let entry = ServerEntry::resolve(Some("localhost:9000"), Some("ignored"), None).unwrap();
        assert_eq!(entry.base_url(), "http://localhost:9000/api/");
    }

    #[test]
    fn test_resolve_missing_explicit_file_is_error() {
        let path = Path::new("/nonexistent/procmon/config");
        assert!(matches!(
            ServerEntry::resolve(None, None, Some(path)),
            Err(ApiError::ConfigNotFound(_))
        ));
    }
}
