//! High-level process monitor API client
//!
//! Thin typed wrapper over the monitor's JSON endpoints.

use crate::config::ServerEntry;
use crate::error::ApiError;
use crate::model::{HostInfo, HostSnapshot, ResourcesResponse, SystemResources};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// High-level client for the process monitor API
#[derive(Clone)]
pub struct MonitorClient {
    http: reqwest::Client,
    /// Base URL, always ending in `/`
    base_url: Url,
    timeout: Duration,
}

impl std::fmt::Debug for MonitorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MonitorClient {
    /// Create a new client for a server entry
    pub fn new(entry: &ServerEntry) -> Result<Self, ApiError> {
        let raw = entry.base_url();
        let base_url =
            Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(raw));
        }

        let timeout = Duration::from_secs(entry.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("procmon-pilot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build an endpoint URL under the base, one path segment per entry
    ///
    /// Segments are percent-encoded individually, so a host name can never
    /// escape its segment. The result keeps the trailing slash the backend
    /// routes expect.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
            path.push("");
        }
        Ok(url)
    }

    /// GET a JSON document, treating any non-2xx status as an error
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status));
        }
        Ok(response.json::<T>().await?)
    }

    /// List all hosts known to the server
    pub async fn hosts(&self) -> Result<Vec<HostInfo>, ApiError> {
        let url = self.endpoint(&["hosts"])?;
        self.get_json(url).await
    }

    /// Latest process snapshot (as a forest) for a host
    pub async fn processes(&self, hostname: &str) -> Result<HostSnapshot, ApiError> {
        let url = self.endpoint(&["hosts", hostname, "processes"])?;
        self.get_json(url).await
    }

    /// Aggregate resource usage for a host
    pub async fn resources(&self, hostname: &str) -> Result<SystemResources, ApiError> {
        let url = self.endpoint(&["hosts", hostname, "resources"])?;
        let response: ResourcesResponse = self.get_json(url).await?;
        Ok(response.system_resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> MonitorClient {
        MonitorClient::new(&ServerEntry::from_url(url)).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_trailing_slash() {
        let client = client("http://127.0.0.1:8000/api/");
        let url = client.endpoint(&["hosts"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/hosts/");

        let url = client.endpoint(&["hosts", "web-1", "processes"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/hosts/web-1/processes/");
    }

    #[test]
    fn test_endpoint_encodes_hostname() {
        let client = client("http://mon:8000/api");
        let url = client.endpoint(&["hosts", "a/b c", "resources"]).unwrap();
        assert_eq!(url.as_str(), "http://mon:8000/api/hosts/a%2Fb%20c/resources/");
    }

    #[test]
    fn test_timeout_from_entry() {
        let entry = ServerEntry {
            url: "mon:8000".to_string(),
            timeout_secs: 3,
        };
        let client = MonitorClient::new(&entry).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(3));
        assert_eq!(client.base_url(), "http://mon:8000/api/");
    }

    #[test]
    fn test_invalid_url() {
        let entry = ServerEntry::from_url("http://bad host:8000/api/");
        assert!(matches!(
            MonitorClient::new(&entry),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
