//! Wire types for the process monitor API
//!
//! Everything here mirrors the JSON served by the monitor backend. Fields the
//! server may send as `null` or omit entirely fall back to defaults instead of
//! failing the whole response.

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ==================== Host Types ====================

/// A monitored host as listed by `GET hosts/`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HostInfo {
    pub hostname: String,
    #[serde(default)]
    pub os_info: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_seen: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_seen: String,
    #[serde(default)]
    pub cpu_cores: Option<u32>,
    /// Free-form frequency label reported by the agent (e.g. "2400.00 MHz")
    #[serde(default)]
    pub cpu_frequency: Option<String>,
    #[serde(default)]
    pub total_memory_gb: Option<f64>,
    #[serde(default)]
    pub disk_usage_percent: Option<f64>,
    #[serde(default)]
    pub disk_total_gb: Option<f64>,
    #[serde(default)]
    pub disk_free_gb: Option<f64>,
    /// Free-form uptime label (e.g. "3d 4h")
    #[serde(default)]
    pub uptime: Option<String>,
}

impl HostInfo {
    /// Label used in host pickers: "hostname (os)"
    pub fn display_label(&self) -> String {
        format!(
            "{} ({})",
            self.hostname,
            self.os_info.as_deref().unwrap_or("Unknown OS")
        )
    }
}

// ==================== Process Types ====================

/// One process in a host's process forest
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProcessNode {
    pub pid: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub cmdline: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub cpu_percent: Option<f64>,
    #[serde(default)]
    pub memory_percent: Option<f64>,
    #[serde(default)]
    pub memory_rss: Option<u64>,
    #[serde(default)]
    pub memory_vms: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<ProcessNode>,
}

impl ProcessNode {
    /// Lower-cased status, "unknown" when the server sent none
    pub fn status_label(&self) -> String {
        self.status
            .as_deref()
            .unwrap_or("unknown")
            .to_lowercase()
    }

    pub fn cpu_percent_or_zero(&self) -> f64 {
        self.cpu_percent.unwrap_or(0.0)
    }

    pub fn memory_percent_or_zero(&self) -> f64 {
        self.memory_percent.unwrap_or(0.0)
    }

    pub fn memory_rss_or_zero(&self) -> u64 {
        self.memory_rss.unwrap_or(0)
    }

    pub fn memory_vms_or_zero(&self) -> u64 {
        self.memory_vms.unwrap_or(0)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Command line if present, otherwise the process name
    pub fn display_command(&self) -> &str {
        match self.cmdline.as_deref() {
            Some(cmd) if !cmd.is_empty() => cmd,
            _ => &self.name,
        }
    }

    /// Copy this node's own fields, replacing its children
    pub fn with_children(&self, children: Vec<ProcessNode>) -> ProcessNode {
        ProcessNode {
            pid: self.pid,
            name: self.name.clone(),
            cmdline: self.cmdline.clone(),
            username: self.username.clone(),
            status: self.status.clone(),
            cpu_percent: self.cpu_percent,
            memory_percent: self.memory_percent,
            memory_rss: self.memory_rss,
            memory_vms: self.memory_vms,
            children,
        }
    }
}

/// Latest process snapshot for a host, as served by `GET hosts/{host}/processes/`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HostSnapshot {
    pub hostname: String,
    /// Server timestamp, kept verbatim and parsed only for display
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    /// Process count reported by the server; may exceed the nodes in the tree
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_processes: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub process_tree: Vec<ProcessNode>,
}

// ==================== Resource Types ====================

/// Envelope of `GET hosts/{host}/resources/`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResourcesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub system_resources: SystemResources,
}

/// Aggregate resource usage computed server-side from the latest snapshot
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SystemResources {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_cpu_percent: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_memory_rss: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_cpu_processes: Vec<TopCpuProcess>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_memory_processes: Vec<TopMemoryProcess>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TopCpuProcess {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub pid: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TopMemoryProcess {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub pid: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory_rss: u64,
}
