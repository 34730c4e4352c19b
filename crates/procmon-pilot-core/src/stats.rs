//! Summary statistics for the process view
//!
//! Everything here is derived from server data that was never filtered, so
//! the numbers describe the host rather than what the filter currently shows.
//! Each summary renders to label/value pairs through a `fields` constructor
//! that takes an `Option`, so an unset summary shows the same labels with
//! the [`UNSET`] placeholder.

use crate::constants::{UNKNOWN, UNSET};
use crate::formatting::{bytes_to_mib, format_server_timestamp};
use crate::traversal::{flatten, histogram_by_status};
use procmon_rs::{HostInfo, HostSnapshot, SystemResources};

/// Label/value pairs ready for rendering
pub type DisplayFields = Vec<(&'static str, String)>;

/// Process counts for one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStats {
    /// Server-reported total, authoritative over the node count
    pub total: u64,
    pub running: usize,
    pub sleeping: usize,
    /// Snapshot timestamp as sent by the server
    pub last_update: String,
}

impl ProcessStats {
    pub fn from_snapshot(snapshot: &HostSnapshot) -> Self {
        let histogram = histogram_by_status(flatten(&snapshot.process_tree));
        Self {
            total: snapshot.total_processes,
            running: histogram.get("running").copied().unwrap_or(0),
            sleeping: histogram.get("sleeping").copied().unwrap_or(0),
            last_update: snapshot.timestamp.clone(),
        }
    }

    pub fn fields(stats: Option<&Self>) -> DisplayFields {
        match stats {
            Some(s) => vec![
                ("Total", s.total.to_string()),
                ("Running", s.running.to_string()),
                ("Sleeping", s.sleeping.to_string()),
                ("Updated", format_server_timestamp(&s.last_update)),
            ],
            None => unset(&["Total", "Running", "Sleeping", "Updated"]),
        }
    }
}

/// Host-wide resource usage, as shown in the resources panel
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSummary {
    pub total_cpu_percent: f64,
    /// Total resident memory in whole MiB
    pub total_memory_mib: u64,
    /// Name and CPU percent of the busiest process
    pub top_cpu: Option<(String, f64)>,
    /// Name and resident MiB of the largest process
    pub top_memory: Option<(String, u64)>,
}

impl ResourceSummary {
    pub fn from_resources(resources: &SystemResources) -> Self {
        Self {
            total_cpu_percent: resources.total_cpu_percent,
            total_memory_mib: bytes_to_mib(resources.total_memory_rss),
            top_cpu: resources
                .top_cpu_processes
                .first()
                .map(|p| (p.name.clone(), p.cpu_percent)),
            top_memory: resources
                .top_memory_processes
                .first()
                .map(|p| (p.name.clone(), bytes_to_mib(p.memory_rss))),
        }
    }

    pub fn fields(summary: Option<&Self>) -> DisplayFields {
        let Some(s) = summary else {
            return unset(&["CPU", "Memory", "Top CPU", "Top Memory"]);
        };
        vec![
            ("CPU", format!("{}%", s.total_cpu_percent)),
            ("Memory", format!("{} MB", s.total_memory_mib)),
            (
                "Top CPU",
                s.top_cpu
                    .as_ref()
                    .map(|(name, pct)| format!("{} ({}%)", name, pct))
                    .unwrap_or_else(|| UNSET.to_string()),
            ),
            (
                "Top Memory",
                s.top_memory
                    .as_ref()
                    .map(|(name, mib)| format!("{} ({} MB)", name, mib))
                    .unwrap_or_else(|| UNSET.to_string()),
            ),
        ]
    }
}

/// Host identity and hardware description, as shown in the host panel
#[derive(Debug, Clone, PartialEq)]
pub struct HostSpecs {
    pub hostname: String,
    pub ip_address: String,
    pub os: String,
    pub first_seen: String,
    pub last_seen: String,
    pub cpu_cores: String,
    pub cpu_frequency: String,
    pub total_memory: String,
    pub disk_usage: String,
    pub uptime: String,
}

impl HostSpecs {
    pub fn from_host_info(host: &HostInfo) -> Self {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .unwrap_or(UNKNOWN)
                .to_string()
        };

        let disk_usage = match (host.disk_usage_percent, host.disk_total_gb) {
            (Some(pct), Some(total)) if pct != 0.0 && total != 0.0 => {
                format!("{}% ({} GB free)", pct, host.disk_free_gb.unwrap_or(0.0))
            }
            _ => UNKNOWN.to_string(),
        };

        Self {
            hostname: host.hostname.clone(),
            ip_address: text(&host.ip_address),
            os: host
                .os_info
                .clone()
                .filter(|os| !os.is_empty())
                .unwrap_or_else(|| "Unknown OS".to_string()),
            first_seen: format_server_timestamp(&host.first_seen),
            last_seen: format_server_timestamp(&host.last_seen),
            cpu_cores: match host.cpu_cores {
                Some(cores) if cores > 0 => cores.to_string(),
                _ => UNKNOWN.to_string(),
            },
            cpu_frequency: text(&host.cpu_frequency),
            total_memory: match host.total_memory_gb {
                Some(gb) if gb != 0.0 => format!("{} GB", gb),
                _ => UNKNOWN.to_string(),
            },
            disk_usage,
            uptime: text(&host.uptime),
        }
    }

    pub fn fields(specs: Option<&Self>) -> DisplayFields {
        let Some(s) = specs else {
            return unset(&[
                "Hostname",
                "IP Address",
                "OS",
                "First Seen",
                "Last Seen",
                "CPU Cores",
                "CPU Frequency",
                "Memory",
                "Disk",
                "Uptime",
            ]);
        };
        vec![
            ("Hostname", s.hostname.clone()),
            ("IP Address", s.ip_address.clone()),
            ("OS", s.os.clone()),
            ("First Seen", s.first_seen.clone()),
            ("Last Seen", s.last_seen.clone()),
            ("CPU Cores", s.cpu_cores.clone()),
            ("CPU Frequency", s.cpu_frequency.clone()),
            ("Memory", s.total_memory.clone()),
            ("Disk", s.disk_usage.clone()),
            ("Uptime", s.uptime.clone()),
        ]
    }
}

fn unset(labels: &[&'static str]) -> DisplayFields {
    labels.iter().map(|label| (*label, UNSET.to_string())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use procmon_rs::{ProcessNode, TopCpuProcess, TopMemoryProcess};

    fn node(status: Option<&str>) -> ProcessNode {
        ProcessNode {
            status: status.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_total_comes_from_server() {
        let snapshot = HostSnapshot {
            hostname: "web-1".to_string(),
            timestamp: "2024-03-01T12:00:00Z".to_string(),
            total_processes: 50,
            process_tree: vec![ProcessNode {
                status: Some("Running".to_string()),
                children: vec![node(Some("sleeping")), node(None)],
                ..Default::default()
            }],
        };
        let stats = ProcessStats::from_snapshot(&snapshot);
        assert_eq!(stats.total, 50);
        assert_eq!(stats.running, 1);
        assert_eq!(stats.sleeping, 1);

        let fields = ProcessStats::fields(Some(&stats));
        assert_eq!(fields[0], ("Total", "50".to_string()));
    }

    #[test]
    fn test_unset_fields_use_placeholder() {
        for fields in [
            ProcessStats::fields(None),
            ResourceSummary::fields(None),
            HostSpecs::fields(None),
        ] {
            assert!(!fields.is_empty());
            assert!(fields.iter().all(|(_, value)| value == UNSET));
        }
    }

    #[test]
    fn test_resource_summary() {
        let resources = SystemResources {
            total_cpu_percent: 12.5,
            total_memory_rss: 2 * 1024 * 1024 * 1024,
            top_cpu_processes: vec![TopCpuProcess {
                name: "java".to_string(),
                pid: Some(10),
                cpu_percent: 9.5,
            }],
            top_memory_processes: vec![TopMemoryProcess {
                name: "postgres".to_string(),
                pid: None,
                memory_rss: 300 * 1024 * 1024 + 1,
            }],
            ..Default::default()
        };
        let summary = ResourceSummary::from_resources(&resources);
        let fields = ResourceSummary::fields(Some(&summary));
        assert_eq!(
            fields,
            vec![
                ("CPU", "12.5%".to_string()),
                ("Memory", "2048 MB".to_string()),
                ("Top CPU", "java (9.5%)".to_string()),
                ("Top Memory", "postgres (300 MB)".to_string()),
            ]
        );
    }

    #[test]
    fn test_resource_summary_without_top_lists() {
        let summary = ResourceSummary::from_resources(&SystemResources::default());
        assert!(summary.top_cpu.is_none());
        let fields = ResourceSummary::fields(Some(&summary));
        assert_eq!(fields[2].1, "-");
        assert_eq!(fields[3].1, "-");
    }

    #[test]
    fn test_host_specs() {
        let host = HostInfo {
            hostname: "db-1".to_string(),
            cpu_cores: Some(8),
            cpu_frequency: Some("2400.00 MHz".to_string()),
            total_memory_gb: Some(15.5),
            disk_usage_percent: Some(42.0),
            disk_total_gb: Some(500.0),
            disk_free_gb: Some(290.0),
            ..Default::default()
        };
        let specs = HostSpecs::from_host_info(&host);
        assert_eq!(specs.cpu_cores, "8");
        assert_eq!(
            HostSpecs::fields(Some(&specs))[0],
            ("Hostname", "db-1".to_string())
        );
        assert_eq!(specs.total_memory, "15.5 GB");
        assert_eq!(specs.disk_usage, "42% (290 GB free)");
        assert_eq!(specs.uptime, "Unknown");
        assert_eq!(specs.os, "Unknown OS");
        assert_eq!(specs.first_seen, "-");
    }

    #[test]
    fn test_host_specs_disk_needs_percent_and_total() {
        let host = HostInfo {
            disk_usage_percent: Some(42.0),
            disk_free_gb: Some(1.0),
            ..Default::default()
        };
        assert_eq!(HostSpecs::from_host_info(&host).disk_usage, "Unknown");
    }
}
