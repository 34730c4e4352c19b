//! procmon-rs: Rust client for the process monitor HTTP API
//!
//! This crate provides a typed client for reading host inventories, process
//! trees and resource summaries from a process monitor server.
//!
//! # Example
//!
//! ```no_run
//! use procmon_rs::{MonitorClient, ServerEntry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MonitorClient::new(&ServerEntry::default())?;
//!
//!     for host in client.hosts().await? {
//!         let snapshot = client.processes(&host.hostname).await?;
//!         println!("{}: {} processes", host.hostname, snapshot.total_processes);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod model;

pub use client::MonitorClient;
pub use config::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS, PilotConfig, ServerEntry};
pub use error::ApiError;
pub use model::{
    HostInfo, HostSnapshot, ProcessNode, SystemResources, TopCpuProcess, TopMemoryProcess,
};
