//! procmon-pilot-core: Core engine for procmon-pilot
//!
//! This crate contains the process-tree filtering, aggregation and
//! refresh-scheduling logic behind the procmon-pilot TUI. It is kept
//! independent of any TUI framework so it can be unit tested without a
//! terminal and reused by other front ends.
//!
//! # Modules
//!
//! - [`filter`] - Search and system/user filtering with subtree rescue
//! - [`traversal`] - Forest flattening and status histograms
//! - [`stats`] - Process counts, resource and host summaries
//! - [`tree_view`] - Expansion state and visible tree rows
//! - [`refresh`] - Single-timer auto-refresh scheduler
//! - [`monitor`] - Controller tying the above to a selected host
//! - [`async_state`] - Loading/error state with stale-response detection
//! - [`selection`] - Generic selection logic for list-based UI components
//! - [`formatting`] - Utilities for formatting bytes, percentages, timestamps
//! - [`errors`] - Error formatting utilities for user-friendly messages
//! - [`constants`] - Shared constants (system accounts, refresh interval)

pub mod async_state;
pub mod constants;
pub mod errors;
pub mod filter;
pub mod formatting;
pub mod monitor;
pub mod refresh;
pub mod selection;
pub mod stats;
pub mod traversal;
pub mod tree_view;

// Re-export commonly used items at crate root
pub use async_state::*;
pub use errors::*;
pub use filter::*;
pub use formatting::*;
pub use monitor::*;
pub use refresh::*;
pub use selection::*;
pub use stats::*;
pub use traversal::*;
pub use tree_view::*;
