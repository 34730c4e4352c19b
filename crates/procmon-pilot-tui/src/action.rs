//! Actions for the procmon-pilot TUI
//!
//! Actions represent events that can modify application state.

use procmon_pilot_core::FetchTicket;

/// Actions that can be dispatched in the application
#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    Quit,
    Back,

    // Data loading
    LoadHosts,
    /// Open the process view for a host
    SelectHost(String),
    /// Fetch a process snapshot for the ticket's host
    FetchProcesses(FetchTicket),

    // UI state
    Tick,
    Resize(u16, u16),
}
