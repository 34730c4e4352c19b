//! Process view controller
//!
//! [`ProcessMonitor`] is the single owner of the process view's state: the
//! selected host, the latest snapshot, the filter, everything derived from
//! them, and the refresh timer. It does no I/O itself. Operations that need
//! data return a [`FetchTicket`]; the caller performs the fetch and hands
//! the result back with the ticket, which lets late responses be recognised
//! and dropped.

use crate::async_state::{AsyncState, RequestId};
use crate::errors::format_api_error;
use crate::filter::{FilterConfig, filter_forest};
use crate::refresh::{RefreshScheduler, RefreshTick};
use crate::stats::{DisplayFields, HostSpecs, ProcessStats, ResourceSummary};
use crate::traversal::count_nodes;
use crate::tree_view::{ExpansionState, TreeRow, visible_rows};
use procmon_rs::{ApiError, HostInfo, HostSnapshot, ProcessNode, SystemResources};

/// Identity of one in-flight fetch cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub host: String,
    pub request: RequestId,
}

/// What happened to a fetch result handed back to the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The result replaced the displayed data
    Applied,
    /// The fetch failed; an error was recorded
    Failed,
    /// The result belongs to a superseded request and was ignored
    Stale,
}

/// What the process view should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    NoHostSelected,
    Loading,
    Error(String),
    /// The host reported an empty process tree
    NoProcesses,
    /// Processes exist but the filter hides all of them
    NoMatches,
    Tree,
}

/// Controller for the process tree view
#[derive(Debug)]
pub struct ProcessMonitor {
    host: Option<String>,
    snapshot: AsyncState<HostSnapshot>,
    filter: FilterConfig,
    filtered: Vec<ProcessNode>,
    stats: Option<ProcessStats>,
    resources: Option<ResourceSummary>,
    host_specs: Option<HostSpecs>,
    /// Sequence of the cycle each secondary panel was last filled from
    resources_seq: Option<u64>,
    host_specs_seq: Option<u64>,
    expansion: ExpansionState,
    auto_refresh: bool,
    scheduler: RefreshScheduler,
}

impl ProcessMonitor {
    pub fn new(scheduler: RefreshScheduler, auto_refresh: bool) -> Self {
        Self {
            host: None,
            snapshot: AsyncState::idle(),
            filter: FilterConfig::default(),
            filtered: Vec::new(),
            stats: None,
            resources: None,
            host_specs: None,
            resources_seq: None,
            host_specs_seq: None,
            expansion: ExpansionState::new(),
            auto_refresh,
            scheduler,
        }
    }

    // ==================== Host selection ====================

    /// Select a host, or deselect with `None`/an empty name
    ///
    /// Everything derived from the previous host is cleared and its in-flight
    /// requests are invalidated. Returns the fetch to perform for the new host.
    pub fn select_host(&mut self, host: Option<&str>) -> Option<FetchTicket> {
        let host = host.map(str::trim).filter(|h| !h.is_empty());

        self.snapshot.clear();
        self.clear_derived();
        self.expansion.collapse_all();

        let Some(host) = host else {
            tracing::info!("Host deselected");
            self.host = None;
            self.scheduler.disable();
            return None;
        };

        tracing::info!("Selected host {}", host);
        self.host = Some(host.to_string());
        if self.auto_refresh {
            if self.scheduler.is_enabled() {
                self.scheduler.rebind(self.host.clone());
            } else {
                self.scheduler.enable(self.host.clone());
            }
        }
        self.start_fetch()
    }

    /// Manual refresh of the current host
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.start_fetch()
    }

    /// React to a refresh timer tick
    ///
    /// Ticks from a cancelled timer, for another host, or arriving while the
    /// previous fetch is still in flight are ignored.
    pub fn on_tick(&mut self, tick: &RefreshTick) -> Option<FetchTicket> {
        if !self.scheduler.is_current(tick) {
            tracing::debug!("Ignoring tick from old timer (epoch {})", tick.epoch);
            return None;
        }
        if self.host.as_deref() != Some(tick.host.as_str()) {
            tracing::debug!("Ignoring tick for {}: no longer selected", tick.host);
            return None;
        }
        if self.snapshot.is_loading() {
            tracing::debug!("Skipping tick for {}: fetch still in flight", tick.host);
            return None;
        }
        self.start_fetch()
    }

    fn start_fetch(&mut self) -> Option<FetchTicket> {
        let host = self.host.clone()?;
        let request = self.snapshot.start_loading();
        tracing::debug!("Fetching processes for {} ({:?})", host, request);
        Some(FetchTicket { host, request })
    }

    fn clear_derived(&mut self) {
        self.filtered.clear();
        self.stats = None;
        self.resources = None;
        self.host_specs = None;
        self.resources_seq = None;
        self.host_specs_seq = None;
    }

    /// Whether a ticket still belongs to the current host selection
    fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.host.as_deref() == Some(ticket.host.as_str())
            && ticket.request.generation() == self.snapshot.generation()
    }

    /// Whether a secondary result may replace a panel last filled at `applied`
    fn accepts_secondary(&self, ticket: &FetchTicket, applied: Option<u64>) -> bool {
        self.is_current(ticket) && applied.is_none_or(|seq| ticket.request.seq() >= seq)
    }

    // ==================== Fetch results ====================

    /// Apply the primary (process tree) result of a fetch cycle
    pub fn apply_snapshot(
        &mut self,
        ticket: &FetchTicket,
        result: Result<HostSnapshot, ApiError>,
    ) -> CycleOutcome {
        if !self.is_current(ticket) || !self.snapshot.accepts(ticket.request) {
            tracing::debug!("Dropping stale process data for {}", ticket.host);
            return CycleOutcome::Stale;
        }

        match result {
            Ok(snapshot) => {
                tracing::debug!(
                    "Loaded {} processes for {}",
                    snapshot.total_processes,
                    ticket.host
                );
                self.stats = Some(ProcessStats::from_snapshot(&snapshot));
                self.expansion.retain_present(&snapshot.process_tree);
                self.snapshot.complete(ticket.request, snapshot);
                self.refilter();
                CycleOutcome::Applied
            }
            Err(e) => {
                let message = format!("Failed to load process data: {}", format_api_error(&e));
                if e.is_transport() {
                    tracing::warn!("{} ({})", message, e);
                } else {
                    tracing::error!("{} ({})", message, e);
                }
                self.snapshot.fail(ticket.request, message);
                CycleOutcome::Failed
            }
        }
    }

    /// Apply the resource summary of a fetch cycle (best effort)
    pub fn apply_resources(
        &mut self,
        ticket: &FetchTicket,
        result: Result<SystemResources, ApiError>,
    ) -> CycleOutcome {
        if !self.accepts_secondary(ticket, self.resources_seq) {
            tracing::debug!("Dropping stale resources for {}", ticket.host);
            return CycleOutcome::Stale;
        }
        match result {
            Ok(resources) => {
                self.resources = Some(ResourceSummary::from_resources(&resources));
                self.resources_seq = Some(ticket.request.seq());
                CycleOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("Failed to load system resources for {}: {}", ticket.host, e);
                CycleOutcome::Failed
            }
        }
    }

    /// Apply the host list fetched for the host details panel (best effort)
    pub fn apply_host_details(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<HostInfo>, ApiError>,
    ) -> CycleOutcome {
        if !self.accepts_secondary(ticket, self.host_specs_seq) {
            tracing::debug!("Dropping stale host details for {}", ticket.host);
            return CycleOutcome::Stale;
        }
        match result {
            Ok(hosts) => {
                self.host_specs = hosts
                    .iter()
                    .find(|h| h.hostname == ticket.host)
                    .map(HostSpecs::from_host_info);
                self.host_specs_seq = Some(ticket.request.seq());
                if self.host_specs.is_none() {
                    tracing::warn!("Host {} missing from host list", ticket.host);
                }
                CycleOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("Failed to load host details for {}: {}", ticket.host, e);
                CycleOutcome::Failed
            }
        }
    }

    // ==================== Filtering ====================

    /// Recompute the filtered forest from the held snapshot
    fn refilter(&mut self) {
        self.filtered = match self.snapshot.data() {
            Some(snapshot) => filter_forest(&snapshot.process_tree, &self.filter),
            None => Vec::new(),
        };
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.filter.search_term {
            self.filter.search_term = term;
            self.refilter();
        }
    }

    pub fn set_include_system(&mut self, include: bool) {
        if include != self.filter.include_system {
            self.filter.include_system = include;
            self.refilter();
        }
    }

    pub fn set_include_user(&mut self, include: bool) {
        if include != self.filter.include_user {
            self.filter.include_user = include;
            self.refilter();
        }
    }

    pub fn toggle_include_system(&mut self) {
        self.set_include_system(!self.filter.include_system);
    }

    pub fn toggle_include_user(&mut self) {
        self.set_include_user(!self.filter.include_user);
    }

    // ==================== Auto-refresh ====================

    /// Turn periodic refresh on or off
    ///
    /// The timer only runs while a host is selected; turning it on with no
    /// host defers the start to the next selection.
    pub fn set_auto_refresh(&mut self, enabled: bool) {
        self.auto_refresh = enabled;
        if !enabled {
            self.scheduler.disable();
        } else if self.host.is_some() && !self.scheduler.is_enabled() {
            self.scheduler.enable(self.host.clone());
        }
    }

    pub fn toggle_auto_refresh(&mut self) {
        self.set_auto_refresh(!self.auto_refresh);
    }

    // ==================== Expansion ====================

    /// Flip a node open/closed; returns the new state
    pub fn toggle_expanded(&mut self, path: &[i64]) -> bool {
        self.expansion.toggle(path)
    }

    /// Expand every node with children in the current filtered tree
    pub fn expand_all(&mut self) {
        self.expansion.expand_all(&self.filtered);
    }

    pub fn collapse_all(&mut self) {
        self.expansion.collapse_all();
    }

    // ==================== Read access ====================

    /// Visible rows of the filtered tree
    pub fn rows(&self) -> Vec<TreeRow<'_>> {
        visible_rows(&self.filtered, &self.expansion)
    }

    pub fn display_state(&self) -> DisplayState {
        if self.host.is_none() {
            return DisplayState::NoHostSelected;
        }
        if let Some(error) = self.snapshot.error() {
            return DisplayState::Error(error.to_string());
        }
        match self.snapshot.data() {
            None => DisplayState::Loading,
            Some(snapshot) if snapshot.process_tree.is_empty() => DisplayState::NoProcesses,
            Some(_) if self.filtered.is_empty() => DisplayState::NoMatches,
            Some(_) => DisplayState::Tree,
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn snapshot(&self) -> Option<&HostSnapshot> {
        self.snapshot.data()
    }

    pub fn snapshot_state(&self) -> &AsyncState<HostSnapshot> {
        &self.snapshot
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot.is_loading()
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    pub fn filtered(&self) -> &[ProcessNode] {
        &self.filtered
    }

    pub fn stats(&self) -> Option<&ProcessStats> {
        self.stats.as_ref()
    }

    pub fn resources(&self) -> Option<&ResourceSummary> {
        self.resources.as_ref()
    }

    pub fn host_specs(&self) -> Option<&HostSpecs> {
        self.host_specs.as_ref()
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    /// (shown, total) node counts for the filter bar
    pub fn match_counts(&self) -> (usize, usize) {
        let total = self
            .snapshot
            .data()
            .map(|s| count_nodes(&s.process_tree))
            .unwrap_or(0);
        (count_nodes(&self.filtered), total)
    }

    pub fn stats_fields(&self) -> DisplayFields {
        ProcessStats::fields(self.stats.as_ref())
    }

    pub fn resource_fields(&self) -> DisplayFields {
        ResourceSummary::fields(self.resources.as_ref())
    }

    pub fn host_fields(&self) -> DisplayFields {
        HostSpecs::fields(self.host_specs.as_ref())
    }
}
