//! Application state and main loop

use crate::action::Action;
use crate::components::{Component, HostsComponent, ProcessesComponent};
use crate::tui::{self, Tui};
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use procmon_pilot_core::constants::AUTO_REFRESH_INTERVAL;
use procmon_pilot_core::{
    CycleOutcome, FetchTicket, ProcessMonitor, RefreshScheduler, RefreshTick, RequestId,
};
use procmon_rs::{ApiError, HostInfo, HostSnapshot, MonitorClient, ServerEntry, SystemResources};
use std::time::Duration;
use tokio::sync::mpsc;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Hosts,
    Processes,
}

/// Startup settings resolved from the command line and config file
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerEntry,
    pub refresh_interval: Duration,
    pub auto_refresh: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerEntry::default(),
            refresh_interval: AUTO_REFRESH_INTERVAL,
            auto_refresh: true,
        }
    }
}

/// Results from spawned fetches
#[derive(Debug)]
enum FetchResult {
    Hosts(RequestId, Result<Vec<HostInfo>, ApiError>),
    Snapshot(FetchTicket, Result<HostSnapshot, ApiError>),
    Resources(FetchTicket, Result<SystemResources, ApiError>),
    HostDetails(FetchTicket, Result<Vec<HostInfo>, ApiError>),
}

/// Main application state
pub struct App {
    /// Whether the application should quit
    should_quit: bool,
    view: View,
    hosts: HostsComponent,
    processes: ProcessesComponent,
    client: MonitorClient,
    /// How long to wait for input before ticking
    tick_rate: Duration,
    result_tx: mpsc::UnboundedSender<FetchResult>,
    result_rx: mpsc::UnboundedReceiver<FetchResult>,
    refresh_rx: mpsc::UnboundedReceiver<RefreshTick>,
}

impl App {
    pub fn new(settings: Settings) -> Result<Self> {
        let client = MonitorClient::new(&settings.server)?;
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        let (tick_tx, refresh_rx) = mpsc::unbounded_channel();

        let scheduler = RefreshScheduler::new(settings.refresh_interval, tick_tx);
        let monitor = ProcessMonitor::new(scheduler, settings.auto_refresh);

        Ok(Self {
            should_quit: false,
            view: View::Hosts,
            hosts: HostsComponent::new(client.base_url()),
            processes: ProcessesComponent::new(monitor),
            client,
            tick_rate: Duration::from_millis(100),
            result_tx,
            result_rx,
            refresh_rx,
        })
    }

    /// Run the application until the user quits
    ///
    /// Must be called from within a tokio runtime; fetches and the refresh
    /// timer run as spawned tasks.
    pub async fn run(&mut self) -> Result<()> {
        tui::install_panic_hook();
        let mut terminal = tui::init()?;

        let result = self.main_loop(&mut terminal);

        tui::restore()?;
        result
    }

    fn main_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        self.handle_action(Action::LoadHosts)?;

        loop {
            terminal.draw(|frame| {
                let area = frame.area();
                let drawn = match self.view {
                    View::Hosts => self.hosts.draw(frame, area),
                    View::Processes => self.processes.draw(frame, area),
                };
                if let Err(e) = drawn {
                    tracing::error!("Draw failed: {}", e);
                }
            })?;

            if event::poll(self.tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        let action = match self.view {
                            View::Hosts => self.hosts.handle_key_event(key)?,
                            View::Processes => self.processes.handle_key_event(key)?,
                        };
                        if let Some(action) = action {
                            self.handle_action(action)?;
                        }
                    }
                    Event::Resize(w, h) => {
                        self.handle_action(Action::Resize(w, h))?;
                    }
                    _ => {}
                }
            } else {
                self.handle_action(Action::Tick)?;
            }

            // Fetch results and refresh ticks (non-blocking)
            while let Ok(result) = self.result_rx.try_recv() {
                self.handle_result(result);
            }
            while let Ok(tick) = self.refresh_rx.try_recv() {
                if let Some(ticket) = self.processes.on_tick(&tick) {
                    self.fetch_processes(ticket);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle an action
    fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Back => {
                if self.view == View::Processes {
                    self.processes.close();
                    self.view = View::Hosts;
                }
            }
            Action::LoadHosts => {
                self.load_hosts();
            }
            Action::SelectHost(host) => {
                tracing::info!("Viewing processes for {}", host);
                if let Some(ticket) = self.processes.select_host(&host) {
                    self.fetch_processes(ticket);
                }
                self.view = View::Processes;
            }
            Action::FetchProcesses(ticket) => {
                self.fetch_processes(ticket);
            }
            Action::Resize(_w, _h) => {
                // Terminal will automatically resize on next draw
            }
            Action::Tick => {
                let next = match self.view {
                    View::Hosts => self.hosts.update(Action::Tick)?,
                    View::Processes => self.processes.update(Action::Tick)?,
                };
                if let Some(next) = next {
                    self.handle_action(next)?;
                }
            }
        }
        Ok(())
    }

    fn handle_result(&mut self, result: FetchResult) {
        match result {
            FetchResult::Hosts(request, result) => {
                self.hosts.apply_hosts(request, result);
            }
            FetchResult::Snapshot(ticket, result) => {
                // Secondary panels are only fetched after a good snapshot
                if self.processes.apply_snapshot(&ticket, result) == CycleOutcome::Applied {
                    self.fetch_secondary(ticket);
                }
            }
            FetchResult::Resources(ticket, result) => {
                self.processes.apply_resources(&ticket, result);
            }
            FetchResult::HostDetails(ticket, result) => {
                self.processes.apply_host_details(&ticket, result);
            }
        }
    }

    fn load_hosts(&mut self) {
        let request = self.hosts.start_load();
        let client = self.client.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = client.hosts().await;
            let _ = tx.send(FetchResult::Hosts(request, result));
        });
    }

    fn fetch_processes(&self, ticket: FetchTicket) {
        let client = self.client.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = client.processes(&ticket.host).await;
            let _ = tx.send(FetchResult::Snapshot(ticket, result));
        });
    }

    /// Resources and host details; either may land first
    fn fetch_secondary(&self, ticket: FetchTicket) {
        let client = self.client.clone();
        let tx = self.result_tx.clone();
        let resources_ticket = ticket.clone();
        tokio::spawn(async move {
            let result = client.resources(&resources_ticket.host).await;
            let _ = tx.send(FetchResult::Resources(resources_ticket, result));
        });

        let client = self.client.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = client.hosts().await;
            let _ = tx.send(FetchResult::HostDetails(ticket, result));
        });
    }
}
