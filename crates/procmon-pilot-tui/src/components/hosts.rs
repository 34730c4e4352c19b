//! Hosts component - lists the hosts known to the monitor server

use crate::action::Action;
use crate::components::Component;
use crate::ui_ext::{ErrorCategoryExt, usage_color};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use procmon_pilot_core::{
    AsyncState, ErrorCategory, HostSpecs, RequestId, SelectableList, categorize_error,
    format_api_error, format_time_ago, parse_server_timestamp, pluralize,
};
use procmon_rs::{ApiError, HostInfo};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

/// Host picker shown at startup
pub struct HostsComponent {
    hosts: AsyncState<SelectableList<HostInfo>>,
    /// Category of the last load failure, for coloring the error
    error_category: Option<ErrorCategory>,
    list_state: ListState,
    /// Server base URL shown in the header
    server: String,
}

impl HostsComponent {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            hosts: AsyncState::idle(),
            error_category: None,
            list_state: ListState::default(),
            server: server.into(),
        }
    }

    /// Begin a host list load; the id goes back to [`apply_hosts`](Self::apply_hosts)
    pub fn start_load(&mut self) -> RequestId {
        self.hosts.start_loading()
    }

    /// Apply a host list response
    ///
    /// The selection stays on the same hostname when it is still listed.
    pub fn apply_hosts(&mut self, request: RequestId, result: Result<Vec<HostInfo>, ApiError>) {
        match result {
            Ok(hosts) => {
                let mut list = self.hosts.data().cloned().unwrap_or_default();
                list.update_items_by(hosts, |h| h.hostname.clone());
                let count = list.len();
                if self.hosts.complete(request, list) {
                    tracing::info!("Loaded {}", pluralize(count, "host", "hosts"));
                    self.error_category = None;
                }
            }
            Err(e) => {
                let message = format!("Failed to load hosts: {}", format_api_error(&e));
                if self.hosts.fail(request, &message) {
                    tracing::error!("{} ({})", message, e);
                    self.error_category = Some(categorize_error(&e));
                }
            }
        }
    }

    pub fn selected_host(&self) -> Option<&HostInfo> {
        self.hosts.data().and_then(|list| list.selected())
    }

    pub fn host_count(&self) -> usize {
        self.hosts.data().map(|list| list.len()).unwrap_or(0)
    }

    pub fn is_loading(&self) -> bool {
        self.hosts.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.hosts.error()
    }

    fn navigate(&mut self, f: impl FnOnce(&mut SelectableList<HostInfo>)) {
        if let Some(list) = self.hosts.data_mut() {
            f(list);
        }
    }

    fn draw_host_list(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = match self.hosts.data() {
            Some(list) => list
                .iter_with_selection()
                .map(|(_, host, selected)| {
                    let name = if selected {
                        Span::raw(host.display_label()).bold()
                    } else {
                        Span::raw(host.display_label())
                    };
                    let seen = parse_server_timestamp(&host.last_seen)
                        .map(|ts| format!("  {}", format_time_ago(ts)))
                        .unwrap_or_default();
                    ListItem::new(Line::from(vec![
                        Span::raw(" ● ").fg(Color::Green),
                        name,
                        Span::raw(seen).dim(),
                    ]))
                })
                .collect(),
            None => Vec::new(),
        };

        let placeholder = if self.hosts.is_loading() {
            "  Loading hosts..."
        } else {
            "  No hosts reported by the server"
        };
        let items = if items.is_empty() {
            vec![ListItem::new(Line::from(Span::raw(placeholder).dim()))]
        } else {
            items
        };

        let selected = self
            .hosts
            .data()
            .filter(|list| !list.is_empty())
            .map(|list| list.selected_index());
        self.list_state.select(selected);

        let list = List::new(items)
            .block(
                Block::default()
                    .title(" Hosts ")
                    .title_style(Style::default().fg(Color::Cyan).bold())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .highlight_style(Style::default().bg(Color::DarkGray));

        frame.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn draw_host_details(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Details ")
            .title_style(Style::default().fg(Color::Cyan).bold())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(error) = self.hosts.error() {
            let color = self
                .error_category
                .map(|c| c.color())
                .unwrap_or(Color::Red);
            let label = self
                .error_category
                .map(|c| c.label())
                .unwrap_or("Error");
            let lines = vec![
                Line::from(Span::raw(format!(" [{}]", label)).fg(color).bold()),
                Line::from(Span::raw(format!(" {}", error)).fg(color)),
                Line::from(""),
                Line::from(Span::raw(" Press [r] to retry").dim()),
            ];
            frame.render_widget(Paragraph::new(lines), inner);
            return;
        }

        let Some(host) = self.selected_host() else {
            let msg = Paragraph::new(Line::from(Span::raw(" No host selected").dim()));
            frame.render_widget(msg, inner);
            return;
        };

        let specs = HostSpecs::from_host_info(host);
        let disk_color = host
            .disk_usage_percent
            .map(usage_color)
            .unwrap_or(Color::White);
        let lines: Vec<Line> = HostSpecs::fields(Some(&specs))
            .into_iter()
            .map(|(label, value)| {
                let color = if label == "Disk" { disk_color } else { Color::White };
                Line::from(vec![
                    Span::raw(format!(" {:<15}", format!("{}:", label))).dim(),
                    Span::raw(value).fg(color),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for HostsComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Ok(Some(Action::Quit)),
            KeyCode::Char('r') => Ok(Some(Action::LoadHosts)),
            KeyCode::Up | KeyCode::Char('k') => {
                self.navigate(|list| list.select_prev());
                Ok(None)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.navigate(|list| list.select_next());
                Ok(None)
            }
            KeyCode::Char('g') => {
                self.navigate(|list| list.select_first());
                Ok(None)
            }
            KeyCode::Char('G') => {
                self.navigate(|list| list.select_last());
                Ok(None)
            }
            KeyCode::Enter => Ok(self
                .selected_host()
                .map(|host| Action::SelectHost(host.hostname.clone()))),
            _ => Ok(None),
        }
    }

    fn update(&mut self, _action: Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = Layout::vertical([
            Constraint::Length(2), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(2), // Footer
        ])
        .split(area);

        let (status_symbol, status_color, status_text) = if self.hosts.is_loading() {
            ("◌", Color::Yellow, "Loading...".to_string())
        } else if self.hosts.has_error() {
            ("✗", Color::Red, "Unreachable".to_string())
        } else {
            (
                "●",
                Color::Green,
                pluralize(self.host_count(), "host", "hosts"),
            )
        };

        let header = Paragraph::new(Line::from(vec![
            Span::raw(" procmon-pilot ").bold().fg(Color::Cyan),
            Span::raw(format!("{} ", status_symbol)).fg(status_color),
            Span::raw(status_text).dim(),
            Span::raw(format!("    {}", self.server)).fg(Color::DarkGray),
        ]))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(header, layout[0]);

        let content_layout = Layout::horizontal([
            Constraint::Percentage(40), // Host list
            Constraint::Percentage(60), // Details
        ])
        .split(layout[1]);

        self.draw_host_list(frame, content_layout[0]);
        self.draw_host_details(frame, content_layout[1]);

        let footer = Paragraph::new(Line::from(vec![
            Span::raw(" [q]").fg(Color::Yellow),
            Span::raw(" quit").dim(),
            Span::raw("  "),
            Span::raw("[r]").fg(Color::Yellow),
            Span::raw(" reload").dim(),
            Span::raw("  "),
            Span::raw("[↑↓]").fg(Color::Yellow),
            Span::raw(" hosts").dim(),
            Span::raw("  "),
            Span::raw("[Enter]").fg(Color::Yellow),
            Span::raw(" processes").dim(),
        ]))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(footer, layout[2]);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn host(name: &str) -> HostInfo {
        HostInfo {
            hostname: name.to_string(),
            ..Default::default()
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded(names: &[&str]) -> HostsComponent {
        let mut hosts = HostsComponent::new("http://127.0.0.1:8000/api/");
        let id = hosts.start_load();
        hosts.apply_hosts(id, Ok(names.iter().map(|n| host(n)).collect()));
        hosts
    }

    #[test]
    fn test_selection_survives_reload() {
        let mut hosts = loaded(&["a", "b", "c"]);
        hosts.handle_key_event(key(KeyCode::Down)).unwrap();
        hosts.handle_key_event(key(KeyCode::Down)).unwrap();
        assert_eq!(hosts.selected_host().map(|h| h.hostname.as_str()), Some("c"));

        let id = hosts.start_load();
        hosts.apply_hosts(id, Ok(vec![host("c"), host("a")]));
        assert_eq!(hosts.selected_host().map(|h| h.hostname.as_str()), Some("c"));
        assert_eq!(hosts.host_count(), 2);
    }

    #[test]
    fn test_enter_selects_host() {
        let mut hosts = loaded(&["web-1", "db-1"]);
        hosts.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        let action = hosts.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(action, Some(Action::SelectHost(h)) if h == "db-1"));
    }

    #[test]
    fn test_enter_without_hosts_does_nothing() {
        let mut hosts = loaded(&[]);
        assert_eq!(hosts.host_count(), 0);
        assert!(hosts.error().is_none());
        assert!(hosts.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
    }

    #[test]
    fn test_failure_is_visible_and_keeps_hosts() {
        let mut hosts = loaded(&["web-1"]);
        let id = hosts.start_load();
        hosts.apply_hosts(
            id,
            Err(ApiError::Status {
                status: 500,
                reason: "Internal Server Error".to_string(),
            }),
        );
        assert!(!hosts.is_loading());
        let error = hosts.error().unwrap_or_default();
        assert!(error.starts_with("Failed to load hosts"));
        assert_eq!(hosts.error_category, Some(ErrorCategory::Server));
        assert_eq!(hosts.host_count(), 1);
    }

    #[test]
    fn test_older_host_list_is_dropped() {
        let mut hosts = HostsComponent::new("http://localhost/");
        let first = hosts.start_load();
        let second = hosts.start_load();
        hosts.apply_hosts(second, Ok(vec![host("new")]));
        hosts.apply_hosts(first, Ok(vec![host("old")]));
        assert_eq!(hosts.selected_host().map(|h| h.hostname.as_str()), Some("new"));
    }

    #[test]
    fn test_quit_and_reload_keys() {
        let mut hosts = loaded(&["a"]);
        assert!(matches!(
            hosts.handle_key_event(key(KeyCode::Char('q'))).unwrap(),
            Some(Action::Quit)
        ));
        assert!(matches!(
            hosts.handle_key_event(key(KeyCode::Char('r'))).unwrap(),
            Some(Action::LoadHosts)
        ));
    }
}
