//! Processes component - expandable process tree for one host
//!
//! All state lives in [`ProcessMonitor`]; this component maps keys onto it,
//! keeps a cursor over the visible rows and renders what it exposes.

use crate::action::Action;
use crate::components::Component;
use crate::ui_ext::{ProcessKindExt, ProcessStatusExt, cpu_color, usage_color};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use procmon_pilot_core::{
    AsyncStateExt, CycleOutcome, DisplayFields, DisplayState, FetchTicket, NodePath, ProcessKind,
    ProcessMonitor, RefreshTick, SelectableList, TreeRow, format_bytes, format_duration_human,
    format_percent, truncate_string,
};
use procmon_rs::{ApiError, HostInfo, HostSnapshot, SystemResources};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

const PAGE_SIZE: usize = 10;

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Normal,
    /// Typing a search term
    Searching,
}

/// Process tree view
pub struct ProcessesComponent {
    monitor: ProcessMonitor,
    /// Cursor over the visible rows, keyed by node path
    cursor: SelectableList<NodePath>,
    table_state: TableState,
    mode: Mode,
    search_input: String,
}

impl ProcessesComponent {
    pub fn new(monitor: ProcessMonitor) -> Self {
        Self {
            monitor,
            cursor: SelectableList::empty(),
            table_state: TableState::default(),
            mode: Mode::Normal,
            search_input: String::new(),
        }
    }

    pub fn monitor(&self) -> &ProcessMonitor {
        &self.monitor
    }

    /// Switch to a host; returns the first fetch to run
    pub fn select_host(&mut self, host: &str) -> Option<FetchTicket> {
        let ticket = self.monitor.select_host(Some(host));
        self.mode = Mode::Normal;
        self.cursor.clear();
        self.sync_cursor();
        ticket
    }

    /// Leave the view: deselect the host and stop auto-refresh
    pub fn close(&mut self) {
        self.monitor.select_host(None);
        self.mode = Mode::Normal;
        self.cursor.clear();
    }

    pub fn on_tick(&mut self, tick: &RefreshTick) -> Option<FetchTicket> {
        self.monitor.on_tick(tick)
    }

    pub fn apply_snapshot(
        &mut self,
        ticket: &FetchTicket,
        result: Result<HostSnapshot, ApiError>,
    ) -> CycleOutcome {
        let outcome = self.monitor.apply_snapshot(ticket, result);
        self.sync_cursor();
        outcome
    }

    pub fn apply_resources(
        &mut self,
        ticket: &FetchTicket,
        result: Result<SystemResources, ApiError>,
    ) -> CycleOutcome {
        self.monitor.apply_resources(ticket, result)
    }

    pub fn apply_host_details(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<HostInfo>, ApiError>,
    ) -> CycleOutcome {
        self.monitor.apply_host_details(ticket, result)
    }

    /// Re-key the cursor on the current rows, staying on the same node if visible
    fn sync_cursor(&mut self) {
        let paths: Vec<NodePath> = self.monitor.rows().into_iter().map(|r| r.path).collect();
        self.cursor.update_items_by(paths, |p| p.clone());
    }

    fn selected_row(&self) -> Option<TreeRow<'_>> {
        let path = self.cursor.selected()?;
        self.monitor.rows().into_iter().find(|r| &r.path == path)
    }

    fn toggle_selected(&mut self) {
        if let Some(path) = self.cursor.selected().cloned() {
            self.monitor.toggle_expanded(&path);
            self.sync_cursor();
        }
    }

    fn apply_search_input(&mut self) {
        self.monitor.set_search(self.search_input.clone());
        self.sync_cursor();
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Ok(Some(Action::Back)),
            KeyCode::Char('j') | KeyCode::Down => {
                self.cursor.select_next();
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor.select_prev();
                Ok(None)
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.cursor.select_first();
                Ok(None)
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.cursor.select_last();
                Ok(None)
            }
            KeyCode::PageUp => {
                self.cursor.page_up(PAGE_SIZE);
                Ok(None)
            }
            KeyCode::PageDown => {
                self.cursor.page_down(PAGE_SIZE);
                Ok(None)
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.toggle_selected();
                Ok(None)
            }
            KeyCode::Char('e') => {
                self.monitor.expand_all();
                self.sync_cursor();
                Ok(None)
            }
            KeyCode::Char('c') => {
                self.monitor.collapse_all();
                self.sync_cursor();
                Ok(None)
            }
            KeyCode::Char('s') => {
                self.monitor.toggle_include_system();
                self.sync_cursor();
                Ok(None)
            }
            KeyCode::Char('u') => {
                self.monitor.toggle_include_user();
                self.sync_cursor();
                Ok(None)
            }
            KeyCode::Char('/') => {
                self.mode = Mode::Searching;
                self.search_input = self.monitor.filter().search_term.clone();
                Ok(None)
            }
            KeyCode::Char('a') => {
                self.monitor.toggle_auto_refresh();
                Ok(None)
            }
            KeyCode::Char('r') => Ok(self.monitor.refresh().map(Action::FetchProcesses)),
            _ => Ok(None),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Esc => {
                // Drop the search and leave search mode
                self.mode = Mode::Normal;
                self.search_input.clear();
                self.apply_search_input();
            }
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                self.apply_search_input();
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.apply_search_input();
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.apply_search_input();
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let host = self.monitor.host().unwrap_or("-");
        let mut spans = vec![
            Span::styled("Processes: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(host.to_string()),
        ];

        if let Some(stats) = self.monitor.stats() {
            spans.push(Span::raw("  "));
            spans.push(Span::raw(format!("{} procs", stats.total)).fg(Color::DarkGray));
        }

        spans.push(Span::raw("  "));
        let state = self.monitor.snapshot_state();
        if state.is_loading() {
            spans.push(Span::raw(format!("◌ {}", state.status_text())).fg(Color::Yellow));
        } else if let Some(elapsed) = state.elapsed_since_refresh() {
            let ago = chrono::Duration::from_std(elapsed)
                .map(format_duration_human)
                .unwrap_or_default();
            spans.push(Span::raw(format!("updated {} ago", ago)).dim());
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_filter_bar(&self, frame: &mut Frame, area: Rect) {
        let filter = self.monitor.filter();
        let (shown, total) = self.monitor.match_counts();

        let toggle = |on: bool, kind: ProcessKind| {
            let style = if on {
                Style::default().fg(kind.color())
            } else {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            };
            Span::styled(kind.label(), style)
        };

        let mut spans = vec![Span::styled(
            "Search: ",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if self.mode == Mode::Searching {
            spans.push(Span::raw(self.search_input.clone()));
            spans.push(Span::styled("█", Style::default().fg(Color::Cyan)));
        } else if filter.search_term.is_empty() {
            spans.push(Span::raw("none").dim());
        } else {
            spans.push(Span::raw(filter.search_term.clone()).fg(Color::Cyan));
        }

        spans.extend([
            Span::raw("  "),
            toggle(filter.include_system, ProcessKind::System),
            Span::raw(" "),
            toggle(filter.include_user, ProcessKind::User),
            Span::raw("  "),
            Span::styled(
                format!("[{}/{}]", shown, total),
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_message(frame: &mut Frame, area: Rect, text: String, style: Style) {
        let para = Paragraph::new(text)
            .style(style)
            .wrap(Wrap { trim: false });
        frame.render_widget(para, area);
    }

    fn draw_tree(&mut self, frame: &mut Frame, area: Rect) {
        let name_width = area.width.saturating_sub(48) as usize;
        let rows: Vec<Row> = self
            .monitor
            .rows()
            .iter()
            .map(|row| {
                let node = row.node;
                let kind = ProcessKind::of(node);
                let cpu = node.cpu_percent_or_zero();
                let base = if node.is_interesting() {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let label = format!("{}{} {}", row.tree_prefix(), row.marker(), node.name);

                Row::new(vec![
                    Cell::from(format!("{:>7}", node.pid)).style(base),
                    Cell::from(truncate_string(&label, name_width.max(12))).style(base),
                    Cell::from(node.username.clone().unwrap_or_else(|| "-".to_string()))
                        .style(base.fg(kind.color())),
                    Cell::from(node.status_label()).style(base.fg(node.status_color())),
                    Cell::from(format!("{:>5.1}", cpu)).style(base.fg(cpu_color(cpu))),
                    Cell::from(format!("{:>5.1}", node.memory_percent_or_zero())).style(base),
                    Cell::from(format!("{:>9}", format_bytes(node.memory_rss_or_zero())))
                        .style(base),
                ])
            })
            .collect();

        let header = Row::new(vec![
            Cell::from("    PID"),
            Cell::from("NAME"),
            Cell::from("USER"),
            Cell::from("STATUS"),
            Cell::from(" CPU%"),
            Cell::from(" MEM%"),
            Cell::from("      RSS"),
        ])
        .style(Style::default().add_modifier(Modifier::DIM))
        .bottom_margin(1);

        let widths = [
            Constraint::Length(7),
            Constraint::Min(12),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(9),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        self.table_state
            .select((!self.cursor.is_empty()).then(|| self.cursor.selected_index()));
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let node = row.node;
        let block = Block::default()
            .title(format!(" {} (PID {}) ", node.name, node.pid))
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = vec![
            Line::from(Span::raw(node.display_command().to_string()).fg(Color::White)),
            Line::from(vec![
                Span::raw("Owner: ").dim(),
                Span::raw(node.username.clone().unwrap_or_else(|| "-".to_string())),
                Span::raw(format!(" ({})", ProcessKind::of(node).label())).dim(),
                Span::raw("  CPU: ").dim(),
                Span::raw(format_percent(node.cpu_percent_or_zero())),
                Span::raw("  Mem: ").dim(),
                Span::raw(format_percent(node.memory_percent_or_zero())),
                Span::raw("  Virt: ").dim(),
                Span::raw(format_bytes(node.memory_vms_or_zero())),
                Span::raw("  Res: ").dim(),
                Span::raw(format_bytes(node.memory_rss_or_zero())),
                Span::raw("  Children: ").dim(),
                Span::raw(node.children.len().to_string()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }

    /// Render label/value pairs in a titled box; `accent` colors one field's value
    fn draw_fields(
        frame: &mut Frame,
        area: Rect,
        title: &str,
        fields: DisplayFields,
        accent: Option<(&str, Color)>,
    ) {
        let lines: Vec<Line> = fields
            .into_iter()
            .map(|(label, value)| {
                let value = match accent {
                    Some((accented, color)) if accented == label => Span::raw(value).fg(color),
                    _ => Span::raw(value),
                };
                Line::from(vec![
                    Span::raw(format!(" {:<14}", format!("{}:", label))).dim(),
                    value,
                ])
            })
            .collect();
        let para = Paragraph::new(lines).block(
            Block::default()
                .title(format!(" {} ", title))
                .title_style(Style::default().fg(Color::Cyan).bold())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(para, area);
    }

    fn draw_side_panels(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(6), // Stats
            Constraint::Length(6), // Resources
            Constraint::Min(11),   // Host
        ])
        .split(area);

        Self::draw_fields(frame, chunks[0], "Stats", self.monitor.stats_fields(), None);

        let cpu_accent = self
            .monitor
            .resources()
            .map(|summary| ("CPU", usage_color(summary.total_cpu_percent)));
        Self::draw_fields(
            frame,
            chunks[1],
            "Resources",
            self.monitor.resource_fields(),
            cpu_accent,
        );

        Self::draw_fields(frame, chunks[2], "Host", self.monitor.host_fields(), None);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let auto_status = if self.monitor.auto_refresh() {
            Span::raw("ON ").fg(Color::Green)
        } else {
            Span::raw("OFF").fg(Color::DarkGray)
        };

        let line = if self.mode == Mode::Searching {
            Line::from(vec![
                Span::raw(" [Enter]").fg(Color::Yellow),
                Span::raw(" apply").dim(),
                Span::raw("  "),
                Span::raw("[Esc]").fg(Color::Yellow),
                Span::raw(" clear").dim(),
            ])
        } else {
            Line::from(vec![
                Span::raw(" [q]").fg(Color::Yellow),
                Span::raw(" back").dim(),
                Span::raw("  "),
                Span::raw("[/]").fg(Color::Yellow),
                Span::raw(" search").dim(),
                Span::raw("  "),
                Span::raw("[s]").fg(Color::Yellow),
                Span::raw(" system").dim(),
                Span::raw("  "),
                Span::raw("[u]").fg(Color::Yellow),
                Span::raw(" user").dim(),
                Span::raw("  "),
                Span::raw("[Enter]").fg(Color::Yellow),
                Span::raw(" expand").dim(),
                Span::raw("  "),
                Span::raw("[e/c]").fg(Color::Yellow),
                Span::raw(" all").dim(),
                Span::raw("  "),
                Span::raw("[r]").fg(Color::Yellow),
                Span::raw(" refresh").dim(),
                Span::raw("  "),
                Span::raw("[a]").fg(Color::Yellow),
                Span::raw(" auto:").dim(),
                auto_status,
            ])
        };

        let footer = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(footer, area);
    }
}

impl Component for ProcessesComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Searching => self.handle_search_key(key),
        }
    }

    fn update(&mut self, _action: Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let chunks = Layout::vertical([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Filter bar
            Constraint::Min(5),    // Tree + panels
            Constraint::Length(2), // Footer
        ])
        .split(area);

        self.draw_header(frame, chunks[0]);
        self.draw_filter_bar(frame, chunks[1]);

        let content = Layout::horizontal([
            Constraint::Percentage(68), // Tree
            Constraint::Percentage(32), // Panels
        ])
        .split(chunks[2]);

        let tree_area = Layout::vertical([
            Constraint::Min(3),    // Tree
            Constraint::Length(4), // Selected process
        ])
        .split(content[0]);

        let dim = Style::default().fg(Color::DarkGray);
        match self.monitor.display_state() {
            DisplayState::NoHostSelected => {
                Self::draw_message(frame, content[0], "No host selected".to_string(), dim);
            }
            DisplayState::Loading => {
                Self::draw_message(frame, content[0], "Loading processes...".to_string(), dim);
            }
            DisplayState::Error(message) => {
                Self::draw_message(
                    frame,
                    content[0],
                    format!("Error: {}", message),
                    Style::default().fg(Color::Red),
                );
            }
            DisplayState::NoProcesses => {
                Self::draw_message(
                    frame,
                    content[0],
                    "No processes reported for this host".to_string(),
                    dim,
                );
            }
            DisplayState::NoMatches => {
                Self::draw_message(
                    frame,
                    content[0],
                    "No processes match the current filter".to_string(),
                    dim,
                );
            }
            DisplayState::Tree => {
                self.draw_tree(frame, tree_area[0]);
                self.draw_detail(frame, tree_area[1]);
            }
        }

        self.draw_side_panels(frame, content[1]);
        self.draw_footer(frame, chunks[3]);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use procmon_pilot_core::RefreshScheduler;
    use procmon_rs::ProcessNode;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn node(pid: i64, name: &str, user: &str, children: Vec<ProcessNode>) -> ProcessNode {
        ProcessNode {
            pid,
            name: name.to_string(),
            username: Some(user.to_string()),
            status: Some("sleeping".to_string()),
            children,
            ..Default::default()
        }
    }

    fn snapshot() -> HostSnapshot {
        HostSnapshot {
            hostname: "web-1".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            total_processes: 4,
            process_tree: vec![node(
                1,
                "systemd",
                "root",
                vec![
                    node(100, "sshd", "root", vec![node(200, "bash", "alice", vec![])]),
                    node(300, "nginx", "www-data", vec![]),
                ],
            )],
        }
    }

    /// Component with auto-refresh off, so no timer task is spawned
    fn component() -> ProcessesComponent {
        let (tx, _rx) = mpsc::unbounded_channel();
        let monitor = ProcessMonitor::new(RefreshScheduler::new(Duration::from_secs(30), tx), false);
        ProcessesComponent::new(monitor)
    }

    fn loaded() -> ProcessesComponent {
        let mut view = component();
        let ticket = view.select_host("web-1").unwrap();
        assert_eq!(view.apply_snapshot(&ticket, Ok(snapshot())), CycleOutcome::Applied);
        view
    }

    fn visible_pids(view: &ProcessesComponent) -> Vec<i64> {
        view.monitor().rows().iter().map(|r| r.node.pid).collect()
    }

    fn type_search(view: &mut ProcessesComponent, text: &str) {
        view.handle_key_event(key(KeyCode::Char('/'))).unwrap();
        for c in text.chars() {
            view.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_enter_toggles_selected_node() {
        let mut view = loaded();
        assert_eq!(visible_pids(&view), vec![1]);

        view.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(visible_pids(&view), vec![1, 100, 300]);

        view.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(visible_pids(&view), vec![1]);
    }

    #[test]
    fn test_expand_and_collapse_all() {
        let mut view = loaded();
        view.handle_key_event(key(KeyCode::Char('e'))).unwrap();
        assert_eq!(visible_pids(&view), vec![1, 100, 200, 300]);

        view.handle_key_event(key(KeyCode::Char('c'))).unwrap();
        assert_eq!(visible_pids(&view), vec![1]);
    }

    #[test]
    fn test_cursor_stays_on_node_across_refresh() {
        let mut view = loaded();
        view.handle_key_event(key(KeyCode::Char('e'))).unwrap();
        view.handle_key_event(key(KeyCode::Char('G'))).unwrap();
        assert_eq!(view.selected_row().map(|r| r.node.pid), Some(300));

        let ticket = view.monitor.refresh().unwrap();
        view.apply_snapshot(&ticket, Ok(snapshot()));
        assert_eq!(view.selected_row().map(|r| r.node.pid), Some(300));
    }

    #[test]
    fn test_live_search_and_escape() {
        let mut view = loaded();
        type_search(&mut view, "bash");
        assert_eq!(view.monitor().filter().search_term, "bash");
        assert_eq!(view.monitor().match_counts(), (3, 4));

        view.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert_eq!(view.mode, Mode::Normal);
        assert!(view.monitor().filter().search_term.is_empty());
    }

    #[test]
    fn test_search_enter_keeps_term() {
        let mut view = loaded();
        type_search(&mut view, "zzz");
        view.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert_eq!(view.mode, Mode::Normal);
        assert_eq!(view.monitor().display_state(), DisplayState::NoMatches);
    }

    #[test]
    fn test_search_mode_swallows_shortcuts() {
        let mut view = loaded();
        view.handle_key_event(key(KeyCode::Char('/'))).unwrap();
        let action = view.handle_key_event(key(KeyCode::Char('q'))).unwrap();
        assert!(action.is_none());
        assert_eq!(view.search_input, "q");
    }

    #[test]
    fn test_type_toggles() {
        let mut view = loaded();
        view.handle_key_event(key(KeyCode::Char('u'))).unwrap();
        assert!(!view.monitor().filter().include_user);

        view.handle_key_event(key(KeyCode::Char('s'))).unwrap();
        assert!(!view.monitor().filter().include_system);
        assert_eq!(view.monitor().display_state(), DisplayState::NoMatches);
    }

    #[test]
    fn test_refresh_key_issues_fetch() {
        let mut view = loaded();
        let action = view.handle_key_event(key(KeyCode::Char('r'))).unwrap();
        assert!(matches!(action, Some(Action::FetchProcesses(t)) if t.host == "web-1"));
        assert!(view.monitor().is_loading());
    }

    #[test]
    fn test_back_and_close() {
        let mut view = loaded();
        let action = view.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(matches!(action, Some(Action::Back)));

        view.close();
        assert_eq!(view.monitor().display_state(), DisplayState::NoHostSelected);
        assert!(view.selected_row().is_none());
    }
}
