//! UI extensions for procmon-pilot-core types
//!
//! Provides ratatui-specific extensions for core types, bridging the gap
//! between the UI-agnostic core library and the TUI presentation layer.

use procmon_pilot_core::{ErrorCategory, ProcessKind};
use procmon_rs::ProcessNode;
use ratatui::style::Color;

/// Extension trait for ProcessKind to provide ratatui colors
pub trait ProcessKindExt {
    fn color(&self) -> Color;
}

impl ProcessKindExt for ProcessKind {
    fn color(&self) -> Color {
        match self {
            ProcessKind::System => Color::Blue,
            ProcessKind::User => Color::Green,
        }
    }
}

/// Extension trait for process nodes to color them by reported status
pub trait ProcessStatusExt {
    /// Color for the node's status label
    fn status_color(&self) -> Color;

    /// Running, zombie and disk-wait processes are drawn bold
    fn is_interesting(&self) -> bool;
}

impl ProcessStatusExt for ProcessNode {
    fn status_color(&self) -> Color {
        match self.status_label().as_str() {
            "running" => Color::Green,
            "zombie" | "dead" => Color::Red,
            "disk-sleep" => Color::Yellow,
            "stopped" | "tracing-stop" => Color::Magenta,
            "sleeping" | "idle" => Color::DarkGray,
            _ => Color::default(),
        }
    }

    fn is_interesting(&self) -> bool {
        matches!(
            self.status_label().as_str(),
            "running" | "zombie" | "disk-sleep"
        )
    }
}

/// Extension trait for ErrorCategory to provide ratatui colors
pub trait ErrorCategoryExt {
    fn color(&self) -> Color;
}

impl ErrorCategoryExt for ErrorCategory {
    fn color(&self) -> Color {
        match self {
            ErrorCategory::Network | ErrorCategory::Server => Color::Red,
            ErrorCategory::Timeout | ErrorCategory::NotFound => Color::Yellow,
            ErrorCategory::Config => Color::Magenta,
            ErrorCategory::Other => Color::DarkGray,
        }
    }
}

/// Traffic-light color for a usage percentage
pub fn usage_color(percent: f64) -> Color {
    if percent > 85.0 {
        Color::Red
    } else if percent > 60.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Color for a single process's CPU share
pub fn cpu_color(percent: f64) -> Color {
    if percent > 50.0 {
        Color::Red
    } else if percent > 10.0 {
        Color::Yellow
    } else if percent > 0.1 {
        Color::Green
    } else {
        Color::default()
    }
}
