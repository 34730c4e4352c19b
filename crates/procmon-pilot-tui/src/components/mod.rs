//! Component system for the procmon-pilot TUI
//!
//! Based on the ratatui Component template pattern.

pub mod hosts;
pub mod processes;

pub use hosts::HostsComponent;
pub use processes::ProcessesComponent;

use crate::action::Action;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

/// Trait for UI components
///
/// Components are modular UI elements that handle events, update their
/// state, and render themselves.
pub trait Component {
    /// Handle key events and optionally produce actions
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Update the component state based on an action
    fn update(&mut self, action: Action) -> Result<Option<Action>>;

    /// Render the component to the frame
    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
