//! procmon-pilot-tui: Terminal UI for procmon-pilot
//!
//! A thin ratatui adapter over `procmon-pilot-core`: it turns key presses
//! into controller calls, runs the fetches the controller asks for, and
//! renders what the controller exposes.

pub mod action;
pub mod app;
pub mod components;
pub mod tui;
pub mod ui_ext;

pub use app::{App, Settings};
