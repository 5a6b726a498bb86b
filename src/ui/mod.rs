//! UI rendering module for Teamdeck
//!
//! This module contains all the rendering logic for the terminal user
//! interface, using the ratatui library for TUI components.

pub mod member_card;
pub mod member_list;

pub use member_card::render as render_member_detail;
pub use member_list::render_member_list;
