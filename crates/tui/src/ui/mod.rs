//! UI rendering module for the TUI application.
//!
//! - `main`: frame layout and the menu/content panes
//! - `widgets`: header, step navigation and hint lines
//! - `runtime`: terminal lifecycle and the event loop

pub mod main;
pub mod runtime;
pub mod widgets;
