//! # Lectern TUI Library
//!
//! Terminal front end for browsing a course: a module menu on the left, the
//! selected module overview, lecture or assignment on the right, prev/next
//! navigation between steps, and a grades view that jumps straight to the
//! graded assignment.
//!
//! Built on ratatui/crossterm; navigation state lives in
//! [`lectern_engine::Navigator`].

mod app;
mod theme;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use lectern_api::ContentSource;
use lectern_engine::SessionKey;

/// Runs the TUI until the user quits.
///
/// # Errors
///
/// Terminal setup or teardown failures (raw mode, alternate screen).
pub async fn run<S: ContentSource + 'static>(source: Arc<S>, key: SessionKey) -> Result<()> {
    ui::runtime::run_app(source, key).await
}
