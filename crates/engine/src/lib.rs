//! # Lectern Engine
//!
//! Course content navigation: which module, lecture or assignment is shown,
//! and where prev/next lead from there.
//!
//! ## Architecture
//!
//! - **`steps`**: Builds the ordered step sequence of a module
//! - **`navigator`**: The selection state machine; consumes [`NavMsg`]s and
//!   requests remote work as [`NavEffect`]s
//! - **`effects`**: Runs effects against a [`lectern_api::ContentSource`]
//! - **`session`**: Drives a navigator and its effects to quiescence
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::{sync::Arc, time::Duration};
//! use lectern_api::{HttpContentSource, LecternClient};
//! use lectern_engine::{CourseSession, NavMsg, SessionKey};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let client = LecternClient::new("http://localhost:5000", Duration::from_secs(30))?;
//! let mut session = CourseSession::new(Arc::new(HttpContentSource::new(client)));
//! session.open(SessionKey::new("CS101", "guest")).await;
//! session.dispatch(NavMsg::SelectModule("1".into())).await;
//! while session.navigator().can_advance() {
//!     session.dispatch(NavMsg::Next).await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod effects;
pub mod navigator;
pub mod session;
pub mod steps;

#[cfg(test)]
mod testing;

pub use effects::run_effect;
pub use navigator::{JumpTarget, ModuleContent, NavEffect, NavMsg, Navigator, SessionKey};
pub use session::CourseSession;
