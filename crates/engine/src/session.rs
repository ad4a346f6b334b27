//! A navigator paired with the content source that feeds it.
//!
//! [`CourseSession`] drives the effect loop to quiescence, which is what the
//! CLI commands and tests want. The TUI runs effects itself so it can keep
//! drawing while requests are in flight.

use std::collections::VecDeque;
use std::sync::Arc;

use futures_util::future::join_all;
use lectern_api::ContentSource;
use tracing::debug;

use crate::effects::run_effect;
use crate::navigator::{NavMsg, Navigator, SessionKey};

pub struct CourseSession<S: ContentSource + ?Sized> {
    navigator: Navigator,
    source: Arc<S>,
}

impl<S: ContentSource + ?Sized> CourseSession<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            navigator: Navigator::new(),
            source,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Open `key` and wait until the course, modules, unlock status and
    /// enrichment have all settled.
    pub async fn open(&mut self, key: SessionKey) {
        self.dispatch(NavMsg::Open(key)).await;
    }

    /// Apply `msg` and every follow-up message its effects produce.
    ///
    /// Effects emitted by a single update run concurrently.
    pub async fn dispatch(&mut self, msg: NavMsg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let effects = self.navigator.update(msg);
            if effects.is_empty() {
                continue;
            }
            debug!(count = effects.len(), "running navigator effects");
            let source = self.source.as_ref();
            let results = join_all(effects.into_iter().map(|effect| run_effect(source, effect))).await;
            queue.extend(results);
        }
    }
}
