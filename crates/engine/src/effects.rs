//! Execution of [`NavEffect`]s against a [`ContentSource`].

use futures_util::future::{join, join_all};
use lectern_api::{ContentSource, FetchError};
use lectern_types::{ContentId, ModuleSummary};
use tracing::warn;

use crate::navigator::{ModuleContent, NavEffect, NavMsg};

/// Run one effect to completion and return the message that reports its result.
///
/// Fetch failures never escape: they are carried inside the returned message
/// (for session fetches) or degraded to empty content (for per-module fetches).
pub async fn run_effect<S: ContentSource + ?Sized>(source: &S, effect: NavEffect) -> NavMsg {
    match effect {
        NavEffect::FetchCourse(key) => {
            let result = source.course(&key.course_id).await;
            NavMsg::CourseLoaded { key, result }
        }
        NavEffect::FetchModules(key) => {
            let result = source.modules(&key.course_id).await;
            NavMsg::ModulesLoaded { key, result }
        }
        NavEffect::FetchUnlockStatus(key) => {
            let result = source.unlock_status(&key.course_id, &key.user_id).await;
            NavMsg::UnlockStatusLoaded { key, result }
        }
        NavEffect::EnrichModules {
            key,
            generation,
            modules,
        } => {
            let contents = enrich_modules(source, &modules).await;
            NavMsg::ModulesEnriched {
                key,
                generation,
                contents,
            }
        }
        NavEffect::FetchModuleContent { key, ticket, module_id } => {
            let content = fetch_module_content(source, &module_id).await;
            NavMsg::ModuleContentLoaded { key, ticket, content }
        }
    }
}

/// Fetch lectures and assignments of every module concurrently.
pub async fn enrich_modules<S: ContentSource + ?Sized>(source: &S, modules: &[ModuleSummary]) -> Vec<ModuleContent> {
    join_all(modules.iter().map(|module| fetch_module_content(source, &module.id))).await
}

/// Fetch one module's lectures and assignments concurrently. A failed half
/// is reported and treated as empty.
pub async fn fetch_module_content<S: ContentSource + ?Sized>(source: &S, module_id: &ContentId) -> ModuleContent {
    let (lectures, assignments) = join(source.lectures(module_id), source.assignments(module_id)).await;
    ModuleContent {
        module_id: module_id.clone(),
        lectures: or_empty(lectures, module_id, "lectures"),
        assignments: or_empty(assignments, module_id, "assignments"),
    }
}

fn or_empty<T>(result: Result<Vec<T>, FetchError>, module_id: &ContentId, what: &str) -> Vec<T> {
    result.unwrap_or_else(|error| {
        warn!(%module_id, what, %error, "module content fetch failed; treating as empty");
        Vec::new()
    })
}
