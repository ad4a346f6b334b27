//! Course content navigator.
//!
//! The navigator is a synchronous state machine. Commands from the host UI
//! and results of remote fetches both arrive as [`NavMsg`] values; anything
//! that needs the network is returned as a [`NavEffect`] for the caller to
//! execute (see [`crate::effects::run_effect`]). Every fetch result carries
//! the key it was issued for so responses that arrive after the session
//! moved on are discarded instead of overwriting newer state.

use indexmap::IndexSet;
use lectern_api::FetchError;
use lectern_types::{
    Assignment, ContentId, Course, Lecture, Module, ModuleSummary, Section, Step, StepKind, UnlockStatus,
};
use tracing::{debug, warn};

use crate::steps::{build_steps, last_step, last_step_index, overview_step};

/// Identity of a navigation session: which course, viewed by which user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub course_id: String,
    pub user_id: String,
}

impl SessionKey {
    pub fn new(course_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Lectures and assignments fetched for one module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleContent {
    pub module_id: ContentId,
    pub lectures: Vec<Lecture>,
    pub assignments: Vec<Assignment>,
}

/// Direct selection of a step, bypassing prev/next traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTarget {
    pub kind: StepKind,
    /// Lecture id, assignment id, or the module id for overview jumps
    pub entity_id: ContentId,
    pub module_id: ContentId,
}

impl JumpTarget {
    pub fn lecture(lecture_id: impl Into<ContentId>, module_id: impl Into<ContentId>) -> Self {
        Self {
            kind: StepKind::Lecture,
            entity_id: lecture_id.into(),
            module_id: module_id.into(),
        }
    }

    pub fn assignment(assignment_id: impl Into<ContentId>, module_id: impl Into<ContentId>) -> Self {
        Self {
            kind: StepKind::Assignment,
            entity_id: assignment_id.into(),
            module_id: module_id.into(),
        }
    }

    pub fn overview(module_id: impl Into<ContentId>) -> Self {
        let module_id = module_id.into();
        Self {
            kind: StepKind::Module,
            entity_id: module_id.clone(),
            module_id,
        }
    }
}

/// Inputs to [`Navigator::update`].
#[derive(Debug)]
pub enum NavMsg {
    /// Start (or restart) a session. A no-op when the key is unchanged.
    Open(SessionKey),
    /// Re-issue the session fetches for the current key.
    Reload,
    CourseLoaded {
        key: SessionKey,
        result: Result<Course, FetchError>,
    },
    ModulesLoaded {
        key: SessionKey,
        result: Result<Vec<ModuleSummary>, FetchError>,
    },
    UnlockStatusLoaded {
        key: SessionKey,
        result: Result<Vec<UnlockStatus>, FetchError>,
    },
    ModulesEnriched {
        key: SessionKey,
        generation: u64,
        contents: Vec<ModuleContent>,
    },
    ModuleContentLoaded {
        key: SessionKey,
        ticket: u64,
        content: ModuleContent,
    },
    SelectModule(ContentId),
    SelectSection(Section),
    Jump(JumpTarget),
    Next,
    Prev,
    ToggleExpand(ContentId),
}

/// Remote work requested by the navigator.
#[derive(Debug, Clone, PartialEq)]
pub enum NavEffect {
    FetchCourse(SessionKey),
    FetchModules(SessionKey),
    FetchUnlockStatus(SessionKey),
    /// Fetch lectures and assignments of every module, answered by a single
    /// [`NavMsg::ModulesEnriched`].
    EnrichModules {
        key: SessionKey,
        generation: u64,
        modules: Vec<ModuleSummary>,
    },
    /// Fetch the content of a selected module that has not been enriched yet.
    FetchModuleContent {
        key: SessionKey,
        ticket: u64,
        module_id: ContentId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingContent {
    ticket: u64,
    module_id: ContentId,
}

/// Navigation state for one course session.
#[derive(Debug, Default)]
pub struct Navigator {
    key: Option<SessionKey>,
    course: Option<Course>,
    module_summaries: Vec<ModuleSummary>,
    unlock_statuses: Vec<UnlockStatus>,
    modules: Vec<Module>,
    /// Bumped once per session refresh (open or reload).
    refresh_generation: u64,
    /// Replies of the current refresh that have not arrived yet.
    awaiting_modules: bool,
    awaiting_unlocks: bool,
    /// Generation an enrichment was last requested for.
    enrichment_requested: Option<u64>,
    section: Section,
    selected_module: Option<Module>,
    selected_lecture: Option<Lecture>,
    selected_assignment: Option<Assignment>,
    steps: Vec<Step>,
    cursor: Option<usize>,
    pending_content: Option<PendingContent>,
    next_ticket: u64,
    expanded: IndexSet<ContentId>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a message and return the effects it requires.
    pub fn update(&mut self, msg: NavMsg) -> Vec<NavEffect> {
        match msg {
            NavMsg::Open(key) => self.open(key),
            NavMsg::Reload => self.reload(),
            NavMsg::CourseLoaded { key, result } => {
                if self.is_stale(&key, "course") {
                    return Vec::new();
                }
                match result {
                    Ok(course) => self.course = Some(course),
                    Err(error) => warn!(course_id = %key.course_id, %error, "course fetch failed"),
                }
                Vec::new()
            }
            NavMsg::ModulesLoaded { key, result } => {
                if self.is_stale(&key, "modules") {
                    return Vec::new();
                }
                self.awaiting_modules = false;
                match result {
                    Ok(modules) if !modules.is_empty() => self.module_summaries = modules,
                    Ok(_) => debug!(course_id = %key.course_id, "course has no modules"),
                    Err(error) => warn!(course_id = %key.course_id, %error, "module list fetch failed"),
                }
                self.request_enrichment()
            }
            NavMsg::UnlockStatusLoaded { key, result } => {
                if self.is_stale(&key, "unlock status") {
                    return Vec::new();
                }
                self.awaiting_unlocks = false;
                match result {
                    Ok(statuses) => self.unlock_statuses = statuses,
                    Err(error) => {
                        warn!(course_id = %key.course_id, user_id = %key.user_id, %error, "unlock status fetch failed")
                    }
                }
                self.request_enrichment()
            }
            NavMsg::ModulesEnriched {
                key,
                generation,
                contents,
            } => {
                if self.is_stale(&key, "module enrichment") {
                    return Vec::new();
                }
                if generation != self.refresh_generation {
                    debug!(generation, current = self.refresh_generation, "discarding superseded module enrichment");
                    return Vec::new();
                }
                self.apply_enrichment(contents);
                Vec::new()
            }
            NavMsg::ModuleContentLoaded { key, ticket, content } => {
                if self.is_stale(&key, "module content") {
                    return Vec::new();
                }
                self.apply_module_content(ticket, content);
                Vec::new()
            }
            NavMsg::SelectModule(module_id) => self.select_module(&module_id),
            NavMsg::SelectSection(section) => {
                self.select_section(section);
                Vec::new()
            }
            NavMsg::Jump(target) => {
                self.jump(target);
                Vec::new()
            }
            NavMsg::Next => self.go_next(),
            NavMsg::Prev => {
                self.go_prev();
                Vec::new()
            }
            NavMsg::ToggleExpand(module_id) => {
                if !self.expanded.shift_remove(&module_id) {
                    self.expanded.insert(module_id);
                }
                Vec::new()
            }
        }
    }

    pub fn course(&self) -> Option<&Course> {
        self.course.as_ref()
    }

    /// Enriched modules in course order. Empty until enrichment completes.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Module metadata as listed by the server, available before enrichment.
    pub fn module_summaries(&self) -> &[ModuleSummary] {
        &self.module_summaries
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn selected_module(&self) -> Option<&Module> {
        self.selected_module.as_ref()
    }

    pub fn selected_lecture(&self) -> Option<&Lecture> {
        self.selected_lecture.as_ref()
    }

    pub fn selected_assignment(&self) -> Option<&Assignment> {
        self.selected_assignment.as_ref()
    }

    pub fn module_lectures(&self) -> &[Lecture] {
        self.selected_module.as_ref().map_or(&[], |module| module.lectures.as_slice())
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.cursor.and_then(|cursor| self.steps.get(cursor))
    }

    /// True while the selected module's content is being fetched.
    pub fn is_loading_module(&self) -> bool {
        self.pending_content.is_some()
    }

    pub fn is_expanded(&self, module_id: &ContentId) -> bool {
        self.expanded.contains(module_id)
    }

    /// Step reached by [`NavMsg::Prev`], if any.
    pub fn prev_step(&self) -> Option<Step> {
        let cursor = self.cursor?;
        if cursor > 0 {
            return self.steps.get(cursor - 1).cloned();
        }
        self.preceding_module_index()
            .map(|index| last_step(&self.modules[index]))
    }

    /// Step reached by [`NavMsg::Next`], if any. A locked module overview is
    /// still reported so the UI can show it; advancing onto it is refused.
    pub fn next_step(&self) -> Option<Step> {
        let cursor = self.cursor?;
        if cursor + 1 < self.steps.len() {
            return self.steps.get(cursor + 1).cloned();
        }
        self.following_module_index()
            .map(|index| overview_step(&self.modules[index]))
    }

    /// Whether [`NavMsg::Next`] would move.
    pub fn can_advance(&self) -> bool {
        self.next_step().is_some_and(|step| !step.is_locked_overview())
    }

    /// Enriched module containing the entity of `kind` identified by `entity_id`.
    pub fn module_for(&self, kind: StepKind, entity_id: &ContentId) -> Option<&Module> {
        self.modules.iter().find(|module| match kind {
            StepKind::Module => module.id() == entity_id,
            StepKind::Lecture => module.has_lecture(entity_id),
            StepKind::Assignment => module.has_assignment(entity_id),
        })
    }

    pub fn find_module_by_assignment(&self, assignment_id: &ContentId) -> Option<&Module> {
        self.module_for(StepKind::Assignment, assignment_id)
    }

    /// Jump target for an assignment known only by id, e.g. from the grades view.
    pub fn assignment_target(&self, assignment_id: &ContentId) -> Option<JumpTarget> {
        self.find_module_by_assignment(assignment_id)
            .map(|module| JumpTarget::assignment(assignment_id.clone(), module.id().clone()))
    }

    fn open(&mut self, key: SessionKey) -> Vec<NavEffect> {
        if self.key.as_ref() == Some(&key) {
            debug!(course_id = %key.course_id, user_id = %key.user_id, "session already open");
            return Vec::new();
        }
        let expanded = std::mem::take(&mut self.expanded);
        let next_ticket = self.next_ticket;
        let refresh_generation = self.refresh_generation;
        *self = Self {
            key: Some(key.clone()),
            next_ticket,
            refresh_generation,
            expanded: if self.key.as_ref().is_some_and(|old| old.course_id == key.course_id) {
                expanded
            } else {
                IndexSet::new()
            },
            ..Self::default()
        };
        self.begin_refresh(key)
    }

    fn reload(&mut self) -> Vec<NavEffect> {
        match self.key.clone() {
            Some(key) => self.begin_refresh(key),
            None => {
                debug!("reload requested without an open session");
                Vec::new()
            }
        }
    }

    /// Start a refresh: one generation, enrichment once both lists are back.
    fn begin_refresh(&mut self, key: SessionKey) -> Vec<NavEffect> {
        self.refresh_generation += 1;
        self.awaiting_modules = true;
        self.awaiting_unlocks = true;
        vec![
            NavEffect::FetchCourse(key.clone()),
            NavEffect::FetchModules(key.clone()),
            NavEffect::FetchUnlockStatus(key),
        ]
    }

    fn is_stale(&self, key: &SessionKey, what: &str) -> bool {
        let stale = self.key.as_ref() != Some(key);
        if stale {
            debug!(course_id = %key.course_id, user_id = %key.user_id, what, "discarding response for a previous session");
        }
        stale
    }

    fn request_enrichment(&mut self) -> Vec<NavEffect> {
        let Some(key) = self.key.clone() else {
            return Vec::new();
        };
        if self.awaiting_modules || self.awaiting_unlocks {
            return Vec::new();
        }
        if self.module_summaries.is_empty() || self.unlock_statuses.is_empty() {
            debug!(generation = self.refresh_generation, "nothing to enrich for this refresh");
            return Vec::new();
        }
        if self.enrichment_requested == Some(self.refresh_generation) {
            return Vec::new();
        }
        self.enrichment_requested = Some(self.refresh_generation);
        vec![NavEffect::EnrichModules {
            key,
            generation: self.refresh_generation,
            modules: self.module_summaries.clone(),
        }]
    }

    fn is_unlocked(&self, module_id: &ContentId) -> bool {
        self.unlock_statuses
            .iter()
            .find(|status| &status.module_id == module_id)
            .is_some_and(|status| status.unlocked)
    }

    fn apply_enrichment(&mut self, mut contents: Vec<ModuleContent>) {
        let enriched: Vec<Module> = self
            .module_summaries
            .iter()
            .map(|summary| {
                let unlocked = self.is_unlocked(&summary.id);
                match contents.iter().position(|content| content.module_id == summary.id) {
                    Some(index) => {
                        let content = contents.swap_remove(index);
                        Module::enrich(summary.clone(), content.lectures, content.assignments, unlocked)
                    }
                    None => Module::without_content(summary.clone(), unlocked),
                }
            })
            .collect();
        debug!(modules = enriched.len(), "modules enriched");
        self.modules = enriched;

        self.refresh_selected_module();
    }

    /// Swap the displayed module for its freshly enriched copy, keeping the
    /// cursor on the same entity or clamping it when that entity is gone.
    fn refresh_selected_module(&mut self) {
        let Some(selected) = self.selected_module.as_ref() else {
            return;
        };
        let Some(fresh) = self.modules.iter().find(|module| module.id() == selected.id()).cloned() else {
            return;
        };
        let current = self.current_step().map(|step| (step.kind(), step.entity_id().clone()));
        let steps = build_steps(&fresh);
        let same_entity =
            current.as_ref().and_then(|(kind, id)| steps.iter().position(|step| step.matches(*kind, id)));
        let cursor = same_entity.unwrap_or_else(|| self.cursor.unwrap_or(0).min(steps.len() - 1));

        self.pending_content = None;
        self.steps = steps;
        self.cursor = Some(cursor);
        self.selected_module = Some(fresh);
        // A missing-entity jump leaves the section ahead of the cursor; keep it.
        let step_section = self.current_step().map(|step| Section::from(step.kind()));
        if same_entity.is_none() || step_section == Some(self.section) {
            self.apply_step_view();
        }
    }

    fn apply_module_content(&mut self, ticket: u64, content: ModuleContent) {
        let Some(pending) = self.pending_content.take_if(|pending| pending.ticket == ticket) else {
            debug!(ticket, module_id = %content.module_id, "discarding superseded module content");
            return;
        };
        let Some(selected) = self.selected_module.as_ref().filter(|module| module.id() == &pending.module_id) else {
            return;
        };
        let module = Module::enrich(
            selected.summary.clone(),
            content.lectures,
            content.assignments,
            selected.unlocked,
        );
        self.install_module(module, 0);
    }

    fn select_module(&mut self, module_id: &ContentId) -> Vec<NavEffect> {
        if let Some(module) = self.modules.iter().find(|module| module.id() == module_id).cloned() {
            self.install_module(module, 0);
            return Vec::new();
        }

        let Some(summary) = self
            .module_summaries
            .iter()
            .find(|summary| &summary.id == module_id)
            .cloned()
        else {
            warn!(%module_id, "selected module is not part of this course");
            return Vec::new();
        };
        let Some(key) = self.key.clone() else {
            return Vec::new();
        };

        let unlocked = self.is_unlocked(module_id);
        self.install_module(Module::without_content(summary, unlocked), 0);

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending_content = Some(PendingContent {
            ticket,
            module_id: module_id.clone(),
        });
        vec![NavEffect::FetchModuleContent {
            key,
            ticket,
            module_id: module_id.clone(),
        }]
    }

    fn select_section(&mut self, section: Section) {
        match section {
            Section::Home | Section::Grades => {
                self.clear_selection();
                self.section = section;
            }
            Section::Module if self.selected_module.is_some() => {
                self.cursor = Some(0);
                self.apply_step_view();
            }
            Section::Module | Section::Lecture | Section::Assignment => {
                if self.current_step().map(|step| Section::from(step.kind())) == Some(section) {
                    self.section = section;
                } else {
                    debug!(%section, "section needs a selected entity; use a jump instead");
                }
            }
        }
    }

    fn jump(&mut self, target: JumpTarget) {
        let Some(module) = self
            .modules
            .iter()
            .find(|module| module.id() == &target.module_id)
            .cloned()
        else {
            warn!(module_id = %target.module_id, "jump target module is not loaded");
            return;
        };

        let steps = build_steps(&module);
        let index = match target.kind {
            StepKind::Module => Some(0),
            kind => steps.iter().position(|step| step.matches(kind, &target.entity_id)),
        };

        if let Some(index) = index {
            self.pending_content = None;
            self.selected_module = Some(module);
            self.steps = steps;
            self.cursor = Some(index);
            self.apply_step_view();
            return;
        }

        warn!(
            kind = %target.kind,
            entity_id = %target.entity_id,
            module_id = %target.module_id,
            "jump target not found in module content"
        );
        self.pending_content = None;
        let same_module = self
            .selected_module
            .as_ref()
            .is_some_and(|selected| selected.id() == module.id());
        if !same_module {
            let last = steps.len() - 1;
            self.cursor = Some(self.cursor.unwrap_or(0).min(last));
            self.steps = steps;
            self.selected_module = Some(module);
        }
        self.section = target.kind.into();
        match target.kind {
            StepKind::Lecture => self.selected_lecture = None,
            StepKind::Assignment => self.selected_assignment = None,
            StepKind::Module => {}
        }
    }

    fn go_next(&mut self) -> Vec<NavEffect> {
        let Some(cursor) = self.cursor else {
            return Vec::new();
        };
        if cursor + 1 < self.steps.len() {
            self.cursor = Some(cursor + 1);
            self.apply_step_view();
            return Vec::new();
        }

        let Some(index) = self.following_module_index() else {
            debug!("already at the last step of the course");
            return Vec::new();
        };
        let module = &self.modules[index];
        if !module.unlocked {
            debug!(module_id = %module.id(), "next module is locked; staying on current step");
            return Vec::new();
        }
        let module = module.clone();
        self.install_module(module, 0);
        Vec::new()
    }

    fn go_prev(&mut self) {
        let Some(cursor) = self.cursor else {
            return;
        };
        if cursor > 0 {
            self.cursor = Some(cursor - 1);
            self.apply_step_view();
            return;
        }

        let Some(index) = self.preceding_module_index() else {
            debug!("already at the first step of the course");
            return;
        };
        let module = self.modules[index].clone();
        let last = last_step_index(&module);
        self.install_module(module, last);
    }

    fn selected_module_index(&self) -> Option<usize> {
        let selected = self.selected_module.as_ref()?;
        self.modules.iter().position(|module| module.id() == selected.id())
    }

    fn preceding_module_index(&self) -> Option<usize> {
        self.selected_module_index()?.checked_sub(1)
    }

    fn following_module_index(&self) -> Option<usize> {
        let next = self.selected_module_index()? + 1;
        (next < self.modules.len()).then_some(next)
    }

    /// Replace the selected module and its steps, then derive the section
    /// from the step under the cursor.
    fn install_module(&mut self, module: Module, cursor: usize) {
        self.pending_content = None;
        self.steps = build_steps(&module);
        self.cursor = Some(cursor.min(self.steps.len() - 1));
        self.selected_module = Some(module);
        self.apply_step_view();
    }

    fn apply_step_view(&mut self) {
        let Some(step) = self.current_step().cloned() else {
            return;
        };
        match step {
            Step::Module { .. } => {
                self.section = Section::Module;
                self.selected_lecture = None;
                self.selected_assignment = None;
            }
            Step::Lecture(lecture) => {
                self.section = Section::Lecture;
                self.selected_lecture = Some(lecture);
                self.selected_assignment = None;
            }
            Step::Assignment(assignment) => {
                self.section = Section::Assignment;
                self.selected_assignment = Some(assignment);
                self.selected_lecture = None;
            }
        }
    }

    fn clear_selection(&mut self) {
        self.pending_content = None;
        self.selected_module = None;
        self.selected_lecture = None;
        self.selected_assignment = None;
        self.steps.clear();
        self.cursor = None;
    }
}
