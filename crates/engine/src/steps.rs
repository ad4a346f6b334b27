//! Step sequences derived from enriched modules.

use lectern_types::{Module, Step};

/// Overview step for `module`.
pub fn overview_step(module: &Module) -> Step {
    Step::Module {
        module: module.summary.clone(),
        unlocked: module.unlocked,
    }
}

/// Build the ordered step sequence of a module: its overview, then its
/// lectures, then its assignments.
///
/// Content order is taken from the module as-is; [`Module::enrich`] already
/// sorts lectures and assignments by `sequence_number`.
pub fn build_steps(module: &Module) -> Vec<Step> {
    let mut steps = Vec::with_capacity(1 + module.lectures.len() + module.assignments.len());
    steps.push(overview_step(module));
    steps.extend(module.lectures.iter().cloned().map(Step::Lecture));
    steps.extend(module.assignments.iter().cloned().map(Step::Assignment));
    steps
}

/// The final step of a module: its last assignment, else its last lecture,
/// else its overview.
pub fn last_step(module: &Module) -> Step {
    if let Some(assignment) = module.assignments.last() {
        return Step::Assignment(assignment.clone());
    }
    if let Some(lecture) = module.lectures.last() {
        return Step::Lecture(lecture.clone());
    }
    overview_step(module)
}

/// Index of [`last_step`] within [`build_steps`].
pub fn last_step_index(module: &Module) -> usize {
    module.lectures.len() + module.assignments.len()
}
