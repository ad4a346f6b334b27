//! Navigation steps and view sections.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Assignment, ContentId, Lecture, ModuleSummary};

/// The kind of content a [`Step`] wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Module,
    Lecture,
    Assignment,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StepKind::Module => "module",
            StepKind::Lecture => "lecture",
            StepKind::Assignment => "assignment",
        })
    }
}

/// One navigable unit of content: a module overview, a lecture or an
/// assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Step {
    /// Module overview. Carries the unlock flag so forward navigation can be
    /// gated without another lookup.
    Module { module: ModuleSummary, unlocked: bool },
    Lecture(Lecture),
    Assignment(Assignment),
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Module { .. } => StepKind::Module,
            Step::Lecture(_) => StepKind::Lecture,
            Step::Assignment(_) => StepKind::Assignment,
        }
    }

    /// Identifier of the wrapped entity: the module id for overviews, the
    /// lecture id for lectures and the assignment id for assignments.
    pub fn entity_id(&self) -> &ContentId {
        match self {
            Step::Module { module, .. } => &module.id,
            Step::Lecture(lecture) => &lecture.lecture_id,
            Step::Assignment(assignment) => &assignment.assignment_id,
        }
    }

    /// True when this step wraps the entity of `kind` identified by `id`.
    pub fn matches(&self, kind: StepKind, id: &ContentId) -> bool {
        self.kind() == kind && self.entity_id() == id
    }

    /// True for the overview of a module that may not be entered forward.
    pub fn is_locked_overview(&self) -> bool {
        matches!(self, Step::Module { unlocked: false, .. })
    }

    /// Short label shown on prev/next controls.
    pub fn label(&self) -> String {
        match self {
            Step::Module { module, .. } => match module.module_sequence {
                Some(sequence) => format!("Module {sequence} Overview"),
                None => "Module Overview".to_string(),
            },
            Step::Lecture(lecture) => format!("Lecture: {}", lecture.lecture_title),
            Step::Assignment(assignment) => format!("Assignment: {}", assignment.assignment_title),
        }
    }
}

/// Which view the course page is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Home,
    Module,
    Lecture,
    Assignment,
    Grades,
}

impl Section {
    /// Sections that display a step and therefore show prev/next controls.
    pub fn shows_step_navigation(&self) -> bool {
        matches!(self, Section::Module | Section::Lecture | Section::Assignment)
    }
}

impl From<StepKind> for Section {
    fn from(kind: StepKind) -> Self {
        match kind {
            StepKind::Module => Section::Module,
            StepKind::Lecture => Section::Lecture,
            StepKind::Assignment => Section::Assignment,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Home => "home",
            Section::Module => "module",
            Section::Lecture => "lecture",
            Section::Assignment => "assignment",
            Section::Grades => "grades",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn overview(sequence: Option<u32>) -> Step {
        Step::Module {
            module: ModuleSummary {
                id: "m1".into(),
                module_sequence: sequence,
                module_title: "Basics".into(),
                module_description: None,
            },
            unlocked: true,
        }
    }

    #[test]
    fn labels_follow_step_kind() {
        assert_eq!(overview(Some(2)).label(), "Module 2 Overview");
        assert_eq!(overview(None).label(), "Module Overview");

        let lecture = Step::Lecture(Lecture {
            lecture_id: "L1".into(),
            lecture_title: "Variables".into(),
            sequence_number: 1,
            video_link: None,
        });
        assert_eq!(lecture.label(), "Lecture: Variables");
        assert_eq!(lecture.kind(), StepKind::Lecture);
    }

    #[test]
    fn matching_compares_kind_and_id() {
        let assignment = Step::Assignment(Assignment {
            assignment_id: "7".into(),
            assignment_title: "Quiz".into(),
            sequence_number: 1,
            max_score: None,
        });
        assert!(assignment.matches(StepKind::Assignment, &"7".into()));
        assert!(!assignment.matches(StepKind::Lecture, &"7".into()));
        assert!(!assignment.matches(StepKind::Assignment, &"8".into()));
    }

    #[test]
    fn step_serializes_with_type_tag() {
        let value = serde_json::to_value(overview(Some(1))).unwrap();
        assert_eq!(value["type"], json!("module"));
        assert_eq!(value["data"]["unlocked"], json!(true));
    }

    #[test]
    fn only_content_sections_show_navigation() {
        assert!(Section::Lecture.shows_step_navigation());
        assert!(!Section::Home.shows_step_navigation());
        assert!(!Section::Grades.shows_step_navigation());
        assert_eq!(Section::from(StepKind::Assignment), Section::Assignment);
    }
}
