//! In-memory content source and the CS101 fixture used across engine tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lectern_api::{ContentSource, FetchError};
use lectern_types::{Assignment, ContentId, Course, Grade, Lecture, ModuleSummary, UnlockStatus};

use crate::navigator::ModuleContent;

pub fn cs101_course() -> Course {
    Course {
        course_code: "CS101".into(),
        course_title: "Intro to CS".into(),
        course_description: Some("Programming fundamentals".into()),
        credits: Some(3),
    }
}

pub fn cs101_modules() -> Vec<ModuleSummary> {
    vec![
        ModuleSummary {
            id: "1".into(),
            module_sequence: Some(1),
            module_title: "Basics".into(),
            module_description: None,
        },
        ModuleSummary {
            id: "2".into(),
            module_sequence: Some(2),
            module_title: "Functions".into(),
            module_description: None,
        },
    ]
}

pub fn cs101_unlocks() -> Vec<UnlockStatus> {
    vec![
        UnlockStatus {
            module_id: "1".into(),
            unlocked: true,
        },
        UnlockStatus {
            module_id: "2".into(),
            unlocked: false,
        },
    ]
}

fn lecture(id: &str, title: &str, sequence_number: i64) -> Lecture {
    Lecture {
        lecture_id: id.into(),
        lecture_title: title.into(),
        sequence_number,
        video_link: None,
    }
}

fn assignment(id: &str, title: &str, sequence_number: i64) -> Assignment {
    Assignment {
        assignment_id: id.into(),
        assignment_title: title.into(),
        sequence_number,
        max_score: Some(100.0),
    }
}

/// Module 1: lectures L1, L2 and assignment A1. Module 2: assignment A2 only.
pub fn cs101_contents() -> Vec<ModuleContent> {
    vec![
        ModuleContent {
            module_id: "1".into(),
            lectures: vec![lecture("L1", "Variables", 1), lecture("L2", "Loops", 2)],
            assignments: vec![assignment("A1", "Quiz 1", 1)],
        },
        ModuleContent {
            module_id: "2".into(),
            lectures: Vec::new(),
            assignments: vec![assignment("A2", "Quiz 2", 1)],
        },
    ]
}

fn not_found(path: String) -> FetchError {
    FetchError::Status {
        status: 404,
        path,
        message: "not found".into(),
    }
}

/// [`ContentSource`] answering from fixed data and counting calls.
#[derive(Default)]
pub struct StaticContentSource {
    course: Option<Course>,
    modules: Vec<ModuleSummary>,
    unlocks: Vec<UnlockStatus>,
    contents: Vec<ModuleContent>,
    grades: Vec<Grade>,
    failing_lectures: HashSet<ContentId>,
    course_calls: AtomicUsize,
    lecture_calls: AtomicUsize,
    assignment_calls: AtomicUsize,
}

impl StaticContentSource {
    pub fn cs101() -> Self {
        Self {
            course: Some(cs101_course()),
            modules: cs101_modules(),
            unlocks: cs101_unlocks(),
            contents: cs101_contents(),
            grades: vec![Grade {
                assignment_id: Some("A1".into()),
                assignment_title: "Quiz 1".into(),
                course_code: "CS101".into(),
                score: 92.0,
                max_score: 100.0,
            }],
            ..Self::default()
        }
    }

    pub fn failing_lectures_for(mut self, module_id: &str) -> Self {
        self.failing_lectures.insert(module_id.into());
        self
    }

    pub fn course_calls(&self) -> usize {
        self.course_calls.load(Ordering::SeqCst)
    }

    pub fn lecture_calls(&self) -> usize {
        self.lecture_calls.load(Ordering::SeqCst)
    }

    pub fn assignment_calls(&self) -> usize {
        self.assignment_calls.load(Ordering::SeqCst)
    }

    fn content(&self, module_id: &ContentId) -> Option<&ModuleContent> {
        self.contents.iter().find(|content| &content.module_id == module_id)
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    async fn course(&self, course_id: &str) -> Result<Course, FetchError> {
        self.course_calls.fetch_add(1, Ordering::SeqCst);
        self.course
            .clone()
            .filter(|course| course.course_code == course_id)
            .ok_or_else(|| not_found(format!("/courses/{course_id}")))
    }

    async fn modules(&self, _course_id: &str) -> Result<Vec<ModuleSummary>, FetchError> {
        Ok(self.modules.clone())
    }

    async fn unlock_status(&self, _course_id: &str, _user_id: &str) -> Result<Vec<UnlockStatus>, FetchError> {
        Ok(self.unlocks.clone())
    }

    async fn lectures(&self, module_id: &ContentId) -> Result<Vec<Lecture>, FetchError> {
        self.lecture_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_lectures.contains(module_id) {
            return Err(FetchError::Status {
                status: 500,
                path: format!("/modules/{module_id}/lectures"),
                message: "Server error".into(),
            });
        }
        Ok(self.content(module_id).map(|c| c.lectures.clone()).unwrap_or_default())
    }

    async fn assignments(&self, module_id: &ContentId) -> Result<Vec<Assignment>, FetchError> {
        self.assignment_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .content(module_id)
            .map(|c| c.assignments.clone())
            .unwrap_or_default())
    }

    async fn grades(&self, _user_id: &str) -> Result<Vec<Grade>, FetchError> {
        Ok(self.grades.clone())
    }
}
