//! Application state and key handling for the Lectern TUI.
//!
//! `App` owns the course [`Navigator`] plus the view state that only the
//! terminal cares about (menu selection, grades list, status line). Input
//! and fetch results arrive as [`Msg`]s; anything that needs the network or
//! ends the program is returned as an [`Effect`] for the runtime to carry out.

use crossterm::event::{KeyCode, KeyEvent};
use lectern_api::FetchError;
use lectern_engine::{JumpTarget, NavEffect, NavMsg, Navigator, SessionKey};
use lectern_types::{ContentId, Grade, Module, Section, Step, StepKind};
use ratatui::widgets::ListState;
use tracing::warn;

#[derive(Debug)]
pub enum Msg {
    Nav(NavMsg),
    GradesLoaded(Result<Vec<Grade>, FetchError>),
}

#[derive(Debug, PartialEq)]
pub enum Effect {
    Nav(NavEffect),
    FetchGrades { user_id: String },
    Quit,
}

/// One line of the module menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuRow {
    Module(usize),
    Lecture { module: usize, lecture: usize },
    Assignment { module: usize, assignment: usize },
}

#[derive(Debug)]
pub struct App {
    pub navigator: Navigator,
    key: SessionKey,
    /// Grades of the current user for this course only.
    pub grades: Vec<Grade>,
    pub grades_loading: bool,
    pub grades_error: Option<String>,
    pub menu: ListState,
    pub grade_list: ListState,
    /// One-shot message shown in the hint bar until the next key press.
    pub status: Option<String>,
    pub executing: bool,
    pub throbber_idx: usize,
}

impl App {
    pub fn new(key: SessionKey) -> Self {
        Self {
            navigator: Navigator::new(),
            key,
            grades: Vec::new(),
            grades_loading: false,
            grades_error: None,
            menu: ListState::default(),
            grade_list: ListState::default(),
            status: None,
            executing: false,
            throbber_idx: 0,
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Effects that start the session.
    pub fn open(&mut self) -> Vec<Effect> {
        self.nav(NavMsg::Open(self.key.clone()))
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Nav(msg) => self.nav(msg),
            Msg::GradesLoaded(result) => {
                self.grades_loading = false;
                match result {
                    Ok(grades) => {
                        self.grades = grades
                            .into_iter()
                            .filter(|grade| grade.course_code == self.key.course_id)
                            .collect();
                        self.grades_error = None;
                        self.grade_list.select((!self.grades.is_empty()).then_some(0));
                    }
                    Err(error) => {
                        warn!(user_id = %self.key.user_id, %error, "grades fetch failed");
                        self.grades_error = Some(error.to_string());
                    }
                }
                Vec::new()
            }
        }
    }

    pub fn tick(&mut self) {
        if self.executing {
            self.throbber_idx = self.throbber_idx.wrapping_add(1);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        self.status = None;
        let section = self.navigator.section();
        match key.code {
            KeyCode::Char('q') => vec![Effect::Quit],
            KeyCode::Esc if section == Section::Home => vec![Effect::Quit],
            KeyCode::Esc | KeyCode::Char('h') => self.nav(NavMsg::SelectSection(Section::Home)),
            KeyCode::Char('g') => self.show_grades(),
            KeyCode::Char('r') => {
                let mut effects = self.nav(NavMsg::Reload);
                if section == Section::Grades {
                    effects.extend(self.fetch_grades());
                }
                effects
            }
            KeyCode::Char('n') | KeyCode::Right if section.shows_step_navigation() => self.next(),
            KeyCode::Char('p') | KeyCode::Left if section.shows_step_navigation() => {
                self.nav(NavMsg::Prev)
            }
            KeyCode::Up if section == Section::Grades => {
                move_selection(&mut self.grade_list, self.grades.len(), -1);
                Vec::new()
            }
            KeyCode::Down if section == Section::Grades => {
                move_selection(&mut self.grade_list, self.grades.len(), 1);
                Vec::new()
            }
            KeyCode::Enter if section == Section::Grades => self.open_selected_grade(),
            KeyCode::Up => {
                let len = self.menu_rows().len();
                move_selection(&mut self.menu, len, -1);
                Vec::new()
            }
            KeyCode::Down => {
                let len = self.menu_rows().len();
                move_selection(&mut self.menu, len, 1);
                Vec::new()
            }
            KeyCode::Enter => self.activate_menu_row(),
            KeyCode::Char(' ') => self.toggle_menu_row(),
            _ => Vec::new(),
        }
    }

    /// Menu rows in display order. Before enrichment only module rows are
    /// known; afterwards expanded modules also list their content.
    pub fn menu_rows(&self) -> Vec<MenuRow> {
        let modules = self.navigator.modules();
        if modules.is_empty() {
            return (0..self.navigator.module_summaries().len())
                .map(MenuRow::Module)
                .collect();
        }
        let mut rows = Vec::new();
        for (index, module) in modules.iter().enumerate() {
            rows.push(MenuRow::Module(index));
            if self.navigator.is_expanded(module.id()) {
                rows.extend((0..module.lectures.len()).map(|lecture| MenuRow::Lecture { module: index, lecture }));
                rows.extend(
                    (0..module.assignments.len()).map(|assignment| MenuRow::Assignment {
                        module: index,
                        assignment,
                    }),
                );
            }
        }
        rows
    }

    pub fn grade_for(&self, assignment_id: &ContentId) -> Option<&Grade> {
        self.grades
            .iter()
            .find(|grade| grade.assignment_id.as_ref() == Some(assignment_id))
    }

    fn nav(&mut self, msg: NavMsg) -> Vec<Effect> {
        let effects = self.navigator.update(msg).into_iter().map(Effect::Nav).collect();
        self.sync_menu();
        effects
    }

    fn next(&mut self) -> Vec<Effect> {
        if !self.navigator.can_advance()
            && let Some(step) = self.navigator.next_step()
            && step.is_locked_overview()
        {
            self.status = Some(format!("{} is locked", step.label()));
        }
        self.nav(NavMsg::Next)
    }

    fn show_grades(&mut self) -> Vec<Effect> {
        let mut effects = self.nav(NavMsg::SelectSection(Section::Grades));
        if self.grades.is_empty() && !self.grades_loading {
            effects.extend(self.fetch_grades());
        }
        effects
    }

    fn fetch_grades(&mut self) -> Vec<Effect> {
        self.grades_loading = true;
        vec![Effect::FetchGrades {
            user_id: self.key.user_id.clone(),
        }]
    }

    fn open_selected_grade(&mut self) -> Vec<Effect> {
        let Some(grade) = self.grade_list.selected().and_then(|index| self.grades.get(index)) else {
            return Vec::new();
        };
        let Some(assignment_id) = grade.assignment_id.clone() else {
            self.status = Some(format!("\"{}\" has no linked assignment", grade.assignment_title));
            return Vec::new();
        };
        match self.navigator.assignment_target(&assignment_id) {
            Some(target) => self.nav(NavMsg::Jump(target)),
            None => {
                warn!(%assignment_id, "graded assignment not found in any module");
                self.status = Some(format!("\"{}\" is not part of this course", grade.assignment_title));
                Vec::new()
            }
        }
    }

    fn activate_menu_row(&mut self) -> Vec<Effect> {
        let Some(row) = self.selected_menu_row() else {
            return Vec::new();
        };
        match row {
            MenuRow::Module(index) => match self.module_id_at(index) {
                Some(module_id) => self.nav(NavMsg::SelectModule(module_id)),
                None => Vec::new(),
            },
            MenuRow::Lecture { module, lecture } => {
                let Some(module) = self.navigator.modules().get(module) else {
                    return Vec::new();
                };
                if let Some(blocked) = locked_notice(module) {
                    self.status = Some(blocked);
                    return Vec::new();
                }
                let target = JumpTarget::lecture(module.lectures[lecture].lecture_id.clone(), module.id().clone());
                self.nav(NavMsg::Jump(target))
            }
            MenuRow::Assignment { module, assignment } => {
                let Some(module) = self.navigator.modules().get(module) else {
                    return Vec::new();
                };
                if let Some(blocked) = locked_notice(module) {
                    self.status = Some(blocked);
                    return Vec::new();
                }
                let target = JumpTarget::assignment(
                    module.assignments[assignment].assignment_id.clone(),
                    module.id().clone(),
                );
                self.nav(NavMsg::Jump(target))
            }
        }
    }

    fn toggle_menu_row(&mut self) -> Vec<Effect> {
        let index = match self.selected_menu_row() {
            Some(MenuRow::Module(index)) => index,
            Some(MenuRow::Lecture { module, .. } | MenuRow::Assignment { module, .. }) => module,
            None => return Vec::new(),
        };
        match self.module_id_at(index) {
            Some(module_id) => self.nav(NavMsg::ToggleExpand(module_id)),
            None => Vec::new(),
        }
    }

    fn selected_menu_row(&self) -> Option<MenuRow> {
        self.menu.selected().and_then(|index| self.menu_rows().get(index).copied())
    }

    fn module_id_at(&self, index: usize) -> Option<ContentId> {
        match self.navigator.modules().get(index) {
            Some(module) => Some(module.id().clone()),
            None => self
                .navigator
                .module_summaries()
                .get(index)
                .map(|summary| summary.id.clone()),
        }
    }

    /// Point the menu at whatever the navigator is showing.
    fn sync_menu(&mut self) {
        let rows = self.menu_rows();
        if rows.is_empty() {
            self.menu.select(None);
            return;
        }
        let Some(selected) = self.navigator.selected_module() else {
            if self.menu.selected().is_none_or(|index| index >= rows.len()) {
                self.menu.select(Some(0));
            }
            return;
        };
        let Some(module_index) = self
            .navigator
            .modules()
            .iter()
            .position(|module| module.id() == selected.id())
        else {
            return;
        };
        let step_row = self.navigator.current_step().and_then(|step| match step {
            Step::Module { .. } => None,
            Step::Lecture(lecture) => selected
                .lectures
                .iter()
                .position(|candidate| candidate.lecture_id == lecture.lecture_id)
                .map(|lecture| MenuRow::Lecture {
                    module: module_index,
                    lecture,
                }),
            Step::Assignment(assignment) => selected
                .assignments
                .iter()
                .position(|candidate| candidate.assignment_id == assignment.assignment_id)
                .map(|assignment| MenuRow::Assignment {
                    module: module_index,
                    assignment,
                }),
        });
        let position = step_row
            .and_then(|row| rows.iter().position(|candidate| *candidate == row))
            .or_else(|| rows.iter().position(|row| *row == MenuRow::Module(module_index)));
        if position.is_some() {
            self.menu.select(position);
        }
    }
}

fn locked_notice(module: &Module) -> Option<String> {
    (!module.unlocked).then(|| format!("{} is locked", module.title()))
}

fn move_selection(state: &mut ListState, len: usize, delta: isize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let current = state.selected().unwrap_or(0) as isize;
    let next = (current + delta).clamp(0, len as isize - 1);
    state.select(Some(next as usize));
}

/// Kind of the step a menu row stands for.
pub fn row_kind(row: MenuRow) -> StepKind {
    match row {
        MenuRow::Module(_) => StepKind::Module,
        MenuRow::Lecture { .. } => StepKind::Lecture,
        MenuRow::Assignment { .. } => StepKind::Assignment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use lectern_engine::ModuleContent;
    use lectern_types::{Assignment, Lecture, ModuleSummary, UnlockStatus};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn summary(id: &str, sequence: u32, title: &str) -> ModuleSummary {
        ModuleSummary {
            id: id.into(),
            module_sequence: Some(sequence),
            module_title: title.into(),
            module_description: None,
        }
    }

    fn assignment(id: &str, title: &str) -> Assignment {
        Assignment {
            assignment_id: id.into(),
            assignment_title: title.into(),
            sequence_number: 1,
            max_score: Some(100.0),
        }
    }

    /// App with a two-module course loaded; the second module is locked.
    fn loaded_app() -> App {
        let key = SessionKey::new("CS101", "student-1");
        let mut app = App::new(key.clone());
        app.open();
        app.update(Msg::Nav(NavMsg::ModulesLoaded {
            key: key.clone(),
            result: Ok(vec![summary("1", 1, "Basics"), summary("2", 2, "Functions")]),
        }));
        let effects = app.update(Msg::Nav(NavMsg::UnlockStatusLoaded {
            key: key.clone(),
            result: Ok(vec![
                UnlockStatus {
                    module_id: "1".into(),
                    unlocked: true,
                },
                UnlockStatus {
                    module_id: "2".into(),
                    unlocked: false,
                },
            ]),
        }));
        let [Effect::Nav(NavEffect::EnrichModules { generation, .. })] = effects.as_slice() else {
            panic!("expected enrichment, got {effects:?}");
        };
        app.update(Msg::Nav(NavMsg::ModulesEnriched {
            key,
            generation: *generation,
            contents: vec![
                ModuleContent {
                    module_id: "1".into(),
                    lectures: vec![Lecture {
                        lecture_id: "L1".into(),
                        lecture_title: "Variables".into(),
                        sequence_number: 1,
                        video_link: None,
                    }],
                    assignments: vec![assignment("A1", "Quiz 1")],
                },
                ModuleContent {
                    module_id: "2".into(),
                    lectures: Vec::new(),
                    assignments: vec![assignment("A2", "Quiz 2")],
                },
            ],
        }));
        app
    }

    fn grade(assignment_id: Option<&str>, course_code: &str) -> Grade {
        Grade {
            assignment_id: assignment_id.map(ContentId::from),
            assignment_title: "Quiz 1".into(),
            course_code: course_code.into(),
            score: 85.0,
            max_score: 100.0,
        }
    }

    #[test]
    fn quit_keys() {
        let mut app = loaded_app();
        assert_eq!(app.handle_key(press(KeyCode::Char('q'))), vec![Effect::Quit]);
        assert_eq!(app.handle_key(press(KeyCode::Esc)), vec![Effect::Quit]);
    }

    #[test]
    fn menu_expands_and_enters_content() {
        let mut app = loaded_app();
        assert_eq!(app.menu_rows().len(), 2);
        app.handle_key(press(KeyCode::Char(' ')));
        assert_eq!(app.menu_rows().len(), 4);

        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.navigator.section(), Section::Lecture);
        assert_eq!(app.navigator.cursor(), Some(1));
        assert_eq!(app.menu.selected(), Some(1));
    }

    #[test]
    fn locked_module_items_cannot_be_opened_from_menu() {
        let mut app = loaded_app();
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Char(' ')));
        assert_eq!(app.menu_rows()[2], MenuRow::Assignment { module: 1, assignment: 0 });
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.navigator.section(), Section::Home);
        assert_eq!(app.status.as_deref(), Some("Functions is locked"));
    }

    #[test]
    fn next_into_locked_module_reports_status() {
        let mut app = loaded_app();
        app.handle_key(press(KeyCode::Enter));
        for _ in 0..3 {
            app.handle_key(press(KeyCode::Char('n')));
        }
        assert_eq!(app.navigator.cursor(), Some(2));
        assert_eq!(app.status.as_deref(), Some("Module 2 Overview is locked"));
    }

    #[test]
    fn grades_are_fetched_once_and_filtered_to_course() {
        let mut app = loaded_app();
        let effects = app.handle_key(press(KeyCode::Char('g')));
        assert_eq!(
            effects,
            vec![Effect::FetchGrades {
                user_id: "student-1".into()
            }]
        );
        assert!(app.handle_key(press(KeyCode::Char('g'))).is_empty());

        app.update(Msg::GradesLoaded(Ok(vec![grade(Some("A1"), "CS101"), grade(Some("X9"), "MATH200")])));
        assert_eq!(app.grades.len(), 1);
        assert_eq!(app.grade_list.selected(), Some(0));
        assert!(app.grade_for(&"A1".into()).is_some());
    }

    #[test]
    fn selecting_a_grade_jumps_to_its_assignment() {
        let mut app = loaded_app();
        app.handle_key(press(KeyCode::Char('g')));
        app.update(Msg::GradesLoaded(Ok(vec![grade(Some("A1"), "CS101")])));
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.navigator.section(), Section::Assignment);
        assert_eq!(app.navigator.cursor(), Some(2));
    }

    #[test]
    fn grade_for_unknown_assignment_is_reported() {
        let mut app = loaded_app();
        app.handle_key(press(KeyCode::Char('g')));
        app.update(Msg::GradesLoaded(Ok(vec![grade(Some("A404"), "CS101")])));
        app.handle_key(press(KeyCode::Enter));
        assert_eq!(app.navigator.section(), Section::Grades);
        assert!(app.status.is_some());
    }

    #[test]
    fn row_kinds() {
        assert_eq!(row_kind(MenuRow::Module(0)), StepKind::Module);
        assert_eq!(row_kind(MenuRow::Lecture { module: 0, lecture: 1 }), StepKind::Lecture);
    }
}
