use lectern_types::{Assignment, Grade, Lecture, Module, Section, StepKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use super::widgets;
use crate::app::{App, MenuRow, row_kind};
use crate::theme;

/// Renders the main layout: header, module menu, content pane, step
/// navigation and hints.
pub fn draw(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Min(20)])
        .split(rows[1]);

    widgets::draw_header(f, rows[0], app);
    draw_menu(f, body[0], app);
    draw_content(f, body[1], app);
    widgets::draw_step_nav(f, rows[2], app);
    widgets::draw_hints(f, rows[3], app);
}

fn draw_menu(f: &mut Frame, area: Rect, app: &mut App) {
    let navigator = &app.navigator;
    let selected_module = navigator.selected_module().map(|module| module.id().clone());
    let items: Vec<ListItem> = app
        .menu_rows()
        .into_iter()
        .map(|row| {
            let line = match row {
                MenuRow::Module(index) => match navigator.modules().get(index) {
                    Some(module) => module_line(
                        module,
                        navigator.is_expanded(module.id()),
                        selected_module.as_ref() == Some(module.id()),
                    ),
                    None => navigator
                        .module_summaries()
                        .get(index)
                        .map(|summary| Line::styled(format!("  {}", summary.module_title), theme::text_muted()))
                        .unwrap_or_default(),
                },
                MenuRow::Lecture { module, lecture } => {
                    let module = &navigator.modules()[module];
                    child_line(row, &module.lectures[lecture].lecture_title, module.unlocked)
                }
                MenuRow::Assignment { module, assignment } => {
                    let module = &navigator.modules()[module];
                    child_line(row, &module.assignments[assignment].assignment_title, module.unlocked)
                }
            };
            ListItem::new(line)
        })
        .collect();

    let focused = matches!(navigator.section(), Section::Home);
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::border_style(focused))
                .title(Span::styled(" Modules ", theme::title_style())),
        )
        .highlight_style(theme::list_highlight_style())
        .highlight_symbol("› ");
    f.render_stateful_widget(list, area, &mut app.menu);
}

fn module_line(module: &Module, expanded: bool, selected: bool) -> Line<'static> {
    let marker = if expanded { "▾ " } else { "▸ " };
    let mut style = if module.unlocked {
        theme::text_style()
    } else {
        theme::text_muted()
    };
    if selected {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    let mut spans = vec![Span::styled(format!("{marker}{}", module.title()), style)];
    if !module.unlocked {
        spans.push(Span::styled(" (locked)", theme::text_muted()));
    }
    Line::from(spans)
}

fn child_line(row: MenuRow, title: &str, unlocked: bool) -> Line<'static> {
    let icon = match row_kind(row) {
        StepKind::Lecture => "▶",
        StepKind::Assignment => "✎",
        StepKind::Module => "",
    };
    let style = if unlocked {
        theme::text_style()
    } else {
        theme::text_muted()
    };
    Line::styled(format!("    {icon} {title}"), style)
}

fn draw_content(f: &mut Frame, area: Rect, app: &mut App) {
    let section = app.navigator.section();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style(section != Section::Home))
        .title(Span::styled(format!(" {} ", section_title(app)), theme::title_style()));

    if section == Section::Grades {
        draw_grades(f, area, block, app);
        return;
    }

    let lines = match section {
        Section::Home => home_lines(app),
        Section::Module => app.navigator.selected_module().map(module_lines).unwrap_or_default(),
        Section::Lecture => app.navigator.selected_lecture().map(lecture_lines).unwrap_or_default(),
        Section::Assignment => app
            .navigator
            .selected_assignment()
            .map(|assignment| assignment_lines(assignment, app.grade_for(&assignment.assignment_id)))
            .unwrap_or_else(|| vec![Line::styled("This assignment could not be found.", theme::warn_style())]),
        Section::Grades => Vec::new(),
    };
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn section_title(app: &App) -> String {
    match app.navigator.section() {
        Section::Home => "Course".to_string(),
        Section::Grades => "Grades".to_string(),
        Section::Module | Section::Lecture | Section::Assignment => app
            .navigator
            .selected_module()
            .map(|module| module.title().to_string())
            .unwrap_or_default(),
    }
}

fn heading(text: impl Into<String>) -> Line<'static> {
    Line::styled(text.into(), theme::text_style().add_modifier(Modifier::BOLD))
}

fn home_lines(app: &App) -> Vec<Line<'static>> {
    let Some(course) = app.navigator.course() else {
        return vec![Line::styled(
            format!("Loading {}…", app.key().course_id),
            theme::text_muted(),
        )];
    };
    let mut lines = vec![heading(format!("{} · {}", course.course_code, course.course_title))];
    if let Some(credits) = course.credits {
        lines.push(Line::styled(format!("{credits} credits"), theme::text_muted()));
    }
    if let Some(description) = &course.course_description {
        lines.push(Line::default());
        lines.push(Line::styled(description.clone(), theme::text_style()));
    }
    lines.push(Line::default());
    let modules = app.navigator.modules();
    if modules.is_empty() {
        lines.push(Line::styled("Loading modules…", theme::text_muted()));
    }
    for module in modules {
        let status = if module.unlocked { "" } else { "  (locked)" };
        lines.push(Line::styled(
            format!(
                "{}: {} lectures, {} assignments{status}",
                module.title(),
                module.lectures.len(),
                module.assignments.len()
            ),
            if module.unlocked {
                theme::text_style()
            } else {
                theme::text_muted()
            },
        ));
    }
    lines
}

fn module_lines(module: &Module) -> Vec<Line<'static>> {
    let mut lines = vec![heading(module.title().to_string())];
    if !module.unlocked {
        lines.push(Line::styled(
            "Locked: complete the previous module to unlock it.",
            theme::warn_style(),
        ));
    }
    if let Some(description) = &module.summary.module_description {
        lines.push(Line::styled(description.clone(), theme::text_style()));
    }
    lines.push(Line::default());
    lines.push(Line::styled("Lectures", theme::title_style()));
    if module.lectures.is_empty() {
        lines.push(Line::styled("  none", theme::text_muted()));
    }
    for lecture in &module.lectures {
        lines.push(Line::styled(format!("  ▶ {}", lecture.lecture_title), theme::text_style()));
    }
    lines.push(Line::styled("Assignments", theme::title_style()));
    if module.assignments.is_empty() {
        lines.push(Line::styled("  none", theme::text_muted()));
    }
    for assignment in &module.assignments {
        lines.push(Line::styled(format!("  ✎ {}", assignment.assignment_title), theme::text_style()));
    }
    lines
}

fn lecture_lines(lecture: &Lecture) -> Vec<Line<'static>> {
    let mut lines = vec![heading(lecture.lecture_title.clone()), Line::default()];
    match (&lecture.video_link, lecture.embed_url()) {
        (Some(link), Some(embed)) => {
            lines.push(Line::from(vec![
                Span::styled("Video: ", theme::title_style()),
                Span::styled(link.clone(), theme::text_style()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Embed: ", theme::title_style()),
                Span::styled(embed, theme::text_muted()),
            ]));
        }
        _ => lines.push(Line::styled("No video is available for this lecture.", theme::text_muted())),
    }
    lines
}

fn assignment_lines(assignment: &Assignment, grade: Option<&Grade>) -> Vec<Line<'static>> {
    let mut lines = vec![heading(assignment.assignment_title.clone()), Line::default()];
    if let Some(max_score) = assignment.max_score {
        lines.push(Line::styled(format!("Max score: {max_score}"), theme::text_style()));
    }
    match grade {
        Some(grade) => lines.push(Line::styled(
            format!("Your score: {} / {}", grade.score, grade.max_score),
            theme::grade_style(grade.is_passing()),
        )),
        None => lines.push(Line::styled("Not graded yet.", theme::text_muted())),
    }
    lines
}

fn draw_grades(f: &mut Frame, area: Rect, block: Block<'_>, app: &mut App) {
    if let Some(error) = &app.grades_error {
        let paragraph = Paragraph::new(Line::styled(format!("Failed to load grades: {error}"), theme::warn_style()))
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
        return;
    }
    if app.grades.is_empty() {
        let text = if app.grades_loading {
            "Loading grades…"
        } else {
            "No grades recorded for this course."
        };
        f.render_widget(Paragraph::new(Line::styled(text, theme::text_muted())).block(block), area);
        return;
    }

    let items: Vec<ListItem> = app
        .grades
        .iter()
        .map(|grade| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<32}", grade.assignment_title), theme::text_style()),
                Span::styled(
                    format!("{:>6} / {}", grade.score, grade.max_score),
                    theme::grade_style(grade.is_passing()),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(theme::list_highlight_style())
        .highlight_symbol("› ");
    f.render_stateful_widget(list, area, &mut app.grade_list);
}
