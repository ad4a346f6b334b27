use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lectern_api::{ContentSource, HttpContentSource, LecternClient};
use lectern_engine::{CourseSession, NavMsg, SessionKey};
use lectern_types::{ContentId, Step};
use lectern_util::{LecternConfig, log_file_path};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lectern", version, about = "Browse course modules, lectures and assignments")]
struct Cli {
    /// Course API base URL (overrides LECTERN_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// User whose progress is shown (overrides LECTERN_USER_ID and the config file)
    #[arg(long, short, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive course browser (default)
    Tui {
        /// Course code, e.g. CS101
        course: Option<String>,
    },
    /// Print the course outline with unlock status
    Outline { course: Option<String> },
    /// Follow "next" from a module overview until navigation stops
    Walk {
        course: Option<String>,
        /// Module id to start from; defaults to the first module
        #[arg(long)]
        from: Option<String>,
    },
    /// List the user's grades in the course
    Grades { course: Option<String> },
}

impl Command {
    fn course(&self) -> Option<&str> {
        match self {
            Command::Tui { course }
            | Command::Outline { course }
            | Command::Walk { course, .. }
            | Command::Grades { course } => course.as_deref(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui { course: None });
    init_tracing(matches!(command, Command::Tui { .. }))?;

    let mut config = LecternConfig::load().context("failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(user) = cli.user {
        config.user_id = user;
    }

    let key = SessionKey::new(resolve_course(command.course(), &config)?, config.user_id.clone());
    let client = LecternClient::new(&config.api_url, config.request_timeout())?;
    let source = Arc::new(HttpContentSource::new(client));

    match command {
        Command::Tui { .. } => lectern_tui::run(source, key).await,
        Command::Outline { .. } => outline(source, key).await,
        Command::Walk { from, .. } => walk(source, key, from.map(ContentId::from)).await,
        Command::Grades { .. } => grades(source, key).await,
    }
}

/// Log to stderr for one-shot commands; the TUI owns the screen, so it logs
/// to a file instead.
fn init_tracing(to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if !to_file {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        return Ok(());
    }

    let path = log_file_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn resolve_course(arg: Option<&str>, config: &LecternConfig) -> Result<String> {
    arg.map(str::to_string)
        .or_else(|| config.default_course.clone())
        .context("no course given; pass a course code or set default_course in the config file")
}

async fn open_session<S: ContentSource>(source: Arc<S>, key: SessionKey) -> Result<CourseSession<S>> {
    let course_id = key.course_id.clone();
    let mut session = CourseSession::new(source);
    session.open(key).await;
    if session.navigator().course().is_none() && session.navigator().module_summaries().is_empty() {
        anyhow::bail!("course {course_id} could not be loaded");
    }
    Ok(session)
}

async fn outline<S: ContentSource>(source: Arc<S>, key: SessionKey) -> Result<()> {
    let session = open_session(source, key).await?;
    let navigator = session.navigator();
    if let Some(course) = navigator.course() {
        println!("{} · {}", course.course_code, course.course_title);
        if let Some(description) = &course.course_description {
            println!("{description}");
        }
    }
    if navigator.modules().is_empty() {
        println!("(module content unavailable)");
        for summary in navigator.module_summaries() {
            println!("  {}", summary.module_title);
        }
        return Ok(());
    }
    for module in navigator.modules() {
        let lock = if module.unlocked { "" } else { " [locked]" };
        println!("\n{}{lock}", module.title());
        for lecture in &module.lectures {
            println!("  lecture     {}", lecture.lecture_title);
        }
        for assignment in &module.assignments {
            println!("  assignment  {}", assignment.assignment_title);
        }
    }
    Ok(())
}

async fn walk<S: ContentSource>(source: Arc<S>, key: SessionKey, from: Option<ContentId>) -> Result<()> {
    let mut session = open_session(source, key).await?;
    let start = match from {
        Some(module_id) => module_id,
        None => session
            .navigator()
            .modules()
            .first()
            .map(|module| module.id().clone())
            .context("course has no navigable modules")?,
    };
    session.dispatch(NavMsg::SelectModule(start.clone())).await;
    if session.navigator().selected_module().is_none() {
        anyhow::bail!("module {start} is not part of this course");
    }

    print_step(&session);
    while session.navigator().can_advance() {
        session.dispatch(NavMsg::Next).await;
        print_step(&session);
    }

    match session.navigator().next_step() {
        Some(step) if step.is_locked_overview() => println!("stopped: {} is locked", step.label()),
        _ => println!("stopped: end of course"),
    }
    Ok(())
}

fn print_step<S: ContentSource>(session: &CourseSession<S>) {
    let navigator = session.navigator();
    let (Some(cursor), Some(step)) = (navigator.cursor(), navigator.current_step()) else {
        return;
    };
    let module = navigator.selected_module().map(|module| module.title()).unwrap_or_default();
    let marker = match step {
        Step::Module { unlocked: false, .. } => " [locked]",
        _ => "",
    };
    println!("{module} [{}/{}] {}{marker}", cursor + 1, navigator.steps().len(), step.label());
}

async fn grades<S: ContentSource>(source: Arc<S>, key: SessionKey) -> Result<()> {
    let grades = source
        .grades(&key.user_id)
        .await
        .with_context(|| format!("failed to fetch grades for {}", key.user_id))?;
    let course_id = key.course_id.clone();
    let session = open_session(source, key).await?;
    let navigator = session.navigator();

    let mut printed = 0;
    for grade in grades.iter().filter(|grade| grade.course_code == course_id) {
        let status = if grade.is_passing() { "pass" } else { "fail" };
        let module = grade
            .assignment_id
            .as_ref()
            .and_then(|id| navigator.find_module_by_assignment(id))
            .map(|module| module.title().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<32} {:>6} / {:<6} {status:<4}  {module}",
            grade.assignment_title, grade.score, grade.max_score
        );
        printed += 1;
    }
    if printed == 0 {
        println!("no grades recorded for {course_id}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn tui_is_the_default_command() {
        let cli = Cli::try_parse_from(["lectern", "--user", "student-1"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.user.as_deref(), Some("student-1"));
    }

    #[test]
    fn walk_accepts_a_start_module() {
        let cli = Cli::try_parse_from(["lectern", "walk", "CS101", "--from", "2"]).unwrap();
        match cli.command {
            Some(Command::Walk { course, from }) => {
                assert_eq!(course.as_deref(), Some("CS101"));
                assert_eq!(from.as_deref(), Some("2"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn course_argument_beats_configured_default() {
        let config = LecternConfig {
            default_course: Some("MATH200".into()),
            ..LecternConfig::default()
        };
        assert_eq!(resolve_course(Some("CS101"), &config).unwrap(), "CS101");
        assert_eq!(resolve_course(None, &config).unwrap(), "MATH200");
        assert!(resolve_course(None, &LecternConfig::default()).is_err());
    }
}
