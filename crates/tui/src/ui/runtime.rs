//! Runtime: terminal lifecycle and the event loop.
//!
//! - A dedicated input thread blocks on `crossterm::event::read()` and
//!   forwards events over a channel.
//! - Effects returned by `App` are spawned on the tokio runtime; their
//!   results come back as `Msg`s through a `FuturesUnordered` of join handles.
//! - Ticking is fast (100 ms) only while requests are in flight so the
//!   throbber animates, and slow (5 s) when idle.
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::{StreamExt, stream::FuturesUnordered};
use lectern_api::ContentSource;
use lectern_engine::{SessionKey, run_effect};
use ratatui::{Terminal, prelude::*};
use tokio::task::JoinHandle;
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::warn;

use crate::app::{App, Effect, Msg};

type Pending = FuturesUnordered<JoinHandle<Msg>>;

/// Spawn a dedicated input thread that blocks on terminal input and forwards
/// `crossterm` events over a Tokio channel.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event) => {
                    if sender.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read event: {}", e);
                    break;
                }
            }
        }
    });
    receiver
}

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Start every effect in the background. Returns `true` when one of them
/// asks the program to quit.
fn spawn_effects<S: ContentSource + 'static>(source: &Arc<S>, effects: Vec<Effect>, pending: &mut Pending) -> bool {
    let mut quit = false;
    for effect in effects {
        match effect {
            Effect::Quit => quit = true,
            Effect::Nav(effect) => {
                let source = Arc::clone(source);
                pending.push(tokio::spawn(async move { Msg::Nav(run_effect(source.as_ref(), effect).await) }));
            }
            Effect::FetchGrades { user_id } => {
                let source = Arc::clone(source);
                pending.push(tokio::spawn(async move { Msg::GradesLoaded(source.grades(&user_id).await) }));
            }
        }
    }
    quit
}

/// Entry point for the TUI runtime: sets up the terminal, opens the course
/// session, runs the event loop, and performs cleanup on exit.
pub async fn run_app<S: ContentSource + 'static>(source: Arc<S>, key: SessionKey) -> Result<()> {
    let mut input_receiver = spawn_input_thread();
    let mut app = App::new(key);
    let mut terminal = setup_terminal().context("failed to initialise terminal")?;

    let mut pending = Pending::new();
    let initial = app.open();
    spawn_effects(&source, initial, &mut pending);

    let fast_interval = Duration::from_millis(100);
    let idle_interval = Duration::from_millis(5000);
    let mut current_interval = idle_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        app.executing = !pending.is_empty();
        if !app.executing {
            app.throbber_idx = 0;
        }
        terminal.draw(|frame| crate::ui::main::draw(frame, &mut app))?;

        let target_interval = if app.executing { fast_interval } else { idle_interval };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        let mut effects = Vec::new();
        tokio::select! {
            maybe_event = input_receiver.recv() => {
                match maybe_event {
                    Some(Event::Key(key_event)) if key_event.kind == KeyEventKind::Press => {
                        if key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
                            break;
                        }
                        effects = app.handle_key(key_event);
                    }
                    Some(_) => {}
                    // Input channel closed; shut down cleanly.
                    None => break,
                }
            }

            Some(joined) = pending.next(), if !pending.is_empty() => {
                match joined {
                    Ok(msg) => effects = app.update(msg),
                    Err(error) => warn!("Effect task failed: {}", error),
                }
            }

            _ = ticker.tick() => app.tick(),

            _ = signal::ctrl_c() => break,
        }

        if spawn_effects(&source, effects, &mut pending) {
            break;
        }
    }

    cleanup_terminal(&mut terminal)?;
    Ok(())
}
