//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, background task results and a periodic tick.
//! All session state is mutated here, one event at a time.

use crate::app::{App, AppEvent, Command};
use crate::miniflux::MinifluxClient;
use anyhow::Result;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::helpers::dispatch;
use super::input::handle_input;
use super::render::render;

/// Result of handling a key press event.
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Runs the TUI until the user quits or a termination signal arrives.
///
/// `initial` holds commands to dispatch before the first frame (the first
/// entry fetch). The terminal's starting size is applied as a resize.
///
/// Installs a panic hook that restores the terminal before the default hook
/// prints the panic.
pub async fn run(
    app: &mut App,
    client: Arc<MinifluxClient>,
    initial: Vec<Command>,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let outcome = event_loop(&mut terminal, app, &client, initial, &event_tx, &mut event_rx).await;
    let restored = restore_terminal(terminal);
    outcome.and(restored)
}

/// Body of [`run`]. Any error returned here still goes through terminal
/// restoration in the caller.
async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    client: &Arc<MinifluxClient>,
    initial: Vec<Command>,
    event_tx: &mpsc::Sender<AppEvent>,
    event_rx: &mut mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    let size = terminal.size()?;
    app.resize(size.width, size.height);
    for command in initial {
        dispatch(command, client, event_tx);
    }

    let mut commands = Vec::new();
    loop {
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Drain finished background work before waiting on input again.
        while let Ok(event) = event_rx.try_recv() {
            app.handle_event(event);
        }
        if app.needs_redraw {
            continue;
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                return Ok(());
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                return Ok(());
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.needs_redraw = true;
                        if let Action::Quit = handle_input(app, key.code, key.modifiers, &mut commands) {
                            return Ok(());
                        }
                        for command in commands.drain(..) {
                            dispatch(command, client, event_tx);
                        }
                    }
                    Some(Ok(Event::Resize(width, height))) => app.resize(width, height),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Terminal input error");
                        return Err(e.into());
                    }
                    None => return Ok(()),
                }
            }

            Some(event) = event_rx.recv() => {
                app.handle_event(event);
            }

            _ = tick_interval.tick() => {}
        }
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }
    match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => Ok(terminal),
        Err(e) => {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            Err(e.into())
        }
    }
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
