//! Background task spawning.
//!
//! Each [`Command`] becomes one detached tokio task. Tasks get the client and
//! plain values only; their outcome comes back as an [`AppEvent`].

use crate::app::{AppEvent, Command};
use crate::miniflux::{MinifluxClient, MinifluxError, PAGE_SIZE};
use crate::util::validate_url_for_open;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// A panicking background task would otherwise vanish inside the runtime
/// and leave the session waiting for an event that never arrives.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic payload".to_string()
            }
        })
}

/// Event reported for a panicked task that has no dedicated failure event.
fn task_panicked(task: &'static str, error: String) -> AppEvent {
    AppEvent::TaskPanicked { task, error }
}

/// A panicked entry fetch still has to leave `Loading`.
fn fetch_panicked(task: &'static str, error: String) -> AppEvent {
    AppEvent::FetchFailed {
        error: format!("Internal error in {}: {}", task, error),
    }
}

/// Spawn `work` as a background task that reports a single event.
///
/// A panic inside `work` is reported through `on_panic`.
fn spawn_reporting<F>(
    task: &'static str,
    tx: &mpsc::Sender<AppEvent>,
    work: F,
    on_panic: fn(&'static str, String) -> AppEvent,
) where
    F: Future<Output = AppEvent> + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = match catch_task_panic(work).await {
            Ok(event) => event,
            Err(panic_msg) => {
                tracing::error!(task, error = %panic_msg, "Background task panicked");
                on_panic(task, panic_msg)
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(task, error = %e, "Channel send failed (receiver dropped)");
        }
    });
}

fn action_done(action: &'static str, result: Result<(), MinifluxError>) -> AppEvent {
    AppEvent::ActionDone {
        action,
        result: result.map_err(|e| e.to_string()),
    }
}

/// Start the background work for `command`.
pub(super) fn dispatch(command: Command, client: &Arc<MinifluxClient>, tx: &mpsc::Sender<AppEvent>) {
    let label = command.label();
    tracing::debug!(command = ?command, "Dispatching");
    let client = Arc::clone(client);

    match command {
        Command::FetchEntries { listing } => spawn_reporting(
            label,
            tx,
            async move {
                match client.fetch_entries(listing, PAGE_SIZE, 0).await {
                    Ok(entries) => AppEvent::EntriesLoaded { listing, entries },
                    Err(e) => AppEvent::FetchFailed {
                        error: e.to_string(),
                    },
                }
            },
            fetch_panicked,
        ),
        Command::ChangeStatus { entry_ids, status } => spawn_reporting(
            label,
            tx,
            async move { action_done(label, client.change_read_status(&entry_ids, status).await) },
            task_panicked,
        ),
        Command::ToggleBookmark { entry_id } => spawn_reporting(
            label,
            tx,
            async move { action_done(label, client.toggle_bookmark(entry_id).await) },
            task_panicked,
        ),
        Command::SaveEntry { entry_id } => spawn_reporting(
            label,
            tx,
            async move { action_done(label, client.save_entry(entry_id).await) },
            task_panicked,
        ),
        Command::RefreshFeeds => spawn_reporting(
            label,
            tx,
            async move { action_done(label, client.refresh_all_feeds().await) },
            task_panicked,
        ),
        Command::FetchOriginalContent { entry_id } => spawn_reporting(
            label,
            tx,
            async move {
                AppEvent::OriginalContentLoaded {
                    entry_id,
                    result: client
                        .fetch_original_content(entry_id)
                        .await
                        .map_err(|e| e.to_string()),
                }
            },
            task_panicked,
        ),
        Command::OpenUrl { url } => open_url(url),
    }
}

/// Hand `url` to the system opener. Fire-and-forget: failures are logged only.
fn open_url(url: String) {
    if let Err(e) = validate_url_for_open(&url) {
        tracing::warn!(url = %url, error = %e, "Refusing to open URL");
        return;
    }
    tokio::task::spawn_blocking(move || {
        if let Err(e) = open::that(&url) {
            tracing::warn!(url = %url, error = %e, "Failed to open browser");
        }
    });
}
