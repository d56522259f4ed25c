//! Download task execution — the full lifecycle of a single download.
//!
//! A task prepares its output directory, invokes the external fetch
//! capability once, forwards every qualifying progress snapshot through the
//! normalizer, and terminates by emitting exactly one outcome event — on
//! every exit path, after all of its progress events.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Error;
use crate::fetcher::{FetchSpec, MediaFetcher};
use crate::progress;
use crate::types::{DownloadRequest, Event, TaskId, TaskOutcome};
use crate::utils;

/// Shared context for a single download task, reducing parameter passing
/// between helpers.
pub(crate) struct DownloadTaskContext {
    pub(crate) id: TaskId,
    pub(crate) request: DownloadRequest,
    pub(crate) cancel_token: CancellationToken,
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    pub(crate) config: Arc<Config>,
    pub(crate) fetcher: Arc<dyn MediaFetcher>,
    pub(crate) active_tasks: Arc<tokio::sync::Mutex<HashMap<TaskId, CancellationToken>>>,
}

impl DownloadTaskContext {
    /// Remove this task from the active tasks map.
    async fn remove_from_active(&self) {
        let mut active = self.active_tasks.lock().await;
        active.remove(&self.id);
    }
}

/// Core download task — runs one download from start to terminal outcome.
///
/// The outcome event is emitted unconditionally, exactly once, as the
/// task's final act; no failure inside the task escapes to the dispatcher
/// or the observer.
pub(crate) async fn run_download_task(ctx: DownloadTaskContext) {
    let id = ctx.id;
    tracing::info!(task_id = id.0, url = %ctx.request.url, "Starting download task");

    let outcome = execute(&ctx).await;

    match &outcome {
        TaskOutcome::Succeeded => {
            tracing::info!(task_id = id.0, "Download complete");
        }
        TaskOutcome::Failed { reason } => {
            tracing::error!(task_id = id.0, reason = %reason, "Download failed");
        }
        TaskOutcome::Cancelled => {
            tracing::info!(task_id = id.0, "Download cancelled");
        }
    }

    ctx.remove_from_active().await;
    ctx.event_tx.send(Event::Finished { id, outcome }).ok();
}

/// Run the download phases, mapping every failure into a terminal outcome.
async fn execute(ctx: &DownloadTaskContext) -> TaskOutcome {
    // A token cancelled while the task was still queued takes effect now,
    // before any filesystem work.
    if ctx.cancel_token.is_cancelled() {
        return TaskOutcome::Cancelled;
    }

    // Phase 1: resolve the destination and create it before the fetch begins.
    let requested_dir = ctx
        .request
        .output_dir
        .clone()
        .unwrap_or_else(|| ctx.config.download.download_dir.clone());
    let output_dir = utils::expand_home(&requested_dir);

    if let Err(e) = tokio::fs::create_dir_all(&output_dir).await {
        let err = Error::DirectoryCreation {
            path: output_dir,
            message: e.to_string(),
        };
        return TaskOutcome::Failed {
            reason: err.to_string(),
        };
    }

    // Phase 2: wire the snapshot channel through the normalizer. Each
    // qualifying snapshot becomes a Progress event immediately — no
    // batching, no debounce.
    let (snapshot_tx, mut snapshot_rx) = mpsc::unbounded_channel();
    let event_tx = ctx.event_tx.clone();
    let id = ctx.id;
    let forwarder = tokio::spawn(async move {
        while let Some(raw) = snapshot_rx.recv().await {
            if let Some(update) = progress::normalize(&raw) {
                event_tx.send(Event::Progress { id, update }).ok();
            }
        }
    });

    // Phase 3: run the fetch, racing it against cooperative cancellation.
    // Dropping the fetch future tears down the external downloader.
    let spec = FetchSpec {
        url: ctx.request.url.clone(),
        format: ctx.request.quality.clone(),
        output_template: output_dir.join(&ctx.config.download.output_template),
    };
    let fetch_result = tokio::select! {
        result = ctx.fetcher.fetch(&spec, snapshot_tx) => Some(result),
        _ = ctx.cancel_token.cancelled() => None,
    };

    // Phase 4: drain remaining snapshots so every progress event precedes
    // the outcome event.
    let _ = forwarder.await;

    match fetch_result {
        None => TaskOutcome::Cancelled,
        Some(Ok(())) => TaskOutcome::Succeeded,
        Some(Err(e)) => TaskOutcome::Failed {
            reason: e.to_string(),
        },
    }
}
