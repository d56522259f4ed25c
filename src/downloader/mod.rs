//! Core orchestrator implementation split into focused submodules.
//!
//! The `MediaDownloader` struct and its methods are organized by domain:
//! - [`submit`] - Task admission (validation, handle creation, queueing)
//! - [`queue_processor`] - FIFO queue processing and task spawning
//! - [`download_task`] - Core download execution
//! - [`control`] - Cancellation and queue statistics
//! - [`lifecycle`] - Shutdown coordination

mod control;
mod download_task;
mod lifecycle;
mod queue_processor;
mod submit;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64};

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::{MediaFetcher, YtDlpFetcher};
use crate::types::{DownloadRequest, Event, TaskId};

/// Queue and task state management
#[derive(Clone)]
pub(crate) struct QueueState {
    /// FIFO queue of submitted tasks waiting for a pool slot
    pub(crate) queue: Arc<tokio::sync::Mutex<VecDeque<QueuedTask>>>,
    /// Semaphore limiting concurrent downloads (respects max_concurrent_downloads config)
    pub(crate) concurrent_limit: Arc<tokio::sync::Semaphore>,
    /// Map of running tasks to their cancellation tokens
    pub(crate) active_tasks: Arc<tokio::sync::Mutex<HashMap<TaskId, CancellationToken>>>,
    /// Flag to indicate whether new submissions are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
    /// Monotonic source of task identifiers
    pub(crate) next_task_id: Arc<AtomicU64>,
}

impl QueueState {
    pub(crate) fn new(max_concurrent: usize) -> Self {
        Self {
            queue: Arc::new(tokio::sync::Mutex::new(VecDeque::new())),
            concurrent_limit: Arc::new(tokio::sync::Semaphore::new(max_concurrent)),
            active_tasks: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
            accepting_new: Arc::new(AtomicBool::new(true)),
            next_task_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

/// A submitted task waiting in the FIFO queue
#[derive(Clone)]
pub(crate) struct QueuedTask {
    pub(crate) id: TaskId,
    pub(crate) request: DownloadRequest,
    pub(crate) cancel_token: CancellationToken,
}

/// Main orchestrator instance (cloneable - all fields are Arc-wrapped)
///
/// A `MediaDownloader` owns its task pool, queue, and event channel
/// explicitly; there are no ambient singletons. Construction starts the
/// queue processor, so a freshly created instance is immediately ready to
/// accept submissions.
#[derive(Clone)]
pub struct MediaDownloader {
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// External fetch capability (trait object for pluggable implementations)
    pub(crate) fetcher: Arc<dyn MediaFetcher>,
    /// Queue and task state management
    pub(crate) queue_state: QueueState,
}

impl MediaDownloader {
    /// Create a new MediaDownloader instance
    ///
    /// This resolves the external downloader binary (explicit path from
    /// configuration, otherwise a `$PATH` search), sets up the event
    /// broadcast channel, and starts the queue processor.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the configuration is invalid or no
    /// usable downloader binary can be found.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn MediaFetcher> = if let Some(path) = &config.tools.ytdlp_path {
            Arc::new(YtDlpFetcher::new(path.clone()))
        } else if config.tools.search_path {
            match YtDlpFetcher::from_path() {
                Some(found) => {
                    tracing::info!(binary = %found.binary().display(), "Found downloader binary on PATH");
                    Arc::new(found)
                }
                None => {
                    return Err(Error::Config {
                        message: "yt-dlp binary not found on PATH".to_string(),
                        key: Some("ytdlp_path".to_string()),
                    });
                }
            }
        } else {
            return Err(Error::Config {
                message: "no yt-dlp path configured and PATH search is disabled".to_string(),
                key: Some("ytdlp_path".to_string()),
            });
        };

        Self::with_fetcher(config, fetcher)
    }

    /// Create a MediaDownloader with a custom fetch capability
    ///
    /// This is the constructor for embedders that bring their own
    /// [`MediaFetcher`] implementation (and for tests). Behaves exactly like
    /// [`MediaDownloader::new`] otherwise, including starting the queue
    /// processor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the configuration is invalid.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn MediaFetcher>) -> Result<Self> {
        config.validate()?;

        let (event_tx, _rx) = tokio::sync::broadcast::channel(config.download.event_buffer);
        let queue_state = QueueState::new(config.download.max_concurrent_downloads);

        let downloader = Self {
            event_tx,
            config: Arc::new(config),
            fetcher,
            queue_state,
        };

        downloader.start_queue_processor();

        Ok(downloader)
    }

    /// Subscribe to download events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all
    /// events independently and is woken per event — no polling. Within one
    /// task, events are strictly ordered: every progress event precedes the
    /// task's single outcome event. No ordering holds across tasks.
    ///
    /// Events are buffered; a subscriber that falls behind by more than the
    /// configured `event_buffer` receives a `RecvError::Lagged` error and
    /// loses the oldest events.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use media_dl::{Config, DownloadRequest, MediaDownloader};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = MediaDownloader::new(Config::default())?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             println!("Event: {:?}", event);
    ///         }
    ///     });
    ///
    ///     downloader
    ///         .submit(DownloadRequest::new("https://example.com/watch?v=abc"))
    ///         .await?;
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    ///
    /// The configuration is wrapped in an Arc, so this is a cheap clone.
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// downloads proceed whether or not anyone is listening.
    pub(crate) fn emit_event(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine.
        self.event_tx.send(event).ok();
    }
}
