//! Task admission — validation, handle creation, queue insertion.

use std::sync::atomic::Ordering;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::types::{DownloadRequest, Event, TaskHandle, TaskId};

use super::{MediaDownloader, QueuedTask};

impl MediaDownloader {
    /// Submit a download for execution
    ///
    /// The request enters a FIFO queue; if a pool slot is free the task
    /// starts immediately, otherwise it waits for a running task to finish.
    /// This method never blocks the caller waiting for a slot — queueing
    /// happens inside the dispatcher.
    ///
    /// A `Queued` event is emitted before this method returns. The task
    /// itself then emits zero or more `Progress` events followed by exactly
    /// one `Finished` event, all observable via [`subscribe`].
    ///
    /// The returned [`TaskHandle`] identifies the task and can request
    /// cooperative cancellation.
    ///
    /// # Errors
    ///
    /// - [`Error::ShuttingDown`] when submitted after [`shutdown`]
    /// - [`Error::InvalidUrl`] when the URL is empty or blank
    ///
    /// [`subscribe`]: MediaDownloader::subscribe
    /// [`shutdown`]: MediaDownloader::shutdown
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
    ///     let mut request = DownloadRequest::new("https://example.com/watch?v=abc");
    ///     request.output_dir = Some("~/Videos".into());
    ///     request.quality = "best".to_string();
    ///
    ///     let handle = downloader.submit(request).await?;
    ///     println!("Submitted task {}", handle.id());
    ///     Ok(())
    /// }
    /// ```
    pub async fn submit(&self, request: DownloadRequest) -> Result<TaskHandle> {
        // Reject new submissions during shutdown
        if !self.queue_state.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        if request.url.trim().is_empty() {
            return Err(Error::InvalidUrl("submitted URL is empty".to_string()));
        }

        let id = TaskId(self.queue_state.next_task_id.fetch_add(1, Ordering::SeqCst));
        let cancel_token = CancellationToken::new();

        // Emit before enqueueing so the Queued event always precedes the
        // task's own events for any subscriber.
        self.emit_event(Event::Queued {
            id,
            url: request.url.clone(),
        });
        tracing::info!(task_id = id.0, url = %request.url, "Task queued");

        let mut queue = self.queue_state.queue.lock().await;
        queue.push_back(QueuedTask {
            id,
            request,
            cancel_token: cancel_token.clone(),
        });

        Ok(TaskHandle::new(id, cancel_token))
    }
}
