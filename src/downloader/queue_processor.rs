//! Queue processor — pops submitted tasks in FIFO order and spawns them.

use std::sync::Arc;
use std::time::Duration;

use super::MediaDownloader;
use super::download_task::{DownloadTaskContext, run_download_task};

/// Interval between queue polling attempts when the queue is empty
const QUEUE_POLL_INTERVAL: Duration = Duration::from_millis(50);

impl MediaDownloader {
    /// Start the queue processor task
    ///
    /// This method spawns a background task that continuously:
    /// 1. Acquires a permit from the concurrency limiter (respects max_concurrent_downloads)
    /// 2. Pops the next submitted task from the FIFO queue
    /// 3. Spawns a download task for that submission
    /// 4. Repeats until shutdown closes the limiter
    ///
    /// The permit is acquired before the pop so that a task waiting for a
    /// slot stays visibly queued until the moment it actually starts.
    ///
    /// FIFO order governs only *start* order: tasks run fully in parallel up
    /// to the pool capacity, and nothing is guaranteed about completion
    /// order.
    pub(crate) fn start_queue_processor(&self) -> tokio::task::JoinHandle<()> {
        let queue = self.queue_state.queue.clone();
        let concurrent_limit = self.queue_state.concurrent_limit.clone();
        let active_tasks = self.queue_state.active_tasks.clone();
        let event_tx = self.event_tx.clone();
        let config = self.config.clone();
        let fetcher = self.fetcher.clone();

        tokio::spawn(async move {
            loop {
                // Wait for a free pool slot (submissions keep queueing meanwhile)
                let permit = match concurrent_limit.clone().acquire_owned().await {
                    Ok(p) => p,
                    // Semaphore closed by shutdown — stop dispatching
                    Err(_) => break,
                };

                let next = {
                    let mut queue_guard = queue.lock().await;
                    queue_guard.pop_front()
                };

                if let Some(task) = next {
                    // Register the cancellation token for control operations
                    {
                        let mut active = active_tasks.lock().await;
                        active.insert(task.id, task.cancel_token.clone());
                    }

                    let ctx = DownloadTaskContext {
                        id: task.id,
                        request: task.request,
                        cancel_token: task.cancel_token,
                        event_tx: event_tx.clone(),
                        config: Arc::clone(&config),
                        fetcher: Arc::clone(&fetcher),
                        active_tasks: Arc::clone(&active_tasks),
                    };

                    // Spawn the download task; the permit is released when
                    // the task finishes, freeing the slot for the next one.
                    tokio::spawn(async move {
                        let _permit = permit;
                        run_download_task(ctx).await;
                    });
                } else {
                    // Queue is empty, return the slot and wait a bit
                    drop(permit);
                    tokio::time::sleep(QUEUE_POLL_INTERVAL).await;
                }
            }
        })
    }
}
