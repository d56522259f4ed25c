//! Shutdown coordination.

use std::sync::atomic::Ordering;

use crate::types::Event;

use super::MediaDownloader;

impl MediaDownloader {
    /// Shut down the orchestrator, best-effort
    ///
    /// The shutdown sequence:
    /// 1. Stops accepting new submissions
    /// 2. Closes the concurrency limiter so queued tasks never start
    /// 3. Signals cancellation to all running tasks
    /// 4. Emits a `Shutdown` event
    ///
    /// In-flight tasks are cancelled, not awaited: this method returns
    /// immediately, and cancelled tasks emit their `Cancelled` outcome
    /// shortly after on their own. Host processes that exit right away may
    /// never observe those outcomes — cleanup is best-effort by design.
    pub async fn shutdown(&self) {
        tracing::info!("Initiating shutdown");

        // 1. Stop accepting new submissions
        self.queue_state.accepting_new.store(false, Ordering::SeqCst);

        // 2. Close the limiter — the queue processor stops dispatching and exits
        self.queue_state.concurrent_limit.close();

        // 3. Signal cancellation to running tasks
        {
            let active = self.queue_state.active_tasks.lock().await;
            tracing::debug!(
                active_count = active.len(),
                "Signalling cancellation to active tasks"
            );
            for (id, token) in active.iter() {
                tracing::debug!(task_id = id.0, "Cancelling task");
                token.cancel();
            }
        }

        // 4. Emit shutdown event
        self.event_tx.send(Event::Shutdown).ok();

        tracing::info!("Shutdown complete (in-flight tasks cancelled, not awaited)");
    }
}
