//! Shared test helpers: manual orchestrator construction and a scripted fetcher.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::tempdir;
use tokio::sync::{Mutex, Semaphore, broadcast, mpsc};

use crate::config::Config;
use crate::downloader::{MediaDownloader, QueueState};
use crate::error::FetchError;
use crate::fetcher::{FetchSpec, MediaFetcher};
use crate::progress::RawProgress;
use crate::types::Event;

/// Scripted [`MediaFetcher`] for exercising the orchestrator without a real
/// downloader binary.
///
/// Emits a fixed list of snapshots, optionally blocks on a release gate
/// (one `add_permits(1)` lets exactly one in-flight fetch finish), then
/// returns the configured result. Records the URL of every fetch in start
/// order, plus whether the output directory already existed when the fetch
/// began.
pub(crate) struct MockFetcher {
    snapshots: Vec<RawProgress>,
    failure: Option<String>,
    release: Option<Arc<Semaphore>>,
    pub(crate) started_urls: Arc<Mutex<Vec<String>>>,
    pub(crate) output_dir_existed: Arc<Mutex<Vec<bool>>>,
}

impl MockFetcher {
    pub(crate) fn succeeding(snapshots: Vec<RawProgress>) -> Self {
        Self {
            snapshots,
            failure: None,
            release: None,
            started_urls: Arc::new(Mutex::new(Vec::new())),
            output_dir_existed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            snapshots: Vec::new(),
            failure: Some(message.to_string()),
            release: None,
            started_urls: Arc::new(Mutex::new(Vec::new())),
            output_dir_existed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A fetcher that emits its snapshots, then blocks until the gate
    /// releases a permit for it.
    pub(crate) fn gated(release: Arc<Semaphore>) -> Self {
        Self {
            snapshots: Vec::new(),
            failure: None,
            release: Some(release),
            started_urls: Arc::new(Mutex::new(Vec::new())),
            output_dir_existed: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    async fn fetch(
        &self,
        spec: &FetchSpec,
        snapshots: mpsc::UnboundedSender<RawProgress>,
    ) -> Result<(), FetchError> {
        self.started_urls.lock().await.push(spec.url.clone());
        let dir_exists = spec
            .output_template
            .parent()
            .map(|p| p.is_dir())
            .unwrap_or(false);
        self.output_dir_existed.lock().await.push(dir_exists);

        for raw in &self.snapshots {
            let _ = snapshots.send(raw.clone());
        }

        if let Some(gate) = &self.release {
            match gate.acquire().await {
                // Consume the permit so one release lets exactly one fetch through.
                Ok(permit) => permit.forget(),
                Err(_) => {} // gate closed — fall through to the scripted result
            }
        }

        match &self.failure {
            Some(message) => Err(FetchError::Failed {
                reason: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Create a MediaDownloader wired to the given fetcher, without starting the
/// queue processor. Returns the downloader and the tempdir backing its
/// default download directory (which must be kept alive).
pub(crate) fn create_test_downloader(
    fetcher: Arc<dyn MediaFetcher>,
    max_concurrent: usize,
) -> (MediaDownloader, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();

    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.max_concurrent_downloads = max_concurrent;
    config.validate().unwrap();

    let (event_tx, _rx) = broadcast::channel(config.download.event_buffer);
    let queue_state = QueueState::new(max_concurrent);

    let downloader = MediaDownloader {
        event_tx,
        config: Arc::new(config),
        fetcher,
        queue_state,
    };

    (downloader, temp_dir)
}

/// Receive events until (and including) the first `Finished` event.
pub(crate) async fn recv_until_finished(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for events")
            .expect("event channel closed");
        let finished = matches!(event, Event::Finished { .. });
        events.push(event);
        if finished {
            return events;
        }
    }
}

/// Poll until the tracked list reaches `count` entries, or panic after 5s.
pub(crate) async fn wait_for_count(list: &Arc<Mutex<Vec<String>>>, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if list.lock().await.len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {count} fetches to start"));
}
