use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::downloader::test_helpers::{
    MockFetcher, create_test_downloader, recv_until_finished, wait_for_count,
};
use crate::error::Error;
use crate::types::{DownloadRequest, Event, TaskOutcome};

#[tokio::test]
async fn shutdown_rejects_new_submissions() {
    let fetcher = Arc::new(MockFetcher::succeeding(vec![]));
    let (downloader, _temp_dir) = create_test_downloader(fetcher, 1);

    downloader.shutdown().await;

    let result = downloader
        .submit(DownloadRequest::new("https://example.com/v"))
        .await;
    assert!(matches!(result, Err(Error::ShuttingDown)));

    let stats = downloader.queue_stats().await;
    assert!(!stats.accepting_new);
}

#[tokio::test]
async fn shutdown_emits_shutdown_event() {
    let fetcher = Arc::new(MockFetcher::succeeding(vec![]));
    let (downloader, _temp_dir) = create_test_downloader(fetcher, 1);

    let mut events = downloader.subscribe();
    downloader.shutdown().await;

    assert_eq!(events.recv().await.unwrap(), Event::Shutdown);
}

#[tokio::test]
async fn shutdown_cancels_running_tasks() {
    let gate = Arc::new(Semaphore::new(0));
    let fetcher = Arc::new(MockFetcher::gated(gate));
    let started = fetcher.started_urls.clone();
    let (downloader, _temp_dir) = create_test_downloader(fetcher, 1);
    downloader.start_queue_processor();

    let mut events = downloader.subscribe();
    downloader
        .submit(DownloadRequest::new("https://example.com/v"))
        .await
        .unwrap();
    wait_for_count(&started, 1).await;

    downloader.shutdown().await;

    // The gate is never released; only cancellation can finish the task.
    let events = recv_until_finished(&mut events).await;
    assert!(matches!(
        events.last(),
        Some(Event::Finished {
            outcome: TaskOutcome::Cancelled,
            ..
        })
    ));
}

#[tokio::test]
async fn shutdown_returns_without_waiting_for_in_flight_tasks() {
    let gate = Arc::new(Semaphore::new(0));
    let fetcher = Arc::new(MockFetcher::gated(gate));
    let started = fetcher.started_urls.clone();
    let (downloader, _temp_dir) = create_test_downloader(fetcher, 1);
    downloader.start_queue_processor();

    downloader
        .submit(DownloadRequest::new("https://example.com/v"))
        .await
        .unwrap();
    wait_for_count(&started, 1).await;

    // Best-effort contract: shutdown must not block on the stuck fetch.
    tokio::time::timeout(Duration::from_secs(1), downloader.shutdown())
        .await
        .expect("shutdown must return promptly");
}

#[tokio::test]
async fn shutdown_leaves_queued_tasks_unstarted() {
    let fetcher = Arc::new(MockFetcher::succeeding(vec![]));
    let started = fetcher.started_urls.clone();
    let (downloader, _temp_dir) = create_test_downloader(fetcher, 1);

    downloader
        .submit(DownloadRequest::new("https://example.com/v"))
        .await
        .unwrap();

    downloader.shutdown().await;
    downloader.start_queue_processor();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(
        started.lock().await.is_empty(),
        "queued tasks must not start after shutdown"
    );
}
