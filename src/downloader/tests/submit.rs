use std::sync::Arc;

use crate::downloader::test_helpers::{MockFetcher, create_test_downloader};
use crate::error::Error;
use crate::types::{DownloadRequest, Event};

// --- submit() admission ---

#[tokio::test]
async fn submit_enqueues_task_with_matching_id() {
    let fetcher = Arc::new(MockFetcher::succeeding(vec![]));
    let (downloader, _temp_dir) = create_test_downloader(fetcher, 5);

    let handle = downloader
        .submit(DownloadRequest::new("https://example.com/watch?v=abc"))
        .await
        .unwrap();

    let queue = downloader.queue_state.queue.lock().await;
    assert_eq!(queue.len(), 1, "queue should contain the submitted task");
    assert_eq!(
        queue.front().unwrap().id,
        handle.id(),
        "queued task ID should match the returned handle"
    );
}

#[tokio::test]
async fn submit_assigns_sequential_ids() {
    let fetcher = Arc::new(MockFetcher::succeeding(vec![]));
    let (downloader, _temp_dir) = create_test_downloader(fetcher, 5);

    let first = downloader
        .submit(DownloadRequest::new("https://example.com/a"))
        .await
        .unwrap();
    let second = downloader
        .submit(DownloadRequest::new("https://example.com/b"))
        .await
        .unwrap();

    assert_eq!(
        second.id().get(),
        first.id().get() + 1,
        "task ids should be assigned monotonically"
    );
}

#[tokio::test]
async fn submit_empty_url_returns_invalid_url() {
    let fetcher = Arc::new(MockFetcher::succeeding(vec![]));
    let (downloader, _temp_dir) = create_test_downloader(fetcher, 5);

    let result = downloader.submit(DownloadRequest::new("")).await;
    assert!(matches!(result, Err(Error::InvalidUrl(_))));

    let result = downloader.submit(DownloadRequest::new("   ")).await;
    assert!(
        matches!(result, Err(Error::InvalidUrl(_))),
        "blank URL must be rejected as well"
    );

    assert_eq!(
        downloader.queue_state.queue.lock().await.len(),
        0,
        "rejected submissions must not enter the queue"
    );
}

#[tokio::test]
async fn submit_emits_queued_event_with_url() {
    let fetcher = Arc::new(MockFetcher::succeeding(vec![]));
    let (downloader, _temp_dir) = create_test_downloader(fetcher, 5);

    let mut events = downloader.subscribe();
    let handle = downloader
        .submit(DownloadRequest::new("https://example.com/watch?v=abc"))
        .await
        .unwrap();

    match events.recv().await.unwrap() {
        Event::Queued { id, url } => {
            assert_eq!(id, handle.id());
            assert_eq!(url, "https://example.com/watch?v=abc");
        }
        other => panic!("expected Queued event, got: {:?}", other),
    }
}

#[tokio::test]
async fn submit_never_blocks_when_pool_is_saturated() {
    // No queue processor running, so nothing ever leaves the queue — every
    // submission beyond the pool capacity must still return immediately.
    let fetcher = Arc::new(MockFetcher::succeeding(vec![]));
    let (downloader, _temp_dir) = create_test_downloader(fetcher, 1);

    for i in 0..10 {
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(500),
            downloader.submit(DownloadRequest::new(format!("https://example.com/{i}"))),
        )
        .await;
        assert!(
            result.is_ok(),
            "submission {i} should complete without waiting for a slot"
        );
        result.unwrap().unwrap();
    }

    assert_eq!(downloader.queue_state.queue.lock().await.len(), 10);
}
