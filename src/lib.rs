//! # media-dl
//!
//! Embeddable download orchestration library for media URLs, built on the
//! external `yt-dlp` downloader.
//!
//! ## Design Philosophy
//!
//! media-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//! - **Non-blocking** - Submissions queue instantly; all transfer and
//!   filesystem work runs on worker tasks
//! - **Failure-containing** - A task always terminates with exactly one
//!   outcome event; nothing a download does can crash the pool
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{Config, DownloadRequest, Event, MediaDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = MediaDownloader::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             match event {
//!                 Event::Progress { id, update } => {
//!                     println!("task {}: {}%", id, update.percent);
//!                 }
//!                 Event::Finished { id, outcome } => {
//!                     println!("task {} finished: {:?}", id, outcome);
//!                 }
//!                 _ => {}
//!             }
//!         }
//!     });
//!
//!     let mut request = DownloadRequest::new("https://example.com/watch?v=abc");
//!     request.output_dir = Some("~/Videos".into());
//!     downloader.submit(request).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Core orchestrator implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// External fetch capability (trait seam and the yt-dlp driver)
pub mod fetcher;
/// Progress snapshot normalization
pub mod progress;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{Config, DownloadConfig, ToolsConfig};
pub use downloader::MediaDownloader;
pub use error::{Error, FetchError, Result};
pub use fetcher::{FetchSpec, MediaFetcher, YtDlpFetcher};
pub use progress::{RawProgress, normalize};
pub use types::{
    DownloadRequest, Eta, Event, ProgressUpdate, QueueStats, TaskHandle, TaskId, TaskOutcome,
};

/// Helper function to run the downloader until a termination signal arrives.
///
/// Waits for a termination signal and then calls the downloader's
/// best-effort [`shutdown`](MediaDownloader::shutdown).
///
/// - **Unix:** listens for SIGTERM and SIGINT, falling back to `ctrl_c` if
///   signal registration fails (containers, restricted environments).
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use media_dl::{Config, MediaDownloader, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = MediaDownloader::new(Config::default())?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(downloader).await;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: MediaDownloader) {
    wait_for_signal().await;
    downloader.shutdown().await;
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        _ => {
            tracing::warn!("Could not register signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
    }
}
