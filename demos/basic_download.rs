//! Basic download example
//!
//! This example demonstrates the core functionality of media-dl:
//! - Building a configuration
//! - Creating a downloader instance
//! - Subscribing to events
//! - Submitting a download
//! - Monitoring progress until the task finishes

use media_dl::{Config, DownloadConfig, DownloadRequest, Event, MediaDownloader, TaskOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    // Build configuration
    let config = Config {
        download: DownloadConfig {
            download_dir: "downloads".into(),
            max_concurrent_downloads: 3,
            ..Default::default()
        },
        ..Default::default()
    };

    // Create downloader instance (resolves the yt-dlp binary and starts
    // the queue processor)
    let downloader = MediaDownloader::new(config)?;

    // Subscribe before submitting so no events are missed
    let mut events = downloader.subscribe();

    // Submit a download
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string());
    let mut request = DownloadRequest::new(url);
    request.quality = "best".to_string();

    let handle = downloader.submit(request).await?;
    println!("Submitted task {}", handle.id());

    // Monitor events until our task reaches its outcome
    while let Ok(event) = events.recv().await {
        match event {
            Event::Queued { id, url } => {
                println!("✓ Queued task #{}: {}", id, url);
            }
            Event::Progress { id, update } => {
                println!(
                    "⬇ Task #{}: {}% ({}/{} bytes, ETA {})",
                    id, update.percent, update.downloaded_bytes, update.total_bytes, update.eta
                );
            }
            Event::Finished { id, outcome } if id == handle.id() => {
                match outcome {
                    TaskOutcome::Succeeded => println!("✓ Task #{} complete", id),
                    TaskOutcome::Failed { reason } => println!("✗ Task #{} failed: {}", id, reason),
                    TaskOutcome::Cancelled => println!("⊘ Task #{} cancelled", id),
                }
                break;
            }
            _ => {}
        }
    }

    Ok(())
}
