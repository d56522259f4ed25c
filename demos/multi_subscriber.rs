//! Multiple event subscribers example
//!
//! This example demonstrates how multiple parts of your application
//! can independently subscribe to download events.

use media_dl::{Config, DownloadRequest, Event, MediaDownloader, TaskOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let downloader = MediaDownloader::new(Config::default())?;

    // UI subscriber - only cares about progress updates
    let mut ui_events = downloader.subscribe();
    tokio::spawn(async move {
        println!("[UI] Starting UI event subscriber");
        while let Ok(event) = ui_events.recv().await {
            if let Event::Progress { id, update } = event {
                // Update progress bar
                println!(
                    "[UI] Task {} progress: {}% (ETA {})",
                    id, update.percent, update.eta
                );
            }
        }
    });

    // Logging subscriber - logs everything
    let mut log_events = downloader.subscribe();
    tokio::spawn(async move {
        println!("[LOG] Starting logging subscriber");
        while let Ok(event) = log_events.recv().await {
            println!("[LOG] Event: {:?}", event);
        }
    });

    // Notification subscriber - only cares about terminal outcomes
    let mut notification_events = downloader.subscribe();
    let notifier = tokio::spawn(async move {
        println!("[NOTIFY] Starting notification subscriber");
        while let Ok(event) = notification_events.recv().await {
            if let Event::Finished { id, outcome } = event {
                match outcome {
                    TaskOutcome::Succeeded => println!("[NOTIFY] Task {} succeeded", id),
                    TaskOutcome::Failed { reason } => {
                        println!("[NOTIFY] Task {} failed: {}", id, reason)
                    }
                    TaskOutcome::Cancelled => println!("[NOTIFY] Task {} cancelled", id),
                }
                break;
            }
        }
    });

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string());
    let handle = downloader.submit(DownloadRequest::new(url)).await?;
    println!("Submitted task {}", handle.id());

    // Wait for the notification subscriber to observe the outcome
    notifier.await?;

    Ok(())
}
