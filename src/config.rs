//! Configuration types for media-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Download behavior configuration (destination, concurrency, event delivery)
///
/// Groups settings related to how downloads are executed and reported.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Default download directory for requests that don't override it
    /// (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Maximum concurrent downloads (default: 5)
    ///
    /// Submissions beyond this limit wait in a FIFO queue; `submit` itself
    /// never blocks on pool capacity.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_downloads: usize,

    /// Output filename template joined under the task's destination
    /// directory (default: "%(title)s.%(ext)s" — the media's title with its
    /// native extension)
    #[serde(default = "default_output_template")]
    pub output_template: String,

    /// Event broadcast buffer size (default: 1024)
    ///
    /// A subscriber that falls behind by more than this many events observes
    /// a lag error and loses the oldest events.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            max_concurrent_downloads: default_max_concurrent(),
            output_template: default_output_template(),
            event_buffer: default_event_buffer(),
        }
    }
}

/// External tool configuration (downloader binary discovery)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for the binary if no explicit path is set
    /// (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
        }
    }
}

/// Main configuration for MediaDownloader
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) — destination, concurrency, event delivery
/// - [`tools`](ToolsConfig) — downloader binary discovery
///
/// All sub-config fields are flattened for serialization, so the JSON/TOML
/// format remains flat (no nesting).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior settings (destination, concurrency, event delivery)
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// External tool settings (binary discovery)
    #[serde(flatten)]
    pub tools: ToolsConfig,
}

// Convenience accessors — allow call sites to use `config.download_dir()`
// without reaching through the sub-config structs.
impl Config {
    /// Default download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Check the configuration for values the orchestrator cannot run with
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.download.max_concurrent_downloads == 0 {
            return Err(Error::Config {
                message: "max_concurrent_downloads must be at least 1".to_string(),
                key: Some("max_concurrent_downloads".to_string()),
            });
        }

        if self.download.event_buffer == 0 {
            return Err(Error::Config {
                message: "event_buffer must be at least 1".to_string(),
                key: Some("event_buffer".to_string()),
            });
        }

        if self.download.output_template.trim().is_empty() {
            return Err(Error::Config {
                message: "output_template must not be empty".to_string(),
                key: Some("output_template".to_string()),
            });
        }

        Ok(())
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_max_concurrent() -> usize {
    5
}

fn default_output_template() -> String {
    "%(title)s.%(ext)s".to_string()
}

fn default_event_buffer() -> usize {
    1024
}

fn default_true() -> bool {
    true
}
