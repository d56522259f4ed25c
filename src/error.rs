//! Error types for media-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (configuration, submission, fetching)
//! - Contextual information (paths, binary names, downloader output)
//!
//! Failures that occur inside a running task never surface as `Err` values
//! to observers: the task boundary converts them into a `Failed` outcome
//! event with a human-readable reason string.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_concurrent_downloads")
        key: Option<String>,
    },

    /// Submitted URL is empty or otherwise unusable
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Output directory could not be created or resolved
    #[error("failed to create output directory '{path}': {message}")]
    DirectoryCreation {
        /// The directory that could not be created
        path: PathBuf,
        /// The underlying filesystem error message
        message: String,
    },

    /// External downloader error
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Shutdown in progress - not accepting new downloads
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,
}

/// Errors raised by the external fetch capability
///
/// These are caught at the task boundary and converted into the task's
/// `Failed` outcome; they never escape to the dispatcher or the observer.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The downloader process could not be started
    #[error("failed to start '{binary}': {message}")]
    Spawn {
        /// The binary that failed to launch
        binary: String,
        /// The underlying OS error message
        message: String,
    },

    /// Reading from or waiting on the downloader process failed
    #[error("downloader I/O error: {0}")]
    Stdio(String),

    /// The downloader ran but reported failure
    #[error("downloader failed: {reason}")]
    Failed {
        /// Failure reason extracted from the downloader's diagnostics
        reason: String,
    },
}
