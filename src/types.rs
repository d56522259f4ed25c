//! Core types and events for media-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Unique identifier for a download task
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
    /// Create a new TaskId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<TaskId> for u64 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl PartialEq<u64> for TaskId {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Estimated seconds remaining for a transfer
///
/// The fetcher either reports a usable estimate or it does not; an absent
/// estimate is represented explicitly as [`Eta::Unknown`] rather than zero
/// or an omitted field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Eta {
    /// Seconds remaining, passed through verbatim from the raw snapshot
    Seconds(u64),
    /// No usable estimate was reported (serialized as `null`)
    Unknown,
}

impl std::fmt::Display for Eta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Eta::Seconds(s) => write!(f, "{}", s),
            Eta::Unknown => write!(f, "unknown"),
        }
    }
}

/// Normalized progress for a running download
///
/// One update is produced per qualifying raw snapshot. The byte counters are
/// non-optional by construction: the normalizer only emits an update when
/// both counters are known, so the type encodes that invariant instead of
/// carrying unreachable `None`s.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Completion percentage, 0..=100, truncated (never rounded) from the
    /// snapshot's percent text
    pub percent: u8,

    /// Total transfer size in bytes
    pub total_bytes: u64,

    /// Bytes downloaded so far
    pub downloaded_bytes: u64,

    /// Estimated seconds remaining, or [`Eta::Unknown`]
    pub eta: Eta,
}

/// Terminal result of a download task
///
/// Exactly one outcome is emitted per task, and it is always the last event
/// observed for that task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The external fetch completed successfully
    Succeeded,
    /// The fetch failed at some point; the task never crashes the pool
    Failed {
        /// Human-readable failure reason for the observer to present
        reason: String,
    },
    /// The task was cancelled cooperatively via its [`TaskHandle`]
    Cancelled,
}

/// Event emitted during a download task's lifecycle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Task accepted into the dispatcher's queue
    Queued {
        /// Task ID
        id: TaskId,
        /// The submitted media URL
        url: String,
    },

    /// Normalized progress update for a running task
    Progress {
        /// Task ID
        id: TaskId,
        /// The normalized progress value
        update: ProgressUpdate,
    },

    /// Task reached its terminal outcome
    Finished {
        /// Task ID
        id: TaskId,
        /// Terminal outcome (success, failure, or cancellation)
        outcome: TaskOutcome,
    },

    /// Best-effort shutdown initiated
    Shutdown,
}

/// Parameters for a single download submission
///
/// Created once per submission and consumed to construct the task; no task
/// is reused or restarted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Media URL, handed verbatim to the external downloader (must be non-empty)
    pub url: String,

    /// Destination directory (None = use the configured download directory).
    /// A leading `~` is resolved and the directory is created if absent.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Opaque quality selector forwarded to the downloader (default: "best")
    #[serde(default = "default_quality")]
    pub quality: String,
}

impl DownloadRequest {
    /// Create a request for `url` with the default quality and destination
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            output_dir: None,
            quality: default_quality(),
        }
    }
}

fn default_quality() -> String {
    "best".to_string()
}

/// Handle to a submitted task, shared between the dispatcher and the observer
///
/// The handle outlives neither interest in the task nor its single run in
/// any meaningful way: once the task finishes, cancellation is a no-op.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    /// The task's unique identifier
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Request cooperative cancellation
    ///
    /// A running task observes the request at its next suspension point,
    /// kills the external downloader, and terminates with
    /// [`TaskOutcome::Cancelled`]. A task still waiting in the queue is
    /// cancelled the moment it would start.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Whether cancellation has been requested for this task
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// Queue statistics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Number of submitted tasks waiting for a pool slot
    pub queued: usize,

    /// Number of tasks currently running
    pub active: usize,

    /// Whether the dispatcher is accepting new submissions
    pub accepting_new: bool,
}
