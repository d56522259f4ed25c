//! External fetch capability — trait seam and the yt-dlp subprocess driver
//!
//! The orchestrator never talks to the network itself. It hands a
//! [`FetchSpec`] to a [`MediaFetcher`], which runs the transfer to
//! completion while streaming raw progress snapshots back over a channel.
//! The production implementation drives the `yt-dlp` binary; tests and
//! embedders can substitute their own implementation through the trait.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::sync::mpsc;

use crate::error::FetchError;
use crate::progress::RawProgress;

/// Name of the downloader binary searched on `$PATH`
const YTDLP_BINARY: &str = "yt-dlp";

/// Progress template handed to yt-dlp, producing one JSON snapshot per line.
///
/// Every field is rendered as a string: yt-dlp substitutes "NA" for values
/// it does not know, which would otherwise break the line as JSON.
const PROGRESS_TEMPLATE: &str = concat!(
    "download:{",
    "\"status\":\"%(progress.status)s\",",
    "\"percent\":\"%(progress._percent_str)s\",",
    "\"total_bytes\":\"%(progress.total_bytes)s\",",
    "\"downloaded_bytes\":\"%(progress.downloaded_bytes)s\",",
    "\"eta\":\"%(progress.eta)s\"}",
);

/// Configuration for a single fetch operation
#[derive(Clone, Debug)]
pub struct FetchSpec {
    /// Media URL handed verbatim to the downloader
    pub url: String,

    /// Opaque quality/format selector (e.g. "best", "worst")
    pub format: String,

    /// Output path template: the destination directory joined with a
    /// title-and-extension naming pattern
    pub output_template: PathBuf,
}

/// Abstraction over the external download capability, enabling testability
///
/// A fetcher runs one blocking-equivalent transfer per call: it emits zero
/// or more raw snapshots on `snapshots` while the transfer runs, then
/// returns success or an error. A dropped snapshot receiver is not an
/// error — implementations keep going and simply stop reporting.
#[async_trait::async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Run one download to completion
    async fn fetch(
        &self,
        spec: &FetchSpec,
        snapshots: mpsc::UnboundedSender<RawProgress>,
    ) -> Result<(), FetchError>;
}

/// Production [`MediaFetcher`] that drives the yt-dlp binary
///
/// The subprocess is spawned with line-buffered progress output; each
/// progress line is parsed into a [`RawProgress`] and forwarded. On nonzero
/// exit, the failure reason is extracted from the process's stderr.
pub struct YtDlpFetcher {
    binary: PathBuf,
}

impl YtDlpFetcher {
    /// Create a fetcher using an explicit binary path
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Create a fetcher by searching `$PATH` for the yt-dlp binary
    ///
    /// Returns `None` when the binary is not found.
    pub fn from_path() -> Option<Self> {
        which::which(YTDLP_BINARY).ok().map(Self::new)
    }

    /// The binary this fetcher invokes
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Build the subprocess invocation for a fetch
    fn command(&self, spec: &FetchSpec) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.binary);
        cmd.arg("--newline")
            .arg("--no-playlist")
            .args(["--progress-template", PROGRESS_TEMPLATE])
            .args(["-f", &spec.format])
            .arg("-o")
            .arg(&spec.output_template)
            .arg(&spec.url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the child future (cancellation) must not leave an
            // orphaned downloader running.
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait::async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(
        &self,
        spec: &FetchSpec,
        snapshots: mpsc::UnboundedSender<RawProgress>,
    ) -> Result<(), FetchError> {
        let mut child = self.command(spec).spawn().map_err(|e| FetchError::Spawn {
            binary: self.binary.display().to_string(),
            message: e.to_string(),
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FetchError::Stdio("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| FetchError::Stdio("stderr was not captured".to_string()))?;

        // Forward progress lines as they arrive. Keep draining even if the
        // receiver is gone so the child never blocks on a full pipe.
        let progress_reader = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(raw) = parse_progress_line(&line) {
                    let _ = snapshots.send(raw);
                }
            }
        });

        let stderr_reader = tokio::spawn(async move {
            let mut buf = String::new();
            let mut reader = BufReader::new(stderr);
            reader.read_to_string(&mut buf).await.ok();
            buf
        });

        let status = child
            .wait()
            .await
            .map_err(|e| FetchError::Stdio(format!("waiting for downloader: {}", e)))?;

        let _ = progress_reader.await;
        let diagnostics = stderr_reader.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(FetchError::Failed {
                reason: failure_reason(&diagnostics, status.code()),
            })
        }
    }
}

/// Parse one stdout line into a raw snapshot, or ignore it
///
/// Only lines produced by the progress template qualify; everything else
/// (informational output, malformed JSON) is dropped silently.
pub(crate) fn parse_progress_line(line: &str) -> Option<RawProgress> {
    let payload = line.trim().strip_prefix("download:")?;
    serde_json::from_str(payload).ok()
}

/// Extract a human-readable failure reason from downloader diagnostics.
///
/// Prefers the last "ERROR:" line, falls back to the last non-empty line,
/// and finally to the exit status itself.
fn failure_reason(diagnostics: &str, code: Option<i32>) -> String {
    let line = diagnostics
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with("ERROR:"))
        .or_else(|| diagnostics.lines().rev().find(|l| !l.trim().is_empty()));

    match line {
        Some(l) => l.trim().to_string(),
        None => match code {
            Some(c) => format!("downloader exited with status {}", c),
            None => "downloader terminated by signal".to_string(),
        },
    }
}
