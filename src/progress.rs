//! Progress snapshot normalization
//!
//! The external downloader reports progress as loosely-structured snapshots:
//! a status tag plus text fields that may be absent, placeholder values
//! ("NA"), or decorated with terminal color codes. [`normalize`] converts a
//! snapshot into a typed [`ProgressUpdate`], or drops it.
//!
//! Normalization is a pure transformation: malformed or unexpected snapshot
//! shapes never raise — they produce `None`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::types::{Eta, ProgressUpdate};

/// Matches ANSI CSI sequences (e.g. `\x1b[0;94m`) that the downloader embeds
/// in its percent text for terminal display.
#[allow(clippy::expect_used)]
static CONTROL_SEQUENCES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("static pattern is valid"));

/// A raw, point-in-time progress report from the external downloader
///
/// All fields are optional text: the downloader substitutes placeholder
/// strings for values it does not know, and nothing in a snapshot is
/// trusted until it parses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProgress {
    /// Status tag ("downloading", "finished", ...)
    #[serde(default)]
    pub status: Option<String>,

    /// Percent text as rendered by the downloader (e.g. " 42.9%"), possibly
    /// wrapped in terminal control sequences
    #[serde(default)]
    pub percent: Option<String>,

    /// Total byte count as text, or a placeholder when unknown
    #[serde(default)]
    pub total_bytes: Option<String>,

    /// Downloaded byte count as text, or a placeholder when unknown
    #[serde(default)]
    pub downloaded_bytes: Option<String>,

    /// Estimated seconds remaining as text, or a placeholder when unknown
    #[serde(default)]
    pub eta: Option<String>,
}

impl RawProgress {
    /// Build a "downloading" snapshot; primarily useful for fetcher
    /// implementations and tests
    pub fn downloading(
        percent: &str,
        total_bytes: Option<u64>,
        downloaded_bytes: Option<u64>,
        eta: Option<u64>,
    ) -> Self {
        Self {
            status: Some("downloading".to_string()),
            percent: Some(percent.to_string()),
            total_bytes: total_bytes.map(|b| b.to_string()),
            downloaded_bytes: downloaded_bytes.map(|b| b.to_string()),
            eta: eta.map(|e| e.to_string()),
        }
    }
}

/// Convert a raw snapshot into a normalized update, or drop it
///
/// Returns `None` unless the status is "downloading" AND both byte counters
/// are present and parseable — a snapshot missing either counter is dropped,
/// not forwarded as a partial update.
///
/// The percent value is taken from the snapshot's own percent text: control
/// sequences are stripped, the text is trimmed, and the value is truncated
/// at the decimal point (`"42.9%"` → 42 — truncated, not rounded). The ETA
/// passes through verbatim when it parses, otherwise it becomes
/// [`Eta::Unknown`].
///
/// # Examples
///
/// ```
/// use media_dl::progress::{RawProgress, normalize};
///
/// let raw = RawProgress::downloading("17.99%", Some(1000), Some(180), Some(34));
/// let update = normalize(&raw).unwrap();
/// assert_eq!(update.percent, 17); // truncated, not rounded
///
/// let partial = RawProgress::downloading("50.0%", Some(1000), None, None);
/// assert!(normalize(&partial).is_none()); // missing counter: dropped
/// ```
pub fn normalize(raw: &RawProgress) -> Option<ProgressUpdate> {
    if raw.status.as_deref() != Some("downloading") {
        return None;
    }

    let total_bytes = parse_counter(raw.total_bytes.as_deref())?;
    let downloaded_bytes = parse_counter(raw.downloaded_bytes.as_deref())?;
    let percent = parse_percent(raw.percent.as_deref()?)?;
    let eta = parse_eta(raw.eta.as_deref());

    Some(ProgressUpdate {
        percent,
        total_bytes,
        downloaded_bytes,
        eta,
    })
}

/// Parse a byte counter, tolerating integral and fractional renderings.
/// Placeholder text ("NA") fails both parses and yields `None`.
fn parse_counter(field: Option<&str>) -> Option<u64> {
    let text = field?.trim();
    if let Ok(n) = text.parse::<u64>() {
        return Some(n);
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => Some(f as u64),
        _ => None,
    }
}

/// Parse percent text into a truncated integer percentage.
fn parse_percent(text: &str) -> Option<u8> {
    let cleaned = CONTROL_SEQUENCES.replace_all(text, "");
    let cleaned = cleaned.trim().trim_end_matches('%');
    // Truncate at the decimal point rather than rounding.
    let integral = cleaned.split('.').next()?.trim();
    let value = integral.parse::<u64>().ok()?;
    Some(value.min(100) as u8)
}

/// Parse the ETA field; anything that is not a plain number is `Unknown`.
fn parse_eta(field: Option<&str>) -> Eta {
    match field.map(str::trim) {
        Some(text) if !text.is_empty() => text
            .parse::<u64>()
            .map(Eta::Seconds)
            .unwrap_or(Eta::Unknown),
        _ => Eta::Unknown,
    }
}
