//! Core data types for a generator-weight scan.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Opaque reference to a remotely or locally stored data file.
///
/// The engine never interprets the contents; the string is handed through
/// to the [`ColumnReader`](crate::reader::ColumnReader) unmodified.
/// Locator resolution (catalog lookup, remote-storage redirection) happens
/// entirely outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileLocator(String);

impl FileLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileLocator {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FileLocator {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Per-file work order. One immutable instance per file per scan.
#[derive(Debug, Clone)]
pub struct FileTaskConfig {
    pub locator: FileLocator,
    /// Additional attempts after the first one, so a task performs
    /// `max_retries + 1` reads in the worst case.
    pub max_retries: u32,
    /// Per-attempt open timeout, forwarded to the reader.
    pub timeout: Duration,
}

/// Tri-state result of processing one file.
///
/// Either event-level sign counts, or terminal failure after every retry
/// attempt was exhausted. No partial state escapes a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Counts { positive: u64, negative: u64 },
    Failed,
}

/// Progress update emitted once per observed outcome.
#[derive(Debug, Clone, Copy)]
pub struct ScanProgress {
    pub files_total: u64,
    /// Files whose outcome has been observed, failed ones included.
    pub files_done: u64,
    pub files_failed: u64,
}

/// Final verdict of one scan.
///
/// `Aborted` must be handled explicitly by callers; it is never coerced
/// into a default weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ScanResult {
    /// Asymmetry weight computed from the final sign counts.
    Weight(f64),
    /// The failed-file count exceeded the tolerated threshold.
    Aborted { failed: u64, total: u64, threshold: u64 },
}
