//! Error types for the scan engine.
//!
//! Only two conditions escape the engine as errors: a degenerate scan with
//! zero usable events, and invalid configuration. Per-attempt read errors
//! and per-file terminal failures are absorbed internally (logged, then
//! folded into the aggregate counters); a threshold abort is a regular
//! [`ScanResult`](crate::types::ScanResult) variant, not an error.

use thiserror::Error;

/// Scan engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Every file either failed or contained zero readable events, so the
    /// weight denominator is zero. Surfaced explicitly instead of letting
    /// a NaN leak into a persisted weight.
    #[error(
        "no usable events across {files_total} files ({files_failed} failed): weight is indeterminate"
    )]
    NoUsableEvents { files_total: u64, files_failed: u64 },

    #[error("invalid scan configuration: {0}")]
    InvalidConfig(String),

    /// A worker thread panicked instead of delivering its outcome.
    #[error("worker thread panicked")]
    WorkerPanicked,

    /// The outcome channel closed before every outcome was observed.
    #[error("scan ended before every file outcome was observed")]
    Incomplete,
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, EngineError>;
