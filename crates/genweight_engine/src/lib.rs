//! Generator-weight scan engine.
//!
//! Estimates a per-dataset asymmetry weight by reading one numeric column
//! from every file in a list, counting positive and negative entries, and
//! converting the final counts into a scalar weight. Individual file
//! failures are retried and then absorbed as counts; the scan is abandoned
//! only once the failed-file ratio crosses a configured threshold.
//!
//! # Design
//!
//! - [`ColumnReader`] is the only I/O seam: the engine never interprets
//!   locators or file formats itself
//! - Each file is processed by a bounded retry loop producing exactly one
//!   [`FileOutcome`], with no external mutable state
//! - A fixed-size worker pool (`num_workers = 1` runs strictly sequential,
//!   in input order) streams outcomes to the aggregating thread
//! - The threshold abort is a one-directional transition; outcomes arriving
//!   after it are discarded

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod pool;
pub mod reader;
mod task;
pub mod types;

pub use aggregate::{failure_threshold, ScanPhase, ScanState, ThresholdAggregator};
pub use engine::{ScanConfig, ScanEngine};
pub use error::{EngineError, Result};
pub use pool::AbortFlag;
pub use reader::{ColumnHandle, ColumnReader, ReadError};
pub use types::{FileLocator, FileOutcome, FileTaskConfig, ScanProgress, ScanResult};
