//! Scan orchestration: pool dispatch, aggregation, final estimate.

use crate::aggregate::{failure_threshold, ScanPhase, ThresholdAggregator};
use crate::error::{EngineError, Result};
use crate::estimate::estimate_weight;
use crate::pool::{AbortFlag, WorkPool};
use crate::reader::ColumnReader;
use crate::types::{FileLocator, FileTaskConfig, ScanProgress, ScanResult};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Engine configuration for one or more scans.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Parallel workers; 1 runs strictly sequential in input order.
    pub num_workers: usize,
    /// Additional read attempts per file after the first.
    pub max_retries: u32,
    /// Per-attempt open timeout.
    pub timeout: Duration,
    /// Tolerated failed-file percentage before the scan is abandoned.
    pub fail_threshold_percent: u64,
    /// Column read from every file.
    pub column: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            num_workers: 1,
            max_retries: 5,
            timeout: Duration::from_secs(30),
            fail_threshold_percent: 10,
            column: "genWeight".to_string(),
        }
    }
}

impl ScanConfig {
    /// Reject unusable configurations before any I/O happens.
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(EngineError::InvalidConfig(
                "num_workers must be at least 1".to_string(),
            ));
        }
        if self.fail_threshold_percent == 0 || self.fail_threshold_percent > 100 {
            return Err(EngineError::InvalidConfig(format!(
                "fail_threshold_percent must be in 1..=100, got {}",
                self.fail_threshold_percent
            )));
        }
        if self.column.is_empty() {
            return Err(EngineError::InvalidConfig(
                "column name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scan engine over an opaque [`ColumnReader`] collaborator.
///
/// The engine performs no persistence; callers decide what to do with the
/// returned verdict, and must treat [`ScanResult::Aborted`] and the
/// degenerate-input error as "no update performed".
pub struct ScanEngine<R> {
    reader: Arc<R>,
    config: ScanConfig,
}

impl<R> ScanEngine<R>
where
    R: ColumnReader + 'static,
{
    pub fn new(reader: R, config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader: Arc::new(reader),
            config,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan every locator and produce a verdict.
    ///
    /// Outcomes are folded on the calling thread one at a time, so count
    /// updates never interleave; workers only touch their own task and the
    /// outcome channel. When the aggregator flips to `Aborted`, the abort
    /// flag stops further dispatch, the channel is dropped, and in-flight
    /// tasks drain cooperatively; their late outcomes are discarded.
    ///
    /// An optional `progress` sender receives one [`ScanProgress`] per
    /// observed outcome.
    pub fn scan(
        &self,
        locators: &[FileLocator],
        progress: Option<mpsc::Sender<ScanProgress>>,
    ) -> Result<ScanResult> {
        let start = Instant::now();
        let total = locators.len() as u64;
        let threshold = failure_threshold(total, self.config.fail_threshold_percent);

        info!(
            total_files = total,
            threshold,
            workers = self.config.num_workers,
            column = %self.config.column,
            "Starting scan"
        );

        let tasks: Arc<Vec<FileTaskConfig>> = Arc::new(
            locators
                .iter()
                .map(|locator| FileTaskConfig {
                    locator: locator.clone(),
                    max_retries: self.config.max_retries,
                    timeout: self.config.timeout,
                })
                .collect(),
        );
        let column: Arc<str> = Arc::from(self.config.column.as_str());

        let abort = AbortFlag::new();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let pool = WorkPool::spawn(
            &self.reader,
            &tasks,
            &column,
            self.config.num_workers,
            &abort,
            outcome_tx,
        );

        let mut aggregator = ThresholdAggregator::new(total, threshold);
        while let Ok(outcome) = outcome_rx.recv() {
            let phase = aggregator.observe(outcome);

            if let Some(tx) = &progress {
                let state = aggregator.state();
                let _ = tx.send(ScanProgress {
                    files_total: state.total_files,
                    files_done: state.files_ok + state.files_failed,
                    files_failed: state.files_failed,
                });
            }

            if phase.is_terminal() {
                break;
            }
        }

        let phase = aggregator.phase();
        if phase == ScanPhase::Aborted {
            abort.raise();
        }
        // Dropping the receiver unblocks any worker mid-send; together with
        // the abort flag this lets in-flight tasks drain without new work.
        drop(outcome_rx);
        pool.join()?;

        let state = aggregator.state();
        match phase {
            ScanPhase::Aborted => {
                info!(
                    failed = state.files_failed,
                    total = state.total_files,
                    threshold = state.threshold,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Scan aborted"
                );
                Ok(ScanResult::Aborted {
                    failed: state.files_failed,
                    total: state.total_files,
                    threshold: state.threshold,
                })
            }
            ScanPhase::Completed => {
                let weight = estimate_weight(&state)?;
                info!(
                    positive = state.positive,
                    negative = state.negative,
                    failed = state.files_failed,
                    weight,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Scan complete"
                );
                Ok(ScanResult::Weight(weight))
            }
            ScanPhase::Running => Err(EngineError::Incomplete),
        }
    }
}
