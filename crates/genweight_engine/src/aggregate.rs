//! Running scan state and the failure-threshold abort policy.

use crate::types::FileOutcome;
use serde::Serialize;
use tracing::warn;

/// Aggregate counters for one scan, owned exclusively by the
/// [`ThresholdAggregator`] and discarded when the scan ends.
///
/// `positive`/`negative` are event-level totals and form the weight
/// denominator; `files_ok`/`files_failed` account for whole files and
/// drive the completion check and the abort threshold. Invariant:
/// `files_ok + files_failed <= total_files`, with equality once every
/// outcome has been observed on the non-aborted path.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScanState {
    pub total_files: u64,
    pub files_ok: u64,
    pub files_failed: u64,
    pub positive: u64,
    pub negative: u64,
    pub threshold: u64,
}

/// Phase machine for a single scan.
///
/// `Aborted` and `Completed` are terminal; no phase is ever re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Running,
    Aborted,
    Completed,
}

impl ScanPhase {
    pub fn is_terminal(self) -> bool {
        self != ScanPhase::Running
    }
}

/// Folds unordered file outcomes into a [`ScanState`] and enforces the
/// early-abort policy.
///
/// Aggregate counts are commutative, so final totals are independent of
/// delivery order; only which specific outcome triggers the abort is
/// order-dependent, an accepted nondeterminism under parallel dispatch.
#[derive(Debug)]
pub struct ThresholdAggregator {
    state: ScanState,
    phase: ScanPhase,
}

impl ThresholdAggregator {
    pub fn new(total_files: u64, threshold: u64) -> Self {
        let phase = if total_files == 0 {
            // Nothing to observe; the estimator will report the
            // degenerate zero-event case.
            ScanPhase::Completed
        } else {
            ScanPhase::Running
        };
        Self {
            state: ScanState {
                total_files,
                threshold,
                ..ScanState::default()
            },
            phase,
        }
    }

    /// Fold one outcome into the running state.
    ///
    /// Outcomes arriving after a terminal phase are discarded; in-flight
    /// tasks may still complete after an abort. The abort test is a strict
    /// greater-than: the outcome that pushes `files_failed` strictly above
    /// the threshold flips the phase, and the transition is permanent.
    pub fn observe(&mut self, outcome: FileOutcome) -> ScanPhase {
        if self.phase.is_terminal() {
            return self.phase;
        }

        match outcome {
            FileOutcome::Counts { positive, negative } => {
                self.state.files_ok += 1;
                self.state.positive += positive;
                self.state.negative += negative;
            }
            FileOutcome::Failed => {
                self.state.files_failed += 1;
                if self.state.files_failed > self.state.threshold {
                    warn!(
                        failed = self.state.files_failed,
                        total = self.state.total_files,
                        threshold = self.state.threshold,
                        "Failure threshold exceeded, aborting scan"
                    );
                    self.phase = ScanPhase::Aborted;
                    return self.phase;
                }
            }
        }

        if self.state.files_ok + self.state.files_failed == self.state.total_files {
            self.phase = ScanPhase::Completed;
        }
        self.phase
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn state(&self) -> ScanState {
        self.state
    }
}

/// Tolerated failed-file count for a scan, from the configured percentage.
///
/// Integer division, exactly as the original policy: at the default 10%, a
/// scan of fewer than 10 files gets threshold 0 and a single failure
/// aborts it. Not rounded up.
pub fn failure_threshold(total_files: u64, fail_threshold_percent: u64) -> u64 {
    total_files * fail_threshold_percent / 100
}
