//! Conversion of final sign counts into the asymmetry weight.

use crate::aggregate::ScanState;
use crate::error::{EngineError, Result};

/// `weight = 1 - 2 * negative / (positive + negative)`.
///
/// Assumes the unary-weight convention (roughly equal-magnitude positive
/// and negative contributions). With non-negative integer counts the
/// result is already confined to `[-1.0, 1.0]`, so no clamping is applied;
/// the engine does not second-guess the physics input.
///
/// A zero denominator means every file either failed or held zero readable
/// events. That is reported as an explicit error, never as a NaN that
/// could end up persisted.
pub fn estimate_weight(state: &ScanState) -> Result<f64> {
    let events = state.positive + state.negative;
    if events == 0 {
        return Err(EngineError::NoUsableEvents {
            files_total: state.total_files,
            files_failed: state.files_failed,
        });
    }
    let negative_fraction = state.negative as f64 / events as f64;
    Ok(1.0 - 2.0 * negative_fraction)
}
