//! Bounded-retry read of a single file.
//!
//! A task performs up to `max_retries + 1` attempts and produces exactly
//! one [`FileOutcome`]. Attempt errors are logged and absorbed here; the
//! aggregator's threshold policy deals with terminal failures, so nothing
//! propagates to the caller as a hard error.

use crate::pool::AbortFlag;
use crate::reader::{ColumnReader, ReadError};
use crate::types::{FileOutcome, FileTaskConfig};
use tracing::{debug, warn};

/// Run one file task to its terminal outcome.
///
/// Retries happen synchronously on the calling worker, so a task can
/// occupy it for up to `(max_retries + 1) * timeout`. Between attempts the
/// abort flag is checked: once the scan is abandoned there is no point
/// burning further attempts, and the task settles for `Failed`.
pub(crate) fn run_file_task<R>(
    reader: &R,
    task: &FileTaskConfig,
    column: &str,
    abort: &AbortFlag,
) -> FileOutcome
where
    R: ColumnReader + ?Sized,
{
    let attempts = task.max_retries as u64 + 1;
    for attempt in 1..=attempts {
        match read_sign_counts(reader, task, column) {
            Ok((positive, negative)) => {
                debug!(locator = %task.locator, positive, negative, "File read");
                return FileOutcome::Counts { positive, negative };
            }
            Err(err) => {
                warn!(
                    locator = %task.locator,
                    attempt,
                    attempts,
                    error = %err,
                    "Read attempt failed"
                );
                if abort.is_raised() {
                    break;
                }
            }
        }
    }
    FileOutcome::Failed
}

/// One open/read attempt, summarized to sign counts.
///
/// The sign convention is fixed for reproducibility: values `>= 0.0` count
/// positive (exactly zero included), values `< 0.0` count negative. NaN
/// matches neither comparison and lands in neither bucket.
fn read_sign_counts<R>(
    reader: &R,
    task: &FileTaskConfig,
    column: &str,
) -> Result<(u64, u64), ReadError>
where
    R: ColumnReader + ?Sized,
{
    let mut handle = reader.open(&task.locator, task.timeout)?;
    let values = handle.read_column(column)?;
    let positive = values.iter().filter(|v| **v >= 0.0).count() as u64;
    let negative = values.iter().filter(|v| **v < 0.0).count() as u64;
    Ok((positive, negative))
}
