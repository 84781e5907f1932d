//! Bounded worker pool dispatching file tasks.
//!
//! Workers claim tasks from a shared list through an atomic cursor, so no
//! task is dispatched twice and no new task is claimed once the abort flag
//! is raised. Outcomes stream to the aggregating thread over an unbounded
//! mpsc channel as they complete; with one worker, execution is strictly
//! sequential in input order.

use crate::error::{EngineError, Result};
use crate::reader::ColumnReader;
use crate::task::run_file_task;
use crate::types::{FileOutcome, FileTaskConfig};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::debug;

/// Cooperative abort signal shared between the aggregating thread and the
/// workers.
///
/// Uses an AtomicBool internally. Clone is cheap and shares state. Raising
/// the flag is one-directional: in-flight reads are not interrupted, but
/// no further task (or retry attempt) starts afterwards.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag {
    raised: Arc<AtomicBool>,
}

impl AbortFlag {
    pub fn new() -> Self {
        Self {
            raised: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Abandon the scan.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Check whether the scan has been abandoned.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

/// Fixed-size pool of worker threads over one scan's task list.
pub(crate) struct WorkPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkPool {
    /// Spawn `num_workers` threads over the shared task list.
    ///
    /// Each worker loops: check the abort flag, claim the next task index,
    /// run the task, send the outcome. A closed outcome channel (receiver
    /// dropped after an abort) also stops the worker. Workers share
    /// nothing mutable beyond the cursor and the channel.
    pub(crate) fn spawn<R>(
        reader: &Arc<R>,
        tasks: &Arc<Vec<FileTaskConfig>>,
        column: &Arc<str>,
        num_workers: usize,
        abort: &AbortFlag,
        outcome_tx: mpsc::Sender<FileOutcome>,
    ) -> Self
    where
        R: ColumnReader + 'static,
    {
        let cursor = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::with_capacity(num_workers);

        for worker_id in 0..num_workers {
            let reader = Arc::clone(reader);
            let tasks = Arc::clone(tasks);
            let column = Arc::clone(column);
            let cursor = Arc::clone(&cursor);
            let abort = abort.clone();
            let outcome_tx = outcome_tx.clone();

            handles.push(std::thread::spawn(move || {
                loop {
                    if abort.is_raised() {
                        debug!(worker_id, "Abort raised, worker exiting");
                        break;
                    }
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    let Some(task) = tasks.get(index) else {
                        break;
                    };
                    let outcome = run_file_task(reader.as_ref(), task, &column, &abort);
                    if outcome_tx.send(outcome).is_err() {
                        // Receiver gone - the scan already reached a verdict.
                        break;
                    }
                }
            }));
        }

        // Workers hold the remaining senders; dropping this clone lets the
        // receive loop end once they all exit.
        drop(outcome_tx);

        Self { handles }
    }

    /// Wait for every worker to exit.
    ///
    /// After an abort this blocks for at most one in-flight task per
    /// worker, bounded by `(max_retries + 1) * timeout`.
    pub(crate) fn join(self) -> Result<()> {
        for handle in self.handles {
            handle.join().map_err(|_| EngineError::WorkerPanicked)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_flag_is_shared_and_one_directional() {
        let flag = AbortFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_raised());
        flag.raise();
        assert!(clone.is_raised());
        // No way back.
        assert!(flag.is_raised());
    }
}
