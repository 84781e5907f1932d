//! End-to-end engine tests against deterministic in-memory readers.

use genweight_engine::{
    ColumnHandle, ColumnReader, EngineError, FileLocator, ReadError, ScanConfig, ScanEngine,
    ScanResult,
};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

/// Per-file behavior for the scripted reader.
#[derive(Clone)]
enum FileScript {
    /// Serve these values on every open.
    Values(Vec<f64>),
    /// Fail this many opens before serving the values.
    FlakyValues(u64, Vec<f64>),
    /// Fail every open.
    AlwaysFail,
}

/// Deterministic collaborator: each locator maps to a fixed script.
/// Optional jitter delays opens by a pseudo-random few milliseconds to
/// shuffle completion order under parallel dispatch.
struct ScriptedReader {
    scripts: HashMap<String, FileScript>,
    jitter: bool,
    opens: Arc<AtomicU64>,
    fail_counts: std::sync::Mutex<HashMap<String, u64>>,
}

impl ScriptedReader {
    fn new(scripts: Vec<(&str, FileScript)>) -> Self {
        Self {
            scripts: scripts
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            jitter: false,
            opens: Arc::new(AtomicU64::new(0)),
            fail_counts: std::sync::Mutex::new(HashMap::new()),
        }
    }

    fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    /// Handle onto the open counter, usable after the engine owns the reader.
    fn opens_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.opens)
    }
}

struct ScriptedHandle {
    values: Vec<f64>,
}

impl ColumnHandle for ScriptedHandle {
    fn read_column(&mut self, name: &str) -> Result<Vec<f64>, ReadError> {
        if name != "genWeight" {
            return Err(ReadError::new(format!("no such column: {name}")));
        }
        Ok(self.values.clone())
    }
}

impl ColumnReader for ScriptedReader {
    fn open(
        &self,
        locator: &FileLocator,
        _timeout: Duration,
    ) -> Result<Box<dyn ColumnHandle>, ReadError> {
        self.opens.fetch_add(1, Ordering::SeqCst);

        if self.jitter {
            // Time/pid-seeded jitter, no rand dependency needed.
            let mut hasher = DefaultHasher::new();
            locator.as_str().hash(&mut hasher);
            let seed = hasher.finish()
                ^ std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap()
                    .subsec_nanos() as u64
                ^ std::process::id() as u64;
            std::thread::sleep(Duration::from_millis(seed % 15));
        }

        match self.scripts.get(locator.as_str()) {
            Some(FileScript::Values(values)) => Ok(Box::new(ScriptedHandle {
                values: values.clone(),
            })),
            Some(FileScript::FlakyValues(fail_first, values)) => {
                let mut counts = self.fail_counts.lock().unwrap();
                let seen = counts.entry(locator.as_str().to_string()).or_insert(0);
                if *seen < *fail_first {
                    *seen += 1;
                    Err(ReadError::new("transient read failure"))
                } else {
                    Ok(Box::new(ScriptedHandle {
                        values: values.clone(),
                    }))
                }
            }
            Some(FileScript::AlwaysFail) => Err(ReadError::new("permanent read failure")),
            None => Err(ReadError::new(format!("unknown locator: {locator}"))),
        }
    }
}

fn locators(n: usize) -> Vec<FileLocator> {
    (0..n)
        .map(|i| FileLocator::from(format!("/data/file_{i}.root:Events")))
        .collect()
}

fn uniform_scripts(n: usize, values: Vec<f64>) -> Vec<(String, FileScript)> {
    (0..n)
        .map(|i| {
            (
                format!("/data/file_{i}.root:Events"),
                FileScript::Values(values.clone()),
            )
        })
        .collect()
}

fn engine_with(
    scripts: Vec<(String, FileScript)>,
    config: ScanConfig,
) -> ScanEngine<ScriptedReader> {
    let reader = ScriptedReader::new(
        scripts
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect(),
    );
    ScanEngine::new(reader, config).unwrap()
}

#[test]
fn all_positive_files_give_unit_weight() {
    // Scenario A: 10 files x {positive: 100, negative: 0}.
    let engine = engine_with(uniform_scripts(10, vec![1.0; 100]), ScanConfig::default());
    let result = engine.scan(&locators(10), None).unwrap();
    assert_eq!(result, ScanResult::Weight(1.0));
}

#[test]
fn balanced_files_give_zero_weight() {
    // Scenario B: 10 files x {positive: 50, negative: 50}.
    let mut values = vec![1.0; 50];
    values.extend(vec![-1.0; 50]);
    let engine = engine_with(uniform_scripts(10, values), ScanConfig::default());
    let result = engine.scan(&locators(10), None).unwrap();
    assert_eq!(result, ScanResult::Weight(0.0));
}

#[test]
fn two_terminal_failures_abort_a_ten_file_scan() {
    // Scenario C: 10 files, 2 fail after retries, threshold 1.
    let mut scripts = uniform_scripts(10, vec![1.0; 100]);
    scripts[3].1 = FileScript::AlwaysFail;
    scripts[7].1 = FileScript::AlwaysFail;

    let config = ScanConfig {
        max_retries: 1,
        ..ScanConfig::default()
    };
    let engine = engine_with(scripts, config);
    let result = engine.scan(&locators(10), None).unwrap();
    assert_eq!(
        result,
        ScanResult::Aborted {
            failed: 2,
            total: 10,
            threshold: 1,
        }
    );
}

#[test]
fn zero_usable_events_is_an_explicit_error() {
    // Scenario D: every file readable but empty.
    let engine = engine_with(uniform_scripts(10, Vec::new()), ScanConfig::default());
    let err = engine.scan(&locators(10), None).unwrap_err();
    assert!(matches!(
        err,
        EngineError::NoUsableEvents {
            files_total: 10,
            files_failed: 0,
        }
    ));
}

#[test]
fn empty_filelist_is_degenerate() {
    let engine = engine_with(Vec::new(), ScanConfig::default());
    let err = engine.scan(&[], None).unwrap_err();
    assert!(matches!(err, EngineError::NoUsableEvents { .. }));
}

#[test]
fn nine_files_single_failure_aborts() {
    // Boundary: threshold = 9 * 10 / 100 = 0.
    let mut scripts = uniform_scripts(9, vec![1.0; 10]);
    scripts[8].1 = FileScript::AlwaysFail;

    let config = ScanConfig {
        max_retries: 0,
        ..ScanConfig::default()
    };
    let engine = engine_with(scripts, config);
    let result = engine.scan(&locators(9), None).unwrap();
    assert_eq!(
        result,
        ScanResult::Aborted {
            failed: 1,
            total: 9,
            threshold: 0,
        }
    );
}

#[test]
fn transient_failures_within_budget_do_not_fail_files() {
    let scripts: Vec<(String, FileScript)> = (0..10)
        .map(|i| {
            (
                format!("/data/file_{i}.root:Events"),
                // Each file needs a couple of retries before serving data.
                FileScript::FlakyValues(2, vec![1.0, 1.0, -1.0]),
            )
        })
        .collect();
    let reader = ScriptedReader::new(
        scripts
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect(),
    );
    let opens = reader.opens_handle();
    let engine = ScanEngine::new(reader, ScanConfig::default()).unwrap();
    let result = engine.scan(&locators(10), None).unwrap();

    // 20 positive, 10 negative in total: weight = 1 - 2/3.
    match result {
        ScanResult::Weight(weight) => assert!((weight - (1.0 - 2.0 / 3.0)).abs() < 1e-12),
        other => panic!("expected weight, got {other:?}"),
    }
    // 2 failed opens + 1 good open per file.
    assert_eq!(opens.load(Ordering::SeqCst), 30);
}

#[test]
fn sequential_runs_are_idempotent() {
    let mut values = vec![0.5; 30];
    values.extend(vec![-0.5; 10]);

    let run = || {
        let engine = engine_with(uniform_scripts(12, values.clone()), ScanConfig::default());
        match engine.scan(&locators(12), None).unwrap() {
            ScanResult::Weight(weight) => weight,
            other => panic!("expected weight, got {other:?}"),
        }
    };

    assert_eq!(run().to_bits(), run().to_bits());
}

#[test]
fn parallel_counts_match_sequential_bit_for_bit() {
    // Mixed per-file data so delivery order varies the partial sums.
    let scripts: Vec<(String, FileScript)> = (0..20)
        .map(|i| {
            let mut values = vec![1.0; 10 + i];
            values.extend(vec![-1.0; i]);
            (
                format!("/data/file_{i}.root:Events"),
                FileScript::Values(values),
            )
        })
        .collect();
    let files: Vec<FileLocator> = (0..20)
        .map(|i| FileLocator::from(format!("/data/file_{i}.root:Events")))
        .collect();

    let sequential = {
        let engine = engine_with(scripts.clone(), ScanConfig::default());
        engine.scan(&files, None).unwrap()
    };

    for _ in 0..4 {
        let reader = ScriptedReader::new(
            scripts
                .iter()
                .map(|(k, v)| (k.as_str(), v.clone()))
                .collect(),
        )
        .with_jitter();
        let config = ScanConfig {
            num_workers: 4,
            ..ScanConfig::default()
        };
        let engine = ScanEngine::new(reader, config).unwrap();
        let parallel = engine.scan(&files, None).unwrap();

        match (&sequential, &parallel) {
            (ScanResult::Weight(a), ScanResult::Weight(b)) => {
                assert_eq!(a.to_bits(), b.to_bits());
            }
            other => panic!("expected two weights, got {other:?}"),
        }
    }
}

#[test]
fn progress_reports_every_outcome() {
    let engine = engine_with(uniform_scripts(8, vec![1.0, -1.0]), ScanConfig::default());
    let (tx, rx) = mpsc::channel();
    engine.scan(&locators(8), Some(tx)).unwrap();

    let updates: Vec<_> = rx.iter().collect();
    assert_eq!(updates.len(), 8);
    assert!(updates.iter().all(|p| p.files_total == 8));
    // Sequential mode: files_done climbs monotonically to the total.
    let done: Vec<u64> = updates.iter().map(|p| p.files_done).collect();
    assert_eq!(done, (1..=8).collect::<Vec<u64>>());
    assert_eq!(updates.last().unwrap().files_failed, 0);
}

#[test]
fn aborted_scan_stops_claiming_new_files() {
    // Single worker, first file fails instantly, threshold 0. The worker
    // may race a few files past the abort, but the verdict and the failed
    // accounting must be exact.
    let mut scripts = uniform_scripts(9, vec![1.0; 5]);
    scripts[0].1 = FileScript::AlwaysFail;

    let config = ScanConfig {
        max_retries: 0,
        ..ScanConfig::default()
    };
    let engine = engine_with(scripts, config);
    let result = engine.scan(&locators(9), None).unwrap();
    assert_eq!(
        result,
        ScanResult::Aborted {
            failed: 1,
            total: 9,
            threshold: 0,
        }
    );
}
