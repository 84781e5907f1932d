//! genweight CLI.
//!
//! Estimates a dataset's generator-weight asymmetry from a filelist
//! document and prints the weight. Abort and degenerate outcomes exit
//! non-zero with nothing on stdout, so callers never mistake an
//! indeterminate scan for a valid weight.

use anyhow::{bail, Context, Result};
use clap::Parser;
use genweight::{filelist, reader};
use genweight_engine::{ScanConfig, ScanEngine, ScanProgress, ScanResult};
use genweight_logging::{init_logging, LogConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(clap::Parser, Debug)]
#[command(name = "genweight", about = "Generator-weight asymmetry scanner")]
struct Args {
    /// JSON filelist document: { "filelist": ["<locator>", ...] }
    #[arg(long)]
    filelist: PathBuf,

    /// Column to read from every file
    #[arg(long, default_value = "genWeight")]
    column: String,

    /// Parallel workers (1 = strictly sequential, in input order)
    #[arg(long, default_value_t = 1, env = "GENWEIGHT_WORKERS")]
    workers: usize,

    /// Additional read attempts per file after the first
    #[arg(long, default_value_t = 5)]
    max_retries: u32,

    /// Per-attempt open timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Tolerated failed-file percentage before the scan aborts
    #[arg(long, default_value_t = 10)]
    fail_threshold_percent: u64,

    /// Base directory for resolving relative locators
    #[arg(long, env = "GENWEIGHT_DATA_ROOT")]
    data_root: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Verbose console logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(LogConfig {
        app_name: "genweight",
        verbose: args.verbose,
    })?;
    run(args)
}

fn run(args: Args) -> Result<()> {
    let locators = filelist::load(&args.filelist)?;
    info!(
        files = locators.len(),
        filelist = %args.filelist.display(),
        "Filelist loaded"
    );

    let config = ScanConfig {
        num_workers: args.workers,
        max_retries: args.max_retries,
        timeout: Duration::from_secs(args.timeout_secs),
        fail_threshold_percent: args.fail_threshold_percent,
        column: args.column,
    };
    let reader = reader::JsonColumnReader::new(args.data_root);
    let engine = ScanEngine::new(reader, config).context("Invalid scan configuration")?;

    let (progress_tx, progress_rx) = mpsc::channel::<ScanProgress>();
    let bar = ProgressBar::new(locators.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
            .context("Invalid progress template")?
            .progress_chars("=> "),
    );
    bar.set_message("Scanning");

    let bar_thread = std::thread::spawn({
        let bar = bar.clone();
        move || {
            for update in progress_rx.iter() {
                bar.set_position(update.files_done);
            }
        }
    });

    // The engine drops its sender when the scan ends, which terminates
    // the progress thread's receive loop.
    let verdict = engine.scan(&locators, Some(progress_tx));
    if bar_thread.join().is_err() {
        warn!("Progress thread panicked");
    }
    bar.finish_and_clear();

    match verdict? {
        ScanResult::Weight(weight) => {
            if args.json {
                println!("{}", serde_json::json!({ "weight": weight }));
            } else {
                println!("{weight}");
            }
            Ok(())
        }
        ScanResult::Aborted {
            failed,
            total,
            threshold,
        } => {
            bail!(
                "Scan aborted: {failed}/{total} files failed (threshold {threshold}); \
                 no weight computed"
            )
        }
    }
}
