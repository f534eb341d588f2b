//! Runner: walk the manifest in order and record one ledger row per job.
//!
//! Behavior:
//! - Rebuilds the completion set from the ledger on disk; jobs already in it
//!   are skipped without writing anything.
//! - A job is added to the set *before* it is attempted, so a manifest that
//!   lists the same resolved path twice only runs it once.
//! - Read and solver failures (including executor panics) become sentinel
//!   rows; they never abort the batch.
//! - Each row is flushed (and by default fsync'd) before the next job starts.
//! - Only setup problems (manifest unreadable or rootless, ledger unopenable
//!   or unwritable) end the run with an error.

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, error, info, info_span, warn};

use lpbatch_core::config::{RunOptions, SolverConfig};
use lpbatch_core::hash::{hash_bytes, hash_serde};
use lpbatch_core::job::JobResult;
use lpbatch_core::manifest::{JobEntry, ManifestReader};
use lpbatch_core::paths;
use lpbatch_core::report::{RunReport, RunSummary};
use lpbatch_io::ledger::{load_completion_set, CompletionSet, LedgerOpen, LedgerRow, LedgerWriter};

use crate::executor::{ExecutionFailure, JobExecutor, JobFailure, ReadFailure};
use crate::fail_point;
use crate::metrics;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to open datasets file {path}: {source}")]
    ManifestOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Manifest {
        path: String,
        #[source]
        source: lpbatch_core::error::Error,
    },
    #[error("Ledger error: {0}")]
    Ledger(#[from] lpbatch_io::error::Error),
    #[error("Failed to fingerprint solver config: {0}")]
    ConfigHash(#[source] lpbatch_core::error::Error),
}

/// Process exit status for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every attempted job produced a result (skips don't count).
    Success,
    /// Manifest unusable, ledger unopenable, or bad configuration.
    SetupFailure,
    /// At least one job was recorded with a failure sentinel.
    JobsFailed,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::SetupFailure => 1,
            ExitStatus::JobsFailed => 2,
        }
    }

    pub fn from_summary(summary: &RunSummary) -> Self {
        if summary.failed == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::JobsFailed
        }
    }
}

/// Run a batch end to end and map the outcome to an exit status. Setup
/// errors are logged here.
pub fn run<E: JobExecutor>(
    manifest_path: &Path,
    ledger_path: &Path,
    executor: E,
    config: SolverConfig,
) -> ExitStatus {
    let mut runner = BatchRunner::new(executor, config);
    match runner.run(manifest_path, ledger_path) {
        Ok(report) => ExitStatus::from_summary(&report.summary),
        Err(e) => {
            error!("{e}");
            ExitStatus::SetupFailure
        }
    }
}

pub struct BatchRunner<E> {
    executor: E,
    config: SolverConfig,
    options: RunOptions,
}

impl<E: JobExecutor> BatchRunner<E> {
    pub fn new(executor: E, config: SolverConfig) -> Self {
        Self {
            executor,
            config,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Execute every not-yet-recorded job in `manifest_path`, appending to
    /// `ledger_path`, and return the run's report.
    pub fn run(&mut self, manifest_path: &Path, ledger_path: &Path) -> Result<RunReport, ExecError> {
        let manifest_display = manifest_path.display().to_string();
        let manifest_bytes = fs::read(manifest_path).map_err(|source| ExecError::ManifestOpen {
            path: manifest_display.clone(),
            source,
        })?;

        let report = RunReport::new(
            hash_bytes(&manifest_bytes),
            hash_serde(&self.config).map_err(ExecError::ConfigHash)?,
            now_millis(),
        );
        let span = info_span!("batch_run", run = %report.id);
        let _guard = span.enter();

        let mut completed = load_completion_set(ledger_path);
        let (mut ledger, mode) = LedgerWriter::open(ledger_path, self.options.sync_rows)?;
        match mode {
            LedgerOpen::Fresh => info!(ledger = %ledger_path.display(), "starting new ledger"),
            LedgerOpen::Appended { .. } => info!(
                ledger = %ledger_path.display(),
                recorded = completed.len(),
                "resuming ledger"
            ),
        }

        let manifest_dir = paths::directory_of(&manifest_path.to_string_lossy());
        let mut reader = ManifestReader::new(manifest_bytes.as_slice(), manifest_dir);
        let mut summary = RunSummary::default();

        for entry in reader.by_ref() {
            let entry = entry.map_err(|source| ExecError::Manifest {
                path: manifest_display.clone(),
                source,
            })?;
            self.run_job(&entry, &mut completed, &mut ledger, &mut summary)?;
        }

        let root = reader.root().unwrap_or_default().to_string();
        let report = report.finish(now_millis(), root, summary);

        info!(
            "Batch complete: {} solved, {} failed, {} skipped.",
            summary.solved, summary.failed, summary.skipped
        );
        metrics::emit_summary(&summary, report.duration_ms());
        Ok(report)
    }

    fn run_job(
        &mut self,
        entry: &JobEntry,
        completed: &mut CompletionSet,
        ledger: &mut LedgerWriter,
        summary: &mut RunSummary,
    ) -> Result<(), ExecError> {
        let id = &entry.id;
        if completed.contains(id) {
            summary.skipped += 1;
            debug!(job = %id, line = entry.line_number, "already recorded; skipping");
            return Ok(());
        }
        completed.insert(id);

        let mut row = LedgerRow::new(id.as_str(), paths::instance_name(id.as_str()));
        let started = Instant::now();
        let outcome = self.attempt(entry);

        match &outcome {
            Ok(result) => row.record_result(result),
            Err(failure) => row.record_failure(failure.sentinel()),
        }

        fail_point!("before_row_write");
        ledger.append(&row)?;
        fail_point!("after_row_flush");

        match outcome {
            Ok(result) => {
                summary.solved += 1;
                info!(
                    job = %id,
                    line = entry.line_number,
                    reason = %result.termination_reason,
                    "solved"
                );
            }
            Err(_) => summary.failed += 1,
        }
        metrics::emit_job(
            id,
            entry.line_number,
            row.get(lpbatch_io::ledger::Column::TerminationReason),
            started.elapsed(),
        );
        Ok(())
    }

    /// Open then execute one job, converting panics into failures of the
    /// phase that panicked.
    fn attempt(&mut self, entry: &JobEntry) -> Result<JobResult, JobFailure> {
        let executor = &mut self.executor;
        let config = &self.config;

        let input = panic::catch_unwind(AssertUnwindSafe(|| executor.open(&entry.id)))
            .unwrap_or_else(|payload| {
                Err(ReadFailure(format!("executor panicked: {}", panic_message(&payload))))
            })
            .map_err(|e| {
                error!(
                    job = %entry.id,
                    line = entry.line_number,
                    error = %e,
                    "Failed to read input at line {}: {}",
                    entry.line_number,
                    entry.id
                );
                JobFailure::from(e)
            })?;

        panic::catch_unwind(AssertUnwindSafe(|| executor.execute(input, config)))
            .unwrap_or_else(|payload| {
                Err(ExecutionFailure(format!(
                    "executor panicked: {}",
                    panic_message(&payload)
                )))
            })
            .map_err(|e| {
                error!(
                    job = %entry.id,
                    line = entry.line_number,
                    error = %e,
                    "Solver failed for dataset at line {}: {}",
                    entry.line_number,
                    entry.id
                );
                JobFailure::from(e)
            })
    }
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        warn!("executor panicked with a non-string payload");
        "unknown panic".to_string()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
