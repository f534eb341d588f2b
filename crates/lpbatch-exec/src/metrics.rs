//! Per-job metric events.
//!
//! Events go through `tracing` under the `lpbatch::metrics` target so a
//! subscriber can route them separately from the human-readable diagnostics.

use std::time::Duration;

use lpbatch_core::id::JobId;
use lpbatch_core::report::RunSummary;

pub fn emit_job(job: &JobId, line: usize, outcome: &str, elapsed: Duration) {
    tracing::debug!(
        target: "lpbatch::metrics",
        job = %job,
        line,
        outcome,
        elapsed_ms = elapsed.as_millis() as u64,
        "job recorded"
    );
}

pub fn emit_summary(summary: &RunSummary, elapsed_ms: u64) {
    tracing::debug!(
        target: "lpbatch::metrics",
        solved = summary.solved,
        failed = summary.failed,
        skipped = summary.skipped,
        elapsed_ms,
        "run finished"
    );
}
