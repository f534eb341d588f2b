//! Ledger column layout and row construction.

use lpbatch_core::job::JobResult;

use crate::format::{integer, scientific};

/// Header row, in file order.
pub const LEDGER_HEADER: [&str; 13] = [
    "dataset",
    "instance",
    "termination_reason",
    "runtime_sec",
    "iterations_count",
    "primal_objective_value",
    "dual_objective_value",
    "relative_primal_residual",
    "relative_dual_residual",
    "absolute_objective_gap",
    "relative_objective_gap",
    "feasibility_polishing_time_sec",
    "feasibility_polishing_iteration_count",
];

/// Column whose values identify already-finished jobs.
pub const DEDUP_KEY: &str = "dataset";

/// Outcome sentinel when the job input could not be loaded.
pub const READ_ERROR: &str = "READ_ERROR";
/// Outcome sentinel when the solver ran but produced no result.
pub const SOLVER_ERROR: &str = "SOLVER_ERROR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Dataset = 0,
    Instance,
    TerminationReason,
    RuntimeSec,
    IterationsCount,
    PrimalObjectiveValue,
    DualObjectiveValue,
    RelativePrimalResidual,
    RelativeDualResidual,
    AbsoluteObjectiveGap,
    RelativeObjectiveGap,
    FeasibilityPolishingTimeSec,
    FeasibilityPolishingIterationCount,
}

impl Column {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        LEDGER_HEADER[self.index()]
    }
}

/// A full-width ledger row. Unset cells stay empty strings so every row has
/// exactly `LEDGER_HEADER.len()` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerRow {
    cells: [String; 13],
}

impl LedgerRow {
    pub fn new(dataset: impl Into<String>, instance: impl Into<String>) -> Self {
        let mut row = Self::default();
        row.set(Column::Dataset, dataset);
        row.set(Column::Instance, instance);
        row
    }

    pub fn set(&mut self, col: Column, value: impl Into<String>) {
        self.cells[col.index()] = value.into();
    }

    pub fn get(&self, col: Column) -> &str {
        &self.cells[col.index()]
    }

    pub fn fields(&self) -> &[String] {
        &self.cells
    }

    /// Mark the row with a failure sentinel; result columns stay empty.
    pub fn record_failure(&mut self, sentinel: &str) {
        self.set(Column::TerminationReason, sentinel);
    }

    pub fn record_result(&mut self, r: &JobResult) {
        self.set(Column::TerminationReason, r.termination_reason.as_str());
        self.set(Column::RuntimeSec, scientific(r.runtime_sec));
        self.set(Column::IterationsCount, integer(r.iterations_count));
        self.set(Column::PrimalObjectiveValue, scientific(r.primal_objective_value));
        self.set(Column::DualObjectiveValue, scientific(r.dual_objective_value));
        self.set(Column::RelativePrimalResidual, scientific(r.relative_primal_residual));
        self.set(Column::RelativeDualResidual, scientific(r.relative_dual_residual));
        self.set(Column::AbsoluteObjectiveGap, scientific(r.absolute_objective_gap));
        self.set(Column::RelativeObjectiveGap, scientific(r.relative_objective_gap));
        if let Some((time, iters)) = r.polishing() {
            self.set(Column::FeasibilityPolishingTimeSec, scientific(time));
            self.set(Column::FeasibilityPolishingIterationCount, integer(iters));
        }
    }
}
