//! Per-job result types returned by executors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why the solver stopped. Unrecognized labels deserialize as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminationReason {
    Optimal,
    PrimalInfeasible,
    DualInfeasible,
    TimeLimit,
    IterationLimit,
    FeasPolishSuccess,
    Unspecified,
    #[serde(other)]
    Unknown,
}

impl TerminationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TerminationReason::Optimal => "OPTIMAL",
            TerminationReason::PrimalInfeasible => "PRIMAL_INFEASIBLE",
            TerminationReason::DualInfeasible => "DUAL_INFEASIBLE",
            TerminationReason::TimeLimit => "TIME_LIMIT",
            TerminationReason::IterationLimit => "ITERATION_LIMIT",
            TerminationReason::FeasPolishSuccess => "FEAS_POLISH_SUCCESS",
            TerminationReason::Unspecified => "UNSPECIFIED",
            TerminationReason::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured outcome of one successful job. Field names match the ledger
/// columns so executors can emit this as JSON directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub termination_reason: TerminationReason,
    /// Cumulative wall time, seconds.
    pub runtime_sec: f64,
    pub iterations_count: u64,
    pub primal_objective_value: f64,
    pub dual_objective_value: f64,
    pub relative_primal_residual: f64,
    pub relative_dual_residual: f64,
    pub absolute_objective_gap: f64,
    pub relative_objective_gap: f64,

    /// Only meaningful when a polishing phase actually ran.
    #[serde(default)]
    pub feasibility_polishing_time_sec: Option<f64>,
    #[serde(default)]
    pub feasibility_polishing_iteration_count: Option<u64>,
}

impl JobResult {
    /// Polishing counts as having run only when its time is strictly positive.
    pub fn polishing(&self) -> Option<(f64, u64)> {
        match self.feasibility_polishing_time_sec {
            Some(t) if t > 0.0 => {
                Some((t, self.feasibility_polishing_iteration_count.unwrap_or(0)))
            }
            _ => None,
        }
    }
}
