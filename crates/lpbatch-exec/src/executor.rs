//! The seam between the runner and whatever actually solves a job.
//!
//! An executor loads a job's input (`open`) and then solves it (`execute`).
//! The two phases fail with different types so the runner can tell a missing
//! or unparsable input apart from a solver that started and gave up.

use lpbatch_core::config::SolverConfig;
use lpbatch_core::id::JobId;
use lpbatch_core::job::JobResult;
use lpbatch_io::ledger::{READ_ERROR, SOLVER_ERROR};
use thiserror::Error;

/// The job's input could not be loaded.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ReadFailure(pub String);

/// Processing started but produced no result.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ExecutionFailure(pub String);

#[derive(Debug, Error)]
pub enum JobFailure {
    #[error("failed to read job input: {0}")]
    Read(#[from] ReadFailure),
    #[error("solver failed: {0}")]
    Execution(#[from] ExecutionFailure),
}

impl JobFailure {
    /// Ledger outcome label for this failure.
    pub fn sentinel(&self) -> &'static str {
        match self {
            JobFailure::Read(_) => READ_ERROR,
            JobFailure::Execution(_) => SOLVER_ERROR,
        }
    }
}

pub trait JobExecutor {
    /// Whatever `open` loads and `execute` consumes (a parsed model, a path).
    type Input;

    fn open(&mut self, job: &JobId) -> Result<Self::Input, ReadFailure>;

    fn execute(
        &mut self,
        input: Self::Input,
        config: &SolverConfig,
    ) -> Result<JobResult, ExecutionFailure>;
}

impl<E: JobExecutor + ?Sized> JobExecutor for &mut E {
    type Input = E::Input;

    fn open(&mut self, job: &JobId) -> Result<Self::Input, ReadFailure> {
        (**self).open(job)
    }

    fn execute(
        &mut self,
        input: Self::Input,
        config: &SolverConfig,
    ) -> Result<JobResult, ExecutionFailure> {
        (**self).execute(input, config)
    }
}
