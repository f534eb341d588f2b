#![forbid(unsafe_code)]
//! lpbatch-exec: the batch runner, the job executor seam, and run metrics.
//!
//! The runner walks the manifest strictly in order, one job at a time, and
//! appends one durable ledger row per attempted job.

pub mod command;
pub mod executor;
pub mod failpoints;
pub mod metrics;
pub mod runner;

pub use command::CommandExecutor;
pub use executor::{ExecutionFailure, JobExecutor, JobFailure, ReadFailure};
pub use runner::{run, BatchRunner, ExecError, ExitStatus};
