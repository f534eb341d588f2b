#![forbid(unsafe_code)]
//! lpbatch: resumable, append-only batch solves.
//!
//! Facade over the workspace crates:
//! - `core`: ids, config, paths, manifest reader, run report.
//! - `io`: CSV ledger codec, completion set, durable writer.
//! - `exec`: job executor seam and the batch runner.

pub use lpbatch_core as core;
pub use lpbatch_exec as exec;
pub use lpbatch_io as io;

pub use lpbatch_exec::{run, BatchRunner, ExitStatus, JobExecutor};
