//! Convenient re-exports for downstream crates.

pub use crate::config::{RunOptions, SolverConfig, SolverConfigOverrides};
pub use crate::error::{Error, Result};
pub use crate::id::{JobId, RunId};
pub use crate::job::{JobResult, TerminationReason};
pub use crate::manifest::{JobEntry, ManifestReader};
pub use crate::report::{RunReport, RunSummary};
