#![forbid(unsafe_code)]
//! lpbatch-core: job ids, solver config, path resolution, manifest reading,
//! and run provenance.
//!
//! Core never opens files on its own. Callers hand it readers and strings;
//! `lpbatch-io` owns the ledger and `lpbatch-exec` owns the run loop.

pub mod config;
pub mod error;
pub mod hash;
pub mod id;
pub mod job;
pub mod manifest;
pub mod paths;
pub mod prelude;
pub mod report;

/// Crate version, stamped into every `RunReport`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
