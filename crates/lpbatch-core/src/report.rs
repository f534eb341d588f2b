//! Run counters and provenance for one invocation.
//!
//! The runner returns a `RunReport` after the manifest is exhausted. Nothing
//! here is persisted; the ledger stays the single source of truth.

use serde::{Deserialize, Serialize};

use crate::hash::Hash256;
use crate::id::RunId;

/// Per-run counters. Skips do not count against success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub solved: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn attempted(&self) -> usize {
        self.solved + self.failed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub id: RunId,

    /// Digest of the manifest bytes as read at startup.
    pub manifest_hash: Hash256,

    /// Digest of the solver config handed to every job.
    pub config_hash: Hash256,

    pub version: String,

    /// Resolved dataset root from the manifest.
    pub dataset_root: String,

    pub summary: RunSummary,

    /// Milliseconds since Unix epoch (UTC).
    pub started_ms: u64,
    pub finished_ms: u64,
}

impl RunReport {
    pub fn new(manifest_hash: Hash256, config_hash: Hash256, started_ms: u64) -> Self {
        Self {
            id: RunId::new(),
            manifest_hash,
            config_hash,
            version: crate::VERSION.to_string(),
            dataset_root: String::new(),
            summary: RunSummary::default(),
            started_ms,
            finished_ms: started_ms,
        }
    }

    pub fn finish(mut self, finished_ms: u64, dataset_root: String, summary: RunSummary) -> Self {
        self.finished_ms = finished_ms;
        self.dataset_root = dataset_root;
        self.summary = summary;
        self
    }

    pub fn duration_ms(&self) -> u64 {
        self.finished_ms.saturating_sub(self.started_ms)
    }
}
