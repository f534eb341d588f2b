//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use lpbatch_core::prelude::{JobId, JobResult, SolverConfig, TerminationReason};
use lpbatch_exec::{ExecutionFailure, JobExecutor, ReadFailure};
use lpbatch_io::ledger::LedgerReader;

#[derive(Debug, Clone)]
pub enum Script {
    Solve(JobResult),
    ReadFail,
    SolveFail,
}

/// In-process executor that answers from a script keyed by resolved path.
/// Unscripted jobs solve with `optimal(1)`.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    pub script: HashMap<String, Script>,
    pub attempted: Vec<String>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, outcome: Script) -> Self {
        self.script.insert(path.to_string(), outcome);
        self
    }
}

impl JobExecutor for ScriptedExecutor {
    type Input = String;

    fn open(&mut self, job: &JobId) -> Result<String, ReadFailure> {
        self.attempted.push(job.to_string());
        match self.script.get(job.as_str()) {
            Some(Script::ReadFail) => Err(ReadFailure(format!("cannot parse {job}"))),
            _ => Ok(job.to_string()),
        }
    }

    fn execute(
        &mut self,
        input: String,
        _config: &SolverConfig,
    ) -> Result<JobResult, ExecutionFailure> {
        match self.script.get(&input) {
            Some(Script::Solve(r)) => Ok(r.clone()),
            Some(Script::SolveFail) => Err(ExecutionFailure("no result".into())),
            _ => Ok(optimal(1)),
        }
    }
}

pub fn optimal(iterations: u64) -> JobResult {
    JobResult {
        termination_reason: TerminationReason::Optimal,
        runtime_sec: 0.125,
        iterations_count: iterations,
        primal_objective_value: -464.75,
        dual_objective_value: -464.75,
        relative_primal_residual: 1e-9,
        relative_dual_residual: 2e-9,
        absolute_objective_gap: 0.0,
        relative_objective_gap: 0.0,
        feasibility_polishing_time_sec: None,
        feasibility_polishing_iteration_count: None,
    }
}

pub struct Workspace {
    pub dir: tempfile::TempDir,
    pub manifest: PathBuf,
    pub ledger: PathBuf,
}

impl Workspace {
    pub fn new(manifest_text: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let manifest = dir.path().join("datasets.txt");
        fs::write(&manifest, manifest_text).expect("write manifest");
        let ledger = dir.path().join("results.csv");
        Self {
            dir,
            manifest,
            ledger,
        }
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        read_rows(&self.ledger)
    }

    pub fn text(&self) -> String {
        fs::read_to_string(&self.ledger).unwrap_or_default()
    }
}

/// All records in the ledger, header included.
pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let f = fs::File::open(path).expect("open ledger");
    LedgerReader::new(f)
        .collect::<Result<_, _>>()
        .expect("read ledger")
}
