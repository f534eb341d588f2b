//! Executor backed by an external solver program.
//!
//! Protocol, per job:
//! - argv: the configured program and fixed args, then the job path;
//! - stdin: the `SolverConfig` as one JSON object;
//! - stdout: a `JobResult` JSON object on the last non-empty line (earlier
//!   lines are treated as solver chatter and ignored);
//! - exit status 0 on success.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use lpbatch_core::config::SolverConfig;
use lpbatch_core::id::JobId;
use lpbatch_core::job::JobResult;
use tracing::debug;

use crate::executor::{ExecutionFailure, JobExecutor, ReadFailure};

#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandExecutor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl JobExecutor for CommandExecutor {
    type Input = PathBuf;

    /// The job must name a readable regular file.
    fn open(&mut self, job: &JobId) -> Result<PathBuf, ReadFailure> {
        let path = PathBuf::from(job.as_str());
        let meta = fs::metadata(&path).map_err(|e| ReadFailure(format!("{job}: {e}")))?;
        if !meta.is_file() {
            return Err(ReadFailure(format!("{job}: not a regular file")));
        }
        File::open(&path).map_err(|e| ReadFailure(format!("{job}: {e}")))?;
        Ok(path)
    }

    fn execute(
        &mut self,
        input: PathBuf,
        config: &SolverConfig,
    ) -> Result<JobResult, ExecutionFailure> {
        let config_json = serde_json::to_vec(config)
            .map_err(|e| ExecutionFailure(format!("encode solver config: {e}")))?;

        debug!(program = %self.program.display(), job = %input.display(), "spawning solver");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(&input)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                ExecutionFailure(format!("spawn {}: {e}", self.program.display()))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A solver that ignores its config may close stdin early.
            match stdin.write_all(&config_json) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                Err(e) => return Err(ExecutionFailure(format!("write solver stdin: {e}"))),
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ExecutionFailure(format!("wait for solver: {e}")))?;
        if !output.status.success() {
            return Err(ExecutionFailure(format!("solver exited with {}", output.status)));
        }
        parse_result(&output.stdout)
    }
}

fn parse_result(stdout: &[u8]) -> Result<JobResult, ExecutionFailure> {
    let text = String::from_utf8_lossy(stdout);
    let last = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .ok_or_else(|| ExecutionFailure("solver produced no output".to_string()))?;
    serde_json::from_str(last).map_err(|e| ExecutionFailure(format!("parse solver result: {e}")))
}
