//! lpbatch CLI: resumable batch solves driven by a datasets file.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lpbatch_core::config::{RunOptions, SolverConfig, SolverConfigOverrides};
use lpbatch_exec::{BatchRunner, CommandExecutor, ExitStatus};

#[derive(Parser, Debug)]
#[command(name = "lpbatch", version)]
#[command(
    about = "Solve every dataset listed in a datasets file, appending one CSV row per dataset",
    after_help = "Datasets file format:\n  First non-empty line: dataset root directory\n  Subsequent lines: dataset paths relative to the root (or absolute paths)\n  '#' starts a comment"
)]
struct Cli {
    /// Datasets file (first non-comment line is the dataset root)
    datasets_txt: PathBuf,

    /// Output CSV; appended to if it already has content
    output_csv: PathBuf,

    /// Solver program invoked once per dataset
    #[arg(long, env = "LPBATCH_SOLVER")]
    solver: PathBuf,

    /// Extra argument passed to the solver before the dataset path (repeatable)
    #[arg(long = "solver-arg", allow_hyphen_values = true)]
    solver_args: Vec<String>,

    /// YAML file of solver option overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Flush but do not fsync the CSV after each row
    #[arg(long)]
    no_sync: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Time limit in seconds
    #[arg(long = "time_limit")]
    time_limit: Option<f64>,

    /// Iteration limit
    #[arg(long = "iter_limit")]
    iter_limit: Option<i32>,

    /// Relative optimality tolerance
    #[arg(long = "eps_opt")]
    eps_opt: Option<f64>,

    /// Relative feasibility tolerance
    #[arg(long = "eps_feas")]
    eps_feas: Option<f64>,

    /// Infeasibility detection tolerance
    #[arg(long = "eps_infeas_detect")]
    eps_infeas_detect: Option<f64>,

    /// Relative feasibility polish tolerance
    #[arg(long = "eps_feas_polish")]
    eps_feas_polish: Option<f64>,

    /// Enable feasibility polishing
    #[arg(short = 'f', long = "feasibility_polishing")]
    feasibility_polishing: bool,

    /// Iterations for L-inf Ruiz rescaling
    #[arg(long = "l_inf_ruiz_iter")]
    l_inf_ruiz_iter: Option<i32>,

    /// Value for Pock-Chambolle alpha
    #[arg(long = "pock_chambolle_alpha")]
    pock_chambolle_alpha: Option<f64>,

    /// Disable Pock-Chambolle rescaling
    #[arg(long = "no_pock_chambolle")]
    no_pock_chambolle: bool,

    /// Disable bound objective rescaling
    #[arg(long = "no_bound_obj_rescaling")]
    no_bound_obj_rescaling: bool,

    /// Termination evaluation frequency
    #[arg(long = "eval_freq")]
    eval_freq: Option<i32>,

    /// Max iterations for singular value estimation
    #[arg(long = "sv_max_iter")]
    sv_max_iter: Option<i32>,

    /// Tolerance for singular value estimation
    #[arg(long = "sv_tol")]
    sv_tol: Option<f64>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = usage_exit_code(&e);
            let _ = e.print();
            return ExitCode::from(code);
        }
    };
    init_logging(cli.verbose || cli.debug);

    let status = match run(&cli) {
        Ok(status) => status,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitStatus::SetupFailure
        }
    };
    ExitCode::from(status.code() as u8)
}

/// `--help` and `--version` succeed; every other argument error is a setup
/// failure (1), never clap's default 2, which means "some jobs failed".
fn usage_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => ExitStatus::SetupFailure.code() as u8,
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> Result<ExitStatus> {
    let config = solver_config(cli)?;

    let mut options = RunOptions::from_env();
    if cli.no_sync {
        options.sync_rows = false;
    }

    let executor = CommandExecutor::new(&cli.solver).with_args(cli.solver_args.iter().cloned());
    let mut runner = BatchRunner::new(executor, config).with_options(options);
    let report = runner.run(&cli.datasets_txt, &cli.output_csv)?;

    tracing::debug!(
        run = %report.id,
        manifest = %report.manifest_hash.short(),
        config = %report.config_hash.short(),
        duration_ms = report.duration_ms(),
        "run report"
    );
    Ok(ExitStatus::from_summary(&report.summary))
}

/// Defaults, then environment, then the YAML file, then flags.
fn solver_config(cli: &Cli) -> Result<SolverConfig> {
    let mut config = SolverConfig::from_env();
    if let Some(path) = &cli.config {
        config.apply(&load_overrides(path)?);
    }
    config.apply(&cli_overrides(cli));
    config.validate()?;
    Ok(config)
}

fn load_overrides(path: &Path) -> Result<SolverConfigOverrides> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    SolverConfigOverrides::from_yaml(&text)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

fn cli_overrides(cli: &Cli) -> SolverConfigOverrides {
    SolverConfigOverrides {
        time_limit: cli.time_limit,
        iter_limit: cli.iter_limit,
        eps_opt: cli.eps_opt,
        eps_feas: cli.eps_feas,
        eps_infeas_detect: cli.eps_infeas_detect,
        l_inf_ruiz_iter: cli.l_inf_ruiz_iter,
        pock_chambolle: cli.no_pock_chambolle.then_some(false),
        pock_chambolle_alpha: cli.pock_chambolle_alpha,
        bound_obj_rescaling: cli.no_bound_obj_rescaling.then_some(false),
        eval_freq: cli.eval_freq,
        sv_max_iter: cli.sv_max_iter,
        sv_tol: cli.sv_tol,
        feasibility_polishing: cli.feasibility_polishing.then_some(true),
        eps_feas_polish: cli.eps_feas_polish,
        verbose: cli.verbose.then_some(true),
        debug: cli.debug.then_some(true),
    }
}
