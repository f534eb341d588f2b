//! Solver and harness configuration.
//!
//! `SolverConfig` is opaque to the runner: it is handed to the job executor
//! unchanged for every job. Layering is defaults, then environment
//! (`SolverConfig::from_env`), then a YAML overrides file, then CLI flags.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Wall-clock limit per job, in seconds.
    pub time_limit: f64,
    pub iter_limit: i32,

    /// Relative optimality tolerance.
    pub eps_opt: f64,
    /// Relative feasibility tolerance.
    pub eps_feas: f64,
    pub eps_infeas_detect: f64,

    /// Iterations of L-inf Ruiz rescaling.
    pub l_inf_ruiz_iter: i32,
    pub pock_chambolle: bool,
    pub pock_chambolle_alpha: f64,
    pub bound_obj_rescaling: bool,

    /// Termination evaluation frequency (iterations).
    pub eval_freq: i32,

    /// Singular value estimation.
    pub sv_max_iter: i32,
    pub sv_tol: f64,

    pub feasibility_polishing: bool,
    pub eps_feas_polish: f64,

    pub verbose: bool,
    pub debug: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: 3600.0,
            iter_limit: i32::MAX,
            eps_opt: 1e-4,
            eps_feas: 1e-4,
            eps_infeas_detect: 1e-10,
            l_inf_ruiz_iter: 10,
            pock_chambolle: true,
            pock_chambolle_alpha: 1.0,
            bound_obj_rescaling: true,
            eval_freq: 200,
            sv_max_iter: 5000,
            sv_tol: 1e-4,
            feasibility_polishing: false,
            eps_feas_polish: 1e-6,
            verbose: false,
            debug: false,
        }
    }
}

/// Partial overrides, as read from a YAML config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfigOverrides {
    pub time_limit: Option<f64>,
    pub iter_limit: Option<i32>,
    pub eps_opt: Option<f64>,
    pub eps_feas: Option<f64>,
    pub eps_infeas_detect: Option<f64>,
    pub l_inf_ruiz_iter: Option<i32>,
    pub pock_chambolle: Option<bool>,
    pub pock_chambolle_alpha: Option<f64>,
    pub bound_obj_rescaling: Option<bool>,
    pub eval_freq: Option<i32>,
    pub sv_max_iter: Option<i32>,
    pub sv_tol: Option<f64>,
    pub feasibility_polishing: Option<bool>,
    pub eps_feas_polish: Option<f64>,
    pub verbose: Option<bool>,
    pub debug: Option<bool>,
}

impl SolverConfigOverrides {
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

impl SolverConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `LPBATCH_TIME_LIMIT`, `LPBATCH_ITER_LIMIT`
    /// - `LPBATCH_EPS_OPT`, `LPBATCH_EPS_FEAS`, `LPBATCH_EPS_INFEAS_DETECT`
    /// - `LPBATCH_EPS_FEAS_POLISH`, `LPBATCH_FEASIBILITY_POLISHING`
    /// - `LPBATCH_EVAL_FREQ`
    ///
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(v) = env_parse("LPBATCH_TIME_LIMIT") {
            cfg.time_limit = v;
        }
        if let Some(v) = env_parse("LPBATCH_ITER_LIMIT") {
            cfg.iter_limit = v;
        }
        if let Some(v) = env_parse("LPBATCH_EPS_OPT") {
            cfg.eps_opt = v;
        }
        if let Some(v) = env_parse("LPBATCH_EPS_FEAS") {
            cfg.eps_feas = v;
        }
        if let Some(v) = env_parse("LPBATCH_EPS_INFEAS_DETECT") {
            cfg.eps_infeas_detect = v;
        }
        if let Some(v) = env_parse("LPBATCH_EPS_FEAS_POLISH") {
            cfg.eps_feas_polish = v;
        }
        if let Some(v) = env_parse("LPBATCH_FEASIBILITY_POLISHING") {
            cfg.feasibility_polishing = v;
        }
        if let Some(v) = env_parse("LPBATCH_EVAL_FREQ") {
            cfg.eval_freq = v;
        }

        cfg
    }

    pub fn apply(&mut self, o: &SolverConfigOverrides) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = o.$field { self.$field = v; })*
            };
        }
        take!(
            time_limit,
            iter_limit,
            eps_opt,
            eps_feas,
            eps_infeas_detect,
            l_inf_ruiz_iter,
            pock_chambolle,
            pock_chambolle_alpha,
            bound_obj_rescaling,
            eval_freq,
            sv_max_iter,
            sv_tol,
            feasibility_polishing,
            eps_feas_polish,
            verbose,
            debug,
        );
    }

    /// Reject NaN tolerances and limits. Ranges are the solver's business:
    /// every other value, zero and negative included, is passed through.
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("time_limit", self.time_limit),
            ("eps_opt", self.eps_opt),
            ("eps_feas", self.eps_feas),
            ("eps_infeas_detect", self.eps_infeas_detect),
            ("pock_chambolle_alpha", self.pock_chambolle_alpha),
            ("sv_tol", self.sv_tol),
            ("eps_feas_polish", self.eps_feas_polish),
        ] {
            if v.is_nan() {
                return Err(Error::Config(format!("{name} must be a number, got NaN")));
            }
        }
        Ok(())
    }
}

/// Harness-level knobs that do not reach the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// `fsync` the ledger after every row (in addition to flushing).
    pub sync_rows: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { sync_rows: true }
    }
}

impl RunOptions {
    /// `LPBATCH_NO_SYNC=1` disables per-row fsync.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Ok(s) = std::env::var("LPBATCH_NO_SYNC") {
            let s = s.trim();
            if s == "1" || s.eq_ignore_ascii_case("true") {
                opts.sync_rows = false;
            }
        }
        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_overrides_apply_on_top_of_defaults() {
        let o = SolverConfigOverrides::from_yaml(
            "time_limit: 60\neps_opt: 1.0e-6\nfeasibility_polishing: true\n",
        )
        .unwrap();
        let mut cfg = SolverConfig::default();
        cfg.apply(&o);
        assert_eq!(cfg.time_limit, 60.0);
        assert_eq!(cfg.eps_opt, 1e-6);
        assert!(cfg.feasibility_polishing);
        assert_eq!(cfg.eval_freq, 200);
    }

    #[test]
    fn unknown_yaml_keys_are_rejected() {
        let err = SolverConfigOverrides::from_yaml("time_limt: 60\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn empty_yaml_is_no_overrides() {
        assert_eq!(
            SolverConfigOverrides::from_yaml("  \n").unwrap(),
            SolverConfigOverrides::default()
        );
    }

    #[test]
    fn validate_passes_limits_through_and_rejects_nan() {
        let mut cfg = SolverConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.time_limit = 0.0;
        cfg.iter_limit = 0;
        cfg.eval_freq = -1;
        assert!(cfg.validate().is_ok());
        cfg.eps_feas = f64::NAN;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }
}
