//! Resume behavior: reruns skip recorded jobs, and a truncated ledger picks
//! up where it left off without touching earlier rows.

mod common;

use std::fs;

use common::{optimal, Script, ScriptedExecutor, Workspace};
use lpbatch_core::config::{RunOptions, SolverConfig};
use lpbatch_core::report::RunSummary;
use lpbatch_exec::{BatchRunner, ExitStatus};
use lpbatch_io::ledger::LEDGER_HEADER;

const MANIFEST: &str = "/bench\n# netlib subset\nafiro.mps\nadlittle.mps.gz\nsub/blend.mps\n";

fn run_once(ws: &Workspace, executor: ScriptedExecutor) -> (RunSummary, ScriptedExecutor) {
    let mut runner = BatchRunner::new(executor, SolverConfig::default())
        .with_options(RunOptions { sync_rows: false });
    let report = runner.run(&ws.manifest, &ws.ledger).expect("run");
    (report.summary, runner.into_executor())
}

#[test]
fn second_run_skips_everything() {
    let ws = Workspace::new(MANIFEST);

    let (first, _) = run_once(&ws, ScriptedExecutor::new());
    assert_eq!(first, RunSummary { solved: 3, failed: 0, skipped: 0 });
    let after_first = ws.text();

    let (second, exec) = run_once(&ws, ScriptedExecutor::new());
    assert_eq!(second, RunSummary { solved: 0, failed: 0, skipped: 3 });
    assert!(exec.attempted.is_empty());
    assert_eq!(ws.text(), after_first);

    let rows = ws.rows();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], LEDGER_HEADER.to_vec());
    let datasets: Vec<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
    assert_eq!(
        datasets,
        vec!["/bench/afiro.mps", "/bench/adlittle.mps.gz", "/bench/sub/blend.mps"]
    );
    assert_eq!(rows[2][1], "adlittle");
}

#[test]
fn failed_jobs_are_recorded_and_not_retried() {
    let ws = Workspace::new(MANIFEST);
    let exec = ScriptedExecutor::new().with("/bench/afiro.mps", Script::SolveFail);
    let (first, _) = run_once(&ws, exec);
    assert_eq!(first.failed, 1);
    assert_eq!(ExitStatus::from_summary(&first), ExitStatus::JobsFailed);

    let (second, _) = run_once(&ws, ScriptedExecutor::new());
    assert_eq!(second, RunSummary { solved: 0, failed: 0, skipped: 3 });
    assert_eq!(ExitStatus::from_summary(&second), ExitStatus::Success);
}

#[test]
fn truncated_ledger_resumes_after_last_complete_row() {
    let ws = Workspace::new(MANIFEST);
    run_once(&ws, ScriptedExecutor::new());

    // Keep the header and the first data row only.
    let text = ws.text();
    let keep: String = text.split_inclusive('\n').take(2).collect();
    fs::write(&ws.ledger, &keep).unwrap();

    let (summary, exec) = run_once(&ws, ScriptedExecutor::new());
    assert_eq!(summary, RunSummary { solved: 2, failed: 0, skipped: 1 });
    assert_eq!(
        exec.attempted,
        vec!["/bench/adlittle.mps.gz", "/bench/sub/blend.mps"]
    );

    let after = ws.text();
    assert!(after.starts_with(&keep));
    assert_eq!(ws.rows().len(), 4);
}

#[test]
fn torn_last_row_is_kept_and_job_is_skipped() {
    let ws = Workspace::new(MANIFEST);
    run_once(&ws, ScriptedExecutor::new());

    // Cut mid-way through the second data row, after its dataset field.
    let text = ws.text();
    let cut = text.find("/bench/adlittle.mps.gz,adlittle,OPT").unwrap() + 30;
    fs::write(&ws.ledger, &text[..cut]).unwrap();

    let (summary, exec) = run_once(&ws, ScriptedExecutor::new());
    assert_eq!(summary, RunSummary { solved: 1, failed: 0, skipped: 2 });
    assert_eq!(exec.attempted, vec!["/bench/sub/blend.mps"]);

    let after = ws.text();
    assert!(after.starts_with(&text[..cut]));
    let last = ws.rows().pop().unwrap();
    assert_eq!(last[0], "/bench/sub/blend.mps");
    assert_eq!(last.len(), LEDGER_HEADER.len());
}

#[test]
fn header_only_ledger_is_appended_without_second_header() {
    let ws = Workspace::new(MANIFEST);
    fs::write(&ws.ledger, format!("{}\n", LEDGER_HEADER.join(","))).unwrap();

    let (summary, _) = run_once(&ws, ScriptedExecutor::new());
    assert_eq!(summary.solved, 3);
    assert_eq!(ws.text().matches("dataset,instance").count(), 1);
}

#[test]
fn reordered_header_uses_named_column() {
    let ws = Workspace::new(MANIFEST);
    fs::write(
        &ws.ledger,
        "instance,termination_reason,dataset\nafiro,OPTIMAL,/bench/afiro.mps\n",
    )
    .unwrap();

    let (summary, exec) = run_once(&ws, ScriptedExecutor::new());
    assert_eq!(summary, RunSummary { solved: 2, failed: 0, skipped: 1 });
    assert!(!exec.attempted.contains(&"/bench/afiro.mps".to_string()));
}

#[test]
fn headerless_ledger_counts_first_row_as_data() {
    let ws = Workspace::new(MANIFEST);
    fs::write(&ws.ledger, "/bench/afiro.mps,afiro,OPTIMAL\n").unwrap();

    let (summary, _) = run_once(&ws, ScriptedExecutor::new());
    assert_eq!(summary, RunSummary { solved: 2, failed: 0, skipped: 1 });
    // No header is added to a ledger that already has content.
    assert!(!ws.text().contains("dataset,instance"));
}

#[test]
fn deleting_a_row_between_runs_reprocesses_that_job() {
    let ws = Workspace::new(MANIFEST);
    run_once(&ws, ScriptedExecutor::new());

    let edited: String = ws
        .text()
        .lines()
        .filter(|l| !l.starts_with("/bench/afiro.mps,"))
        .map(|l| format!("{l}\n"))
        .collect();
    fs::write(&ws.ledger, edited).unwrap();

    let exec = ScriptedExecutor::new().with("/bench/afiro.mps", Script::Solve(optimal(77)));
    let (summary, exec) = run_once(&ws, exec);
    assert_eq!(summary, RunSummary { solved: 1, failed: 0, skipped: 2 });
    assert_eq!(exec.attempted, vec!["/bench/afiro.mps"]);
    let last = ws.rows().pop().unwrap();
    assert_eq!(last[4], "77");
}

#[test]
fn appending_jobs_to_the_manifest_runs_only_new_ones() {
    let ws = Workspace::new(MANIFEST);
    run_once(&ws, ScriptedExecutor::new());

    fs::write(&ws.manifest, format!("{MANIFEST}/elsewhere/qap15.mps\n")).unwrap();
    let (summary, exec) = run_once(&ws, ScriptedExecutor::new());
    assert_eq!(summary, RunSummary { solved: 1, failed: 0, skipped: 3 });
    assert_eq!(exec.attempted, vec!["/elsewhere/qap15.mps"]);
}

#[test]
fn row_torn_inside_a_quoted_field_does_not_hide_later_rows() {
    let ws = Workspace::new("/lp\nx,y.mps\nb.mps\nc.mps\n");
    fs::write(&ws.ledger, format!("{}\n\"/lp/", LEDGER_HEADER.join(","))).unwrap();

    let (first, _) = run_once(&ws, ScriptedExecutor::new());
    assert_eq!(first, RunSummary { solved: 3, failed: 0, skipped: 0 });

    for _ in 0..2 {
        let (again, exec) = run_once(&ws, ScriptedExecutor::new());
        assert_eq!(again, RunSummary { solved: 0, failed: 0, skipped: 3 });
        assert!(exec.attempted.is_empty());
    }
    assert_eq!(ws.text().matches("\"/lp/x,y.mps\",\"x,y\",OPTIMAL").count(), 1);
}
