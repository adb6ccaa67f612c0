// crates/en_cli/tests/cli.rs
// Runs the `election-night` binary end to end over small inputs on disk.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const T0: &str = "1700000000000";

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, body).unwrap();
    p
}

fn rows(dir: &Path) -> PathBuf {
    write(
        dir,
        "rows.json",
        r#"[
            {"district_id": "Metro North", "A_votes": 600, "B_votes": 400, "eligible_voters_est": 1400, "turnout": 71.4},
            {"district_id": "Rural East", "A_votes": 300, "B_votes": 700, "eligible_voters_est": 1600, "turnout": 62.5}
        ]"#,
    )
}

fn bin() -> Command {
    let mut cmd = Command::cargo_bin("election-night").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn once_after_count_end_reports_final_results() {
    let dir = tempfile::tempdir().unwrap();
    let rows = rows(dir.path());
    let meta = write(
        dir.path(),
        "meta.json",
        r#"{"title": "Test Night", "count_start": "2024-11-05T20:00:00Z", "count_end": "2024-11-06T04:00:00Z"}"#,
    );

    let out = bin()
        .arg("--rows").arg(&rows)
        .arg("--meta").arg(&meta)
        .args(["--once", "--now", "2024-11-07T00:00:00Z", "--render", "json", "--no-persist"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc["title"], "Test Night");
    assert_eq!(doc["complete"], true);
    assert_eq!(doc["status"]["districts_called"], 2);
    assert_eq!(doc["status"]["districts_total"], 2);
    assert_eq!(doc["national"]["ballots"], 2000);
}

#[test]
fn simulated_run_stops_when_resolved_and_persists_window() {
    let dir = tempfile::tempdir().unwrap();
    let rows = rows(dir.path());
    let state = dir.path().join("window.json");

    // Fallback window is five minutes; one tick per minute resolves on the sixth tick.
    bin()
        .arg("--rows").arg(&rows)
        .arg("--state-file").arg(&state)
        .args(["--simulated", "--now", T0, "--tick-ms", "60000", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| tick 6 |").and(predicate::str::contains("| final")))
        .stdout(predicate::str::contains("| tick 7 |").not());

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(saved["startMs"], 1_700_000_000_000i64);
    assert_eq!(saved["endMs"], 1_700_000_300_000i64);
}

#[test]
fn max_ticks_caps_an_unresolved_run() {
    let dir = tempfile::tempdir().unwrap();
    let rows = rows(dir.path());

    bin()
        .arg("--rows").arg(&rows)
        .args(["--simulated", "--now", T0, "--tick-ms", "1000", "--max-ticks", "3", "--no-persist"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| tick 3 |").and(predicate::str::contains("| tick 4 |").not()));
}

#[test]
fn same_seed_same_output() {
    let dir = tempfile::tempdir().unwrap();
    let rows = rows(dir.path());
    let run = || {
        bin()
            .arg("--rows").arg(&rows)
            .args(["--once", "--now", "1700000150000", "--seed", "0x2a", "--render", "json", "--no-persist"])
            .output()
            .unwrap()
    };
    // --now is the window start, so the second run's window is fresh as well.
    let a = run();
    let b = run();
    assert!(a.status.success());
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn html_report_written_to_out_file() {
    let dir = tempfile::tempdir().unwrap();
    let rows = rows(dir.path());
    let out = dir.path().join("report.html");

    bin()
        .arg("--rows").arg(&rows)
        .arg("--out").arg(&out)
        .args(["--once", "--now", T0, "--render", "html", "--no-persist"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.starts_with("<!doctype html>"));
    assert!(html.contains("Metro North"));
}

#[test]
fn missing_rows_file_is_a_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    bin()
        .arg("--rows").arg(dir.path().join("absent.json"))
        .arg("--once")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn invalid_params_exit_with_validation_code() {
    let dir = tempfile::tempdir().unwrap();
    let rows = rows(dir.path());
    let params = write(dir.path(), "params.json", r#"{"tick_interval_ms": 0}"#);

    bin()
        .arg("--rows").arg(&rows)
        .arg("--params").arg(&params)
        .args(["--once", "--no-persist"])
        .assert()
        .code(2);
}

#[test]
fn malformed_rows_exit_with_validation_code() {
    let dir = tempfile::tempdir().unwrap();
    let rows = write(dir.path(), "rows.json", "{not json");

    bin().arg("--rows").arg(&rows).args(["--once", "--no-persist"]).assert().code(2);
}
