//! End-to-end tests that invoke the `cq` binary
//!
//! HOME and XDG_CONFIG_HOME point into a temp directory so a real user
//! config never leaks into the run.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn cq_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cq").expect("cq binary should be built");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_missing_queue_exits_cleanly() {
    let home = tempfile::tempdir().expect("temp dir");
    let repo = tempfile::tempdir().expect("temp dir");

    cq_cmd(home.path())
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("not found"));

    let log = fs::read_to_string(repo.path().join("claude_queue.log")).expect("log file should exist");
    assert!(log.contains("Starting Claude Queue..."));
    assert!(log.contains("not found"));
}

#[test]
fn test_dry_run_prints_rendered_batch() {
    let home = tempfile::tempdir().expect("temp dir");
    let repo = tempfile::tempdir().expect("temp dir");
    fs::write(repo.path().join("queue.md"), "fix login bug\n\n  add tests  \n").unwrap();

    cq_cmd(home.path())
        .arg(repo.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Process these tasks one by one: 1. fix login bug; 3. add tests",
        ));
}

#[test]
fn test_repo_local_config_picks_queue_file() {
    let home = tempfile::tempdir().expect("temp dir");
    let repo = tempfile::tempdir().expect("temp dir");
    fs::write(repo.path().join(".claude-queue.yml"), "queue-file: tasks.txt\n").unwrap();
    fs::write(repo.path().join("tasks.txt"), "ship it\n").unwrap();

    cq_cmd(home.path())
        .arg(repo.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Process these tasks one by one: 1. ship it"));
}

#[test]
fn test_tmux_reply_source_requires_target() {
    let home = tempfile::tempdir().expect("temp dir");
    let repo = tempfile::tempdir().expect("temp dir");
    fs::write(repo.path().join("queue.md"), "task\n").unwrap();

    cq_cmd(home.path())
        .arg(repo.path())
        .args(["--reply-source", "tmux"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a target"));
}

#[test]
fn test_explicit_missing_config_fails() {
    let home = tempfile::tempdir().expect("temp dir");
    let repo = tempfile::tempdir().expect("temp dir");

    cq_cmd(home.path())
        .arg(repo.path())
        .args(["--config", "/nonexistent/claudequeue.yml"])
        .assert()
        .failure();
}
