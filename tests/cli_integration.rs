//! End-to-end tests for the `moor` binary.
//!
//! These drive the compiled CLI against real repositories in temp
//! directories, covering the ambient-discovery path the library tests
//! cannot exercise safely in-process.

use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// A temp directory holding an initialized repository with identity set.
fn repo_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    run_git(dir.path(), &["init", "-b", "main"]);
    run_git(dir.path(), &["config", "user.email", "test@example.com"]);
    run_git(dir.path(), &["config", "user.name", "Test User"]);
    dir
}

fn moor(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("moor").unwrap();
    cmd.current_dir(dir);
    cmd
}

#[test]
fn init_reports_the_path() {
    let dir = TempDir::new().unwrap();

    moor(dir.path())
        .args(["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized repository"));

    assert!(dir.path().join(".git").exists());
}

#[test]
fn add_commit_log_flow() {
    let dir = repo_fixture();
    std::fs::write(dir.path().join("a.txt"), "hello\n").unwrap();

    moor(dir.path()).args(["add"]).assert().success();

    moor(dir.path())
        .args(["commit", "-m", "first commit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("first commit"));

    moor(dir.path())
        .args(["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("first commit"))
        .stdout(predicate::str::contains("Test User <test@example.com>"));
}

#[test]
fn commit_without_staging_fails_with_typed_message() {
    let dir = repo_fixture();

    moor(dir.path())
        .args(["commit", "-m", "too early"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));
}

#[test]
fn commit_allow_empty_flag() {
    let dir = repo_fixture();
    std::fs::write(dir.path().join("a.txt"), "hello\n").unwrap();
    moor(dir.path()).args(["add"]).assert().success();
    moor(dir.path())
        .args(["commit", "-m", "c1"])
        .assert()
        .success();

    moor(dir.path())
        .args(["commit", "-m", "empty checkpoint", "--allow-empty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("empty checkpoint"));
}

#[test]
fn log_respects_limit() {
    let dir = repo_fixture();
    for n in 1..=3 {
        std::fs::write(dir.path().join("a.txt"), format!("rev {n}\n")).unwrap();
        moor(dir.path()).args(["add"]).assert().success();
        moor(dir.path())
            .args(["commit", "-m", &format!("c{n}")])
            .assert()
            .success();
    }

    moor(dir.path())
        .args(["log", "-n", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("c3"))
        .stdout(predicate::str::contains("c2").not());
}

#[test]
fn branch_create_list_checkout() {
    let dir = repo_fixture();
    std::fs::write(dir.path().join("a.txt"), "hello\n").unwrap();
    moor(dir.path()).args(["add"]).assert().success();
    moor(dir.path())
        .args(["commit", "-m", "c1"])
        .assert()
        .success();

    moor(dir.path())
        .args(["branch", "create", "feature"])
        .assert()
        .success();

    moor(dir.path())
        .args(["branch", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* main"))
        .stdout(predicate::str::contains("  feature"));

    moor(dir.path())
        .args(["checkout", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to branch feature"));

    moor(dir.path())
        .args(["branch", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* feature"));
}

#[test]
fn deleting_missing_branch_fails() {
    let dir = repo_fixture();

    moor(dir.path())
        .args(["branch", "delete", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("branch not found"));
}

#[test]
fn push_without_credentials_is_an_error() {
    let dir = repo_fixture();
    std::fs::write(dir.path().join("a.txt"), "hello\n").unwrap();
    moor(dir.path()).args(["add"]).assert().success();
    moor(dir.path())
        .args(["commit", "-m", "c1"])
        .assert()
        .success();

    moor(dir.path())
        .args(["push"])
        .env_remove("MOOR_USERNAME")
        .env_remove("MOOR_TOKEN")
        .assert()
        .failure()
        .stderr(predicate::str::contains("MOOR_USERNAME"));
}

#[test]
fn sync_pushes_to_a_local_remote() {
    let remote = TempDir::new().unwrap();
    run_git(remote.path(), &["init", "--bare", "-b", "main"]);

    let dir = repo_fixture();
    run_git(
        dir.path(),
        &["remote", "add", "origin", remote.path().to_str().unwrap()],
    );
    std::fs::write(dir.path().join("a.txt"), "hello\n").unwrap();

    moor(dir.path())
        .args(["sync", "-m", "first commit"])
        .env("MOOR_USERNAME", "test")
        .env("MOOR_TOKEN", "token")
        .assert()
        .success()
        .stdout(predicate::str::contains("first commit"))
        .stdout(predicate::str::contains("Pushed"));

    let output = StdCommand::new("git")
        .args(["rev-parse", "refs/heads/main"])
        .current_dir(remote.path())
        .output()
        .unwrap();
    assert!(output.status.success());
}

#[test]
fn quiet_suppresses_informational_output() {
    let dir = repo_fixture();
    std::fs::write(dir.path().join("a.txt"), "hello\n").unwrap();

    moor(dir.path())
        .args(["--quiet", "add"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn cwd_flag_targets_another_directory() {
    let dir = repo_fixture();
    std::fs::write(dir.path().join("a.txt"), "hello\n").unwrap();

    let elsewhere = TempDir::new().unwrap();
    moor(elsewhere.path())
        .args(["--cwd", dir.path().to_str().unwrap(), "add"])
        .assert()
        .success();

    moor(dir.path())
        .args(["commit", "-m", "staged via --cwd"])
        .assert()
        .success();
}
