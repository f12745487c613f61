use std::process::Command;

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;

fn git_pilot(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("git-pilot"));
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

const STATE: &str = r#"{
  "repos": {
    "github": {
      "acme/svc": {
        "branches": {
          "main": {
            "files": {
              "ci.yml.j2": {
                "path": ".github/workflows/ci.yml",
                "sha": "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae",
                "rendered": "foo",
                "updated_at": "2026-01-02T03:04:05Z"
              }
            }
          }
        }
      }
    }
  }
}"#;

#[test]
fn init_writes_example_tree() {
    let dir = assert_fs::TempDir::new().unwrap();
    git_pilot(dir.path())
        .args(["init", "--template-dir", "templates"])
        .assert()
        .success()
        .stdout(contains("Template scaffold created"));

    dir.child("templates/example.yml.j2").assert(predicate::path::exists());
    dir.child("templates/override-example.yml.j2").assert(predicate::path::exists());
    dir.child("templates/includes/units/hello-world.j2").assert(predicate::path::exists());
    dir.child("templates/values.yml").assert(contains("your-org/first-repo"));

    git_pilot(dir.path())
        .args(["init", "--template-dir", "templates"])
        .assert()
        .success()
        .stdout(contains("nothing written"));
}

#[test]
fn dry_run_prints_plan_offline_and_saves_nothing() {
    let dir = assert_fs::TempDir::new().unwrap();
    git_pilot(dir.path())
        .args(["init", "--template-dir", "templates"])
        .assert()
        .success();

    git_pilot(dir.path())
        .args([
            "sync",
            "--template-dir",
            "templates",
            "--values",
            "templates/values.yml",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(contains("your-org/first-repo (dev)/.github/workflows/example.yml"))
        .stdout(contains("your-org/first-repo (dev)/.github/workflows/override-example.yml"))
        .stdout(contains(
            "your-org/second-repo (main)/.github/workflows/git-pilot/override-example.yml",
        ))
        .stdout(contains("+          SUPER_SECRET: ${{ secrets.SuperSecret }}"))
        .stdout(contains("3 change(s) planned"));

    dir.child(".git-pilot-state.json").assert(predicate::path::missing());
}

#[test]
fn sync_without_token_fails_before_any_change() {
    let dir = assert_fs::TempDir::new().unwrap();
    git_pilot(dir.path())
        .args(["init", "--template-dir", "templates"])
        .assert()
        .success();

    git_pilot(dir.path())
        .args([
            "sync",
            "--template-dir",
            "templates",
            "--values",
            "templates/values.yml",
            "--non-interactive",
        ])
        .assert()
        .failure()
        .stderr(contains("GitHub token is required"));

    dir.child(".git-pilot-state.json").assert(predicate::path::missing());
}

#[test]
fn sync_with_invalid_values_is_a_config_error() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("templates/ci.yml.j2").write_str("name: ci\n").unwrap();
    dir.child("values.yml")
        .write_str("repos:\n  - name: acme/svc\n    templates: [\".*\"]\n")
        .unwrap();

    git_pilot(dir.path())
        .args([
            "sync",
            "--template-dir",
            "templates",
            "--values",
            "values.yml",
            "--dry-run",
        ])
        .assert()
        .failure()
        .stderr(contains("has no 'branch'"));
}

#[test]
fn status_on_fresh_directory_reports_nothing_tracked() {
    let dir = assert_fs::TempDir::new().unwrap();
    git_pilot(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(contains("No tracked files."));
}

#[test]
fn status_lists_tracked_files() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("state.json").write_str(STATE).unwrap();

    git_pilot(dir.path())
        .args(["status", "--state-file", "state.json"])
        .assert()
        .success()
        .stdout(contains("acme/svc"))
        .stdout(contains(".github/workflows/ci.yml"))
        .stdout(contains("2c26b46b68ff"));

    git_pilot(dir.path())
        .args(["status", "--state-file", "state.json", "--json"])
        .assert()
        .success()
        .stdout(contains("\"template\": \"ci.yml.j2\""))
        .stdout(contains("\"provider\": \"github\""));
}

#[test]
fn malformed_state_file_is_reported() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("state.json").write_str("{ nope").unwrap();

    git_pilot(dir.path())
        .args(["status", "--state-file", "state.json"])
        .assert()
        .failure()
        .stderr(contains("malformed"));

    dir.child("state.json").assert("{ nope");
}

#[test]
fn drift_detect_with_empty_state_needs_no_token() {
    let dir = assert_fs::TempDir::new().unwrap();
    git_pilot(dir.path())
        .arg("drift-detect")
        .assert()
        .success()
        .stdout(contains("No tracked files"));
}
