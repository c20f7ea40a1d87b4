//! End-to-end runs of the `devctl` binary against a fake `docker` script
//! that records its arguments and simulates container state with a file.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const FAKE_DOCKER: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_DOCKER_LOG"
case "$*" in
  "compose version --short")
    exit 0 ;;
  *" ps -q "*)
    if [ -f "$FAKE_DOCKER_STATE" ]; then echo c0ffee; fi
    exit 0 ;;
  *" up --build -d")
    touch "$FAKE_DOCKER_STATE"
    exit 0 ;;
  *" down")
    rm -f "$FAKE_DOCKER_STATE"
    exit 0 ;;
  "exec "*phpstan*)
    echo "phpstan found 3 errors"
    exit 1 ;;
esac
exit 0
"#;

struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    fn new(phpstan_warn_only: bool) -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let docker = dir.path().join("fake-docker");
        std::fs::write(&docker, FAKE_DOCKER).unwrap();
        std::fs::set_permissions(&docker, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = format!(
            "project: demo/lib\n\
             docker: {}\n\
             checks:\n  \
               - name: phpunit\n    command: composer run phpunit\n  \
               - name: phpstan\n    command: [composer, run, phpstan]\n    warn_only: {phpstan_warn_only}\n",
            docker.display()
        );
        std::fs::write(dir.path().join(".devctl.yaml"), config).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn state_file(&self) -> PathBuf {
        self.path().join("running")
    }

    fn devctl(&self) -> Command {
        let mut cmd = Command::cargo_bin("devctl").unwrap();
        cmd.arg("--project-dir")
            .arg(self.path())
            .env("FAKE_DOCKER_LOG", self.path().join("docker.log"))
            .env("FAKE_DOCKER_STATE", self.state_file())
            .env_remove("RUST_LOG")
            .env_remove("DEVCTL_CONFIG");
        cmd
    }

    fn docker_log(&self) -> Vec<String> {
        std::fs::read_to_string(self.path().join("docker.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn count(&self, suffix: &str) -> usize {
        self.docker_log().iter().filter(|l| l.ends_with(suffix)).count()
    }
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("devctl")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("attach"))
        .stdout(predicate::str::contains("shutdown"));
}

#[test]
fn ci_starts_environment_and_runs_checks_in_order() {
    let project = Project::new(true);

    project
        .devctl()
        .arg("ci")
        .assert()
        .success()
        .stdout(predicate::str::contains("Running CI for demo/lib."))
        .stdout(predicate::str::contains("Warning."))
        .stdout(predicate::str::contains("SUCCESS! All checks pass"));

    let log = project.docker_log();
    assert_eq!(project.count("up --build -d"), 1);
    let execs: Vec<_> = log.iter().filter(|l| l.starts_with("exec ")).collect();
    assert_eq!(execs.len(), 3);
    assert!(execs[0].ends_with("c0ffee composer install"));
    assert!(execs[0].contains("-w /var/www/html -e XDEBUG_MODE=off"));
    assert!(execs[1].ends_with("c0ffee composer run phpunit"));
    assert!(execs[2].ends_with("c0ffee composer run phpstan"));
}

#[test]
fn ci_reuses_running_environment() {
    let project = Project::new(true);
    std::fs::write(project.state_file(), "").unwrap();

    project.devctl().args(["ci", "--no-install"]).assert().success();

    assert_eq!(project.count("up --build -d"), 0);
    assert!(
        !project
            .docker_log()
            .iter()
            .any(|l| l.ends_with("composer install"))
    );
}

#[test]
fn ci_failure_with_teardown_and_report() {
    let project = Project::new(false);
    let report = project.path().join("report.json");

    project
        .devctl()
        .args(["ci", "--teardown", "--report"])
        .arg(&report)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Failed."))
        .stdout(predicate::str::contains("ERROR! Not all checks passed"));

    assert_eq!(project.count(" down"), 1);
    assert!(!project.state_file().exists());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["overall_ok"], false);
    assert_eq!(json["results"][2]["outcome"], "fail");
    assert_eq!(json["results"][2]["log"], "phpstan found 3 errors\n");
}

#[test]
fn attach_requires_running_service() {
    let project = Project::new(true);

    project
        .devctl()
        .args(["attach", "--service", "db.local"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Service \"db.local\" is not running, have you even started it?",
        ));

    assert_eq!(project.count("up --build -d"), 0);
}

#[test]
fn run_then_shutdown_twice() {
    let project = Project::new(true);

    project
        .devctl()
        .args(["run", "--no-install"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is up and running!"));
    assert!(project.state_file().exists());

    for _ in 0..2 {
        project
            .devctl()
            .arg("shutdown")
            .assert()
            .success()
            .stdout(predicate::str::contains("development environment destroyed."));
    }
    assert_eq!(project.count(" down"), 2);
}

#[test]
fn missing_docker_binary_is_reported() {
    let project = Project::new(true);
    std::fs::write(
        project.path().join(".devctl.yaml"),
        "docker: devctl-no-such-docker\n",
    )
    .unwrap();

    project
        .devctl()
        .arg("shutdown")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("devctl-no-such-docker"));
}
