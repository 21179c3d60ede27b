//! Binary-level checks: exit codes, stderr wording, and on-disk artifacts.

use std::fs;
use std::process::{Command, Output};

use batchrun::exit_codes;
use batchrun::test_support::TestProject;
use serde_json::json;

fn batchrun(project: &TestProject) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_batchrun"));
    cmd.current_dir(project.root())
        .env("LOGIN_MAIL", "runner@example.com")
        .env("PASSWORD_MAIL", "hunter2");
    cmd
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn run_executes_scripts_and_writes_the_log() {
    let project = TestProject::new("cli_run");
    project.add_script("task.sh", "", 0);
    project.write_config(&["task.sh"], "none", &[]);

    let output = batchrun(&project)
        .arg("run")
        .arg(project.root())
        .output()
        .expect("spawn");

    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr_of(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("of cli_run completed in"));
    let log = fs::read_to_string(project.root().join("logs/cli_run.log")).expect("log");
    assert!(log.contains("task.sh - success"));
}

#[test]
fn custom_log_file_flag_is_honored() {
    let project = TestProject::new("cli_log");
    project.add_script("task.sh", "", 0);
    project.write_config(&["task.sh"], "none", &[]);

    let output = batchrun(&project)
        .args(["run", "--log-file", "audit"])
        .arg(project.root())
        .output()
        .expect("spawn");

    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr_of(&output));
    assert!(project.root().join("logs/audit.log").is_file());
}

#[test]
fn validate_reports_ok_without_running_anything() {
    let project = TestProject::new("cli_check");
    project.add_script("task.sh", "marker should not appear", 1);
    project.write_config(&["task.sh"], "none", &[]);

    let output = batchrun(&project)
        .arg("validate")
        .arg(project.root())
        .output()
        .expect("spawn");

    assert_eq!(output.status.code(), Some(exit_codes::OK), "{}", stderr_of(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cli_check: ok (1 script(s))"));
    assert!(!project.root().join("logs").exists());
}

#[test]
fn missing_config_file_is_an_invalid_project() {
    let project = TestProject::new("cli_bare");

    let output = batchrun(&project)
        .arg("run")
        .arg(project.root())
        .output()
        .expect("spawn");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("exec_config.json"));
    assert!(stderr.contains("does not exist"));
}

#[test]
fn recipients_must_match_the_strategy_before_any_log_exists() {
    let project = TestProject::new("cli_norcpt");
    project.add_script("task.sh", "", 0);
    project.write_config(&["task.sh"], "all", &[]);

    let output = batchrun(&project)
        .arg("run")
        .arg(project.root())
        .output()
        .expect("spawn");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(stderr_of(&output).contains("recipients"));
    assert!(!project.root().join("logs").exists());
}

#[test]
fn missing_credentials_name_the_variable() {
    let project = TestProject::new("cli_nocreds");
    project.add_script("task.sh", "", 0);
    project.write_config(&["task.sh"], "none", &[]);

    let output = Command::new(env!("CARGO_BIN_EXE_batchrun"))
        .current_dir(project.root())
        .env_remove("LOGIN_MAIL")
        .env_remove("PASSWORD_MAIL")
        .arg("run")
        .arg(project.root())
        .output()
        .expect("spawn");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(stderr_of(&output).contains("LOGIN_MAIL"));
}

#[test]
fn unknown_interpreter_is_rejected() {
    let project = TestProject::new("cli_badinterp");
    project.add_script("task.sh", "", 0);
    project.write_config_raw(json!({
        "scripts": ["task.sh"],
        "python_command": "interp-that-does-not-exist",
        "recipients": [],
        "email_strategy": "none",
        "include_traceback": true,
        "logs_backup_count": 0,
    }));

    let output = batchrun(&project)
        .arg("run")
        .arg(project.root())
        .output()
        .expect("spawn");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(stderr_of(&output).contains("is not a valid interpreter"));
}
