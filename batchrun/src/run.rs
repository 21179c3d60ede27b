//! Batch orchestration: preconditions, script execution, logging, notification.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::core::types::{Credentials, RunReport, ScriptOutcome};
use crate::error::RunnerError;
use crate::io::config::RunConfig;
use crate::io::log_sink::{LogRegistry, ProjectLogger, SinkOptions};
use crate::io::mailer::{MailTransport, NotifyRequest, SmtpMailer, notify_if_needed};
use crate::io::process;

/// Characters kept from the generating UUID.
const RUN_ID_LEN: usize = 13;
/// Separator appended to the project log after each run.
const RUN_SEPARATOR: &str = "---------------";

/// Construction options for [`Runner`].
#[derive(Debug, Clone, Default)]
pub struct RunnerOptions {
    /// Custom log file name inside `<project_root>/logs/`.
    pub log_filename: Option<String>,
}

/// Executes one project's configured scripts start to finish.
#[derive(Debug)]
pub struct Runner {
    project_root: PathBuf,
    project_name: String,
    config: RunConfig,
    credentials: Credentials,
    logger: ProjectLogger,
}

impl Runner {
    /// Validate the project and attach its log sink.
    ///
    /// Fails fast on a bad project directory, an empty script list, or a
    /// recipient list inconsistent with the email strategy. Nothing is
    /// executed yet.
    pub fn new(
        project_root: &Path,
        config: RunConfig,
        credentials: Credentials,
        registry: &LogRegistry,
        options: &RunnerOptions,
    ) -> Result<Self, RunnerError> {
        let project_name = project_name_of(project_root)?;
        config.validate(&project_name)?;
        let sink_options = SinkOptions {
            log_filename: options.log_filename.clone(),
            backup_count: config.logs_backup_count,
            ..SinkOptions::default()
        };
        let logger = registry.attach(&project_name, project_root, &sink_options)?;
        Ok(Self {
            project_root: project_root.to_path_buf(),
            project_name,
            config,
            credentials,
            logger,
        })
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Run the batch, delivering any summary email over real SMTP.
    pub fn run(&self) -> Result<RunReport, RunnerError> {
        let mailer = SmtpMailer::new(self.credentials.clone());
        self.run_with_transport(&mailer)
    }

    /// Run the batch with an injected mail transport.
    ///
    /// Preconditions (interpreter resolvable, every script present) are
    /// checked before anything executes or is logged. Script failures never
    /// abort the batch; each outcome is logged the moment its script exits.
    /// A delivery failure surfaces as [`RunnerError::NotificationFailed`]
    /// after every script ran, leaving the written log lines in place.
    #[instrument(skip_all, fields(project = %self.project_name))]
    pub fn run_with_transport<T: MailTransport>(
        &self,
        transport: &T,
    ) -> Result<RunReport, RunnerError> {
        ensure_runnable(&self.project_name, &self.project_root, &self.config)?;

        let run_id = generate_run_id();
        info!(run_id = %run_id, scripts = self.config.scripts.len(), "starting batch");
        let batch_start = Instant::now();
        let mut outcomes = Vec::with_capacity(self.config.scripts.len());
        for script in &self.config.scripts {
            let outcome = self.run_one(script);
            self.log_outcome(&run_id, &outcome)?;
            outcomes.push(outcome);
        }
        let total_minutes = batch_start.elapsed().as_secs_f64() / 60.0;
        let report = RunReport {
            run_id,
            outcomes,
            total_minutes,
        };

        notify_if_needed(
            transport,
            &NotifyRequest {
                project_name: &self.project_name,
                strategy: self.config.email_strategy,
                sender: &self.credentials.login,
                recipients: &self.config.recipients,
                outcomes: &report.outcomes,
            },
        )?;

        self.logger.info(RUN_SEPARATOR)?;
        println!(
            "\nRun \"{}\" of {} completed in {:.2} minute(s).",
            report.run_id, self.project_name, report.total_minutes
        );
        info!(run_id = %report.run_id, failures = report.failures().count(), "batch finished");
        Ok(report)
    }

    fn run_one(&self, script: &str) -> ScriptOutcome {
        let path = self.project_root.join(script);
        let script_name = script_basename(script);
        debug!(script = script_name.as_str(), "running script");
        let start = Instant::now();
        let result = process::run_script(&self.config.interpreter, &path);
        let execution_minutes = start.elapsed().as_secs_f64() / 60.0;
        match result {
            Ok(run) if run.status.success() => {
                ScriptOutcome::success(script_name, execution_minutes)
            }
            Ok(run) => {
                ScriptOutcome::failure(script_name, execution_minutes, flatten_stderr(&run.stderr))
            }
            Err(err) => ScriptOutcome::failure(script_name, execution_minutes, err.to_string()),
        }
    }

    fn log_outcome(&self, run_id: &str, outcome: &ScriptOutcome) -> Result<(), RunnerError> {
        let verdict = if outcome.succeeded { "success" } else { "failure" };
        let mut line = format!(
            "{run_id} - {:.2} - {} - {verdict}",
            outcome.execution_minutes, outcome.script_name
        );
        if outcome.succeeded {
            return self.logger.info(&line);
        }
        if self.config.include_traceback
            && let Some(error_text) = &outcome.error_text
            && !error_text.is_empty()
        {
            line.push_str(&format!("- {error_text}"));
        }
        self.logger.error(&line)
    }
}

/// Fail-fast checks shared by `run` and `validate`: the interpreter resolves
/// to an executable and every configured script exists. All-or-nothing; no
/// script runs when any is missing.
pub(crate) fn ensure_runnable(
    project_name: &str,
    project_root: &Path,
    config: &RunConfig,
) -> Result<(), RunnerError> {
    if process::interpreter_on_path(&config.interpreter).is_none() {
        return Err(RunnerError::BadInterpreter {
            command: config.interpreter.clone(),
        });
    }
    for script in &config.scripts {
        if !project_root.join(script).is_file() {
            return Err(RunnerError::ScriptNotFound {
                project: project_name.to_string(),
                script: script_basename(script),
            });
        }
    }
    Ok(())
}

/// Derive the project name from the directory's absolute path.
pub(crate) fn project_name_of(project_root: &Path) -> Result<String, RunnerError> {
    if !project_root.is_dir() {
        return Err(RunnerError::InvalidProject {
            path: project_root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    let absolute = project_root
        .canonicalize()
        .map_err(|err| RunnerError::InvalidProject {
            path: project_root.to_path_buf(),
            reason: err.to_string(),
        })?;
    absolute
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| RunnerError::InvalidProject {
            path: project_root.to_path_buf(),
            reason: "no directory name".to_string(),
        })
}

/// Opaque id shared by every log line of one run.
fn generate_run_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(RUN_ID_LEN);
    id
}

fn script_basename(script: &str) -> String {
    Path::new(script)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| script.to_string())
}

fn flatten_stderr(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr).replace('\n', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::EmailStrategy;
    use crate::test_support::test_credentials;

    fn config(scripts: &[&str]) -> RunConfig {
        RunConfig {
            scripts: scripts.iter().map(|s| (*s).to_string()).collect(),
            interpreter: "sh".to_string(),
            recipients: Vec::new(),
            email_strategy: EmailStrategy::None,
            include_traceback: true,
            logs_backup_count: 0,
        }
    }

    #[test]
    fn run_ids_are_short_and_distinct() {
        let first = generate_run_id();
        let second = generate_run_id();
        assert_eq!(first.len(), RUN_ID_LEN);
        assert_eq!(second.len(), RUN_ID_LEN);
        assert_ne!(first, second);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn script_basename_strips_directories() {
        assert_eq!(script_basename("jobs/clean.py"), "clean.py");
        assert_eq!(script_basename("clean.py"), "clean.py");
    }

    #[test]
    fn flatten_stderr_joins_lines() {
        assert_eq!(flatten_stderr(b"a\nb\n"), "ab");
        assert_eq!(flatten_stderr(b""), "");
    }

    #[test]
    fn runner_rejects_a_missing_project_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let registry = LogRegistry::new();
        let err = Runner::new(
            &temp.path().join("absent"),
            config(&["job.sh"]),
            test_credentials(),
            &registry,
            &RunnerOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, RunnerError::InvalidProject { .. }));
    }

    #[test]
    fn runner_rejects_an_empty_script_list() {
        let temp = tempfile::tempdir().expect("tempdir");
        let registry = LogRegistry::new();
        let err = Runner::new(
            temp.path(),
            config(&[]),
            test_credentials(),
            &registry,
            &RunnerOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, RunnerError::EmptyScriptList { .. }));
        assert!(!temp.path().join("logs").exists());
    }

    #[test]
    fn ensure_runnable_names_the_missing_script() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = ensure_runnable("demo", temp.path(), &config(&["jobs/ghost.sh"])).unwrap_err();
        assert!(
            matches!(err, RunnerError::ScriptNotFound { ref script, .. } if script == "ghost.sh")
        );
    }

    #[test]
    fn ensure_runnable_rejects_a_bogus_interpreter() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut config = config(&["job.sh"]);
        config.interpreter = "definitely-not-an-interpreter-0b5e".to_string();
        std::fs::write(temp.path().join("job.sh"), "exit 0\n").expect("write script");

        let err = ensure_runnable("demo", temp.path(), &config).unwrap_err();
        assert!(matches!(err, RunnerError::BadInterpreter { .. }));
    }
}
