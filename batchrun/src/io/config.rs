//! Project configuration stored in `exec_config.json` at the project root.

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::core::types::EmailStrategy;
use crate::error::RunnerError;

/// Configuration file expected at each project root.
pub const CONFIG_FILE: &str = "exec_config.json";

/// Fields that must be present in the configuration file.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "scripts",
    "python_command",
    "recipients",
    "email_strategy",
    "include_traceback",
    "logs_backup_count",
];

/// Per-project run configuration.
///
/// Loaded once per invocation and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Script paths relative to the project root, in execution order.
    pub scripts: Vec<String>,
    /// Interpreter command used to execute every script.
    pub interpreter: String,
    /// Summary email recipients.
    pub recipients: Vec<String>,
    pub email_strategy: EmailStrategy,
    /// Append the captured error text to failure log lines.
    pub include_traceback: bool,
    /// Rotated log files retained next to the current one.
    pub logs_backup_count: u32,
}

/// On-disk shape of the configuration file. Unknown fields are tolerated.
#[derive(Debug, Deserialize)]
struct RawConfig {
    scripts: Vec<String>,
    python_command: String,
    recipients: Vec<String>,
    email_strategy: String,
    include_traceback: bool,
    logs_backup_count: u32,
}

impl RunConfig {
    /// Cross-field checks, run before anything executes.
    ///
    /// An empty script list is a configuration mistake, and a non-`none`
    /// strategy with nobody to mail is another.
    pub fn validate(&self, project_name: &str) -> Result<(), RunnerError> {
        if self.scripts.is_empty() {
            return Err(RunnerError::EmptyScriptList {
                project: project_name.to_string(),
            });
        }
        if self.recipients.is_empty() && self.email_strategy != EmailStrategy::None {
            return Err(RunnerError::InvalidStrategy {
                reason: format!(
                    "project {project_name} has no recipients, the email strategy must be \"none\""
                ),
            });
        }
        Ok(())
    }
}

/// Load and structurally check a project's `exec_config.json`.
///
/// Verifies the file exists, parses as JSON, and carries every required field
/// before typed extraction. Cross-field rules live in [`RunConfig::validate`].
pub fn load_config(project_root: &Path) -> Result<RunConfig, RunnerError> {
    let path = project_root.join(CONFIG_FILE);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(RunnerError::ConfigNotFound { path });
        }
        Err(err) => return Err(RunnerError::Io(err)),
    };

    let value: Value = serde_json::from_str(&contents).map_err(|source| {
        RunnerError::ConfigParse {
            path: path.clone(),
            source,
        }
    })?;
    for field in REQUIRED_FIELDS {
        if value.get(field).is_none() {
            return Err(RunnerError::MissingConfigField {
                path: path.clone(),
                field: field.to_string(),
            });
        }
    }

    let raw: RawConfig = serde_json::from_value(value).map_err(|source| {
        RunnerError::ConfigParse {
            path: path.clone(),
            source,
        }
    })?;
    let email_strategy = raw.email_strategy.parse::<EmailStrategy>()?;

    Ok(RunConfig {
        scripts: raw.scripts,
        interpreter: raw.python_command,
        recipients: raw.recipients,
        email_strategy,
        include_traceback: raw.include_traceback,
        logs_backup_count: raw.logs_backup_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> Value {
        serde_json::json!({
            "scripts": ["jobs/first.py", "jobs/second.py"],
            "python_command": "python3",
            "recipients": ["ops@example.com"],
            "email_strategy": "FAILURE_ONLY",
            "include_traceback": true,
            "logs_backup_count": 2,
        })
    }

    fn write_config(dir: &Path, value: &Value) {
        let payload = serde_json::to_string_pretty(value).expect("serialize");
        fs::write(dir.join(CONFIG_FILE), payload).expect("write config");
    }

    #[test]
    fn load_reads_every_field() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_config(temp.path(), &full_config());

        let config = load_config(temp.path()).expect("load");
        assert_eq!(config.scripts, vec!["jobs/first.py", "jobs/second.py"]);
        assert_eq!(config.interpreter, "python3");
        assert_eq!(config.email_strategy, EmailStrategy::FailureOnly);
        assert!(config.include_traceback);
        assert_eq!(config.logs_backup_count, 2);
    }

    #[test]
    fn load_missing_file_is_config_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load_config(temp.path()).unwrap_err();
        assert!(matches!(err, RunnerError::ConfigNotFound { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn load_rejects_broken_json() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(CONFIG_FILE), "{not json").expect("write");

        let err = load_config(temp.path()).unwrap_err();
        assert!(matches!(err, RunnerError::ConfigParse { .. }));
    }

    #[test]
    fn each_missing_field_is_named() {
        for field in REQUIRED_FIELDS {
            let temp = tempfile::tempdir().expect("tempdir");
            let mut value = full_config();
            value
                .as_object_mut()
                .expect("object")
                .remove(field)
                .expect("field present");
            write_config(temp.path(), &value);

            let err = load_config(temp.path()).unwrap_err();
            match err {
                RunnerError::MissingConfigField { field: named, .. } => {
                    assert_eq!(named, field);
                }
                other => panic!("expected MissingConfigField for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn load_rejects_mistyped_fields() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut value = full_config();
        value["logs_backup_count"] = Value::from("two");
        write_config(temp.path(), &value);

        let err = load_config(temp.path()).unwrap_err();
        assert!(matches!(err, RunnerError::ConfigParse { .. }));
    }

    #[test]
    fn load_rejects_unknown_strategy() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut value = full_config();
        value["email_strategy"] = Value::from("sometimes");
        write_config(temp.path(), &value);

        let err = load_config(temp.path()).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidStrategy { .. }));
    }

    #[test]
    fn validate_rejects_empty_script_list() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut value = full_config();
        value["scripts"] = serde_json::json!([]);
        write_config(temp.path(), &value);

        let config = load_config(temp.path()).expect("load");
        let err = config.validate("demo").unwrap_err();
        assert!(matches!(err, RunnerError::EmptyScriptList { .. }));
    }

    #[test]
    fn validate_rejects_recipientless_notification() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut value = full_config();
        value["recipients"] = serde_json::json!([]);
        write_config(temp.path(), &value);

        let config = load_config(temp.path()).expect("load");
        let err = config.validate("demo").unwrap_err();
        assert!(matches!(err, RunnerError::InvalidStrategy { .. }));
    }

    #[test]
    fn validate_allows_no_recipients_when_strategy_is_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut value = full_config();
        value["recipients"] = serde_json::json!([]);
        value["email_strategy"] = Value::from("none");
        write_config(temp.path(), &value);

        let config = load_config(temp.path()).expect("load");
        config.validate("demo").expect("valid");
    }
}
