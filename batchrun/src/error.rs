//! Error taxonomy for configuration, validation, and run failures.
//!
//! Every fatal condition a caller may want to react to has its own variant;
//! per-script failures are not errors and live in
//! [`ScriptOutcome`](crate::core::types::ScriptOutcome) instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    /// The project has no `exec_config.json`.
    #[error("{} does not exist, create the configuration file first", .path.display())]
    ConfigNotFound { path: PathBuf },

    /// The configuration file exists but is not usable JSON.
    #[error("{} is not a valid configuration file", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required configuration field is absent.
    #[error("{} is missing the `{field}` variable", .path.display())]
    MissingConfigField { path: PathBuf, field: String },

    /// `LOGIN_MAIL` or `PASSWORD_MAIL` is not set in the environment.
    #[error("environment variable {name} is not set")]
    MissingCredential { name: String },

    /// The given project path cannot host a run.
    #[error("{} is not a usable project directory: {reason}", .path.display())]
    InvalidProject { path: PathBuf, reason: String },

    /// The configuration lists no scripts at all.
    #[error("no scripts configured for project {project}")]
    EmptyScriptList { project: String },

    /// Unknown strategy string, or a strategy inconsistent with the
    /// recipient list.
    #[error("invalid email strategy: {reason}")]
    InvalidStrategy { reason: String },

    /// The configured interpreter does not resolve to an executable.
    #[error("{command} is not a valid interpreter, check your configuration")]
    BadInterpreter { command: String },

    /// A configured script is absent from the project directory.
    #[error("{project}: \"{script}\" is listed in the configuration file but does not exist")]
    ScriptNotFound { project: String, script: String },

    /// The summary email could not be delivered. Scripts already ran and
    /// their log lines are durable.
    #[error("failed to send the summary email: {reason}")]
    NotificationFailed { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
