//! Plain data shared between configuration, execution, and notification.

use std::fmt;
use std::str::FromStr;

use crate::error::RunnerError;

/// When a summary email is sent for a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailStrategy {
    /// After every run.
    All,
    /// Only when at least one script failed.
    FailureOnly,
    /// Never.
    None,
}

impl FromStr for EmailStrategy {
    type Err = RunnerError;

    /// Parse the configuration string, case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "failure_only" => Ok(Self::FailureOnly),
            "none" => Ok(Self::None),
            _ => Err(RunnerError::InvalidStrategy {
                reason: format!(
                    "expected \"all\", \"failure_only\" or \"none\", got \"{value}\""
                ),
            }),
        }
    }
}

impl fmt::Display for EmailStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::All => "all",
            Self::FailureOnly => "failure_only",
            Self::None => "none",
        };
        f.write_str(label)
    }
}

/// Result of one script execution.
///
/// Built once when the script exits and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptOutcome {
    /// File name of the script, without its directory.
    pub script_name: String,
    pub succeeded: bool,
    /// Wall-clock duration in minutes.
    pub execution_minutes: f64,
    /// Captured error output; present only when the script failed.
    pub error_text: Option<String>,
}

impl ScriptOutcome {
    pub fn success(script_name: String, execution_minutes: f64) -> Self {
        Self {
            script_name,
            succeeded: true,
            execution_minutes,
            error_text: None,
        }
    }

    pub fn failure(script_name: String, execution_minutes: f64, error_text: String) -> Self {
        Self {
            script_name,
            succeeded: false,
            execution_minutes,
            error_text: Some(error_text),
        }
    }
}

/// Everything a finished batch produced, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Opaque 13-character id shared by every log line of the run.
    pub run_id: String,
    pub outcomes: Vec<ScriptOutcome>,
    /// Wall-clock duration of the whole batch in minutes.
    pub total_minutes: f64,
}

impl RunReport {
    pub fn successes(&self) -> impl Iterator<Item = &ScriptOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScriptOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.succeeded)
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|outcome| !outcome.succeeded)
    }
}

/// SMTP credentials; the login doubles as the summary sender address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}
