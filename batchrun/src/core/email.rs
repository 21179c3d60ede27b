//! Decide whether a summary email is due and compose its subject and body.

use crate::core::types::{EmailStrategy, ScriptOutcome};

const SUCCESS_MARK: &str = "✅";
const FAILURE_MARK: &str = "❌";

/// Subject and plain-text body of a summary email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

/// Whether the configured strategy asks for an email given the run's outcomes.
pub fn should_notify(strategy: EmailStrategy, outcomes: &[ScriptOutcome]) -> bool {
    match strategy {
        EmailStrategy::None => false,
        EmailStrategy::All => true,
        EmailStrategy::FailureOnly => outcomes.iter().any(|outcome| !outcome.succeeded),
    }
}

/// Build the summary email for a finished batch.
///
/// Successful scripts are listed before failed ones, each keeping the input
/// order; the subject states whether anything failed.
pub fn compose_summary(project_name: &str, outcomes: &[ScriptOutcome]) -> EmailContent {
    let (succeeded, failed): (Vec<_>, Vec<_>) =
        outcomes.iter().partition(|outcome| outcome.succeeded);
    let any_failed = !failed.is_empty();

    let subject = if any_failed {
        format!("{} ran into one or more errors.", capitalize(project_name))
    } else {
        format!("The project ran successfully ({}).", capitalize(project_name))
    };

    let mut body = if any_failed {
        format!("One or more errors were detected in the \"{project_name}\" scripts:\n")
    } else {
        format!("All scripts in \"{project_name}\" ran successfully.\n")
    };
    for outcome in succeeded.into_iter().chain(failed) {
        let mark = if outcome.succeeded { SUCCESS_MARK } else { FAILURE_MARK };
        body.push_str(&format!("\n - {} {mark}", outcome.script_name));
    }

    EmailContent { subject, body }
}

/// First character uppercased, the rest lowercased.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
