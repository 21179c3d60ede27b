//! Preflight checks for a project, without executing anything.

use std::path::Path;

use tracing::debug;

use crate::error::RunnerError;
use crate::io::{config, credentials};
use crate::run::{ensure_runnable, project_name_of};

/// What `batchrun validate` learned about one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOutcome {
    pub project_name: String,
    pub script_count: usize,
}

/// Run every fail-fast check a real run would: configuration structure and
/// consistency, credentials, interpreter resolution, script existence. No
/// script executes and no project log line is written.
pub fn check_project(project_root: &Path) -> Result<ValidateOutcome, RunnerError> {
    let config = config::load_config(project_root)?;
    credentials::resolve()?;
    let project_name = project_name_of(project_root)?;
    config.validate(&project_name)?;
    ensure_runnable(&project_name, project_root, &config)?;
    debug!(project = project_name.as_str(), "project validated");
    Ok(ValidateOutcome {
        project_name,
        script_count: config.scripts.len(),
    })
}
