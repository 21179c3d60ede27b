//! Sequential batch script runner CLI.
//!
//! Each project directory carries an `exec_config.json` describing the
//! scripts to run, the interpreter, and how to report the results.
//! `batchrun run` executes the batch of every given project in order;
//! `batchrun validate` performs the same fail-fast checks without running
//! anything.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use batchrun::error::RunnerError;
use batchrun::exit_codes;
use batchrun::io::config::load_config;
use batchrun::io::credentials;
use batchrun::io::log_sink::LogRegistry;
use batchrun::logging;
use batchrun::run::{Runner, RunnerOptions};
use batchrun::validate::check_project;

#[derive(Parser)]
#[command(
    name = "batchrun",
    version,
    about = "Sequential per-project batch script runner"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute the configured scripts of each project, in order.
    Run {
        /// Project directories containing `exec_config.json`.
        #[arg(required = true)]
        projects: Vec<PathBuf>,

        /// Log file name inside `<project>/logs/` (defaults to the project name).
        #[arg(long)]
        log_file: Option<String>,
    },
    /// Check configuration, credentials, interpreter, and scripts without executing.
    Validate {
        /// Project directories containing `exec_config.json`.
        #[arg(required = true)]
        projects: Vec<PathBuf>,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_code_for(&err));
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run { projects, log_file } => cmd_run(&projects, log_file),
        Command::Validate { projects } => cmd_validate(&projects),
    }
}

fn cmd_run(projects: &[PathBuf], log_file: Option<String>) -> Result<()> {
    let registry = LogRegistry::new();
    let credentials = credentials::resolve()?;
    let options = RunnerOptions {
        log_filename: log_file,
    };
    for project in projects {
        let config = load_config(project)
            .with_context(|| format!("configure project {}", project.display()))?;
        let runner = Runner::new(project, config, credentials.clone(), &registry, &options)?;
        runner
            .run()
            .with_context(|| format!("run project {}", project.display()))?;
    }
    Ok(())
}

fn cmd_validate(projects: &[PathBuf]) -> Result<()> {
    for project in projects {
        let outcome = check_project(project)
            .with_context(|| format!("validate project {}", project.display()))?;
        println!(
            "{}: ok ({} script(s))",
            outcome.project_name, outcome.script_count
        );
    }
    Ok(())
}

/// `NOTIFY_FAILED` keeps "scripts ran, mail did not go out" distinguishable
/// from configuration failures in cron wrappers.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RunnerError>() {
        Some(RunnerError::NotificationFailed { .. }) => exit_codes::NOTIFY_FAILED,
        _ => exit_codes::INVALID,
    }
}
