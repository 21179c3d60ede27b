//! Per-project log files with weekly rotation.
//!
//! These files are product output, the durable record of every run, distinct
//! from the dev tracing in [`crate::logging`]. One sink exists per project
//! name; [`LogRegistry`] hands out shared handles so repeated runs in one
//! process append to the same file.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::core::rotation;
use crate::error::RunnerError;

/// Local-time stamp carried by every log line.
const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Rotation boundary for project logs.
pub const DEFAULT_ROTATE_EVERY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Sink construction options.
#[derive(Debug, Clone)]
pub struct SinkOptions {
    /// Log file name inside `<project_root>/logs/`; defaults to the project
    /// name. A missing `.log` extension is appended.
    pub log_filename: Option<String>,
    /// Rotated files retained; zero keeps only the current file.
    pub backup_count: u32,
    /// Rotation boundary; weekly unless a test narrows it.
    pub rotate_every: Duration,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            log_filename: None,
            backup_count: 0,
            rotate_every: DEFAULT_ROTATE_EVERY,
        }
    }
}

/// Severity of a project log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "INFO",
            Self::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Hands out one shared [`ProjectLogger`] per project name.
///
/// The first attach for a name creates the sink; later attaches return the
/// same handle and ignore their options.
#[derive(Default)]
pub struct LogRegistry {
    sinks: Mutex<HashMap<String, ProjectLogger>>,
}

impl LogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(
        &self,
        project_name: &str,
        project_root: &Path,
        options: &SinkOptions,
    ) -> Result<ProjectLogger, RunnerError> {
        let mut sinks = match self.sinks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(existing) = sinks.get(project_name) {
            debug!(project = project_name, "reusing attached log sink");
            return Ok(existing.clone());
        }
        let sink = LogSink::create(project_name, project_root, options)?;
        let logger = ProjectLogger {
            inner: Arc::new(Mutex::new(sink)),
        };
        sinks.insert(project_name.to_string(), logger.clone());
        Ok(logger)
    }
}

/// Cloneable appending handle to one project's log file.
#[derive(Debug, Clone)]
pub struct ProjectLogger {
    inner: Arc<Mutex<LogSink>>,
}

impl ProjectLogger {
    pub fn info(&self, message: &str) -> Result<(), RunnerError> {
        self.append(LogLevel::Info, message)
    }

    pub fn error(&self, message: &str) -> Result<(), RunnerError> {
        self.append(LogLevel::Error, message)
    }

    /// Path of the current log file.
    pub fn path(&self) -> PathBuf {
        match self.inner.lock() {
            Ok(sink) => sink.path.clone(),
            Err(poisoned) => poisoned.into_inner().path.clone(),
        }
    }

    fn append(&self, level: LogLevel, message: &str) -> Result<(), RunnerError> {
        let mut sink = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sink.append(level, message)
    }
}

#[derive(Debug)]
struct LogSink {
    path: PathBuf,
    backup_count: u32,
    rotate_every: Duration,
    hostname: String,
    rollover_at: SystemTime,
}

impl LogSink {
    fn create(
        project_name: &str,
        project_root: &Path,
        options: &SinkOptions,
    ) -> Result<Self, RunnerError> {
        let logs_dir = project_root.join("logs");
        fs::create_dir_all(&logs_dir)?;
        let path = logs_dir.join(log_file_name(project_name, options.log_filename.as_deref()));

        // An existing file keeps its place in the rotation schedule.
        let seeded_from = fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .unwrap_or_else(|_| SystemTime::now());
        let rollover_at = seeded_from + options.rotate_every;

        let hostname = hostname::get()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| String::from("unknown"));

        debug!(path = %path.display(), "attached project log sink");
        Ok(Self {
            path,
            backup_count: options.backup_count,
            rotate_every: options.rotate_every,
            hostname,
            rollover_at,
        })
    }

    fn append(&mut self, level: LogLevel, message: &str) -> Result<(), RunnerError> {
        let now = SystemTime::now();
        if rotation::rotation_due(now, self.rollover_at) {
            self.rotate(now)?;
        }
        let line = format!(
            "{} - {} - {} - {}\n",
            Local::now().format(TIMESTAMP_FORMAT),
            level,
            self.hostname,
            message
        );
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn rotate(&mut self, now: SystemTime) -> Result<(), RunnerError> {
        if self.path.exists() {
            let period_start = self
                .rollover_at
                .checked_sub(self.rotate_every)
                .unwrap_or(self.rollover_at);
            let backup = self.backup_path(period_start);
            if backup.exists() {
                fs::remove_file(&backup)?;
            }
            debug!(backup = %backup.display(), "rotating project log");
            fs::rename(&self.path, &backup)?;
            self.prune_backups()?;
        }
        self.rollover_at = rotation::next_rollover(self.rollover_at, self.rotate_every, now);
        Ok(())
    }

    fn backup_path(&self, period_start: SystemTime) -> PathBuf {
        let stamped = rotation::backup_name(self.file_name(), DateTime::<Local>::from(period_start));
        self.path.with_file_name(stamped)
    }

    fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("batch.log")
    }

    fn prune_backups(&self) -> Result<(), RunnerError> {
        let Some(dir) = self.path.parent() else {
            return Ok(());
        };
        let mut backups = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if rotation::is_backup_name(name, self.file_name()) {
                backups.push(name.to_string());
            }
        }
        for doomed in rotation::select_backups_to_delete(backups, self.backup_count) {
            debug!(file = %doomed, "pruning expired log backup");
            fs::remove_file(dir.join(doomed))?;
        }
        Ok(())
    }
}

fn log_file_name(project_name: &str, custom: Option<&str>) -> String {
    let base = custom.unwrap_or(project_name);
    if base.ends_with(".log") {
        base.to_string()
    } else {
        format!("{base}.log")
    }
}
