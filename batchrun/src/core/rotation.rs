//! Rotation schedule decisions for project log files.
//!
//! The sink in [`crate::io::log_sink`] owns the filesystem work; the helpers
//! here are pure so boundary and pruning behavior stay testable without a
//! clock or a real directory.

use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local, NaiveDate};

/// Date suffix carried by rotated files, e.g. `billing.log.2026-08-17`.
pub const BACKUP_DATE_FORMAT: &str = "%Y-%m-%d";

/// True once `now` has reached the scheduled rollover instant.
pub fn rotation_due(now: SystemTime, rollover_at: SystemTime) -> bool {
    now >= rollover_at
}

/// Advance the rollover schedule past `now`, keeping period alignment.
///
/// A zero interval means "due on every append" and returns `now` directly.
pub fn next_rollover(rollover_at: SystemTime, interval: Duration, now: SystemTime) -> SystemTime {
    if interval.is_zero() {
        return now;
    }
    if now < rollover_at {
        return rollover_at;
    }
    let behind = now
        .duration_since(rollover_at)
        .unwrap_or(Duration::ZERO);
    let periods = behind.as_nanos() / interval.as_nanos() + 1;
    let step = interval.as_nanos().saturating_mul(periods);
    rollover_at + Duration::from_nanos(u64::try_from(step).unwrap_or(u64::MAX))
}

/// Name for the rotated copy of `file_name` covering the period that started
/// at `period_start`.
pub fn backup_name(file_name: &str, period_start: DateTime<Local>) -> String {
    format!("{file_name}.{}", period_start.format(BACKUP_DATE_FORMAT))
}

/// True when `candidate` is a rotated copy of `file_name`.
pub fn is_backup_name(candidate: &str, file_name: &str) -> bool {
    let Some(rest) = candidate.strip_prefix(file_name) else {
        return false;
    };
    let Some(suffix) = rest.strip_prefix('.') else {
        return false;
    };
    NaiveDate::parse_from_str(suffix, BACKUP_DATE_FORMAT).is_ok()
}

/// Backups to delete so that at most `backup_count` newest remain.
///
/// Lexicographic order matches chronological order for the date suffix. A
/// count of zero deletes every backup, leaving only the current file.
pub fn select_backups_to_delete(mut names: Vec<String>, backup_count: u32) -> Vec<String> {
    names.sort();
    let keep = backup_count as usize;
    if names.len() <= keep {
        return Vec::new();
    }
    names.truncate(names.len() - keep);
    names
}
