//! Stable exit codes for batchrun CLI commands.

/// Command succeeded; failing scripts inside a run do not change this.
pub const OK: i32 = 0;
/// Invalid configuration/environment/project layout or other fatal errors.
pub const INVALID: i32 = 1;
/// Every script ran and was logged, but the summary email was not delivered.
pub const NOTIFY_FAILED: i32 = 2;
