//! I/O collaborators for runner commands.

pub mod config;
pub mod credentials;
pub mod log_sink;
pub mod mailer;
pub mod process;
