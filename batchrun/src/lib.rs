//! Sequential per-project batch script runner.
//!
//! Each project directory declares its batch in `exec_config.json`: an
//! ordered list of scripts, the interpreter that runs them, and how to report
//! the results. A run executes every script in order, records per-script
//! timing and outcome to a rotating project log, and sends a summary email
//! according to the configured strategy. The architecture enforces a strict
//! separation:
//!
//! - **[`core`]**: Pure decision logic (notification rules, summary
//!   composition, rotation schedules). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting collaborators (config files, environment
//!   credentials, subprocesses, log files, SMTP). Isolated behind seams to
//!   enable scripted fakes in tests.
//!
//! Orchestration modules ([`run`], [`validate`]) coordinate core logic with
//! I/O to implement CLI commands.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
