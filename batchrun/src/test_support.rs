//! Test-only helpers: throwaway project directories and scripted transports.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;

use crate::core::types::Credentials;
use crate::error::RunnerError;
use crate::io::config::CONFIG_FILE;
use crate::io::mailer::{MailTransport, OutboundEmail};

/// Throwaway project directory holding an `exec_config.json` and scripts.
///
/// Scripts are plain `sh` files so tests never depend on a Python install.
pub struct TestProject {
    _dir: TempDir,
    root: PathBuf,
}

impl TestProject {
    /// Create `<tempdir>/<name>` with no config yet.
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join(name);
        fs::create_dir_all(&root).expect("create project root");
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a script that prints `stderr_text` to stderr and exits with
    /// `exit_code`.
    pub fn add_script(&self, file_name: &str, stderr_text: &str, exit_code: i32) {
        let path = self.root.join(file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create script dir");
        }
        let body = format!("printf '%s' \"{stderr_text}\" 1>&2\nexit {exit_code}\n");
        fs::write(path, body).expect("write script");
    }

    /// Write `exec_config.json` running scripts with `sh`, tracebacks on and
    /// no log backups.
    pub fn write_config(&self, scripts: &[&str], strategy: &str, recipients: &[&str]) {
        self.write_config_raw(serde_json::json!({
            "scripts": scripts,
            "python_command": "sh",
            "recipients": recipients,
            "email_strategy": strategy,
            "include_traceback": true,
            "logs_backup_count": 0,
        }));
    }

    /// Write an arbitrary `exec_config.json` payload, for malformed-config
    /// tests.
    pub fn write_config_raw(&self, payload: serde_json::Value) {
        let mut buf = serde_json::to_string_pretty(&payload).expect("serialize config");
        buf.push('\n');
        fs::write(self.root.join(CONFIG_FILE), buf).expect("write config");
    }
}

/// Credentials that never reach a real mailbox.
pub fn test_credentials() -> Credentials {
    Credentials {
        login: "runner@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

/// Transport that records every send and always succeeds.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("sent lock").clone()
    }
}

impl MailTransport for RecordingTransport {
    fn send(&self, email: &OutboundEmail) -> Result<(), RunnerError> {
        self.sent.lock().expect("sent lock").push(email.clone());
        Ok(())
    }
}

/// Transport that always fails.
pub struct FailingTransport;

impl MailTransport for FailingTransport {
    fn send(&self, _email: &OutboundEmail) -> Result<(), RunnerError> {
        Err(RunnerError::NotificationFailed {
            reason: "transport rejected the message".to_string(),
        })
    }
}
