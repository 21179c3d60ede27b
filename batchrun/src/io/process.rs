//! Spawning script subprocesses and locating the interpreter.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

/// Exit status and captured stderr of one finished script.
#[derive(Debug)]
pub struct ScriptRun {
    pub status: ExitStatus,
    pub stderr: Vec<u8>,
}

/// Locate `command` the way a shell would.
///
/// Bare names are searched through `PATH`; anything carrying a path separator
/// is checked directly. Only executable regular files count.
pub fn interpreter_on_path(command: &str) -> Option<PathBuf> {
    let candidate = Path::new(command);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(command))
        .find(|probe| is_executable(probe))
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Run `interpreter <script>`, blocking until it exits.
///
/// Stdout stays attached to the caller's terminal; stderr is captured for
/// failure reporting. The script gets no stdin.
pub fn run_script(interpreter: &str, script: &Path) -> io::Result<ScriptRun> {
    debug!(interpreter, script = %script.display(), "spawning script");
    let child = Command::new(interpreter)
        .arg(script)
        .stdin(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;
    let output = child.wait_with_output()?;
    debug!(exit_code = ?output.status.code(), "script finished");
    Ok(ScriptRun {
        status: output.status,
        stderr: output.stderr,
    })
}
