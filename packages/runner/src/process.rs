use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, RunError};

/// A program to launch, with arguments and working directory.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

/// Captured streams and exit status of a finished process.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    /// Terminating signal on Unix.
    pub signal: Option<i32>,
    pub success: bool,
}

/// Run `invocation` to completion, feeding `stdin` and capturing output.
///
/// With `timeout` set, the child is killed once it elapses.
pub async fn run_captured(
    invocation: &Invocation,
    stdin: &str,
    timeout: Option<Duration>,
) -> Result<CapturedOutput> {
    let mut command = Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &invocation.cwd {
        command.current_dir(dir);
    }

    let mut child = command.spawn().map_err(|source| RunError::Spawn {
        program: invocation.program_name(),
        source,
    })?;

    if let Some(mut pipe) = child.stdin.take() {
        if !stdin.is_empty() {
            // The program may exit without reading; a broken pipe is not an error here.
            if let Err(err) = pipe.write_all(stdin.as_bytes()).await {
                debug!(error = %err, "Failed to write stdin");
            }
        }
        drop(pipe);
    }

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| RunError::Timeout {
                program: invocation.program_name(),
                secs: limit.as_secs(),
            })??,
        None => child.wait_with_output().await?,
    };

    debug!(
        program = %invocation.program_name(),
        exit_code = ?output.status.code(),
        "Process finished"
    );

    Ok(CapturedOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
        signal: termination_signal(&output.status),
        success: output.status.success(),
    })
}

#[cfg(unix)]
fn termination_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}
