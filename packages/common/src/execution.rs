use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What running a single source file produced.
///
/// Built once per file and consumed immediately by document assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Captured standard output, after input reconciliation.
    pub stdout: Option<String>,
    /// Captured standard error.
    pub stderr: Option<String>,
    /// Image rendered by the program (plot redirect), if any.
    pub image: Option<PathBuf>,
    /// Exit code of the executed program. `None` if killed by a signal or not run.
    pub exit_code: Option<i32>,
    /// Signal that terminated the program, where the platform reports one.
    pub signal: Option<i32>,
    /// Synthetic values fed to standard input, in order.
    pub inputs: Vec<String>,
}

impl ExecutionResult {
    /// Build a result from raw captured streams. Empty streams become `None`.
    pub fn from_streams(stdout: String, stderr: String, exit_code: Option<i32>) -> Self {
        Self {
            stdout: non_empty(stdout),
            stderr: non_empty(stderr),
            image: None,
            exit_code,
            signal: None,
            inputs: Vec::new(),
        }
    }

    /// True only for a normal exit with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// How the program ended, unless it exited cleanly.
    pub fn failure_reason(&self) -> Option<String> {
        match (self.exit_code, self.signal) {
            (Some(0), _) => None,
            (Some(code), _) => Some(format!("Process exited with status {code}")),
            (None, Some(signal)) => Some(format!("Process terminated by signal {signal}")),
            (None, None) => Some("Process terminated abnormally".to_string()),
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
