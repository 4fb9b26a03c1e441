use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Compilation failed:\n{0}")]
    CompilationFailed(String),

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("Input error: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RunError>;
