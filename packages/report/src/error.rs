use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write document archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
