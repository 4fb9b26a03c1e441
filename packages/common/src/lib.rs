pub mod config;
pub mod execution;
pub mod fingerprint;
pub mod metadata;

pub use config::AppConfig;
pub use execution::ExecutionResult;
pub use fingerprint::Fingerprint;
pub use metadata::{Metadata, Submission};
