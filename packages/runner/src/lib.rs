//! Runs assignment source files and captures what they print.

pub mod cache;
pub mod detect;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod language;
pub mod plot;
pub mod process;
pub mod reconcile;

pub use cache::{Build, BuildCache};
pub use dispatch::Runner;
pub use error::{Result, RunError};
pub use input::{DefaultInputs, InputProvider, InputRequest, ScriptedInputs, SyntheticInput};
pub use language::{Language, LanguageKind, SUPPORTED_EXTENSIONS};

/// Compile a regex literal that ships with the crate.
pub(crate) fn compile(pattern: &str) -> regex::Regex {
    regex::Regex::new(pattern).expect("built-in pattern is valid")
}
