//! Turns a submission into a formatted report document.

pub mod assemble;
pub mod docx;
pub mod error;
pub mod model;
pub mod naming;
pub mod screenshot;

pub use assemble::ReportBuilder;
pub use docx::write_docx;
pub use error::{ReportError, Result};
pub use model::{Block, ImageData, Report, Section};
pub use naming::{output_file_name, save_with_fallback};
pub use screenshot::{HeadlessBrowser, Screenshotter};
