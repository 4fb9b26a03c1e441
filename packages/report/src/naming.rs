use std::path::{Path, PathBuf};

use common::Metadata;
use tracing::{info, warn};

use crate::docx::write_docx;
use crate::error::{ReportError, Result};
use crate::model::Report;

/// `<first name>_<subject>_<experiment>.docx`, safe to use as a file name.
pub fn output_file_name(metadata: &Metadata) -> String {
    let first_name = metadata.name.split_whitespace().next().unwrap_or("");
    let parts = [first_name, metadata.subject.trim(), metadata.experiment_no.trim()]
        .map(|part| sanitize(part, "report"));
    format!("{}_{}_{}.docx", parts[0], parts[1], parts[2])
}

fn sanitize(part: &str, fallback: &str) -> String {
    let cleaned: String = part
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(['_', '.']).to_string();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// Write the report into `output_dir`, or into the system temp dir if that fails.
///
/// Returns where the document actually landed.
pub fn save_with_fallback(report: &Report, metadata: &Metadata, output_dir: &Path) -> Result<PathBuf> {
    let file_name = output_file_name(metadata);
    let primary = output_dir.join(&file_name);

    let attempt = std::fs::create_dir_all(output_dir)
        .map_err(ReportError::from)
        .and_then(|()| write_docx(report, &primary));
    match attempt {
        Ok(()) => {
            info!(path = %primary.display(), "Report saved");
            Ok(primary)
        }
        Err(err) => {
            let fallback = std::env::temp_dir().join(&file_name);
            warn!(
                path = %primary.display(),
                fallback = %fallback.display(),
                error = %err,
                "Failed to save report, writing to temp dir instead"
            );
            write_docx(report, &fallback)?;
            Ok(fallback)
        }
    }
}
