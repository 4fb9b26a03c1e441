use std::path::{Path, PathBuf};

use common::{ExecutionResult, Submission};
use runner::{InputProvider, Language, LanguageKind, RunError, Runner};
use tracing::{info, instrument, warn};

use crate::model::{Block, ImageData, Report, Section};
use crate::screenshot::Screenshotter;

/// Runs every file of a submission and collects the results into a [`Report`].
pub struct ReportBuilder {
    runner: Runner,
    screenshotter: Option<Box<dyn Screenshotter>>,
}

impl ReportBuilder {
    pub fn new(runner: Runner) -> Self {
        Self {
            runner,
            screenshotter: None,
        }
    }

    pub fn with_screenshotter(mut self, screenshotter: Box<dyn Screenshotter>) -> Self {
        self.screenshotter = Some(screenshotter);
        self
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Process files in order. Per-file failures become content; nothing here aborts the batch.
    #[instrument(skip_all, fields(files = submission.files.len()))]
    pub async fn build(
        &self,
        submission: &Submission,
        provider: &mut dyn InputProvider,
    ) -> Report {
        if let Err(err) = self.runner.sweep_stale() {
            warn!(error = %err, "Failed to sweep stale cache entries");
        }

        let metadata = &submission.metadata;
        let mut report = Report {
            title: metadata.title(),
            author: metadata.name.clone(),
            sections: Vec::new(),
            info: metadata
                .info_rows()
                .iter()
                .map(|(label, value)| (label.to_string(), value.to_string()))
                .collect(),
        };

        for path in &submission.files {
            if !path.is_file() {
                warn!(file = %path.display(), "Skipping: file not found");
                continue;
            }
            let mut section = self.build_section(path, provider).await;
            if !report.sections.is_empty() {
                section.blocks.insert(0, Block::PageBreak);
            }
            report.sections.push(section);
        }

        info!(sections = report.sections.len(), "Report assembled");
        report
    }

    async fn build_section(&self, path: &Path, provider: &mut dyn InputProvider) -> Section {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut section = Section::new(file_name.clone());
        section.heading(2, format!("File: {file_name}"));
        section.heading(3, "Source Code:");

        match tokio::fs::read(path).await {
            Ok(bytes) => section.code(String::from_utf8_lossy(&bytes)),
            Err(err) => {
                section.heading(3, "Execution Error:");
                section.paragraph(format!("Failed to read source: {err}"));
                return section;
            }
        }

        let rendered = matches!(
            Language::from_path(path).map(Language::kind),
            Ok(LanguageKind::Rendered)
        );
        if rendered {
            self.add_preview(&mut section, path).await;
        } else {
            match self.runner.run(path, provider).await {
                Ok(result) => add_execution(&mut section, result),
                Err(RunError::CompilationFailed(message)) => {
                    section.heading(3, "Compilation Error:");
                    section.paragraph(message);
                }
                Err(err) => {
                    section.heading(3, "Execution Error:");
                    section.paragraph(err.to_string());
                }
            }
        }
        section
    }

    async fn add_preview(&self, section: &mut Section, path: &Path) {
        section.heading(3, "Frontend Preview:");
        let Some(screenshotter) = &self.screenshotter else {
            section.placeholder("[Screenshots disabled]");
            return;
        };
        match screenshotter.capture(path, self.runner.scratch_dir()).await {
            Ok(images) if images.is_empty() => section.placeholder("[No screenshots generated]"),
            Ok(images) => {
                for image in images {
                    section.blocks.push(embed_image(image).await);
                }
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "Screenshot failed");
                section.placeholder(format!("[Screenshot unavailable: {err}]"));
            }
        }
    }
}

fn add_execution(section: &mut Section, result: ExecutionResult) {
    let failure = result.failure_reason();
    section.heading(3, "Output:");
    match result.stdout {
        Some(stdout) => section.paragraph(stdout),
        None => section.placeholder("[No Output]"),
    }

    if let Some(image) = result.image {
        section.heading(3, "Image Output:");
        section.blocks.push(embed_image_sync(&image));
    }

    if result.stderr.is_some() || failure.is_some() {
        section.heading(3, "Errors:");
        if let Some(stderr) = result.stderr {
            section.paragraph(stderr);
        }
        if let Some(reason) = failure {
            section.paragraph(reason);
        }
    }
}

/// Read an image into memory and delete the file.
async fn embed_image(path: PathBuf) -> Block {
    match tokio::task::spawn_blocking(move || embed_image_sync(&path)).await {
        Ok(block) => block,
        Err(err) => Block::Placeholder(format!("[Image unavailable: {err}]")),
    }
}

fn embed_image_sync(path: &Path) -> Block {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let block = match std::fs::read(path) {
        Ok(png) => Block::Image(ImageData::new(name, png)),
        Err(err) => return Block::Placeholder(format!("[Image unavailable: {err}]")),
    };
    if let Err(err) = std::fs::remove_file(path) {
        warn!(path = %path.display(), error = %err, "Failed to delete embedded image");
    }
    block
}
