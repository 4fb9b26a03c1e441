mod args;
mod prompt;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use common::{AppConfig, Submission};
use console::style;
use report::{HeadlessBrowser, ReportBuilder, save_with_fallback};
use runner::{DefaultInputs, InputProvider, Runner, ScriptedInputs};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::{Cli, InputMode};
use prompt::ConsoleInputs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level());

    for file in cli.unsupported_files() {
        warn!(
            file = %file.display(),
            supported = %runner::SUPPORTED_EXTENSIONS.join(", "),
            "Not a supported source type; it will be reported as an execution error"
        );
    }

    let config = AppConfig::load().context("Failed to load config")?;
    let mode = cli.input_mode(std::io::stdin().is_terminal());

    let metadata = match mode {
        InputMode::Console => prompt::complete_metadata(cli.metadata())
            .context("Failed to read submission details")?,
        InputMode::Auto => cli.metadata(),
    };
    let submission = Submission::new(cli.files.clone(), metadata);

    let provider: Box<dyn InputProvider> = if !cli.scripted.is_empty() {
        Box::new(ScriptedInputs::new(cli.scripted.clone()))
    } else {
        match mode {
            InputMode::Console => Box::new(ConsoleInputs::default()),
            InputMode::Auto => Box::new(DefaultInputs),
        }
    };

    let job = Job {
        config,
        submission,
        output_dir: cli.output_dir.clone(),
        screenshots: !cli.no_screenshots,
    };
    let saved = tokio::spawn(job.run(provider))
        .await
        .context("Report generation task panicked")??;

    println!(
        "{} {}",
        style("Report saved as").green().bold(),
        style(saved.display()).cyan()
    );

    if cli.open {
        open::that(&saved).with_context(|| format!("Failed to open {}", saved.display()))?;
    }
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Everything the background generation task owns.
struct Job {
    config: AppConfig,
    submission: Submission,
    output_dir: PathBuf,
    screenshots: bool,
}

impl Job {
    async fn run(self, mut provider: Box<dyn InputProvider>) -> anyhow::Result<PathBuf> {
        let mut builder = ReportBuilder::new(Runner::new(&self.config));
        if self.screenshots {
            match HeadlessBrowser::from_config(&self.config.browser) {
                Some(browser) => builder = builder.with_screenshotter(Box::new(browser)),
                None => info!("Screenshots disabled in config"),
            }
        }

        let report = builder.build(&self.submission, provider.as_mut()).await;
        if report.sections.is_empty() {
            warn!("No readable source files; the report only carries submission details");
        }

        let Job {
            submission,
            output_dir,
            ..
        } = self;
        tokio::task::spawn_blocking(move || {
            save_with_fallback(&report, &submission.metadata, &output_dir)
        })
        .await
        .context("Save task panicked")?
        .context("Failed to save report")
    }
}
