use std::path::Path;
use std::time::Duration;

use common::config::{AppConfig, ToolchainConfig};
use common::ExecutionResult;
use tracing::{debug, info, instrument, warn};

use crate::cache::{BuildCache, sweep_stale};
use crate::detect::{RegexScanner, SourceScanner};
use crate::error::Result;
use crate::input::{InputProvider, synthesize};
use crate::language::{Language, LanguageKind};
use crate::plot::{PlotScript, uses_plotting};
use crate::process::{Invocation, run_captured};
use crate::reconcile::reconcile;

/// Routes a source file to its interpreter or compiler and runs it.
#[derive(Debug, Clone)]
pub struct Runner {
    toolchain: ToolchainConfig,
    cache: BuildCache,
    max_age: Duration,
    timeout: Option<Duration>,
    max_open_inputs: usize,
}

impl Runner {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            toolchain: config.toolchain.clone(),
            cache: BuildCache::new(&config.cache.dir),
            max_age: Duration::from_secs(config.cache.max_age_secs),
            timeout: (config.run.timeout_secs > 0)
                .then(|| Duration::from_secs(config.run.timeout_secs)),
            max_open_inputs: config.run.max_open_inputs,
        }
    }

    pub fn cache(&self) -> &BuildCache {
        &self.cache
    }

    /// Directory for temporary files (plot scripts, images, screenshots).
    pub fn scratch_dir(&self) -> &Path {
        self.cache.dir()
    }

    /// Remove cache entries older than the configured age.
    pub fn sweep_stale(&self) -> Result<usize> {
        sweep_stale(self.cache.dir(), self.max_age)
    }

    /// Run one source file, asking `provider` for any input it needs.
    ///
    /// Markup and stylesheet files are not executed and yield an empty result.
    #[instrument(skip(self, provider), fields(file = %path.display()))]
    pub async fn run(
        &self,
        path: &Path,
        provider: &mut dyn InputProvider,
    ) -> Result<ExecutionResult> {
        let language = Language::from_path(path)?;
        if language.kind() == LanguageKind::Rendered {
            debug!(%language, "Not executed");
            return Ok(ExecutionResult::default());
        }

        let path = std::path::absolute(path)?;
        let bytes = tokio::fs::read(&path).await?;
        let source = String::from_utf8_lossy(&bytes);

        let input = match RegexScanner::for_language(language) {
            Some(scanner) => {
                let interactive = scanner.is_interactive(&source);
                let expected = if interactive {
                    scanner.expected_inputs(&source)
                } else {
                    Vec::new()
                };
                debug!(interactive, expected = expected.len(), "Scanned source");
                synthesize(&expected, interactive, provider, self.max_open_inputs)?
            }
            None => Default::default(),
        };

        // Held until the program exits; removes the rewritten script on drop.
        let mut plot = None;
        let invocation = match language {
            Language::Python if uses_plotting(&source) => {
                let script = PlotScript::prepare(&source, self.scratch_dir())?;
                let invocation = Invocation::new(&self.toolchain.python).arg(&script.script);
                plot = Some(script);
                invocation
            }
            Language::Python => Invocation::new(&self.toolchain.python).arg(&path),
            Language::JavaScript => Invocation::new(&self.toolchain.node).arg(&path),
            Language::Php => Invocation::new(&self.toolchain.php).arg(&path),
            Language::C | Language::Cpp => {
                let build = self.cache.build(&path, language, &self.toolchain).await?;
                Invocation::new(&build.artifact)
            }
            Language::Java => {
                let build = self.cache.build(&path, language, &self.toolchain).await?;
                let class = path
                    .file_stem()
                    .map(|s| s.to_os_string())
                    .unwrap_or_default();
                Invocation::new(&self.toolchain.java)
                    .arg("-cp")
                    .arg(&build.artifact)
                    .arg(class)
            }
            Language::Html | Language::Css => return Ok(ExecutionResult::default()),
        };
        let invocation = match path.parent() {
            Some(dir) => invocation.current_dir(dir),
            None => invocation,
        };

        info!(%language, inputs = input.supplied.len(), "Running");
        let output = run_captured(&invocation, &input.to_stdin(), self.timeout).await?;

        let stdout = reconcile(&output.stdout, &input);
        let mut result = ExecutionResult::from_streams(stdout, output.stderr, output.exit_code);
        result.signal = output.signal;
        result.image = plot.as_ref().and_then(PlotScript::rendered_image);
        result.inputs = input.values();
        if !result.success() {
            warn!(
                exit_code = ?result.exit_code,
                signal = ?result.signal,
                "Program did not exit cleanly"
            );
        }
        Ok(result)
    }
}
