//! Redirects Python plotting to an image file instead of a window.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::compile;
use crate::error::Result;

static PLOTTING_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?m)^\s*(?:import\s+(?:matplotlib\.pyplot|seaborn)\b|from\s+matplotlib\s+import\s+pyplot\b)",
    )
});

static SHOW_CALL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^(\s*)(?:plt|pyplot)\.show\(\s*\)"));

/// Whether a Python source imports a plotting library.
pub fn uses_plotting(source: &str) -> bool {
    PLOTTING_IMPORT.is_match(source)
}

/// A rewritten copy of a plotting script that saves its figure to `image`.
///
/// The script file is removed on drop; the image is left for the caller.
#[derive(Debug)]
pub struct PlotScript {
    pub script: PathBuf,
    pub image: PathBuf,
}

impl PlotScript {
    pub fn prepare(source: &str, scratch: &Path) -> Result<Self> {
        std::fs::create_dir_all(scratch)?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let script = scratch.join(format!("plot-{id}.py"));
        let image = scratch.join(format!("plot-{id}.png"));

        let image_literal = image.to_string_lossy().replace('\\', "/").replace('\'', "\\'");
        let body = SHOW_CALL.replace_all(source, "${1}pass");
        let rewritten = format!(
            "import matplotlib\nmatplotlib.use('Agg')\n{body}\n\nimport matplotlib.pyplot as _plt\n_plt.savefig('{image_literal}')\n"
        );
        std::fs::write(&script, rewritten)?;
        Ok(Self { script, image })
    }

    /// The image path, if the script actually produced one.
    pub fn rendered_image(&self) -> Option<PathBuf> {
        self.image.is_file().then(|| self.image.clone())
    }
}

impl Drop for PlotScript {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.script)
            && err.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %self.script.display(), error = %err, "Failed to remove plot script");
        }
    }
}
