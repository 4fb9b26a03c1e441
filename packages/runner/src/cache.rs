use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use common::Fingerprint;
use common::config::ToolchainConfig;
use tracing::{debug, info, warn};

use crate::error::{Result, RunError};
use crate::language::Language;
use crate::process::{Invocation, run_captured};

/// A compiled artifact ready to execute.
#[derive(Debug, Clone)]
pub struct Build {
    /// Executable for C/C++, class directory for Java.
    pub artifact: PathBuf,
    pub fingerprint: Fingerprint,
    /// True when the artifact came from a previous run.
    pub reused: bool,
}

/// Compiled binaries keyed by source fingerprint.
///
/// Artifacts are named `<stem>-<fingerprint>` so an unchanged source is
/// never recompiled while a touched one always is.
#[derive(Debug, Clone)]
pub struct BuildCache {
    dir: PathBuf,
}

impl BuildCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, stem: &str, language: Language, fingerprint: &Fingerprint) -> PathBuf {
        let base = format!("{stem}-{}", fingerprint.short());
        match language {
            Language::Java => self.dir.join(base),
            _ => self
                .dir
                .join(format!("{base}{}", std::env::consts::EXE_SUFFIX)),
        }
    }

    /// Return the cached artifact for `source` if one exists.
    pub fn lookup(&self, source: &Path, language: Language) -> Result<Option<Build>> {
        let fingerprint = Fingerprint::of_file(source)?;
        let artifact = self.artifact_path(&stem_of(source), language, &fingerprint);
        if is_complete(&artifact, language, &stem_of(source)) {
            Ok(Some(Build {
                artifact,
                fingerprint,
                reused: true,
            }))
        } else {
            Ok(None)
        }
    }

    /// Compile `source`, or reuse the artifact from an earlier identical build.
    pub async fn build(
        &self,
        source: &Path,
        language: Language,
        toolchain: &ToolchainConfig,
    ) -> Result<Build> {
        if let Some(build) = self.lookup(source, language)? {
            debug!(artifact = %build.artifact.display(), "Reusing cached build");
            return Ok(build);
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let fingerprint = Fingerprint::of_file(source)?;
        let stem = stem_of(source);
        let artifact = self.artifact_path(&stem, language, &fingerprint);

        let invocation = match language {
            Language::C => Invocation::new(&toolchain.gcc)
                .arg(source)
                .arg("-o")
                .arg(&artifact),
            Language::Cpp => Invocation::new(&toolchain.gxx)
                .arg(source)
                .arg("-o")
                .arg(&artifact),
            Language::Java => {
                tokio::fs::create_dir_all(&artifact).await?;
                Invocation::new(&toolchain.javac)
                    .arg("-d")
                    .arg(&artifact)
                    .arg(source)
            }
            other => {
                return Err(RunError::UnsupportedFileType(format!(
                    "{other} is not compiled"
                )));
            }
        };

        info!(source = %source.display(), fingerprint = %fingerprint.short(), "Compiling");
        let output = run_captured(&invocation, "", None).await?;
        if !output.success || !is_complete(&artifact, language, &stem) {
            remove_artifact(&artifact).await;
            let mut message = output.stderr;
            if !output.stdout.is_empty() {
                if !message.is_empty() && !message.ends_with('\n') {
                    message.push('\n');
                }
                message.push_str(&output.stdout);
            }
            return Err(RunError::CompilationFailed(message.trim_end().to_string()));
        }

        Ok(Build {
            artifact,
            fingerprint,
            reused: false,
        })
    }
}

fn stem_of(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_complete(artifact: &Path, language: Language, stem: &str) -> bool {
    match language {
        Language::Java => artifact.join(format!("{stem}.class")).is_file(),
        _ => artifact.is_file(),
    }
}

async fn remove_artifact(artifact: &Path) {
    let removed = if artifact.is_dir() {
        tokio::fs::remove_dir_all(artifact).await
    } else {
        tokio::fs::remove_file(artifact).await
    };
    if let Err(err) = removed
        && err.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %artifact.display(), error = %err, "Failed to remove partial build");
    }
}

/// Delete entries in `dir` last modified more than `max_age` ago.
///
/// Returns how many entries were removed. A missing directory is not an error.
pub fn sweep_stale(dir: &Path, max_age: Duration) -> Result<usize> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err.into()),
    };

    let now = SystemTime::now();
    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let metadata = entry.metadata()?;
        let age = metadata
            .modified()
            .ok()
            .and_then(|m| now.duration_since(m).ok())
            .unwrap_or_default();
        if age <= max_age {
            continue;
        }
        let path = entry.path();
        let result = if metadata.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        match result {
            Ok(()) => removed += 1,
            Err(err) => warn!(path = %path.display(), error = %err, "Failed to sweep cache entry"),
        }
    }

    if removed > 0 {
        info!(dir = %dir.display(), removed, "Swept stale cache entries");
    }
    Ok(removed)
}
