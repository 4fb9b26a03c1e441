use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Programs used to interpret or compile each supported language.
#[derive(Debug, Deserialize, Clone)]
pub struct ToolchainConfig {
    /// Default: "python3" ("python" on Windows).
    #[serde(default = "default_python")]
    pub python: String,
    /// Default: "node".
    #[serde(default = "default_node")]
    pub node: String,
    /// Default: "php".
    #[serde(default = "default_php")]
    pub php: String,
    /// Default: "gcc".
    #[serde(default = "default_gcc")]
    pub gcc: String,
    /// Default: "g++".
    #[serde(default = "default_gxx")]
    pub gxx: String,
    /// Default: "javac".
    #[serde(default = "default_javac")]
    pub javac: String,
    /// Default: "java".
    #[serde(default = "default_java")]
    pub java: String,
}

fn default_python() -> String {
    if cfg!(windows) { "python" } else { "python3" }.into()
}
fn default_node() -> String {
    "node".into()
}
fn default_php() -> String {
    "php".into()
}
fn default_gcc() -> String {
    "gcc".into()
}
fn default_gxx() -> String {
    "g++".into()
}
fn default_javac() -> String {
    "javac".into()
}
fn default_java() -> String {
    "java".into()
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            node: default_node(),
            php: default_php(),
            gcc: default_gcc(),
            gxx: default_gxx(),
            javac: default_javac(),
            java: default_java(),
        }
    }
}

/// Where compiled binaries are kept between runs.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Default: "<system temp>/code2doc-cache".
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    /// Entries older than this are swept at the start of each run. Default: 7200.
    #[serde(default = "default_cache_max_age_secs")]
    pub max_age_secs: u64,
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("code2doc-cache")
}
fn default_cache_max_age_secs() -> u64 {
    2 * 60 * 60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            max_age_secs: default_cache_max_age_secs(),
        }
    }
}

/// Headless browser used to screenshot markup files.
#[derive(Debug, Deserialize, Clone)]
pub struct BrowserConfig {
    /// Whether markup files are screenshotted at all. Default: true.
    #[serde(default = "default_browser_enabled")]
    pub enabled: bool,
    /// Chromium-compatible executable. Default: "chromium".
    #[serde(default = "default_browser_binary")]
    pub binary: String,
    /// Default: 1920.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    /// Default: 1394.
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

fn default_browser_enabled() -> bool {
    true
}
fn default_browser_binary() -> String {
    "chromium".into()
}
fn default_viewport_width() -> u32 {
    1920
}
fn default_viewport_height() -> u32 {
    1394
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: default_browser_enabled(),
            binary: default_browser_binary(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

/// Limits applied to each executed program.
#[derive(Debug, Deserialize, Clone)]
pub struct RunConfig {
    /// Wall-clock limit per program in seconds. 0 disables it. Default: 0.
    #[serde(default)]
    pub timeout_secs: u64,
    /// Upper bound on open-ended input prompts for one program. Default: 32.
    #[serde(default = "default_max_open_inputs")]
    pub max_open_inputs: usize,
}

fn default_max_open_inputs() -> usize {
    32
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 0,
            max_open_inputs: default_max_open_inputs(),
        }
    }
}

/// Application configuration, passed explicitly into each component.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl AppConfig {
    /// Load from the file named by `CODE2DOC_CONFIG` (default `config/code2doc`,
    /// optional) layered under `CODE2DOC__*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CODE2DOC_CONFIG").unwrap_or_else(|_| "config/code2doc".to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("run.timeout_secs", 0_i64)?
            .set_default("run.max_open_inputs", 32_i64)?
            .set_default("cache.max_age_secs", 7200_i64)?
            .set_default("browser.enabled", true)?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("CODE2DOC").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
