use std::fmt;
use std::path::Path;

use crate::error::{Result, RunError};

/// Extensions the tool knows how to run or render.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "py", "c", "cpp", "cc", "cxx", "java", "js", "mjs", "php", "html", "htm", "css",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    Php,
    C,
    Cpp,
    Java,
    Html,
    Css,
}

/// How a language is turned into presentable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageKind {
    /// Run directly by an interpreter.
    Interpreted,
    /// Compiled first, then the artifact is run.
    Compiled,
    /// Not executed; rendered in a browser and screenshotted.
    Rendered,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Self::Python),
            "js" | "mjs" => Some(Self::JavaScript),
            "php" => Some(Self::Php),
            "c" => Some(Self::C),
            "cpp" | "cc" | "cxx" => Some(Self::Cpp),
            "java" => Some(Self::Java),
            "html" | "htm" => Some(Self::Html),
            "css" => Some(Self::Css),
            _ => None,
        }
    }

    /// Route a file by its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_extension(&ext).ok_or_else(|| {
            RunError::UnsupportedFileType(if ext.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{ext}")
            })
        })
    }

    pub fn kind(self) -> LanguageKind {
        match self {
            Self::Python | Self::JavaScript | Self::Php => LanguageKind::Interpreted,
            Self::C | Self::Cpp | Self::Java => LanguageKind::Compiled,
            Self::Html | Self::Css => LanguageKind::Rendered,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Php => "php",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Java => "java",
            Self::Html => "html",
            Self::Css => "css",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
