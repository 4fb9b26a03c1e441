use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use async_trait::async_trait;
use common::{AppConfig, Metadata};
use report::{ReportBuilder, ReportError, Screenshotter};
use runner::Runner;

pub fn have(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

#[macro_export]
macro_rules! require {
    ($($program:expr),+) => {
        $(
            if !$crate::support::have($program) {
                eprintln!("skipping: {} not found", $program);
                return;
            }
        )+
    };
}

pub fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn metadata() -> Metadata {
    Metadata {
        name: "Ada Lovelace".into(),
        subject: "Computing".into(),
        reg_no: "REG-001".into(),
        group: "A".into(),
        semester: "3".into(),
        experiment_no: "7".into(),
    }
}

pub fn builder_in(dir: &Path) -> ReportBuilder {
    let mut config = AppConfig::default();
    config.cache.dir = dir.join("cache");
    config.run.timeout_secs = 60;
    ReportBuilder::new(Runner::new(&config))
}

/// PNG header with an IHDR chunk; enough for dimension sniffing.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend_from_slice(&13u32.to_be_bytes());
    png.extend_from_slice(b"IHDR");
    png.extend_from_slice(&width.to_be_bytes());
    png.extend_from_slice(&height.to_be_bytes());
    png.extend_from_slice(&[8, 6, 0, 0, 0, 0, 0, 0, 0]);
    png
}

/// Writes a fixed PNG instead of launching a browser.
pub struct FakeBrowser;

#[async_trait]
impl Screenshotter for FakeBrowser {
    async fn capture(&self, page: &Path, scratch: &Path) -> report::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(scratch)?;
        let stem = page.file_stem().unwrap().to_string_lossy();
        let image = scratch.join(format!("{stem}_screenshot_00.png"));
        std::fs::write(&image, png_bytes(1920, 1394))?;
        Ok(vec![image])
    }
}

/// Always fails, like a host without a browser.
pub struct BrokenBrowser;

#[async_trait]
impl Screenshotter for BrokenBrowser {
    async fn capture(&self, _page: &Path, _scratch: &Path) -> report::Result<Vec<PathBuf>> {
        Err(ReportError::Screenshot("browser not installed".into()))
    }
}
