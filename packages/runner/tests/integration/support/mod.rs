use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use common::AppConfig;
use runner::Runner;

/// Whether `program --version` can be launched on this host.
pub fn have(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// Whether the host `python3` can import `module`.
pub fn python_module(module: &str) -> bool {
    Command::new("python3")
        .arg("-c")
        .arg(format!("import {module}"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Skip the calling test when a toolchain program is missing.
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

/// A runner whose build cache lives inside `dir`.
pub fn runner_in(dir: &Path) -> Runner {
    let mut config = AppConfig::default();
    config.cache.dir = dir.join("cache");
    config.run.timeout_secs = 60;
    Runner::new(&config)
}
