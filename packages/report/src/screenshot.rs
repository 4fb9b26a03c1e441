use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use common::config::BrowserConfig;
use futures::StreamExt;
use tracing::{debug, info};

use crate::error::{ReportError, Result};

/// Browser start-up, page load and every capture share this budget.
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(60);

/// Pause after scrolling so transitions and lazy content settle.
const SCROLL_SETTLE: Duration = Duration::from_millis(300);

/// Upper bound on viewport captures for a single page.
const MAX_CAPTURES: usize = 20;

const PAGE_HEIGHT: &str = "Math.max(document.body ? document.body.scrollHeight : 0, \
                           document.documentElement.scrollHeight)";

/// Renders a markup file to one or more PNG files.
#[async_trait]
pub trait Screenshotter: Send + Sync {
    /// Capture `page`, writing images under `scratch`. Callers delete the
    /// returned files once embedded.
    async fn capture(&self, page: &Path, scratch: &Path) -> Result<Vec<PathBuf>>;
}

/// Chromium-compatible browser driven over the DevTools protocol. Long
/// pages are captured one viewport at a time, top to bottom.
#[derive(Debug, Clone)]
pub struct HeadlessBrowser {
    binary: String,
    width: u32,
    height: u32,
}

impl HeadlessBrowser {
    pub fn new(binary: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            binary: binary.into(),
            width,
            height,
        }
    }

    /// `None` when screenshots are disabled.
    pub fn from_config(config: &BrowserConfig) -> Option<Self> {
        config.enabled.then(|| {
            Self::new(
                config.binary.clone(),
                config.viewport_width,
                config.viewport_height,
            )
        })
    }

    async fn launch_and_capture(
        &self,
        executable: &Path,
        profile: &Path,
        page: &Path,
        scratch: &Path,
    ) -> Result<Vec<PathBuf>> {
        let config = LaunchConfig::builder()
            .new_headless_mode()
            .chrome_executable(executable)
            .user_data_dir(profile)
            .viewport(Viewport {
                width: self.width,
                height: self.height,
                device_scale_factor: Some(1.0),
                emulating_mobile: false,
                is_landscape: false,
                has_touch: false,
            })
            .no_sandbox()
            .args([
                "--disable-gpu",
                "--hide-scrollbars",
                "--no-first-run",
                "--no-default-browser-check",
            ])
            .build()
            .map_err(|e| failure("failed to configure browser", e))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| failure("failed to launch browser", e))?;
        let events = tokio::spawn(async move { while let Some(_event) = handler.next().await {} });

        let images = match browser.new_page("about:blank").await {
            Ok(tab) => self.capture_scrolled(&tab, page, scratch).await,
            Err(e) => Err(failure("failed to open tab", e)),
        };

        if let Err(err) = browser.close().await {
            debug!(error = %err, "Browser did not close cleanly");
        }
        if let Err(err) = browser.wait().await {
            debug!(error = %err, "Failed to reap browser process");
        }
        events.abort();
        images
    }

    async fn capture_scrolled(&self, tab: &Page, page: &Path, scratch: &Path) -> Result<Vec<PathBuf>> {
        tab.goto(file_url(page))
            .await
            .map_err(|e| failure("navigation failed", e))?;

        let page_height = evaluate_pixels(tab, PAGE_HEIGHT).await?;
        let viewport_height = evaluate_pixels(tab, "window.innerHeight")
            .await
            .unwrap_or(self.height);
        let positions = scroll_positions(page_height, viewport_height);
        debug!(page_height, viewport_height, captures = positions.len(), "Scrolling page");

        let stem = page
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "page".to_string());
        let run = uuid::Uuid::new_v4().simple();

        let mut images = Vec::with_capacity(positions.len());
        for (index, offset) in positions.into_iter().enumerate() {
            let image = scratch.join(format!("{stem}_screenshot_{run}_{index}.png"));
            if let Err(err) = capture_viewport(tab, offset, &image).await {
                discard(&images).await;
                return Err(err);
            }
            images.push(image);
        }
        Ok(images)
    }
}

#[async_trait]
impl Screenshotter for HeadlessBrowser {
    async fn capture(&self, page: &Path, scratch: &Path) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(scratch).await?;
        let page = std::path::absolute(page)?;
        let executable = resolve_executable(&self.binary).ok_or_else(|| {
            ReportError::Screenshot(format!("browser executable `{}` not found", self.binary))
        })?;

        let profile = scratch.join(format!("browser-profile-{}", uuid::Uuid::new_v4().simple()));
        tokio::fs::create_dir_all(&profile).await?;

        info!(page = %page.display(), browser = %executable.display(), "Capturing screenshots");
        let outcome = tokio::time::timeout(
            CAPTURE_TIMEOUT,
            self.launch_and_capture(&executable, &profile, &page, scratch),
        )
        .await;

        if let Err(err) = tokio::fs::remove_dir_all(&profile).await {
            debug!(profile = %profile.display(), error = %err, "Failed to remove browser profile");
        }

        match outcome {
            Ok(images) => images,
            Err(_) => Err(ReportError::Screenshot(format!(
                "timed out after {}s",
                CAPTURE_TIMEOUT.as_secs()
            ))),
        }
    }
}

async fn capture_viewport(tab: &Page, offset: u32, image: &Path) -> Result<()> {
    let scroll = format!("window.scrollTo(0, {offset})");
    tab.evaluate(scroll.as_str())
        .await
        .map_err(|e| failure("scroll failed", e))?;
    tokio::time::sleep(SCROLL_SETTLE).await;

    let png = tab
        .screenshot(
            ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build(),
        )
        .await
        .map_err(|e| failure("capture failed", e))?;
    tokio::fs::write(image, png).await?;
    debug!(image = %image.display(), offset, "Screenshot written");
    Ok(())
}

async fn evaluate_pixels(tab: &Page, expression: &str) -> Result<u32> {
    let value: f64 = tab
        .evaluate(expression)
        .await
        .map_err(|e| failure("script failed", e))?
        .into_value()
        .map_err(|e| failure("unexpected script result", e))?;
    Ok(value.max(0.0).round() as u32)
}

async fn discard(images: &[PathBuf]) {
    for image in images {
        if let Err(err) = tokio::fs::remove_file(image).await {
            debug!(image = %image.display(), error = %err, "Failed to remove partial capture");
        }
    }
}

fn failure(context: &str, err: impl Display) -> ReportError {
    ReportError::Screenshot(format!("{context}: {err}"))
}

/// Scroll offsets that cover a page of `page_height` pixels. The last
/// offset shows the bottom of the page exactly.
fn scroll_positions(page_height: u32, viewport_height: u32) -> Vec<u32> {
    if viewport_height == 0 || page_height <= viewport_height {
        return vec![0];
    }
    let bottom = page_height - viewport_height;
    let mut positions: Vec<u32> = (0..bottom)
        .step_by(viewport_height as usize)
        .take(MAX_CAPTURES - 1)
        .collect();
    positions.push(bottom);
    positions
}

/// Explicit paths are used as given; bare names are looked up on `PATH`.
fn resolve_executable(binary: &str) -> Option<PathBuf> {
    let path = Path::new(binary);
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }
    let name = if cfg!(windows) && path.extension().is_none() {
        format!("{binary}.exe")
    } else {
        binary.to_string()
    };
    let search = std::env::var_os("PATH")?;
    std::env::split_paths(&search)
        .map(|dir| dir.join(&name))
        .find(|candidate| candidate.is_file())
}

/// `file://` URL for an absolute path.
pub fn file_url(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let encoded = raw.replace('%', "%25").replace(' ', "%20").replace('#', "%23");
    if cfg!(windows) {
        format!("file:///{}", encoded.replace('\\', "/"))
    } else {
        format!("file://{encoded}")
    }
}
