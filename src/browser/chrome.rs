//! Chromium driven through its headless command-line modes.
//!
//! DESIGN
//! ======
//! Every call spawns a fresh browser process (`--dump-dom` or
//! `--print-to-pdf`) with a virtual time budget so client-side rendering and
//! data fetches finish before capture. The process is killed if the call
//! times out or its future is dropped.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{PageRenderer, RenderError};
use crate::config::BrowserConfig;

const BASE_FLAGS: &[&str] = &[
    "--headless=new",
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-web-security",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
    "--disable-features=TranslateUI",
    "--disable-ipc-flooding-protection",
    "--disable-extensions",
    "--hide-scrollbars",
    "--window-size=1280,720",
];

/// Cap on stderr carried into errors.
const STDERR_TAIL_BYTES: usize = 2000;

pub struct HeadlessChrome {
    executable: String,
    render_budget: Duration,
    scratch_dir: PathBuf,
}

impl HeadlessChrome {
    #[must_use]
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            render_budget: config.render_budget,
            scratch_dir: config.scratch_dir.clone(),
        }
    }

    fn base_args(&self) -> Vec<String> {
        let mut args: Vec<String> = BASE_FLAGS.iter().map(|f| (*f).to_owned()).collect();
        args.push(format!("--virtual-time-budget={}", self.render_budget.as_millis()));
        args
    }

    pub(crate) fn dump_dom_args(&self, url: &str) -> Vec<String> {
        let mut args = self.base_args();
        args.push("--dump-dom".to_owned());
        args.push(url.to_owned());
        args
    }

    pub(crate) fn print_pdf_args(&self, url: &str, output: &Path) -> Vec<String> {
        let mut args = self.base_args();
        args.push("--no-pdf-header-footer".to_owned());
        args.push(format!("--print-to-pdf={}", output.display()));
        args.push(url.to_owned());
        args
    }

    async fn run(&self, args: Vec<String>, timeout: Duration) -> Result<Vec<u8>, RenderError> {
        debug!(executable = %self.executable, ?args, "spawning browser");
        let child = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RenderError::Launch { executable: self.executable.clone(), source })?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| RenderError::Timeout(timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::Failed { status: output.status.to_string(), stderr: tail(&stderr).to_owned() });
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl PageRenderer for HeadlessChrome {
    async fn dump_dom(&self, url: &str, timeout: Duration) -> Result<String, RenderError> {
        let stdout = self.run(self.dump_dom_args(url), timeout).await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    async fn print_pdf(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, RenderError> {
        let output = self.scratch_dir.join(format!("deck-{}.pdf", Uuid::new_v4()));
        let ran = self.run(self.print_pdf_args(url, &output), timeout).await;
        let bytes = match ran {
            Ok(_) => tokio::fs::read(&output).await.map_err(RenderError::from),
            Err(e) => Err(e),
        };
        if let Err(e) = tokio::fs::remove_file(&output).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %output.display(), error = %e, "failed to remove scratch pdf");
            }
        }
        bytes
    }
}

/// Last `STDERR_TAIL_BYTES` of `text`, cut on a char boundary.
fn tail(text: &str) -> &str {
    if text.len() <= STDERR_TAIL_BYTES {
        return text.trim();
    }
    let mut start = text.len() - STDERR_TAIL_BYTES;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].trim()
}

#[cfg(test)]
#[path = "chrome_test.rs"]
mod chrome_test;
