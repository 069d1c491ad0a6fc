//! Server configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_BROWSER_EXECUTABLE: &str = "chromium";
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_RETRY_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_RENDER_BUDGET_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Chromium-compatible executable, by name or path.
    pub executable: String,
    /// Per-call limit for the first page render.
    pub navigation_timeout: Duration,
    /// Limit for the single retry after a failed render.
    pub retry_timeout: Duration,
    /// Virtual time the page gets to hydrate and fetch before capture.
    pub render_budget: Duration,
    /// Where printed PDFs land before being read back.
    pub scratch_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Root for exported files. Export is refused while unset.
    pub app_data_directory: Option<PathBuf>,
    /// Origin of the web app whose pages are rendered.
    pub frontend_base_url: String,
    pub browser: BrowserConfig,
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `APP_DATA_DIRECTORY`: export root, unset disables export
    /// - `FRONTEND_BASE_URL`: default `http://localhost:3000`
    /// - `BROWSER_EXECUTABLE_PATH`, falling back to `PUPPETEER_EXECUTABLE_PATH`:
    ///   default `chromium`
    /// - `BROWSER_NAVIGATION_TIMEOUT_SECS`: default 60
    /// - `BROWSER_RETRY_TIMEOUT_SECS`: default 120
    /// - `BROWSER_RENDER_BUDGET_MS`: default 10000
    #[must_use]
    pub fn from_env() -> Self {
        let app_data_directory = non_empty_var("APP_DATA_DIRECTORY").map(PathBuf::from);
        let frontend_base_url = non_empty_var("FRONTEND_BASE_URL")
            .unwrap_or_else(|| DEFAULT_FRONTEND_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let executable = non_empty_var("BROWSER_EXECUTABLE_PATH")
            .or_else(|| non_empty_var("PUPPETEER_EXECUTABLE_PATH"))
            .unwrap_or_else(|| DEFAULT_BROWSER_EXECUTABLE.to_owned());

        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            app_data_directory,
            frontend_base_url,
            browser: BrowserConfig {
                executable,
                navigation_timeout: Duration::from_secs(env_parse(
                    "BROWSER_NAVIGATION_TIMEOUT_SECS",
                    DEFAULT_NAVIGATION_TIMEOUT_SECS,
                )),
                retry_timeout: Duration::from_secs(env_parse("BROWSER_RETRY_TIMEOUT_SECS", DEFAULT_RETRY_TIMEOUT_SECS)),
                render_budget: Duration::from_millis(env_parse("BROWSER_RENDER_BUDGET_MS", DEFAULT_RENDER_BUDGET_MS)),
                scratch_dir: std::env::temp_dir(),
            },
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
