//! Client configuration parsed from environment variables.

use std::time::Duration;

use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_STREAM_EVENT: &str = "response";
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3000;
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const PRESENTATION_PATH: [&str; 4] = ["api", "v1", "ppt", "presentation"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin of the backend API, without a trailing slash.
    pub api_base_url: String,
    /// Server-sent event name that carries frame envelopes.
    pub stream_event: String,
    /// Delay before reconnecting when the server did not send `retry:`.
    pub reconnect_delay: Duration,
    /// Consecutive failed (re)connects tolerated before giving up.
    pub max_reconnect_attempts: u32,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            stream_event: DEFAULT_STREAM_EVENT.to_owned(),
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `DECK_API_BASE_URL`: default `http://localhost:3000`
    /// - `DECK_STREAM_EVENT`: default `response`
    /// - `DECK_RECONNECT_DELAY_MS`: default 3000
    /// - `DECK_MAX_RECONNECT_ATTEMPTS`: default 5
    /// - `DECK_CONNECT_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("DECK_API_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let stream_event = std::env::var("DECK_STREAM_EVENT")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_STREAM_EVENT.to_owned());

        Self {
            api_base_url,
            stream_event,
            reconnect_delay: Duration::from_millis(env_parse("DECK_RECONNECT_DELAY_MS", DEFAULT_RECONNECT_DELAY_MS)),
            max_reconnect_attempts: env_parse("DECK_MAX_RECONNECT_ATTEMPTS", DEFAULT_MAX_RECONNECT_ATTEMPTS),
            connect_timeout: Duration::from_secs(env_parse("DECK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)),
        }
    }

    /// Return a copy pointed at a different API origin.
    #[must_use]
    pub fn with_api_base_url(mut self, base_url: &str) -> Self {
        base_url.trim_end_matches('/').clone_into(&mut self.api_base_url);
        self
    }

    /// Event-stream endpoint for one presentation.
    #[must_use]
    pub fn stream_url(&self, presentation_id: &str) -> String {
        self.endpoint(&["stream", presentation_id])
    }

    /// REST endpoint returning an already generated presentation.
    #[must_use]
    pub fn presentation_url(&self, presentation_id: &str) -> String {
        self.endpoint(&[presentation_id])
    }

    /// Append `segments` under the presentation API path, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> String {
        let Ok(mut url) = Url::parse(&self.api_base_url) else {
            // Not a URL at all; the request will fail with a clearer error.
            return format!("{}/{}/{}", self.api_base_url, PRESENTATION_PATH.join("/"), segments.join("/"));
        };
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(PRESENTATION_PATH).extend(segments);
        }
        url.into()
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
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
