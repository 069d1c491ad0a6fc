//! Helpers for inspecting rendered DOM snapshots.

use scraper::Selector;
use url::Url;

#[derive(Debug, thiserror::Error)]
#[error("invalid selector `{css}`: {message}")]
pub struct SelectorError {
    css: &'static str,
    message: String,
}

pub fn selector(css: &'static str) -> Result<Selector, SelectorError> {
    Selector::parse(css).map_err(|e| SelectorError { css, message: e.to_string() })
}

/// `{base}{path}` with one query pair, the value form-encoded.
pub fn page_url(base: &str, path: &str, key: &str, value: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?.join(path)?;
    url.query_pairs_mut().append_pair(key, value);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_encodes_value() {
        let url = page_url("http://localhost:3000", "/schema", "group", "my group&x").expect("url");
        assert_eq!(url.as_str(), "http://localhost:3000/schema?group=my+group%26x");
    }

    #[test]
    fn selector_reports_bad_css() {
        let err = selector("div[").expect_err("unterminated attribute");
        assert!(err.to_string().contains("div["));
    }
}
