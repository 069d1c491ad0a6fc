//! Layout manifest extraction for a template group.
//!
//! The web app's `/schema?group=` page renders an element carrying the
//! group's layouts as JSON in `data-layouts` and its settings in
//! `data-settings`. This service renders that page and turns the attributes
//! into a [`TemplateManifest`].

use scraper::Html;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::dom::{SelectorError, page_url, selector};
use crate::browser::{PageRenderer, RenderError};
use crate::config::ServerConfig;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Missing group name")]
    MissingGroup,
    #[error("invalid frontend URL: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("no element with data-layouts on the schema page")]
    LayoutsNotFound,
    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// One layout as exposed by the manifest. Absent fields stay absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<Value>,
}

impl LayoutSummary {
    fn from_value(layout: &Value) -> Self {
        let field = |key: &str| layout.get(key).cloned();
        Self { id: field("id"), name: field("name"), description: field("description"), json_schema: field("json_schema") }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateManifest {
    pub name: String,
    pub ordered: bool,
    pub slides: Vec<LayoutSummary>,
}

/// Render the schema page for `group` and build its manifest.
///
/// # Errors
///
/// [`TemplateError::MissingGroup`] for a blank group, otherwise render
/// failures and a page without a `data-layouts` element.
pub async fn fetch_manifest(
    config: &ServerConfig,
    renderer: &dyn PageRenderer,
    group: &str,
) -> Result<TemplateManifest, TemplateError> {
    if group.trim().is_empty() {
        return Err(TemplateError::MissingGroup);
    }
    let url = page_url(&config.frontend_base_url, "/schema", "group", group)?;
    let dom = renderer.dump_dom(url.as_str(), config.browser.retry_timeout).await?;
    let manifest = parse_manifest(group, &dom)?;
    info!(%group, layouts = manifest.slides.len(), ordered = manifest.ordered, "template manifest extracted");
    Ok(manifest)
}

/// Build the manifest from a schema page DOM snapshot.
///
/// Unparsable layouts become an empty list and unparsable settings count as
/// absent; both are logged.
///
/// # Errors
///
/// [`TemplateError::LayoutsNotFound`] when no element carries `data-layouts`.
pub fn parse_manifest(group: &str, html: &str) -> Result<TemplateManifest, TemplateError> {
    let doc = Html::parse_document(html);
    let element = doc
        .select(&selector("[data-layouts]")?)
        .next()
        .ok_or(TemplateError::LayoutsNotFound)?;

    let layouts = serde_json::from_str::<Vec<Value>>(attr_or(element.value().attr("data-layouts"), "[]"))
        .unwrap_or_else(|e| {
            warn!(%group, error = %e, "failed to parse data-layouts");
            Vec::new()
        });
    let settings = serde_json::from_str::<Value>(attr_or(element.value().attr("data-settings"), "null"))
        .unwrap_or_else(|e| {
            warn!(%group, error = %e, "failed to parse data-settings");
            Value::Null
        });

    Ok(TemplateManifest {
        name: group.to_owned(),
        ordered: settings.get("ordered").and_then(Value::as_bool).unwrap_or(false),
        slides: layouts.iter().map(LayoutSummary::from_value).collect(),
    })
}

/// Attribute value, or `fallback` when missing or empty.
fn attr_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(fallback)
}

#[cfg(test)]
#[path = "template_test.rs"]
mod template_test;
