use super::*;
use crate::config::BrowserConfig;
use crate::services::testing::ScriptedRenderer;

use serde_json::json;
use std::time::Duration;

fn config() -> ServerConfig {
    ServerConfig {
        port: 0,
        app_data_directory: None,
        frontend_base_url: "http://web:3000".into(),
        browser: BrowserConfig {
            executable: "unused".into(),
            navigation_timeout: Duration::from_secs(1),
            retry_timeout: Duration::from_secs(2),
            render_budget: Duration::from_millis(10),
            scratch_dir: std::env::temp_dir(),
        },
    }
}

fn schema_page(layouts: &str, settings: Option<&str>) -> String {
    let layouts = layouts.replace('"', "&quot;");
    let settings = settings.map_or(String::new(), |s| format!(r#" data-settings="{}""#, s.replace('"', "&quot;")));
    format!(r#"<html><body><div id="root"><div data-layouts="{layouts}"{settings}></div></div></body></html>"#)
}

#[test]
fn parse_manifest_maps_layout_fields() {
    let layouts = r#"[{"id":"intro","name":"Intro","description":"Opening","json_schema":{"type":"object"},"extra":1}]"#;
    let manifest = parse_manifest("general", &schema_page(layouts, Some(r#"{"ordered":true}"#))).expect("manifest");

    assert_eq!(manifest.name, "general");
    assert!(manifest.ordered);
    assert_eq!(manifest.slides.len(), 1);
    assert_eq!(
        serde_json::to_value(&manifest).expect("serialize"),
        json!({
            "name": "general",
            "ordered": true,
            "slides": [{"id": "intro", "name": "Intro", "description": "Opening", "json_schema": {"type": "object"}}]
        })
    );
}

#[test]
fn missing_settings_default_to_unordered() {
    let manifest = parse_manifest("g", &schema_page("[]", None)).expect("manifest");
    assert!(!manifest.ordered);
    assert!(manifest.slides.is_empty());
}

#[test]
fn unparsable_attributes_degrade() {
    let manifest = parse_manifest("g", &schema_page("[{broken", Some("{nope"))).expect("manifest");
    assert!(manifest.slides.is_empty());
    assert!(!manifest.ordered);
}

#[test]
fn absent_layout_fields_are_omitted() {
    let manifest = parse_manifest("g", &schema_page(r#"[{"id":"a"}]"#, None)).expect("manifest");
    assert_eq!(serde_json::to_value(&manifest.slides[0]).expect("serialize"), json!({"id": "a"}));
}

#[test]
fn page_without_layouts_element_fails() {
    let err = parse_manifest("g", "<html><body>Loading…</body></html>").expect_err("no element");
    assert!(matches!(err, TemplateError::LayoutsNotFound));
}

#[tokio::test]
async fn fetch_manifest_renders_encoded_schema_url() {
    let renderer = ScriptedRenderer::dom(&schema_page(r#"[{"id":"x"}]"#, None));
    let manifest = fetch_manifest(&config(), &renderer, "my group").await.expect("manifest");

    assert_eq!(manifest.slides.len(), 1);
    assert_eq!(
        renderer.dom_calls(),
        vec![("http://web:3000/schema?group=my+group".to_owned(), Duration::from_secs(2))]
    );
}

#[tokio::test]
async fn fetch_manifest_rejects_blank_group() {
    let renderer = ScriptedRenderer::new(Vec::new(), Ok(Vec::new()));
    let err = fetch_manifest(&config(), &renderer, " ").await.expect_err("blank");
    assert!(matches!(err, TemplateError::MissingGroup));
    assert!(renderer.dom_calls().is_empty());
}

#[tokio::test]
async fn fetch_manifest_propagates_render_failure() {
    let renderer = ScriptedRenderer::new(vec![Err(RenderError::Timeout(Duration::from_secs(2)))], Ok(Vec::new()));
    let err = fetch_manifest(&config(), &renderer, "g").await.expect_err("render fails");
    assert!(matches!(err, TemplateError::Render(_)));
}
