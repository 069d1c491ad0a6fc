use super::*;
use crate::config::BrowserConfig;
use crate::services::testing::ScriptedRenderer;

use std::time::Duration;

const READY_DOM: &str = r#"<html><body>
<div id="presentation-slides-wrapper">
  <div><div class="slide">one</div></div>
  <div><div class="slide">two</div></div>
</div>
</body></html>"#;

fn config(data_dir: Option<&Path>) -> ServerConfig {
    ServerConfig {
        port: 0,
        app_data_directory: data_dir.map(Path::to_path_buf),
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

// =============================================================================
// sanitize_filename
// =============================================================================

#[test]
fn sanitize_strips_reserved_and_control_characters() {
    assert_eq!(sanitize_filename(r#"Q3: "Plan" <draft>/v2\final|?*"#), "Q3 Plan draftv2final");
    assert_eq!(sanitize_filename("tab\there\u{7}"), "tabhere");
}

#[test]
fn sanitize_trims_whitespace_and_trailing_dots() {
    assert_eq!(sanitize_filename("  Quarterly review. . "), "Quarterly review");
    assert_eq!(sanitize_filename("../../etc/passwd"), "....etcpasswd");
}

#[test]
fn sanitize_falls_back_when_empty() {
    assert_eq!(sanitize_filename(""), "presentation");
    assert_eq!(sanitize_filename(" ... "), "presentation");
    assert_eq!(sanitize_filename("///"), "presentation");
}

#[test]
fn sanitize_caps_length_on_char_boundary() {
    let long = "é".repeat(300);
    let stem = sanitize_filename(&long);
    assert!(stem.len() + ".pdf".len() <= 255);
    assert!(stem.chars().all(|c| c == 'é'));
}

#[test]
fn export_path_lives_under_exports() {
    let path = export_path(Path::new("/data"), "Deck: One");
    assert_eq!(path, PathBuf::from("/data/exports/Deck One.pdf"));
}

// =============================================================================
// verify_slides
// =============================================================================

#[test]
fn verify_counts_grandchild_slides() {
    assert_eq!(verify_slides(READY_DOM).expect("ready"), 2);
}

#[test]
fn verify_rejects_alert() {
    let dom = r#"<div role="alert"> Presentation not found </div>"#;
    let err = verify_slides(dom).expect_err("alert");
    assert!(matches!(err, ExportError::ErrorState(ref text) if text == "Presentation not found"));
}

#[test]
fn verify_rejects_missing_wrapper_and_skeletons() {
    assert!(matches!(verify_slides("<div>loading</div>"), Err(ExportError::SlidesNotReady(_))));

    let skeleton = r#"<div id="presentation-slides-wrapper"><div><div class="bg-gray-400"></div></div></div>"#;
    assert!(matches!(verify_slides(skeleton), Err(ExportError::SlidesNotReady(_))));

    let empty = r#"<div id="presentation-slides-wrapper"><div></div></div>"#;
    assert!(matches!(verify_slides(empty), Err(ExportError::SlidesNotReady(_))));
}

// =============================================================================
// export_pdf
// =============================================================================

#[tokio::test]
async fn export_writes_pdf_under_data_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let renderer = ScriptedRenderer::new(vec![Ok(READY_DOM.into())], Ok(b"%PDF-1.7 body".to_vec()));

    let path = export_pdf(&config(Some(dir.path())), &renderer, "deck 1", Some("Board/Update"))
        .await
        .expect("export");

    assert_eq!(path, dir.path().join("exports").join("BoardUpdate.pdf"));
    assert_eq!(std::fs::read(&path).expect("read"), b"%PDF-1.7 body");
    assert_eq!(renderer.dom_calls(), vec![("http://web:3000/pdf-maker?id=deck+1".to_owned(), Duration::from_secs(1))]);
}

#[tokio::test]
async fn export_retries_render_once_with_retry_timeout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let renderer = ScriptedRenderer::new(
        vec![Err(RenderError::Timeout(Duration::from_secs(1))), Ok(READY_DOM.into())],
        Ok(b"%PDF".to_vec()),
    );

    let path = export_pdf(&config(Some(dir.path())), &renderer, "d", None).await.expect("export");
    assert!(path.ends_with("exports/presentation.pdf"));
    let timeouts: Vec<Duration> = renderer.dom_calls().into_iter().map(|(_, t)| t).collect();
    assert_eq!(timeouts, vec![Duration::from_secs(1), Duration::from_secs(2)]);
}

#[tokio::test]
async fn export_fails_after_second_render_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let renderer = ScriptedRenderer::new(
        vec![
            Err(RenderError::Timeout(Duration::from_secs(1))),
            Err(RenderError::Timeout(Duration::from_secs(2))),
        ],
        Ok(b"%PDF".to_vec()),
    );

    let err = export_pdf(&config(Some(dir.path())), &renderer, "d", None).await.expect_err("fails");
    assert!(matches!(err, ExportError::Render(RenderError::Timeout(_))));
    assert!(!dir.path().join("exports").exists());
}

#[tokio::test]
async fn export_rejects_non_pdf_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let renderer = ScriptedRenderer::new(vec![Ok(READY_DOM.into())], Ok(b"<html>".to_vec()));

    let err = export_pdf(&config(Some(dir.path())), &renderer, "d", None).await.expect_err("not pdf");
    assert!(matches!(err, ExportError::NotPdf));
}

#[tokio::test]
async fn export_validates_inputs_before_rendering() {
    let renderer = ScriptedRenderer::new(Vec::new(), Ok(Vec::new()));

    let err = export_pdf(&config(None), &renderer, "  ", None).await.expect_err("missing id");
    assert!(matches!(err, ExportError::MissingId));

    let err = export_pdf(&config(None), &renderer, "deck", None).await.expect_err("no data dir");
    assert!(matches!(err, ExportError::NoDataDirectory));
    assert!(renderer.dom_calls().is_empty());
}
