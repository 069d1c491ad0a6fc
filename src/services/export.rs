//! PDF export of a rendered presentation.
//!
//! DESIGN
//! ======
//! The web app's `/pdf-maker` page lays out every slide of a presentation at
//! 1280x720. Export renders that page once as a DOM snapshot to make sure the
//! slides actually loaded (no error banner, slide wrapper present, skeleton
//! placeholders gone), then prints it and stores the bytes under
//! `{APP_DATA_DIRECTORY}/exports/`.
//!
//! ERROR HANDLING
//! ==============
//! A failed first render is retried once with the longer retry timeout. Any
//! other failure aborts the export without writing a file.

use std::path::{Path, PathBuf};

use scraper::{ElementRef, Html};
use tracing::{info, warn};

use super::dom::{SelectorError, page_url, selector};
use crate::browser::{PageRenderer, RenderError};
use crate::config::ServerConfig;

pub const DEFAULT_TITLE: &str = "presentation";
const PDF_MAGIC: &[u8] = b"%PDF";
const PDF_EXTENSION: &str = ".pdf";
const MAX_FILENAME_BYTES: usize = 255;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Missing Presentation ID")]
    MissingId,
    #[error("App data directory not found")]
    NoDataDirectory,
    #[error("invalid frontend URL: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Page shows error state: {0}")]
    ErrorState(String),
    #[error("Presentation slides not found: {0}")]
    SlidesNotReady(&'static str),
    #[error("renderer did not return a PDF document")]
    NotPdf,
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Render, verify, print and store one presentation. Returns the written path.
///
/// # Errors
///
/// See [`ExportError`]; nothing is written unless every step succeeds.
pub async fn export_pdf(
    config: &ServerConfig,
    renderer: &dyn PageRenderer,
    presentation_id: &str,
    title: Option<&str>,
) -> Result<PathBuf, ExportError> {
    let presentation_id = presentation_id.trim();
    if presentation_id.is_empty() {
        return Err(ExportError::MissingId);
    }
    let data_dir = config.app_data_directory.as_deref().ok_or(ExportError::NoDataDirectory)?;
    let url = page_url(&config.frontend_base_url, "/pdf-maker", "id", presentation_id)?;
    let browser = &config.browser;

    let dom = match renderer.dump_dom(url.as_str(), browser.navigation_timeout).await {
        Ok(dom) => dom,
        Err(e) => {
            warn!(%presentation_id, error = %e, "pdf-maker render failed; retrying with longer timeout");
            renderer.dump_dom(url.as_str(), browser.retry_timeout).await?
        }
    };
    let slides = verify_slides(&dom)?;
    info!(%presentation_id, slides, "slides rendered; printing");

    let pdf = renderer.print_pdf(url.as_str(), browser.retry_timeout).await?;
    if !pdf.starts_with(PDF_MAGIC) {
        return Err(ExportError::NotPdf);
    }

    let path = export_path(data_dir, title.unwrap_or(DEFAULT_TITLE));
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &pdf).await?;
    info!(%presentation_id, path = %path.display(), bytes = pdf.len(), "presentation exported");
    Ok(path)
}

/// Check a pdf-maker DOM snapshot and count the rendered slides.
///
/// # Errors
///
/// [`ExportError::ErrorState`] when the page shows an alert, otherwise
/// [`ExportError::SlidesNotReady`] unless the slide wrapper holds at least
/// one slide and no skeleton placeholders.
pub fn verify_slides(html: &str) -> Result<usize, ExportError> {
    let doc = Html::parse_document(html);

    if let Some(alert) = doc.select(&selector(r#"div[role="alert"]"#)?).next() {
        let text = alert.text().collect::<String>();
        return Err(ExportError::ErrorState(text.trim().to_owned()));
    }

    let wrapper = doc
        .select(&selector("#presentation-slides-wrapper")?)
        .next()
        .ok_or(ExportError::SlidesNotReady("slides wrapper missing"))?;
    if wrapper.select(&selector(".bg-gray-400")?).next().is_some() {
        return Err(ExportError::SlidesNotReady("skeleton placeholders still rendered"));
    }

    // Slides sit two `div` levels below the wrapper.
    let slides = child_divs(wrapper).flat_map(child_divs).count();
    if slides == 0 {
        return Err(ExportError::SlidesNotReady("no slides rendered"));
    }
    Ok(slides)
}

fn child_divs(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "div")
}

/// `{data_dir}/exports/{sanitized title}.pdf`
#[must_use]
pub fn export_path(data_dir: &Path, title: &str) -> PathBuf {
    data_dir.join("exports").join(format!("{}{PDF_EXTENSION}", sanitize_filename(title)))
}

/// Make `name` safe as a file stem on common filesystems.
///
/// Removes path separators, reserved characters and control characters,
/// trims surrounding whitespace and trailing dots, and keeps the stem short
/// enough that stem plus `.pdf` fits in 255 bytes. Falls back to
/// `presentation` when nothing usable remains.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') && !c.is_control())
        .collect();

    let mut stem = trim_stem(&cleaned);
    let max = MAX_FILENAME_BYTES - PDF_EXTENSION.len();
    if stem.len() > max {
        let mut end = max;
        while !stem.is_char_boundary(end) {
            end -= 1;
        }
        stem = trim_stem(&stem[..end]);
    }

    if stem.is_empty() { DEFAULT_TITLE.to_owned() } else { stem.to_owned() }
}

fn trim_stem(s: &str) -> &str {
    s.trim().trim_end_matches(|c: char| c == '.' || c.is_whitespace())
}

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;
