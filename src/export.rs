//! PDF export entry points.
//!
//! [`render_pdf`] turns a summary into PDF bytes in memory; [`export_pdf`]
//! also picks the file name and writes it into a directory. The bytes are
//! produced completely before the file system is touched, and the file is
//! written to a temporary sibling and then renamed into place, so a failure
//! at any step never leaves a partial PDF behind.

use crate::config::PdfLayout;
use crate::error::DigestError;
use crate::event::SummaryDocument;
use crate::render::filename::pdf_filename;
use crate::render::layout::{display_title, layout_document, RenderMeta};
use crate::render::pdf::write_pdf;
use chrono::Utc;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

/// Lay out and serialise `document` as PDF bytes.
///
/// # Errors
/// [`DigestError::InvalidConfig`] for an unusable `layout`,
/// [`DigestError::PdfGenerationFailed`] when serialisation fails.
pub fn render_pdf(
    document: &SummaryDocument,
    meta: &RenderMeta,
    layout: &PdfLayout,
) -> Result<Vec<u8>, DigestError> {
    layout.validate()?;
    let start = Instant::now();
    let pages = layout_document(document, meta, layout);
    let bytes = write_pdf(&pages, layout.compress)?;
    info!(
        "Rendered '{}' to {} pages ({} bytes) in {}ms",
        document.title,
        pages.pages.len(),
        bytes.len(),
        start.elapsed().as_millis()
    );
    Ok(bytes)
}

/// Render `document` and save it in `out_dir` under [`pdf_filename`].
///
/// `out_dir` is created if missing. Returns the path of the written file.
///
/// # Errors
/// Everything [`render_pdf`] returns, plus [`DigestError::OutputWriteFailed`]
/// when the directory or file cannot be written.
pub fn export_pdf(
    document: &SummaryDocument,
    meta: &RenderMeta,
    layout: &PdfLayout,
    out_dir: impl AsRef<Path>,
) -> Result<PathBuf, DigestError> {
    let bytes = render_pdf(document, meta, layout).inspect_err(|e| {
        error!("Error generating PDF: {}", e);
    })?;

    let out_dir = out_dir.as_ref();
    let title = display_title(document, meta.mode);
    let path = out_dir.join(pdf_filename(title, Utc::now()));
    write_atomic(&path, &bytes)?;
    info!("Saved {}", path.display());
    Ok(path)
}

/// Write to a temporary file next to `path`, then rename over it.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DigestError> {
    let fail = |source: std::io::Error| DigestError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir).map_err(fail)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(fail)?;
    tmp.write_all(bytes).map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SummaryMode;
    use chrono::Local;

    fn meta() -> RenderMeta {
        RenderMeta {
            language_name: "English".into(),
            source: None,
            mode: SummaryMode::Video,
            generated_at: Local::now(),
        }
    }

    fn document() -> SummaryDocument {
        SummaryDocument {
            content: "## Overview\n\nA short summary.".into(),
            title: "My Video".into(),
        }
    }

    #[test]
    fn export_writes_single_file_with_derived_name() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let path = export_pdf(&document(), &meta(), &PdfLayout::default(), &out).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("my_video_summary_"), "{name}");
        assert!(name.ends_with(".pdf"));
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
    }

    #[test]
    fn blank_title_names_file_after_default_title() {
        let dir = tempfile::tempdir().unwrap();
        let untitled = SummaryDocument {
            title: "   ".into(),
            ..document()
        };
        let path = export_pdf(&untitled, &meta(), &PdfLayout::default(), dir.path()).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("youtube_video_summary_summary_"), "{name}");
    }

    #[test]
    fn invalid_layout_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = PdfLayout {
            margin: 200.0,
            ..PdfLayout::default()
        };
        let err = export_pdf(&document(), &meta(), &layout, dir.path()).unwrap_err();
        assert!(matches!(err, DigestError::InvalidConfig(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
