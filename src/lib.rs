//! # yt-digest
//!
//! Request AI-generated summaries of YouTube videos from a summarization
//! backend, follow their progress as it streams in, and export the result as
//! a paginated PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL or /summary route
//!  │
//!  ├─ 1. Input    validate + canonicalise the video URL
//!  ├─ 2. Request  POST {url, language, mode, aiModel}
//!  ├─ 3. Frame    body bytes → JSON events (malformed values skipped)
//!  ├─ 4. Track    progress snapshots → Complete | Failed | Cancelled
//!  ├─ 5. Clean    strip Markdown markup from the summary
//!  ├─ 6. Layout   title, metadata, sections, page breaks, footers
//!  └─ 7. Write    lopdf serialisation, atomic save
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use yt_digest::{export_pdf, resolve_input, summarize, PdfLayout, RenderMeta, SummaryConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SummaryConfig::default();
//!     let request = resolve_input("https://youtu.be/dQw4w9WgXcQ", &config)?;
//!     let summary = summarize(&request, &config, CancellationToken::new()).await?;
//!     println!("{}", summary.document.content);
//!
//!     let meta = RenderMeta {
//!         language_name: "English".into(),
//!         source: summary.source,
//!         mode: request.mode,
//!         generated_at: chrono::Local::now(),
//!     };
//!     let path = export_pdf(&summary.document, &meta, &PdfLayout::default(), ".")?;
//!     eprintln!("saved {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ytdigest` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! yt-digest = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod state;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    language_code, language_display_name, AiModel, PdfLayout, SummaryConfig,
    SummaryConfigBuilder, SummaryMode, AVAILABLE_LANGUAGES, DEFAULT_ENDPOINT,
};
pub use error::{ChunkError, DigestError};
pub use event::{ProgressEvent, ProgressStatus, Stage, SummaryDocument, SummarySource};
pub use export::{export_pdf, render_pdf};
pub use pipeline::frame::EventFramer;
pub use pipeline::input::{canonical_video_url, resolve_input, SummaryRoute};
pub use pipeline::postprocess::{clean_for_pdf, strip_markup};
pub use pipeline::request::SummaryRequest;
pub use progress::{NoopProgressCallback, ProgressCallback, SummaryProgressCallback};
pub use render::filename::pdf_filename;
pub use render::layout::{display_title, layout_document, LayoutDocument, RenderMeta};
pub use render::metrics::{text_width, wrap_text, Font};
pub use render::pdf::write_pdf;
pub use state::{CompletedSummary, SummaryState, SummaryTracker};
pub use stream::{consume_events, stream_summary, summarize};
