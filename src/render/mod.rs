//! PDF rendering of a finished summary.
//!
//! ```text
//! SummaryDocument ──▶ layout ──▶ pdf ──▶ bytes
//!                    (pages of    (lopdf
//!                     elements)    objects)
//! ```
//!
//! 1. [`metrics`]  — Helvetica advance widths, word wrap, `WinAnsi` encoding
//! 2. [`layout`]   — title, metadata line, sections, page breaks, footers
//! 3. [`pdf`]      — content streams and document structure
//! 4. [`filename`] — `<slug>_summary_<timestamp>.pdf`

pub mod filename;
pub mod layout;
pub mod metrics;
pub mod pdf;
