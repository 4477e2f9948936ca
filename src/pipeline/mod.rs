//! Pipeline stages for turning a video URL into a summary document.
//!
//! Each submodule implements exactly one step, so each is testable without
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ request ──▶ frame ──▶ (state tracker) ──▶ postprocess
//! (URL/route) (HTTP POST) (bytes → events)           (markup cleanup)
//! ```
//!
//! 1. [`input`]   — validate and canonicalise the video URL or decode a
//!    `/summary/...` route
//! 2. [`request`] — POST the request; the only stage with network I/O
//! 3. [`frame`]   — buffer body bytes and split them into JSON events,
//!    skipping malformed values
//! 4. [`postprocess`] — strip Markdown markup before the text is laid out

pub mod frame;
pub mod input;
pub mod postprocess;
pub mod request;
