//! Error types for the yt-digest library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DigestError`] — **Fatal**: the user action cannot complete (malformed
//!   video URL, backend rejected the request, transport dropped, PDF could
//!   not be written). Surfaced once; nothing is retried.
//!
//! * [`ChunkError`] — **Non-fatal**: one value in the response body could not
//!   be decoded. The consumer logs it, reports it to the progress callback and
//!   keeps reading, so a single garbled value never hides a later `complete`
//!   event.

use std::path::PathBuf;
use thiserror::Error;

/// Message shown when the backend gives no usable error description.
pub const GENERIC_FAILURE: &str = "An error occurred while generating the summary";

/// Message shown when a non-2xx JSON body has no `error` field.
pub const SUMMARY_FAILED: &str = "Failed to generate summary";

/// All fatal errors returned by the yt-digest library.
#[derive(Debug, Error)]
pub enum DigestError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input is not a recognisable YouTube video URL.
    #[error("Invalid YouTube URL: '{input}'")]
    InvalidVideoUrl { input: String },

    /// A `/summary/...` route could not be decoded.
    #[error("Invalid summary route '{route}': {reason}")]
    InvalidRoute { route: String, reason: String },

    // ── Request errors ────────────────────────────────────────────────────
    /// The HTTP request could not be sent (DNS, connect, TLS, timeout).
    #[error("Request to '{endpoint}' failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    /// The backend answered with a non-2xx status.
    ///
    /// `message` is the body's `error` field when present, otherwise one of
    /// the generic messages above.
    #[error("{message}")]
    ServerError { status: u16, message: String },

    /// The response body broke off mid-stream or ended before a `complete`
    /// event arrived.
    #[error("{0}")]
    StreamFailed(String),

    /// The caller cancelled the request before it finished.
    #[error("Summary request was cancelled")]
    Cancelled,

    // ── Output errors ─────────────────────────────────────────────────────
    /// Layout or PDF serialisation failed.
    #[error("Failed to generate PDF: {0}")]
    PdfGenerationFailed(String),

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DigestError {
    /// The text shown to the user for this failure.
    ///
    /// Server and stream errors already carry the message the backend (or
    /// the transport) produced; everything else uses its `Display` form.
    pub fn user_message(&self) -> String {
        match self {
            DigestError::ServerError { message, .. } => message.clone(),
            DigestError::StreamFailed(message) => message.clone(),
            DigestError::RequestFailed { reason, .. } if reason.is_empty() => {
                GENERIC_FAILURE.to_string()
            }
            other => other.to_string(),
        }
    }
}

/// A non-fatal error for a single value in the event stream.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum ChunkError {
    /// The bytes were not valid JSON.
    #[error("Malformed JSON in stream: {detail}")]
    Malformed { detail: String, skipped_bytes: usize },

    /// Valid JSON, but not shaped like any known event.
    #[error("Unrecognised event: {detail}")]
    InvalidEvent { detail: String },
}
