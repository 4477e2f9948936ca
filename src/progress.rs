//! Progress-callback trait for summary stream events.
//!
//! Inject an [`Arc<dyn SummaryProgressCallback>`] via
//! [`crate::config::SummaryConfigBuilder::progress_callback`] to observe the
//! request as it runs: each state transition of the
//! [`crate::state::SummaryTracker`] is forwarded here in decode order.
//!
//! # Example
//!
//! ```rust
//! use yt_digest::{ProgressStatus, SummaryConfig, SummaryProgressCallback};
//! use std::sync::{Arc, Mutex};
//!
//! struct StageLog {
//!     stages: Mutex<Vec<String>>,
//! }
//!
//! impl SummaryProgressCallback for StageLog {
//!     fn on_progress(&self, status: &ProgressStatus) {
//!         self.stages.lock().unwrap().push(status.stage.to_string());
//!     }
//! }
//!
//! let log = Arc::new(StageLog { stages: Mutex::new(vec![]) });
//! let config = SummaryConfig::builder()
//!     .progress_callback(log as Arc<dyn SummaryProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::ChunkError;
use crate::event::{ProgressStatus, SummarySource};
use crate::state::CompletedSummary;
use std::sync::Arc;

/// Called by the stream consumer as the summary request progresses.
///
/// Implementations must be `Send + Sync` so the config can be shared with a
/// spawned task. All methods have default no-op implementations so callers
/// only override what they care about.
pub trait SummaryProgressCallback: Send + Sync {
    /// Called once, right before the request is sent.
    ///
    /// # Arguments
    /// * `url` — canonical video URL being summarised
    fn on_request_start(&self, url: &str) {
        let _ = url;
    }

    /// Called for every decoded `progress` event (and once with the initial
    /// snapshot when loading begins).
    fn on_progress(&self, status: &ProgressStatus) {
        let _ = status;
    }

    /// Called when a value in the body was skipped.
    fn on_chunk_skipped(&self, error: &ChunkError) {
        let _ = error;
    }

    /// Called once when the `complete` event arrives.
    fn on_complete(&self, summary: &CompletedSummary) {
        let _ = summary;
    }

    /// Called once when the request fails.
    ///
    /// # Arguments
    /// * `message` — user-facing error text
    fn on_failed(&self, message: String) {
        let _ = message;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl SummaryProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SummaryConfig`].
pub type ProgressCallback = Arc<dyn SummaryProgressCallback>;

/// Short description of a completed summary for log lines.
pub(crate) fn describe_completion(summary: &CompletedSummary) -> String {
    let source = match summary.source {
        Some(SummarySource::Youtube) => "youtube",
        Some(SummarySource::Cache) => "cache",
        None => "unknown source",
    };
    format!(
        "'{}' ({} chars, {})",
        summary.document.title,
        summary.document.content.len(),
        source
    )
}
