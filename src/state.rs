//! Observable request state as a single state machine.
//!
//! ```text
//! Idle ──begin──▶ Loading(status) ──complete──▶ Complete
//!                   │    ▲
//!                   │    └──progress
//!                   ├──fail────────────────────▶ Failed(message)
//!                   └──cancel──────────────────▶ Cancelled
//! ```
//!
//! The terminal states are sticky: once `Complete`, `Failed` or `Cancelled`
//! is reached every later transition is ignored, so a late event can never
//! resurrect a finished request or put it back into `Loading`.

use crate::config::SummaryMode;
use crate::error::{ChunkError, DigestError};
use crate::event::{CompletePayload, ProgressEvent, ProgressStatus, SummaryDocument, SummarySource};
use crate::progress::{describe_completion, ProgressCallback};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use tracing::{debug, error, info, warn};

/// A finished summary with the backend's provenance tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSummary {
    pub document: SummaryDocument,
    pub source: Option<SummarySource>,
}

/// Snapshot of a summary request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SummaryState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Request in flight; holds the latest progress snapshot.
    Loading(ProgressStatus),
    /// The `complete` event arrived.
    Complete(CompletedSummary),
    /// The request failed; holds the user-facing message.
    Failed(String),
    /// The caller stopped observing the request.
    Cancelled,
}

impl SummaryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SummaryState::Loading(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SummaryState::Complete(_) | SummaryState::Failed(_) | SummaryState::Cancelled
        )
    }

    /// Latest progress snapshot, while loading.
    pub fn status(&self) -> Option<&ProgressStatus> {
        match self {
            SummaryState::Loading(status) => Some(status),
            _ => None,
        }
    }

    /// User-facing error message, when failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            SummaryState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Convert a terminal snapshot into a `Result`.
    pub fn into_result(self) -> Result<CompletedSummary, DigestError> {
        match self {
            SummaryState::Complete(summary) => Ok(summary),
            SummaryState::Failed(message) => Err(DigestError::StreamFailed(message)),
            SummaryState::Cancelled => Err(DigestError::Cancelled),
            SummaryState::Idle | SummaryState::Loading(_) => Err(DigestError::Internal(
                "summary request has not finished".to_string(),
            )),
        }
    }
}

/// Owns the [`SummaryState`] of one request and forwards transitions to the
/// configured progress callback.
pub struct SummaryTracker {
    state: SummaryState,
    mode: SummaryMode,
    callback: Option<ProgressCallback>,
}

impl SummaryTracker {
    /// `mode` decides the fallback title when the backend omits one.
    pub fn new(mode: SummaryMode, callback: Option<ProgressCallback>) -> Self {
        Self {
            state: SummaryState::Idle,
            mode,
            callback,
        }
    }

    pub fn state(&self) -> &SummaryState {
        &self.state
    }

    pub fn into_state(self) -> SummaryState {
        self.state
    }

    /// `Idle → Loading` with the initial snapshot.
    pub fn begin(&mut self) {
        if !matches!(self.state, SummaryState::Idle) {
            return;
        }
        let status = ProgressStatus::default();
        if let Some(ref cb) = self.callback {
            cb.on_progress(&status);
        }
        self.state = SummaryState::Loading(status);
    }

    /// Apply one decoded event.
    ///
    /// Returns `ControlFlow::Break` once the request reached a terminal
    /// state and the caller must stop reading.
    pub fn apply(&mut self, event: ProgressEvent) -> ControlFlow<()> {
        if self.state.is_terminal() {
            return ControlFlow::Break(());
        }
        match event {
            ProgressEvent::Progress(status) => {
                debug!(
                    "progress: {} {}/{} {}",
                    status.stage, status.current_chunk, status.total_chunks, status.message
                );
                if let Some(ref cb) = self.callback {
                    cb.on_progress(&status);
                }
                self.state = SummaryState::Loading(status);
                ControlFlow::Continue(())
            }
            ProgressEvent::Complete(payload) => {
                self.complete(payload);
                ControlFlow::Break(())
            }
            ProgressEvent::Unknown => {
                debug!("ignoring event with unrecognised type");
                ControlFlow::Continue(())
            }
        }
    }

    /// Record a skipped value without changing state.
    pub fn skip(&mut self, err: ChunkError) {
        warn!("Skipping stream value: {}", err);
        if let Some(ref cb) = self.callback {
            cb.on_chunk_skipped(&err);
        }
    }

    /// `* → Failed(message)` unless already terminal.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.state.is_terminal() {
            return;
        }
        let message = message.into();
        error!("Summary request failed: {}", message);
        if let Some(ref cb) = self.callback {
            cb.on_failed(message.clone());
        }
        self.state = SummaryState::Failed(message);
    }

    /// `* → Cancelled` unless already terminal. Fires no callback: nobody is
    /// observing any more.
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        info!("Summary request cancelled");
        self.state = SummaryState::Cancelled;
    }

    /// Called when the body ended; fails the request if no `complete` event
    /// was seen.
    pub fn finish_stream(&mut self) {
        if !self.state.is_terminal() {
            self.fail("Summary stream ended before the summary was complete");
        }
    }

    fn complete(&mut self, payload: CompletePayload) {
        let title = payload
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.mode.default_title().to_string());
        let summary = CompletedSummary {
            document: SummaryDocument {
                content: payload.summary,
                title,
            },
            source: payload.source,
        };
        info!("Summary complete: {}", describe_completion(&summary));
        if let Some(ref cb) = self.callback {
            cb.on_complete(&summary);
        }
        self.state = SummaryState::Complete(summary);
    }
}
