//! Wire types for the summarization event stream.
//!
//! Every value the backend writes to the response body is one JSON object
//! tagged by its `type` field:
//!
//! ```text
//! {"type":"progress","currentChunk":2,"totalChunks":5,"stage":"processing","message":"…"}
//! {"type":"complete","summary":"## Overview\n\n…","title":"…","source":"youtube"}
//! ```
//!
//! Exactly one `complete` event ends a well-formed stream. Unknown `type`
//! values decode as [`ProgressEvent::Unknown`] so newer backends do not break
//! older clients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One decoded value from the response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressEvent {
    /// Intermediate progress snapshot.
    Progress(ProgressStatus),
    /// Terminal event carrying the finished summary.
    Complete(CompletePayload),
    /// Any other `type` value.
    #[serde(other)]
    Unknown,
}

/// Pipeline stage reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Analyzing,
    Processing,
    Finalizing,
    Saving,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 4] = [
        Stage::Analyzing,
        Stage::Processing,
        Stage::Finalizing,
        Stage::Saving,
    ];

    /// Human label for the stage checklist.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Analyzing => "Analyzing video content",
            Stage::Processing => "Processing chunks",
            Stage::Finalizing => "Creating final summary",
            Stage::Saving => "Saving to history",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Analyzing => "analyzing",
            Stage::Processing => "processing",
            Stage::Finalizing => "finalizing",
            Stage::Saving => "saving",
        };
        f.write_str(s)
    }
}

/// Payload of a `progress` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStatus {
    pub current_chunk: u32,
    pub total_chunks: u32,
    pub stage: Stage,
    #[serde(default)]
    pub message: String,
}

impl Default for ProgressStatus {
    fn default() -> Self {
        Self {
            current_chunk: 0,
            total_chunks: 0,
            stage: Stage::Analyzing,
            message: "Analyzing video content...".to_string(),
        }
    }
}

impl ProgressStatus {
    /// Completion percentage, `0.0` when the total is not known yet.
    ///
    /// Not clamped: a backend reporting `current > total` yields > 100.
    pub fn percent(&self) -> f64 {
        if self.total_chunks == 0 {
            0.0
        } else {
            f64::from(self.current_chunk) / f64::from(self.total_chunks) * 100.0
        }
    }
}

/// Where the backend got the summary from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    /// Freshly generated from the video's subtitles.
    Youtube,
    /// Served from the backend's cache.
    Cache,
}

impl SummarySource {
    /// Description used in the PDF metadata line.
    pub fn description(self) -> &'static str {
        match self {
            SummarySource::Youtube => "YouTube subtitles",
            SummarySource::Cache => "Cached summary",
        }
    }
}

/// Description for an optional source; empty when the backend sent none.
pub fn source_description(source: Option<SummarySource>) -> &'static str {
    source.map(SummarySource::description).unwrap_or("")
}

/// Payload of a `complete` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletePayload {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SummarySource>,
}

/// The finished summary text and its title.
///
/// Created once when the `complete` event is observed and never mutated
/// afterwards; the PDF renderer borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub content: String,
    pub title: String,
}
