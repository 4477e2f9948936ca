//! Configuration types for summary requests and PDF export.
//!
//! Request behaviour is controlled through [`SummaryConfig`], built via its
//! [`SummaryConfigBuilder`]; page geometry lives in [`PdfLayout`]. The
//! request-level knobs (`language`, `mode`, `ai_model`) are also the route
//! parameters, and follow the same rule there: missing or unknown values fall
//! back to the default instead of being rejected.

use crate::error::DigestError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Default summarization endpoint (a locally running backend).
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/summarize";

/// Languages offered by the backend, as `(display name, ISO-639-1 code)`.
pub const AVAILABLE_LANGUAGES: &[(&str, &str)] = &[
    ("English", "en"),
    ("Spanish", "es"),
    ("French", "fr"),
    ("German", "de"),
    ("Japanese", "ja"),
    ("Chinese", "zh"),
    ("Korean", "ko"),
    ("Russian", "ru"),
];

/// Display name for a language code; unknown codes show as "English".
pub fn language_display_name(code: &str) -> &'static str {
    AVAILABLE_LANGUAGES
        .iter()
        .find(|(_, c)| c.eq_ignore_ascii_case(code))
        .map(|(name, _)| *name)
        .unwrap_or("English")
}

/// Code for a display name or code, case-insensitive.
pub fn language_code(name_or_code: &str) -> Option<&'static str> {
    AVAILABLE_LANGUAGES
        .iter()
        .find(|(name, code)| {
            name.eq_ignore_ascii_case(name_or_code) || code.eq_ignore_ascii_case(name_or_code)
        })
        .map(|(_, code)| *code)
}

/// Summary style requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    #[default]
    Video,
    Podcast,
}

impl SummaryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryMode::Video => "video",
            SummaryMode::Podcast => "podcast",
        }
    }

    /// Title used when the backend does not supply one.
    pub fn default_title(self) -> &'static str {
        match self {
            SummaryMode::Video => "YouTube Video Summary",
            SummaryMode::Podcast => "YouTube Podcast Summary",
        }
    }

    /// Lenient parse: unknown values fall back to [`SummaryMode::Video`].
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Self::default(),
            Some(v) => v.parse().unwrap_or_else(|_| {
                warn!("Unknown mode '{}', using '{}'", v, Self::default());
                Self::default()
            }),
        }
    }
}

impl fmt::Display for SummaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryMode {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(SummaryMode::Video),
            "podcast" => Ok(SummaryMode::Podcast),
            other => Err(DigestError::InvalidConfig(format!(
                "mode must be 'video' or 'podcast', got '{other}'"
            ))),
        }
    }
}

/// AI model the backend should use. Only Gemini is offered today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiModel {
    #[default]
    Gemini,
}

impl AiModel {
    pub fn as_str(self) -> &'static str {
        match self {
            AiModel::Gemini => "gemini",
        }
    }

    /// Lenient parse: unknown values fall back to [`AiModel::Gemini`].
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Self::default(),
            Some(v) => v.parse().unwrap_or_else(|_| {
                warn!("Unknown model '{}', using '{}'", v, Self::default());
                Self::default()
            }),
        }
    }
}

impl fmt::Display for AiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiModel {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(AiModel::Gemini),
            other => Err(DigestError::InvalidConfig(format!(
                "model must be 'gemini', got '{other}'"
            ))),
        }
    }
}

/// Configuration for one summary request.
///
/// # Example
/// ```rust
/// use yt_digest::{SummaryConfig, SummaryMode};
///
/// let config = SummaryConfig::builder()
///     .endpoint("https://summaries.example.org/api/summarize")
///     .language("fr")
///     .mode(SummaryMode::Podcast)
///     .build()
///     .unwrap();
/// assert_eq!(config.language, "fr");
/// ```
#[derive(Clone)]
pub struct SummaryConfig {
    /// Summarization endpoint receiving the POST. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// ISO-639-1 language code for the summary. Default: "en".
    pub language: String,

    /// Summary style. Default: video.
    pub mode: SummaryMode,

    /// Backend model. Default: gemini.
    pub ai_model: AiModel,

    /// TCP connect timeout in seconds. Default: 10.
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds, streaming included. Default: 600.
    ///
    /// Long videos are summarised chunk by chunk and the stream can stay
    /// open for several minutes; `0` disables the limit.
    pub request_timeout_secs: u64,

    /// Receives progress, skipped-chunk and terminal events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: "en".to_string(),
            mode: SummaryMode::default(),
            ai_model: AiModel::default(),
            connect_timeout_secs: 10,
            request_timeout_secs: 600,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("endpoint", &self.endpoint)
            .field("language", &self.language)
            .field("mode", &self.mode)
            .field("ai_model", &self.ai_model)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn SummaryProgressCallback>"),
            )
            .finish()
    }
}

impl SummaryConfig {
    /// Create a new builder for `SummaryConfig`.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SummaryConfig`].
#[derive(Debug)]
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl SummaryConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    /// Accepts a code ("de") or a display name ("German").
    pub fn language(mut self, lang: impl AsRef<str>) -> Self {
        let lang = lang.as_ref().trim();
        self.config.language = language_code(lang)
            .map(str::to_string)
            .unwrap_or_else(|| lang.to_ascii_lowercase());
        self
    }

    pub fn mode(mut self, mode: SummaryMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn ai_model(mut self, model: AiModel) -> Self {
        self.config.ai_model = model;
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs.max(1);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummaryConfig, DigestError> {
        let c = &self.config;
        if !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://")) {
            return Err(DigestError::InvalidConfig(format!(
                "endpoint must be an http(s) URL, got '{}'",
                c.endpoint
            )));
        }
        if c.language.is_empty() {
            return Err(DigestError::InvalidConfig("language must not be empty".into()));
        }
        Ok(self.config)
    }
}

/// Page geometry and typography for PDF export. All lengths in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfLayout {
    /// Page width. Default: 210 (A4 portrait).
    pub page_width: f32,
    /// Page height. Default: 297 (A4 portrait).
    pub page_height: f32,
    /// Margin on every edge. Default: 15.
    pub margin: f32,
    /// Vertical advance per wrapped line. Default: 6.
    pub line_height: f32,
    /// Extra space after a paragraph. Default: 8.
    pub paragraph_spacing: f32,
    /// Left indent of list items. Default: 5.
    pub bullet_indent: f32,
    /// Distance of the footer baseline from the bottom edge. Default: 10.
    pub footer_offset: f32,
    /// Attribution text stamped before the page number.
    pub attribution: String,
    /// Flate-compress content streams. Default: true.
    pub compress: bool,
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 15.0,
            line_height: 6.0,
            paragraph_spacing: 8.0,
            bullet_indent: 5.0,
            footer_offset: 10.0,
            attribution: "Generated by YouTube AI Summarizer".to_string(),
            compress: true,
        }
    }
}

impl PdfLayout {
    /// Usable text width between the side margins.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Lowest y a block may reach before a page break is needed.
    pub fn bottom_limit(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Check that the geometry leaves room for at least one line.
    pub fn validate(&self) -> Result<(), DigestError> {
        if self.content_width() <= self.bullet_indent {
            return Err(DigestError::InvalidConfig(format!(
                "margins of {}mm leave no room on a {}mm wide page",
                self.margin, self.page_width
            )));
        }
        if self.line_height <= 0.0 || self.bottom_limit() - self.margin < self.line_height {
            return Err(DigestError::InvalidConfig(format!(
                "page height {}mm cannot hold a {}mm line",
                self.page_height, self.line_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_route_defaults() {
        let c = SummaryConfig::default();
        assert_eq!(c.language, "en");
        assert_eq!(c.mode, SummaryMode::Video);
        assert_eq!(c.ai_model, AiModel::Gemini);
    }

    #[test]
    fn builder_accepts_language_name() {
        let c = SummaryConfig::builder().language("German").build().unwrap();
        assert_eq!(c.language, "de");
    }

    #[test]
    fn builder_rejects_non_http_endpoint() {
        let err = SummaryConfig::builder()
            .endpoint("ftp://example.org")
            .build()
            .unwrap_err();
        assert!(matches!(err, DigestError::InvalidConfig(_)));
    }

    #[test]
    fn lenient_mode_parse_defaults() {
        assert_eq!(SummaryMode::parse_or_default(None), SummaryMode::Video);
        assert_eq!(SummaryMode::parse_or_default(Some("Podcast")), SummaryMode::Podcast);
        assert_eq!(SummaryMode::parse_or_default(Some("karaoke")), SummaryMode::Video);
        assert_eq!(AiModel::parse_or_default(Some("gpt")), AiModel::Gemini);
    }

    #[test]
    fn display_name_falls_back_to_english() {
        assert_eq!(language_display_name("ja"), "Japanese");
        assert_eq!(language_display_name("xx"), "English");
    }

    #[test]
    fn default_titles() {
        assert_eq!(SummaryMode::Video.default_title(), "YouTube Video Summary");
        assert_eq!(SummaryMode::Podcast.default_title(), "YouTube Podcast Summary");
    }

    #[test]
    fn default_layout_is_a4() {
        let l = PdfLayout::default();
        assert_eq!(l.content_width(), 180.0);
        assert_eq!(l.bottom_limit(), 282.0);
        assert!(l.validate().is_ok());
    }

    #[test]
    fn layout_rejects_oversized_margins() {
        let l = PdfLayout {
            margin: 110.0,
            ..Default::default()
        };
        assert!(l.validate().is_err());
    }
}
