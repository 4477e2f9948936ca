//! Input resolution: normalise a user-supplied video URL or summary route.
//!
//! Two input shapes are accepted:
//!
//! * a YouTube URL in any of its common forms (`watch?v=`, `youtu.be/`,
//!   `embed/`, `v/`, share links with extra parameters). It is validated and
//!   rewritten to `https://www.youtube.com/watch?v=<id>` before any network
//!   call, so a typo never reaches the backend.
//! * a summary route `/summary/<url-safe base64 of the URL>?lang=..&mode=..&model=..`
//!   as produced by [`SummaryRoute::to_path`]. Route parameters are validated
//!   only by defaulting: a missing or unknown value becomes the default.

use crate::config::{AiModel, SummaryConfig, SummaryMode};
use crate::error::DigestError;
use crate::pipeline::request::SummaryRequest;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Path prefix of a summary route.
pub const ROUTE_PREFIX: &str = "/summary/";

static RE_VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#,
    )
    .unwrap()
});

/// Extract the 11-character video id from a YouTube URL.
pub fn extract_video_id(url: &str) -> Result<String, DigestError> {
    RE_VIDEO_ID
        .captures(url)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| DigestError::InvalidVideoUrl {
            input: url.to_string(),
        })
}

/// Validate a YouTube URL and rewrite it to its canonical watch form.
///
/// A leading `@` (pasted from a chat mention) is ignored.
pub fn canonical_video_url(input: &str) -> Result<String, DigestError> {
    let trimmed = input.trim().trim_start_matches('@');
    let id = extract_video_id(trimmed)?;
    Ok(format!("https://www.youtube.com/watch?v={id}"))
}

/// URL-safe base64 without padding.
pub fn encode_video_url(url: &str) -> String {
    URL_SAFE_NO_PAD.encode(url.as_bytes())
}

/// Inverse of [`encode_video_url`]; tolerates trailing `=` padding.
pub fn decode_video_url(encoded: &str) -> Result<String, DigestError> {
    let invalid = |reason: String| DigestError::InvalidRoute {
        route: encoded.to_string(),
        reason,
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.trim().trim_end_matches('='))
        .map_err(|e| invalid(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| invalid(e.to_string()))
}

/// A summary route: the encoded video URL plus its query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRoute {
    pub url: String,
    pub language: String,
    pub mode: SummaryMode,
    pub ai_model: AiModel,
}

impl SummaryRoute {
    /// Build the route path for a summary request.
    pub fn to_path(&self) -> String {
        format!(
            "{}{}?lang={}&mode={}&model={}",
            ROUTE_PREFIX,
            encode_video_url(&self.url),
            self.language,
            self.mode,
            self.ai_model
        )
    }

    /// Parse a route path. Missing parameters take their defaults.
    pub fn parse(route: &str) -> Result<Self, DigestError> {
        let route = route.trim();
        let tail = route
            .strip_prefix(ROUTE_PREFIX)
            .ok_or_else(|| DigestError::InvalidRoute {
                route: route.to_string(),
                reason: format!("must start with '{ROUTE_PREFIX}'"),
            })?;
        let (encoded, query) = tail.split_once('?').unwrap_or((tail, ""));
        let encoded = encoded.trim_end_matches('/');
        if encoded.is_empty() {
            return Err(DigestError::InvalidRoute {
                route: route.to_string(),
                reason: "missing encoded video URL".to_string(),
            });
        }

        let mut lang = None;
        let mut mode = None;
        let mut model = None;
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "lang" => lang = Some(value),
                "mode" => mode = Some(value),
                "model" => model = Some(value),
                other => debug!("ignoring route parameter '{}'", other),
            }
        }

        Ok(Self {
            url: decode_video_url(encoded)?,
            language: lang
                .filter(|l| !l.is_empty())
                .unwrap_or("en")
                .to_ascii_lowercase(),
            mode: SummaryMode::parse_or_default(mode),
            ai_model: AiModel::parse_or_default(model),
        })
    }
}

/// Check if the input string looks like a summary route.
pub fn is_route(input: &str) -> bool {
    input.trim_start().starts_with(ROUTE_PREFIX)
}

/// Resolve CLI/library input to the request that will be sent.
///
/// Routes carry their own language/mode/model; plain URLs take them from
/// `config`. Either way the URL is canonicalised first.
pub fn resolve_input(input: &str, config: &SummaryConfig) -> Result<SummaryRequest, DigestError> {
    if is_route(input) {
        let route = SummaryRoute::parse(input)?;
        Ok(SummaryRequest {
            url: canonical_video_url(&route.url)?,
            language: route.language,
            mode: route.mode,
            ai_model: route.ai_model,
        })
    } else {
        Ok(SummaryRequest {
            url: canonical_video_url(input)?,
            language: config.language.clone(),
            mode: config.mode,
            ai_model: config.ai_model,
        })
    }
}
