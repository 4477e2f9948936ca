//! Request: POST the summary request and hand back the body as a byte stream.
//!
//! This is the only stage with network I/O. Non-2xx responses are turned
//! into [`DigestError::ServerError`] here, so the consumer only ever sees a
//! success body.

use crate::config::{AiModel, SummaryConfig, SummaryMode};
use crate::error::{DigestError, GENERIC_FAILURE, SUMMARY_FAILED};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Body of the summarize request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    /// Canonical `https://www.youtube.com/watch?v=<id>` URL.
    pub url: String,
    /// ISO-639-1 language code.
    pub language: String,
    pub mode: SummaryMode,
    pub ai_model: AiModel,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Response body of a successful request, chunk by chunk.
pub type BodyStream = std::pin::Pin<Box<dyn Stream<Item = reqwest::Result<Vec<u8>>> + Send>>;

/// Build the HTTP client from the configured timeouts.
pub fn build_client(config: &SummaryConfig) -> Result<reqwest::Client, DigestError> {
    let mut builder =
        reqwest::Client::builder().connect_timeout(Duration::from_secs(config.connect_timeout_secs));
    if config.request_timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
    }
    builder
        .build()
        .map_err(|e| DigestError::Internal(format!("Failed to build HTTP client: {e}")))
}

/// Send the request and return the response body stream.
///
/// # Errors
/// - [`DigestError::RequestFailed`] when the connection fails
/// - [`DigestError::ServerError`] for non-2xx responses
pub async fn open_stream(
    client: &reqwest::Client,
    endpoint: &str,
    request: &SummaryRequest,
) -> Result<BodyStream, DigestError> {
    info!(
        "POST {} (lang={}, mode={}, model={})",
        endpoint, request.language, request.mode, request.ai_model
    );

    let response = client
        .post(endpoint)
        .json(request)
        .send()
        .await
        .map_err(|e| DigestError::RequestFailed {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.bytes().await.unwrap_or_default();
        let message = server_error_message(&body);
        warn!("Server responded {}: {}", status, message);
        return Err(DigestError::ServerError {
            status: status.as_u16(),
            message,
        });
    }

    debug!("Response {} received, streaming body", status);
    Ok(Box::pin(
        response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec())),
    ))
}

/// Message to show for a non-2xx response body.
pub fn server_error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(message) }) if !message.trim().is_empty() => message,
        Ok(_) => SUMMARY_FAILED.to_string(),
        Err(_) => GENERIC_FAILURE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialises_with_camel_case_model() {
        let req = SummaryRequest {
            url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".into(),
            language: "en".into(),
            mode: SummaryMode::Podcast,
            ai_model: AiModel::Gemini,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["aiModel"], "gemini");
        assert_eq!(json["mode"], "podcast");
        assert_eq!(json["language"], "en");
    }

    #[test]
    fn error_field_is_surfaced() {
        assert_eq!(
            server_error_message(br#"{"error":"Video too long"}"#),
            "Video too long"
        );
    }

    #[test]
    fn missing_error_field_uses_summary_failed() {
        assert_eq!(server_error_message(br#"{"detail":"x"}"#), SUMMARY_FAILED);
    }

    #[test]
    fn unparseable_body_uses_generic_message() {
        assert_eq!(server_error_message(b"<html>502</html>"), GENERIC_FAILURE);
        assert_eq!(server_error_message(b""), GENERIC_FAILURE);
    }
}
