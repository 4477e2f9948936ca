//! HTTP round-trip tests against a local mock backend.

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yt_digest::{
    resolve_input, stream_summary, summarize, DigestError, SummaryConfig, SummaryMode,
    SummarySource, SummaryState,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Route library logs through the test harness; `RUST_LOG=debug` shows them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Start a backend that answers every `POST /api/summarize` with `response`.
async fn backend(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/summarize"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn config(server: &MockServer) -> SummaryConfig {
    init_tracing();
    SummaryConfig::builder()
        .endpoint(format!("{}/api/summarize", server.uri()))
        .language("German")
        .mode(SummaryMode::Podcast)
        .connect_timeout_secs(5)
        .request_timeout_secs(30)
        .build()
        .unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn streams_ndjson_to_completion() {
    let body = [
        r#"{"type":"progress","currentChunk":0,"totalChunks":2,"stage":"analyzing","message":"start"}"#,
        r#"{"type":"progress","currentChunk":2,"totalChunks":2,"stage":"finalizing","message":"almost"}"#,
        r###"{"type":"complete","summary":"## Intro\n\nBody","title":"Podcast","source":"cache"}"###,
    ]
    .join("\n");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/summarize"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .expect(1)
        .mount(&server)
        .await;
    let config = config(&server);
    let request = resolve_input("https://youtu.be/dQw4w9WgXcQ?t=10", &config).unwrap();

    let summary = summarize(&request, &config, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.document.title, "Podcast");
    assert_eq!(summary.source, Some(SummarySource::Cache));

    let received = server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(sent["url"], "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    assert_eq!(sent["language"], "de");
    assert_eq!(sent["mode"], "podcast");
    assert_eq!(sent["aiModel"], "gemini");
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let server = backend(ResponseTemplate::new(500).set_body_raw(
        r#"{"error":"No transcript available for this video"}"#,
        "application/json",
    ))
    .await;
    let config = config(&server);
    let request = resolve_input("https://www.youtube.com/watch?v=dQw4w9WgXcQ", &config).unwrap();

    let state = stream_summary(&request, &config, CancellationToken::new()).await;
    assert_eq!(
        state,
        SummaryState::Failed("No transcript available for this video".to_string())
    );
}

#[tokio::test]
async fn error_body_without_error_field() {
    let server = backend(
        ResponseTemplate::new(429).set_body_raw(r#"{"detail":"slow down"}"#, "application/json"),
    )
    .await;
    let config = config(&server);
    let request = resolve_input("https://www.youtube.com/watch?v=dQw4w9WgXcQ", &config).unwrap();

    let state = stream_summary(&request, &config, CancellationToken::new()).await;
    assert_eq!(state.error(), Some("Failed to generate summary"));
}

#[tokio::test]
async fn unparseable_error_body_uses_generic_message() {
    let server =
        backend(ResponseTemplate::new(502).set_body_raw("<html>bad gateway</html>", "text/html"))
            .await;
    let config = config(&server);
    let request = resolve_input("https://www.youtube.com/watch?v=dQw4w9WgXcQ", &config).unwrap();

    match summarize(&request, &config, CancellationToken::new()).await {
        Err(DigestError::StreamFailed(message)) => {
            assert_eq!(message, "An error occurred while generating the summary")
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn body_without_complete_fails() {
    let body =
        r#"{"type":"progress","currentChunk":1,"totalChunks":3,"stage":"processing","message":"m"}"#;
    let server =
        backend(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson")).await;
    let config = config(&server);
    let request = resolve_input("https://youtu.be/dQw4w9WgXcQ", &config).unwrap();

    let state = stream_summary(&request, &config, CancellationToken::new()).await;
    assert!(state.error().unwrap().contains("ended before"));
}
