//! Integration tests for the streaming consumer over in-memory bodies.
//!
//! Bodies are built with `futures::stream::iter`, so chunk boundaries can be
//! placed anywhere: inside a value, between values, inside a UTF-8 sequence.

use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use yt_digest::{
    consume_events, layout_document, ChunkError, CompletedSummary, PdfLayout, ProgressStatus,
    RenderMeta, Stage, SummaryMode, SummaryProgressCallback, SummarySource, SummaryState,
    SummaryTracker,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn progress(current: u32, total: u32, stage: &str) -> String {
    format!(
        r#"{{"type":"progress","currentChunk":{current},"totalChunks":{total},"stage":"{stage}","message":"working"}}"#
    )
}

const SCENARIO_COMPLETE: &str =
    r###"{"type":"complete","summary":"## Title\n\nSome text","title":"T","source":"youtube"}"###;

fn body(parts: Vec<Vec<u8>>) -> impl futures::Stream<Item = Result<Vec<u8>, String>> + Unpin {
    stream::iter(parts.into_iter().map(Ok).collect::<Vec<_>>())
}

/// Split `text` into chunks of `size` bytes, ignoring char boundaries.
fn rechunk(text: &str, size: usize) -> Vec<Vec<u8>> {
    text.as_bytes().chunks(size).map(<[u8]>::to_vec).collect()
}

fn run(parts: Vec<Vec<u8>>) -> SummaryState {
    tokio_test::block_on(async {
        let mut tracker = SummaryTracker::new(SummaryMode::Video, None);
        tracker.begin();
        consume_events(body(parts), &mut tracker, &CancellationToken::new()).await;
        tracker.into_state()
    })
}

fn completed(state: SummaryState) -> CompletedSummary {
    match state {
        SummaryState::Complete(summary) => summary,
        other => panic!("expected Complete, got {other:?}"),
    }
}

#[derive(Default)]
struct Recorder {
    stages: Mutex<Vec<Stage>>,
    skipped: AtomicUsize,
    completed: AtomicUsize,
    failed: Mutex<Vec<String>>,
}

impl SummaryProgressCallback for Recorder {
    fn on_progress(&self, status: &ProgressStatus) {
        self.stages.lock().unwrap().push(status.stage);
    }

    fn on_chunk_skipped(&self, _error: &ChunkError) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn on_complete(&self, _summary: &CompletedSummary) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_failed(&self, message: String) {
        self.failed.lock().unwrap().push(message);
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn scenario_progress_then_complete() {
    let text = format!("{}\n{}\n", progress(1, 4, "processing"), SCENARIO_COMPLETE);
    let summary = completed(run(vec![text.into_bytes()]));

    assert_eq!(summary.source, Some(SummarySource::Youtube));
    assert_eq!(summary.document.title, "T");
    assert_eq!(summary.document.content, "## Title\n\nSome text");

    // Rendered, the heading becomes the plain line "Title".
    let meta = RenderMeta {
        language_name: "English".into(),
        source: summary.source,
        mode: SummaryMode::Video,
        generated_at: chrono::Local::now(),
    };
    let pages = layout_document(&summary.document, &meta, &PdfLayout::default());
    let texts: Vec<&str> = pages.pages[0].texts().collect();
    let heading = texts.iter().position(|t| *t == "Title").unwrap();
    assert_eq!(texts[heading + 1], "Some text");
}

#[test]
fn final_state_ignores_progress_order() {
    let text = [
        progress(3, 5, "processing"),
        progress(1, 5, "processing"),
        progress(5, 5, "finalizing"),
        progress(2, 5, "analyzing"),
        SCENARIO_COMPLETE.to_string(),
    ]
    .join("\n");
    let summary = completed(run(vec![text.into_bytes()]));
    assert_eq!(summary.document.title, "T");
}

#[test]
fn every_chunk_size_gives_the_same_result() {
    let text = format!(
        "{}\n{}\n{}\n",
        progress(1, 2, "processing"),
        progress(2, 2, "saving"),
        r#"{"type":"complete","summary":"Überblick — naïve café ✓","source":"cache"}"#
    );
    for size in [1, 2, 3, 7, 16, 64, text.len()] {
        let summary = completed(run(rechunk(&text, size)));
        assert_eq!(summary.document.content, "Überblick — naïve café ✓", "size {size}");
        assert_eq!(summary.source, Some(SummarySource::Cache));
        assert_eq!(summary.document.title, "YouTube Video Summary");
    }
}

#[test]
fn malformed_chunk_does_not_block_complete() {
    let recorder = Arc::new(Recorder::default());
    let state = tokio_test::block_on(async {
        let mut tracker = SummaryTracker::new(
            SummaryMode::Video,
            Some(recorder.clone() as Arc<dyn SummaryProgressCallback>),
        );
        tracker.begin();
        let parts = vec![
            progress(1, 3, "processing").into_bytes(),
            b"{\"type\": \"progress\", oops}\n".to_vec(),
            progress(2, 3, "processing").into_bytes(),
            SCENARIO_COMPLETE.as_bytes().to_vec(),
        ];
        consume_events(body(parts), &mut tracker, &CancellationToken::new()).await;
        tracker.into_state()
    });

    assert_eq!(completed(state).document.title, "T");
    assert_eq!(recorder.skipped.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.completed.load(Ordering::SeqCst), 1);
    // begin() + two progress events.
    assert_eq!(recorder.stages.lock().unwrap().len(), 3);
    assert!(recorder.failed.lock().unwrap().is_empty());
}

#[test]
fn truncated_unframed_chunk_does_not_block_complete() {
    let recorder = Arc::new(Recorder::default());
    let state = tokio_test::block_on(async {
        let mut tracker = SummaryTracker::new(
            SummaryMode::Video,
            Some(recorder.clone() as Arc<dyn SummaryProgressCallback>),
        );
        tracker.begin();
        let parts = vec![
            br#"{"type":"progress","currentChunk":1,"totalChunks":4,"stage":"proc"#.to_vec(),
            SCENARIO_COMPLETE.as_bytes().to_vec(),
        ];
        consume_events(body(parts), &mut tracker, &CancellationToken::new()).await;
        tracker.into_state()
    });

    let summary = completed(state);
    assert_eq!(summary.document.title, "T");
    assert_eq!(summary.source, Some(SummarySource::Youtube));
    assert_eq!(recorder.skipped.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_event_types_are_ignored() {
    let text = format!(
        "{}\n{}\n",
        r#"{"type":"heartbeat","at":12}"#, SCENARIO_COMPLETE
    );
    assert_eq!(completed(run(vec![text.into_bytes()])).document.title, "T");
}

#[test]
fn data_after_complete_is_not_read() {
    let recorder = Arc::new(Recorder::default());
    tokio_test::block_on(async {
        let mut tracker = SummaryTracker::new(
            SummaryMode::Video,
            Some(recorder.clone() as Arc<dyn SummaryProgressCallback>),
        );
        tracker.begin();
        let text = format!("{SCENARIO_COMPLETE}\n{}\n", progress(9, 9, "saving"));
        consume_events(body(vec![text.into_bytes()]), &mut tracker, &CancellationToken::new())
            .await;
        assert!(matches!(tracker.state(), SummaryState::Complete(_)));
    });
    // Only the initial snapshot from begin().
    assert_eq!(*recorder.stages.lock().unwrap(), vec![Stage::Analyzing]);
}

#[test]
fn stream_without_complete_fails_once() {
    let recorder = Arc::new(Recorder::default());
    let state = tokio_test::block_on(async {
        let mut tracker = SummaryTracker::new(
            SummaryMode::Podcast,
            Some(recorder.clone() as Arc<dyn SummaryProgressCallback>),
        );
        tracker.begin();
        let parts = vec![progress(1, 2, "processing").into_bytes()];
        consume_events(body(parts), &mut tracker, &CancellationToken::new()).await;
        tracker.into_state()
    });
    assert!(matches!(state, SummaryState::Failed(_)));
    assert_eq!(recorder.failed.lock().unwrap().len(), 1);
}

#[test]
fn truncated_complete_at_eof_fails() {
    let cut = &SCENARIO_COMPLETE[..SCENARIO_COMPLETE.len() - 5];
    let state = run(vec![cut.as_bytes().to_vec()]);
    assert!(state.error().is_some());
}

#[test]
fn complete_without_trailing_newline_at_eof() {
    let summary = completed(run(vec![SCENARIO_COMPLETE.as_bytes().to_vec()]));
    assert_eq!(summary.source, Some(SummarySource::Youtube));
}

#[tokio::test]
async fn cancellation_mid_stream() {
    let cancel = CancellationToken::new();
    let (tx, rx) = futures::channel::mpsc::unbounded::<Result<Vec<u8>, String>>();
    tx.unbounded_send(Ok(format!("{}\n", progress(1, 4, "processing")).into_bytes()))
        .unwrap();

    let mut tracker = SummaryTracker::new(SummaryMode::Video, None);
    tracker.begin();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        trigger.cancel();
    });

    // The sender stays alive, so only cancellation can end the loop.
    consume_events(rx, &mut tracker, &cancel).await;
    assert_eq!(tracker.state(), &SummaryState::Cancelled);
    drop(tx);
}
