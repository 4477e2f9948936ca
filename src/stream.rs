//! Streaming consumer: drive a summary request to a terminal state.
//!
//! The response body is read chunk by chunk. Every chunk goes through the
//! [`EventFramer`], every decoded event through the [`SummaryTracker`], and
//! the loop stops as soon as the tracker reaches a terminal state: a
//! `complete` event ends reading even if more bytes follow.
//!
//! Each suspension point races the body against the caller's
//! [`CancellationToken`], so cancelling never leaves the request `Loading`.

use crate::config::SummaryConfig;
use crate::error::DigestError;
use crate::pipeline::frame::EventFramer;
use crate::pipeline::request::{build_client, open_stream, SummaryRequest};
use crate::state::{CompletedSummary, SummaryState, SummaryTracker};
use futures::StreamExt;
use std::fmt::Display;
use std::ops::ControlFlow;
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Feed a body stream through the framer into `tracker` until it ends, is
/// cancelled, or a terminal event arrives.
///
/// Transport errors fail the tracker with the error's message. A stream that
/// ends without a `complete` event fails it too, after one last attempt to
/// decode whatever is still buffered.
pub async fn consume_events<S, B, E>(
    mut body: S,
    tracker: &mut SummaryTracker,
    cancel: &CancellationToken,
) where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut framer = EventFramer::new();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracker.cancel();
                return;
            }
            next = body.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                let chunk = chunk.as_ref();
                debug!("received {} bytes", chunk.len());
                for result in framer.push(chunk) {
                    if dispatch(tracker, result).is_break() {
                        return;
                    }
                }
            }
            Some(Err(e)) => {
                tracker.fail(e.to_string());
                return;
            }
            None => break,
        }
    }

    for result in framer.finish() {
        if dispatch(tracker, result).is_break() {
            return;
        }
    }
    tracker.finish_stream();
}

fn dispatch(
    tracker: &mut SummaryTracker,
    result: crate::pipeline::frame::FrameResult,
) -> ControlFlow<()> {
    match result {
        Ok(event) => tracker.apply(event),
        Err(e) => {
            tracker.skip(e);
            ControlFlow::Continue(())
        }
    }
}

/// Send `request` and consume the response, returning the terminal state.
///
/// Never returns `Idle` or `Loading`: connection errors and non-2xx responses
/// end in [`SummaryState::Failed`], cancellation in
/// [`SummaryState::Cancelled`].
pub async fn stream_summary(
    request: &SummaryRequest,
    config: &SummaryConfig,
    cancel: CancellationToken,
) -> SummaryState {
    info!("Requesting summary for {}", request.url);
    if let Some(ref cb) = config.progress_callback {
        cb.on_request_start(&request.url);
    }

    let mut tracker = SummaryTracker::new(request.mode, config.progress_callback.clone());
    tracker.begin();

    let client = match build_client(config) {
        Ok(client) => client,
        Err(e) => {
            tracker.fail(e.user_message());
            return tracker.into_state();
        }
    };

    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracker.cancel();
            return tracker.into_state();
        }
        opened = open_stream(&client, &config.endpoint, request) => opened,
    };

    match opened {
        Ok(body) => consume_events(body, &mut tracker, &cancel).await,
        Err(e) => tracker.fail(e.user_message()),
    }
    tracker.into_state()
}

/// Convenience wrapper around [`stream_summary`] returning a `Result`.
///
/// # Errors
/// - [`DigestError::StreamFailed`] with the user-facing message on failure
/// - [`DigestError::Cancelled`] when `cancel` fired first
pub async fn summarize(
    request: &SummaryRequest,
    config: &SummaryConfig,
    cancel: CancellationToken,
) -> Result<CompletedSummary, DigestError> {
    stream_summary(request, config, cancel).await.into_result()
}
