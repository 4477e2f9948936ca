//! Framing: turn arbitrary body chunks into whole JSON events.
//!
//! Network chunk boundaries carry no meaning. A chunk may hold half an
//! event, several events, or the tail of a multi-byte UTF-8 sequence, so the
//! framer buffers bytes and pulls complete JSON values off the front of the
//! buffer with `serde_json`'s streaming deserializer. Values may be separated
//! by newlines (NDJSON, what the backend is expected to send) or simply
//! concatenated.
//!
//! ## Resynchronisation
//!
//! A syntax error (as opposed to "value not finished yet") discards bytes up
//! to the nearest resync point after the failed value's start: the byte
//! after the next newline, or the start of the most recently pushed chunk,
//! whichever comes first. The chunk boundary matters for unframed bodies
//! that send one value per chunk: a truncated chunk is held back as
//! "unfinished", and once the next chunk turns it into a syntax error only
//! the stale prefix is dropped, not the value that just arrived. With
//! neither resync point ahead, the rest of the buffer is dropped.
//!
//! An unfinished value that grows past [`DEFAULT_MAX_PENDING`] bytes is
//! reported as malformed and discarded, so a body that never closes its
//! value cannot grow the buffer without bound.

use crate::error::ChunkError;
use crate::event::ProgressEvent;
use serde_json::Value;
use tracing::{trace, warn};

/// Result of decoding one buffered value.
pub type FrameResult = Result<ProgressEvent, ChunkError>;

/// Largest unfinished value kept in the buffer.
pub const DEFAULT_MAX_PENDING: usize = 16 * 1024 * 1024;

/// Incremental decoder from body bytes to [`ProgressEvent`]s.
#[derive(Debug)]
pub struct EventFramer {
    buf: Vec<u8>,
    /// Offset in `buf` where the most recently pushed chunk starts.
    chunk_start: usize,
    max_pending: usize,
}

impl Default for EventFramer {
    fn default() -> Self {
        Self::with_max_pending(DEFAULT_MAX_PENDING)
    }
}

impl EventFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A framer that gives up on an unfinished value once `max_pending`
    /// bytes are buffered.
    pub fn with_max_pending(max_pending: usize) -> Self {
        Self {
            buf: Vec::new(),
            chunk_start: 0,
            max_pending,
        }
    }

    /// Bytes received but not yet decoded.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Append a chunk and decode every value it completes, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<FrameResult> {
        self.chunk_start = self.buf.len();
        self.buf.extend_from_slice(chunk);
        let mut out = self.drain(false);

        if self.buf.len() > self.max_pending {
            let skipped = self.buf.len();
            warn!("dropping {} buffered bytes of an unfinished value", skipped);
            out.push(Err(ChunkError::Malformed {
                detail: format!("unfinished value exceeds {} bytes", self.max_pending),
                skipped_bytes: skipped,
            }));
            self.buf.clear();
            self.chunk_start = 0;
        }
        out
    }

    /// Decode whatever is left once the body has ended.
    ///
    /// An unfinished trailing value is reported as malformed.
    pub fn finish(&mut self) -> Vec<FrameResult> {
        self.drain(true)
    }

    fn drain(&mut self, at_eof: bool) -> Vec<FrameResult> {
        let mut out = Vec::new();
        let mut start = 0usize;

        while start < self.buf.len() {
            let rest = &self.buf[start..];
            let mut values = serde_json::Deserializer::from_slice(rest).into_iter::<Value>();
            match values.next() {
                None => {
                    // Only whitespace left.
                    start = self.buf.len();
                }
                Some(Ok(value)) => {
                    start += values.byte_offset();
                    out.push(decode_value(value));
                }
                Some(Err(e)) if e.is_eof() && !at_eof => break,
                Some(Err(e)) => {
                    let lead = rest
                        .iter()
                        .position(|b| !b.is_ascii_whitespace())
                        .unwrap_or(rest.len());
                    let after_newline = rest[lead..]
                        .iter()
                        .position(|&b| b == b'\n')
                        .map(|pos| lead + pos + 1);
                    let at_chunk = self
                        .chunk_start
                        .checked_sub(start)
                        .filter(|&offset| offset > lead);
                    let skip = match (after_newline, at_chunk) {
                        (Some(a), Some(b)) => a.min(b),
                        (Some(a), None) | (None, Some(a)) => a,
                        (None, None) => rest.len(),
                    };
                    trace!("resync after {} bytes: {}", skip, e);
                    out.push(Err(ChunkError::Malformed {
                        detail: e.to_string(),
                        skipped_bytes: skip,
                    }));
                    start += skip;
                }
            }
        }

        self.buf.drain(..start);
        self.chunk_start = self.chunk_start.saturating_sub(start);
        out
    }
}

fn decode_value(value: Value) -> FrameResult {
    serde_json::from_value::<ProgressEvent>(value).map_err(|e| ChunkError::InvalidEvent {
        detail: e.to_string(),
    })
}
