//! Stream adapter for splitting newline-delimited JSON bodies into fragments.
//!
//! The server emits one JSON object per line:
//! ```text
//! {"model":"llama3","response":"Hel","done":false}
//! {"model":"llama3","response":"lo","done":false}
//! {"model":"llama3","response":"","done":true}
//! ```
//! Lines are yielded as text; they are not parsed here.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use crate::{Error, ResponseFragment, Result};

/// Longest line accepted before the stream is aborted.
pub const MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

/// A stream adapter that yields one fragment per non-blank line of a byte stream.
///
/// Bytes are only pulled from the inner stream when no complete line is
/// buffered, so a consumer that stops polling stops all reads. The first error
/// ends the stream. The inner stream is dropped as soon as the stream ends,
/// on error or at end of body, releasing the connection behind it.
pub struct NdjsonStream<S> {
    /// The underlying byte stream, `None` once finished
    inner: Option<S>,
    /// Bytes received but not yet yielded as a line
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to contain no newline
    scanned: usize,
}

impl<S> NdjsonStream<S> {
    /// Create a new NDJSON stream from a byte stream.
    pub fn new(stream: S) -> Self {
        Self {
            inner: Some(stream),
            buffer: Vec::new(),
            scanned: 0,
        }
    }

    fn fail(&mut self, error: Error) -> Poll<Option<Result<ResponseFragment>>> {
        self.inner = None;
        self.buffer.clear();
        self.scanned = 0;
        Poll::Ready(Some(Err(error)))
    }
}

/// Remove the next complete line from the buffer, without its separator.
fn take_line(buffer: &mut Vec<u8>, scanned: &mut usize) -> Option<Vec<u8>> {
    let pos = *scanned + memchr::memchr(b'\n', &buffer[*scanned..])?;
    let mut line: Vec<u8> = buffer.drain(..=pos).collect();
    line.pop();
    *scanned = 0;
    Some(line)
}

/// Decode one line; blank lines are keep-alive padding and produce nothing.
fn decode_line(line: &[u8]) -> Result<Option<ResponseFragment>> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let text = std::str::from_utf8(line).map_err(|e| {
        Error::decode(
            format!("invalid UTF-8 in stream line: {e}"),
            String::from_utf8_lossy(line),
        )
    })?;

    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(ResponseFragment::new(text)))
}

impl<S> Stream for NdjsonStream<S>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
{
    type Item = Result<ResponseFragment>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            let Some(inner) = this.inner.as_mut() else {
                return Poll::Ready(None);
            };

            // Serve lines already buffered before reading more
            if let Some(line) = take_line(&mut this.buffer, &mut this.scanned) {
                match decode_line(&line) {
                    Ok(Some(fragment)) => return Poll::Ready(Some(Ok(fragment))),
                    Ok(None) => continue,
                    Err(e) => return this.fail(e),
                }
            }
            this.scanned = this.buffer.len();

            if this.buffer.len() > MAX_LINE_BYTES {
                let excerpt = String::from_utf8_lossy(&this.buffer[..256]).into_owned();
                return this.fail(Error::decode(
                    format!("stream line exceeded {MAX_LINE_BYTES} bytes"),
                    excerpt,
                ));
            }

            match ready!(inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => this.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => return this.fail(e),
                None => {
                    // Flush a final line that had no trailing separator
                    this.inner = None;
                    this.scanned = 0;
                    let rest = std::mem::take(&mut this.buffer);
                    return match decode_line(&rest) {
                        Ok(Some(fragment)) => Poll::Ready(Some(Ok(fragment))),
                        Ok(None) => Poll::Ready(None),
                        Err(e) => Poll::Ready(Some(Err(e))),
                    };
                }
            }
        }
    }
}

/// Extension trait to add NDJSON line splitting to byte streams.
pub trait NdjsonStreamExt: Stream {
    /// Split this byte stream into line fragments.
    fn ndjson_lines(self) -> NdjsonStream<Self>
    where
        Self: Sized,
    {
        NdjsonStream::new(self)
    }
}

impl<S: Stream> NdjsonStreamExt for S {}
