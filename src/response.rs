//! Results of generation and chat calls.

use crate::{Error, ResponseFragment};
use futures_util::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

/// A lazy, single-pass sequence of fragments read from a live response body.
///
/// Nothing is read until the caller asks for the next fragment. Dropping the
/// stream, whether exhausted or not, releases the underlying connection.
pub struct FragmentStream {
    stream: Pin<Box<dyn Stream<Item = Result<ResponseFragment, Error>> + Send>>,
}

impl FragmentStream {
    /// Create a new fragment stream from any stream of fragments.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<ResponseFragment, Error>> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream),
        }
    }

    /// Pull the next fragment; `None` once the server has closed the body.
    pub async fn next_fragment(&mut self) -> Option<Result<ResponseFragment, Error>> {
        self.stream.next().await
    }

    /// Drain the remaining fragments, stopping at the first error.
    pub async fn collect_fragments(mut self) -> Result<Vec<ResponseFragment>, Error> {
        let mut fragments = Vec::new();
        while let Some(fragment) = self.next_fragment().await {
            fragments.push(fragment?);
        }
        Ok(fragments)
    }
}

impl Stream for FragmentStream {
    type Item = Result<ResponseFragment, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for FragmentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentStream").finish_non_exhaustive()
    }
}

/// Outcome of a generation or chat call: buffered text, or a live stream.
#[derive(Debug)]
pub enum Generation {
    Text(String),
    Stream(FragmentStream),
}

impl Generation {
    pub fn is_stream(&self) -> bool {
        matches!(self, Generation::Stream(_))
    }

    /// The buffered text, if this was a non-streaming call.
    pub fn into_text(self) -> Option<String> {
        match self {
            Generation::Text(text) => Some(text),
            Generation::Stream(_) => None,
        }
    }

    /// The fragment stream, if this was a streaming call.
    pub fn into_stream(self) -> Option<FragmentStream> {
        match self {
            Generation::Stream(stream) => Some(stream),
            Generation::Text(_) => None,
        }
    }
}
