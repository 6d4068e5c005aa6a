//! A client for a local generative-inference HTTP service (the Ollama REST API).
//!
//! Provides text generation, multi-turn chat and model management (list, pull,
//! delete). Generation and chat can return the full text at once, or stream the
//! newline-delimited JSON body as it arrives, one [`ResponseFragment`] per line.
//!
//! The async [`OllamaClient`] is the core; [`blocking::OllamaClient`] offers the
//! same operations for synchronous callers.

pub mod blocking;
pub mod client;
pub mod error;
pub mod ndjson_stream;
pub mod response;
pub mod transport;
pub mod types;

// Re-export core types for easy usage
pub use client::OllamaClient;
pub use error::{Error, Result};
pub use ndjson_stream::{NdjsonStream, NdjsonStreamExt};
pub use response::{FragmentStream, Generation};
pub use transport::{ApiRequest, HttpResponse, HttpTransport, Transport};
pub use types::*;
