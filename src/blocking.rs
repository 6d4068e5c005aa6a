//! Blocking client.
//!
//! Wraps the async client in a single-threaded runtime owned by the client.
//! Every method blocks the calling thread until the exchange completes.
//! Streaming calls return [`Fragments`], an iterator that performs reads only
//! while `next()` runs; nothing is read in the background between calls.
//!
//! Must not be called from within an async runtime.

use serde_json::Value;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

use crate::transport::Transport;
use crate::{
    ChatMessage, ChatRequest, ClientConfig, Error, FragmentStream, GenerateRequest,
    ResponseFragment, Result,
};

/// Blocking counterpart of [`crate::OllamaClient`].
///
/// ```no_run
/// use ollama_client::blocking::OllamaClient;
///
/// # fn example() -> ollama_client::Result<()> {
/// let client = OllamaClient::localhost()?;
/// for fragment in client.generate_stream("Tell me a fun fact about space.")? {
///     println!("{}", fragment?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OllamaClient {
    inner: crate::OllamaClient,
    runtime: Arc<Runtime>,
}

impl OllamaClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let runtime = build_runtime()?;
        let inner = {
            let _guard = runtime.enter();
            crate::OllamaClient::new(config)?
        };
        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    /// Create a client for the local server with the default model.
    pub fn localhost() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            inner: crate::OllamaClient::with_transport(config, transport),
            runtime: Arc::new(build_runtime()?),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }

    pub fn send_generate(&self, request: GenerateRequest) -> Result<Generation> {
        let generation = self.runtime.block_on(self.inner.send_generate(request))?;
        Ok(self.wrap(generation))
    }

    pub fn generate(&self, prompt: impl Into<String>) -> Result<String> {
        self.runtime.block_on(self.inner.generate(prompt))
    }

    pub fn generate_stream(&self, prompt: impl Into<String>) -> Result<Fragments> {
        let stream = self.runtime.block_on(self.inner.generate_stream(prompt))?;
        Ok(self.fragments(stream))
    }

    pub fn send_chat(&self, request: ChatRequest) -> Result<Generation> {
        let generation = self.runtime.block_on(self.inner.send_chat(request))?;
        Ok(self.wrap(generation))
    }

    pub fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.runtime.block_on(self.inner.chat(messages))
    }

    pub fn chat_stream(&self, messages: Vec<ChatMessage>) -> Result<Fragments> {
        let stream = self.runtime.block_on(self.inner.chat_stream(messages))?;
        Ok(self.fragments(stream))
    }

    pub fn list_models(&self) -> Result<Vec<String>> {
        self.runtime.block_on(self.inner.list_models())
    }

    pub fn pull_model(&self, name: &str) -> Result<bool> {
        self.runtime.block_on(self.inner.pull_model(name))
    }

    pub fn delete_model(&self, name: &str) -> Result<Value> {
        self.runtime.block_on(self.inner.delete_model(name))
    }

    fn wrap(&self, generation: crate::Generation) -> Generation {
        match generation {
            crate::Generation::Text(text) => Generation::Text(text),
            crate::Generation::Stream(stream) => Generation::Stream(self.fragments(stream)),
        }
    }

    fn fragments(&self, stream: FragmentStream) -> Fragments {
        Fragments {
            stream,
            runtime: self.runtime.clone(),
        }
    }
}

fn build_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::config(format!("failed to start runtime: {e}")))
}

/// Blocking outcome of a generation or chat call.
#[derive(Debug)]
pub enum Generation {
    Text(String),
    Stream(Fragments),
}

impl Generation {
    pub fn into_text(self) -> Option<String> {
        match self {
            Generation::Text(text) => Some(text),
            Generation::Stream(_) => None,
        }
    }

    pub fn into_stream(self) -> Option<Fragments> {
        match self {
            Generation::Stream(fragments) => Some(fragments),
            Generation::Text(_) => None,
        }
    }
}

/// Iterator over the fragments of a live response body.
///
/// Dropping it closes the connection, whether or not it was exhausted.
pub struct Fragments {
    stream: FragmentStream,
    runtime: Arc<Runtime>,
}

impl Iterator for Fragments {
    type Item = Result<ResponseFragment>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.stream.next_fragment())
    }
}

impl std::fmt::Debug for Fragments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fragments").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    fn client_with(transport: MockTransport) -> OllamaClient {
        let config = ClientConfig::new("http://localhost:11434")
            .unwrap()
            .with_model("llama3");
        OllamaClient::with_transport(config, Arc::new(transport)).unwrap()
    }

    #[test]
    fn test_blocking_generate() {
        let client = client_with(MockTransport::new().respond(200, &[br#"{"response":"X"}"#]));
        assert_eq!(client.generate("hi").unwrap(), "X");
    }

    #[test]
    fn test_blocking_stream_iterates_fragments() {
        let client = client_with(
            MockTransport::new().respond(200, &[b"{\"a\":1}\n\n", b"{\"a\":2}\n{\"a\":3}"]),
        );

        let texts: Vec<String> = client
            .generate_stream("hi")
            .unwrap()
            .map(|fragment| fragment.unwrap().into_string())
            .collect();
        assert_eq!(texts, vec!["{\"a\":1}", "{\"a\":2}", "{\"a\":3}"]);
    }

    #[test]
    fn test_blocking_stream_can_be_abandoned() {
        let client = client_with(
            MockTransport::new()
                .respond(200, &[b"{\"a\":1}\n", b"{\"a\":2}\n"])
                .respond(200, &[br#"{"models":[{"name":"llama3"}]}"#]),
        );

        let mut fragments = client.chat_stream(vec![ChatMessage::user("hi")]).unwrap();
        assert!(fragments.next().unwrap().is_ok());
        drop(fragments);

        assert_eq!(client.list_models().unwrap(), vec!["llama3"]);
    }

    #[test]
    fn test_blocking_send_generate_branches_on_stream_flag() {
        let client = client_with(
            MockTransport::new()
                .respond(200, &[br#"{"response":"buffered"}"#])
                .respond(200, &[b"{\"response\":\"s\"}\n"]),
        );

        let text = client.send_generate(GenerateRequest::new("hi")).unwrap();
        assert_eq!(text.into_text().as_deref(), Some("buffered"));

        let streamed = client
            .send_generate(GenerateRequest::new("hi").with_stream(true))
            .unwrap();
        assert_eq!(streamed.into_stream().unwrap().count(), 1);
    }

    #[test]
    fn test_blocking_errors_surface() {
        let client = client_with(MockTransport::new().respond(500, &[b"down"]));
        assert_eq!(client.pull_model("llama3").unwrap_err().status(), Some(500));
    }
}
