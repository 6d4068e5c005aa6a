//! Async client for the inference server.

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::ndjson_stream::NdjsonStreamExt;
use crate::transport::{ApiRequest, HttpResponse, HttpTransport, Transport};
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, ClientConfig, GenerateRequest, GenerateResponse,
    ModelList,
};
use crate::{Error, FragmentStream, Generation, Result};

const GENERATE_PATH: &str = "/api/generate";
const CHAT_PATH: &str = "/api/chat";
const TAGS_PATH: &str = "/api/tags";
const PULL_PATH: &str = "/api/pull";
const DELETE_PATH: &str = "/api/delete";

/// Client for generation, chat and model management.
///
/// Holds only immutable configuration; every call is an independent
/// request/response exchange. Failures are returned as-is, never retried.
///
/// ```no_run
/// use ollama_client::{ChatMessage, OllamaClient};
///
/// # async fn example() -> ollama_client::Result<()> {
/// let client = OllamaClient::localhost()?;
/// let answer = client
///     .chat(vec![ChatMessage::user("What is quantum computing?")])
///     .await?;
/// println!("{answer}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OllamaClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl OllamaClient {
    /// Create a client that talks HTTP to `config.base_url()`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client for the local server with the default model.
    pub fn localhost() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Create a client on top of a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run a generation request, buffered or streamed according to its stream flag.
    pub async fn send_generate(&self, request: GenerateRequest) -> Result<Generation> {
        let payload = request.into_payload(self.config.default_model())?;
        tracing::debug!(model = %payload.model, stream = payload.stream, "generate");

        let response = self
            .dispatch(ApiRequest::post(GENERATE_PATH, payload.body))
            .await?;
        if payload.stream {
            return Ok(Generation::Stream(fragments(response)));
        }

        let body: GenerateResponse = read_json(response).await?;
        Ok(Generation::Text(body.text().to_string()))
    }

    /// Generate a completion for `prompt` and return the full text.
    pub async fn generate(&self, prompt: impl Into<String>) -> Result<String> {
        let generation = self.send_generate(GenerateRequest::new(prompt)).await?;
        text_of(generation)
    }

    /// Generate a completion for `prompt` as a stream of NDJSON fragments.
    pub async fn generate_stream(&self, prompt: impl Into<String>) -> Result<FragmentStream> {
        let request = GenerateRequest::new(prompt).with_stream(true);
        stream_of(self.send_generate(request).await?)
    }

    /// Run a chat request, buffered or streamed according to its stream flag.
    pub async fn send_chat(&self, request: ChatRequest) -> Result<Generation> {
        let messages = request.messages.len();
        let last_role = request.messages.last().map_or("none", |m| m.role.as_str());
        let payload = request.into_payload(self.config.default_model())?;
        tracing::debug!(
            model = %payload.model,
            stream = payload.stream,
            messages,
            last_role,
            "chat"
        );

        let response = self.dispatch(ApiRequest::post(CHAT_PATH, payload.body)).await?;
        if payload.stream {
            return Ok(Generation::Stream(fragments(response)));
        }

        let body: ChatResponse = read_json(response).await?;
        Ok(Generation::Text(body.text().to_string()))
    }

    /// Continue a conversation and return the assistant's full reply.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let generation = self.send_chat(ChatRequest::new(messages)).await?;
        text_of(generation)
    }

    /// Continue a conversation, streaming the reply as NDJSON fragments.
    pub async fn chat_stream(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream> {
        let request = ChatRequest::new(messages).with_stream(true);
        stream_of(self.send_chat(request).await?)
    }

    /// Names of the installed models, in server order.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self.dispatch(ApiRequest::get(TAGS_PATH)).await?;
        let list: ModelList = read_json(response).await?;
        Ok(list.into_names())
    }

    /// Ask the server to pull a model.
    ///
    /// The pull progress body is read to its end, then the 2xx-ness of the
    /// status is returned. Download completion is not tracked.
    pub async fn pull_model(&self, name: &str) -> Result<bool> {
        tracing::debug!(model = name, "pull model");
        let response = self
            .dispatch(ApiRequest::post(PULL_PATH, json!({ "name": name })))
            .await?;
        let accepted = response.status.is_success();
        response.bytes().await?;
        Ok(accepted)
    }

    /// Delete a model and return the server's JSON reply unchanged.
    pub async fn delete_model(&self, name: &str) -> Result<Value> {
        tracing::debug!(model = name, "delete model");
        let response = self
            .dispatch(ApiRequest::delete(DELETE_PATH, json!({ "name": name })))
            .await?;
        read_json(response).await
    }

    /// Send a request and turn failure statuses into [`Error::Server`].
    async fn dispatch(&self, request: ApiRequest) -> Result<HttpResponse> {
        tracing::debug!(method = %request.method, path = request.path, "sending request");
        let response = self.transport.send(request).await?;

        let status = response.status;
        if status.is_client_error() || status.is_server_error() {
            // The status matters more than a body we failed to read
            let body = response.text_lossy().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "server returned an error");
            return Err(Error::Server {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Hand a live body to the line decoder.
fn fragments(response: HttpResponse) -> FragmentStream {
    let lines = response.body.ndjson_lines().inspect(|item| {
        if let Ok(fragment) = item {
            tracing::trace!(fragment = fragment.as_str(), "stream fragment");
        }
    });
    FragmentStream::from_stream(lines)
}

/// Read a whole body and parse it as JSON.
async fn read_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        Error::decode(
            format!("invalid JSON response: {e}"),
            String::from_utf8_lossy(&bytes),
        )
    })
}

/// Text of a generation that was expected to be buffered.
fn text_of(generation: Generation) -> Result<String> {
    match generation {
        Generation::Text(text) => Ok(text),
        Generation::Stream(_) => Err(Error::validation(
            "expected a buffered response but the request was streamed",
        )),
    }
}

/// Stream of a generation that was expected to be streamed.
fn stream_of(generation: Generation) -> Result<FragmentStream> {
    match generation {
        Generation::Stream(stream) => Ok(stream),
        Generation::Text(_) => Err(Error::validation(
            "expected a streamed response but the request was buffered",
        )),
    }
}
