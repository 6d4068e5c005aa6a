//! Request objects for the generation and chat endpoints.
//!
//! Each request has a fixed set of named fields plus an open-ended `options`
//! map. When the wire payload is built, the named fields are written first and
//! `options` is spread on top, so an option whose key matches a named field
//! (`model`, `prompt`, `messages`, `stream`) replaces it.

use serde_json::{Map, Value};

use super::message::ChatMessage;
use crate::{Error, Result};

/// Extra request fields merged over the canonical ones.
pub type Options = Map<String, Value>;

/// A request against the generation endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Per-call model, taking precedence over the configured default.
    pub model: Option<String>,
    pub stream: bool,
    pub options: Options,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Add one extra field to the payload.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Add many extra fields; later keys overwrite earlier ones.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options.extend(options);
        self
    }

    pub(crate) fn into_payload(self, default_model: Option<&str>) -> Result<Payload> {
        let mut body = Map::new();
        insert_model(&mut body, self.model.as_deref().or(default_model));
        body.insert("prompt".to_string(), Value::String(self.prompt));
        body.insert("stream".to_string(), Value::Bool(self.stream));
        Payload::merge(body, self.options)
    }
}

/// A request against the chat endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    /// Conversation so far, sent in the given order.
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub stream: bool,
    pub options: Options,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Append a message to the conversation.
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options.extend(options);
        self
    }

    pub(crate) fn into_payload(self, default_model: Option<&str>) -> Result<Payload> {
        let mut body = Map::new();
        insert_model(&mut body, self.model.as_deref().or(default_model));
        body.insert("messages".to_string(), serde_json::to_value(self.messages)?);
        body.insert("stream".to_string(), Value::Bool(self.stream));
        Payload::merge(body, self.options)
    }
}

fn insert_model(body: &mut Map<String, Value>, model: Option<&str>) {
    if let Some(model) = model {
        body.insert("model".to_string(), Value::String(model.to_string()));
    }
}

/// A validated wire payload.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Payload {
    pub body: Value,
    pub model: String,
    /// Effective stream flag after options were merged.
    pub stream: bool,
}

impl Payload {
    fn merge(mut body: Map<String, Value>, options: Options) -> Result<Self> {
        body.extend(options);

        let model = match body.get("model") {
            Some(Value::String(model)) if !model.is_empty() => model.clone(),
            Some(Value::String(_)) | None => {
                return Err(Error::validation(
                    "no model specified: configure a default model or set one on the request",
                ));
            }
            Some(other) => {
                return Err(Error::validation(format!(
                    "model must be a string, got {other}"
                )));
            }
        };

        let stream = match body.get("stream") {
            Some(Value::Bool(stream)) => *stream,
            other => {
                return Err(Error::validation(format!(
                    "stream must be a boolean, got {}",
                    other.map_or_else(|| "nothing".to_string(), Value::to_string)
                )));
            }
        };

        Ok(Self {
            body: Value::Object(body),
            model,
            stream,
        })
    }
}
