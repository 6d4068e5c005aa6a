//! Types for streamed and buffered response bodies.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One line of a streaming response body.
///
/// The text is passed through as received; parsing it is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFragment {
    text: String,
}

impl ResponseFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Parse the fragment as JSON.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.text)
            .map_err(|e| Error::decode(format!("invalid JSON in stream fragment: {e}"), &self.text))
    }
}

impl AsRef<str> for ResponseFragment {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for ResponseFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Reply of the generation endpoint: the whole body when buffered, or one fragment when streamed.
///
/// Fields the server sends with an unexpected type decode as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default, deserialize_with = "lenient::string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub response: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub done: bool,
}

impl GenerateResponse {
    /// Generated text, empty when the server sent none.
    pub fn text(&self) -> &str {
        self.response.as_deref().unwrap_or_default()
    }
}

/// Reply of the chat endpoint: the whole body when buffered, or one fragment when streamed.
///
/// Fields the server sends with an unexpected type decode as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "lenient::string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::message")]
    pub message: Option<ResponseMessage>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub done: bool,
}

impl ChatResponse {
    /// Assistant text, empty when `message` or `message.content` is absent.
    pub fn text(&self) -> &str {
        self.message
            .as_ref()
            .and_then(|message| message.content.as_deref())
            .unwrap_or_default()
    }
}

/// Message carried by a chat reply.
///
/// `role` is kept as sent; the server may answer with roles such as `tool`
/// that requests never use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default, deserialize_with = "lenient::string")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub content: Option<String>,
}

/// Deserializers that accept any JSON value and keep only the expected shape.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::ResponseMessage;

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(false))
    }

    pub fn message<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<ResponseMessage>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Ok(None);
        }
        Ok(serde_json::from_value(value).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_passthrough() {
        let fragment = ResponseFragment::new(r#"{"response":"Hel","done":false}"#);
        assert_eq!(fragment.as_str(), r#"{"response":"Hel","done":false}"#);
        assert_eq!(fragment.to_string(), fragment.as_str());

        let chunk: GenerateResponse = fragment.parse().unwrap();
        assert_eq!(chunk.text(), "Hel");
        assert!(!chunk.done);
    }

    #[test]
    fn test_fragment_parse_error_keeps_text() {
        let fragment = ResponseFragment::new("not json");
        match fragment.parse::<GenerateResponse>() {
            Err(Error::Decode { body, .. }) => assert_eq!(body, "not json"),
            other => panic!("Expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_generate_text_defaults_to_empty() {
        let body: GenerateResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert_eq!(body.text(), "");

        let body: GenerateResponse = serde_json::from_str(r#"{"response":null}"#).unwrap();
        assert_eq!(body.text(), "");
    }

    #[test]
    fn test_chat_text_defaults_to_empty() {
        let body: ChatResponse = serde_json::from_str(r#"{"message":{"content":"Y"}}"#).unwrap();
        assert_eq!(body.text(), "Y");

        let body: ChatResponse = serde_json::from_str(r#"{"message":{"role":"assistant"}}"#).unwrap();
        assert_eq!(body.text(), "");

        let body: ChatResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert_eq!(body.text(), "");
    }

    #[test]
    fn test_chat_reply_with_tool_role() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"message":{"role":"tool","content":"Y"},"done":true}"#).unwrap();
        assert_eq!(body.text(), "Y");
        assert!(body.done);
        assert_eq!(body.message.unwrap().role.as_deref(), Some("tool"));
    }

    #[test]
    fn test_unexpected_field_types_decode_as_absent() {
        let body: GenerateResponse =
            serde_json::from_str(r#"{"model":7,"response":"ok","done":"yes"}"#).unwrap();
        assert_eq!(body.text(), "ok");
        assert_eq!(body.model, None);
        assert!(!body.done);

        let body: ChatResponse =
            serde_json::from_str(r#"{"message":"Y","done":null}"#).unwrap();
        assert_eq!(body.text(), "");
        assert!(!body.done);

        let body: ChatResponse =
            serde_json::from_str(r#"{"message":{"role":{"name":"x"},"content":"Y"}}"#).unwrap();
        assert_eq!(body.text(), "Y");
    }
}
