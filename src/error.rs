use thiserror::Error;

/// Longest body excerpt carried by a decode error.
const MAX_BODY_EXCERPT: usize = 512;

/// Errors that can occur when talking to the inference server.
#[derive(Error, Debug)]
pub enum Error {
    /// The request could not be built, e.g. no model could be resolved.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The request could not be sent or no response was received.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a 4xx/5xx status.
    #[error("Server returned status {status}: {body}")]
    Server { status: u16, body: String },

    /// A body or stream line could not be decoded.
    #[error("Failed to decode response: {message}")]
    Decode { message: String, body: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Build a decode error, keeping a bounded excerpt of the offending body.
    pub fn decode(message: impl Into<String>, body: impl AsRef<str>) -> Self {
        let body = body.as_ref();
        let body = match body.char_indices().nth(MAX_BODY_EXCERPT) {
            Some((end, _)) => format!("{}...", &body[..end]),
            None => body.to_string(),
        };
        Error::Decode {
            message: message.into(),
            body,
        }
    }

    /// HTTP status carried by a server error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Server { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::decode(format!("invalid JSON: {e}"), "")
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
