use std::time::Duration;

use crate::{Error, Result};

/// Address of a locally running inference server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "llama3";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client configuration. Immutable once handed to a client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    base_url: String,
    default_model: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a configuration for the given base address, with no default model.
    ///
    /// A trailing `/` is trimmed so endpoint paths can be appended directly.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| Error::config(format!("invalid base URL {base_url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "unsupported URL scheme {:?} in {base_url:?}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url,
            default_model: None,
            timeout: None,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
        })
    }

    /// Set the model used when a request carries no override.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// Clear the default model; every request must then name its own.
    pub fn without_model(mut self) -> Self {
        self.default_model = None;
        self
    }

    /// Total time allowed for a request, including reading a streamed body.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_model(&self) -> Option<&str> {
        self.default_model.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: Some(DEFAULT_MODEL.to_string()),
            timeout: None,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
        }
    }
}
