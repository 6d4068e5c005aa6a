//! HTTP transport between the client and the inference server.

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::pin::Pin;

use crate::{ClientConfig, Error, Result};

/// A response body as a stream of raw chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A request against one of the fixed API paths.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: &'static str,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: &'static str) -> Self {
        Self {
            method: Method::GET,
            path,
            body: None,
        }
    }

    pub fn post(path: &'static str, body: Value) -> Self {
        Self {
            method: Method::POST,
            path,
            body: Some(body),
        }
    }

    pub fn delete(path: &'static str, body: Value) -> Self {
        Self {
            method: Method::DELETE,
            path,
            body: Some(body),
        }
    }
}

/// A response whose body has not been read yet.
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: ByteStream,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: ByteStream) -> Self {
        Self { status, body }
    }

    /// Read the whole body into memory.
    pub async fn bytes(mut self) -> Result<Bytes> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.body.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }

    /// Read the whole body as text, replacing invalid UTF-8.
    pub async fn text_lossy(self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Sends requests to the server and hands back the live response.
///
/// Implementations only move bytes; status handling belongs to the client.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse>;
}

/// Transport backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport honouring the configured timeouts.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url().to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method, format!("{}{}", self.base_url, request.path));
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(Error::from));

        Ok(HttpResponse::new(status, Box::pin(body)))
    }
}
