use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_core::Stream;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::LLMError;

/// Default per-request deadline, covering the whole call including streaming reads.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Enumerates HTTP methods understood by the lightweight transport abstraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Minimal HTTP request representation shared across providers.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl HttpRequest {
    /// Builds a POST request with a JSON body and `Content-Type` preset.
    ///
    /// # Examples
    ///
    /// ```
    /// use hanashi::http::{HttpMethod, HttpRequest};
    ///
    /// let request = HttpRequest::post_json("https://example.com", br"{}".to_vec());
    /// assert_eq!(request.method, HttpMethod::Post);
    /// assert_eq!(request.headers.get("Content-Type"), Some(&"application/json".to_string()));
    /// ```
    pub fn post_json(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: HashMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            body: Some(body),
            timeout: None,
            cancel: None,
        }
    }

    /// Replaces the request headers.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attaches a cancellation token aborting the in-flight call.
    pub fn with_cancel(mut self, cancel: Option<CancellationToken>) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Minimal HTTP response representation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Converts the body into a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::Transport`] when the body is not valid UTF-8.
    pub fn into_string(self) -> Result<String, LLMError> {
        String::from_utf8(self.body).map_err(|err| LLMError::transport(err.to_string()))
    }
}

/// HTTP response that carries a streaming body.
pub struct HttpStreamResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: HttpBodyStream,
}

/// Alias for the body stream returned by [`HttpTransport::send_stream`].
pub type HttpBodyStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, LLMError>> + Send>>;

/// Transport abstraction decoupling providers from the concrete HTTP client.
///
/// Tests substitute in-memory implementations to exercise providers without a
/// network; production code uses [`reqwest::ReqwestTransport`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and resolves when the full response body is available.
    ///
    /// Non-2xx statuses are *not* errors at this layer; the status travels with the
    /// response so adapters can surface provider-reported failures faithfully.
    ///
    /// # Errors
    ///
    /// Implementations map connection-level failures to [`LLMError::Transport`] and
    /// cancellations to [`LLMError::Aborted`].
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LLMError>;

    /// Sends a request and returns a streaming body for SSE-style consumption.
    ///
    /// # Errors
    ///
    /// Same contract as [`HttpTransport::send`].
    async fn send_stream(&self, request: HttpRequest) -> Result<HttpStreamResponse, LLMError>;
}

/// Thread-safe handle to a transport implementation.
pub type DynHttpTransport = Arc<dyn HttpTransport>;

/// Serializes a wire request body to JSON.
///
/// Centralized so every provider reports serialization failures the same way.
///
/// # Errors
///
/// Returns [`LLMError::Validation`] when serialization fails.
pub fn encode_json<T: Serialize>(body: &T) -> Result<Vec<u8>, LLMError> {
    serde_json::to_vec(body).map_err(|err| LLMError::Validation {
        message: format!("failed to serialize request: {err}"),
    })
}

pub mod reqwest;
