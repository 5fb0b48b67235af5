use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream;
use log::debug;

use crate::error::LLMError;
use crate::http::{DEFAULT_TIMEOUT, DynHttpTransport, HttpRequest, encode_json};
use crate::provider::{CompletionStream, LLMProvider};
use crate::stream::{ResponseStream, SseDecoder, collect_stream_text};
use crate::types::{
    CompletionRequest, CompletionResponse, ResponseError, SpeechRequest, SpeechResponse,
};

use super::request::to_wire;
use super::response::from_wire;
use super::types::{OpenAiErrorBody, OpenAiResponse};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const PROVIDER: &str = "openai";

/// OpenAI-compatible backend: chat completions plus text-to-speech.
pub struct OpenAiProvider {
    transport: DynHttpTransport,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl OpenAiProvider {
    /// Creates a provider targeting the default OpenAI endpoint.
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the base URL, e.g. for OpenAI-compatible proxies.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn completion_endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{base}/chat/completions")
        } else {
            format!("{base}/v1/chat/completions")
        }
    }

    pub(crate) fn speech_endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{base}/audio/speech")
        } else {
            format!("{base}/v1/audio/speech")
        }
    }

    fn build_headers(&self) -> HashMap<String, String> {
        HashMap::from([
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.api_key),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ])
    }

    fn http_request(
        &self,
        url: String,
        payload: Vec<u8>,
        cancel: Option<&tokio_util::sync::CancellationToken>,
    ) -> HttpRequest {
        HttpRequest::post_json(url, payload)
            .with_headers(self.build_headers())
            .with_timeout(self.timeout)
            .with_cancel(cancel.cloned())
    }

    fn parse_response(text: &str) -> Result<OpenAiResponse, LLMError> {
        serde_json::from_str(text)
            .map_err(|err| LLMError::decode(PROVIDER, format!("failed to parse response: {err}")))
    }
}

#[async_trait]
impl LLMProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LLMError> {
        let payload = encode_json(&to_wire(request, false))?;
        let http = self.http_request(self.completion_endpoint(), payload, request.cancel.as_ref());
        let response = self.transport.send(http).await?;

        let status = response.status;
        let text = response.into_string()?;
        let parsed = Self::parse_response(&text)?;
        from_wire(parsed, status)
    }

    async fn stream_complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionStream, LLMError> {
        let payload = encode_json(&to_wire(request, true))?;
        let http = self.http_request(self.completion_endpoint(), payload, request.cancel.as_ref());
        let response = self.transport.send_stream(http).await?;

        let status = response.status;
        if !(200..300).contains(&status) {
            // The error body is a single whole response: decode it, emit it through
            // the same channel, then surface the provider error.
            let text = collect_stream_text(response.body, PROVIDER).await?;
            let canonical = from_wire(Self::parse_response(&text)?, status)?;
            let message = canonical
                .error
                .as_ref()
                .map(ResponseError::describe)
                .unwrap_or_else(|| format!("status {status}"));
            debug!("{PROVIDER} stream rejected: {message}");
            return Ok(Box::pin(stream::iter(vec![
                Ok(canonical),
                Err(LLMError::Provider {
                    provider: PROVIDER,
                    message,
                }),
            ])));
        }

        let events = SseDecoder::new(response.body, PROVIDER);
        Ok(Box::pin(ResponseStream::new(events, status, move |payload| {
            let parsed: OpenAiResponse = serde_json::from_str(payload).map_err(|err| {
                LLMError::decode(PROVIDER, format!("failed to parse stream chunk: {err}"))
            })?;
            from_wire(parsed, status)
        })))
    }

    async fn speech(&self, request: &SpeechRequest) -> Result<SpeechResponse, LLMError> {
        let payload = encode_json(request)?;
        let http = self.http_request(self.speech_endpoint(), payload, None);
        let response = self.transport.send(http).await?;

        let status = response.status;
        if (200..300).contains(&status) {
            return Ok(SpeechResponse {
                audio: response.body,
                error: None,
                status_code: status,
            });
        }

        let text = response.into_string()?;
        let body: OpenAiErrorBody = serde_json::from_str(&text).map_err(|err| {
            LLMError::decode(PROVIDER, format!("failed to parse speech error body: {err}"))
        })?;
        let error = body.error.and_then(|err| {
            if err.message.is_empty() && err.error_type.is_empty() {
                None
            } else {
                Some(ResponseError {
                    error_type: err.error_type,
                    message: err.message,
                })
            }
        });
        Ok(SpeechResponse {
            audio: Vec::new(),
            error,
            status_code: status,
        })
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
