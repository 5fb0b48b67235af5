use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream;
use log::debug;

use crate::error::LLMError;
use crate::http::{DEFAULT_TIMEOUT, DynHttpTransport, HttpRequest, encode_json};
use crate::provider::{CompletionStream, LLMProvider};
use crate::stream::{ResponseStream, SseDecoder, collect_stream_text};
use crate::types::{CompletionRequest, CompletionResponse, ResponseError};

use super::request::to_wire;
use super::response::from_wire;
use super::types::GeminiResponse;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const PROVIDER: &str = "gemini";

/// Google Gemini backend. The model name travels in the URL path and the API key in
/// the query string, per the GenerateContent contract.
pub struct GeminiProvider {
    transport: DynHttpTransport,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiProvider {
    /// Creates a provider targeting the default Generative Language endpoint.
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the base URL, e.g. for proxies or compatibility layers.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            normalize_model(model),
            self.api_key
        )
    }

    pub(crate) fn stream_endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url.trim_end_matches('/'),
            normalize_model(model),
            self.api_key
        )
    }

    fn build_headers(&self) -> HashMap<String, String> {
        HashMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ])
    }

    fn http_request(&self, url: String, payload: Vec<u8>, request: &CompletionRequest) -> HttpRequest {
        HttpRequest::post_json(url, payload)
            .with_headers(self.build_headers())
            .with_timeout(self.timeout)
            .with_cancel(request.cancel.clone())
    }

    fn parse_response(text: &str) -> Result<GeminiResponse, LLMError> {
        // Some front-ends frame even whole bodies as a single SSE event.
        let text = text.trim().strip_prefix("data: ").unwrap_or(text.trim());
        serde_json::from_str(text)
            .map_err(|err| LLMError::decode(PROVIDER, format!("failed to parse response: {err}")))
    }
}

fn normalize_model(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LLMError> {
        let url = self.endpoint(&request.model);
        let payload = encode_json(&to_wire(request))?;
        let response = self.transport.send(self.http_request(url, payload, request)).await?;

        let status = response.status;
        let text = response.into_string()?;
        from_wire(Self::parse_response(&text)?, status)
    }

    async fn stream_complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionStream, LLMError> {
        let url = self.stream_endpoint(&request.model);
        let payload = encode_json(&to_wire(request))?;
        let response = self
            .transport
            .send_stream(self.http_request(url, payload, request))
            .await?;

        let status = response.status;
        if !(200..300).contains(&status) {
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
            let parsed: GeminiResponse = serde_json::from_str(payload).map_err(|err| {
                LLMError::decode(PROVIDER, format!("failed to parse stream chunk: {err}"))
            })?;
            from_wire(parsed, status)
        })))
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
