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
use super::types::OllamaResponse;

const PROVIDER: &str = "ollama";

/// Ollama backend. Requires a base URL (typically `http://localhost:11434`); the
/// endpoint takes no authentication.
pub struct OllamaProvider {
    transport: DynHttpTransport,
    base_url: String,
    timeout: Duration,
}

impl OllamaProvider {
    /// Creates a provider against the given Ollama server.
    pub fn new(transport: DynHttpTransport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }

    fn build_headers(&self) -> HashMap<String, String> {
        HashMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ])
    }

    fn http_request(&self, payload: Vec<u8>, request: &CompletionRequest) -> HttpRequest {
        HttpRequest::post_json(self.endpoint(), payload)
            .with_headers(self.build_headers())
            .with_timeout(self.timeout)
            .with_cancel(request.cancel.clone())
    }

    fn parse_response(text: &str) -> Result<OllamaResponse, LLMError> {
        serde_json::from_str(text)
            .map_err(|err| LLMError::decode(PROVIDER, format!("failed to parse response: {err}")))
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LLMError> {
        let payload = encode_json(&to_wire(request, false))?;
        let response = self.transport.send(self.http_request(payload, request)).await?;

        let status = response.status;
        let text = response.into_string()?;
        from_wire(Self::parse_response(&text)?, status)
    }

    async fn stream_complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionStream, LLMError> {
        let payload = encode_json(&to_wire(request, true))?;
        let response = self
            .transport
            .send_stream(self.http_request(payload, request))
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

        // Ollama streams bare NDJSON; the decoder's prefix strip is a no-op and end
        // of input is the normal termination.
        let events = SseDecoder::new(response.body, PROVIDER);
        Ok(Box::pin(ResponseStream::new(events, status, move |payload| {
            let parsed: OllamaResponse = serde_json::from_str(payload).map_err(|err| {
                LLMError::decode(PROVIDER, format!("failed to parse stream chunk: {err}"))
            })?;
            from_wire(parsed, status)
        })))
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http::reqwest::ReqwestTransport;
    use crate::types::{SpeechRequest, Voice};

    fn provider() -> OllamaProvider {
        let transport = Arc::new(ReqwestTransport::default_client().expect("transport"));
        OllamaProvider::new(transport, "http://localhost:11434/")
    }

    #[test]
    fn endpoint_joins_base_and_api_chat() {
        assert_eq!(provider().endpoint(), "http://localhost:11434/api/chat");
    }

    #[tokio::test]
    async fn speech_is_an_unsupported_capability() {
        let request = SpeechRequest::builder()
            .model("tts-1")
            .input("hello")
            .voice(Voice::Alloy)
            .build()
            .unwrap();

        let err = provider().speech(&request).await.expect_err("should fail");
        assert!(matches!(
            err,
            LLMError::UnsupportedCapability {
                provider: "ollama",
                capability: "text_to_speech",
            }
        ));
    }
}
