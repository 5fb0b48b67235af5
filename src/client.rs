use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::config::ProviderKind;
use crate::error::LLMError;
use crate::http::{DEFAULT_TIMEOUT, DynHttpTransport, reqwest::default_dyn_transport};
use crate::provider::gemini::GeminiProvider;
use crate::provider::ollama::OllamaProvider;
use crate::provider::openai::OpenAiProvider;
use crate::provider::{CompletionStream, DynProvider};
use crate::types::{CompletionRequest, CompletionResponse, SpeechRequest, SpeechResponse};

/// Unified façade over the configured backend.
///
/// The client owns no per-request state: it validates nothing itself (requests are
/// validated by their builders) and retries nothing: it dispatches to the selected
/// provider and forwards the canonical result.
///
/// # Examples
///
/// ```no_run
/// use hanashi::LLMClient;
/// use hanashi::config::ProviderKind;
/// use hanashi::types::{CompletionRequest, Message};
///
/// # async fn run() -> Result<(), hanashi::LLMError> {
/// let client = LLMClient::builder()
///     .provider(ProviderKind::OpenAi)
///     .api_key("sk-...")
///     .build()?;
///
/// let request = CompletionRequest::builder()
///     .model("gpt-4.1-mini")
///     .messages(vec![Message::user("hi")])
///     .build()?;
/// let response = client.complete(&request).await?;
/// println!("{}", response.text());
/// # Ok(())
/// # }
/// ```
pub struct LLMClient {
    kind: ProviderKind,
    provider: DynProvider,
}

impl std::fmt::Debug for LLMClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMClient")
            .field("kind", &self.kind)
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl LLMClient {
    /// Starts a new builder.
    pub fn builder() -> LLMClientBuilder {
        LLMClientBuilder::default()
    }

    /// Wraps an already-constructed provider.
    pub fn from_provider(kind: ProviderKind, provider: DynProvider) -> Self {
        Self { kind, provider }
    }

    /// Sends a completion request and waits for the whole canonical response.
    ///
    /// Provider-reported failures arrive in the response's `error` field with the
    /// HTTP status attached; `Err` is reserved for transport, decode, and abort
    /// failures. Check both for full fidelity.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LLMError> {
        debug!("dispatching completion to {}", self.provider.name());
        self.provider.complete(request).await
    }

    /// Sends a completion request and returns the canonical chunk stream: zero or
    /// more chunks, then exactly one terminal marker, then end of stream.
    pub async fn stream_complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionStream, LLMError> {
        debug!("dispatching streaming completion to {}", self.provider.name());
        self.provider.stream_complete(request).await
    }

    /// Synthesizes speech from text.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::UnsupportedCapability`] when the configured provider has
    /// no speech endpoint.
    pub async fn text_to_speech(
        &self,
        request: &SpeechRequest,
    ) -> Result<SpeechResponse, LLMError> {
        debug!("dispatching speech request to {}", self.provider.name());
        self.provider.speech(request).await
    }

    /// The configured provider kind.
    pub fn provider_kind(&self) -> ProviderKind {
        self.kind
    }

    /// The provider's stable identifier.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

/// Validating builder for [`LLMClient`].
#[derive(Default)]
pub struct LLMClientBuilder {
    provider: Option<ProviderKind>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    transport: Option<DynHttpTransport>,
}

impl LLMClientBuilder {
    /// Selects the backend.
    pub fn provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the API key (OpenAI, Gemini).
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the base URL (required for Ollama, optional override elsewhere).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Overrides the default 30-second per-request deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Substitutes a custom transport (tests, instrumentation).
    pub fn transport(mut self, transport: DynHttpTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validates the configuration and builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::InvalidConfig`] naming the missing field.
    pub fn build(self) -> Result<LLMClient, LLMError> {
        let kind = self.provider.ok_or_else(|| LLMError::InvalidConfig {
            field: "provider".to_string(),
            reason: "a provider must be selected".to_string(),
        })?;
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_dyn_transport()?,
        };

        let provider: DynProvider = match kind {
            ProviderKind::OpenAi => {
                let api_key = require(self.api_key, "api_key", "OpenAI requires an API key")?;
                let mut provider =
                    OpenAiProvider::new(transport, api_key).with_timeout(timeout);
                if let Some(base_url) = self.base_url {
                    provider = provider.with_base_url(base_url);
                }
                Arc::new(provider)
            }
            ProviderKind::Ollama => {
                let base_url = require(self.base_url, "base_url", "Ollama requires a base URL")?;
                Arc::new(OllamaProvider::new(transport, base_url).with_timeout(timeout))
            }
            ProviderKind::Gemini => {
                let api_key = require(self.api_key, "api_key", "Gemini requires an API key")?;
                let mut provider =
                    GeminiProvider::new(transport, api_key).with_timeout(timeout);
                if let Some(base_url) = self.base_url {
                    provider = provider.with_base_url(base_url);
                }
                Arc::new(provider)
            }
        };

        Ok(LLMClient { kind, provider })
    }
}

fn require(
    value: Option<String>,
    field: &str,
    reason: &str,
) -> Result<String, LLMError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(LLMError::InvalidConfig {
            field: field.to_string(),
            reason: reason.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct DummyProvider;

    #[async_trait]
    impl crate::provider::LLMProvider for DummyProvider {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, LLMError> {
            Ok(CompletionResponse::default())
        }

        async fn stream_complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionStream, LLMError> {
            Ok(Box::pin(futures_util::stream::empty()))
        }

        fn name(&self) -> &'static str {
            "dummy"
        }
    }

    #[test]
    fn build_requires_a_provider() {
        let err = LLMClient::builder().build().expect_err("should fail");
        match err {
            LLMError::InvalidConfig { field, .. } => assert_eq!(field, "provider"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn openai_requires_api_key() {
        let err = LLMClient::builder()
            .provider(ProviderKind::OpenAi)
            .build()
            .expect_err("should fail");
        match err {
            LLMError::InvalidConfig { field, .. } => assert_eq!(field, "api_key"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ollama_requires_base_url() {
        let err = LLMClient::builder()
            .provider(ProviderKind::Ollama)
            .api_key("unused")
            .build()
            .expect_err("should fail");
        match err {
            LLMError::InvalidConfig { field, .. } => assert_eq!(field, "base_url"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn every_provider_kind_builds() {
        assert!(LLMClient::builder()
            .provider(ProviderKind::OpenAi)
            .api_key("k")
            .build()
            .is_ok());
        assert!(LLMClient::builder()
            .provider(ProviderKind::Ollama)
            .base_url("http://localhost:11434")
            .build()
            .is_ok());
        assert!(LLMClient::builder()
            .provider(ProviderKind::Gemini)
            .api_key("k")
            .build()
            .is_ok());
    }

    #[tokio::test]
    async fn speech_on_capability_less_provider_is_a_named_error() {
        let client =
            LLMClient::from_provider(ProviderKind::Ollama, Arc::new(DummyProvider));
        let request = SpeechRequest::builder()
            .model("tts-1")
            .input("hello")
            .voice(crate::types::Voice::Nova)
            .build()
            .unwrap();

        let err = client
            .text_to_speech(&request)
            .await
            .expect_err("should fail");
        assert!(matches!(err, LLMError::UnsupportedCapability { .. }));
    }
}
