use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::LLMError;
use crate::types::{CompletionRequest, CompletionResponse, SpeechRequest, SpeechResponse};

pub mod gemini;
pub mod ollama;
pub mod openai;

/// Canonical chunk stream: zero or more responses, then exactly one terminal marker.
pub type CompletionStream =
    Pin<Box<dyn Stream<Item = Result<CompletionResponse, LLMError>> + Send>>;

/// Capability interface every backend implements.
///
/// Each provider owns its wire translation (`request.rs`/`response.rs` pure mapping
/// pairs) and its transport wiring; the façade dispatches through this trait rather
/// than switching on provider types at call sites.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Sends a completion request and waits for the whole response.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LLMError>;

    /// Sends a completion request and returns the canonical chunk stream.
    async fn stream_complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionStream, LLMError>;

    /// Synthesizes speech from text.
    ///
    /// # Errors
    ///
    /// The default implementation reports [`LLMError::UnsupportedCapability`]; only
    /// backends with a speech endpoint override it.
    async fn speech(&self, _request: &SpeechRequest) -> Result<SpeechResponse, LLMError> {
        Err(LLMError::UnsupportedCapability {
            provider: self.name(),
            capability: "text_to_speech",
        })
    }

    /// Stable provider identifier used in logs and error messages.
    fn name(&self) -> &'static str;
}

/// Thread-safe provider handle.
pub type DynProvider = Arc<dyn LLMProvider>;
