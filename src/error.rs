use thiserror::Error;

/// Aggregates every failure mode exposed by the unified client.
///
/// Callers can match on the specific variant to decide whether to re-prompt the user,
/// fall back to another provider, or surface an actionable message. Validation errors
/// are raised before any network traffic; everything else describes a failed call.
#[derive(Debug, Error)]
pub enum LLMError {
    /// Signals validation failures in a request under construction.
    #[error("invalid request: {message}")]
    Validation { message: String },
    /// Represents transport-layer or networking failures.
    #[error("transport error: {message}")]
    Transport { message: String },
    /// Surfaces cancellations triggered through the request's cancellation token.
    #[error("request aborted: {message}")]
    Aborted { message: String },
    /// Raised by [`crate::types::Chat::pop`] when no messages remain.
    #[error("chat is empty")]
    EmptyChat,
    /// Declares that the selected provider does not implement the requested operation.
    #[error("provider {provider} does not support {capability}")]
    UnsupportedCapability {
        provider: &'static str,
        capability: &'static str,
    },
    /// Reports a malformed provider payload (bad JSON chunk, bad timestamp).
    #[error("malformed {provider} payload: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
    /// Wraps an error reported by the provider itself, usually with a non-2xx status.
    #[error("provider {provider} error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
    /// Raised when building or validating client configuration fails.
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig { field: String, reason: String },
}

impl LLMError {
    /// Creates an [`LLMError::Transport`] from a textual description.
    pub fn transport<T: Into<String>>(message: T) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an [`LLMError::Validation`] from a textual description.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an [`LLMError::Decode`] with the given provider name and message.
    pub fn decode<T: Into<String>>(provider: &'static str, message: T) -> Self {
        Self::Decode {
            provider,
            message: message.into(),
        }
    }

    /// Creates an [`LLMError::Provider`] with the given provider name and message.
    ///
    /// # Examples
    ///
    /// ```
    /// use hanashi::error::LLMError;
    ///
    /// let err = LLMError::provider("openai", "bad JSON payload");
    /// assert!(matches!(err, LLMError::Provider { provider: "openai", .. }));
    /// ```
    pub fn provider<T: Into<String>>(provider: &'static str, message: T) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }
}
