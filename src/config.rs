//! Declarative client configuration.
//!
//! A [`ClientConfig`] is the serde-friendly description of one backend; applications
//! deserialize it from their own config files and hand it to
//! [`build_client_from_config`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::LLMClient;
use crate::error::LLMError;
use crate::http::DynHttpTransport;

/// Supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenAi,
    Ollama,
    Gemini,
}

/// Authentication material for a backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credential {
    /// Plain API key.
    ApiKey { key: String },
    /// Bearer token, sent the same way as an API key here.
    Bearer { token: String },
    /// No authentication (local providers).
    #[default]
    None,
}

impl Credential {
    fn api_key(&self) -> Option<String> {
        match self {
            Credential::ApiKey { key } => Some(key.clone()),
            Credential::Bearer { token } => Some(token.clone()),
            Credential::None => None,
        }
    }
}

/// Serde-deserializable description of one client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub provider: ProviderKind,
    #[serde(default)]
    pub credential: Credential,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Per-request deadline in seconds; the default is 30.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Builds an [`LLMClient`] from a declarative configuration.
///
/// # Errors
///
/// Returns [`LLMError::InvalidConfig`] when a required field for the selected
/// provider is missing.
pub fn build_client_from_config(
    config: &ClientConfig,
    transport: DynHttpTransport,
) -> Result<LLMClient, LLMError> {
    let mut builder = LLMClient::builder()
        .provider(config.provider)
        .transport(transport);

    if let Some(key) = config.credential.api_key() {
        builder = builder.api_key(key);
    }
    if let Some(base_url) = &config.base_url {
        builder = builder.base_url(base_url.clone());
    }
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}
