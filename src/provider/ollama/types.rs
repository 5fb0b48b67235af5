//! Wire schema for the Ollama chat endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub(crate) struct OllamaRequest {
    pub(crate) model: String,
    pub(crate) messages: Vec<OllamaMessage>,
    pub(crate) stream: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct OllamaMessage {
    #[serde(default)]
    pub(crate) role: String,
    #[serde(default)]
    pub(crate) content: String,
}

/// Whole responses and streaming chunks share one schema; a stream is a sequence of
/// these objects with `done:false` until the final one flips it.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OllamaResponse {
    #[serde(rename = "created_at", default)]
    pub(crate) created_at: String,
    #[serde(default)]
    pub(crate) model: String,
    #[serde(default)]
    pub(crate) message: OllamaMessage,
    #[serde(default)]
    pub(crate) done: bool,
    #[serde(rename = "prompt_eval_count", default)]
    pub(crate) prompt_eval_count: u32,
    #[serde(rename = "eval_count", default)]
    pub(crate) eval_count: u32,
    #[serde(default)]
    pub(crate) error: String,
}
