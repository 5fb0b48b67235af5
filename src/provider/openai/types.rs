//! Wire schema for the OpenAI-compatible chat-completions endpoint.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::Tool;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct OpenAiRequest {
    pub(crate) model: String,
    pub(crate) messages: Vec<OpenAiMessage>,
    pub(crate) stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) logit_bias: Option<HashMap<u32, i32>>,
    #[serde(rename = "logprobs", skip_serializing_if = "Option::is_none")]
    pub(crate) log_probs: Option<bool>,
    #[serde(rename = "top_logprobs", skip_serializing_if = "Option::is_none")]
    pub(crate) top_log_probs: Option<u8>,
    #[serde(rename = "max_completion_tokens", skip_serializing_if = "Option::is_none")]
    pub(crate) max_tokens: Option<u32>,
    #[serde(rename = "n", skip_serializing_if = "Option::is_none")]
    pub(crate) completion_choices: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) seed: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) stop: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct OpenAiMessage {
    #[serde(default)]
    pub(crate) role: String,
    #[serde(default)]
    pub(crate) content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) tool_calls: Vec<OpenAiToolCall>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct OpenAiToolCall {
    #[serde(default)]
    pub(crate) id: String,
    #[serde(rename = "type", default)]
    pub(crate) kind: String,
    #[serde(default)]
    pub(crate) function: OpenAiToolFunction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct OpenAiToolFunction {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) arguments: String,
}

/// Whole responses and streaming deltas share one schema: a chunk carries `delta`
/// where a whole response carries `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OpenAiResponse {
    #[serde(default)]
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) created: i64,
    #[serde(default)]
    pub(crate) model: String,
    #[serde(default)]
    pub(crate) choices: Vec<OpenAiChoice>,
    #[serde(default)]
    pub(crate) usage: OpenAiUsage,
    #[serde(default)]
    pub(crate) error: Option<OpenAiError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OpenAiChoice {
    #[serde(default)]
    pub(crate) message: Option<OpenAiMessage>,
    #[serde(default)]
    pub(crate) delta: Option<OpenAiMessage>,
    #[serde(default)]
    pub(crate) finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OpenAiUsage {
    #[serde(default)]
    pub(crate) prompt_tokens: u32,
    #[serde(default)]
    pub(crate) completion_tokens: u32,
    #[serde(default)]
    pub(crate) total_tokens: u32,
    #[serde(default)]
    pub(crate) completion_tokens_details: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OpenAiError {
    #[serde(default)]
    pub(crate) message: String,
    #[serde(rename = "type", default)]
    pub(crate) error_type: String,
}

/// Error envelope returned by the speech endpoint on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OpenAiErrorBody {
    #[serde(default)]
    pub(crate) error: Option<OpenAiError>,
}
