//! Wire schema for the Gemini GenerateContent endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GeminiRequest {
    pub(crate) contents: Vec<GeminiContent>,
    #[serde(rename = "system_instruction", skip_serializing_if = "Option::is_none")]
    pub(crate) system_instruction: Option<GeminiSystemInstruction>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub(crate) generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct GeminiContent {
    #[serde(default)]
    pub(crate) role: String,
    #[serde(default)]
    pub(crate) parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct GeminiPart {
    #[serde(default)]
    pub(crate) text: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GeminiSystemInstruction {
    pub(crate) parts: GeminiPart,
}

/// Sampling knobs packed into `generationConfig`. Absent fields are omitted from
/// the serialized map, never written as null.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct GeminiGenerationConfig {
    #[serde(rename = "stopSequences", skip_serializing_if = "Vec::is_empty")]
    pub(crate) stop_sequences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) temperature: Option<f64>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    pub(crate) max_output_tokens: Option<u32>,
    #[serde(rename = "topP", skip_serializing_if = "Option::is_none")]
    pub(crate) top_p: Option<f64>,
    #[serde(rename = "topK", skip_serializing_if = "Option::is_none")]
    pub(crate) top_k: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeminiResponse {
    #[serde(rename = "modelVersion", default)]
    pub(crate) model: String,
    #[serde(default)]
    pub(crate) candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata", default)]
    pub(crate) usage: GeminiUsage,
    #[serde(default)]
    pub(crate) error: Option<GeminiError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeminiCandidate {
    #[serde(default)]
    pub(crate) content: GeminiContent,
    #[serde(rename = "finishReason", default)]
    pub(crate) finish_reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeminiUsage {
    #[serde(rename = "promptTokenCount", default)]
    pub(crate) prompt_tokens: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    pub(crate) completion_tokens: u32,
    #[serde(rename = "totalTokenCount", default)]
    pub(crate) total_tokens: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GeminiError {
    #[serde(default)]
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) status: String,
}
