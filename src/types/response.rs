use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Message;

/// What the normalized message carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Plain assistant text.
    #[default]
    Text,
    /// One or more tool invocations.
    ToolCall,
}

/// Token accounting reported by a provider.
///
/// Fields are zero-valued when the provider omits them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
    /// Provider-specific accounting breakdown.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub detail: HashMap<String, Value>,
}

/// Error object surfaced to callers.
///
/// A zero-valued error (empty type and message) means "no error" and is mapped to
/// `None` at the adapter boundary; it must never be rendered as a failure.
/// Terminal stream markers reuse this shape with one of the associated constants as
/// `error_type`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    /// Machine-readable error class; marker constant for synthetic terminals.
    #[serde(rename = "type", default)]
    pub error_type: String,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
}

impl ResponseError {
    /// Marker: the stream terminated normally (sentinel line or end of input).
    pub const STREAM_END: &'static str = "end_of_stream";
    /// Marker: reading bytes off the wire failed mid-stream.
    pub const BYTE_READ_ERROR: &'static str = "byte_read_error";
    /// Marker: a stream chunk was not valid JSON for the provider schema.
    pub const JSON_UNMARSHAL_ERROR: &'static str = "json_unmarshal_error";

    /// Whether both fields are empty, i.e. "no error".
    pub fn is_empty(&self) -> bool {
        self.error_type.is_empty() && self.message.is_empty()
    }

    /// Formats the error as `type: message`, dropping an empty type.
    pub fn describe(&self) -> String {
        if self.error_type.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.error_type, self.message)
        }
    }
}

/// Canonical completion result.
///
/// Produced once per whole-response call, or once per chunk in streaming mode where
/// the stream always ends with exactly one terminal marker (see
/// [`CompletionResponse::is_stream_end`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Provider-assigned response identifier.
    #[serde(default)]
    pub id: String,
    /// Creation time as a Unix epoch second.
    #[serde(default)]
    pub created: i64,
    /// Model that produced the response.
    #[serde(default)]
    pub model: String,
    /// Whether the message carries text or tool calls.
    #[serde(default)]
    pub response_type: ResponseType,
    /// Normalized message (whole response, or one delta in streaming mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Turn completion flag, normalized from the provider's finish signal.
    #[serde(default)]
    pub done: bool,
    /// Token accounting.
    #[serde(default)]
    pub usage: Usage,
    /// Provider-reported error, `None` when the provider sent a zero-valued object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
    /// HTTP status the response arrived with.
    #[serde(default)]
    pub status_code: u16,
}

impl CompletionResponse {
    /// Builds the synthetic terminal chunk signaling normal stream completion.
    pub fn end_of_stream(status_code: u16) -> Self {
        Self::stream_marker(ResponseError::STREAM_END, String::new(), status_code)
    }

    /// Builds a synthetic terminal chunk for a failed stream.
    ///
    /// `error_type` should be one of the [`ResponseError`] marker constants.
    pub fn stream_failure(error_type: &str, message: impl Into<String>, status_code: u16) -> Self {
        Self::stream_marker(error_type, message.into(), status_code)
    }

    fn stream_marker(error_type: &str, message: String, status_code: u16) -> Self {
        Self {
            error: Some(ResponseError {
                error_type: error_type.to_string(),
                message,
            }),
            status_code,
            ..Self::default()
        }
    }

    /// Whether this chunk is a terminal stream marker (normal or failed).
    pub fn is_stream_end(&self) -> bool {
        self.error.as_ref().is_some_and(|err| {
            matches!(
                err.error_type.as_str(),
                ResponseError::STREAM_END
                    | ResponseError::BYTE_READ_ERROR
                    | ResponseError::JSON_UNMARSHAL_ERROR
            )
        })
    }

    /// The message content, empty when no message was produced.
    pub fn text(&self) -> &str {
        self.message.as_ref().map(|m| m.content.as_str()).unwrap_or_default()
    }
}
