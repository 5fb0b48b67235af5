use chrono::DateTime;

use crate::error::LLMError;
use crate::types::{CompletionResponse, Message, ResponseError, ResponseType, Role, Usage};

use super::types::OllamaResponse;

const PROVIDER: &str = "ollama";

/// Translates an Ollama wire response (whole or streaming chunk) into the canonical
/// shape.
///
/// Usage derives from the eval counters, `done` maps straight through, and the
/// RFC3339-nanosecond `created_at` becomes a Unix epoch second. A malformed
/// timestamp fails the call instead of being silently zeroed.
pub(crate) fn from_wire(
    response: OllamaResponse,
    status_code: u16,
) -> Result<CompletionResponse, LLMError> {
    let created = if response.created_at.is_empty() {
        0
    } else {
        DateTime::parse_from_rfc3339(&response.created_at)
            .map_err(|err| {
                LLMError::decode(
                    PROVIDER,
                    format!("invalid created_at timestamp {:?}: {err}", response.created_at),
                )
            })?
            .timestamp()
    };

    let message = if response.message.content.is_empty() {
        None
    } else {
        Some(Message {
            role: Role::from_wire(&response.message.role),
            content: response.message.content,
            tool_calls: Vec::new(),
        })
    };

    let error = if response.error.is_empty() {
        None
    } else {
        Some(ResponseError {
            error_type: String::new(),
            message: response.error,
        })
    };

    Ok(CompletionResponse {
        id: String::new(),
        created,
        model: response.model,
        response_type: ResponseType::Text,
        message,
        done: response.done,
        usage: Usage {
            prompt_tokens: response.prompt_eval_count,
            completion_tokens: response.eval_count,
            total_tokens: response.prompt_eval_count + response.eval_count,
            detail: Default::default(),
        },
        error,
        status_code,
    })
}
