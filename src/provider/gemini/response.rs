use crate::error::LLMError;
use crate::types::{CompletionResponse, Message, ResponseError, ResponseType, Role, Usage};

use super::types::GeminiResponse;

/// Translates a GenerateContent wire response (whole or streaming chunk) into the
/// canonical shape.
///
/// The first candidate's first text part becomes the message; a non-empty
/// `finishReason` marks the turn done. An error object with empty status and message
/// is "no error".
pub(crate) fn from_wire(
    response: GeminiResponse,
    status_code: u16,
) -> Result<CompletionResponse, LLMError> {
    let mut message = None;
    let mut done = false;
    if let Some(candidate) = response.candidates.into_iter().next() {
        done = !candidate.finish_reason.is_empty();
        let text = candidate
            .content
            .parts
            .into_iter()
            .next()
            .map(|part| part.text)
            .unwrap_or_default();
        if !text.is_empty() {
            let role = if candidate.content.role == "user" {
                Role::User
            } else {
                Role::Assistant
            };
            message = Some(Message {
                role,
                content: text,
                tool_calls: Vec::new(),
            });
        }
    }

    let error = response.error.and_then(|err| {
        if err.status.is_empty() && err.message.is_empty() {
            None
        } else {
            Some(ResponseError {
                error_type: err.status,
                message: err.message,
            })
        }
    });

    Ok(CompletionResponse {
        id: String::new(),
        created: 0,
        model: response.model,
        response_type: ResponseType::Text,
        message,
        done,
        usage: Usage {
            prompt_tokens: response.usage.prompt_tokens,
            completion_tokens: response.usage.completion_tokens,
            total_tokens: response.usage.total_tokens,
            detail: Default::default(),
        },
        error,
        status_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GeminiResponse {
        serde_json::from_str(json).expect("wire response should parse")
    }

    #[test]
    fn candidate_text_becomes_assistant_message() {
        let wire = parse(
            r#"{
                "modelVersion": "gemini-2.0-flash",
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "hello"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 5, "totalTokenCount": 8}
            }"#,
        );

        let mapped = from_wire(wire, 200).expect("mapping should succeed");
        assert_eq!(mapped.model, "gemini-2.0-flash");
        assert!(mapped.done);
        let message = mapped.message.expect("message should map");
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "hello");
        assert_eq!(mapped.usage.prompt_tokens, 3);
        assert_eq!(mapped.usage.total_tokens, 8);
    }

    #[test]
    fn empty_finish_reason_is_not_done() {
        let wire = parse(
            r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "chunk"}]}, "finishReason": ""}]}"#,
        );
        assert!(!from_wire(wire, 200).unwrap().done);
    }

    #[test]
    fn error_maps_status_to_type() {
        let wire = parse(
            r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#,
        );
        let mapped = from_wire(wire, 400).unwrap();
        let error = mapped.error.expect("error should map");
        assert_eq!(error.error_type, "INVALID_ARGUMENT");
        assert_eq!(error.message, "API key not valid");
        assert_eq!(mapped.status_code, 400);
    }

    #[test]
    fn zero_valued_error_object_is_no_error() {
        let wire = parse(r#"{"error": {"code": 0, "message": "", "status": ""}}"#);
        assert!(from_wire(wire, 200).unwrap().error.is_none());
    }

    #[test]
    fn candidate_without_parts_yields_no_message() {
        let wire = parse(r#"{"candidates": [{"content": {"role": "model", "parts": []}, "finishReason": "STOP"}]}"#);
        let mapped = from_wire(wire, 200).unwrap();
        assert!(mapped.message.is_none());
        assert!(mapped.done);
    }
}
