use crate::error::LLMError;
use crate::types::{
    CompletionResponse, Message, ResponseError, ResponseType, Role, ToolCall, Usage,
};

use super::types::{OpenAiMessage, OpenAiResponse, OpenAiUsage};

/// Translates a chat-completions wire response (whole or streaming chunk) into the
/// canonical shape.
///
/// Whichever of `message` (whole) or `delta` (chunk) is non-empty becomes the
/// canonical message; a non-empty `finish_reason` marks the turn done. A zero-valued
/// error object is "no error".
pub(crate) fn from_wire(
    response: OpenAiResponse,
    status_code: u16,
) -> Result<CompletionResponse, LLMError> {
    let mut message = None;
    let mut done = false;
    if let Some(choice) = response.choices.into_iter().next() {
        done = choice.finish_reason.as_deref().is_some_and(|r| !r.is_empty());
        message = choice
            .message
            .filter(has_payload)
            .or(choice.delta.filter(has_payload))
            .map(convert_message);
    }

    let response_type = match &message {
        Some(m) if !m.tool_calls.is_empty() => ResponseType::ToolCall,
        _ => ResponseType::Text,
    };

    let error = response.error.and_then(|err| {
        if err.message.is_empty() && err.error_type.is_empty() {
            None
        } else {
            Some(ResponseError {
                error_type: err.error_type,
                message: err.message,
            })
        }
    });

    Ok(CompletionResponse {
        id: response.id,
        created: response.created,
        model: response.model,
        response_type,
        message,
        done,
        usage: convert_usage(response.usage),
        error,
        status_code,
    })
}

fn has_payload(message: &OpenAiMessage) -> bool {
    message.content.as_deref().is_some_and(|c| !c.is_empty()) || !message.tool_calls.is_empty()
}

fn convert_message(message: OpenAiMessage) -> Message {
    Message {
        role: Role::from_wire(&message.role),
        content: message.content.unwrap_or_default(),
        tool_calls: message
            .tool_calls
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect(),
    }
}

fn convert_usage(usage: OpenAiUsage) -> Usage {
    Usage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
        detail: usage.completion_tokens_details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> OpenAiResponse {
        serde_json::from_str(json).expect("wire response should parse")
    }

    #[test]
    fn whole_response_maps_message_and_usage() {
        let wire = parse(
            r#"{
                "id": "x1",
                "model": "gpt-test",
                "choices": [{"message": {"role": "assistant", "content": "hello"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
            }"#,
        );

        let mapped = from_wire(wire, 200).expect("mapping should succeed");
        assert_eq!(mapped.id, "x1");
        assert_eq!(mapped.model, "gpt-test");
        assert!(mapped.done);
        assert_eq!(mapped.status_code, 200);
        assert!(mapped.error.is_none());
        assert_eq!(mapped.response_type, ResponseType::Text);
        let message = mapped.message.expect("message should map");
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "hello");
        assert_eq!(mapped.usage.prompt_tokens, 1);
        assert_eq!(mapped.usage.completion_tokens, 1);
        assert_eq!(mapped.usage.total_tokens, 2);
    }

    #[test]
    fn streaming_delta_becomes_the_message() {
        let wire = parse(
            r#"{"choices": [{"delta": {"role": "assistant", "content": "hel"}, "finish_reason": null}]}"#,
        );

        let mapped = from_wire(wire, 200).unwrap();
        assert!(!mapped.done);
        assert_eq!(mapped.text(), "hel");
    }

    #[test]
    fn done_tracks_finish_reason_exactly() {
        let with_reason = parse(
            r#"{"choices": [{"delta": {"content": "x"}, "finish_reason": "stop"}]}"#,
        );
        assert!(from_wire(with_reason, 200).unwrap().done);

        let without_reason =
            parse(r#"{"choices": [{"delta": {"content": "x"}, "finish_reason": ""}]}"#);
        assert!(!from_wire(without_reason, 200).unwrap().done);
    }

    #[test]
    fn tool_calls_set_the_response_type() {
        let wire = parse(
            r#"{
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "get_weather", "arguments": "{\"location\":\"Boston, MA\"}"}
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            }"#,
        );

        let mapped = from_wire(wire, 200).unwrap();
        assert_eq!(mapped.response_type, ResponseType::ToolCall);
        assert!(mapped.done);
        let calls = &mapped.message.expect("message").tool_calls;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_weather");
        assert_eq!(calls[0].arguments, r#"{"location":"Boston, MA"}"#);
    }

    #[test]
    fn zero_valued_error_object_is_no_error() {
        let wire = parse(r#"{"error": {"message": "", "type": ""}}"#);
        assert!(from_wire(wire, 200).unwrap().error.is_none());
    }

    #[test]
    fn provider_error_maps_to_the_error_field() {
        let wire = parse(
            r#"{"error": {"message": "model not found", "type": "invalid_request_error"}}"#,
        );
        let mapped = from_wire(wire, 404).unwrap();
        let error = mapped.error.expect("error should map");
        assert_eq!(error.error_type, "invalid_request_error");
        assert_eq!(error.message, "model not found");
        assert_eq!(mapped.status_code, 404);
    }

    #[test]
    fn empty_choices_yield_no_message() {
        let wire = parse(r#"{"choices": []}"#);
        let mapped = from_wire(wire, 200).unwrap();
        assert!(mapped.message.is_none());
        assert!(!mapped.done);
    }
}
