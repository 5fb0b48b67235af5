use crate::types::{CompletionRequest, Message, ToolCall};

use super::types::{OpenAiMessage, OpenAiRequest, OpenAiToolCall, OpenAiToolFunction};

/// Translates the canonical request into the chat-completions wire shape.
///
/// A non-empty system message is prepended to the message array as a `role:"system"`
/// entry; sampling parameters map near 1:1. The number of completion choices is
/// pinned to one, since the canonical response normalizes a single message.
pub(crate) fn to_wire(request: &CompletionRequest, stream: bool) -> OpenAiRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system) = request.system.as_deref() {
        if !system.is_empty() {
            messages.push(OpenAiMessage {
                role: "system".to_string(),
                content: Some(system.to_string()),
                tool_calls: Vec::new(),
            });
        }
    }
    messages.extend(request.messages.iter().map(convert_message));

    OpenAiRequest {
        model: request.model.clone(),
        messages,
        stream,
        tools: request.tools.clone(),
        frequency_penalty: request.frequency_penalty,
        logit_bias: request.logit_bias.clone(),
        log_probs: request.log_probs,
        top_log_probs: request.top_log_probs,
        max_tokens: request.max_tokens,
        completion_choices: Some(1),
        presence_penalty: request.presence_penalty,
        seed: request.seed,
        stop: request.stop.clone(),
        temperature: request.temperature,
        top_p: request.top_p,
        user: request.user.clone(),
    }
}

fn convert_message(message: &Message) -> OpenAiMessage {
    OpenAiMessage {
        role: message.role.as_str().to_string(),
        content: Some(message.content.clone()),
        tool_calls: message.tool_calls.iter().map(convert_tool_call).collect(),
    }
}

fn convert_tool_call(call: &ToolCall) -> OpenAiToolCall {
    OpenAiToolCall {
        id: call.id.clone(),
        kind: "function".to_string(),
        function: OpenAiToolFunction {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompletionRequest;

    #[test]
    fn system_message_is_prepended() {
        let request = CompletionRequest::builder()
            .model("gpt-test")
            .system("You are terse.")
            .messages(vec![Message::user("hi")])
            .build()
            .unwrap();

        let wire = to_wire(&request, false);
        assert_eq!(wire.messages.len(), 2);
        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.messages[0].content.as_deref(), Some("You are terse."));
        assert_eq!(wire.messages[1].role, "user");
    }

    #[test]
    fn empty_system_message_is_not_prepended() {
        let request = CompletionRequest::builder()
            .model("gpt-test")
            .messages(vec![Message::user("hi")])
            .build()
            .unwrap();

        let wire = to_wire(&request, false);
        assert_eq!(wire.messages.len(), 1);
    }

    #[test]
    fn sampling_params_map_one_to_one() {
        let request = CompletionRequest::builder()
            .model("gpt-test")
            .messages(vec![Message::user("hi")])
            .temperature(0.7)
            .top_p(0.9)
            .max_tokens(128)
            .seed(42)
            .stop(vec!["END".to_string()])
            .build()
            .unwrap();

        let wire = to_wire(&request, true);
        assert!(wire.stream);
        assert_eq!(wire.temperature, Some(0.7));
        assert_eq!(wire.top_p, Some(0.9));
        assert_eq!(wire.max_tokens, Some(128));
        assert_eq!(wire.seed, Some(42));
        assert_eq!(wire.stop, vec!["END".to_string()]);
        assert_eq!(wire.completion_choices, Some(1));
    }

    #[test]
    fn absent_params_are_omitted_from_json() {
        let request = CompletionRequest::builder()
            .model("gpt-test")
            .messages(vec![Message::user("hi")])
            .build()
            .unwrap();

        let json = serde_json::to_value(to_wire(&request, false)).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("temperature"));
        assert!(!object.contains_key("top_p"));
        assert!(!object.contains_key("tools"));
        assert!(!object.contains_key("user"));
        assert_eq!(json["n"], 1);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn assistant_tool_calls_round_onto_the_wire() {
        let mut message = Message::assistant("");
        message.tool_calls.push(ToolCall {
            id: "call_1".to_string(),
            name: "get_weather".to_string(),
            arguments: r#"{"location":"Boston, MA"}"#.to_string(),
        });
        let request = CompletionRequest::builder()
            .model("gpt-test")
            .messages(vec![message])
            .build()
            .unwrap();

        let json = serde_json::to_value(to_wire(&request, false)).unwrap();
        let call = &json["messages"][0]["tool_calls"][0];
        assert_eq!(call["type"], "function");
        assert_eq!(call["function"]["name"], "get_weather");
        assert_eq!(call["function"]["arguments"], r#"{"location":"Boston, MA"}"#);
    }
}
