use crate::types::CompletionRequest;

use super::types::{OllamaMessage, OllamaRequest};

/// Translates the canonical request into the Ollama chat wire shape.
///
/// Like the OpenAI mapping, a non-empty system message becomes a leading
/// `role:"system"` entry; Ollama takes no sampling parameters on this endpoint.
pub(crate) fn to_wire(request: &CompletionRequest, stream: bool) -> OllamaRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system) = request.system.as_deref() {
        if !system.is_empty() {
            messages.push(OllamaMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
    }
    messages.extend(request.messages.iter().map(|message| OllamaMessage {
        role: message.role.as_str().to_string(),
        content: message.content.clone(),
    }));

    OllamaRequest {
        model: request.model.clone(),
        messages,
        stream,
    }
}
