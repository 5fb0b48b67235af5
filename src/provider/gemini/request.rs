use crate::types::{CompletionRequest, Role};

use super::types::{
    GeminiContent, GeminiGenerationConfig, GeminiPart, GeminiRequest, GeminiSystemInstruction,
};

/// Translates the canonical request into the GenerateContent wire shape.
///
/// Role names differ (`assistant` becomes `model`), content is wrapped in a `parts`
/// list of text maps, sampling parameters pack into a single `generationConfig` that
/// omits absent fields, and the system-instruction field is only populated when the
/// canonical system message is non-empty. The model travels in the URL, not here.
pub(crate) fn to_wire(request: &CompletionRequest) -> GeminiRequest {
    let contents = request
        .messages
        .iter()
        .map(|message| GeminiContent {
            role: wire_role(message.role).to_string(),
            parts: vec![GeminiPart {
                text: message.content.clone(),
            }],
        })
        .collect();

    let system_instruction = request
        .system
        .as_deref()
        .filter(|system| !system.is_empty())
        .map(|system| GeminiSystemInstruction {
            parts: GeminiPart {
                text: system.to_string(),
            },
        });

    GeminiRequest {
        contents,
        system_instruction,
        generation_config: generation_config(request),
    }
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "model",
    }
}

fn generation_config(request: &CompletionRequest) -> Option<GeminiGenerationConfig> {
    if request.stop.is_empty()
        && request.temperature.is_none()
        && request.max_tokens.is_none()
        && request.top_p.is_none()
        && request.top_k.is_none()
    {
        return None;
    }
    Some(GeminiGenerationConfig {
        stop_sequences: request.stop.clone(),
        temperature: request.temperature,
        max_output_tokens: request.max_tokens,
        top_p: request.top_p,
        top_k: request.top_k,
    })
}
