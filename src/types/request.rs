use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::LLMError;
use crate::tools::Tool;
use crate::types::{Chat, Message};

/// Canonical completion request shared by every provider.
///
/// Construct one through [`CompletionRequest::builder`]; `build()` validates every
/// constraint so an invalid request never reaches the transport. Adapters translate
/// this shape into each provider's wire format.
///
/// # Examples
///
/// ```
/// use hanashi::types::{CompletionRequest, Message};
///
/// let request = CompletionRequest::builder()
///     .model("gpt-4.1-mini")
///     .messages(vec![Message::user("hi")])
///     .temperature(0.3)
///     .build()
///     .unwrap();
/// assert_eq!(request.model, "gpt-4.1-mini");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier, required.
    pub model: String,
    /// Distinguished system message content, prepended or mapped per provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Ordered conversation history, required non-empty.
    pub messages: Vec<Message>,
    /// Function-call descriptors available to the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    /// Streaming hint; the façade entry point is authoritative.
    #[serde(default)]
    pub stream: bool,
    /// Sampling temperature, `0.0..=2.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling parameter, `0.0..=1.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling cutoff (Gemini).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Repetition penalty, `-2.0..=2.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// New-topic pressure, `-2.0..=2.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    /// Output token cap, strictly positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Deterministic sampling seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// Stop sequences.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
    /// Token-id → bias map, non-empty when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<HashMap<u32, i32>>,
    /// Whether to return log probabilities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_probs: Option<bool>,
    /// Number of top log probabilities per token, `0..=20`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_log_probs: Option<u8>,
    /// End-user identifier, non-empty when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Aborts the in-flight HTTP call when cancelled.
    #[serde(skip)]
    pub cancel: Option<CancellationToken>,
}

impl CompletionRequest {
    /// Starts a new builder.
    pub fn builder() -> CompletionBuilder {
        CompletionBuilder::default()
    }
}

/// Fluent builder for [`CompletionRequest`].
///
/// Setters only record values; [`CompletionBuilder::build`] runs every validation and
/// reports the first violation with a descriptive [`LLMError::Validation`].
#[derive(Debug, Clone, Default)]
pub struct CompletionBuilder {
    request: CompletionRequest,
}

impl CompletionBuilder {
    /// Sets the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.request.model = model.into();
        self
    }

    /// Replaces the message list.
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.request.messages = messages;
        self
    }

    /// Copies a [`Chat`]'s history and system message into the request.
    pub fn chat(mut self, chat: &Chat) -> Self {
        self.request.messages = chat.history().to_vec();
        self.request.system = chat.system_message().map(|m| m.content.clone());
        self
    }

    /// Sets the distinguished system message.
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.request.system = Some(content.into());
        self
    }

    /// Replaces the tool list.
    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.request.tools = tools;
        self
    }

    /// Appends one tool.
    pub fn tool(mut self, tool: Tool) -> Self {
        self.request.tools.push(tool);
        self
    }

    /// Sets the streaming hint.
    pub fn stream(mut self, stream: bool) -> Self {
        self.request.stream = stream;
        self
    }

    /// Sets the sampling temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.request.temperature = Some(temperature);
        self
    }

    /// Sets the nucleus sampling parameter.
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.request.top_p = Some(top_p);
        self
    }

    /// Sets the top-k sampling cutoff.
    pub fn top_k(mut self, top_k: u32) -> Self {
        self.request.top_k = Some(top_k);
        self
    }

    /// Sets the frequency penalty.
    pub fn frequency_penalty(mut self, penalty: f64) -> Self {
        self.request.frequency_penalty = Some(penalty);
        self
    }

    /// Sets the presence penalty.
    pub fn presence_penalty(mut self, penalty: f64) -> Self {
        self.request.presence_penalty = Some(penalty);
        self
    }

    /// Sets the output token cap.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.request.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the sampling seed.
    pub fn seed(mut self, seed: i64) -> Self {
        self.request.seed = Some(seed);
        self
    }

    /// Replaces the stop sequences.
    pub fn stop(mut self, stop: Vec<String>) -> Self {
        self.request.stop = stop;
        self
    }

    /// Sets the logit bias map.
    pub fn logit_bias(mut self, bias: HashMap<u32, i32>) -> Self {
        self.request.logit_bias = Some(bias);
        self
    }

    /// Requests log probabilities.
    pub fn log_probs(mut self, log_probs: bool) -> Self {
        self.request.log_probs = Some(log_probs);
        self
    }

    /// Sets the number of top log probabilities per token.
    pub fn top_log_probs(mut self, top_log_probs: u8) -> Self {
        self.request.top_log_probs = Some(top_log_probs);
        self
    }

    /// Sets the end-user identifier.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.request.user = Some(user.into());
        self
    }

    /// Attaches a cancellation token.
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.request.cancel = Some(token);
        self
    }

    /// Validates every constraint and returns the finished request.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::Validation`] naming the violated constraint.
    pub fn build(self) -> Result<CompletionRequest, LLMError> {
        let request = self.request;

        if request.model.is_empty() {
            return Err(LLMError::validation("missing model name"));
        }
        if request.messages.is_empty() {
            return Err(LLMError::validation("missing messages to send"));
        }
        if let Some(temperature) = request.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(LLMError::validation(
                    "temperature must be between 0.0 and 2.0",
                ));
            }
        }
        if let Some(top_p) = request.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(LLMError::validation("top_p must be between 0.0 and 1.0"));
            }
        }
        if let Some(penalty) = request.frequency_penalty {
            if !(-2.0..=2.0).contains(&penalty) {
                return Err(LLMError::validation(
                    "frequency penalty must be between -2.0 and 2.0",
                ));
            }
        }
        if let Some(penalty) = request.presence_penalty {
            if !(-2.0..=2.0).contains(&penalty) {
                return Err(LLMError::validation(
                    "presence penalty must be between -2.0 and 2.0",
                ));
            }
        }
        if let Some(max_tokens) = request.max_tokens {
            if max_tokens == 0 {
                return Err(LLMError::validation("max tokens must be positive"));
            }
        }
        if let Some(top_log_probs) = request.top_log_probs {
            if top_log_probs > 20 {
                return Err(LLMError::validation(
                    "top_logprobs must be between 0 and 20",
                ));
            }
        }
        if let Some(bias) = &request.logit_bias {
            if bias.is_empty() {
                return Err(LLMError::validation("logit bias map cannot be empty"));
            }
        }
        if let Some(user) = &request.user {
            if user.is_empty() {
                return Err(LLMError::validation("user cannot be an empty string"));
            }
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> CompletionBuilder {
        CompletionRequest::builder()
            .model("gpt-test")
            .messages(vec![Message::user("hi")])
    }

    #[test]
    fn build_requires_model() {
        let err = CompletionRequest::builder()
            .messages(vec![Message::user("hi")])
            .build()
            .expect_err("missing model should fail");
        assert!(matches!(err, LLMError::Validation { .. }));
    }

    #[test]
    fn build_requires_messages() {
        let err = CompletionRequest::builder()
            .model("gpt-test")
            .build()
            .expect_err("missing messages should fail");
        assert!(matches!(err, LLMError::Validation { .. }));
    }

    #[test]
    fn temperature_out_of_range_fails() {
        let err = minimal().temperature(2.5).build().expect_err("should fail");
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn top_p_out_of_range_fails() {
        let err = minimal().top_p(1.5).build().expect_err("should fail");
        assert!(err.to_string().contains("top_p"));
    }

    #[test]
    fn penalties_out_of_range_fail() {
        assert!(minimal().frequency_penalty(-2.5).build().is_err());
        assert!(minimal().presence_penalty(2.5).build().is_err());
        assert!(minimal().frequency_penalty(2.0).build().is_ok());
        assert!(minimal().presence_penalty(-2.0).build().is_ok());
    }

    #[test]
    fn boundary_sampling_values_succeed() {
        let request = minimal()
            .temperature(2.0)
            .top_p(1.0)
            .top_log_probs(20)
            .build()
            .expect("boundary values are valid");
        assert_eq!(request.temperature, Some(2.0));
    }

    #[test]
    fn zero_max_tokens_fails() {
        assert!(minimal().max_tokens(0).build().is_err());
        assert!(minimal().max_tokens(1).build().is_ok());
    }

    #[test]
    fn top_log_probs_over_twenty_fails() {
        assert!(minimal().top_log_probs(21).build().is_err());
    }

    #[test]
    fn empty_logit_bias_fails() {
        assert!(minimal().logit_bias(HashMap::new()).build().is_err());
        assert!(minimal().logit_bias(HashMap::from([(50256, -100)])).build().is_ok());
    }

    #[test]
    fn empty_user_fails() {
        assert!(minimal().user("").build().is_err());
        assert!(minimal().user("tester").build().is_ok());
    }

    #[test]
    fn chat_copies_history_and_system() {
        let mut chat = Chat::new();
        chat.set_system_message("You are terse.");
        chat.add([Message::user("hi"), Message::assistant("hello")]);

        let request = CompletionRequest::builder()
            .model("gpt-test")
            .chat(&chat)
            .build()
            .expect("chat-backed request should build");

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.system.as_deref(), Some("You are terse."));
    }
}
