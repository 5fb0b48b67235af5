use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::LLMError;

/// Chat role shared by every provider.
///
/// Provider-specific spellings (such as Gemini's `model` for the assistant) are
/// translated at the adapter boundary, never stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Maps an inbound wire role onto the closed enum.
    ///
    /// Unknown roles normalize to [`Role::Assistant`]: every response role that is not
    /// explicitly `system` or `user` was authored by the model.
    pub(crate) fn from_wire(role: &str) -> Self {
        match role {
            "system" => Role::System,
            "user" => Role::User,
            _ => Role::Assistant,
        }
    }

    /// Returns the canonical wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Tool invocation emitted by the model.
///
/// `arguments` holds the raw JSON text exactly as the provider sent it; callers parse
/// it lazily into their own argument structs via [`ToolCall::parse_arguments`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned invocation identifier.
    #[serde(default)]
    pub id: String,
    /// Name of the function the model wants invoked.
    pub name: String,
    /// Raw JSON argument payload, passed through uninterpreted.
    #[serde(default)]
    pub arguments: String,
}

impl ToolCall {
    /// Parses the raw argument payload into a typed struct.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::Validation`] when the payload is not valid JSON for `T`.
    pub fn parse_arguments<T: DeserializeOwned>(&self) -> Result<T, LLMError> {
        serde_json::from_str(&self.arguments).map_err(|err| LLMError::Validation {
            message: format!("tool call {} has invalid arguments: {err}", self.name),
        })
    }
}

/// Normalized chat message.
///
/// Immutable once constructed; owned by a [`Chat`] or a request.
///
/// # Examples
///
/// ```
/// use hanashi::types::{Message, Role};
///
/// let msg = Message::user("What's the weather in Boston?");
/// assert_eq!(msg.role, Role::User);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role associated with this message.
    pub role: Role,
    /// Plain-text content.
    #[serde(default)]
    pub content: String,
    /// Tool calls attached to the message, in provider order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    /// Builds a system-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Builds a user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Builds an assistant-role message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }
}

/// Ordered conversation history with an optional size bound.
///
/// The system message lives in its own slot: it is retrievable independently of the
/// bounded list and never evicted by trimming. When `limit > 0` and an append would
/// exceed it, only the most recent `limit` messages are kept.
///
/// Not safe for concurrent mutation; callers needing that must serialize access.
///
/// # Examples
///
/// ```
/// use hanashi::types::{Chat, Message};
///
/// let mut chat = Chat::with_limit(2);
/// chat.set_system_message("You are terse.");
/// chat.add([Message::user("one"), Message::assistant("two"), Message::user("three")]);
/// assert_eq!(chat.len(), 2);
/// assert!(chat.system_message().is_some());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chat {
    system: Option<Message>,
    messages: Vec<Message>,
    limit: usize,
}

impl Chat {
    /// Creates an empty, unbounded chat.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty chat keeping at most `limit` messages (`0` disables the bound).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Replaces the history bound. `0` disables trimming; the new bound applies on the
    /// next [`Chat::add`].
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Appends messages, enforcing the history bound.
    ///
    /// System-role messages route to the distinguished system slot (replacing any
    /// previous one) instead of entering the bounded list.
    pub fn add(&mut self, messages: impl IntoIterator<Item = Message>) {
        for message in messages {
            if message.role == Role::System {
                self.system = Some(message);
            } else {
                self.messages.push(message);
            }
        }
        if self.limit > 0 && self.messages.len() > self.limit {
            self.messages.drain(..self.messages.len() - self.limit);
        }
    }

    /// Removes and returns the most recent message.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::EmptyChat`] when no messages remain.
    pub fn pop(&mut self) -> Result<Message, LLMError> {
        self.messages.pop().ok_or(LLMError::EmptyChat)
    }

    /// Returns the live ordered history, excluding the system slot.
    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the distinguished system message, if set.
    pub fn system_message(&self) -> Option<&Message> {
        self.system.as_ref()
    }

    /// Sets the distinguished system message from plain content.
    pub fn set_system_message(&mut self, content: impl Into<String>) {
        self.system = Some(Message::system(content));
    }

    /// Drops all history. The system slot survives.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Number of messages in the bounded list.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the bounded list is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// All user-authored messages, in order.
    pub fn user_messages(&self) -> Vec<&Message> {
        self.filter_role(Role::User)
    }

    /// All assistant-authored messages, in order.
    pub fn assistant_messages(&self) -> Vec<&Message> {
        self.filter_role(Role::Assistant)
    }

    fn filter_role(&self, role: Role) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.role == role).collect()
    }
}
