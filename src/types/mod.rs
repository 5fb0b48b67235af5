//! Canonical data structures shared across providers.
//!
//! These types normalize provider-specific payloads so the rest of the crate stays
//! agnostic of individual API differences.

mod message;
mod request;
mod response;
mod speech;

pub use message::{Chat, Message, Role, ToolCall};
pub use request::{CompletionBuilder, CompletionRequest};
pub use response::{CompletionResponse, ResponseError, ResponseType, Usage};
pub use speech::{AudioFormat, SpeechBuilder, SpeechRequest, SpeechResponse, Voice};
