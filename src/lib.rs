//! Unified LLM completion and text-to-speech client.
//!
//! One canonical request/response shape, translated per provider (OpenAI-compatible,
//! Ollama, Google Gemini) at the adapter boundary, with streaming normalized into a
//! single chunk-then-terminal-marker protocol.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod stream;
pub mod tools;
pub mod types;

pub use client::LLMClient;
pub use error::LLMError;
pub use provider::{CompletionStream, LLMProvider};
pub use types::*;
