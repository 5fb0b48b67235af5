//! Ollama chat backend (`/api/chat`, no auth).

mod provider;
mod request;
mod response;
mod types;

pub use provider::OllamaProvider;
