//! Live smoke test against a real OpenAI-compatible endpoint.
//!
//! Requires `OPENAI_API_KEY` (and optionally `OPENAI_BASE_URL`, `OPENAI_MODEL`) in
//! the environment or a local `.env` file.

use std::env;

use dotenvy::dotenv;
use futures_util::StreamExt;

use hanashi::LLMClient;
use hanashi::config::ProviderKind;
use hanashi::types::{CompletionRequest, Message};

fn build_client_from_env() -> Option<(LLMClient, String)> {
    let api_key = env::var("OPENAI_API_KEY").ok()?;
    let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string());

    let mut builder = LLMClient::builder()
        .provider(ProviderKind::OpenAi)
        .api_key(api_key);
    if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
        builder = builder.base_url(base_url);
    }

    Some((builder.build().expect("client"), model))
}

#[tokio::test]
#[ignore = "requires a valid OpenAI-compatible endpoint"]
async fn openai_basic_dialog_live() {
    dotenv().ok();
    let Some((client, model)) = build_client_from_env() else {
        return;
    };

    let request = CompletionRequest::builder()
        .model(model)
        .system("You are a terse assistant.")
        .messages(vec![Message::user("Reply with the single word: pong")])
        .max_tokens(20)
        .build()
        .expect("request");

    let response = client.complete(&request).await.expect("completion");
    assert!(response.done, "simple dialog should finish the turn");
    assert!(
        response.text().to_lowercase().contains("pong"),
        "unexpected reply: {}",
        response.text()
    );
}

#[tokio::test]
#[ignore = "requires a valid OpenAI-compatible endpoint"]
async fn openai_streaming_live() {
    dotenv().ok();
    let Some((client, model)) = build_client_from_env() else {
        return;
    };

    let request = CompletionRequest::builder()
        .model(model)
        .messages(vec![Message::user("Count from 1 to 5, digits only.")])
        .max_tokens(50)
        .build()
        .expect("request");

    let mut stream = client.stream_complete(&request).await.expect("stream");
    let mut text = String::new();
    let mut saw_terminal = false;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.expect("chunk");
        if chunk.is_stream_end() {
            saw_terminal = true;
            break;
        }
        text.push_str(chunk.text());
    }

    assert!(saw_terminal, "stream must end with a terminal marker");
    assert!(text.contains('5'), "unexpected streamed text: {text}");
}
