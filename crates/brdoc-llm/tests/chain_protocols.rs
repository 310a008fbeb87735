//! Wire-protocol tests against a stub endpoint.

use std::time::Duration;

use brdoc_llm::{FallbackChain, LlmProvider, LlmRequest, ModelConfig};
use brdoc_test_utils::http_stub::{chat_completion_reply, ollama_reply, spawn_json_stub};

#[tokio::test]
async fn openai_protocol_parses_content_and_tokens() {
    let base_url = spawn_json_stub(chat_completion_reply("# Dokument\n\nTreść wygenerowana."))
        .await;
    let chain = FallbackChain::new(vec![ModelConfig::new(
        LlmProvider::OpenAi,
        "gpt-4o-mini",
        1,
    )
    .with_base_url(base_url)
    .with_timeout(Duration::from_secs(5))]);

    let response = chain.generate(&LlmRequest::new("wygeneruj")).await;
    assert!(response.is_success(), "error: {:?}", response.error);
    assert!(response.content.contains("# Dokument"));
    assert_eq!(response.tokens_used, 256);
    assert!(response.latency_ms > 0.0);
}

#[tokio::test]
async fn ollama_protocol_parses_generate_reply() {
    let base_url = spawn_json_stub(ollama_reply("# Dokument lokalny")).await;
    let chain = FallbackChain::new(vec![ModelConfig::new(LlmProvider::Ollama, "llama3.2", 1)
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5))]);

    let response = chain.generate(&LlmRequest::new("wygeneruj")).await;
    assert!(response.is_success(), "error: {:?}", response.error);
    assert_eq!(response.content, "# Dokument lokalny");
    assert_eq!(response.tokens_used, 128);
}

#[tokio::test]
async fn chain_falls_through_dead_endpoint_to_live_one() {
    let base_url = spawn_json_stub(ollama_reply("# Z zapasowego modelu")).await;
    let chain = FallbackChain::new(vec![
        ModelConfig::new(LlmProvider::Ollama, "primary", 1)
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(Duration::from_millis(200)),
        ModelConfig::new(LlmProvider::Ollama, "backup", 2)
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(5)),
    ]);

    let response = chain.generate(&LlmRequest::new("wygeneruj")).await;
    assert!(response.is_success());
    assert_eq!(response.model, "backup");
}
