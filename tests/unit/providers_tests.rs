/*!
 * Tests for provider request builders and the provider-backed translator
 */

use serde_json::json;

use vidscribe::app_config::{TranslationConfig, TranslationProvider};
use vidscribe::errors::TranslationError;
use vidscribe::providers::anthropic::{Anthropic, AnthropicRequest, AnthropicResponse};
use vidscribe::providers::ollama::{ChatRequest, ChatResponse, Ollama};
use vidscribe::providers::openai::{OpenAI, OpenAIRequest, OpenAIResponse};
use vidscribe::providers::{Provider, RetryPolicy};
use vidscribe::translation::provider::parse_reply;
use vidscribe::translation::{ProviderTranslator, Translator};

#[test]
fn test_ollamaChatRequest_shouldAskForJsonWithoutStreaming() {
    let request = ChatRequest::new("llama3.2:3b")
        .add_message("system", "Translate")
        .add_message("user", "Hello")
        .temperature(0.3)
        .json_format();
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["model"], "llama3.2:3b");
    assert_eq!(value["stream"], false);
    assert_eq!(value["format"], "json");
    assert_eq!(value["messages"][1], json!({ "role": "user", "content": "Hello" }));
    assert!((value["options"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
}

#[test]
fn test_ollamaResponse_extractText() {
    let response: ChatResponse = serde_json::from_value(json!({
        "model": "llama3.2:3b",
        "message": { "role": "assistant", "content": "{\"translation\":\"Hola\"}" },
        "done": true
    }))
    .unwrap();
    assert_eq!(Ollama::extract_text(&response), "{\"translation\":\"Hola\"}");
}

#[test]
fn test_openAiRequest_shouldOmitUnsetFields() {
    let plain = serde_json::to_value(OpenAIRequest::new("gpt-4o-mini").add_message("user", "Hi")).unwrap();
    assert!(plain.get("temperature").is_none());
    assert!(plain.get("response_format").is_none());

    let full = serde_json::to_value(
        OpenAIRequest::new("gpt-4o-mini")
            .add_message("user", "Hi")
            .max_tokens(256)
            .json_object(),
    )
    .unwrap();
    assert_eq!(full["max_tokens"], 256);
    assert_eq!(full["response_format"]["type"], "json_object");
}

#[test]
fn test_openAiResponse_extractText_usesFirstChoice() {
    let response: OpenAIResponse = serde_json::from_value(json!({
        "choices": [
            { "message": { "role": "assistant", "content": "Bonjour" }, "finish_reason": "stop" },
            { "message": { "role": "assistant", "content": "Salut" } }
        ]
    }))
    .unwrap();
    assert_eq!(OpenAI::extract_text(&response), "Bonjour");
    assert!(response.usage.is_none());
}

#[test]
fn test_anthropicRequest_shouldCarrySystemPromptSeparately() {
    let request = AnthropicRequest::new("claude-3-haiku-20240307", 1024)
        .system("Translate into German")
        .add_message("user", "Good morning");
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["system"], "Translate into German");
    assert_eq!(value["max_tokens"], 1024);
    assert_eq!(value["messages"].as_array().unwrap().len(), 1);
}

#[test]
fn test_anthropicResponse_extractText_joinsTextBlocks() {
    let response: AnthropicResponse = serde_json::from_value(json!({
        "content": [
            { "type": "text", "text": "Guten " },
            { "type": "tool_use" },
            { "type": "text", "text": "Morgen" }
        ],
        "usage": { "input_tokens": 12, "output_tokens": 4 }
    }))
    .unwrap();
    assert_eq!(Anthropic::extract_text(&response), "Guten Morgen");
}

#[test]
fn test_parseReply_shouldPreferStructuredForm() {
    let reply = parse_reply("{\"translation\": \"Hallo\", \"confidence\": 0.6}").unwrap();
    assert_eq!(reply.text, "Hallo");
    assert_eq!(reply.confidence, Some(0.6));

    let fallback = parse_reply("Hallo Welt").unwrap();
    assert_eq!(fallback.confidence, None);
}

#[test]
fn test_providerTranslator_hostedProviderWithoutKey_shouldFail() {
    for provider in [TranslationProvider::OpenAI, TranslationProvider::Anthropic] {
        let result = ProviderTranslator::new(TranslationConfig::for_provider(provider));
        assert!(matches!(result, Err(TranslationError::Configuration(_))));
    }
}

#[test]
fn test_providerTranslator_localProviders_shouldNotNeedKey() {
    let ollama = ProviderTranslator::new(TranslationConfig::for_provider(TranslationProvider::Ollama)).unwrap();
    assert_eq!(ollama.name(), "ollama/llama3.2:3b");

    let lmstudio = ProviderTranslator::new(TranslationConfig::for_provider(TranslationProvider::LMStudio)).unwrap();
    assert_eq!(lmstudio.name(), "lmstudio/local-model");
}

#[tokio::test]
async fn test_providerTranslator_emptyText_shouldSkipProvider() {
    let mut config = TranslationConfig::for_provider(TranslationProvider::Ollama);
    // Nothing listens here, so any request would fail
    config.endpoint = "http://127.0.0.1:9".to_string();
    let translator = ProviderTranslator::new(config).unwrap();

    let result = translator.translate("   ", "en", "fr").await.unwrap();
    assert_eq!(result.text, "");
    assert_eq!(result.confidence, Some(1.0));
}

#[tokio::test]
async fn test_providerTranslator_unreachableEndpoint_shouldFail() {
    let mut config = TranslationConfig::for_provider(TranslationProvider::Ollama);
    config.endpoint = "http://127.0.0.1:9".to_string();
    config.retry_count = 0;
    config.timeout_secs = 2;
    let translator = ProviderTranslator::new(config).unwrap();

    let result = translator.translate("Hello", "en", "fr").await;
    assert!(matches!(result, Err(TranslationError::Provider(_))));
}

#[test]
fn test_retryPolicy_backoff_shouldDoubleAndSaturate() {
    let policy = RetryPolicy { max_retries: 1000, backoff_base_ms: 500 };
    assert_eq!(policy.backoff_ms(1), 500);
    assert_eq!(policy.backoff_ms(2), 1_000);
    assert_eq!(policy.backoff_ms(4), 4_000);
    assert_eq!(policy.backoff_ms(64), u64::MAX);
    assert_eq!(policy.backoff_ms(1000), u64::MAX);
}
