/*!
 * Translator backed by a configured LLM provider.
 */

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use std::time::Instant;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::TranslationError;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{ChatRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::{Provider, RetryPolicy};

use super::{Translation, Translator};

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// Ollama LLM service
    Ollama { client: Ollama },
    /// OpenAI API service
    OpenAI { client: OpenAI },
    /// LM Studio local server (OpenAI-compatible)
    LMStudio { client: OpenAI },
    /// Anthropic API service
    Anthropic { client: Anthropic },
}

/// Reply shape the system prompt asks for
#[derive(Debug, Deserialize)]
struct StructuredReply {
    translation: String,
    #[serde(default)]
    confidence: Option<f32>,
}

/// Translates one segment at a time through the configured provider
#[derive(Debug)]
pub struct ProviderTranslator {
    provider: TranslationProviderImpl,
    config: TranslationConfig,
}

impl ProviderTranslator {
    /// Create a translator from the translation settings
    pub fn new(config: TranslationConfig) -> Result<Self, TranslationError> {
        if config.provider.requires_api_key() && config.api_key.trim().is_empty() {
            return Err(TranslationError::Configuration(format!(
                "{} requires TRANSLATION_API_KEY",
                config.provider.display_name()
            )));
        }

        let retry = RetryPolicy {
            max_retries: config.retry_count,
            backoff_base_ms: config.retry_backoff_ms,
        };

        let provider = match config.provider {
            ConfigTranslationProvider::Ollama => TranslationProviderImpl::Ollama {
                client: Ollama::new(&config.endpoint, config.timeout_secs, retry),
            },
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new(&config.api_key, &config.endpoint, config.timeout_secs, retry),
            },
            ConfigTranslationProvider::LMStudio => {
                // LM Studio often doesn't require an API key; use a default if empty
                let api_key = if config.api_key.is_empty() { "lm-studio" } else { config.api_key.as_str() };
                TranslationProviderImpl::LMStudio {
                    client: OpenAI::new(api_key, &config.endpoint, config.timeout_secs, retry),
                }
            }
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new(&config.api_key, &config.endpoint, config.timeout_secs, retry),
            },
        };

        Ok(Self { provider, config })
    }

    /// Send one prompt and return the raw reply text
    async fn request_text(&self, system_prompt: &str, text: &str) -> Result<String, TranslationError> {
        let model = self.config.model.as_str();
        let temperature = self.config.temperature;

        let raw = match &self.provider {
            TranslationProviderImpl::Ollama { client } => {
                let request = ChatRequest::new(model)
                    .add_message("system", system_prompt)
                    .add_message("user", text)
                    .temperature(temperature)
                    .json_format();
                Ollama::extract_text(&client.complete(request).await?)
            }
            TranslationProviderImpl::OpenAI { client } => {
                let request = OpenAIRequest::new(model)
                    .add_message("system", system_prompt)
                    .add_message("user", text)
                    .temperature(temperature)
                    .max_tokens(max_tokens_for_model(model))
                    .json_object();
                OpenAI::extract_text(&client.complete(request).await?)
            }
            // Many local models reject response_format, so LM Studio relies on the prompt alone
            TranslationProviderImpl::LMStudio { client } => {
                let request = OpenAIRequest::new(model)
                    .add_message("system", system_prompt)
                    .add_message("user", text)
                    .temperature(temperature)
                    .max_tokens(max_tokens_for_model(model));
                OpenAI::extract_text(&client.complete(request).await?)
            }
            TranslationProviderImpl::Anthropic { client } => {
                let request = AnthropicRequest::new(model, max_tokens_for_model(model))
                    .system(system_prompt)
                    .add_message("user", text)
                    .temperature(temperature);
                Anthropic::extract_text(&client.complete(request).await?)
            }
        };

        Ok(raw)
    }
}

#[async_trait]
impl Translator for ProviderTranslator {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Translation, TranslationError> {
        if text.trim().is_empty() {
            return Ok(Translation::new(String::new(), Some(1.0)));
        }

        let start_time = Instant::now();
        let system_prompt = self.config.render_system_prompt(source_language, target_language);
        let raw = self.request_text(&system_prompt, text).await?;
        debug!(
            "{} translated {} chars ({} -> {}) in {:?}",
            self.config.provider.display_name(),
            text.len(),
            source_language,
            target_language,
            start_time.elapsed()
        );

        parse_reply(&raw).ok_or_else(|| TranslationError::EmptyResponse(text.to_string()))
    }

    fn name(&self) -> String {
        format!("{}/{}", self.config.provider, self.config.model)
    }
}

/// Read a provider reply, preferring the structured JSON form
///
/// Falls back to the raw text without a confidence when the model ignored
/// the requested format. Returns `None` for an empty reply.
pub fn parse_reply(raw: &str) -> Option<Translation> {
    let trimmed = strip_code_fence(raw.trim());
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<StructuredReply>(trimmed) {
        Ok(reply) if !reply.translation.trim().is_empty() => {
            Some(Translation::new(reply.translation.trim(), reply.confidence))
        }
        Ok(_) => None,
        Err(_) => {
            warn!("Provider reply was not structured JSON, using raw text");
            Some(Translation::new(trimmed, None))
        }
    }
}

/// Remove a surrounding markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Get the maximum number of tokens for a given model
fn max_tokens_for_model(model: &str) -> u32 {
    match model {
        "gpt-4" | "gpt-4-0613" => 8192,
        m if m.starts_with("gpt-4o") || m.starts_with("gpt-4-turbo") => 4096,
        m if m.starts_with("gpt-3.5-turbo") => 4096,
        m if m.starts_with("claude-") => 4096,
        _ => 2048,
    }
}
