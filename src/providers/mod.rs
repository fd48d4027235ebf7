/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for various LLM providers:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API integration (also used for LM Studio)
 * - Anthropic: Anthropic API integration
 */

use async_trait::async_trait;
use log::{error, warn};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::fmt::Debug;
use std::time::Duration;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translator.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Retry policy shared by the HTTP clients
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Base backoff, doubled on each retry
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2, backoff_base_ms: 500 }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (1-based), saturating instead of overflowing
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        self.backoff_base_ms.saturating_mul(factor)
    }
}

/// Map a non-success HTTP status onto a provider error
pub(crate) async fn error_from_response(provider: &str, response: Response) -> ProviderError {
    let status = response.status();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    error!("{} API error ({}): {}", provider, status, message);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(message),
        _ => ProviderError::ApiError { status_code: status.as_u16(), message },
    }
}

/// Send a JSON request, retrying transient failures with exponential backoff
///
/// `build` is called once per attempt because a `RequestBuilder` is consumed
/// by `send`.
pub(crate) async fn send_with_retry<F, T>(provider: &str, policy: RetryPolicy, build: F) -> Result<T, ProviderError>
where
    F: Fn() -> RequestBuilder,
    T: serde::de::DeserializeOwned,
{
    let mut attempt = 0;
    loop {
        let result = match build().send().await {
            Ok(response) if response.status().is_success() => response
                .json::<T>()
                .await
                .map_err(|e| ProviderError::ParseError(format!("{} response: {}", provider, e))),
            Ok(response) => Err(error_from_response(provider, response).await),
            Err(e) if e.is_connect() || e.is_timeout() => Err(ProviderError::ConnectionError(e.to_string())),
            Err(e) => Err(ProviderError::RequestFailed(e.to_string())),
        };

        match result {
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                let backoff_ms = policy.backoff_ms(attempt);
                warn!(
                    "{} request failed ({}), retrying in {}ms - attempt {}/{}",
                    provider,
                    e,
                    backoff_ms,
                    attempt + 1,
                    policy.max_retries + 1
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            other => return other,
        }
    }
}

/// Build a reqwest client with the configured timeout
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_default()
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
