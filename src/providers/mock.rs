/*!
 * Mock translator implementations for testing.
 *
 * This module provides a mock translator that simulates different behaviors:
 * - `MockTranslator::working()` - Always succeeds with a reported confidence
 * - `MockTranslator::no_confidence()` - Succeeds without reporting a confidence
 * - `MockTranslator::failing()` - Always fails with an error
 * - `MockTranslator::fail_on(text)` - Fails only for one segment text
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{ProviderError, TranslationError};
use crate::translation::{Translation, Translator};

/// Behavior mode for the mock translator
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds and reports the given confidence
    Working { confidence: f32 },
    /// Succeeds without a confidence score
    NoConfidence,
    /// Always fails with an error
    Failing,
    /// Fails when the segment text equals this value
    FailOn(String),
}

/// Mock translator for exercising the generator and job flows
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockBehavior,
    /// Calls made so far, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Per-call delay; later segments finish first when this is reversed
    delay: Option<Duration>,
}

impl MockTranslator {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    /// Create a working mock that reports confidence 0.75
    pub fn working() -> Self {
        Self::new(MockBehavior::Working { confidence: 0.75 })
    }

    pub fn no_confidence() -> Self {
        Self::new(MockBehavior::NoConfidence)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn fail_on(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailOn(text.into()))
    }

    /// Sleep longer for shorter texts so completions arrive out of order
    pub fn with_inverse_delay(mut self, base: Duration) -> Self {
        self.delay = Some(base);
        self
    }

    /// Number of translate calls received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Deterministic stand-in for a translated text
    pub fn render(text: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, text)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_language: &str,
        target_language: &str,
    ) -> Result<Translation, TranslationError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        if let Some(base) = self.delay {
            let factor = 64u32.saturating_sub(text.len().min(63) as u32);
            tokio::time::sleep(base * factor).await;
        }

        match &self.behavior {
            MockBehavior::Working { confidence } => {
                Ok(Translation::new(Self::render(text, target_language), Some(*confidence)))
            }
            MockBehavior::NoConfidence => Ok(Translation::new(Self::render(text, target_language), None)),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }
            .into()),
            MockBehavior::FailOn(bad) if bad == text => Err(ProviderError::ApiError {
                message: format!("Simulated failure for '{}'", text),
                status_code: 500,
            }
            .into()),
            MockBehavior::FailOn(_) => Ok(Translation::new(Self::render(text, target_language), Some(0.8))),
        }
    }

    fn name(&self) -> String {
        "mock".to_string()
    }
}
