/*!
 * Segment translation.
 *
 * This module contains the translation seam used by the subtitle generator:
 *
 * - `Translator`: async trait turning one piece of text into a `Translation`
 * - `provider`: translator backed by one of the configured LLM providers
 * - `cache`: process-wide memo of finished translations
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::TranslationError;

pub use self::cache::TranslationCache;
pub use self::provider::ProviderTranslator;

pub mod cache;
pub mod provider;

/// Translated text and the provider's own confidence in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    /// `None` when the provider did not report a score
    pub confidence: Option<f32>,
}

impl Translation {
    pub fn new(text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            text: text.into(),
            confidence: confidence.map(|c| c.clamp(0.0, 1.0)),
        }
    }
}

/// Anything that can translate a segment of text
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source_language` to `target_language`
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Translation, TranslationError>;

    /// Short name used in logs and the system config endpoint
    fn name(&self) -> String;
}
