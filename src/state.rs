//! Application state shared by the HTTP handlers and background jobs

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::generator::SubtitleGenerator;
use crate::guest::GuestUsageLimiter;
use crate::jobs::JobTracker;
use crate::storage::SubtitleStorage;
use crate::transcript::AnalysisStore;
use crate::translation::{ProviderTranslator, Translator};

pub struct AppState {
    pub config: Arc<Config>,
    pub analyses: AnalysisStore,
    pub jobs: JobTracker,
    pub storage: SubtitleStorage,
    pub generator: Arc<SubtitleGenerator>,
    pub guests: GuestUsageLimiter,
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl AppState {
    /// Build the state around an explicit translator
    pub fn new(config: Config, translator: Arc<dyn Translator>) -> Self {
        let generator = SubtitleGenerator::from_config(&config, translator);
        Self {
            analyses: AnalysisStore::new(),
            jobs: JobTracker::new(),
            storage: SubtitleStorage::new(&config.storage.subtitle_dir, &config.app.public_base_url),
            generator: Arc::new(generator),
            guests: GuestUsageLimiter::new(config.features.guest_access, config.limits.guest_usage_limit),
            started_at: Utc::now(),
            started: Instant::now(),
            config: Arc::new(config),
        }
    }

    /// Build the state with the configured LLM provider
    pub fn from_config(config: Config) -> Result<Self, TranslationError> {
        let translator = ProviderTranslator::new(config.translation.clone())?;
        Ok(Self::new(config, Arc::new(translator)))
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
