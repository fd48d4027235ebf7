//! Read-only configuration endpoints

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::app_config::{FeatureFlags, ModelCost, UsageLimits};
use crate::errors::ApiError;
use crate::formats::SubtitleFormat;
use crate::language_utils;
use crate::state::AppState;

use super::Caller;

#[derive(Debug, Serialize)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct FormatInfo {
    pub format: SubtitleFormat,
    pub extension: &'static str,
    pub mime_type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PublicConfig {
    pub app_name: String,
    pub environment: String,
    pub features: FeatureFlags,
    pub limits: UsageLimits,
    pub supported_languages: Vec<LanguageInfo>,
    pub subtitle_formats: Vec<FormatInfo>,
}

#[derive(Debug, Serialize)]
pub struct TranslationSettings {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub concurrent_requests: usize,
    pub temperature: f32,
    pub retry_count: u32,
    pub translator: String,
}

#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
    pub hit_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct SystemConfig {
    pub environment: String,
    pub log_level: String,
    pub public_base_url: String,
    pub storage_dir: String,
    pub translation: TranslationSettings,
    pub cache: CacheStats,
    pub analyses: usize,
    pub jobs: usize,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct AnalysisSettings {
    pub max_video_minutes: u32,
    pub max_transcript_segments: usize,
    pub default_model: String,
    pub model_costs: Vec<ModelCost>,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub environment: String,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub translation_provider: String,
}

/// Features, limits, languages and formats
pub async fn public_config(State(state): State<Arc<AppState>>) -> Json<PublicConfig> {
    let config = &state.config;
    let supported_languages = config
        .supported_languages
        .iter()
        .map(|code| LanguageInfo {
            code: code.clone(),
            name: language_utils::get_language_name(code).unwrap_or_else(|_| code.clone()),
        })
        .collect();
    let subtitle_formats = SubtitleFormat::ALL
        .iter()
        .map(|format| FormatInfo {
            format: *format,
            extension: format.extension(),
            mime_type: format.mime_type(),
        })
        .collect();

    Json(PublicConfig {
        app_name: config.app.name.clone(),
        environment: config.app.environment.clone(),
        features: config.features.clone(),
        limits: config.limits.clone(),
        supported_languages,
        subtitle_formats,
    })
}

/// Provider and runtime settings, for signed-in users only
pub async fn system_config(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<SystemConfig>, ApiError> {
    caller.require_user("view the system configuration")?;

    let config = &state.config;
    let translation = &config.translation;
    let (hits, misses, hit_rate) = state.generator.cache().stats();

    Ok(Json(SystemConfig {
        environment: config.app.environment.clone(),
        log_level: format!("{:?}", config.app.log_level).to_lowercase(),
        public_base_url: config.app.public_base_url.clone(),
        storage_dir: state.storage.root().display().to_string(),
        translation: TranslationSettings {
            provider: translation.provider.to_string(),
            model: translation.model.clone(),
            endpoint: translation.endpoint.clone(),
            timeout_secs: translation.timeout_secs,
            concurrent_requests: translation.concurrent_requests,
            temperature: translation.temperature,
            retry_count: translation.retry_count,
            translator: state.generator.translator_name(),
        },
        cache: CacheStats {
            entries: state.generator.cache().len(),
            hits,
            misses,
            hit_rate,
        },
        analyses: state.analyses.len(),
        jobs: state.jobs.len(),
        uptime_secs: state.uptime_secs(),
    }))
}

pub async fn analysis_config(State(state): State<Arc<AppState>>) -> Json<AnalysisSettings> {
    let config = &state.config;
    Json(AnalysisSettings {
        max_video_minutes: config.analysis.max_video_minutes,
        max_transcript_segments: config.limits.max_transcript_segments,
        default_model: config.analysis.default_model.clone(),
        model_costs: config.analysis.model_costs.clone(),
    })
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.app.environment.clone(),
        started_at: state.started_at,
        uptime_secs: state.uptime_secs(),
        translation_provider: state.config.translation.provider.to_string(),
    })
}
