//! Subtitle generation, batch jobs and downloads

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::info;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::batch::spawn_batch_job;
use crate::errors::ApiError;
use crate::formats::SubtitleFormat;
use crate::generator::GenerationRequest;
use crate::jobs::{JobStatus, TranslationJob};
use crate::state::AppState;
use crate::storage::StoredSubtitle;

use super::Caller;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub video_id: String,
    pub language: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_line_length: Option<usize>,
    #[serde(default)]
    pub max_lines: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub video_id: String,
    pub language: String,
    pub format: SubtitleFormat,
    pub segment_count: usize,
    pub average_confidence: f32,
    pub file: StoredSubtitle,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub video_id: String,
    pub languages: Vec<String>,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub video_id: String,
    pub languages: Vec<String>,
    pub format: SubtitleFormat,
    pub status_url: String,
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub count: usize,
    pub jobs: Vec<TranslationJob>,
}

#[derive(Debug, Serialize)]
pub struct SubtitleListResponse {
    pub video_id: String,
    pub count: usize,
    pub files: Vec<StoredSubtitle>,
}

fn parse_format(raw: Option<&str>) -> Result<SubtitleFormat, ApiError> {
    match raw {
        Some(name) => Ok(SubtitleFormat::from_str(name)?),
        None => Ok(SubtitleFormat::default()),
    }
}

/// Lowercase, drop blanks and duplicates, keep request order
fn normalize_languages(languages: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for language in languages {
        let code = language.trim().to_lowercase();
        if !code.is_empty() && !seen.contains(&code) {
            seen.push(code);
        }
    }
    seen
}

/// Generate and store one subtitle file
pub async fn generate_subtitles(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload?;
    if !state.config.features.subtitles {
        return Err(ApiError::Validation("Subtitle generation is disabled".to_string()));
    }

    let format = parse_format(request.format.as_deref())?;
    let language = request.language.trim().to_lowercase();
    state.generator.check_language(&language)?;
    let analysis = state.analyses.get(request.video_id.trim())?;
    caller.admit(&state)?;

    let generation = GenerationRequest {
        video_id: analysis.video_id.clone(),
        source_language: analysis.language.clone(),
        target_language: language.clone(),
        format,
        max_line_length: request.max_line_length.unwrap_or(state.config.limits.max_line_length),
        max_lines: request.max_lines.unwrap_or(state.config.limits.max_lines),
    };
    let generated = state.generator.generate(&analysis.segments, &generation).await?;
    let file = generated.to_file(format);
    let stored = state.storage.save(&analysis.video_id, &file).await?;

    Ok(Json(GenerateResponse {
        video_id: analysis.video_id.clone(),
        language,
        format,
        segment_count: generated.segment_count,
        average_confidence: generated.average_confidence,
        file: stored,
        content: file.content,
    }))
}

/// Queue a multi-language job and return immediately
pub async fn create_batch_job(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BatchResponse>), ApiError> {
    let Json(request) = payload?;
    if !state.config.features.batch_translation {
        return Err(ApiError::Validation("Batch translation is disabled".to_string()));
    }

    let languages = normalize_languages(&request.languages);
    if languages.is_empty() {
        return Err(ApiError::Validation("At least one target language is required".to_string()));
    }
    let max_languages = state.config.limits.max_batch_languages;
    if languages.len() > max_languages {
        return Err(ApiError::Validation(format!(
            "At most {} languages can be requested in one batch",
            max_languages
        )));
    }
    for language in &languages {
        state.generator.check_language(language)?;
    }
    let format = parse_format(request.format.as_deref())?;

    let analysis = state.analyses.get(request.video_id.trim())?;
    if analysis.segments.is_empty() {
        return Err(ApiError::Validation(format!(
            "No transcript available for video {}",
            analysis.video_id
        )));
    }
    caller.admit(&state)?;

    let job = state
        .jobs
        .create(&caller.owner_key(), &analysis.video_id, languages, format);
    info!("Queued batch job {} for {}", job.id, caller.owner_key());
    spawn_batch_job(Arc::clone(&state), job.id.clone(), analysis);

    Ok((
        StatusCode::ACCEPTED,
        Json(BatchResponse {
            status_url: format!("/api/v1/video/subtitles/jobs/{}", job.id),
            job_id: job.id,
            status: job.status,
            video_id: job.video_id,
            languages: job.target_languages,
            format: job.format,
        }),
    ))
}

pub async fn list_jobs(State(state): State<Arc<AppState>>, caller: Caller) -> Json<JobListResponse> {
    let jobs = state.jobs.list_for(&caller.owner_key());
    Json(JobListResponse { count: jobs.len(), jobs })
}

pub async fn get_job(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(job_id): Path<String>,
) -> Result<Json<TranslationJob>, ApiError> {
    Ok(Json(state.jobs.get_for(&caller.owner_key(), &job_id)?))
}

/// Stored files for one video
pub async fn list_subtitles(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Json<SubtitleListResponse>, ApiError> {
    state.analyses.get(&video_id)?;
    let files = state.storage.list(&video_id);
    Ok(Json(SubtitleListResponse { video_id, count: files.len(), files }))
}

/// Serve a stored file as an attachment
pub async fn download_subtitle(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Response, ApiError> {
    let (stored, content) = state.storage.load(&file_id).await?;
    let filename = format!("{}.{}.{}", stored.video_id, stored.language, stored.format.extension());
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(stored.format.mime_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response())
}
