//! Transcript registration handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::ApiError;
use crate::language_utils;
use crate::state::AppState;
use crate::transcript::{TranscriptSegment, VideoAnalysis};

/// One transcript line as sent by the caption extractor
#[derive(Debug, Deserialize)]
pub struct SegmentInput {
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterAnalysisRequest {
    pub video_id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Language of the transcript, defaults to English
    #[serde(default = "default_language")]
    pub language: String,
    pub segments: Vec<SegmentInput>,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub video_id: String,
    pub title: Option<String>,
    pub language: String,
    pub segment_count: usize,
    pub duration_secs: f64,
    pub created_at: DateTime<Utc>,
}

impl From<&VideoAnalysis> for AnalysisSummary {
    fn from(analysis: &VideoAnalysis) -> Self {
        Self {
            video_id: analysis.video_id.clone(),
            title: analysis.title.clone(),
            language: analysis.language.clone(),
            segment_count: analysis.segments.len(),
            duration_secs: analysis.duration_secs(),
            created_at: analysis.created_at,
        }
    }
}

/// Register or replace the transcript of a video
pub async fn register_analysis(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterAnalysisRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AnalysisSummary>), ApiError> {
    let Json(request) = payload?;

    let video_id = request.video_id.trim();
    if video_id.is_empty() {
        return Err(ApiError::Validation("video_id must not be empty".to_string()));
    }
    language_utils::validate_language_code(&request.language)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let limits = &state.config.limits;
    if request.segments.len() > limits.max_transcript_segments {
        return Err(ApiError::Validation(format!(
            "Transcript has {} segments, the limit is {}",
            request.segments.len(),
            limits.max_transcript_segments
        )));
    }

    let segments: Vec<TranscriptSegment> = request
        .segments
        .into_iter()
        .enumerate()
        .map(|(index, s)| TranscriptSegment::new(index, s.start, s.duration, s.text))
        .collect();

    let analysis = VideoAnalysis {
        video_id: video_id.to_string(),
        title: request.title,
        language: request.language.trim().to_lowercase(),
        segments,
        created_at: Utc::now(),
    };

    let max_secs = f64::from(state.config.analysis.max_video_minutes) * 60.0;
    if analysis.duration_secs() > max_secs {
        return Err(ApiError::Validation(format!(
            "Video is longer than the {} minute limit",
            state.config.analysis.max_video_minutes
        )));
    }

    let stored = state.analyses.insert(analysis)?;
    Ok((StatusCode::CREATED, Json(AnalysisSummary::from(stored.as_ref()))))
}

pub async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Json<AnalysisSummary>, ApiError> {
    let analysis = state.analyses.get(&video_id)?;
    Ok(Json(AnalysisSummary::from(analysis.as_ref())))
}
