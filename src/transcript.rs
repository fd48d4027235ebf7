/*!
 * Transcripts and the in-memory analysis store.
 *
 * A video analysis is registered once per video and holds the ordered
 * transcript the subtitle generator works from.
 */

use chrono::{DateTime, Utc};
use log::info;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{ApiError, SubtitleError};

/// One timestamped unit of spoken text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub index: usize,
    /// Seconds from the start of the video
    pub start: f64,
    /// Seconds the text stays on screen
    pub duration: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(index: usize, start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self { index, start, duration, text: text.into() }
    }

    pub fn start_ms(&self) -> u64 {
        seconds_to_ms(self.start)
    }

    pub fn end_ms(&self) -> u64 {
        seconds_to_ms(self.start + self.duration)
    }
}

fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

/// Check text, timing values and ordering of a transcript
pub fn validate_segments(segments: &[TranscriptSegment]) -> Result<(), SubtitleError> {
    let mut previous_start = f64::MIN;
    for segment in segments {
        // A blank cue cannot be written as SRT and read back
        if segment.text.trim().is_empty() {
            return Err(SubtitleError::BlankSegment { index: segment.index });
        }
        if !segment.start.is_finite() || segment.start < 0.0 {
            return Err(SubtitleError::InvalidTiming {
                index: segment.index,
                reason: format!("start {} is not a non-negative number", segment.start),
            });
        }
        if !segment.duration.is_finite() || segment.duration < 0.0 {
            return Err(SubtitleError::InvalidTiming {
                index: segment.index,
                reason: format!("duration {} is not a non-negative number", segment.duration),
            });
        }
        if segment.start < previous_start {
            return Err(SubtitleError::UnorderedSegments { index: segment.index });
        }
        previous_start = segment.start;
    }
    Ok(())
}

/// A registered video with its transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub video_id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Language of the transcript text
    pub language: String,
    pub segments: Vec<TranscriptSegment>,
    pub created_at: DateTime<Utc>,
}

impl VideoAnalysis {
    /// Total covered duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.start + s.duration)
            .fold(0.0, f64::max)
    }
}

/// In-memory analysis store keyed by video id
#[derive(Clone, Default)]
pub struct AnalysisStore {
    analyses: Arc<RwLock<HashMap<String, Arc<VideoAnalysis>>>>,
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an analysis, replacing any earlier one for the same video
    pub fn insert(&self, analysis: VideoAnalysis) -> Result<Arc<VideoAnalysis>, SubtitleError> {
        validate_segments(&analysis.segments)?;
        let analysis = Arc::new(analysis);
        let replaced = self
            .analyses
            .write()
            .insert(analysis.video_id.clone(), Arc::clone(&analysis))
            .is_some();
        info!(
            "{} analysis for video {} ({} segments, {})",
            if replaced { "Replaced" } else { "Registered" },
            analysis.video_id,
            analysis.segments.len(),
            analysis.language
        );
        Ok(analysis)
    }

    pub fn get(&self, video_id: &str) -> Result<Arc<VideoAnalysis>, ApiError> {
        self.analyses
            .read()
            .get(video_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("No analysis found for video {}", video_id)))
    }

    pub fn len(&self) -> usize {
        self.analyses.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.read().is_empty()
    }
}
