/*!
 * Batch translation job tracking.
 *
 * Jobs live in memory for the lifetime of the process. Only the background
 * batch task mutates a job; HTTP handlers read snapshots.
 */

use chrono::{DateTime, Utc};
use log::{info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::JobError;
use crate::formats::SubtitleFormat;
use crate::storage::StoredSubtitle;

/// Lifecycle state of a translation job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome for one target language of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageResult {
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<StoredSubtitle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LanguageResult {
    pub fn succeeded(language: &str, file: StoredSubtitle, average_confidence: f32) -> Self {
        Self {
            language: language.to_string(),
            file: Some(file),
            average_confidence: Some(average_confidence),
            error: None,
        }
    }

    pub fn failed(language: &str, error: impl Into<String>) -> Self {
        Self {
            language: language.to_string(),
            file: None,
            average_confidence: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A multi-language subtitle translation job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationJob {
    pub id: String,
    /// User id or guest key of the caller who created the job
    #[serde(skip_serializing, default)]
    pub owner: String,
    pub video_id: String,
    pub target_languages: Vec<String>,
    pub format: SubtitleFormat,
    pub status: JobStatus,
    /// Fraction of languages processed, in [0, 1]
    pub progress: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub results: Vec<LanguageResult>,
}

/// In-memory job registry
#[derive(Clone, Default)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<String, TranslationJob>>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending job and return a snapshot of it
    pub fn create(
        &self,
        owner: &str,
        video_id: &str,
        target_languages: Vec<String>,
        format: SubtitleFormat,
    ) -> TranslationJob {
        let now = Utc::now();
        let job = TranslationJob {
            id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            video_id: video_id.to_string(),
            target_languages,
            format,
            status: JobStatus::Pending,
            progress: 0.0,
            created_at: now,
            updated_at: now,
            completed_at: None,
            error: None,
            results: Vec::new(),
        };
        self.jobs.write().insert(job.id.clone(), job.clone());
        info!(
            "Created job {} for video {} ({} languages)",
            job.id,
            job.video_id,
            job.target_languages.len()
        );
        job
    }

    /// Move a pending job to processing
    pub fn start(&self, id: &str) -> Result<(), JobError> {
        self.mutate(id, |job| match job.status {
            JobStatus::Pending => {
                job.status = JobStatus::Processing;
                Ok(())
            }
            from => Err(JobError::InvalidTransition {
                id: job.id.clone(),
                from,
                to: JobStatus::Processing,
            }),
        })
    }

    /// Raise the progress of a processing job, returning the stored value
    ///
    /// Values are clamped to [0, 1] and a lower value than the current one
    /// leaves the progress unchanged.
    pub fn update_progress(&self, id: &str, progress: f32) -> Result<f32, JobError> {
        self.mutate(id, |job| {
            require_processing(job)?;
            let clamped = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
            job.progress = job.progress.max(clamped);
            Ok(job.progress)
        })
    }

    /// Append the outcome of one language
    pub fn record_result(&self, id: &str, result: LanguageResult) -> Result<(), JobError> {
        self.mutate(id, |job| {
            require_processing(job)?;
            job.results.push(result);
            Ok(())
        })
    }

    /// Mark a processing job completed
    pub fn complete(&self, id: &str) -> Result<(), JobError> {
        self.mutate(id, |job| {
            require_processing(job)?;
            job.status = JobStatus::Completed;
            job.progress = 1.0;
            job.completed_at = Some(Utc::now());
            Ok(())
        })?;
        info!("Job {} completed", id);
        Ok(())
    }

    /// Mark a pending or processing job failed
    pub fn fail(&self, id: &str, error: impl Into<String>) -> Result<(), JobError> {
        let error = error.into();
        self.mutate(id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(error.clone());
            job.completed_at = Some(Utc::now());
            Ok(())
        })?;
        warn!("Job {} failed: {}", id, error);
        Ok(())
    }

    /// Snapshot of a job, without an ownership check
    pub fn get(&self, id: &str) -> Result<TranslationJob, JobError> {
        self.jobs
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    /// Snapshot of a job owned by `owner`
    pub fn get_for(&self, owner: &str, id: &str) -> Result<TranslationJob, JobError> {
        let job = self.get(id)?;
        if job.owner != owner {
            return Err(JobError::Forbidden(id.to_string()));
        }
        Ok(job)
    }

    /// Jobs owned by `owner`, newest first
    pub fn list_for(&self, owner: &str) -> Vec<TranslationJob> {
        let mut jobs: Vec<TranslationJob> = self
            .jobs
            .read()
            .values()
            .filter(|job| job.owner == owner)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }

    /// Apply a change under the write lock; terminal jobs are never touched
    fn mutate<T>(&self, id: &str, change: impl FnOnce(&mut TranslationJob) -> Result<T, JobError>) -> Result<T, JobError> {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(id).ok_or_else(|| JobError::NotFound(id.to_string()))?;
        if job.status.is_terminal() {
            return Err(JobError::Terminal {
                id: job.id.clone(),
                status: job.status,
            });
        }
        let value = change(job)?;
        job.updated_at = Utc::now();
        Ok(value)
    }
}

fn require_processing(job: &TranslationJob) -> Result<(), JobError> {
    if job.status == JobStatus::Processing {
        Ok(())
    } else {
        Err(JobError::InvalidTransition {
            id: job.id.clone(),
            from: job.status,
            to: JobStatus::Processing,
        })
    }
}
