/*!
 * Background batch translation.
 *
 * A batch job translates one transcript into several languages, one
 * language after the other, storing a file per language. A language that
 * fails is recorded on the job and the batch moves on; the job only fails
 * when no language succeeded.
 */

use log::{error, info, warn};
use std::sync::Arc;

use crate::errors::JobError;
use crate::generator::GenerationRequest;
use crate::jobs::LanguageResult;
use crate::state::AppState;
use crate::transcript::VideoAnalysis;

/// Run a job on a detached tokio task
pub fn spawn_batch_job(state: Arc<AppState>, job_id: String, analysis: Arc<VideoAnalysis>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = run_batch_job(&state, &job_id, &analysis).await {
            error!("Batch job {} stopped: {}", job_id, e);
            // Already-terminal jobs reject this, which is fine
            let _ = state.jobs.fail(&job_id, e.to_string());
        }
    })
}

/// Process every target language of a pending job
pub async fn run_batch_job(state: &AppState, job_id: &str, analysis: &VideoAnalysis) -> Result<(), JobError> {
    let job = state.jobs.get(job_id)?;
    state.jobs.start(job_id)?;
    info!(
        "Starting batch job {} for video {} ({} languages)",
        job_id,
        analysis.video_id,
        job.target_languages.len()
    );

    let total = job.target_languages.len().max(1);
    let mut succeeded = 0;

    for (position, language) in job.target_languages.iter().enumerate() {
        let request = GenerationRequest {
            video_id: analysis.video_id.clone(),
            source_language: analysis.language.clone(),
            target_language: language.clone(),
            format: job.format,
            max_line_length: state.config.limits.max_line_length,
            max_lines: state.config.limits.max_lines,
        };

        let result = match state.generator.generate(&analysis.segments, &request).await {
            Ok(generated) => {
                let file = generated.to_file(job.format);
                match state.storage.save(&analysis.video_id, &file).await {
                    Ok(stored) => {
                        succeeded += 1;
                        LanguageResult::succeeded(language, stored, generated.average_confidence)
                    }
                    Err(e) => {
                        warn!("Job {}: storing {} failed: {}", job_id, language, e);
                        LanguageResult::failed(language, e.to_string())
                    }
                }
            }
            Err(e) => {
                warn!("Job {}: generating {} failed: {}", job_id, language, e);
                LanguageResult::failed(language, e.to_string())
            }
        };

        state.jobs.record_result(job_id, result)?;
        state.jobs.update_progress(job_id, (position + 1) as f32 / total as f32)?;
    }

    if succeeded == 0 {
        state.jobs.fail(job_id, "No language could be translated")
    } else {
        state.jobs.complete(job_id)
    }
}
