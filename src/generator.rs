/*!
 * Subtitle generation.
 *
 * Turns an ordered transcript into display-ready subtitle segments for one
 * target language: each segment is translated (or copied when the target
 * is the transcript language), then wrapped to the configured line limits.
 */

use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::errors::{GenerationError, SubtitleError};
use crate::formats::SubtitleFormat;
use crate::language_utils;
use crate::subtitle_processor::{wrap_text, SubtitleFile, SubtitleSegment};
use crate::transcript::{validate_segments, TranscriptSegment};
use crate::translation::{Translation, TranslationCache, Translator};

/// Confidence recorded when the provider does not report one
pub const DEFAULT_CONFIDENCE: f32 = 0.9;

/// What to generate
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Only used for logs and error messages
    pub video_id: String,
    pub source_language: String,
    pub target_language: String,
    pub format: SubtitleFormat,
    pub max_line_length: usize,
    pub max_lines: usize,
}

/// Generated segments for one language
#[derive(Debug, Clone)]
pub struct GeneratedSubtitles {
    pub language: String,
    pub segments: Vec<SubtitleSegment>,
    /// Mean segment confidence, 0 for an empty result
    pub average_confidence: f32,
    pub segment_count: usize,
}

impl GeneratedSubtitles {
    fn new(language: &str, segments: Vec<SubtitleSegment>) -> Self {
        let average_confidence = if segments.is_empty() {
            0.0
        } else {
            segments.iter().map(|s| s.confidence).sum::<f32>() / segments.len() as f32
        };
        Self {
            language: language.to_string(),
            segment_count: segments.len(),
            average_confidence,
            segments,
        }
    }

    /// Serialize into a file of the given format
    pub fn to_file(&self, format: SubtitleFormat) -> SubtitleFile {
        SubtitleFile::build(&self.language, format, &self.segments)
    }
}

/// Translates transcripts into subtitle segments
pub struct SubtitleGenerator {
    translator: Arc<dyn Translator>,
    cache: TranslationCache,
    /// Segments in flight at once
    concurrency: usize,
    supported_languages: Vec<String>,
}

impl SubtitleGenerator {
    pub fn new(translator: Arc<dyn Translator>, concurrency: usize, supported_languages: Vec<String>) -> Self {
        Self {
            translator,
            cache: TranslationCache::new(),
            concurrency: concurrency.max(1),
            supported_languages,
        }
    }

    /// Create a generator with the configured concurrency and language set
    pub fn from_config(config: &Config, translator: Arc<dyn Translator>) -> Self {
        Self::new(
            translator,
            config.translation.concurrent_requests,
            config.supported_languages.clone(),
        )
    }

    pub fn translator_name(&self) -> String {
        self.translator.name()
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Reject target languages outside the configured set
    pub fn check_language(&self, language: &str) -> Result<(), SubtitleError> {
        if language_utils::is_listed(&self.supported_languages, language) {
            Ok(())
        } else {
            Err(SubtitleError::UnsupportedLanguage(language.to_string()))
        }
    }

    /// Generate subtitle segments for one target language
    ///
    /// Output order always equals transcript order, whatever order the
    /// translations complete in. The first failing segment aborts the run.
    pub async fn generate(
        &self,
        transcript: &[TranscriptSegment],
        request: &GenerationRequest,
    ) -> Result<GeneratedSubtitles, GenerationError> {
        if transcript.is_empty() {
            return Err(SubtitleError::EmptyTranscript(request.video_id.clone()).into());
        }
        self.check_language(&request.target_language)?;
        if request.max_line_length == 0 || request.max_lines == 0 {
            return Err(SubtitleError::InvalidWrap(format!(
                "max_line_length={} max_lines={}",
                request.max_line_length, request.max_lines
            ))
            .into());
        }
        validate_segments(transcript)?;

        let start_time = Instant::now();
        let copy_source = language_utils::language_codes_match(&request.source_language, &request.target_language)
            || request.source_language.eq_ignore_ascii_case(&request.target_language);

        // Each future owns its inputs; buffered() yields them in submission order
        let pending: Vec<_> = transcript
            .iter()
            .enumerate()
            .map(|(position, segment)| {
                let text = segment.text.clone();
                let source = request.source_language.clone();
                let target = request.target_language.clone();
                async move {
                    if copy_source {
                        return Ok(Translation::new(text, Some(1.0)));
                    }
                    self.translate_text(text, source, target)
                        .await
                        .map_err(|err| GenerationError::Translation { index: position + 1, source: err })
                }
            })
            .collect();

        let translations: Vec<Translation> = stream::iter(pending)
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut segments = Vec::with_capacity(transcript.len());
        for (position, (segment, translation)) in transcript.iter().zip(translations).enumerate() {
            let text = wrap_text(&translation.text, request.max_line_length, request.max_lines)?;
            segments.push(SubtitleSegment::new(
                position + 1,
                segment.start_ms(),
                segment.end_ms(),
                segment.text.clone(),
                text,
                translation.confidence.unwrap_or(DEFAULT_CONFIDENCE),
            ));
        }

        let generated = GeneratedSubtitles::new(&request.target_language, segments);
        info!(
            "Generated {} {} subtitles for video {} ({} segments, confidence {:.2}) in {:?}",
            request.target_language,
            request.format,
            request.video_id,
            generated.segment_count,
            generated.average_confidence,
            start_time.elapsed()
        );
        Ok(generated)
    }

    async fn translate_text(
        &self,
        text: String,
        source_language: String,
        target_language: String,
    ) -> Result<Translation, crate::errors::TranslationError> {
        if let Some(cached) = self.cache.get(&text, &source_language, &target_language) {
            return Ok(cached);
        }

        let translation = self
            .translator
            .translate(&text, &source_language, &target_language)
            .await?;
        debug!("Translated {} chars ({} -> {})", text.len(), source_language, target_language);

        self.cache.store(&text, &source_language, &target_language, &translation);
        Ok(translation)
    }
}
