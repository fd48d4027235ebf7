/*!
 * # vidscribe - subtitle backend for YouTube video analysis
 *
 * Turns registered video transcripts into translated subtitle files and
 * serves them over a small REST API.
 *
 * ## Features
 *
 * - Per-segment transcript translation using various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API (and OpenAI-compatible LM Studio)
 *   - Anthropic API
 * - SRT, WebVTT, ASS and JSON output
 * - Background multi-language batch jobs with progress tracking
 * - Guest usage limits and read-only configuration endpoints
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Environment-driven configuration
 * - `transcript`: Transcript segments and the analysis store
 * - `subtitle_processor`: Subtitle segments, timestamps, SRT parsing, line wrapping
 * - `formats`: Subtitle format serializers
 * - `translation`: The `Translator` seam, provider-backed translator and cache
 * - `generator`: Transcript to subtitle generation
 * - `jobs`: Batch job tracking
 * - `batch`: Background batch execution
 * - `storage`: Subtitle file storage
 * - `guest`: Guest usage limiter
 * - `http`: Axum router and handlers
 * - `providers`: Client implementations for various LLM providers
 * - `errors`: Custom error types for the application
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod batch;
pub mod errors;
pub mod formats;
pub mod generator;
pub mod guest;
pub mod http;
pub mod jobs;
pub mod language_utils;
pub mod providers;
pub mod state;
pub mod storage;
pub mod subtitle_processor;
pub mod transcript;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{ApiError, GenerationError, JobError, ProviderError, StorageError, SubtitleError, TranslationError};
pub use formats::SubtitleFormat;
pub use generator::{GeneratedSubtitles, GenerationRequest, SubtitleGenerator};
pub use http::create_router;
pub use jobs::{JobStatus, JobTracker, TranslationJob};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use state::AppState;
pub use subtitle_processor::{SubtitleFile, SubtitleSegment};
pub use transcript::{AnalysisStore, TranscriptSegment, VideoAnalysis};
pub use translation::{Translation, Translator};
