/*!
 * Error types for the vidscribe service.
 *
 * Each concern gets its own thiserror enum. Everything that reaches the
 * HTTP boundary is folded into `ApiError`, which knows how to render
 * itself as a structured JSON response.
 */

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::jobs::JobStatus;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether a retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors that can occur while building or parsing subtitles
#[derive(Error, Debug, PartialEq)]
pub enum SubtitleError {
    /// The analysis has no transcript segments
    #[error("No transcript available for video {0}")]
    EmptyTranscript(String),

    /// Requested output format is not one of srt, vtt, ass, json
    #[error("Unsupported subtitle format: {0}")]
    UnsupportedFormat(String),

    /// Requested language is outside the configured set
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Transcript start times go backwards
    #[error("Transcript segment {index} starts before the previous segment")]
    UnorderedSegments { index: usize },

    /// Negative or non-finite timing values
    #[error("Invalid timing for transcript segment {index}: {reason}")]
    InvalidTiming { index: usize, reason: String },

    /// Segment text is empty or whitespace only
    #[error("Transcript segment {index} has no text")]
    BlankSegment { index: usize },

    /// Line wrapping limits must be positive
    #[error("Invalid line wrap constraints: {0}")]
    InvalidWrap(String),

    /// SRT content could not be parsed
    #[error("Failed to parse subtitle content: {0}")]
    Parse(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Provider answered without any usable text
    #[error("Provider returned an empty translation for segment text '{0}'")]
    EmptyResponse(String),

    /// Provider configuration is unusable
    #[error("Translation provider misconfigured: {0}")]
    Configuration(String),
}

/// Errors from one subtitle generation run
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Input rejected before any translation happened
    #[error(transparent)]
    Invalid(#[from] SubtitleError),

    /// A segment could not be translated
    #[error("Segment {index} failed: {source}")]
    Translation {
        index: usize,
        #[source]
        source: TranslationError,
    },
}

/// Errors raised by the job tracker
#[derive(Error, Debug, PartialEq)]
pub enum JobError {
    /// No job with this id
    #[error("Translation job {0} not found")]
    NotFound(String),

    /// Job exists but belongs to someone else
    #[error("Translation job {0} belongs to another user")]
    Forbidden(String),

    /// Completed and failed jobs are frozen
    #[error("Translation job {id} is already {status}")]
    Terminal { id: String, status: JobStatus },

    /// Transition not allowed from the current state
    #[error("Translation job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },
}

/// Errors raised by subtitle storage
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown file id
    #[error("Subtitle file {0} not found")]
    NotFound(String),
}

/// Error surfaced to API callers
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad input, unsupported option, disabled feature, or an internal failure
    #[error("{0}")]
    Validation(String),

    /// Missing analysis, job, or file
    #[error("{0}")]
    NotFound(String),

    /// Guest limit reached or caller identity required
    #[error("{0}")]
    Authentication(String),

    /// Caller does not own the resource
    #[error("{0}")]
    Forbidden(String),
}

impl ApiError {
    /// Machine-readable kind used in the response body
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Authentication(_) => "authentication_error",
            Self::Forbidden(_) => "forbidden",
        }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Log an unexpected failure and hide it behind a generic validation error
    ///
    /// Only `context` reaches the caller; the underlying error stays in the log.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, err);
        Self::Validation(context.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "type": self.kind(),
                "message": self.to_string(),
            }
        });
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<SubtitleError> for ApiError {
    fn from(err: SubtitleError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        Self::internal("Translation failed", err)
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Invalid(e) => e.into(),
            other => Self::internal("Subtitle generation failed", other),
        }
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(_) => Self::NotFound(err.to_string()),
            JobError::Forbidden(_) => Self::Forbidden(err.to_string()),
            other => Self::internal("Job update rejected", other),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => Self::NotFound(err.to_string()),
            other => Self::internal("Subtitle storage failed", other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("Request could not be processed", err)
    }
}
