/*!
 * Application configuration.
 *
 * Every setting is read from an environment variable, falls back to a
 * default, and is checked by `Config::validate` before the server starts.
 */

use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Server identity and bind address
    pub app: AppSettings,

    /// Feature toggles
    pub features: FeatureFlags,

    /// Usage and size limits
    pub limits: UsageLimits,

    /// Target languages accepted by the subtitle endpoints (ISO 639-1)
    pub supported_languages: Vec<String>,

    /// Where generated subtitle files are written
    pub storage: StorageConfig,

    /// Translation provider settings
    pub translation: TranslationConfig,

    /// Analysis limits and model pricing
    pub analysis: AnalysisConfig,
}

/// Server identity and bind address
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// Base used to build download URLs
    pub public_base_url: String,
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Feature toggles
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FeatureFlags {
    /// Single-language subtitle generation
    pub subtitles: bool,
    /// Multi-language background jobs
    pub batch_translation: bool,
    /// Whether callers without a user id may use the API at all
    pub guest_access: bool,
}

/// Usage and size limits
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UsageLimits {
    /// Requests a guest may make before being asked to sign in
    pub guest_usage_limit: u32,
    /// Languages accepted in one batch request
    pub max_batch_languages: usize,
    /// Segments accepted in one transcript
    pub max_transcript_segments: usize,
    /// Default characters per subtitle line
    pub max_line_length: usize,
    /// Default lines per subtitle
    pub max_lines: usize,
}

/// Subtitle storage settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    pub subtitle_dir: PathBuf,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    // @returns: Whether the hosted API needs a key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }

    fn default_model(&self) -> String {
        match self {
            Self::Ollama => "llama3.2:3b".to_string(),
            Self::OpenAI => "gpt-4o-mini".to_string(),
            Self::Anthropic => "claude-3-haiku-20240307".to_string(),
            // Placeholder; users should set to the loaded model name in LM Studio
            Self::LMStudio => "local-model".to_string(),
        }
    }

    fn default_endpoint(&self) -> String {
        match self {
            Self::Ollama => "http://localhost:11434".to_string(),
            Self::OpenAI => "https://api.openai.com/v1".to_string(),
            Self::Anthropic => "https://api.anthropic.com".to_string(),
            Self::LMStudio => "http://localhost:1234/v1".to_string(),
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Model name
    pub model: String,

    /// API key, never serialized back out
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Service endpoint URL
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Segments translated in parallel within one generation
    pub concurrent_requests: usize,

    /// Temperature parameter for text generation (0.0 to 1.0)
    pub temperature: f32,

    /// Retry count for failed requests
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    pub retry_backoff_ms: u64,

    /// System prompt template
    /// Placeholders: {source_language}, {target_language}
    pub system_prompt: String,
}

impl TranslationConfig {
    /// Defaults for a given provider
    pub fn for_provider(provider: TranslationProvider) -> Self {
        Self {
            model: provider.default_model(),
            endpoint: provider.default_endpoint(),
            provider,
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            concurrent_requests: default_concurrent_requests(),
            temperature: default_temperature(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            system_prompt: default_system_prompt(),
        }
    }

    /// Fill the system prompt template for a language pair
    pub fn render_system_prompt(&self, source_language: &str, target_language: &str) -> String {
        self.system_prompt
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self::for_provider(TranslationProvider::default())
    }
}

/// Price of one model, USD per million tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelCost {
    pub model: String,
    pub input_per_million: f64,
    pub output_per_million: f64,
}

/// Analysis limits and model pricing
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalysisConfig {
    pub max_video_minutes: u32,
    pub default_model: String,
    pub model_costs: Vec<ModelCost>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    60
}

/// Upper bound for TRANSLATION_RETRY_COUNT
pub const MAX_RETRY_COUNT: u32 = 10;

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_supported_languages() -> Vec<String> {
    [
        "en", "es", "fr", "de", "it", "pt", "ru", "ja", "ko", "zh", "ar", "hi", "nl", "pl", "tr", "sv",
    ]
    .iter()
    .map(|code| code.to_string())
    .collect()
}

fn default_subtitle_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("vidscribe")
        .join("subtitles")
}

fn default_model_costs() -> Vec<ModelCost> {
    vec![
        ModelCost { model: "gpt-4o-mini".to_string(), input_per_million: 0.15, output_per_million: 0.60 },
        ModelCost { model: "gpt-4o".to_string(), input_per_million: 2.50, output_per_million: 10.00 },
        ModelCost { model: "claude-3-haiku".to_string(), input_per_million: 0.25, output_per_million: 1.25 },
    ]
}

fn default_system_prompt() -> String {
    "You are a professional subtitle translator. Translate the user's text from {source_language} to {target_language}. \
     Keep the meaning, tone and line breaks. Reply with a JSON object of the form \
     {\"translation\": \"...\", \"confidence\": 0.0-1.0} and nothing else."
        .to_string()
}

/// Parse an optional variable, reporting the key on failure
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid value for {}: '{}' ({})", key, raw, e)),
        _ => Ok(default),
    }
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("Invalid boolean for {}: '{}'", key, raw)),
        },
        _ => Ok(default),
    }
}

fn string_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a comma separated list of language codes
pub fn parse_language_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|code| code.trim().to_lowercase())
        .filter(|code| !code.is_empty())
        .collect()
}

/// Parse `model=input:output` pairs separated by commas
pub fn parse_model_costs(raw: &str) -> Result<Vec<ModelCost>> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (model, prices) = item
                .split_once('=')
                .ok_or_else(|| anyhow!("Model cost '{}' is missing '='", item))?;
            let (input, output) = prices
                .split_once(':')
                .ok_or_else(|| anyhow!("Model cost '{}' is missing ':'", item))?;
            Ok(ModelCost {
                model: model.trim().to_string(),
                input_per_million: input
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid input price in '{}'", item))?,
                output_per_million: output
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid output price in '{}'", item))?,
            })
        })
        .collect()
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = string_var(&lookup, "HOST").unwrap_or_else(default_host);
        let port = parse_var(&lookup, "PORT", default_port())?;
        let public_base_url = string_var(&lookup, "PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{}:{}", host, port))
            .trim_end_matches('/')
            .to_string();

        let app = AppSettings {
            name: string_var(&lookup, "APP_NAME").unwrap_or_else(|| "vidscribe".to_string()),
            environment: string_var(&lookup, "ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            host,
            port,
            public_base_url,
            log_level: parse_var(&lookup, "LOG_LEVEL", LogLevel::default())?,
        };

        let features = FeatureFlags {
            subtitles: parse_bool(&lookup, "ENABLE_SUBTITLES", true)?,
            batch_translation: parse_bool(&lookup, "ENABLE_BATCH_TRANSLATION", true)?,
            guest_access: parse_bool(&lookup, "ENABLE_GUEST_ACCESS", true)?,
        };

        let limits = UsageLimits {
            guest_usage_limit: parse_var(&lookup, "GUEST_USAGE_LIMIT", 3)?,
            max_batch_languages: parse_var(&lookup, "MAX_BATCH_LANGUAGES", 10)?,
            max_transcript_segments: parse_var(&lookup, "MAX_TRANSCRIPT_SEGMENTS", 5000)?,
            max_line_length: parse_var(&lookup, "SUBTITLE_MAX_LINE_LENGTH", 42)?,
            max_lines: parse_var(&lookup, "SUBTITLE_MAX_LINES", 2)?,
        };

        let supported_languages = string_var(&lookup, "SUPPORTED_LANGUAGES")
            .map(|raw| parse_language_list(&raw))
            .unwrap_or_else(default_supported_languages);

        let storage = StorageConfig {
            subtitle_dir: string_var(&lookup, "SUBTITLE_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_subtitle_dir),
        };

        let provider = parse_var(&lookup, "TRANSLATION_PROVIDER", TranslationProvider::default())?;
        let defaults = TranslationConfig::for_provider(provider.clone());
        let translation = TranslationConfig {
            provider,
            model: string_var(&lookup, "TRANSLATION_MODEL").unwrap_or(defaults.model),
            api_key: string_var(&lookup, "TRANSLATION_API_KEY").unwrap_or_default(),
            endpoint: string_var(&lookup, "TRANSLATION_ENDPOINT").unwrap_or(defaults.endpoint),
            timeout_secs: parse_var(&lookup, "TRANSLATION_TIMEOUT_SECS", defaults.timeout_secs)?,
            concurrent_requests: parse_var(&lookup, "TRANSLATION_CONCURRENCY", defaults.concurrent_requests)?,
            temperature: parse_var(&lookup, "TRANSLATION_TEMPERATURE", defaults.temperature)?,
            retry_count: parse_var(&lookup, "TRANSLATION_RETRY_COUNT", defaults.retry_count)?,
            retry_backoff_ms: parse_var(&lookup, "TRANSLATION_RETRY_BACKOFF_MS", defaults.retry_backoff_ms)?,
            system_prompt: string_var(&lookup, "TRANSLATION_SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
        };

        let analysis = AnalysisConfig {
            max_video_minutes: parse_var(&lookup, "ANALYSIS_MAX_VIDEO_MINUTES", 120)?,
            default_model: string_var(&lookup, "ANALYSIS_DEFAULT_MODEL")
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            model_costs: match string_var(&lookup, "MODEL_COSTS") {
                Some(raw) => parse_model_costs(&raw).context("Invalid MODEL_COSTS")?,
                None => default_model_costs(),
            },
        };

        Ok(Config {
            app,
            features,
            limits,
            supported_languages,
            storage,
            translation,
            analysis,
        })
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.supported_languages.is_empty() {
            return Err(anyhow!("At least one supported language is required"));
        }
        for code in &self.supported_languages {
            crate::language_utils::get_language_name(code)
                .with_context(|| format!("SUPPORTED_LANGUAGES contains an invalid code: {}", code))?;
        }

        if self.limits.max_line_length == 0 || self.limits.max_lines == 0 {
            return Err(anyhow!("Subtitle line limits must be greater than zero"));
        }
        if self.limits.max_batch_languages == 0 {
            return Err(anyhow!("MAX_BATCH_LANGUAGES must be greater than zero"));
        }
        if self.translation.retry_count > MAX_RETRY_COUNT {
            return Err(anyhow!(
                "TRANSLATION_RETRY_COUNT must be at most {}, got {}",
                MAX_RETRY_COUNT,
                self.translation.retry_count
            ));
        }
        if self.translation.concurrent_requests == 0 {
            return Err(anyhow!("TRANSLATION_CONCURRENCY must be greater than zero"));
        }
        if !(0.0..=2.0).contains(&self.translation.temperature) {
            return Err(anyhow!(
                "TRANSLATION_TEMPERATURE must be between 0.0 and 2.0, got {}",
                self.translation.temperature
            ));
        }

        url::Url::parse(&self.translation.endpoint)
            .with_context(|| format!("Invalid translation endpoint: {}", self.translation.endpoint))?;
        url::Url::parse(&self.app.public_base_url)
            .with_context(|| format!("Invalid PUBLIC_BASE_URL: {}", self.app.public_base_url))?;

        // Validate API key for hosted providers
        if self.translation.provider.requires_api_key() && self.translation.api_key.is_empty() {
            return Err(anyhow!(
                "Translation API key is required for {} provider",
                self.translation.provider.display_name()
            ));
        }

        Ok(())
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }

    /// Whether this language code is accepted as a subtitle target
    pub fn supports_language(&self, code: &str) -> bool {
        crate::language_utils::is_listed(&self.supported_languages, code)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        // An empty lookup only ever yields defaults, which always parse
        Self::from_lookup(|_| None).unwrap_or_else(|_| unreachable!("default configuration failed to parse"))
    }
}
