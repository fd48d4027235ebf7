#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use vidscribe::app_config::{Config, LogLevel};
use vidscribe::{create_router, AppState};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server (default command)
    Serve(ServeArgs),

    /// Generate shell completions for vidscribe
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Default)]
struct ServeArgs {
    /// Address to bind, overrides HOST
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Set logging level, overrides LOG_LEVEL
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// vidscribe - subtitle backend for YouTube video analysis
#[derive(Parser, Debug)]
#[command(name = "vidscribe")]
#[command(version)]
#[command(about = "Transcript translation and subtitle generation service")]
#[command(long_about = "vidscribe turns registered video transcripts into translated subtitle files
(SRT, WebVTT, ASS, JSON) and serves them over a REST API under /api/v1.

EXAMPLES:
    vidscribe                                   # Serve with settings from the environment
    vidscribe serve --port 9000 -l debug        # Override port and log level
    vidscribe completions bash > vidscribe.bash # Generate bash completions

CONFIGURATION:
    All settings come from environment variables (PORT, TRANSLATION_PROVIDER,
    SUPPORTED_LANGUAGES, GUEST_USAGE_LIMIT, ...). Command line flags override
    the bind address and log level.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.2:3b)
    openai    - OpenAI API (requires TRANSLATION_API_KEY)
    anthropic - Anthropic Claude API (requires TRANSLATION_API_KEY)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger; the effective level is set later with set_max_level
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "vidscribe", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Serve(args)) => run_server(args).await,
        None => run_server(ServeArgs::default()).await,
    }
}

async fn run_server(args: ServeArgs) -> Result<()> {
    let mut config = Config::from_env().context("Failed to load configuration from the environment")?;

    if let Some(host) = args.host {
        config.app.host = host;
    }
    if let Some(port) = args.port {
        config.app.port = port;
    }
    if let Some(level) = args.log_level {
        config.app.log_level = level.into();
    }
    log::set_max_level(config.app.log_level.to_level_filter());

    config.validate().context("Configuration validation failed")?;

    let bind_address = config.bind_address();
    info!(
        "Starting {} ({}) with {} translation, {} languages",
        config.app.name,
        config.app.environment,
        config.translation.provider.display_name(),
        config.supported_languages.len()
    );

    let state = Arc::new(AppState::from_config(config).context("Failed to set up the translation provider")?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Listening on http://{}", bind_address);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server stopped with an error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
