//! Tracing configuration for the command-line frontend
//!
//! The library only emits spans and events; the binary decides where they go.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output with colors (default for CLI)
    Console,
    /// Compact output without ANSI colors, for CI logs
    Compact,
    /// JSON structured logging
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    pub format: TracingFormat,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
    /// Session ID for correlation across files of one invocation
    pub session_id: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            env_filter: None,
            session_id: None,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",  // Default: informational messages and above
            1 => "debug", // -v: line coefficients, stage timings
            _ => "trace", // -vv+: per-grid classification details
        }
    }

    /// Filter directives in effect; an explicit env filter wins over verbosity
    pub fn filter_directives(&self) -> &str {
        self.env_filter
            .as_deref()
            .unwrap_or_else(|| self.verbosity_to_filter())
    }

    /// Initialize the global tracing subscriber, writing to stderr
    ///
    /// Stdout stays reserved for `--json` output.
    ///
    /// # Errors
    /// - invalid filter directives
    /// - a global subscriber is already installed
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = EnvFilter::try_new(self.filter_directives())?;
        let registry = Registry::default().with(filter);

        match self.format {
            TracingFormat::Console => {
                registry
                    .with(
                        fmt::layer()
                            .with_ansi(true)
                            .with_target(false)
                            .with_level(true)
                            .with_writer(std::io::stderr)
                            .compact(),
                    )
                    .try_init()?;
            },
            TracingFormat::Compact => {
                registry
                    .with(
                        fmt::layer()
                            .with_ansi(false)
                            .with_target(false)
                            .with_writer(std::io::stderr)
                            .compact(),
                    )
                    .try_init()?;
            },
            #[cfg(feature = "tracing-json")]
            TracingFormat::Json => {
                registry
                    .with(
                        fmt::layer()
                            .json()
                            .with_current_span(true)
                            .with_span_list(true)
                            .with_writer(std::io::stderr),
                    )
                    .try_init()?;
            },
        }

        if let Some(session_id) = &self.session_id {
            tracing::debug!(session_id = %session_id, "Partition session started");
        }

        Ok(())
    }
}

/// Build the CLI tracing configuration
///
/// A non-empty `RUST_LOG` value replaces the `-v` derived level.
pub fn cli_tracing_config(
    verbosity: u8,
    format: TracingFormat,
    rust_log: Option<String>,
) -> TracingConfig {
    let config = TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(format);

    match rust_log {
        Some(filter) if !filter.trim().is_empty() => config.with_env_filter(filter),
        _ => config,
    }
}

/// Initialize tracing with CLI settings and a fresh session id
///
/// # Errors
/// - see [`TracingConfig::init`]
pub fn init_cli_tracing(verbosity: u8, format: TracingFormat) -> anyhow::Result<String> {
    let session_id = uuid::Uuid::new_v4().to_string();

    cli_tracing_config(verbosity, format, std::env::var(EnvFilter::DEFAULT_ENV).ok())
        .with_session_id(session_id.clone())
        .init()?;

    Ok(session_id)
}

/// Span creation helpers for common operations
pub mod spans {
    use tracing::{Level, Span};

    /// Span covering one CLI invocation
    pub fn session(session_id: &str, input_count: usize) -> Span {
        tracing::span!(
            Level::INFO,
            "session",
            session_id = %session_id,
            input_count
        )
    }

    /// Create a span for processing a single input
    pub fn file_processing(file_path: &std::path::Path, format: &str) -> Span {
        tracing::span!(
            Level::INFO,
            "file_processing",
            file_path = %file_path.display(),
            format = %format
        )
    }

    pub fn batch_processing(file_count: usize) -> Span {
        tracing::span!(Level::INFO, "batch_processing", file_count)
    }
}

/// Event helpers for common logging patterns
pub mod events {
    use tracing::{debug, error, info, warn};

    /// Log a user-facing progress update
    pub fn progress(message: &str) {
        info!("{}", message);
    }

    /// Log an error with context
    pub fn error_with_context(error: &dyn std::error::Error, context: &str) {
        error!(
            error = %error,
            context = %context,
            "Operation failed"
        );
    }

    /// Log a warning with recommendation
    pub fn warning_with_recommendation(message: &str, recommendation: &str) {
        warn!(
            message = %message,
            recommendation = %recommendation,
            "Warning"
        );
    }

    pub fn performance_metric(operation: &str, duration_ms: u64) {
        debug!(operation = %operation, duration_ms, "Performance metric");
    }
}
