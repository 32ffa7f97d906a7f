//! Subscriber initialization.
//!
//! Logging is configured exactly once, by the binary, before any stage runs.
//! Library code only calls the `tracing` macros.

use crate::constants::{LOG_DIR, LOG_FILE_NAME};
use crate::errors::PipelineError;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Output format of the stdout layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// How the subscriber is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Stdout format.
    pub format: LogFormat,
    /// Directory of the run log file; `None` disables the file layer.
    pub log_dir: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is unset.
    pub default_directive: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            log_dir: Some(PathBuf::from(LOG_DIR)),
            default_directive: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Returns the run log file path, if file logging is enabled.
    #[must_use]
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_dir.as_ref().map(|dir| dir.join(LOG_FILE_NAME))
    }
}

/// Installs the global subscriber: a stdout layer plus an optional append-only
/// file layer, filtered by `RUST_LOG` or the configured default directive.
///
/// # Errors
///
/// Returns an error if the log directory or file cannot be opened, or if a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), PipelineError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    match config.format {
        LogFormat::Pretty => layers.push(fmt::layer().with_target(false).boxed()),
        LogFormat::Json => layers.push(fmt::layer().json().with_current_span(true).boxed()),
    }

    if let (Some(dir), Some(path)) = (&config.log_dir, config.log_file()) {
        std::fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| PipelineError::io(&path, e))?;
        layers.push(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| PipelineError::Internal(format!("failed to install subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(
            config.log_file(),
            Some(PathBuf::from("logs").join("running_logs.log"))
        );
    }

    #[test]
    fn test_init_logging_writes_file_once() {
        let tmp = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            log_dir: Some(tmp.path().join("logs")),
            ..LoggingConfig::default()
        };

        init_logging(&config).unwrap();
        tracing::error!("hello from the test");
        let written = std::fs::read_to_string(config.log_file().unwrap()).unwrap();
        assert!(written.contains("hello from the test"));

        assert!(matches!(
            init_logging(&config),
            Err(PipelineError::Internal(_))
        ));
    }
}
