//! Logging
//!
//! Structured logging on the `tracing` crate. Store operations emit events
//! regardless of whether a subscriber is installed; [`init_logging`] installs
//! one with configurable level, format, and destination.

use crate::error::SetupError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Env var holding a full filter directive; wins over the configured level.
pub const LOG_FILTER_ENV: &str = "VAULT_RECORDS_LOG";
/// Env var overriding the log file path.
pub const LOG_FILE_ENV: &str = "VAULT_RECORDS_LOG_FILE";

/// Resolve the log file path: explicit path, then `VAULT_RECORDS_LOG_FILE`, then
/// the platform state (or data) directory.
pub fn resolve_log_file_path(explicit: Option<PathBuf>) -> Result<PathBuf, SetupError> {
    if let Some(p) = explicit {
        if !p.as_os_str().is_empty() {
            return Ok(p);
        }
    }
    if let Ok(env_path) = std::env::var(LOG_FILE_ENV) {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    let project_dirs = directories::ProjectDirs::from("", "", "vault-records").ok_or_else(|| {
        SetupError::Logging("Could not determine platform directory for log file".to_string())
    })?;
    let dir = project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_dir())
        .to_path_buf();
    Ok(dir.join("vault-records.log"))
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// json or text
    #[serde(default = "default_format")]
    pub format: String,

    /// stdout, stderr or file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file when output is `file`; None means the platform default
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// ANSI colors for text output on a terminal stream
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogOutput {
    Stdout,
    Stderr,
    File,
}

/// Install the global subscriber.
///
/// Fails instead of panicking if a subscriber is already installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), SetupError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);

    let filter = if config.enabled {
        build_env_filter(config)?
    } else {
        EnvFilter::new("off")
    };
    let format = parse_format(&config.format)?;
    let output = parse_output(&config.output)?;

    let writer = match output {
        LogOutput::Stdout => fmt::writer::BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => fmt::writer::BoxMakeWriter::new(std::io::stderr),
        LogOutput::File => {
            let path = resolve_log_file_path(config.file.clone())?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SetupError::Logging(format!("Failed to create log directory: {}", e))
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| {
                    SetupError::Logging(format!("Failed to open log file {:?}: {}", path, e))
                })?;
            fmt::writer::BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
    };
    let ansi = config.color && format == LogFormat::Text && output != LogOutput::File;

    let registry = Registry::default().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init(),
    };

    result.map_err(|e| SetupError::Logging(format!("Failed to install subscriber: {}", e)))
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, SetupError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_FILTER_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| SetupError::Logging(format!("Invalid log level '{}': {}", config.level, e)))
}

fn parse_format(format: &str) -> Result<LogFormat, SetupError> {
    match format {
        "text" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(SetupError::Logging(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            other
        ))),
    }
}

fn parse_output(output: &str) -> Result<LogOutput, SetupError> {
    match output {
        "stdout" => Ok(LogOutput::Stdout),
        "stderr" => Ok(LogOutput::Stderr),
        "file" => Ok(LogOutput::File),
        other => Err(SetupError::Logging(format!(
            "Invalid log output: {} (must be 'stdout', 'stderr' or 'file')",
            other
        ))),
    }
}
