// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized logging utilities for the fleet report tooling
//!
//! Every binary in the workspace initialises `tracing` through this crate so
//! that filters, formats and log file locations behave the same everywhere.

pub mod logging_config;

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use logging_config::LoggingConfig;

/// Output format for log messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable plaintext format
    #[default]
    Plaintext,
    /// Structured JSON format
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Plaintext => write!(f, "plaintext"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// CLI log level enum for clap integration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CliLogLevel {
    /// Only error conditions
    Error,
    /// Errors and warnings
    Warn,
    /// Errors, warnings, and informational messages
    #[default]
    Info,
    /// All above plus debug information
    Debug,
    /// All above plus detailed tracing
    Trace,
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliLogLevel::Error => write!(f, "error"),
            CliLogLevel::Warn => write!(f, "warn"),
            CliLogLevel::Info => write!(f, "info"),
            CliLogLevel::Debug => write!(f, "debug"),
            CliLogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// Standardized CLI logging arguments for clap integration
///
/// Use this with `#[command(flatten)]`. Logs go to stderr by default so the
/// report can be piped from stdout; `--log-file` or `--log-dir` switches to
/// file logging.
#[derive(Clone, Debug, Default, clap::Args, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliLoggingArgs {
    /// Log verbosity level
    #[arg(long, value_enum, help = "Log verbosity level (default: info)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<CliLogLevel>,

    /// Log output format
    #[arg(long, value_enum, help = "Log output format (default: plaintext)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,

    /// Directory for log files
    #[arg(long, help = "Directory for log files (default: platform specific)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Log filename
    #[arg(long, help = "Log filename")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl CliLoggingArgs {
    /// Initialize logging, falling back to `config` for anything the flags left unset
    pub fn init(self, component: &str, config: &LoggingConfig) -> anyhow::Result<()> {
        let level: Level = self
            .log_level
            .or(config.log_level)
            .unwrap_or_default()
            .into();
        let format = self.log_format.or(config.log_format).unwrap_or_default();

        if self.should_log_to_file() {
            let log_path = self.resolve_log_path(component);
            init_to_file(component, level, format, &log_path)
        } else {
            init(component, level, format)
        }
    }

    /// Whether the flags ask for file logging
    pub fn should_log_to_file(&self) -> bool {
        self.log_file.is_some() || self.log_dir.is_some()
    }

    /// Resolve the complete log file path based on CLI arguments
    ///
    /// 1. An absolute `log_file` is used as-is
    /// 2. A relative `log_file` is placed under `log_dir` when one is given
    /// 3. Without `log_file`, `<log_dir>/<component>.log` is used
    /// 4. With neither, the platform standard location is used
    pub fn resolve_log_path(&self, component: &str) -> PathBuf {
        match (&self.log_file, &self.log_dir) {
            (Some(file), _) if Path::new(file).is_absolute() => PathBuf::from(file),
            (Some(file), Some(dir)) => Path::new(dir).join(file),
            (Some(file), None) => PathBuf::from(file),
            (None, Some(dir)) => Path::new(dir).join(format!("{}.log", component)),
            (None, None) => get_standard_log_path_for_component(component),
        }
    }
}

/// Get the standard log file path for a specific component
pub fn get_standard_log_path_for_component(component: &str) -> PathBuf {
    get_standard_log_dir().join(format!("{}.log", component))
}

/// Get the standard log directory for the current OS
///
/// - macOS: ~/Library/Logs/fleet-report
/// - Others: <data dir>/fleet-report, falling back to the temp dir
pub fn get_standard_log_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        let mut path = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
        path.push("Library");
        path.push("Logs");
        path.push("fleet-report");
        path
    }

    #[cfg(not(target_os = "macos"))]
    {
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("fleet-report");
        path
    }
}

/// Initialize console logging (stderr) with the given default level and format
pub fn init(component: &str, default_level: Level, format: LogFormat) -> anyhow::Result<()> {
    init_with_writer(component, default_level, format, io::stderr)
}

/// Initialize logging to a file, appending to it when it already exists
pub fn init_to_file(
    component: &str,
    default_level: Level,
    format: LogFormat,
    log_path: &Path,
) -> anyhow::Result<()> {
    use std::fs;

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let log_file = fs::OpenOptions::new().create(true).append(true).open(log_path)?;

    init_with_writer(component, default_level, format, std::sync::Mutex::new(log_file))
}

/// Initialize logging with a custom writer
///
/// `RUST_LOG` takes precedence over `default_level` when it is set.
pub fn init_with_writer<W>(
    component: &str,
    default_level: Level,
    format: LogFormat,
    writer: W,
) -> anyhow::Result<()>
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(component, default_level)));

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).json();
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
        LogFormat::Plaintext => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
    }

    Ok(())
}

fn default_filter(component: &str, level: Level) -> String {
    // Target names use underscores even when the crate name has dashes
    format!("{},{}={}", level, component.replace('-', "_"), level)
}

/// Redact sensitive information from log output
///
/// ```rust
/// use fleet_logging::redact;
///
/// let api_key = "0123456789abcdef";
/// tracing::info!(api_key = %redact(api_key), "API key configured");
/// ```
pub fn redact(_value: impl std::fmt::Display) -> &'static str {
    "[REDACTED]"
}
