//! Logging setup for the BNG tools
//!
//! Console output plus an optional daily-rolling log file. `RUST_LOG`, when
//! set, takes precedence over the configured level.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level or filter directive (e.g. `info`, `bng_sync=debug`)
    pub level: String,
    /// Console format
    pub format: LogFormat,
    /// Enable ANSI colors in console output
    pub ansi: bool,
    /// Log file path; rolled daily, date appended to the file name
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `timestamp [LEVEL] message fields`
    Bracketed,
    Compact,
    Pretty,
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Bracketed,
            ansi: true,
            file: None,
        }
    }
}

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Event formatter that outputs: `timestamp [LEVEL] message`
///
/// Example output: `2026-03-02T10:15:44.809512Z [INFO] synced destination tile created=true`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m",
                Level::DEBUG => "\x1b[34m",
                Level::INFO => "\x1b[32m",
                Level::WARN => "\x1b[33m",
                Level::ERROR => "\x1b[31m",
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn env_filter(level: &str) -> Result<EnvFilter> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(level),
    };
    filter.map_err(|e| Error::config(format!("Invalid log level '{}': {}", level, e)))
}

/// Initialize logging with the given configuration
///
/// Returns a guard that must be kept alive for file logging to work
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let console_layer = match config.format {
        LogFormat::Bracketed => fmt::layer()
            .with_ansi(config.ansi)
            .event_format(BracketedLevelFormat)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_ansi(config.ansi)
            .with_target(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_ansi(config.ansi)
            .with_target(true)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_target(true).boxed(),
    };
    let mut layers = vec![console_layer.with_filter(env_filter(&config.level)?).boxed()];

    let mut guard = None;
    if let Some(path) = &config.file {
        let (directory, file_name) = split_log_path(path)?;
        std::fs::create_dir_all(directory)?;

        let appender = tracing_appender::rolling::daily(directory, file_name);
        let (non_blocking, file_guard) = tracing_appender::non_blocking(appender);
        guard = Some(file_guard);

        let file_layer = match config.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_ids(true)
                .boxed(),
            _ => fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .event_format(BracketedLevelFormat)
                .boxed(),
        };
        layers.push(file_layer.with_filter(env_filter(&config.level)?).boxed());
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;

    Ok(guard)
}

fn split_log_path(path: &Path) -> Result<(&Path, &str)> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::config(format!("Invalid log file path: {}", path.display())))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((directory, file_name))
}

/// Initialize logging for tests
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
