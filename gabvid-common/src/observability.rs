//! Shared observability helpers for binaries and integration tests.
//!
//! The logging initializer centralises our `tracing` setup so that every
//! binary appends into the same plain-text file sink. Call [`init_logging`]
//! once near process start and keep the returned [`LogHandle`] alive until
//! exit; dropping it flushes any buffered lines. Additional callers are
//! treated as no-ops and simply receive the resolved log file path.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{GabvidError, Result};

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory holding the log file. A leading `~/` is expanded.
    pub log_dir: PathBuf,
    /// File name inside `log_dir`. Lines are appended, never rotated.
    pub file_name: String,
    /// Whether to duplicate events to `stderr` in addition to the file sink.
    pub emit_stderr: bool,
    /// Preferred log encoding.
    pub format: LogFormat,
    /// Default filter applied when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("."),
            file_name: "extract.log".to_string(),
            emit_stderr: true,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

/// Keeps the background file writer alive.
///
/// Dropping the handle flushes pending log lines, so hold it in `main` until
/// the process is about to exit.
#[must_use = "dropping the handle stops the file writer"]
pub struct LogHandle {
    path: PathBuf,
    _guard: Option<WorkerGuard>,
}

impl LogHandle {
    /// Concrete path of the log file being appended to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Subsequent calls do not touch the subscriber and hand back the originally
/// resolved location without a writer guard. Setup failures surface as
/// [`GabvidError::Logging`].
pub fn init_logging(config: LogConfig) -> Result<LogHandle> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(LogHandle {
            path: path.clone(),
            _guard: None,
        });
    }

    install_subscriber(config).map_err(GabvidError::Logging)
}

fn install_subscriber(config: LogConfig) -> anyhow::Result<LogHandle> {
    let resolved_dir = expand_home(&config.log_dir);
    std::fs::create_dir_all(&resolved_dir)
        .with_context(|| format!("failed to create log directory: {}", resolved_dir.display()))?;
    let full_path = resolved_dir.join(&config.file_name);

    let appender = rolling::never(&resolved_dir, &config.file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));
    let timer = || ChronoLocal::new(TIMESTAMP_FORMAT.to_string());

    match (config.format, config.emit_stderr) {
        (LogFormat::Text, false) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_timer(timer()).with_writer(writer).with_ansi(false))
                .try_init()
                .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;
        }
        (LogFormat::Text, true) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_timer(timer()).with_writer(writer).with_ansi(false))
                .with(fmt::layer().with_timer(timer()).with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;
        }
        (LogFormat::Json, false) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_timer(timer()).with_writer(writer))
                .try_init()
                .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;
        }
        (LogFormat::Json, true) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_timer(timer()).with_writer(writer))
                .with(fmt::layer().json().with_timer(timer()).with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;
        }
    }

    let _ = LOG_PATH.set(full_path.clone());
    Ok(LogHandle {
        path: full_path,
        _guard: Some(guard),
    })
}

fn expand_home(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}
