//! Console and file log sinks

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_FILTER: &str = "linewatch=info,linewatch_core=info,linewatch_cv=info";

/// Where log lines are written besides the console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Directory of the log file; `null` logs to the console only
    pub dir: Option<PathBuf>,
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: Some(PathBuf::from("logs")),
            file: "linewatch.log".to_string(),
        }
    }
}

impl LogConfig {
    pub fn path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(&self.file))
    }
}

/// Append-only writer to `dir/file`, creating the directory first.
///
/// Lines are flushed by a background worker until the guard is dropped.
pub fn file_writer(dir: &Path, file: &str) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create log directory: {:?}", dir))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file)
        .build(dir)
        .with_context(|| format!("Failed to open log file {:?} in {:?}", file, dir))?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
///
/// The returned guard must live until the program exits or buffered file
/// lines are lost.
pub fn init(config: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            let (writer, guard) = file_writer(dir, &config.file)?;
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    if let Some(path) = config.path() {
        tracing::info!("Logging to {:?}", path);
    }
    Ok(guard)
}
