//! File-based tracing setup.
//!
//! The TUI owns the terminal, so logs go to a daily-rotated file in the
//! platform data directory instead of stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::project_dirs;

const LOG_FILE_PREFIX: &str = "elsound";
const DEFAULT_FILTER: &str = "elsound=debug,warn";

pub fn log_dir() -> PathBuf {
  project_dirs().map_or_else(|| std::env::temp_dir().join("elsound"), |d| d.data_local_dir().join("logs"))
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
///
/// The returned guard flushes buffered lines on drop; keep it alive until exit.
pub fn init_logging() -> Result<WorkerGuard> {
  let dir = log_dir();
  std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create log directory {}", dir.display()))?;

  let appender = RollingFileAppender::new(Rotation::DAILY, &dir, LOG_FILE_PREFIX);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
  let fmt_layer = fmt::layer().with_writer(writer).with_ansi(false).with_target(true);

  tracing_subscriber::registry().with(filter).with(fmt_layer).try_init().context("Failed to install tracing subscriber")?;

  tracing::info!(dir = %dir.display(), version = env!("CARGO_PKG_VERSION"), "logging initialized");
  Ok(guard)
}
