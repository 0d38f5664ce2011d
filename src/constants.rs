//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so there is no runtime file I/O.
//! Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // YouTube Data API
  pub search_endpoint: String,
  pub watch_url_base: String,
  pub page_size: usize,
  pub generic_search_error: String,

  // Session defaults
  pub default_volume: u8,
  pub volume_step: u8,
  pub notification_secs: u64,
  pub request_timeout_secs: u64,

  // mpv IPC
  pub ipc_connect_attempts: u32,
  pub ipc_connect_delay_ms: u64,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; a malformed file fails the first test run.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
