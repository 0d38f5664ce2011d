use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::constants::constants;
use crate::model::Volume;

/// Environment variable that overrides `api_key` from the config file.
pub const API_KEY_ENV: &str = "ELSOUND_API_KEY";

pub fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "elsound")
}

/// How mpv is launched for each video.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EmbedOptions {
  /// Start playing as soon as the video is loaded.
  pub autoplay: bool,
  /// Show mpv's on-screen controller.
  pub controls: bool,
  /// Let mpv handle its own key bindings in its window.
  pub keyboard: bool,
  /// Skip the video track entirely.
  pub audio_only: bool,
  /// Passed to `--ytdl-format` when set.
  pub format: Option<String>,
}

impl Default for EmbedOptions {
  fn default() -> Self {
    Self { autoplay: true, controls: true, keyboard: true, audio_only: true, format: None }
  }
}

/// Deployment-time settings read from `config.toml`. Nothing is ever written
/// back; preferences changed at runtime last for the session only.
#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct Config {
  pub api_key: Option<String>,
  pub theme: Option<String>,
  pub volume: Option<i64>,
  pub notification_secs: Option<u64>,
  pub request_timeout_secs: Option<u64>,
  pub embed: EmbedOptions,
}

impl Config {
  /// Default location: `<config dir>/elsound/config.toml`.
  pub fn default_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
  }

  /// Load from `path` (or the default location), then apply environment
  /// overrides. A missing file yields defaults; a malformed one is an error.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let path = path.map(Path::to_path_buf).or_else(Self::default_path);
    let mut config = match path {
      Some(path) if path.exists() => {
        let content =
          std::fs::read_to_string(&path).with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))?
      }
      _ => Self::default(),
    };
    if let Ok(key) = std::env::var(API_KEY_ENV) {
      config.api_key = Some(key);
    }
    Ok(config)
  }

  pub fn parse(content: &str) -> Result<Self> {
    Ok(toml::from_str(content)?)
  }

  /// The search API credential. Required; there is no built-in fallback.
  pub fn api_key(&self) -> Result<&str> {
    match self.api_key.as_deref().map(str::trim) {
      Some(key) if !key.is_empty() => Ok(key),
      _ => bail!(
        "No YouTube Data API key configured. Set {} or add `api_key = \"...\"` to {}",
        API_KEY_ENV,
        Self::default_path().map_or_else(|| "config.toml".to_string(), |p| p.display().to_string())
      ),
    }
  }

  pub fn initial_volume(&self) -> Volume {
    self.volume.map_or_else(Volume::default, |v| Volume::clamped(v.clamp(0, Volume::MAX.get() as i64) as i32))
  }

  pub fn notification_timeout(&self) -> Duration {
    Duration::from_secs(self.notification_secs.unwrap_or(constants().notification_secs))
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs.unwrap_or(constants().request_timeout_secs))
  }
}
