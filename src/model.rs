use std::fmt;

use crate::constants::constants;

/// Opaque identifier of a playable YouTube video.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
  /// Accepts any non-empty string without whitespace.
  pub fn parse(raw: &str) -> Option<Self> {
    let raw = raw.trim();
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
      return None;
    }
    Some(Self(raw.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The watch page for this video on youtube.com.
  pub fn watch_url(&self) -> String {
    format!("{}?v={}", constants().watch_url_base, self.0)
  }
}

impl fmt::Display for VideoId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSummary {
  pub id: VideoId,
  pub title: String,
  pub channel_name: String,
}

/// Results of one search, in relevance order as returned by the API.
pub type ResultSet = Vec<VideoSummary>;

/// Playback volume, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Volume(u8);

impl Volume {
  pub const MAX: Volume = Volume(100);

  pub fn clamped(value: i32) -> Self {
    Self(value.clamp(0, Self::MAX.0 as i32) as u8)
  }

  pub fn get(self) -> u8 {
    self.0
  }

  /// Move by `delta` steps of the configured slider step.
  pub fn stepped(self, delta: i32) -> Self {
    Self::clamped(self.0 as i32 + delta * constants().volume_step as i32)
  }

  pub fn icon(self) -> &'static str {
    match self.0 {
      0 => "🔇",
      1..50 => "🔉",
      _ => "🔊",
    }
  }
}

impl Default for Volume {
  fn default() -> Self {
    Self::clamped(constants().default_volume as i32)
  }
}

impl fmt::Display for Volume {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}%", self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn video_id_rejects_blank_and_whitespace() {
    assert!(VideoId::parse("").is_none());
    assert!(VideoId::parse("   ").is_none());
    assert!(VideoId::parse("abc 123").is_none());
    assert_eq!(VideoId::parse(" abc123 ").map(|v| v.to_string()), Some("abc123".to_string()));
  }

  #[test]
  fn watch_url_uses_v_param() {
    let id = VideoId::parse("dQw4w9WgXcQ").unwrap();
    assert_eq!(id.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
  }

  #[test]
  fn volume_clamps_to_range() {
    assert_eq!(Volume::clamped(-20).get(), 0);
    assert_eq!(Volume::clamped(0).get(), 0);
    assert_eq!(Volume::clamped(42).get(), 42);
    assert_eq!(Volume::clamped(100).get(), 100);
    assert_eq!(Volume::clamped(250).get(), 100);
  }

  #[test]
  fn volume_steps_saturate() {
    assert_eq!(Volume::MAX.stepped(1), Volume::MAX);
    assert_eq!(Volume::clamped(0).stepped(-1).get(), 0);
    assert_eq!(Volume::clamped(50).stepped(1).get(), 55);
    assert_eq!(Volume::clamped(3).stepped(-1).get(), 0);
  }

  #[test]
  fn volume_icon_tiers() {
    assert_eq!(Volume::clamped(0).icon(), "🔇");
    assert_eq!(Volume::clamped(30).icon(), "🔉");
    assert_eq!(Volume::clamped(50).icon(), "🔊");
  }
}
