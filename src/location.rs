//! The navigable address of the app: `?v=<id>` plus back/forward history.
//!
//! The address is the source of truth when navigating history; picking a
//! result pushes a new entry without disturbing anything else.

use reqwest::Url;

use crate::model::VideoId;

/// Base used to resolve relative links like `?v=abc`.
const APP_BASE: &str = "elsound://app/";

/// Extract a video id from a link as typed or pasted by the user.
///
/// Accepts `?v=<id>`, `v=<id>`, any URL carrying a `v` query parameter
/// (`https://www.youtube.com/watch?v=<id>&t=10`) and `https://youtu.be/<id>`.
pub fn parse_link(raw: &str) -> Option<VideoId> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  let url = if raw.starts_with('?') {
    Url::parse(APP_BASE).ok()?.join(raw).ok()?
  } else if raw.starts_with("v=") {
    Url::parse(APP_BASE).ok()?.join(&format!("?{}", raw)).ok()?
  } else {
    Url::parse(raw).ok()?
  };

  if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
    return VideoId::parse(&v);
  }

  if url.host_str() == Some("youtu.be") {
    return url.path_segments()?.next().and_then(VideoId::parse);
  }

  None
}

/// Current address plus a linear history, like a browser tab.
#[derive(Debug, Clone)]
pub struct Location {
  entries: Vec<Option<VideoId>>,
  cursor: usize,
}

impl Default for Location {
  fn default() -> Self {
    Self { entries: vec![None], cursor: 0 }
  }
}

impl Location {
  /// Start at the address given on the command line, if any.
  pub fn from_link(link: Option<&str>) -> Self {
    Self { entries: vec![link.and_then(parse_link)], cursor: 0 }
  }

  pub fn current(&self) -> Option<&VideoId> {
    self.entries[self.cursor].as_ref()
  }

  /// Render the address as shown in the header, e.g. `?v=abc123`.
  pub fn query(&self) -> String {
    match self.current() {
      Some(id) => format!("?v={}", id),
      None => "/".to_string(),
    }
  }

  /// Push `id` as the new current entry, dropping any forward history.
  /// Pushing the current id again leaves the history untouched.
  pub fn push(&mut self, id: VideoId) {
    if self.current() == Some(&id) {
      return;
    }
    self.entries.truncate(self.cursor + 1);
    self.entries.push(Some(id));
    self.cursor = self.entries.len() - 1;
  }

  pub fn can_go_back(&self) -> bool {
    self.cursor > 0
  }

  pub fn can_go_forward(&self) -> bool {
    self.cursor + 1 < self.entries.len()
  }

  /// Step back one entry. Returns whether the address changed.
  pub fn back(&mut self) -> bool {
    if !self.can_go_back() {
      return false;
    }
    self.cursor -= 1;
    true
  }

  /// Step forward one entry. Returns whether the address changed.
  pub fn forward(&mut self) -> bool {
    if !self.can_go_forward() {
      return false;
    }
    self.cursor += 1;
    true
  }
}
