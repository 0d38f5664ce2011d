//! Search-and-playback coordination state.
//!
//! `AppController` owns everything the views read: the current result set,
//! the selected video (through the `Location`), the loading flag, the
//! transient error notification and the session volume. It never touches the
//! network or the player directly; callers dispatch the `SearchTicket` it
//! hands out and feed results back through `apply_search`.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::SearchError;
use crate::location::Location;
use crate::model::{ResultSet, VideoId, Volume};

/// A search the caller must dispatch. `seq` identifies it when the result
/// comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
  pub seq: u64,
  pub query: String,
}

/// A dismissible, auto-expiring message.
#[derive(Debug, Clone)]
pub struct Notification {
  pub message: String,
  pub raised_at: Instant,
}

#[derive(Debug)]
pub struct AppController {
  results: ResultSet,
  loading: bool,
  error: Option<Notification>,
  volume: Volume,
  location: Location,
  latest_seq: u64,
  last_query: Option<String>,
  notification_timeout: Duration,
}

impl AppController {
  pub fn new(location: Location, volume: Volume, notification_timeout: Duration) -> Self {
    if let Some(id) = location.current() {
      info!(video_id = %id, "starting with video from link");
    }
    Self {
      results: Vec::new(),
      loading: false,
      error: None,
      volume,
      location,
      latest_seq: 0,
      last_query: None,
      notification_timeout,
    }
  }

  // --- Accessors ---

  pub fn results(&self) -> &ResultSet {
    &self.results
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn error(&self) -> Option<&Notification> {
    self.error.as_ref()
  }

  pub fn volume(&self) -> Volume {
    self.volume
  }

  /// The selected video. Always the current address.
  pub fn selection(&self) -> Option<&VideoId> {
    self.location.current()
  }

  pub fn location(&self) -> &Location {
    &self.location
  }

  pub fn last_query(&self) -> Option<&str> {
    self.last_query.as_deref()
  }

  // --- Search ---

  /// Start a search for `raw`. Blank input is ignored and yields no ticket.
  pub fn submit(&mut self, raw: &str) -> Option<SearchTicket> {
    let query = raw.trim();
    if query.is_empty() {
      debug!("blank search ignored");
      return None;
    }
    self.latest_seq += 1;
    self.loading = true;
    self.error = None;
    self.last_query = Some(query.to_string());
    info!(seq = self.latest_seq, query = %query, "search triggered");
    Some(SearchTicket { seq: self.latest_seq, query: query.to_string() })
  }

  /// Apply the outcome of search `seq`. Outcomes of superseded searches are
  /// dropped. Returns whether the outcome was applied.
  pub fn apply_search(&mut self, seq: u64, outcome: Result<ResultSet, SearchError>, now: Instant) -> bool {
    if seq != self.latest_seq {
      debug!(seq, latest = self.latest_seq, "discarding stale search response");
      return false;
    }
    self.loading = false;
    match outcome {
      Ok(results) => {
        info!(seq, count = results.len(), "search results applied");
        self.results = results;
        self.error = None;
      }
      Err(e) => {
        warn!(seq, err = %e, "search failed");
        self.raise_error(format!("Search failed: {}", e), now);
      }
    }
    true
  }

  // --- Selection & navigation ---

  /// Select a video and push it into the address. Selecting the current
  /// video again changes nothing.
  pub fn select(&mut self, id: VideoId) {
    if self.location.current() != Some(&id) {
      info!(video_id = %id, "video selected");
    }
    self.location.push(id);
  }

  pub fn navigate_back(&mut self) -> bool {
    let moved = self.location.back();
    if moved {
      debug!(address = %self.location.query(), "navigated back");
    }
    moved
  }

  pub fn navigate_forward(&mut self) -> bool {
    let moved = self.location.forward();
    if moved {
      debug!(address = %self.location.query(), "navigated forward");
    }
    moved
  }

  // --- Volume ---

  pub fn set_volume(&mut self, volume: Volume) {
    self.volume = volume;
  }

  // --- Notifications ---

  pub fn raise_error(&mut self, message: String, now: Instant) {
    self.error = Some(Notification { message, raised_at: now });
  }

  pub fn dismiss_error(&mut self) {
    self.error = None;
  }

  /// Drop the notification once it has been visible for the timeout.
  pub fn expire_error(&mut self, now: Instant) {
    if let Some(n) = &self.error
      && now.saturating_duration_since(n.raised_at) >= self.notification_timeout
    {
      self.error = None;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::VideoSummary;

  const TIMEOUT: Duration = Duration::from_secs(6);

  fn controller() -> AppController {
    AppController::new(Location::default(), Volume::MAX, TIMEOUT)
  }

  fn summary(id: &str, title: &str) -> VideoSummary {
    VideoSummary { id: VideoId::parse(id).unwrap(), title: title.to_string(), channel_name: "ch".to_string() }
  }

  fn ids(c: &AppController) -> Vec<&str> {
    c.results().iter().map(|r| r.id.as_str()).collect()
  }

  #[test]
  fn blank_submit_issues_no_ticket() {
    let mut c = controller();
    for raw in ["", " ", "\t\n", "   \u{a0} "] {
      assert_eq!(c.submit(raw), None);
    }
    assert!(!c.is_loading());
    assert!(c.error().is_none());
    assert_eq!(c.last_query(), None);
  }

  #[test]
  fn submit_trims_and_sets_loading() {
    let mut c = controller();
    let now = Instant::now();
    c.raise_error("old".to_string(), now);
    let ticket = c.submit("  lofi beats ").unwrap();
    assert_eq!(ticket, SearchTicket { seq: 1, query: "lofi beats".to_string() });
    assert!(c.is_loading());
    assert!(c.error().is_none());
  }

  #[test]
  fn results_applied_in_order() {
    for n in [0usize, 1, 3, 10] {
      let mut c = controller();
      let ticket = c.submit("q").unwrap();
      let results: ResultSet = (0..n).map(|i| summary(&format!("id{i}"), &format!("t{i}"))).collect();
      assert!(c.apply_search(ticket.seq, Ok(results.clone()), Instant::now()));
      assert_eq!(c.results().len(), n);
      for (shown, sent) in c.results().iter().zip(&results) {
        assert_eq!(shown.id, sent.id);
      }
      assert!(!c.is_loading());
    }
  }

  #[test]
  fn failure_keeps_results_then_success_replaces() {
    let mut c = controller();
    let now = Instant::now();
    let t1 = c.submit("first").unwrap();
    c.apply_search(t1.seq, Ok(vec![summary("a", "A"), summary("b", "B")]), now);

    let t2 = c.submit("second").unwrap();
    c.apply_search(t2.seq, Err(SearchError::Failed("quota".to_string())), now);
    assert!(!c.is_loading());
    let err = c.error().unwrap();
    assert!(!err.message.is_empty());
    assert!(err.message.contains("quota"));
    assert_eq!(ids(&c), ["a", "b"]);

    let t3 = c.submit("third").unwrap();
    c.apply_search(t3.seq, Ok(vec![summary("z", "Z")]), now);
    assert!(c.error().is_none());
    assert_eq!(ids(&c), ["z"]);
  }

  #[test]
  fn stale_responses_are_discarded() {
    let mut c = controller();
    let now = Instant::now();
    let old = c.submit("old").unwrap();
    let new = c.submit("new").unwrap();

    // Newest resolves first, then the stale one arrives late.
    assert!(c.apply_search(new.seq, Ok(vec![summary("new1", "N")]), now));
    assert!(!c.apply_search(old.seq, Ok(vec![summary("old1", "O")]), now));
    assert_eq!(ids(&c), ["new1"]);

    // A stale failure neither raises an error nor clears loading.
    let latest = c.submit("latest").unwrap();
    assert!(!c.apply_search(new.seq, Err(SearchError::Failed("late".to_string())), now));
    assert!(c.is_loading());
    assert!(c.error().is_none());
    assert!(c.apply_search(latest.seq, Ok(vec![]), now));
    assert!(!c.is_loading());
  }

  #[test]
  fn select_updates_selection_and_address_idempotently() {
    let mut c = controller();
    let x = VideoId::parse("X1").unwrap();
    c.select(x.clone());
    let once = (c.selection().cloned(), c.location().query(), c.location().can_go_back());
    c.select(x.clone());
    let twice = (c.selection().cloned(), c.location().query(), c.location().can_go_back());
    assert_eq!(once, twice);
    assert_eq!(c.selection(), Some(&x));
    assert_eq!(c.location().query(), "?v=X1");

    // One back step returns to the empty address.
    assert!(c.navigate_back());
    assert_eq!(c.selection(), None);
    assert!(!c.navigate_back());
  }

  #[test]
  fn startup_link_initialises_selection() {
    let c = AppController::new(Location::from_link(Some("?v=abc123")), Volume::MAX, TIMEOUT);
    assert_eq!(c.selection().map(VideoId::as_str), Some("abc123"));
    assert!(c.results().is_empty());
    assert!(!c.is_loading());
  }

  #[test]
  fn history_navigation_drives_selection() {
    let mut c = controller();
    c.select(VideoId::parse("a").unwrap());
    c.select(VideoId::parse("b").unwrap());
    assert!(c.navigate_back());
    assert_eq!(c.selection().map(VideoId::as_str), Some("a"));
    assert!(c.navigate_forward());
    assert_eq!(c.selection().map(VideoId::as_str), Some("b"));
    assert!(!c.navigate_forward());
  }

  #[test]
  fn selection_survives_new_search() {
    let mut c = controller();
    c.select(VideoId::parse("keep").unwrap());
    let t = c.submit("other").unwrap();
    c.apply_search(t.seq, Ok(vec![summary("n", "N")]), Instant::now());
    assert_eq!(c.selection().map(VideoId::as_str), Some("keep"));
  }

  #[test]
  fn volume_persists_across_selection() {
    let mut c = controller();
    c.set_volume(Volume::clamped(140));
    assert_eq!(c.volume(), Volume::MAX);
    c.set_volume(Volume::clamped(35));
    c.select(VideoId::parse("next").unwrap());
    assert_eq!(c.volume().get(), 35);
  }

  #[test]
  fn notification_expires_after_timeout() {
    let mut c = controller();
    let t0 = Instant::now();
    let ticket = c.submit("q").unwrap();
    c.apply_search(ticket.seq, Err(SearchError::Failed("HTTP 403".to_string())), t0);

    c.expire_error(t0 + TIMEOUT - Duration::from_millis(1));
    assert!(c.error().is_some());
    c.expire_error(t0 + TIMEOUT);
    assert!(c.error().is_none());
  }

  #[test]
  fn notification_can_be_dismissed() {
    let mut c = controller();
    c.raise_error("boom".to_string(), Instant::now());
    c.dismiss_error();
    assert!(c.error().is_none());
  }
}
