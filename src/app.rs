use std::sync::Arc;
use std::time::Instant;

use ratatui::widgets::ListState;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::controller::AppController;
use crate::error::SearchError;
use crate::model::{ResultSet, VideoSummary};
use crate::player::{PlaybackSurface, Player};
use crate::search_bar::SearchBar;
use crate::theme::{THEMES, Theme};
use crate::youtube::SearchService;

// --- Types ---

/// A finished search, tagged with the sequence number it was issued under.
pub type SearchOutcome = (u64, Result<ResultSet, SearchError>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  Input,
  Results,
}

/// Binds the controller to the runtime: spawns searches, feeds their results
/// back, and keeps the player in line with the controller's selection and volume.
pub struct App<S: SearchService, P: PlaybackSurface> {
  pub search_bar: SearchBar,
  pub mode: AppMode,
  pub theme_index: usize,
  pub list_state: ListState,
  pub controller: AppController,
  pub player: Player<P>,
  pub should_quit: bool,
  search: Arc<S>,
  search_tx: mpsc::UnboundedSender<SearchOutcome>,
  search_rx: mpsc::UnboundedReceiver<SearchOutcome>,
}

impl<S: SearchService, P: PlaybackSurface> App<S, P> {
  pub fn new(search: S, surface: P, autoplay: bool, controller: AppController, theme_index: usize) -> Self {
    let (search_tx, search_rx) = mpsc::unbounded_channel();
    let player = Player::new(surface, controller.volume(), autoplay);
    let mut app = Self {
      search_bar: SearchBar::default(),
      mode: AppMode::Input,
      theme_index: theme_index.min(THEMES.len() - 1),
      list_state: ListState::default(),
      controller,
      player,
      should_quit: false,
      search: Arc::new(search),
      search_tx,
      search_rx,
    };
    // A video from the startup link plays without any search.
    app.sync_player();
    app
  }

  pub fn theme(&self) -> &'static Theme {
    // Safety: theme_index is clamped in new() and wrapped in next_theme().
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    debug!(theme = self.theme().name, "theme changed");
  }

  // --- Search ---

  /// Submit the search bar. Blank input does nothing at all.
  pub fn trigger_search(&mut self) {
    let Some(ticket) = self.controller.submit(&self.search_bar.input) else { return };
    let search = Arc::clone(&self.search);
    let tx = self.search_tx.clone();
    tokio::spawn(async move {
      let outcome = search.search(&ticket.query).await;
      let _ = tx.send((ticket.seq, outcome));
    });
  }

  /// Apply finished searches, advance the player and expire notifications.
  pub fn check_pending(&mut self) {
    while let Ok((seq, outcome)) = self.search_rx.try_recv() {
      let has_results = outcome.as_ref().is_ok_and(|r| !r.is_empty());
      let succeeded = outcome.is_ok();
      if !self.controller.apply_search(seq, outcome, Instant::now()) {
        continue;
      }
      if has_results {
        self.list_state.select(Some(0));
        self.mode = AppMode::Results;
      } else if succeeded {
        self.list_state.select(None);
      }
    }
    self.player.pump();
    self.controller.expire_error(Instant::now());
  }

  // --- Selection ---

  pub fn highlighted(&self) -> Option<&VideoSummary> {
    self.list_state.selected().and_then(|i| self.controller.results().get(i))
  }

  /// Play the highlighted result. Ignored while a search is in flight.
  pub fn select_highlighted(&mut self) {
    if self.controller.is_loading() {
      return;
    }
    let Some(entry) = self.highlighted() else { return };
    let id = entry.id.clone();
    self.controller.select(id);
    self.sync_player();
  }

  pub fn navigate_back(&mut self) {
    if self.controller.navigate_back() {
      self.sync_player();
    }
  }

  pub fn navigate_forward(&mut self) {
    if self.controller.navigate_forward() {
      self.sync_player();
    }
  }

  pub fn move_highlight(&mut self, down: bool) {
    let count = self.controller.results().len();
    if count == 0 {
      return;
    }
    let i = match (self.list_state.selected(), down) {
      (None, _) => 0,
      (Some(i), true) => (i + 1) % count,
      (Some(0), false) => count - 1,
      (Some(i), false) => i - 1,
    };
    self.list_state.select(Some(i));
  }

  // --- Player ---

  /// Slider moved by `steps`. The controller owns the value; the player
  /// picks it up on sync.
  pub fn adjust_volume(&mut self, steps: i32) {
    let volume = self.controller.volume().stepped(steps);
    self.controller.set_volume(volume);
    self.sync_player();
  }

  pub fn toggle_pause(&mut self) {
    if let Err(e) = self.player.toggle_pause() {
      self.controller.raise_error(format!("Pause error: {}", e), Instant::now());
    }
  }

  /// Watch URL to hand to the browser: the unplayable video's page, or the
  /// current selection's.
  pub fn external_url(&self) -> Option<String> {
    self.player.fallback_url().or_else(|| self.controller.selection().map(|id| id.watch_url()))
  }

  /// Open the selected video on youtube.com in the system browser.
  pub fn open_external(&mut self) {
    let Some(url) = self.external_url() else { return };
    info!(url = %url, "opening video in browser");
    #[cfg(target_os = "macos")]
    let cmd = "open";
    #[cfg(not(target_os = "macos"))]
    let cmd = "xdg-open";
    match std::process::Command::new(cmd)
      .arg(&url)
      .stdin(std::process::Stdio::null())
      .stdout(std::process::Stdio::null())
      .stderr(std::process::Stdio::null())
      .spawn()
    {
      Ok(mut child) => {
        // Reap the child in a background thread to avoid zombie processes.
        std::thread::spawn(move || {
          let _ = child.wait();
        });
      }
      Err(e) => {
        warn!(err = %e, "failed to open browser");
        self.controller.raise_error(format!("Failed to open browser: {}", e), Instant::now());
      }
    }
  }

  pub fn sync_player(&mut self) {
    self.player.sync(self.controller.selection(), self.controller.volume());
  }

  /// Stop playback before exit.
  pub fn shutdown(&mut self) {
    self.player.sync(None, self.controller.volume());
  }
}
