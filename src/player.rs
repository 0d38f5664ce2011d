use anyhow::Result;
use tracing::{debug, info, warn};

use crate::error::PlaybackUnavailable;
use crate::model::{VideoId, Volume};

/// Playback progress reported by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
  Unstarted,
  Playing,
  Paused,
  Buffering,
  Ended,
}

impl PlaybackState {
  pub fn label(self) -> &'static str {
    match self {
      PlaybackState::Unstarted => "Starting",
      PlaybackState::Playing => "Playing",
      PlaybackState::Paused => "Paused",
      PlaybackState::Buffering => "Buffering",
      PlaybackState::Ended => "Ended",
    }
  }
}

/// Signals coming back from the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
  /// Media is loaded and accepts commands.
  Ready,
  /// The video can't be played on this surface.
  Error(String),
  StateChange(PlaybackState),
}

/// Something that can render a video and take playback commands.
///
/// Commands are fire-and-forget; outcomes come back through `poll_event`.
pub trait PlaybackSurface {
  /// Replace whatever is loaded with `id`, starting at `volume`.
  fn load(&mut self, id: &VideoId, volume: Volume) -> Result<()>;
  fn unload(&mut self);
  fn set_volume(&mut self, volume: Volume) -> Result<()>;
  fn play(&mut self) -> Result<()>;
  fn toggle_pause(&mut self) -> Result<()>;
  fn poll_event(&mut self) -> Option<SurfaceEvent>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStatus {
  Idle,
  Loading,
  Ready,
  Error(PlaybackUnavailable),
}

/// Drives a `PlaybackSurface` from the selected video and session volume.
pub struct Player<P: PlaybackSurface> {
  surface: P,
  active: Option<VideoId>,
  status: PlayerStatus,
  playback: Option<PlaybackState>,
  volume: Volume,
  autoplay: bool,
}

impl<P: PlaybackSurface> Player<P> {
  /// With `autoplay` off, a loaded video waits for an explicit `toggle_pause`.
  pub fn new(surface: P, volume: Volume, autoplay: bool) -> Self {
    Self { surface, active: None, status: PlayerStatus::Idle, playback: None, volume, autoplay }
  }

  pub fn status(&self) -> &PlayerStatus {
    &self.status
  }

  pub fn active(&self) -> Option<&VideoId> {
    self.active.as_ref()
  }

  pub fn playback(&self) -> Option<PlaybackState> {
    self.playback
  }

  pub fn is_active(&self) -> bool {
    !matches!(self.status, PlayerStatus::Idle)
  }

  #[cfg(test)]
  pub fn surface_mut(&mut self) -> &mut P {
    &mut self.surface
  }

  /// Bring the surface in line with the wanted video and volume.
  pub fn sync(&mut self, wanted: Option<&VideoId>, volume: Volume) {
    if self.active.as_ref() != wanted {
      match wanted {
        Some(id) => self.load(id.clone(), volume),
        None => self.unload(),
      }
    }
    self.apply_volume(volume);
  }

  fn load(&mut self, id: VideoId, volume: Volume) {
    info!(video_id = %id, "player: loading");
    self.playback = None;
    self.volume = volume;
    self.status = match self.surface.load(&id, volume) {
      Ok(()) => PlayerStatus::Loading,
      Err(e) => {
        warn!(video_id = %id, err = %e, "player: surface failed to load");
        PlayerStatus::Error(PlaybackUnavailable { id: id.clone(), reason: format!("{:#}", e) })
      }
    };
    self.active = Some(id);
  }

  fn unload(&mut self) {
    debug!("player: idle");
    self.surface.unload();
    self.active = None;
    self.playback = None;
    self.status = PlayerStatus::Idle;
  }

  /// Record the new volume; push it to the surface right away when ready,
  /// otherwise it is applied on the next `Ready`.
  pub fn apply_volume(&mut self, volume: Volume) {
    if self.volume == volume {
      return;
    }
    self.volume = volume;
    if self.status == PlayerStatus::Ready
      && let Err(e) = self.surface.set_volume(volume)
    {
      warn!(err = %e, "player: failed to set volume");
    }
  }

  pub fn toggle_pause(&mut self) -> Result<()> {
    if self.status == PlayerStatus::Ready {
      self.surface.toggle_pause()?;
    }
    Ok(())
  }

  /// Where to watch the video when it can't be played here.
  pub fn fallback_url(&self) -> Option<String> {
    match &self.status {
      PlayerStatus::Error(e) => Some(e.id.watch_url()),
      _ => None,
    }
  }

  /// Drain surface events and advance the state machine.
  pub fn pump(&mut self) {
    while let Some(event) = self.surface.poll_event() {
      self.handle_event(event);
    }
  }

  fn handle_event(&mut self, event: SurfaceEvent) {
    let Some(id) = self.active.clone() else { return };
    match event {
      SurfaceEvent::Ready => {
        if self.status != PlayerStatus::Loading {
          return;
        }
        info!(video_id = %id, volume = self.volume.get(), "player: ready");
        self.status = PlayerStatus::Ready;
        if let Err(e) = self.surface.set_volume(self.volume) {
          warn!(err = %e, "player: failed to apply initial volume");
        }
        if self.autoplay
          && let Err(e) = self.surface.play()
        {
          warn!(err = %e, "player: autoplay failed");
        }
      }
      SurfaceEvent::Error(reason) => {
        if matches!(self.status, PlayerStatus::Error(_)) {
          return;
        }
        warn!(video_id = %id, reason = %reason, "player: video unavailable");
        self.status = PlayerStatus::Error(PlaybackUnavailable { id, reason });
      }
      SurfaceEvent::StateChange(state) => {
        self.playback = Some(state);
        if self.autoplay
          && self.status == PlayerStatus::Ready
          && matches!(state, PlaybackState::Unstarted | PlaybackState::Buffering)
          && let Err(e) = self.surface.play()
        {
          warn!(err = %e, "player: failed to resume");
        }
      }
    }
  }
}


#[cfg(test)]
mod tests {
  use super::fake::{Call, FakeSurface};
  use super::*;

  fn id(s: &str) -> VideoId {
    VideoId::parse(s).unwrap()
  }

  fn player() -> Player<FakeSurface> {
    Player::new(FakeSurface::default(), Volume::MAX, true)
  }

  fn ready(p: &mut Player<FakeSurface>) {
    p.surface_mut().events.push_back(SurfaceEvent::Ready);
    p.pump();
  }

  #[test]
  fn no_video_stays_idle() {
    let mut p = player();
    p.sync(None, Volume::MAX);
    assert_eq!(p.status(), &PlayerStatus::Idle);
    assert!(p.surface_mut().take_calls().is_empty());
  }

  #[test]
  fn load_then_ready_applies_volume_and_plays() {
    let mut p = player();
    p.sync(Some(&id("abc")), Volume::clamped(40));
    assert_eq!(p.status(), &PlayerStatus::Loading);
    assert_eq!(p.surface_mut().take_calls(), [Call::Load("abc".into(), 40)]);

    ready(&mut p);
    assert_eq!(p.status(), &PlayerStatus::Ready);
    assert_eq!(p.surface_mut().take_calls(), [Call::SetVolume(40), Call::Play]);
  }

  #[test]
  fn same_id_does_not_reload() {
    let mut p = player();
    p.sync(Some(&id("abc")), Volume::MAX);
    p.sync(Some(&id("abc")), Volume::MAX);
    assert_eq!(p.surface_mut().take_calls(), [Call::Load("abc".into(), 100)]);
  }

  #[test]
  fn volume_while_ready_is_applied_immediately() {
    let mut p = player();
    p.sync(Some(&id("abc")), Volume::MAX);
    ready(&mut p);
    p.surface_mut().take_calls();

    p.sync(Some(&id("abc")), Volume::clamped(20));
    assert_eq!(p.surface_mut().take_calls(), [Call::SetVolume(20)]);
  }

  #[test]
  fn volume_while_loading_waits_for_ready() {
    let mut p = player();
    p.sync(Some(&id("abc")), Volume::MAX);
    p.sync(Some(&id("abc")), Volume::clamped(10));
    assert_eq!(p.surface_mut().take_calls(), [Call::Load("abc".into(), 100)]);

    ready(&mut p);
    assert_eq!(p.surface_mut().take_calls(), [Call::SetVolume(10), Call::Play]);
  }

  #[test]
  fn volume_reapplied_to_next_video() {
    let mut p = player();
    p.sync(Some(&id("one")), Volume::clamped(30));
    ready(&mut p);
    p.surface_mut().take_calls();

    p.sync(Some(&id("two")), Volume::clamped(30));
    ready(&mut p);
    assert_eq!(p.surface_mut().take_calls(), [Call::Load("two".into(), 30), Call::SetVolume(30), Call::Play]);
  }

  #[test]
  fn surface_error_offers_fallback() {
    let mut p = player();
    p.sync(Some(&id("blocked")), Volume::MAX);
    p.surface_mut().events.push_back(SurfaceEvent::Error("embedding disabled".into()));
    p.pump();

    let PlayerStatus::Error(e) = p.status() else { panic!("expected error, got {:?}", p.status()) };
    assert_eq!(e.reason, "embedding disabled");
    assert_eq!(p.fallback_url().as_deref(), Some("https://www.youtube.com/watch?v=blocked"));

    // A second error report keeps the first reason.
    p.surface_mut().events.push_back(SurfaceEvent::Error("exit status 2".into()));
    p.pump();
    let PlayerStatus::Error(e) = p.status() else { panic!() };
    assert_eq!(e.reason, "embedding disabled");
  }

  #[test]
  fn new_video_recovers_from_error() {
    let mut p = player();
    p.sync(Some(&id("blocked")), Volume::MAX);
    p.surface_mut().events.push_back(SurfaceEvent::Error("nope".into()));
    p.pump();

    p.sync(Some(&id("fine")), Volume::MAX);
    assert_eq!(p.status(), &PlayerStatus::Loading);
    assert_eq!(p.fallback_url(), None);
  }

  #[test]
  fn load_failure_is_an_error_state() {
    let mut p = Player::new(FakeSurface { fail_load: true, ..Default::default() }, Volume::MAX, true);
    p.sync(Some(&id("abc")), Volume::MAX);
    let PlayerStatus::Error(e) = p.status() else { panic!() };
    assert!(e.reason.contains("mpv not found"));
  }

  #[test]
  fn clearing_selection_unloads() {
    let mut p = player();
    p.sync(Some(&id("abc")), Volume::MAX);
    p.sync(None, Volume::MAX);
    assert_eq!(p.status(), &PlayerStatus::Idle);
    assert_eq!(p.active(), None);
    assert_eq!(p.surface_mut().take_calls().last(), Some(&Call::Unload));
  }

  #[test]
  fn buffering_nudges_play() {
    let mut p = player();
    p.sync(Some(&id("abc")), Volume::MAX);
    ready(&mut p);
    p.surface_mut().take_calls();

    p.surface_mut().events.push_back(SurfaceEvent::StateChange(PlaybackState::Buffering));
    p.surface_mut().events.push_back(SurfaceEvent::StateChange(PlaybackState::Paused));
    p.pump();
    assert_eq!(p.surface_mut().take_calls(), [Call::Play]);
    assert_eq!(p.playback(), Some(PlaybackState::Paused));
  }

  #[test]
  fn without_autoplay_ready_leaves_video_paused() {
    let mut p = Player::new(FakeSurface::default(), Volume::MAX, false);
    p.sync(Some(&id("abc")), Volume::clamped(60));
    ready(&mut p);
    assert_eq!(p.status(), &PlayerStatus::Ready);
    assert_eq!(p.surface_mut().take_calls(), [Call::Load("abc".into(), 60), Call::SetVolume(60)]);

    p.surface_mut().events.push_back(SurfaceEvent::StateChange(PlaybackState::Unstarted));
    p.pump();
    assert!(p.surface_mut().take_calls().is_empty());

    p.toggle_pause().unwrap();
    assert_eq!(p.surface_mut().take_calls(), [Call::TogglePause]);
  }

  #[test]
  fn pause_only_when_ready() {
    let mut p = player();
    p.toggle_pause().unwrap();
    p.sync(Some(&id("abc")), Volume::MAX);
    p.toggle_pause().unwrap();
    ready(&mut p);
    p.surface_mut().take_calls();
    p.toggle_pause().unwrap();
    assert_eq!(p.surface_mut().take_calls(), [Call::TogglePause]);
  }
}
