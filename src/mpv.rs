//! `PlaybackSurface` backed by an mpv child process.
//!
//! Each `load` spawns a fresh mpv with a private JSON IPC socket. A background
//! task owns the child and the socket: it forwards commands from an mpsc
//! channel and turns mpv events into `SurfaceEvent`s. Replacing or dropping the
//! session aborts the task, which kills mpv (`kill_on_drop`).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde_json::{Value, json};
use tokio::{
  io::{AsyncBufReadExt, AsyncWriteExt, BufReader as TokioBufReader},
  net::{UnixStream, unix::OwnedWriteHalf},
  process::{Child as TokioChild, Command},
  sync::mpsc,
  task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::config::EmbedOptions;
use crate::constants::constants;
use crate::model::{VideoId, Volume};
use crate::player::{PlaybackState, PlaybackSurface, SurfaceEvent};

struct Session {
  commands: mpsc::UnboundedSender<Value>,
  events: mpsc::UnboundedReceiver<SurfaceEvent>,
  task: JoinHandle<()>,
}

pub struct MpvSurface {
  options: EmbedOptions,
  socket_path: PathBuf,
  session: Option<Session>,
}

impl MpvSurface {
  pub fn new(options: EmbedOptions) -> Self {
    let socket_path = std::env::temp_dir().join(format!("elsound-mpv-{}.sock", std::process::id()));
    Self { options, socket_path, session: None }
  }

  fn send(&self, command: Value) -> Result<()> {
    let Some(session) = &self.session else { return Ok(()) };
    session.commands.send(command).map_err(|_| anyhow!("mpv session has ended"))
  }

  fn end_session(&mut self) {
    if let Some(session) = self.session.take() {
      session.task.abort();
    }
    let _ = std::fs::remove_file(&self.socket_path);
  }
}

impl Drop for MpvSurface {
  fn drop(&mut self) {
    self.end_session();
  }
}

impl PlaybackSurface for MpvSurface {
  fn load(&mut self, id: &VideoId, volume: Volume) -> Result<()> {
    self.end_session();

    let socket = self.socket_path.to_str().context("Temp dir path is not valid UTF-8")?;
    let args = mpv_args(&self.options, socket, &id.watch_url(), volume);
    debug!(?args, "mpv: spawning");

    let child = Command::new("mpv")
      .args(&args)
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      // Nobody drains stderr; a full pipe would block mpv.
      .stderr(Stdio::null())
      .kill_on_drop(true)
      .spawn()
      .map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
          anyhow!("mpv not found. Install it with: brew install mpv (macOS) or apt install mpv (Linux)")
        } else {
          anyhow!(e).context("Failed to spawn mpv process")
        }
      })?;

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_session(child, self.socket_path.clone(), cmd_rx, evt_tx));
    self.session = Some(Session { commands: cmd_tx, events: evt_rx, task });
    info!(video_id = %id, "mpv: started");
    Ok(())
  }

  fn unload(&mut self) {
    self.end_session();
  }

  fn set_volume(&mut self, volume: Volume) -> Result<()> {
    self.send(json!({ "command": ["set_property", "volume", volume.get()] }))
  }

  fn play(&mut self) -> Result<()> {
    self.send(json!({ "command": ["set_property", "pause", false] }))
  }

  fn toggle_pause(&mut self) -> Result<()> {
    self.send(json!({ "command": ["cycle", "pause"] }))
  }

  fn poll_event(&mut self) -> Option<SurfaceEvent> {
    self.session.as_mut()?.events.try_recv().ok()
  }
}

/// Command line for one video.
pub fn mpv_args(options: &EmbedOptions, socket: &str, url: &str, volume: Volume) -> Vec<String> {
  let yes_no = |b: bool| if b { "yes" } else { "no" };
  let mut args = vec![
    "--no-terminal".to_string(),
    "--idle=no".to_string(),
    format!("--input-ipc-server={}", socket),
    format!("--volume={}", volume.get()),
    format!("--pause={}", yes_no(!options.autoplay)),
    format!("--osc={}", yes_no(options.controls)),
    format!("--input-default-bindings={}", yes_no(options.keyboard)),
  ];
  if options.audio_only {
    args.push("--no-video".to_string());
  }
  if let Some(format) = &options.format {
    args.push(format!("--ytdl-format={}", format));
  }
  args.push("--".to_string());
  args.push(url.to_string());
  args
}

/// Properties observed on every session, with their observer ids.
const OBSERVED: [(u64, &str); 3] = [(1, "pause"), (2, "paused-for-cache"), (3, "duration")];

/// Translate one line from mpv's IPC socket. Command replies and events we
/// don't care about map to `None`.
pub fn parse_event(line: &str) -> Option<SurfaceEvent> {
  let val: Value = serde_json::from_str(line).ok()?;
  match val.get("event")?.as_str()? {
    "start-file" => Some(SurfaceEvent::StateChange(PlaybackState::Unstarted)),
    "file-loaded" => Some(SurfaceEvent::Ready),
    "end-file" => match val.get("reason").and_then(Value::as_str) {
      Some("error") => {
        let reason = val.get("file_error").and_then(Value::as_str).unwrap_or("video unavailable");
        Some(SurfaceEvent::Error(reason.to_string()))
      }
      Some("eof") => Some(SurfaceEvent::StateChange(PlaybackState::Ended)),
      _ => None,
    },
    "property-change" => {
      let data = val.get("data")?;
      match val.get("name")?.as_str()? {
        "pause" => Some(SurfaceEvent::StateChange(if data.as_bool()? {
          PlaybackState::Paused
        } else {
          PlaybackState::Playing
        })),
        "paused-for-cache" if data.as_bool() == Some(true) => {
          Some(SurfaceEvent::StateChange(PlaybackState::Buffering))
        }
        // `file-loaded` fires once and is lost if it beats our connect; a known
        // duration means the same thing and is replayed on observe.
        "duration" if data.is_number() => Some(SurfaceEvent::Ready),
        _ => None,
      }
    }
    _ => None,
  }
}

async fn write_command(writer: &mut OwnedWriteHalf, command: &Value) -> Result<()> {
  let mut line = serde_json::to_vec(command)?;
  line.push(b'\n');
  writer.write_all(&line).await.context("Failed to write to mpv IPC socket")
}

/// Wait for mpv to open its IPC socket, bailing out if mpv dies first.
async fn connect(socket: &Path, child: &mut TokioChild) -> Result<UnixStream, String> {
  let attempts = constants().ipc_connect_attempts;
  let delay = Duration::from_millis(constants().ipc_connect_delay_ms);
  for attempt in 0..attempts {
    tokio::time::sleep(delay).await;
    if let Ok(Some(status)) = child.try_wait() {
      return Err(format!("mpv exited before the video loaded ({})", status));
    }
    match UnixStream::connect(socket).await {
      Ok(stream) => return Ok(stream),
      Err(e) => debug!(attempt, err = %e, "mpv: IPC connect failed, retrying"),
    }
  }
  Err("mpv did not open its control socket".to_string())
}

async fn run_session(
  mut child: TokioChild,
  socket: PathBuf,
  mut commands: mpsc::UnboundedReceiver<Value>,
  events: mpsc::UnboundedSender<SurfaceEvent>,
) {
  let stream = match connect(&socket, &mut child).await {
    Ok(stream) => stream,
    Err(reason) => {
      warn!(reason = %reason, "mpv: session failed to start");
      let _ = events.send(SurfaceEvent::Error(reason));
      return;
    }
  };
  let (read, mut write) = stream.into_split();
  let mut lines = TokioBufReader::new(read).lines();

  for (id, name) in OBSERVED {
    if let Err(e) = write_command(&mut write, &json!({ "command": ["observe_property", id, name] })).await {
      warn!(err = %e, property = name, "mpv: failed to observe property");
    }
  }

  loop {
    tokio::select! {
      cmd = commands.recv() => match cmd {
        Some(cmd) => {
          if let Err(e) = write_command(&mut write, &cmd).await {
            warn!(err = %e, "mpv: command not delivered");
          }
        }
        None => break,
      },
      line = lines.next_line() => match line {
        Ok(Some(line)) => {
          if let Some(event) = parse_event(&line)
            && events.send(event).is_err()
          {
            break;
          }
        }
        // Socket closed: mpv is exiting. Report a failed exit as an error.
        Ok(None) | Err(_) => {
          match child.wait().await {
            Ok(status) if !status.success() => {
              let _ = events.send(SurfaceEvent::Error(format!("mpv exited with {}", status)));
            }
            Ok(_) => {}
            Err(e) => warn!(err = %e, "mpv: failed to reap process"),
          }
          break;
        }
      },
    }
  }
  debug!("mpv: session ended");
}
