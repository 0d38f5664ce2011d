mod app;
mod config;
mod constants;
mod controller;
mod error;
mod input;
mod location;
mod logging;
mod model;
mod mpv;
mod player;
mod search_bar;
mod theme;
mod ui;
mod youtube;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use tracing::{info, warn};

use app::App;
use config::Config;
use controller::AppController;
use location::Location;
use mpv::MpvSurface;
use youtube::YouTubeSearch;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Video to open at startup: `?v=<id>`, a youtube.com watch URL or a youtu.be link
  link: Option<String>,

  /// Config file (default: <config dir>/elsound/config.toml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Print shell completions and exit
  #[arg(long, value_name = "SHELL")]
  completions: Option<Shell>,
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    clap_complete::generate(shell, &mut Args::command(), env!("CARGO_PKG_NAME"), &mut std::io::stdout());
    return Ok(());
  }

  let _log_guard = logging::init_logging()?;
  let config = Config::load(args.config.as_deref())?;
  let search = YouTubeSearch::new(config.api_key()?.to_string(), config.request_timeout())?;

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, args, config, search).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args, config: Config, search: YouTubeSearch) -> Result<()> {
  let location = Location::from_link(args.link.as_deref());
  if let Some(link) = &args.link
    && location.current().is_none()
  {
    warn!(link = %link, "startup link carries no video id");
  }
  let controller = AppController::new(location, config.initial_volume(), config.notification_timeout());
  let surface = MpvSurface::new(config.embed.clone());
  let theme_index = theme::theme_index(config.theme.as_deref());
  let mut app = App::new(search, surface, config.embed.autoplay, controller, theme_index);
  info!("ui started");

  loop {
    app.check_pending();

    terminal.draw(|frame| ui::ui(frame, &mut app)).context("Failed to draw frame")?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key);
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  app.shutdown();
  info!("ui stopped");
  Ok(())
}
