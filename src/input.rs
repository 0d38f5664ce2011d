use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppMode};
use crate::player::PlaybackSurface;
use crate::youtube::SearchService;

// --- Event Handling ---

pub fn handle_key_event<S: SearchService, P: PlaybackSurface>(app: &mut App<S, P>, key: KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) {
    match key.code {
      KeyCode::Char('c') => {
        app.should_quit = true;
        return;
      }
      KeyCode::Char('t') => {
        app.next_theme();
        return;
      }
      KeyCode::Char('o') => {
        app.open_external();
        return;
      }
      _ => {}
    }
  }

  match app.mode {
    AppMode::Input => handle_input_key(app, key),
    AppMode::Results => handle_results_key(app, key),
  }
}

fn handle_input_key<S: SearchService, P: PlaybackSurface>(app: &mut App<S, P>, key: KeyEvent) {
  app.controller.dismiss_error();
  let bar = &mut app.search_bar;
  match key.code {
    KeyCode::Enter => app.trigger_search(),
    KeyCode::Char(c) => bar.insert(c),
    KeyCode::Backspace => bar.backspace(),
    KeyCode::Delete => bar.delete(),
    KeyCode::Left => bar.left(),
    KeyCode::Right => bar.right(),
    KeyCode::Home => bar.home(),
    KeyCode::End => bar.end(),
    KeyCode::Esc => {
      if !bar.is_empty() {
        bar.clear();
      } else if !app.controller.results().is_empty() {
        app.mode = AppMode::Results;
      } else {
        app.should_quit = true;
      }
    }
    KeyCode::Down | KeyCode::Tab => {
      if !app.controller.results().is_empty() {
        app.mode = AppMode::Results;
      }
    }
    _ => {}
  }
}

fn handle_results_key<S: SearchService, P: PlaybackSurface>(app: &mut App<S, P>, key: KeyEvent) {
  match key.code {
    KeyCode::Enter => app.select_highlighted(),
    KeyCode::Char(' ') => app.toggle_pause(),
    KeyCode::Down | KeyCode::Char('j') => app.move_highlight(true),
    KeyCode::Up | KeyCode::Char('k') => app.move_highlight(false),
    KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_volume(1),
    KeyCode::Left | KeyCode::Char('-') => app.adjust_volume(-1),
    KeyCode::Char('[') => app.navigate_back(),
    KeyCode::Char(']') => app.navigate_forward(),
    KeyCode::Char('/') | KeyCode::Tab => app.mode = AppMode::Input,
    KeyCode::Esc => {
      if app.controller.error().is_some() {
        app.controller.dismiss_error();
      } else {
        app.mode = AppMode::Input;
      }
    }
    _ => {}
  }
}
