use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Gauge, List, ListItem, Padding, Paragraph},
};

use crate::app::{App, AppMode};
use crate::player::{PlaybackState, PlaybackSurface, PlayerStatus};
use crate::theme::Theme;
use crate::youtube::SearchService;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn rounded_block(theme: &Theme) -> Block<'static> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border))
}

// --- UI Rendering ---

pub fn ui<S: SearchService, P: PlaybackSurface>(frame: &mut Frame, app: &mut App<S, P>) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let player_h = if app.player.is_active() { 7 } else { 0 };
  let [header_area, player_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(player_h),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  if app.player.is_active() {
    render_player(frame, app, player_area);
  }
  render_main(frame, app, main_area);
  render_status(frame, app, status_area);
  render_input(frame, app, input_area);
  render_footer(frame, app, footer_area);
}

fn render_header<S: SearchService, P: PlaybackSurface>(frame: &mut Frame, app: &App<S, P>, area: Rect) {
  let theme = app.theme();
  let location = app.controller.location();
  let nav = format!(
    "{}{}",
    if location.can_go_back() { "‹" } else { " " },
    if location.can_go_forward() { "›" } else { " " }
  );
  let left = Line::from(vec![
    Span::styled(" ▶ elsound ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled(format!("{} ", nav), Style::default().fg(theme.muted)),
    Span::styled(location.query(), Style::default().fg(theme.fg)),
  ]);
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_player<S: SearchService, P: PlaybackSurface>(frame: &mut Frame, app: &App<S, P>, area: Rect) {
  let theme = app.theme();
  let Some(id) = app.player.active() else { return };

  let state = match app.player.status() {
    PlayerStatus::Idle => "Idle",
    PlayerStatus::Loading => "Loading…",
    PlayerStatus::Ready => app.player.playback().map_or("Ready", |p| p.label()),
    PlayerStatus::Error(_) => "Unavailable",
  };
  let block = rounded_block(theme)
    .title(Line::from(vec![
      Span::styled(" Now Playing ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
      Span::styled(format!("[{}] ", state.to_lowercase()), Style::default().fg(theme.muted)),
    ]))
    .padding(Padding::horizontal(1));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let [title_area, channel_area, volume_area, note_area, _] = Layout::vertical([Constraint::Length(1); 5]).areas(inner);
  let inner_w = inner.width as usize;

  // The active video may have come from a link rather than the current results.
  let summary = app.controller.results().iter().find(|r| &r.id == id);
  let title = summary.map_or_else(|| id.to_string(), |s| s.title.clone());
  frame.render_widget(
    Paragraph::new(truncate_str(&title, inner_w)).style(Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
    title_area,
  );
  if let Some(s) = summary {
    frame.render_widget(
      Paragraph::new(truncate_str(&s.channel_name, inner_w)).style(Style::default().fg(theme.muted)),
      channel_area,
    );
  }

  let volume = app.controller.volume();
  let [icon_area, gauge_area] = Layout::horizontal([Constraint::Length(3), Constraint::Max(40)]).areas(volume_area);
  frame.render_widget(Span::raw(volume.icon()), icon_area);
  frame.render_widget(
    Gauge::default()
      .ratio(volume.get() as f64 / 100.0)
      .label(volume.to_string())
      .use_unicode(true)
      .gauge_style(Style::default().fg(theme.accent).bg(theme.stripe_bg)),
    gauge_area,
  );

  if let PlayerStatus::Error(e) = app.player.status() {
    let note = Line::from(vec![
      Span::styled(truncate_str(&format!("⚠ {} ", e.reason), inner_w / 2), Style::default().fg(theme.error)),
      Span::styled(" ^o ", Style::default().fg(theme.key_fg).bg(theme.key_bg)),
      Span::styled(" Watch on YouTube", Style::default().fg(theme.accent)),
    ]);
    frame.render_widget(note, note_area);
  }
}

fn render_main<S: SearchService, P: PlaybackSurface>(frame: &mut Frame, app: &mut App<S, P>, area: Rect) {
  if app.controller.is_loading() {
    render_message(frame, app.theme(), area, "Searching…");
  } else if !app.controller.results().is_empty() {
    render_results(frame, app, area);
  } else if let Some(query) = app.controller.last_query() {
    let msg = format!("No results for '{}'.", query);
    render_message(frame, app.theme(), area, &msg);
  } else {
    render_welcome(frame, app.theme(), area);
  }
}

fn render_message(frame: &mut Frame, theme: &Theme, area: Rect, msg: &str) {
  let text = vec![Line::from(""), Line::from(Span::styled(msg.to_string(), Style::default().fg(theme.muted)))];
  frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(rounded_block(theme)), area);
}

fn render_welcome(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("▶  Welcome to elsound", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Search YouTube for music. Play it with volume control.", Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled("Type a query below and press Enter.", Style::default().fg(theme.muted))),
  ];
  frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(rounded_block(theme)), area);
}

fn render_results<S: SearchService, P: PlaybackSurface>(frame: &mut Frame, app: &mut App<S, P>, area: Rect) {
  let theme = app.theme();
  let playing = app.player.active();

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = app
    .controller
    .results()
    .iter()
    .enumerate()
    .map(|(i, entry)| {
      let bg = if i % 2 == 1 { theme.stripe_bg } else { theme.bg };
      let marker = if playing == Some(&entry.id) { "♪ " } else { "" };

      let right_w = entry.channel_name.chars().count();
      let title_max = inner_w.saturating_sub(right_w + 2 + marker.chars().count());
      let title = truncate_str(&entry.title, title_max);
      let gap = inner_w.saturating_sub(marker.chars().count() + title.chars().count() + right_w);

      let line = Line::from(vec![
        Span::styled(marker, Style::default().fg(theme.accent)),
        Span::styled(title, Style::default().fg(theme.fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(entry.channel_name.clone(), Style::default().fg(theme.muted)),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  let border_color = if app.mode == AppMode::Results { theme.accent } else { theme.border };
  let list = List::new(items)
    .block(
      rounded_block(theme)
        .title(" Results ")
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_style(Style::default().fg(border_color)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_status<S: SearchService, P: PlaybackSurface>(frame: &mut Frame, app: &App<S, P>, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(err) = app.controller.error() {
    (format!(" ⚠  {}", err.message), Style::default().fg(theme.error))
  } else if app.controller.is_loading() {
    let query = app.controller.last_query().unwrap_or_default();
    (format!(" ⏳ Searching '{}'…", query), Style::default().fg(theme.status))
  } else if let Some(state) = app.player.playback().filter(|_| app.player.status() == &PlayerStatus::Ready) {
    (format!(" ♪ {}", state.label()), Style::default().fg(theme.status))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input<S: SearchService, P: PlaybackSurface>(frame: &mut Frame, app: &mut App<S, P>, area: Rect) {
  let theme = app.theme();
  let border_color = if app.mode == AppMode::Input { theme.accent } else { theme.border };
  let input_block = rounded_block(theme)
    .title(" Search music ")
    .title_style(Style::default().fg(border_color))
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let bar = &mut app.search_bar;
  // Keep at least one column so the scroll window never collapses.
  let inner_w = (area.width.saturating_sub(4) as usize).max(1);
  let cursor_col = display_width(&bar.input, bar.cursor);

  if cursor_col < bar.scroll {
    bar.scroll = cursor_col;
  } else if cursor_col >= bar.scroll + inner_w {
    bar.scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let scroll = bar.scroll;
  let visible: String = bar
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= scroll)
    .take_while(|(start, _, _)| *start < scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  if app.mode == AppMode::Input && area.width >= 4 {
    let cursor_x = area.x + 2 + cursor_col.saturating_sub(scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_footer<S: SearchService, P: PlaybackSurface>(frame: &mut Frame, app: &App<S, P>, area: Rect) {
  let theme = app.theme();
  let has_results = !app.controller.results().is_empty();
  let is_active = app.player.is_active();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Input => {
      let mut k = vec![("Enter", "Search"), ("^t", "Theme")];
      if is_active {
        k.push(("^o", "YouTube"));
      }
      if has_results {
        k.push(("↓", "Results"));
      } else {
        k.push(("Esc", "Quit"));
      }
      k
    }
    AppMode::Results => {
      let mut k = vec![("Enter", "Play"), ("j/k", "Navigate"), ("←/→", "Volume")];
      if app.player.status() == &PlayerStatus::Ready {
        let paused = app.player.playback() == Some(PlaybackState::Paused);
        k.push(("Space", if paused { "Resume" } else { "Pause" }));
      }
      k.push(("[/]", "History"));
      if is_active {
        k.push(("^o", "YouTube"));
      }
      k.push(("Esc", "Search"));
      k
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use ratatui::{Terminal, backend::TestBackend};

  use super::*;
  use crate::controller::AppController;
  use crate::error::SearchError;
  use crate::location::Location;
  use crate::model::{ResultSet, Volume};
  use crate::player::SurfaceEvent;
  use crate::player::fake::FakeSurface;

  struct NoSearch;

  impl SearchService for NoSearch {
    async fn search(&self, _query: &str) -> Result<ResultSet, SearchError> {
      Ok(Vec::new())
    }
  }

  fn app(link: Option<&str>) -> App<NoSearch, FakeSurface> {
    let controller = AppController::new(Location::from_link(link), Volume::MAX, Duration::from_secs(6));
    App::new(NoSearch, FakeSurface::default(), true, controller, 0)
  }

  fn draw(app: &mut App<NoSearch, FakeSurface>, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| ui(frame, app)).unwrap();
    terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
  }

  #[test]
  fn renders_in_a_tiny_terminal() {
    let mut app = app(None);
    draw(&mut app, 3, 20);
    "lofi".chars().for_each(|c| app.search_bar.insert(c));
    draw(&mut app, 3, 20);
  }

  #[test]
  fn footer_offers_resume_while_paused() {
    let mut app = app(Some("?v=abc"));
    app.mode = AppMode::Results;
    app.player.surface_mut().events.push_back(SurfaceEvent::Ready);
    app.player.pump();
    assert!(draw(&mut app, 120, 30).contains("Pause"));

    app.player.surface_mut().events.push_back(SurfaceEvent::StateChange(PlaybackState::Paused));
    app.player.pump();
    let screen = draw(&mut app, 120, 30);
    assert!(screen.contains("Resume"));
    assert!(!screen.contains(" Pause "));
  }

  #[test]
  fn truncate_keeps_short_strings() {
    assert_eq!(truncate_str("abc", 5), "abc");
    assert_eq!(truncate_str("abcdef", 4), "abc…");
  }

  #[test]
  fn display_width_counts_wide_chars() {
    assert_eq!(display_width("ab", 2), 2);
    assert_eq!(display_width("日本", 2), 4);
    assert_eq!(display_width("日本", 1), 2);
  }
}
