use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

/// Built-in themes. The first one is the default.
pub static THEMES: [Theme; 3] = [
  Theme {
    name: "Dark",
    bg: Color::Rgb(18, 18, 18),
    fg: Color::Rgb(230, 230, 230),
    accent: Color::Rgb(144, 202, 249),
    muted: Color::Rgb(130, 130, 130),
    border: Color::Rgb(60, 60, 60),
    highlight_fg: Color::Rgb(18, 18, 18),
    highlight_bg: Color::Rgb(144, 202, 249),
    stripe_bg: Color::Rgb(30, 30, 30),
    status: Color::Rgb(255, 213, 79),
    error: Color::Rgb(239, 83, 80),
    key_fg: Color::Rgb(18, 18, 18),
    key_bg: Color::Rgb(130, 130, 130),
  },
  Theme {
    name: "Light",
    bg: Color::Rgb(245, 245, 245),
    fg: Color::Rgb(33, 33, 33),
    accent: Color::Rgb(25, 118, 210),
    muted: Color::Rgb(117, 117, 117),
    border: Color::Rgb(200, 200, 200),
    highlight_fg: Color::Rgb(255, 255, 255),
    highlight_bg: Color::Rgb(25, 118, 210),
    stripe_bg: Color::Rgb(255, 255, 255),
    status: Color::Rgb(230, 81, 0),
    error: Color::Rgb(198, 40, 40),
    key_fg: Color::Rgb(255, 255, 255),
    key_bg: Color::Rgb(117, 117, 117),
  },
  Theme {
    name: "Terminal",
    bg: Color::Reset,
    fg: Color::Reset,
    accent: Color::Cyan,
    muted: Color::DarkGray,
    border: Color::DarkGray,
    highlight_fg: Color::Black,
    highlight_bg: Color::Cyan,
    stripe_bg: Color::Reset,
    status: Color::Yellow,
    error: Color::Red,
    key_fg: Color::Black,
    key_bg: Color::Gray,
  },
];

/// Index of the theme called `name` (case-insensitive), falling back to the default.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(n))).unwrap_or(0)
}
