/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Free-text query being typed. Knows nothing about searching; `submit`
/// only hands back the trimmed text when there is something to search for.
#[derive(Debug, Default)]
pub struct SearchBar {
  pub input: String,
  /// Cursor position as a char index.
  pub cursor: usize,
  /// Horizontal scroll offset in display columns.
  pub scroll: usize,
}

impl SearchBar {
  pub fn insert(&mut self, c: char) {
    let byte_idx = char_to_byte_index(&self.input, self.cursor);
    self.input.insert(byte_idx, c);
    self.cursor += 1;
  }

  pub fn backspace(&mut self) {
    if self.cursor > 0 {
      self.cursor -= 1;
      let byte_idx = char_to_byte_index(&self.input, self.cursor);
      self.input.remove(byte_idx);
    }
  }

  pub fn delete(&mut self) {
    if self.cursor < self.len() {
      let byte_idx = char_to_byte_index(&self.input, self.cursor);
      self.input.remove(byte_idx);
    }
  }

  pub fn left(&mut self) {
    self.cursor = self.cursor.saturating_sub(1);
  }

  pub fn right(&mut self) {
    if self.cursor < self.len() {
      self.cursor += 1;
    }
  }

  pub fn home(&mut self) {
    self.cursor = 0;
  }

  pub fn end(&mut self) {
    self.cursor = self.len();
  }

  pub fn clear(&mut self) {
    self.input.clear();
    self.cursor = 0;
    self.scroll = 0;
  }

  pub fn is_empty(&self) -> bool {
    self.input.is_empty()
  }

  fn len(&self) -> usize {
    self.input.chars().count()
  }

  /// The trimmed query, or `None` for blank input.
  pub fn submit(&self) -> Option<String> {
    let query = self.input.trim();
    (!query.is_empty()).then(|| query.to_string())
  }
}
