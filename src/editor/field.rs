use ropey::Rope;
use unicode_width::UnicodeWidthChar;

/// Whether a field accepts line breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    SingleLine,
    MultiLine,
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// One editable form field backed by a rope.
///
/// The cursor is a char index into the rope, so multi-byte text never splits
/// a character.
#[derive(Debug, Clone)]
pub struct TextField {
    rope: Rope,
    cursor: usize,
    /// Remembered display column for vertical movement.
    col_memory: usize,
    kind: FieldKind,
}

impl TextField {
    pub fn single_line(text: &str) -> Self {
        Self::with_kind(FieldKind::SingleLine, text)
    }

    pub fn multi_line(text: &str) -> Self {
        Self::with_kind(FieldKind::MultiLine, text)
    }

    fn with_kind(kind: FieldKind, text: &str) -> Self {
        let text = match kind {
            FieldKind::SingleLine => flatten(text),
            FieldKind::MultiLine => text.replace("\r\n", "\n"),
        };
        let rope = Rope::from_str(&text);
        let cursor = rope.len_chars();
        let mut field = Self {
            rope,
            cursor,
            col_memory: 0,
            kind,
        };
        field.remember_col();
        field
    }

    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Cursor position as a char index.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the whole content and put the cursor at the end.
    pub fn set(&mut self, text: &str) {
        *self = Self::with_kind(self.kind, text);
    }

    pub fn clear(&mut self) {
        self.set("");
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' || ch == '\r' {
            self.newline();
            return;
        }
        self.rope.insert_char(self.cursor, ch);
        self.cursor += 1;
        self.remember_col();
    }

    /// Insert pasted text. Single-line fields turn line breaks into spaces.
    pub fn insert_str(&mut self, text: &str) {
        let text = match self.kind {
            FieldKind::SingleLine => flatten(text),
            FieldKind::MultiLine => text.replace("\r\n", "\n"),
        };
        if text.is_empty() {
            return;
        }
        self.rope.insert(self.cursor, &text);
        self.cursor += text.chars().count();
        self.remember_col();
    }

    /// Break the line at the cursor. Ignored by single-line fields.
    pub fn newline(&mut self) {
        if self.kind == FieldKind::SingleLine {
            return;
        }
        self.rope.insert_char(self.cursor, '\n');
        self.cursor += 1;
        self.remember_col();
    }

    /// Returns `true` if a character was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.rope.remove(self.cursor - 1..self.cursor);
        self.cursor -= 1;
        self.remember_col();
        true
    }

    /// Returns `true` if a character was deleted.
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.rope.len_chars() {
            return false;
        }
        self.rope.remove(self.cursor..=self.cursor);
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                self.remember_col();
            }
            Direction::Right => {
                self.cursor = (self.cursor + 1).min(self.rope.len_chars());
                self.remember_col();
            }
            Direction::Up => {
                let line = self.rope.char_to_line(self.cursor);
                if line > 0 {
                    self.cursor = self.char_at_col(line - 1, self.col_memory);
                }
            }
            Direction::Down => {
                let line = self.rope.char_to_line(self.cursor);
                if line + 1 < self.rope.len_lines() {
                    self.cursor = self.char_at_col(line + 1, self.col_memory);
                }
            }
        }
    }

    pub fn home(&mut self) {
        let line = self.rope.char_to_line(self.cursor);
        self.cursor = self.rope.line_to_char(line);
        self.remember_col();
    }

    pub fn end(&mut self) {
        let line = self.rope.char_to_line(self.cursor);
        self.cursor = self.rope.line_to_char(line) + self.line_len_chars(line);
        self.remember_col();
    }

    /// Lines of the field without their terminators. Always at least one.
    pub fn lines(&self) -> Vec<String> {
        self.rope
            .lines()
            .map(|line| line.to_string().trim_end_matches(['\n', '\r']).to_string())
            .collect()
    }

    /// Cursor as `(line, display column)` for terminal placement.
    pub fn display_cursor(&self) -> (usize, usize) {
        let line = self.rope.char_to_line(self.cursor);
        let start = self.rope.line_to_char(line);
        let col = self
            .rope
            .slice(start..self.cursor)
            .chars()
            .map(|ch| ch.width().unwrap_or(0))
            .sum();
        (line, col)
    }

    fn remember_col(&mut self) {
        self.col_memory = self.display_cursor().1;
    }

    fn line_len_chars(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        while len > 0 && matches!(slice.char(len - 1), '\n' | '\r') {
            len -= 1;
        }
        len
    }

    /// Char index on `line` closest to display column `col`.
    fn char_at_col(&self, line: usize, col: usize) -> usize {
        let start = self.rope.line_to_char(line);
        let mut width = 0;
        let mut offset = 0;
        for ch in self.rope.line(line).chars().take(self.line_len_chars(line)) {
            let w = ch.width().unwrap_or(0);
            if width + w > col {
                break;
            }
            width += w;
            offset += 1;
        }
        start + offset
    }
}

impl Default for TextField {
    fn default() -> Self {
        Self::single_line("")
    }
}

impl PartialEq for TextField {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.rope == other.rope
    }
}

impl Eq for TextField {}

fn flatten(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
