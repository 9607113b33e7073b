//! Text editor for form fields and parameter JSON
//!
//! Every editable text in the console (workflow name, base URL, parameter
//! JSON, ...) is a [`TextEditor`]. Key handling lives in `ui::events`, which
//! turns key presses into [`TextEdit`] operations; the editor itself has no
//! terminal dependency.

use serde_json::Value;

/// A single editing operation
#[derive(Debug, Clone, PartialEq)]
pub enum TextEdit {
    Insert(char),
    /// Pasted text; smart quotes are normalized
    Paste(String),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Clear,
}

#[derive(Debug, Clone, Default)]
pub struct TextEditor {
    /// The content being edited
    content: String,

    /// Cursor position (byte offset in content)
    cursor: usize,

    /// Whether the content has been modified since creation
    dirty: bool,

    /// Accept newlines (description, parameters, headers)
    multiline: bool,
}

impl TextEditor {
    /// Create an editor with initial content, cursor at the end
    pub fn with_content(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            cursor: content.len(),
            content,
            dirty: false,
            multiline: false,
        }
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.dirty = true;
    }

    /// Apply one edit; returns true if content or cursor changed
    pub fn apply(&mut self, edit: TextEdit) -> bool {
        match edit {
            TextEdit::Insert(c) => {
                self.insert_char(c);
                true
            }
            TextEdit::Paste(s) => {
                let s = if self.multiline {
                    s
                } else {
                    s.replace(['\r', '\n'], "")
                };
                self.insert_str_normalized(&s);
                true
            }
            TextEdit::Newline => {
                if self.multiline {
                    self.insert_char('\n');
                }
                self.multiline
            }
            TextEdit::Backspace => self.delete_char_before_cursor(),
            TextEdit::Delete => self.delete_char_after_cursor(),
            TextEdit::Left => self.move_cursor_left(),
            TextEdit::Right => self.move_cursor_right(),
            TextEdit::Home => {
                self.cursor = 0;
                true
            }
            TextEdit::End => {
                self.cursor = self.content.len();
                true
            }
            TextEdit::Clear => {
                self.clear();
                true
            }
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.clamp_cursor_to_boundary(self.cursor);
        self.content.insert(cursor, c);
        self.cursor = cursor + c.len_utf8();
        self.dirty = true;
    }

    /// Insert text, converting curly quotes to straight quotes so pasted
    /// JSON stays parseable
    pub fn insert_str_normalized(&mut self, s: &str) {
        let normalized = s
            .replace(['\u{201C}', '\u{201D}'], "\"")
            .replace(['\u{2018}', '\u{2019}'], "'");

        let cursor = self.clamp_cursor_to_boundary(self.cursor);
        self.content.insert_str(cursor, &normalized);
        self.cursor = cursor + normalized.len();
        self.dirty = true;
    }

    fn delete_char_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }

        let cursor = self.prev_boundary(self.cursor);
        self.content.remove(cursor);
        self.cursor = cursor;
        self.dirty = true;
        true
    }

    fn delete_char_after_cursor(&mut self) -> bool {
        if self.cursor >= self.content.len() {
            return false;
        }

        let cursor = self.clamp_cursor_to_boundary(self.cursor);
        self.content.remove(cursor);
        self.dirty = true;
        true
    }

    fn move_cursor_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor = self.prev_boundary(self.cursor);
        true
    }

    fn move_cursor_right(&mut self) -> bool {
        if self.cursor >= self.content.len() {
            return false;
        }

        let mut next = self.cursor + 1;
        while next < self.content.len() && !self.content.is_char_boundary(next) {
            next += 1;
        }
        self.cursor = next.min(self.content.len());
        true
    }

    /// Pretty-print the content as JSON; content is left untouched on error
    pub fn format_json(&mut self) -> Result<(), String> {
        let json = self.parse_json()?;
        self.content = serde_json::to_string_pretty(&json).unwrap_or_else(|_| self.content.clone());
        self.cursor = self.content.len();
        self.dirty = true;
        Ok(())
    }

    /// Parse the content as any JSON value
    pub fn parse_json(&self) -> Result<Value, String> {
        serde_json::from_str::<Value>(&self.content).map_err(|e| format!("Invalid JSON format: {e}"))
    }

    /// Content with every character replaced by `•`, for secrets
    pub fn masked(&self) -> String {
        "•".repeat(self.content.chars().count())
    }

    /// Content split at the cursor, for drawing a cursor marker
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.content.split_at(self.clamp_cursor_to_boundary(self.cursor()))
    }

    fn prev_boundary(&self, from: usize) -> usize {
        let mut pos = from.min(self.content.len()).saturating_sub(1);
        while pos > 0 && !self.content.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    fn clamp_cursor_to_boundary(&self, cursor: usize) -> usize {
        let mut pos = cursor.min(self.content.len());
        while pos > 0 && !self.content.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }
}
