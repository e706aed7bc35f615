//! Single-line prompt/edit widget with its own horizontal scroll.
//!
//! The command line lives on the bottom screen row:
//! `[prompt][edit area]`. Hint mode types text into it programmatically
//! via [`CommandLineView::type_text`]; the user edits with the usual
//! cursor keys. No tabs here: TAB is completion, handled above.

use crate::writer::Writer;
use cm_config::{ProgramDefaults, RESET};

#[derive(Debug, Default)]
pub struct CommandLineView {
    row: usize,
    width: usize,
    prompt: String,
    text: String,
    /// Char index into `text`.
    cursor: usize,
    first_visible: usize,
}

impl CommandLineView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, row: usize, width: usize) {
        self.row = row;
        self.width = width;
        self.reframe();
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        self.prompt = prompt.to_string();
        self.reframe();
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.char_count();
        self.reframe();
    }

    /// Type text at the cursor, as if the user had entered it.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert_char(ch);
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.first_visible = 0;
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_of(&self, idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    pub fn insert_char(&mut self, ch: char) {
        let b = self.byte_of(self.cursor);
        self.text.insert(b, ch);
        self.cursor += 1;
        self.reframe();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let b = self.byte_of(self.cursor - 1);
        self.text.remove(b);
        self.cursor -= 1;
        self.reframe();
    }

    pub fn cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.reframe();
        }
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
            self.reframe();
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
        self.reframe();
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.char_count();
        self.reframe();
    }

    fn edit_width(&self) -> usize {
        self.width.saturating_sub(self.prompt.chars().count()).max(1)
    }

    /// Scroll the edit window so the cursor is visible.
    fn reframe(&mut self) {
        let avail = self.edit_width();
        if self.cursor < self.first_visible {
            self.first_visible = self.cursor;
        } else if self.cursor >= self.first_visible + avail {
            self.first_visible = self.cursor + 1 - avail;
        }
    }

    fn visible_slice(&self) -> String {
        let avail = self.edit_width();
        self.text
            .chars()
            .skip(self.first_visible)
            .take(avail)
            .collect()
    }

    /// Repaint the command row.
    pub fn update_screen(&self, out: &mut Writer) {
        out.move_to(0, self.row as u16);
        out.print(self.prompt.clone());
        out.print(self.visible_slice());
        out.clear_to_eol();
    }

    /// Show a diagnostic message on the command row (message area).
    /// The stored prompt/text are untouched; the next update repaints
    /// them.
    pub fn show_message(&self, message: &str, defaults: &ProgramDefaults, out: &mut Writer) {
        out.move_to(0, self.row as u16);
        if defaults.command_line_message_text.is_empty() {
            out.print(message.to_string());
        } else {
            out.print(format!(
                "{}{message}{RESET}",
                defaults.command_line_message_text
            ));
        }
        out.clear_to_eol();
    }

    pub fn place_cursor(&self, out: &mut Writer) {
        let col = self.prompt.chars().count() + (self.cursor - self.first_visible);
        out.move_to(col as u16, self.row as u16);
    }
}
