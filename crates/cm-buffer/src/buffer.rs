//! The edit buffer proper.

use crate::{EditHint, EditorError, Position, Result, list::BufferId};
use cm_text::TextLine;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Last search pattern and where it most recently matched.
#[derive(Debug, Clone, Default)]
pub struct FindState {
    pub pattern: String,
    pub last_match: Option<Position>,
}

/// One file-like text stream held in memory as ordered lines.
///
/// Files may be registered without being read (`loaded == false`); the
/// content is pulled in on first view via [`EditBuffer::ensure_loaded`].
#[derive(Debug, Clone)]
pub struct EditBuffer {
    pub(crate) id: BufferId,
    lines: Vec<TextLine>,
    pub cursor: Position,
    mark: Option<Position>,
    file_path: String,
    loaded: bool,
    touched: bool,
    find: FindState,
    tab_width: usize,
}

impl Default for EditBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl EditBuffer {
    /// A new buffer holds exactly one empty line.
    pub fn new() -> Self {
        Self {
            id: BufferId::default(),
            lines: vec![TextLine::new()],
            cursor: Position::origin(),
            mark: None,
            file_path: String::new(),
            loaded: true,
            touched: false,
            find: FindState::default(),
            tab_width: 4,
        }
    }

    pub fn from_text(text: &str) -> Self {
        let mut buf = Self::new();
        buf.set_text(text);
        buf.touched = false;
        buf
    }

    fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(TextLine::from_str).collect();
        if self.lines.is_empty() {
            self.lines.push(TextLine::new());
        }
        self.cursor = Position::origin();
        self.mark = None;
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn number_of_lines(&self) -> usize {
        self.lines.len()
    }

    /// The line at `row`. Out-of-range is a caller contract violation;
    /// callers check `number_of_lines()` first.
    pub fn line(&self, row: usize) -> &TextLine {
        &self.lines[row]
    }

    pub fn char_count(&self, row: usize) -> usize {
        self.lines[row].char_count()
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn set_file_path(&mut self, path: &str) {
        self.file_path = path.to_string();
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn mark(&self) -> Option<Position> {
        self.mark
    }

    pub fn find_state(&self) -> &FindState {
        &self.find
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Tab width is constrained to the supported stops {2, 4, 8}.
    pub fn set_tab_width(&mut self, width: usize) {
        self.tab_width = match width {
            2 | 4 | 8 => width,
            _ => 4,
        };
    }

    fn clamp_cursor(&mut self) {
        if self.cursor.row >= self.lines.len() {
            self.cursor.row = self.lines.len() - 1;
        }
        let max = self.char_count(self.cursor.row);
        if self.cursor.col > max {
            self.cursor.col = max;
        }
    }

    //---------------------------------------------------------------
    // Content mutation
    //---------------------------------------------------------------

    /// Insert one character at the cursor; the cursor advances past it.
    pub fn insert_char(&mut self, ch: char) -> EditHint {
        if ch == '\n' {
            return self.insert_newline();
        }
        let Position { row, col } = self.cursor;
        self.lines[row].insert_char(col, ch);
        self.cursor.col += 1;
        self.touched = true;
        EditHint::LinePastPoint { row, col }
    }

    /// Split the current line at the cursor. The cursor lands at the
    /// start of the new line.
    pub fn insert_newline(&mut self) -> EditHint {
        let Position { row, col } = self.cursor;
        let tail = self.lines[row].split_off(col);
        self.lines.insert(row + 1, tail);
        self.cursor = Position::new(row + 1, 0);
        self.touched = true;
        EditHint::ScreenPastPoint { row, col }
    }

    /// Insert a literal tab character; the view renders it expanded.
    pub fn insert_tab(&mut self) -> EditHint {
        let Position { row, col } = self.cursor;
        self.lines[row].insert_char(col, '\t');
        self.cursor.col += 1;
        self.touched = true;
        EditHint::LinePastPoint { row, col }
    }

    /// Delete the character left of the cursor, joining lines when the
    /// cursor sits at column 0. At the buffer start this is a silent
    /// no-op.
    pub fn backspace(&mut self) -> EditHint {
        let Position { row, col } = self.cursor;
        if col > 0 {
            self.lines[row].remove_char(col - 1);
            self.cursor.col -= 1;
            self.touched = true;
            EditHint::Line { row }
        } else if row > 0 {
            let removed = self.lines.remove(row);
            let join_col = self.char_count(row - 1);
            self.lines[row - 1].push_line(&removed);
            self.cursor = Position::new(row - 1, join_col);
            self.touched = true;
            EditHint::ScreenPastPoint {
                row: row - 1,
                col: join_col,
            }
        } else {
            EditHint::None
        }
    }

    /// Insert text at the cursor; it may span lines. The cursor lands
    /// just past the inserted text.
    pub fn insert_text(&mut self, text: &str) -> EditHint {
        if text.is_empty() {
            return EditHint::None;
        }
        let Position { row, col } = self.cursor;
        let mut segments = text.split('\n');
        let first = segments.next().unwrap_or("");
        let rest: Vec<&str> = segments.collect();

        self.lines[row].insert_str(col, first);
        if rest.is_empty() {
            self.cursor.col = col + first.chars().count();
        } else {
            let tail = self.lines[row].split_off(col + first.chars().count());
            let mut insert_at = row + 1;
            for segment in &rest[..rest.len() - 1] {
                self.lines.insert(insert_at, TextLine::from_str(segment));
                insert_at += 1;
            }
            let last = rest[rest.len() - 1];
            let mut last_line = TextLine::from_str(last);
            let end_col = last_line.char_count();
            last_line.push_line(&tail);
            self.lines.insert(insert_at, last_line);
            self.cursor = Position::new(insert_at, end_col);
        }
        self.touched = true;
        EditHint::ScreenPastPoint { row, col }
    }

    /// Paste is insert-text with the kill-buffer contract: the hint is
    /// always screen-scoped at the original row.
    pub fn paste(&mut self, text: &str) -> EditHint {
        self.insert_text(text)
    }

    //---------------------------------------------------------------
    // Cursor motion (never mutates content)
    //---------------------------------------------------------------

    /// Left one character; at column 0 retreats to the end of the
    /// previous line. Returns whether the cursor moved.
    pub fn cursor_left(&mut self) -> bool {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
            true
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.char_count(self.cursor.row);
            true
        } else {
            false
        }
    }

    /// Right one character; at end of line advances to (row + 1, 0).
    pub fn cursor_right(&mut self) -> bool {
        if self.cursor.col < self.char_count(self.cursor.row) {
            self.cursor.col += 1;
            true
        } else if self.cursor.row + 1 < self.lines.len() {
            self.cursor = Position::new(self.cursor.row + 1, 0);
            true
        } else {
            false
        }
    }

    pub fn cursor_up(&mut self) -> bool {
        if self.cursor.row == 0 {
            return false;
        }
        self.cursor.row -= 1;
        self.clamp_cursor();
        true
    }

    pub fn cursor_down(&mut self) -> bool {
        if self.cursor.row + 1 >= self.lines.len() {
            return false;
        }
        self.cursor.row += 1;
        self.clamp_cursor();
        true
    }

    /// Jump to the start of a line; the row clamps to the buffer.
    pub fn goto_line(&mut self, row: usize) {
        self.cursor.row = row.min(self.lines.len() - 1);
        self.cursor.col = 0;
    }

    /// Place the cursor at an arbitrary position, clipped to bounds.
    pub fn goto_position(&mut self, pos: Position) {
        self.cursor = pos;
        self.clamp_cursor();
    }

    pub fn goto_line_end(&mut self) {
        self.cursor.col = self.char_count(self.cursor.row);
    }

    pub fn goto_line_start(&mut self) {
        self.cursor.col = 0;
    }

    //---------------------------------------------------------------
    // Mark and cut
    //---------------------------------------------------------------

    pub fn set_mark(&mut self) {
        self.mark = Some(self.cursor);
    }

    pub fn clear_mark(&mut self) {
        self.mark = None;
    }

    /// Cut the region between mark and cursor (order-normalized) and
    /// clear the mark. With no mark set, or mark == cursor, the buffer
    /// is unchanged and the returned text is empty.
    pub fn cut_to_mark(&mut self) -> (String, EditHint) {
        let Some(mut mark) = self.mark.take() else {
            return (String::new(), EditHint::None);
        };
        // Edits since set_mark may have shrunk the buffer past the mark.
        mark.row = mark.row.min(self.lines.len() - 1);
        mark.col = mark.col.min(self.char_count(mark.row));
        if mark == self.cursor {
            return (String::new(), EditHint::None);
        }
        let (a, b) = if mark < self.cursor {
            (mark, self.cursor)
        } else {
            (self.cursor, mark)
        };
        let text = self.delete_between(a, b);
        self.cursor = a;
        self.touched = true;
        (text, EditHint::ScreenPastPoint { row: a.row, col: a.col })
    }

    /// Remove `[a, b)` from the buffer and return it, newlines included
    /// for every line boundary crossed. Positions must be in bounds and
    /// ordered (callers normalize).
    fn delete_between(&mut self, a: Position, b: Position) -> String {
        if a.row == b.row {
            return self.lines[a.row].remove_chars(a.col, b.col);
        }
        let a_row_len = self.char_count(a.row);
        let mut out = self.lines[a.row].remove_chars(a.col, a_row_len);
        out.push('\n');
        // Full lines between the endpoints.
        for line in self.lines.drain(a.row + 1..b.row) {
            out.push_str(line.as_str());
            out.push('\n');
        }
        // b.row has shifted up to a.row + 1.
        let tail_head = self.lines[a.row + 1].remove_chars(0, b.col);
        out.push_str(&tail_head);
        let tail = self.lines.remove(a.row + 1);
        self.lines[a.row].push_line(&tail);
        out
    }

    /// Emacs-style kill-line: cut from the cursor to the end of the
    /// line, or (when already at the end) remove the line break and
    /// return "\n".
    pub fn cut_to_end_of_line(&mut self) -> (String, EditHint) {
        let Position { row, col } = self.cursor;
        let len = self.char_count(row);
        if col < len {
            let text = self.lines[row].remove_chars(col, len);
            self.touched = true;
            (text, EditHint::LinePastPoint { row, col })
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_line(&next);
            self.touched = true;
            ("\n".to_string(), EditHint::ScreenPastPoint { row, col })
        } else {
            (String::new(), EditHint::None)
        }
    }

    //---------------------------------------------------------------
    // Find and replace
    //---------------------------------------------------------------

    fn find_from(&self, start: Position, pattern: &str) -> Option<Position> {
        if pattern.is_empty() {
            return None;
        }
        for row in start.row..self.lines.len() {
            let from = if row == start.row { start.col } else { 0 };
            let line = &self.lines[row];
            if from > line.char_count() {
                continue;
            }
            let hay = line.slice_chars(from, line.char_count());
            if let Some(byte) = hay.find(pattern) {
                let col = from + hay[..byte].chars().count();
                return Some(Position::new(row, col));
            }
        }
        None
    }

    /// Forward plain-substring search from the cursor (inclusive).
    /// On a match the cursor moves to the match start.
    pub fn find_string(&mut self, pattern: &str) -> bool {
        match self.find_from(self.cursor, pattern) {
            Some(pos) => {
                self.cursor = pos;
                self.find.pattern = pattern.to_string();
                self.find.last_match = Some(pos);
                true
            }
            None => false,
        }
    }

    /// Forward search starting one character past the cursor, so a
    /// repeated find does not re-match in place.
    pub fn find_again(&mut self, pattern: &str) -> bool {
        let mut start = self.cursor;
        if start.col < self.char_count(start.row) {
            start.col += 1;
        } else if start.row + 1 < self.lines.len() {
            start = Position::new(start.row + 1, 0);
        } else {
            return false;
        }
        match self.find_from(start, pattern) {
            Some(pos) => {
                self.cursor = pos;
                self.find.pattern = pattern.to_string();
                self.find.last_match = Some(pos);
                true
            }
            None => false,
        }
    }

    /// Do the characters at the cursor equal `pattern`? The two-step
    /// replace contract is built on this test.
    pub fn at_match(&self, pattern: &str) -> bool {
        if pattern.is_empty() {
            return false;
        }
        let Position { row, col } = self.cursor;
        let len = pattern.chars().count();
        col + len <= self.char_count(row) && self.lines[row].slice_chars(col, col + len) == pattern
    }

    /// Replace-at-cursor: when the characters at the cursor equal
    /// `find`, swap them for `replacement` and leave the cursor just
    /// past the insertion. Otherwise step forward like
    /// [`EditBuffer::find_again`]. Returns whether a replacement
    /// happened; the step-to-match / replace-or-advance loop above
    /// this call depends on exactly that split.
    pub fn replace_string(&mut self, find: &str, replacement: &str) -> bool {
        if self.at_match(find) {
            let Position { row, col } = self.cursor;
            let len = find.chars().count();
            self.lines[row].remove_chars(col, col + len);
            self.lines[row].insert_str(col, replacement);
            self.cursor.col = col + replacement.chars().count();
            self.touched = true;
            true
        } else {
            self.find_again(find);
            false
        }
    }

    /// Apply [`EditBuffer::replace_string`] until the pattern stops
    /// matching forward of the cursor. Returns the replacement count.
    pub fn replace_all(&mut self, find: &str, replacement: &str) -> usize {
        if find.is_empty() {
            return 0;
        }
        let mut count = 0usize;
        loop {
            if self.at_match(find) {
                self.replace_string(find, replacement);
                count += 1;
            } else if !self.find_again(find) {
                break;
            }
        }
        count
    }

    //---------------------------------------------------------------
    // Whole-buffer operations
    //---------------------------------------------------------------

    /// Lines joined with newlines; the reverse of `from_text`.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(line.as_str());
        }
        out
    }

    /// (line count, character count) where line breaks count as one
    /// character each.
    pub fn counts(&self) -> (usize, usize) {
        let chars: usize = self.lines.iter().map(|l| l.char_count()).sum();
        (self.lines.len(), chars + self.lines.len() - 1)
    }

    /// Convert leading spaces to tabs on every line. Returns how many
    /// lines changed.
    pub fn entab(&mut self) -> usize {
        let width = self.tab_width;
        let mut changed = 0;
        for l in self.lines.iter_mut() {
            if l.entab(width) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.touched = true;
        }
        self.clamp_cursor();
        changed
    }

    /// Convert tabs to spaces on every line. Returns how many lines
    /// changed.
    pub fn detab(&mut self) -> usize {
        let width = self.tab_width;
        let mut changed = 0;
        for l in self.lines.iter_mut() {
            if l.detab(width) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.touched = true;
        }
        self.clamp_cursor();
        changed
    }

    /// Strip trailing whitespace on every line. Returns how many lines
    /// changed.
    pub fn trim_trailing(&mut self) -> usize {
        let mut changed = 0;
        for l in self.lines.iter_mut() {
            if l.trim_trailing() {
                changed += 1;
            }
        }
        if changed > 0 {
            self.touched = true;
        }
        self.clamp_cursor();
        changed
    }

    //---------------------------------------------------------------
    // File I/O
    //---------------------------------------------------------------

    /// Associate the buffer with `path`. With `preload` the file is
    /// read immediately; otherwise reading is deferred until the
    /// buffer is first viewed.
    pub fn load_text(&mut self, path: &str, preload: bool) -> Result<()> {
        self.file_path = path.to_string();
        if preload {
            let content = fs::read_to_string(Path::new(path)).map_err(|source| EditorError::Io {
                path: path.to_string(),
                source,
            })?;
            self.set_text(&content);
            self.loaded = true;
            debug!(target: "buffer", path, lines = self.lines.len(), "loaded");
        } else {
            self.loaded = false;
        }
        self.touched = false;
        Ok(())
    }

    /// Read the backing file if loading was deferred. Missing backing
    /// file is an error; the buffer stays registered and empty.
    pub fn ensure_loaded(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        let path = self.file_path.clone();
        let content = fs::read_to_string(Path::new(&path)).map_err(|source| EditorError::Io {
            path: path.clone(),
            source,
        })?;
        self.set_text(&content);
        self.loaded = true;
        self.touched = false;
        debug!(target: "buffer", path, lines = self.lines.len(), "deferred load");
        Ok(())
    }

    /// Write lines joined with newlines to `path`; adopts the path and
    /// clears `touched` on success only.
    pub fn save_text(&mut self, path: &str) -> Result<()> {
        fs::write(Path::new(path), self.flatten()).map_err(|source| EditorError::Io {
            path: path.to_string(),
            source,
        })?;
        self.file_path = path.to_string();
        self.touched = false;
        debug!(target: "buffer", path, lines = self.lines.len(), "saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(buf: &mut EditBuffer, s: &str) {
        for ch in s.chars() {
            buf.insert_char(ch);
        }
    }

    #[test]
    fn new_buffer_has_one_empty_line() {
        let buf = EditBuffer::new();
        assert_eq!(buf.number_of_lines(), 1);
        assert_eq!(buf.char_count(0), 0);
        assert_eq!(buf.cursor, Position::origin());
        assert!(!buf.is_touched());
    }

    #[test]
    fn typing_with_newline_splits_lines() {
        // Type "abc\n def" into an empty buffer.
        let mut buf = EditBuffer::new();
        type_str(&mut buf, "abc\n def");
        assert_eq!(buf.number_of_lines(), 2);
        assert_eq!(buf.line(0).as_str(), "abc");
        assert_eq!(buf.line(1).as_str(), " def");
        assert_eq!(buf.cursor, Position::new(1, 4));
        assert!(buf.is_touched());
    }

    #[test]
    fn newline_at_line_end_creates_empty_line() {
        let mut buf = EditBuffer::from_text("hello");
        buf.goto_position(Position::new(0, 5));
        let hint = buf.insert_newline();
        assert_eq!(buf.line(0).as_str(), "hello");
        assert_eq!(buf.line(1).as_str(), "");
        assert_eq!(buf.cursor, Position::new(1, 0));
        assert_eq!(hint, EditHint::ScreenPastPoint { row: 0, col: 5 });
    }

    #[test]
    fn backspace_mid_line_reports_line_hint() {
        let mut buf = EditBuffer::from_text("abcdef");
        buf.goto_position(Position::new(0, 3));
        let hint = buf.backspace();
        assert_eq!(buf.line(0).as_str(), "abdef");
        assert_eq!(buf.cursor, Position::new(0, 2));
        assert_eq!(hint, EditHint::Line { row: 0 });
    }

    #[test]
    fn backspace_at_column_zero_joins_lines() {
        let mut buf = EditBuffer::from_text("ab\ncd");
        buf.goto_position(Position::new(1, 0));
        let hint = buf.backspace();
        assert_eq!(buf.number_of_lines(), 1);
        assert_eq!(buf.line(0).as_str(), "abcd");
        assert_eq!(buf.cursor, Position::new(0, 2));
        assert_eq!(hint, EditHint::ScreenPastPoint { row: 0, col: 2 });
    }

    #[test]
    fn backspace_at_origin_is_a_silent_noop() {
        let mut buf = EditBuffer::from_text("x");
        let hint = buf.backspace();
        assert_eq!(hint, EditHint::None);
        assert_eq!(buf.line(0).as_str(), "x");
        assert!(!buf.is_touched());
    }

    #[test]
    fn insert_char_and_tab_keep_line_count() {
        let mut buf = EditBuffer::from_text("ab\ncd");
        buf.insert_char('x');
        buf.insert_tab();
        assert_eq!(buf.number_of_lines(), 2);
    }

    #[test]
    fn motion_wraps_at_line_boundaries() {
        let mut buf = EditBuffer::from_text("ab\ncd");
        buf.goto_position(Position::new(0, 2));
        assert!(buf.cursor_right());
        assert_eq!(buf.cursor, Position::new(1, 0));
        assert!(buf.cursor_left());
        assert_eq!(buf.cursor, Position::new(0, 2));
    }

    #[test]
    fn vertical_motion_clamps_column() {
        let mut buf = EditBuffer::from_text("long line\nx");
        buf.goto_position(Position::new(0, 9));
        assert!(buf.cursor_down());
        assert_eq!(buf.cursor, Position::new(1, 1));
    }

    #[test]
    fn cut_to_mark_normalizes_order() {
        let mut buf = EditBuffer::from_text("one\ntwo\nthree");
        buf.goto_position(Position::new(2, 2));
        buf.set_mark();
        buf.goto_position(Position::new(0, 1));
        let (text, hint) = buf.cut_to_mark();
        assert_eq!(text, "ne\ntwo\nth");
        assert_eq!(buf.line(0).as_str(), "oree");
        assert_eq!(buf.number_of_lines(), 1);
        assert_eq!(buf.cursor, Position::new(0, 1));
        assert_eq!(hint, EditHint::ScreenPastPoint { row: 0, col: 1 });
        assert!(buf.mark().is_none());
    }

    #[test]
    fn immediate_cut_after_mark_is_empty_and_harmless() {
        let mut buf = EditBuffer::from_text("stable");
        buf.goto_position(Position::new(0, 3));
        buf.set_mark();
        let (text, hint) = buf.cut_to_mark();
        assert_eq!(text, "");
        assert_eq!(hint, EditHint::None);
        assert_eq!(buf.line(0).as_str(), "stable");
        assert!(!buf.is_touched());
    }

    #[test]
    fn cut_without_mark_is_a_noop() {
        let mut buf = EditBuffer::from_text("text");
        let (text, hint) = buf.cut_to_mark();
        assert_eq!(text, "");
        assert_eq!(hint, EditHint::None);
    }

    #[test]
    fn kill_line_cuts_tail_then_newline() {
        let mut buf = EditBuffer::from_text("head tail\nnext");
        buf.goto_position(Position::new(0, 4));
        let (text, hint) = buf.cut_to_end_of_line();
        assert_eq!(text, " tail");
        assert_eq!(hint, EditHint::LinePastPoint { row: 0, col: 4 });
        assert_eq!(buf.line(0).as_str(), "head");

        // Cursor now at end of line: the second kill removes the break.
        let (text, hint) = buf.cut_to_end_of_line();
        assert_eq!(text, "\n");
        assert_eq!(hint, EditHint::ScreenPastPoint { row: 0, col: 4 });
        assert_eq!(buf.line(0).as_str(), "headnext");
        assert_eq!(buf.number_of_lines(), 1);
    }

    #[test]
    fn kill_line_at_buffer_end_is_a_noop() {
        let mut buf = EditBuffer::from_text("only");
        buf.goto_line_end();
        let (text, hint) = buf.cut_to_end_of_line();
        assert_eq!(text, "");
        assert_eq!(hint, EditHint::None);
    }

    #[test]
    fn paste_spanning_lines_places_cursor_after_insertion() {
        let mut buf = EditBuffer::from_text("ab");
        buf.goto_position(Position::new(0, 1));
        let hint = buf.paste("X\nY\nZ");
        assert_eq!(buf.number_of_lines(), 3);
        assert_eq!(buf.line(0).as_str(), "aX");
        assert_eq!(buf.line(1).as_str(), "Y");
        assert_eq!(buf.line(2).as_str(), "Zb");
        assert_eq!(buf.cursor, Position::new(2, 1));
        assert_eq!(hint, EditHint::ScreenPastPoint { row: 0, col: 1 });
    }

    #[test]
    fn paste_round_trips_through_cut() {
        let mut buf = EditBuffer::from_text("one\ntwo\nthree");
        buf.goto_position(Position::new(0, 1));
        buf.set_mark();
        buf.goto_position(Position::new(2, 2));
        let (text, _) = buf.cut_to_mark();
        buf.paste(&text);
        assert_eq!(buf.flatten(), "one\ntwo\nthree");
    }

    #[test]
    fn find_then_find_again_then_exhausted() {
        // "foo bar baz foo": find, find-again, then exhausted.
        let mut buf = EditBuffer::from_text("foo bar baz foo");
        assert!(buf.find_string("foo"));
        assert_eq!(buf.cursor, Position::new(0, 0));
        assert!(buf.find_again("foo"));
        assert_eq!(buf.cursor, Position::new(0, 12));
        assert_eq!(buf.find_state().pattern, "foo");
        assert_eq!(buf.find_state().last_match, Some(Position::new(0, 12)));
        assert!(!buf.find_again("foo"));
        assert_eq!(buf.cursor, Position::new(0, 12));
    }

    #[test]
    fn find_is_case_sensitive_and_crosses_lines() {
        let mut buf = EditBuffer::from_text("alpha\nBeta\nbeta");
        assert!(!buf.find_string("BETA"));
        assert!(buf.find_string("beta"));
        assert_eq!(buf.cursor, Position::new(2, 0));
    }

    #[test]
    fn replace_at_cursor_replaces_and_advances_past() {
        let mut buf = EditBuffer::from_text("say foo now");
        buf.find_string("foo");
        assert!(buf.replace_string("foo", "bars"));
        assert_eq!(buf.line(0).as_str(), "say bars now");
        assert_eq!(buf.cursor, Position::new(0, 8));
    }

    #[test]
    fn replace_off_match_just_advances() {
        let mut buf = EditBuffer::from_text("x foo y foo");
        assert!(!buf.replace_string("foo", "bar"));
        // Behaved as find-again: cursor stepped to the first match.
        assert_eq!(buf.cursor, Position::new(0, 2));
        assert_eq!(buf.line(0).as_str(), "x foo y foo");
    }

    #[test]
    fn replace_all_counts_replacements() {
        let mut buf = EditBuffer::from_text("a foo b foo\nfoo end");
        assert_eq!(buf.replace_all("foo", "qux"), 3);
        assert_eq!(buf.flatten(), "a qux b qux\nqux end");
    }

    #[test]
    fn replace_all_with_expanding_replacement_terminates() {
        let mut buf = EditBuffer::from_text("aaaa");
        assert_eq!(buf.replace_all("aa", "a"), 2);
        assert_eq!(buf.line(0).as_str(), "aa");
    }

    #[test]
    fn flatten_counts_and_entab() {
        let mut buf = EditBuffer::from_text("    four\n\ttab");
        let (lines, chars) = buf.counts();
        assert_eq!(lines, 2);
        assert_eq!(chars, 8 + 1 + 4);
        assert_eq!(buf.entab(), 1);
        assert_eq!(buf.line(0).as_str(), "\tfour");
        assert_eq!(buf.detab(), 2);
        assert_eq!(buf.line(0).as_str(), "    four");
        assert_eq!(buf.line(1).as_str(), "    tab");
    }
}
