//! Viewport onto one edit buffer.
//!
//! The view owns screen geometry and the visible window; it borrows
//! the buffer per operation and never reaches back into the mode
//! router; key handling reports an [`EditStatus`] the router
//! interprets. Horizontal window positions are display columns of the
//! tab-expanded line, so the cursor math and the painted slice agree.

use crate::writer::Writer;
use cm_buffer::{EditBuffer, EditHint, Position};
use cm_config::{ProgramDefaults, RESET};
use cm_input::KeyAction;
use cm_markup::MarkupEngine;
use cm_text::width::{skip_cells, take_cells};

/// Outcome of routing one key to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStatus {
    Ok,
    /// The key requested command-line mode.
    EnterCommand,
    Quit,
}

/// Right margin: horizontal scroll triggers this many columns before
/// the cursor reaches the window edge.
const RIGHT_MARGIN: usize = 10;

#[derive(Debug)]
pub struct EditView {
    // Screen geometry, zero-based screen coordinates.
    screen_cols: usize,
    edit_first_row: usize,
    edit_last_row: usize,
    status_row: usize,

    // Visible window into the buffer.
    first_buf_row: usize,
    last_buf_row: usize,
    first_buf_col: usize,
    last_buf_col: usize,

    gutter_width: usize,
    show_line_numbers: bool,
    jump_scroll: bool,
    live_status: bool,
    suppress_status: bool,
    agent_connected: bool,

    markup: MarkupEngine,
}

impl EditView {
    pub fn new(defaults: &ProgramDefaults) -> Self {
        Self {
            screen_cols: 0,
            edit_first_row: 0,
            edit_last_row: 0,
            status_row: 0,
            first_buf_row: 0,
            last_buf_row: 0,
            first_buf_col: 0,
            last_buf_col: 0,
            gutter_width: 0,
            show_line_numbers: defaults.show_line_numbers,
            jump_scroll: defaults.jump_scroll,
            live_status: defaults.live_status_lines,
            suppress_status: false,
            agent_connected: false,
            markup: MarkupEngine::new(defaults),
        }
    }

    //---------------------------------------------------------------
    // Geometry
    //---------------------------------------------------------------

    /// Occupy the whole window: edit rows on top, status line second
    /// to last, command line (owned by the router) last.
    pub fn place_full(&mut self, screen_rows: usize, screen_cols: usize, line_count: usize) {
        let rows = screen_rows.max(4);
        self.screen_cols = screen_cols;
        self.edit_first_row = 0;
        self.edit_last_row = rows - 3;
        self.status_row = rows - 2;
        self.recalc_window(line_count);
    }

    /// Occupy a band of rows (split mode). The band's last row is this
    /// view's status row.
    pub fn place_region(
        &mut self,
        first_row: usize,
        last_row: usize,
        screen_cols: usize,
        line_count: usize,
    ) {
        self.screen_cols = screen_cols;
        self.edit_first_row = first_row;
        self.edit_last_row = last_row.saturating_sub(1).max(first_row);
        self.status_row = last_row;
        self.recalc_window(line_count);
    }

    fn recalc_window(&mut self, line_count: usize) {
        self.recalc_gutter(line_count);
        self.last_buf_row = self.first_buf_row + self.edit_rows() - 1;
        self.last_buf_col = self.first_buf_col + self.edit_cols() - 1;
    }

    fn edit_rows(&self) -> usize {
        self.edit_last_row - self.edit_first_row + 1
    }

    fn edit_cols(&self) -> usize {
        self.screen_cols.saturating_sub(self.gutter_width).max(1)
    }

    fn recalc_gutter(&mut self, line_count: usize) {
        self.gutter_width = if self.show_line_numbers {
            let digits = line_count.max(1).to_string().len();
            digits + 2
        } else {
            0
        };
    }

    //---------------------------------------------------------------
    // State the router persists per buffer
    //---------------------------------------------------------------

    /// (first visible row, first visible column) for persistence on
    /// buffer switch.
    pub fn view_state(&self) -> (usize, usize) {
        (self.first_buf_row, self.first_buf_col)
    }

    pub fn restore_view_state(&mut self, (top, left): (usize, usize), line_count: usize) {
        self.first_buf_row = top;
        self.first_buf_col = left;
        self.recalc_window(line_count);
    }

    /// Install a buffer: pick its language and recompute the gutter.
    /// Redrawing is the caller's move.
    pub fn attach_buffer(&mut self, buf: &EditBuffer, defaults: &ProgramDefaults) {
        self.markup = MarkupEngine::new(defaults);
        self.markup.set_language_from_path(buf.file_path(), defaults);
        self.first_buf_row = 0;
        self.first_buf_col = 0;
        self.recalc_window(buf.number_of_lines());
    }

    pub fn set_agent_connected(&mut self, connected: bool) {
        self.agent_connected = connected;
    }

    pub fn set_suppress_status(&mut self, suppress: bool) {
        self.suppress_status = suppress;
    }

    pub fn toggle_line_numbers(&mut self, line_count: usize) -> bool {
        self.show_line_numbers = !self.show_line_numbers;
        self.recalc_window(line_count);
        self.show_line_numbers
    }

    pub fn toggle_jump_scroll(&mut self) -> bool {
        self.jump_scroll = !self.jump_scroll;
        self.jump_scroll
    }

    //---------------------------------------------------------------
    // Reframe
    //---------------------------------------------------------------

    fn row_visible(&self, row: usize) -> bool {
        row >= self.first_buf_row && row <= self.last_buf_row
    }

    fn col_visible(&self, dcol: usize) -> bool {
        dcol >= self.first_buf_col && dcol < self.last_buf_col.saturating_sub(RIGHT_MARGIN)
    }

    fn set_window_top(&mut self, row: usize) {
        self.first_buf_row = row;
        self.last_buf_row = row + self.edit_rows() - 1;
    }

    fn set_window_bottom(&mut self, row: usize) {
        self.first_buf_row = row.saturating_sub(self.edit_rows() - 1);
        self.last_buf_row = self.first_buf_row + self.edit_rows() - 1;
    }

    fn set_window_left(&mut self, dcol: usize) {
        self.first_buf_col = dcol;
        self.last_buf_col = dcol + self.edit_cols() - 1;
    }

    fn set_window_right(&mut self, dcol: usize) {
        self.first_buf_col = dcol.saturating_sub(self.edit_cols() - 1);
        self.last_buf_col = self.first_buf_col + self.edit_cols() - 1;
    }

    fn cursor_display_col(&self, buf: &EditBuffer) -> usize {
        buf.line(buf.cursor.row)
            .display_col(buf.cursor.col, buf.tab_width())
    }

    /// Adjust the window so the cursor is visible. Returns whether the
    /// window moved; calling again without moving the cursor is a
    /// no-op.
    pub fn reframe(&mut self, buf: &EditBuffer) -> bool {
        let before = (
            self.first_buf_row,
            self.last_buf_row,
            self.first_buf_col,
            self.last_buf_col,
        );
        let row = buf.cursor.row;
        let dcol = self.cursor_display_col(buf);

        if !(self.row_visible(row) && self.col_visible(dcol)) {
            if self.jump_scroll {
                self.reframe_rows_jump(row, buf.number_of_lines());
            } else {
                self.reframe_rows_smooth(row);
            }
            self.reframe_cols(dcol);
        }
        let moved = before
            != (
                self.first_buf_row,
                self.last_buf_row,
                self.first_buf_col,
                self.last_buf_col,
            );
        if moved {
            tracing::trace!(
                target: "view",
                row,
                dcol,
                first = self.first_buf_row,
                left = self.first_buf_col,
                jump = self.jump_scroll,
                "reframe"
            );
        }
        moved
    }

    fn reframe_rows_smooth(&mut self, row: usize) {
        if row < self.first_buf_row {
            self.set_window_top(row);
        } else if row > self.last_buf_row {
            self.set_window_bottom(row);
        }
    }

    /// Jump scroll: land the cursor half a window away from the edge
    /// so slow terminals repaint once per jump instead of every line.
    fn reframe_rows_jump(&mut self, row: usize, line_count: usize) {
        let half = self.edit_rows() / 2;
        if row < self.first_buf_row {
            self.set_window_top(row.saturating_sub(half));
        } else if row > self.last_buf_row {
            let target = (row + half).min(line_count.saturating_sub(1));
            self.set_window_bottom(target);
        }
    }

    fn reframe_cols(&mut self, dcol: usize) {
        if dcol < self.first_buf_col {
            self.set_window_left(dcol);
        } else if !self.col_visible(dcol) {
            // Right-edge violation (includes the margin zone): place
            // the cursor just inside the margin.
            self.set_window_right(dcol + RIGHT_MARGIN + 1);
        }
    }

    //---------------------------------------------------------------
    // Coordinate translation
    //---------------------------------------------------------------

    fn screen_row(&self, buf_row: usize) -> usize {
        buf_row - self.first_buf_row + self.edit_first_row
    }

    fn screen_col(&self, dcol: usize) -> usize {
        dcol - self.first_buf_col + self.gutter_width
    }

    /// Emit the terminal cursor-position command for the buffer cursor.
    pub fn place_cursor(&self, buf: &EditBuffer, out: &mut Writer) {
        let row = self.screen_row(buf.cursor.row.clamp(self.first_buf_row, self.last_buf_row));
        let dcol = self.cursor_display_col(buf);
        let col = self.screen_col(dcol.clamp(self.first_buf_col, self.last_buf_col));
        out.move_to(col as u16, row as u16);
    }

    //---------------------------------------------------------------
    // Painting
    //---------------------------------------------------------------

    fn format_row(
        &self,
        buf: &EditBuffer,
        defaults: &ProgramDefaults,
        buf_row: usize,
        out: &mut Writer,
    ) {
        if buf_row < self.first_buf_row || buf_row > self.last_buf_row {
            return;
        }
        out.move_to(0, self.screen_row(buf_row) as u16);

        if buf_row >= buf.number_of_lines() {
            out.clear_to_eol();
            return;
        }

        if self.show_line_numbers {
            let number = format!("{}| ", buf_row + 1);
            let gutter = format!("{number:>width$}", width = self.gutter_width);
            if defaults.line_number_text.is_empty() {
                out.print(gutter);
            } else {
                out.print(format!("{}{gutter}{RESET}", defaults.line_number_text));
            }
        }

        let expanded = buf.line(buf_row).expanded(buf.tab_width());
        let tail = skip_cells(&expanded, self.first_buf_col);
        let (visible, _) = take_cells(tail, self.edit_cols());
        let styled = self.markup.colorize(&expanded, visible);
        out.print(styled);
        out.print(RESET);
        out.clear_to_eol();
    }

    fn format_rows_from(
        &self,
        buf: &EditBuffer,
        defaults: &ProgramDefaults,
        from_row: usize,
        out: &mut Writer,
    ) {
        for row in from_row.max(self.first_buf_row)..=self.last_buf_row {
            self.format_row_or_clear(buf, defaults, row, out);
        }
    }

    fn format_row_or_clear(
        &self,
        buf: &EditBuffer,
        defaults: &ProgramDefaults,
        row: usize,
        out: &mut Writer,
    ) {
        if row < buf.number_of_lines() {
            self.format_row(buf, defaults, row, out);
        } else {
            out.move_to(0, self.screen_row(row) as u16);
            out.clear_to_eol();
        }
    }

    /// Full redraw: every visible row plus the status line.
    pub fn update_screen(&self, buf: &EditBuffer, defaults: &ProgramDefaults, out: &mut Writer) {
        for row in self.first_buf_row..=self.last_buf_row {
            self.format_row_or_clear(buf, defaults, row, out);
        }
        self.update_status_line(buf, defaults, out);
    }

    /// Reframe, then redraw (buffer switch, window resize, jumps).
    pub fn reframe_and_update(
        &mut self,
        buf: &EditBuffer,
        defaults: &ProgramDefaults,
        out: &mut Writer,
    ) {
        self.reframe(buf);
        self.update_screen(buf, defaults, out);
    }

    /// Minimum repaint after a buffer mutation: reframe, then paint
    /// only what the hint demands. A gutter-width change (line count
    /// crossed a digit boundary) forces the full path.
    pub fn update_after_edit(
        &mut self,
        hint: EditHint,
        buf: &EditBuffer,
        defaults: &ProgramDefaults,
        out: &mut Writer,
    ) {
        let old_gutter = self.gutter_width;
        self.recalc_window(buf.number_of_lines());
        let reframed = self.reframe(buf);

        if reframed || self.gutter_width != old_gutter {
            self.update_screen(buf, defaults, out);
            return;
        }
        match hint {
            EditHint::None => {}
            EditHint::Line { row } | EditHint::LinePastPoint { row, .. } => {
                self.format_row(buf, defaults, row, out);
            }
            EditHint::ScreenPastPoint { row, .. } => {
                self.format_rows_from(buf, defaults, row, out);
            }
        }
        if self.live_status && !matches!(hint, EditHint::None) {
            self.update_status_line(buf, defaults, out);
        }
    }

    //---------------------------------------------------------------
    // Status line
    //---------------------------------------------------------------

    /// Compose the status row text: identity and path anchored left,
    /// position block anchored right, `=` fill between.
    pub fn status_line_text(&self, buf: &EditBuffer) -> String {
        let left = format!("== cm: Editing [ {} ] ", buf.file_path());

        let right = if self.live_status {
            let row = buf.cursor.row;
            let total = buf.number_of_lines();
            let percent = if row == 0 {
                0.0
            } else {
                row as f64 / total as f64 * 100.0
            };
            let mut right = String::new();
            if self.agent_connected {
                right.push_str("[ Agent ] ");
            }
            // Fixed-width position block so the text does not jump
            // around as the cursor moves.
            let mut line_part = format!("line({},{},{percent:.0}%)", row + 1, total);
            while line_part.len() < 22 {
                line_part.insert(0, '=');
            }
            let mut col_part = format!("col({})", buf.cursor.col);
            while col_part.len() < 8 {
                col_part.push('=');
            }
            right.push_str(&line_part);
            right.push(' ');
            right.push_str(&col_part);
            right
        } else {
            String::new()
        };

        let fill = self
            .screen_cols
            .saturating_sub(left.chars().count() + right.chars().count());
        let mut text = left;
        text.extend(std::iter::repeat_n('=', fill));
        text.push_str(&right);
        text
    }

    pub fn update_status_line(
        &self,
        buf: &EditBuffer,
        defaults: &ProgramDefaults,
        out: &mut Writer,
    ) {
        if self.suppress_status {
            return;
        }
        let text = self.status_line_text(buf);
        out.move_to(0, self.status_row as u16);
        out.print(format!(
            "{}{}{text}{RESET}",
            defaults.status_bar_text, defaults.status_bar_background
        ));
        out.clear_to_eol();
    }

    //---------------------------------------------------------------
    // Key routing
    //---------------------------------------------------------------

    /// Route one key. Mutating keys repaint per their edit hint;
    /// motions repaint only when the window moves.
    pub fn route_key(
        &mut self,
        buf: &mut EditBuffer,
        key: KeyAction,
        defaults: &ProgramDefaults,
        out: &mut Writer,
    ) -> EditStatus {
        match key {
            KeyAction::Esc => return EditStatus::EnterCommand,
            KeyAction::Char(c) => {
                let hint = buf.insert_char(c);
                self.update_after_edit(hint, buf, defaults, out);
            }
            KeyAction::Enter => {
                let hint = buf.insert_newline();
                self.update_after_edit(hint, buf, defaults, out);
            }
            KeyAction::Tab => {
                let hint = buf.insert_tab();
                self.update_after_edit(hint, buf, defaults, out);
            }
            KeyAction::Backspace => {
                let hint = buf.backspace();
                self.update_after_edit(hint, buf, defaults, out);
            }
            KeyAction::Left => {
                buf.cursor_left();
                self.after_motion(buf, defaults, out);
            }
            KeyAction::Right => {
                buf.cursor_right();
                self.after_motion(buf, defaults, out);
            }
            KeyAction::Up => {
                buf.cursor_up();
                self.after_motion(buf, defaults, out);
            }
            KeyAction::Down => {
                buf.cursor_down();
                self.after_motion(buf, defaults, out);
            }
            KeyAction::Home => {
                buf.goto_line_start();
                self.after_motion(buf, defaults, out);
            }
            KeyAction::End => {
                buf.goto_line_end();
                self.after_motion(buf, defaults, out);
            }
            KeyAction::PageDown => self.page_down(buf, defaults, out),
            KeyAction::PageUp => self.page_up(buf, defaults, out),
            // Control chords belong to the router; anything else is
            // ignored without state change.
            _ => {}
        }
        EditStatus::Ok
    }

    /// Repaint policy after a cursor-only change: full redraw when
    /// the window moved, a live status refresh otherwise.
    pub fn after_motion(&mut self, buf: &EditBuffer, defaults: &ProgramDefaults, out: &mut Writer) {
        if self.reframe(buf) {
            self.update_screen(buf, defaults, out);
        } else if self.live_status {
            self.update_status_line(buf, defaults, out);
        }
    }

    /// Jump down a page of material.
    pub fn page_down(&mut self, buf: &mut EditBuffer, defaults: &ProgramDefaults, out: &mut Writer) {
        let target = buf.cursor.row + self.edit_rows();
        buf.goto_position(Position::new(target, buf.cursor.col));
        self.after_motion(buf, defaults, out);
    }

    /// Jump up a page of material.
    pub fn page_up(&mut self, buf: &mut EditBuffer, defaults: &ProgramDefaults, out: &mut Writer) {
        let target = buf.cursor.row.saturating_sub(self.edit_rows());
        buf.goto_position(Position::new(target, buf.cursor.col));
        self.after_motion(buf, defaults, out);
    }

    /// Move the cursor to a line and bring it on screen.
    pub fn cursor_goto_line(
        &mut self,
        buf: &mut EditBuffer,
        row: usize,
        defaults: &ProgramDefaults,
        out: &mut Writer,
    ) {
        buf.goto_line(row);
        self.after_motion(buf, defaults, out);
    }
}
