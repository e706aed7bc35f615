//! Modal text pane: the scrollable read-only list behind the project,
//! help, and build views. Consumes its own keys; escape closes.

use crate::writer::Writer;
use cm_config::{ProgramDefaults, RESET};
use cm_input::KeyAction;

/// Outcome of routing one key to a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneStatus {
    Open,
    Closed,
    /// Enter on a selectable row; payload is the line index.
    Chosen(usize),
}

#[derive(Debug, Default)]
pub struct TextPane {
    title: String,
    lines: Vec<String>,
    /// Whether Enter chooses the selected row (project list) or the
    /// pane is purely informational (help, build output).
    selectable: bool,
    selected: usize,
    top: usize,
    rows: usize,
    cols: usize,
}

impl TextPane {
    pub fn new(title: &str, lines: Vec<String>, selectable: bool) -> Self {
        Self {
            title: title.to_string(),
            lines,
            selectable,
            selected: 0,
            top: 0,
            rows: 0,
            cols: 0,
        }
    }

    pub fn place(&mut self, screen_rows: usize, screen_cols: usize) {
        self.rows = screen_rows.saturating_sub(2).max(1);
        self.cols = screen_cols;
        self.scroll_into_view();
    }

    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.selected = 0;
        self.top = 0;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn last_line(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    fn scroll_into_view(&mut self) {
        if self.rows == 0 {
            return;
        }
        if self.selected < self.top {
            self.top = self.selected;
        } else if self.selected >= self.top + self.rows {
            self.top = self.selected + 1 - self.rows;
        }
    }

    pub fn route_key(&mut self, key: KeyAction) -> PaneStatus {
        match key {
            KeyAction::Esc => return PaneStatus::Closed,
            KeyAction::Enter if self.selectable && !self.lines.is_empty() => {
                return PaneStatus::Chosen(self.selected);
            }
            KeyAction::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyAction::Down => {
                self.selected = (self.selected + 1).min(self.last_line());
            }
            KeyAction::PageUp => {
                self.selected = self.selected.saturating_sub(self.rows);
            }
            KeyAction::PageDown => {
                self.selected = (self.selected + self.rows).min(self.last_line());
            }
            KeyAction::Home => self.selected = 0,
            KeyAction::End => self.selected = self.last_line(),
            _ => {}
        }
        self.scroll_into_view();
        PaneStatus::Open
    }

    /// Full repaint: title row, visible lines, selection marker.
    pub fn update_screen(&self, defaults: &ProgramDefaults, out: &mut Writer) {
        out.move_to(0, 0);
        let title = format!("== {} ", self.title);
        let fill = self.cols.saturating_sub(title.chars().count());
        let mut header = title;
        header.extend(std::iter::repeat_n('=', fill));
        out.print(format!(
            "{}{}{header}{RESET}",
            defaults.status_bar_text, defaults.status_bar_background
        ));
        out.clear_to_eol();

        for i in 0..self.rows {
            let screen_row = i + 1;
            out.move_to(0, screen_row as u16);
            match self.lines.get(self.top + i) {
                Some(line) => {
                    let marker = if self.selectable && self.top + i == self.selected {
                        "> "
                    } else {
                        "  "
                    };
                    let text: String = line.chars().take(self.cols.saturating_sub(2)).collect();
                    out.print(format!("{marker}{text}"));
                }
                None => {}
            }
            out.clear_to_eol();
        }
    }
}
