//! Command-line mode: hint gathering, completion, and commit.
//!
//! Entering COMMANDLINE arms a one-keystroke hint window: a first key
//! matching a well-known command auto-types it (`f` → `find: `), and
//! a couple of hints execute immediately (`<space>`/`m` set the mark
//! and drop straight back to EDIT). Anything else is typed literally
//! so rarely-used commands remain reachable.
//!
//! Commit strips the first whitespace-delimited token, tolerating a
//! trailing colon, and resolves it against the command table: exact
//! name first, then a unique completer match so acronyms commit too.

use crate::{LoopStatus, ProgramMode, ScreenEditor};
use cm_command::{CommandFlags, Completer, SYMBOLS};
use cm_input::KeyAction;
use cm_view::Writer;
use tracing::debug;

impl ScreenEditor {
    pub(crate) fn enter_command_mode(&mut self, out: &mut Writer) {
        self.mode = ProgramMode::CommandLine;
        self.hint_pending = true;
        self.symbol_completer = None;
        self.command_line.clear();
        self.command_line.update_screen(out);
        self.command_line.place_cursor(out);
    }

    fn leave_command_mode(&mut self) {
        self.mode = ProgramMode::Edit;
        self.hint_pending = false;
        self.symbol_completer = None;
    }

    pub(crate) fn focus_command_prompt(&mut self, key: KeyAction, out: &mut Writer) -> LoopStatus {
        if self.hint_pending {
            self.hint_pending = false;
            match key {
                KeyAction::Char(c) => {
                    if self.gather_hint(c, out) {
                        self.leave_command_mode();
                        self.place_active_cursor(out);
                        return LoopStatus::Continue;
                    }
                }
                KeyAction::Esc | KeyAction::Enter => {
                    self.command_line.clear();
                    self.leave_command_mode();
                    self.command_line.update_screen(out);
                    self.place_active_cursor(out);
                    return LoopStatus::Continue;
                }
                _ => {}
            }
            self.command_line.update_screen(out);
            self.command_line.place_cursor(out);
            return LoopStatus::Continue;
        }

        match key {
            KeyAction::Char(c) => self.command_line.insert_char(c),
            KeyAction::Backspace => self.command_line.backspace(),
            KeyAction::Left => self.command_line.cursor_left(),
            KeyAction::Right => self.command_line.cursor_right(),
            KeyAction::Home => self.command_line.cursor_home(),
            KeyAction::End => self.command_line.cursor_end(),
            KeyAction::Tab => self.complete_command_line(),
            KeyAction::Enter | KeyAction::Esc => return self.execute_command_line(out),
            _ => {}
        }
        self.command_line.update_screen(out);
        self.command_line.place_cursor(out);
        LoopStatus::Continue
    }

    /// First keystroke after `<esc>`. Returns true when the hint
    /// already executed and focus goes back to the editor.
    fn gather_hint(&mut self, c: char, out: &mut Writer) -> bool {
        match c {
            's' => {
                self.command_line.type_text("save: ");
                let path = self.with_active(|_, buf, _| buf.file_path().to_string());
                if !path.is_empty() {
                    self.command_line.type_text(&path);
                }
            }
            'l' => self.command_line.type_text("load: "),
            'f' => self.command_line.type_text("find: "),
            'r' => self.command_line.type_text("replace: "),
            'q' => self.command_line.type_text("quit:"),
            'g' => self.command_line.type_text("goto-line: "),
            'c' => self.command_line.type_text("cut:"),
            'p' => self.command_line.type_text("paste:"),
            ' ' | 'm' => {
                // Immediate hint: set the mark and return to EDIT.
                self.command_line.type_text("mark:");
                self.with_active(|_, buf, _| buf.set_mark());
                self.message("(mark set)", out);
                return true;
            }
            // No hint matches: type the character so the user can
            // continue with a less used command.
            other => self.command_line.insert_char(other),
        }
        false
    }

    /// TAB: complete the command token, or the symbol argument once a
    /// SYMBOL_ARG command is chosen and its child completer is active.
    pub(crate) fn complete_command_line(&mut self) {
        let text = self.command_line.text().to_string();
        match text.split_once(char::is_whitespace) {
            None => {
                let completed = self.completer.complete_prefix(text.trim());
                match cm_command::find_exact(&completed) {
                    Some(entry) if entry.flags.contains(CommandFlags::SYMBOL_ARG) => {
                        if let Some(filter) = entry.symbol_filter {
                            self.symbol_completer = Some(Completer::filtered(
                                SYMBOLS.iter().map(|s| s.name),
                                filter,
                            ));
                        }
                        self.command_line.set_text(&format!("{completed} "));
                    }
                    Some(entry)
                        if entry
                            .flags
                            .intersects(CommandFlags::NEEDS_ARG | CommandFlags::OPTIONAL_ARG) =>
                    {
                        self.command_line.set_text(&format!("{completed} "));
                    }
                    _ => self.command_line.set_text(&completed),
                }
            }
            Some((head, rest)) => {
                let head_name = head.trim_end_matches(':');
                let Some(entry) = cm_command::find_exact(head_name) else {
                    return;
                };
                if !entry.flags.contains(CommandFlags::SYMBOL_ARG) {
                    return;
                }
                let Some(filter) = entry.symbol_filter else { return };
                let completer = self.symbol_completer.get_or_insert_with(|| {
                    Completer::filtered(SYMBOLS.iter().map(|s| s.name), filter)
                });
                // Seed the filter prefix so a bare tail like "bull"
                // still completes to "sym-bullet".
                let raw = rest.trim();
                let seed = if raw.starts_with(filter) {
                    raw.to_string()
                } else {
                    format!("{filter}{raw}")
                };
                let completed = completer.complete_prefix(&seed);
                self.command_line.set_text(&format!("{head} {completed}"));
            }
        }
    }

    /// Commit the command line: resolve the first token and dispatch.
    pub(crate) fn execute_command_line(&mut self, out: &mut Writer) -> LoopStatus {
        let text = self.command_line.text().trim().to_string();
        self.command_line.clear();
        self.leave_command_mode();
        self.command_line.update_screen(out);

        if text.is_empty() {
            self.place_active_cursor(out);
            return LoopStatus::Continue;
        }
        let (token, arg) = match text.split_once(char::is_whitespace) {
            Some((token, rest)) => (token, rest.trim()),
            None => (text.as_str(), ""),
        };
        let token = token.trim_end_matches(':');
        debug!(target: "editor", command = token, "execute");

        let entry = cm_command::find_exact(token).or_else(|| {
            let matches = self.completer.find_matches(token);
            match matches.as_slice() {
                [single] => cm_command::find_exact(single),
                _ => None,
            }
        });
        let Some(entry) = entry else {
            self.message(&format!("(unknown command: {token})"), out);
            self.place_active_cursor(out);
            return LoopStatus::Continue;
        };
        if entry.flags.contains(CommandFlags::NEEDS_ARG) && arg.is_empty() {
            let hint = entry.arg_hint.unwrap_or("<arg>");
            self.message(&format!("({} needs an argument: {hint})", entry.name), out);
            self.place_active_cursor(out);
            return LoopStatus::Continue;
        }

        let status = self.dispatch_command(entry.kind, arg, out);
        if matches!(self.mode, ProgramMode::Edit) {
            self.place_active_cursor(out);
        }
        status
    }
}
