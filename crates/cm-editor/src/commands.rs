//! Command handlers: one dispatcher match over [`CommandKind`] plus
//! the operations shared with the control-key table (cut, paste,
//! find/replace stepping, save).

use crate::{LoopStatus, ScreenEditor};
use cm_buffer::{EditBuffer, EditHint};
use cm_command::{CommandKind, Completer, SYMBOLS, find_symbol};
use cm_view::Writer;
use std::path::Path;
use tracing::info;

/// Outcome of one replace step, for the message area.
enum ReplaceOutcome {
    Replaced,
    SteppedToMatch,
    NoMoreMatches,
}

impl ScreenEditor {
    pub(crate) fn dispatch_command(
        &mut self,
        kind: CommandKind,
        arg: &str,
        out: &mut Writer,
    ) -> LoopStatus {
        match kind {
            CommandKind::Find => self.find_command(arg, out),
            CommandKind::Count => {
                let (lines, chars) = self.with_active(|_, buf, _| buf.counts());
                self.message(&format!("(lines: {lines}, characters: {chars})"), out);
            }
            CommandKind::Entab => {
                let changed = self.with_active(|view, buf, defaults| {
                    let changed = buf.entab();
                    view.update_screen(buf, defaults, out);
                    changed
                });
                self.message(&format!("(entabbed {changed} lines)"), out);
            }
            CommandKind::Detab => {
                let changed = self.with_active(|view, buf, defaults| {
                    let changed = buf.detab();
                    view.update_screen(buf, defaults, out);
                    changed
                });
                self.message(&format!("(detabbed {changed} lines)"), out);
            }
            CommandKind::TrimTrailing => {
                let changed = self.with_active(|view, buf, defaults| {
                    let changed = buf.trim_trailing();
                    view.update_screen(buf, defaults, out);
                    changed
                });
                self.message(&format!("(trimmed {changed} lines)"), out);
            }
            CommandKind::UtfBox => self.insert_symbol(arg, "box-", out),
            CommandKind::UtfSymbol => self.insert_symbol(arg, "sym-", out),
            CommandKind::Replace => {
                self.replace_pattern = arg.to_string();
                self.replace_step(out);
            }
            CommandKind::ReplaceAll => {
                self.replace_pattern = arg.to_string();
                self.replace_all(out);
            }
            CommandKind::GotoLine => self.goto_line_command(arg, out),
            CommandKind::GotoError => self.goto_error_command(out),
            CommandKind::Save => {
                let arg = if arg.is_empty() { None } else { Some(arg.to_string()) };
                self.save_current(arg, out);
            }
            CommandKind::SaveAs => self.save_current(Some(arg.to_string()), out),
            CommandKind::Load => self.load_file_command(arg, out),
            CommandKind::BufferNext => self.next_buffer(out),
            CommandKind::BufferPrev => self.previous_buffer(out),
            CommandKind::BufferNew => self.new_buffer_command(arg, out),
            CommandKind::BufferList => self.open_buffer_list_pane(out),
            CommandKind::Mark => {
                self.with_active(|_, buf, _| buf.set_mark());
                self.message("(mark set)", out);
            }
            CommandKind::Cut => self.cut_to_mark(out),
            CommandKind::Paste => self.paste(out),
            CommandKind::ProjectList => self.open_project_pane(out),
            CommandKind::Build => self.build_command(arg, out),
            CommandKind::Split => self.split(out),
            CommandKind::Unsplit => self.unsplit(out),
            CommandKind::Quit => return LoopStatus::Quit,
            CommandKind::Help => self.open_help_pane(out),
        }
        LoopStatus::Continue
    }

    //---------------------------------------------------------------
    // Find / replace
    //---------------------------------------------------------------

    fn find_command(&mut self, pattern: &str, out: &mut Writer) {
        self.find_pattern = pattern.to_string();
        let pattern = pattern.to_string();
        let found_row = self.with_active(|view, buf, defaults| {
            if buf.find_string(&pattern) {
                view.after_motion(buf, defaults, out);
                Some(buf.cursor.row)
            } else {
                None
            }
        });
        match found_row {
            Some(row) => self.message(&format!("(found at line {})", row + 1), out),
            None => self.message(&format!("(not found: {pattern})"), out),
        }
    }

    pub(crate) fn find_again(&mut self, out: &mut Writer) {
        if self.find_pattern.is_empty() {
            self.message("(no find string)", out);
            return;
        }
        let pattern = self.find_pattern.clone();
        let found = self.with_active(|view, buf, defaults| {
            let found = buf.find_again(&pattern);
            view.after_motion(buf, defaults, out);
            found
        });
        if !found {
            self.message(&format!("(not found: {pattern})"), out);
        }
    }

    /// The two-step replace contract: replace only when the cursor
    /// sits exactly on the last match, then step to the next; when it
    /// does not, just advance to the next match and leave the text
    /// alone.
    pub(crate) fn replace_step(&mut self, out: &mut Writer) {
        if self.find_pattern.is_empty() {
            self.message("(no find string)", out);
            return;
        }
        let find = self.find_pattern.clone();
        let replacement = self.replace_pattern.clone();
        let outcome = self.with_active(|view, buf, defaults| {
            if buf.at_match(&find) {
                buf.replace_string(&find, &replacement);
                view.update_after_edit(
                    EditHint::Line { row: buf.cursor.row },
                    buf,
                    defaults,
                    out,
                );
                buf.find_again(&find);
                view.after_motion(buf, defaults, out);
                ReplaceOutcome::Replaced
            } else if buf.find_again(&find) {
                view.after_motion(buf, defaults, out);
                ReplaceOutcome::SteppedToMatch
            } else {
                ReplaceOutcome::NoMoreMatches
            }
        });
        match outcome {
            ReplaceOutcome::Replaced => self.message("(replaced)", out),
            ReplaceOutcome::SteppedToMatch => self.message("(at next match)", out),
            ReplaceOutcome::NoMoreMatches => self.message("(no more matches)", out),
        }
    }

    fn replace_all(&mut self, out: &mut Writer) {
        if self.find_pattern.is_empty() {
            self.message("(no find string)", out);
            return;
        }
        let find = self.find_pattern.clone();
        let replacement = self.replace_pattern.clone();
        let count = self.with_active(|view, buf, defaults| {
            let count = buf.replace_all(&find, &replacement);
            view.reframe_and_update(buf, defaults, out);
            count
        });
        self.message(&format!("(replaced {count} occurrences)"), out);
    }

    //---------------------------------------------------------------
    // Cut / paste
    //---------------------------------------------------------------

    pub(crate) fn cut_to_mark(&mut self, out: &mut Writer) {
        let (text, hint) = self.with_active(|view, buf, defaults| {
            let (text, hint) = buf.cut_to_mark();
            view.update_after_edit(hint, buf, defaults, out);
            (text, hint)
        });
        if matches!(hint, EditHint::None) && text.is_empty() {
            self.message("(no mark set)", out);
        } else {
            self.cut_buffer = text;
            self.message("(text cut)", out);
        }
    }

    pub(crate) fn cut_to_end_of_line(&mut self, out: &mut Writer) {
        let text = self.with_active(|view, buf, defaults| {
            let (text, hint) = buf.cut_to_end_of_line();
            view.update_after_edit(hint, buf, defaults, out);
            text
        });
        if !text.is_empty() {
            self.cut_buffer = text;
        }
    }

    pub(crate) fn paste(&mut self, out: &mut Writer) {
        if self.cut_buffer.is_empty() {
            self.message("(cut buffer empty)", out);
            return;
        }
        let text = self.cut_buffer.clone();
        self.with_active(|view, buf, defaults| {
            let hint = buf.paste(&text);
            view.update_after_edit(hint, buf, defaults, out);
        });
    }

    //---------------------------------------------------------------
    // Files and buffers
    //---------------------------------------------------------------

    fn goto_line_command(&mut self, arg: &str, out: &mut Writer) {
        match arg.trim().parse::<usize>() {
            Ok(line) if line >= 1 => {
                self.with_active(|view, buf, defaults| {
                    view.cursor_goto_line(buf, line - 1, defaults, out);
                });
                self.message(&format!("(goto-line {line})"), out);
            }
            _ => self.message(&format!("(bad line number: {arg})"), out),
        }
    }

    /// Jump to the first `file:line:` diagnostic from the last build.
    fn goto_error_command(&mut self, out: &mut Writer) {
        match self.build.first_error() {
            Some((file, line)) => {
                if self.load_new_file(&file, true, out) {
                    self.with_active(|view, buf, defaults| {
                        view.cursor_goto_line(buf, line.saturating_sub(1), defaults, out);
                    });
                    self.message(&format!("({file}:{line})"), out);
                }
            }
            None => self.message("(no error in build output)", out),
        }
    }

    pub(crate) fn save_current(&mut self, path_arg: Option<String>, out: &mut Writer) {
        let path = path_arg.or_else(|| {
            let current = self.with_active(|_, buf, _| buf.file_path().to_string());
            if current.is_empty() { None } else { Some(current) }
        });
        let Some(path) = path else {
            self.message("(no file name)", out);
            return;
        };
        let result = self.with_active(|view, buf, defaults| {
            let result = buf.save_text(&path);
            view.update_status_line(buf, defaults, out);
            result
        });
        match result {
            Ok(()) => {
                info!(target: "editor", path, "saved");
                self.message(&format!("(saved {path})"), out);
            }
            // touched stays set; the user may fix the path and retry.
            Err(err) => self.message(&format!("({err})"), out),
        }
    }

    pub(crate) fn load_file_command(&mut self, path: &str, out: &mut Writer) {
        if !Path::new(path).exists() {
            self.message(&format!("(file not found: {path})"), out);
            return;
        }
        if self.load_new_file(path, true, out) {
            self.message(&format!("(loaded {path})"), out);
        }
    }

    fn new_buffer_command(&mut self, name: &str, out: &mut Writer) {
        let mut buf = EditBuffer::new();
        buf.set_tab_width(self.defaults().tab_size);
        buf.set_file_path(name);
        self.adopt_new_buffer(buf, out);
        self.message(&format!("(new buffer {name})"), out);
    }

    //---------------------------------------------------------------
    // Symbols and build
    //---------------------------------------------------------------

    fn insert_symbol(&mut self, arg: &str, filter: &str, out: &mut Writer) {
        let arg = arg.trim();
        let prefixed = if arg.starts_with(filter) {
            arg.to_string()
        } else {
            format!("{filter}{arg}")
        };
        // Accept unique abbreviations the same way TAB would, with or
        // without the filter prefix typed out.
        let completer = Completer::filtered(SYMBOLS.iter().map(|s| s.name), filter);
        let resolved = find_symbol(&prefixed)
            .map(|ch| (prefixed.clone(), ch))
            .or_else(|| {
                let full = completer.complete_prefix(&prefixed);
                find_symbol(&full).map(|ch| (full, ch))
            })
            .or_else(|| {
                let full = completer.complete_prefix(arg);
                find_symbol(&full).map(|ch| (full, ch))
            });
        match resolved {
            Some((name, ch)) => {
                self.with_active(|view, buf, defaults| {
                    let hint = buf.insert_char(ch);
                    view.update_after_edit(hint, buf, defaults, out);
                });
                self.message(&format!("(inserted {name})"), out);
            }
            None => self.message(&format!("(unknown symbol: {arg})"), out),
        }
    }

    fn build_command(&mut self, target: &str, out: &mut Writer) {
        let Some(project) = self.project.as_ref() else {
            self.message("(no project file)", out);
            return;
        };
        let Some(sub) = project.default_subproject().cloned() else {
            self.message("(project has no subprojects)", out);
            return;
        };
        self.message(&format!("(building {}...)", sub.name), out);
        let ok = self.build.run(&sub, target);
        self.open_build_pane(out);
        self.message(
            if ok { "(build succeeded)" } else { "(build failed)" },
            out,
        );
    }
}
