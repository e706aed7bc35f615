//! The screen editor: mode machine, key routing, and everything that
//! ties buffers, views, commands, and the agent bridge together.
//!
//! Ownership runs strictly downward: the editor owns the buffer list
//! and the views; views never reach back. Key handlers return status
//! enums and the editor interprets them, which is also how quit
//! propagates out to the main loop.
//!
//! Modes: EDIT owns the keyboard by default. `<esc>` enters
//! COMMANDLINE (with a one-keystroke hint window), control chords
//! dispatch through static tables, and the modal views (project list,
//! help, build output) consume their own keys until escape.

mod agent;
mod build;
mod command_input;
mod commands;
mod control;
mod help;
mod project;

pub use build::BuildOutput;
pub use project::{Project, Subproject};

use cm_buffer::{BufferId, BufferList, EditBuffer};
use cm_command::Completer;
use cm_config::ProgramDefaults;
use cm_input::KeyAction;
use cm_view::{CommandLineView, EditStatus, EditView, PaneStatus, TextPane, Writer};
use control::{ControlOp, CtrlXOp, lookup_control, lookup_ctrl_x};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Which component owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramMode {
    Edit,
    CommandLine,
    ProjectView,
    HelpView,
    BuildView,
}

/// What the main loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    Continue,
    Quit,
}

/// What Enter means on a modal pane row.
#[derive(Debug, Clone)]
enum PaneTarget {
    OpenPath(PathBuf),
    SwitchBuffer(usize),
    Inert,
}

#[derive(Debug)]
struct ViewSlot {
    view: EditView,
    /// Index into the buffer list.
    buffer: usize,
}

pub struct ScreenEditor {
    defaults: ProgramDefaults,
    pub mode: ProgramMode,
    buffers: BufferList,

    top: ViewSlot,
    bottom: Option<ViewSlot>,
    active_bottom: bool,
    /// Screen row of the split divider, when split.
    divider_row: Option<usize>,

    command_line: CommandLineView,
    completer: Completer,
    /// Child completer while a SYMBOL_ARG command is being typed.
    symbol_completer: Option<Completer>,
    /// The next COMMANDLINE keystroke is the hint key.
    hint_pending: bool,
    /// A C-X prefix is waiting for its second chord.
    pending_ctrl_x: bool,

    cut_buffer: String,
    find_pattern: String,
    replace_pattern: String,

    /// Persisted (top, left) view state per buffer identity.
    view_states: HashMap<BufferId, (usize, usize)>,

    pane: Option<TextPane>,
    pane_targets: Vec<PaneTarget>,

    project: Option<Project>,
    build: BuildOutput,

    rows: usize,
    cols: usize,
    agent_connected: bool,
}

impl ScreenEditor {
    pub fn new(defaults: ProgramDefaults, rows: usize, cols: usize) -> Self {
        let mut buffers = BufferList::new();
        let mut initial = EditBuffer::new();
        initial.set_tab_width(defaults.tab_size);
        buffers.insert(initial);

        let mut view = EditView::new(&defaults);
        view.place_full(rows, cols, 1);

        let mut command_line = CommandLineView::new();
        command_line.place(rows.saturating_sub(1), cols);

        Self {
            defaults,
            mode: ProgramMode::Edit,
            buffers,
            top: ViewSlot { view, buffer: 0 },
            bottom: None,
            active_bottom: false,
            divider_row: None,
            command_line,
            completer: cm_command::command_completer(),
            symbol_completer: None,
            hint_pending: false,
            pending_ctrl_x: false,
            cut_buffer: String::new(),
            find_pattern: String::new(),
            replace_pattern: String::new(),
            view_states: HashMap::new(),
            pane: None,
            pane_targets: Vec::new(),
            project: None,
            build: BuildOutput::new(),
            rows,
            cols,
            agent_connected: false,
        }
    }

    pub fn defaults(&self) -> &ProgramDefaults {
        &self.defaults
    }

    pub fn buffers(&self) -> &BufferList {
        &self.buffers
    }

    pub fn set_project(&mut self, project: Option<Project>) {
        self.project = project;
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Register every project file as an unloaded buffer; content is
    /// read on first view.
    pub fn register_project_buffers(&mut self) {
        let Some(project) = &self.project else { return };
        let files = project.files();
        let current = self.buffers.current_index();
        for (_, path) in files {
            let path = path.to_string_lossy().to_string();
            if self.buffers.find_by_path(&path).is_some() {
                continue;
            }
            let mut buf = EditBuffer::new();
            buf.set_tab_width(self.defaults.tab_size);
            // Deferred load never fails here; missing files surface on
            // first view.
            let _ = buf.load_text(&path, false);
            self.buffers.insert(buf);
        }
        if let Some(current) = current {
            self.buffers.set_current(current);
        }
        info!(target: "editor", buffers = self.buffers.len(), "project buffers registered");
    }

    //---------------------------------------------------------------
    // Field-splitting helpers
    //---------------------------------------------------------------

    /// Run `f` with the active view and its buffer. The buffer list
    /// always holds the views' buffers; a broken index is a contract
    /// violation upstream.
    fn with_active<R>(
        &mut self,
        f: impl FnOnce(&mut EditView, &mut EditBuffer, &ProgramDefaults) -> R,
    ) -> R {
        let slot = if self.active_bottom {
            self.bottom.as_mut().expect("active view exists")
        } else {
            &mut self.top
        };
        let buf = self.buffers.at_mut(slot.buffer).expect("view buffer exists");
        f(&mut slot.view, buf, &self.defaults)
    }

    fn active_buffer_index(&self) -> usize {
        if self.active_bottom {
            self.bottom.as_ref().map(|s| s.buffer).unwrap_or(self.top.buffer)
        } else {
            self.top.buffer
        }
    }

    pub(crate) fn message(&self, text: &str, out: &mut Writer) {
        self.command_line.show_message(text, &self.defaults, out);
    }

    fn place_active_cursor(&mut self, out: &mut Writer) {
        self.with_active(|view, buf, _| view.place_cursor(buf, out));
    }

    //---------------------------------------------------------------
    // Key routing
    //---------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyAction, out: &mut Writer) -> LoopStatus {
        if let KeyAction::Resize(cols, rows) = key {
            self.resize(rows as usize, cols as usize, out);
            return LoopStatus::Continue;
        }
        match self.mode {
            ProgramMode::Edit => self.focus_editor(key, out),
            ProgramMode::CommandLine => self.focus_command_prompt(key, out),
            ProgramMode::ProjectView | ProgramMode::HelpView | ProgramMode::BuildView => {
                self.focus_pane(key, out)
            }
        }
    }

    fn focus_editor(&mut self, key: KeyAction, out: &mut Writer) -> LoopStatus {
        if self.pending_ctrl_x {
            self.pending_ctrl_x = false;
            if let KeyAction::Ctrl(c) = key
                && let Some(cmd) = lookup_ctrl_x(c)
            {
                match cmd.op {
                    CtrlXOp::Save => {
                        self.save_current(None, out);
                        self.place_active_cursor(out);
                    }
                    CtrlXOp::Quit => return LoopStatus::Quit,
                }
            }
            // Unknown combinations are silently ignored.
            return LoopStatus::Continue;
        }

        match key {
            KeyAction::Esc => {
                self.enter_command_mode(out);
                LoopStatus::Continue
            }
            KeyAction::Ctrl('X') => {
                self.pending_ctrl_x = true;
                LoopStatus::Continue
            }
            KeyAction::Ctrl(c) => self.handle_control(c, out),
            _ => {
                let status =
                    self.with_active(|view, buf, defaults| view.route_key(buf, key, defaults, out));
                match status {
                    EditStatus::Quit => return LoopStatus::Quit,
                    EditStatus::EnterCommand => self.enter_command_mode(out),
                    EditStatus::Ok => self.place_active_cursor(out),
                }
                LoopStatus::Continue
            }
        }
    }

    /// Dispatch a control chord through the static table: emit its
    /// message, run the operation, reposition the cursor.
    fn handle_control(&mut self, tag: char, out: &mut Writer) -> LoopStatus {
        let Some(cmd) = lookup_control(tag) else {
            return LoopStatus::Continue;
        };
        debug!(target: "editor", tag = %cmd.tag, "control");
        if let Some(message) = cmd.message {
            self.message(message, out);
        }
        match cmd.op {
            ControlOp::ToggleJumpScroll => {
                let on = self.with_active(|view, _, _| view.toggle_jump_scroll());
                self.message(if on { "(jump scroll on)" } else { "(jump scroll off)" }, out);
            }
            ControlOp::FindAgain => self.find_again(out),
            ControlOp::ReplaceAgain => self.replace_step(out),
            ControlOp::ToggleLineNumbers => {
                let on = self.with_active(|view, buf, defaults| {
                    let on = view.toggle_line_numbers(buf.number_of_lines());
                    view.update_screen(buf, defaults, out);
                    on
                });
                self.message(
                    if on { "(line numbers on)" } else { "(line numbers off)" },
                    out,
                );
            }
            ControlOp::Cut => self.cut_to_mark(out),
            ControlOp::PageDown => {
                self.with_active(|view, buf, defaults| view.page_down(buf, defaults, out));
            }
            ControlOp::PageUp => {
                self.with_active(|view, buf, defaults| view.page_up(buf, defaults, out));
            }
            ControlOp::CutToEndOfLine => self.cut_to_end_of_line(out),
            ControlOp::Paste => self.paste(out),
            ControlOp::NextBuffer => self.next_buffer(out),
            ControlOp::ProjectList => self.open_project_pane(out),
            ControlOp::UpdateScreen => self.redraw_all(out),
            ControlOp::ShowBuild => self.open_build_pane(out),
            ControlOp::Help => self.open_help_pane(out),
            ControlOp::SwitchView => self.switch_active_view(out),
        }
        if matches!(self.mode, ProgramMode::Edit) {
            self.place_active_cursor(out);
        }
        LoopStatus::Continue
    }

    //---------------------------------------------------------------
    // Modal panes
    //---------------------------------------------------------------

    fn focus_pane(&mut self, key: KeyAction, out: &mut Writer) -> LoopStatus {
        let Some(pane) = self.pane.as_mut() else {
            self.mode = ProgramMode::Edit;
            return LoopStatus::Continue;
        };
        match pane.route_key(key) {
            PaneStatus::Open => {
                pane.update_screen(&self.defaults, out);
            }
            PaneStatus::Closed => self.close_pane(out),
            PaneStatus::Chosen(index) => {
                let target = self
                    .pane_targets
                    .get(index)
                    .cloned()
                    .unwrap_or(PaneTarget::Inert);
                match target {
                    PaneTarget::OpenPath(path) => {
                        self.close_pane(out);
                        let path = path.to_string_lossy().to_string();
                        self.load_file_command(&path, out);
                    }
                    PaneTarget::SwitchBuffer(index) => {
                        self.close_pane(out);
                        self.switch_to_buffer(index, out);
                    }
                    PaneTarget::Inert => {}
                }
            }
        }
        LoopStatus::Continue
    }

    fn open_pane(
        &mut self,
        mode: ProgramMode,
        title: &str,
        lines: Vec<String>,
        targets: Vec<PaneTarget>,
        out: &mut Writer,
    ) {
        let selectable = !targets.is_empty();
        let mut pane = TextPane::new(title, lines, selectable);
        pane.place(self.rows, self.cols);
        pane.update_screen(&self.defaults, out);
        self.pane = Some(pane);
        self.pane_targets = targets;
        self.mode = mode;
    }

    pub(crate) fn open_project_pane(&mut self, out: &mut Writer) {
        match &self.project {
            Some(project) => {
                let files = project.files();
                let lines = files.iter().map(|(label, _)| label.clone()).collect();
                let targets = files
                    .into_iter()
                    .map(|(_, path)| PaneTarget::OpenPath(path))
                    .collect();
                let title = format!("Project: {}", project.name());
                self.open_pane(ProgramMode::ProjectView, &title, lines, targets, out);
            }
            None => self.open_buffer_list_pane(out),
        }
    }

    pub(crate) fn open_buffer_list_pane(&mut self, out: &mut Writer) {
        let mut lines = Vec::new();
        let mut targets = Vec::new();
        for (i, buf) in self.buffers.iter().enumerate() {
            let path = if buf.file_path().is_empty() {
                "[unnamed]"
            } else {
                buf.file_path()
            };
            let marker = if buf.is_touched() { "*" } else { " " };
            lines.push(format!("{marker} {path}"));
            targets.push(PaneTarget::SwitchBuffer(i));
        }
        self.open_pane(ProgramMode::ProjectView, "Buffers", lines, targets, out);
    }

    pub(crate) fn open_help_pane(&mut self, out: &mut Writer) {
        self.open_pane(
            ProgramMode::HelpView,
            "Help",
            help::help_lines(),
            Vec::new(),
            out,
        );
    }

    pub(crate) fn open_build_pane(&mut self, out: &mut Writer) {
        let lines = if self.build.lines().is_empty() {
            vec!["(no build output; run the build command)".to_string()]
        } else {
            self.build.lines().to_vec()
        };
        let title = if self.build.last_target().is_empty() {
            "Build".to_string()
        } else {
            format!("Build: {}", self.build.last_target())
        };
        self.open_pane(ProgramMode::BuildView, &title, lines, Vec::new(), out);
    }

    fn close_pane(&mut self, out: &mut Writer) {
        self.pane = None;
        self.pane_targets.clear();
        self.mode = ProgramMode::Edit;
        self.redraw_all(out);
    }

    //---------------------------------------------------------------
    // Buffer management
    //---------------------------------------------------------------

    /// Save view state (and optionally the file) of the active buffer
    /// before another becomes current.
    fn stash_active_buffer(&mut self, out: &mut Writer) {
        let auto_save = self.defaults.auto_save_on_buffer_change;
        let mut save_error = None;
        let state = self.with_active(|view, buf, _| {
            if auto_save && buf.is_loaded() && buf.is_touched() && !buf.file_path().is_empty() {
                let path = buf.file_path().to_string();
                if let Err(err) = buf.save_text(&path) {
                    save_error = Some(err.to_string());
                }
            }
            (buf.id(), view.view_state())
        });
        self.view_states.insert(state.0, state.1);
        if let Some(err) = save_error {
            self.message(&format!("(auto-save failed: {err})"), out);
        }
    }

    /// Make `index` the active view's buffer: stash the old one,
    /// demand-load the new one, restore its remembered view state.
    pub(crate) fn switch_to_buffer(&mut self, index: usize, out: &mut Writer) {
        if self.buffers.at(index).is_none() {
            return;
        }
        self.stash_active_buffer(out);
        self.buffers.set_current(index);
        if self.active_bottom {
            if let Some(slot) = self.bottom.as_mut() {
                slot.buffer = index;
            }
        } else {
            self.top.buffer = index;
        }

        let mut load_error = None;
        if let Some(buf) = self.buffers.at_mut(index)
            && let Err(err) = buf.ensure_loaded()
        {
            load_error = Some(err.to_string());
        }

        let saved = self
            .buffers
            .at(index)
            .and_then(|b| self.view_states.get(&b.id()).copied());
        self.with_active(|view, buf, defaults| {
            view.attach_buffer(buf, defaults);
            if let Some(state) = saved {
                view.restore_view_state(state, buf.number_of_lines());
            }
            view.reframe_and_update(buf, defaults, out);
            view.place_cursor(buf, out);
        });
        let path = self
            .buffers
            .at(index)
            .map(|b| b.file_path().to_string())
            .unwrap_or_default();
        if let Some(err) = load_error {
            self.message(&format!("({err})"), out);
        } else {
            self.message(&format!("(buffer: {})", display_name(&path)), out);
        }
        debug!(target: "editor", buffer = %path, "switched buffer");
    }

    pub(crate) fn next_buffer(&mut self, out: &mut Writer) {
        if self.buffers.len() < 2 {
            self.message("(no other buffer)", out);
            return;
        }
        let next = (self.active_buffer_index() + 1) % self.buffers.len();
        self.switch_to_buffer(next, out);
    }

    pub(crate) fn previous_buffer(&mut self, out: &mut Writer) {
        if self.buffers.len() < 2 {
            self.message("(no other buffer)", out);
            return;
        }
        let len = self.buffers.len();
        let prev = (self.active_buffer_index() + len - 1) % len;
        self.switch_to_buffer(prev, out);
    }

    /// Startup-time open of the command-line file argument.
    pub fn load_file_startup(&mut self, path: &str, out: &mut Writer) {
        self.load_new_file(path, true, out);
    }

    /// Open `path` into a buffer and make it current: existing buffer
    /// by exact path wins, otherwise a new buffer loads now.
    pub(crate) fn load_new_file(&mut self, path: &str, preload: bool, out: &mut Writer) -> bool {
        if let Some(index) = self.buffers.find_by_path(path) {
            self.switch_to_buffer(index, out);
            return true;
        }
        let mut buf = EditBuffer::new();
        buf.set_tab_width(self.defaults.tab_size);
        if let Err(err) = buf.load_text(path, preload) {
            self.message(&format!("({err})"), out);
            return false;
        }
        self.adopt_new_buffer(buf, out);
        info!(target: "editor", path, "opened file");
        true
    }

    /// Insert a freshly built buffer, make it the active view's, and
    /// paint it.
    pub(crate) fn adopt_new_buffer(&mut self, buf: EditBuffer, out: &mut Writer) {
        self.stash_active_buffer(out);
        self.buffers.insert(buf);
        let index = self.buffers.current_index().unwrap_or(0);
        if self.active_bottom {
            if let Some(slot) = self.bottom.as_mut() {
                slot.buffer = index;
            }
        } else {
            self.top.buffer = index;
        }
        self.with_active(|view, buf, defaults| {
            view.attach_buffer(buf, defaults);
            view.reframe_and_update(buf, defaults, out);
            view.place_cursor(buf, out);
        });
    }

    //---------------------------------------------------------------
    // Split mode
    //---------------------------------------------------------------

    pub(crate) fn split(&mut self, out: &mut Writer) {
        if self.bottom.is_some() {
            self.message("(already split)", out);
            return;
        }
        let buffer = self.top.buffer;
        let mut view = EditView::new(&self.defaults);
        let line_count = self
            .buffers
            .at(buffer)
            .map(|b| b.number_of_lines())
            .unwrap_or(1);
        // Rows: top band, divider, bottom band, status, command line.
        let divider = (self.rows.saturating_sub(2)) / 2;
        self.top.view.place_region(0, divider, self.cols, line_count);
        self.top.view.set_suppress_status(true);
        view.place_region(
            divider + 1,
            self.rows.saturating_sub(2),
            self.cols,
            line_count,
        );
        self.bottom = Some(ViewSlot { view, buffer });
        self.divider_row = Some(divider);
        self.active_bottom = false;
        self.redraw_all(out);
        self.message("(split)", out);
    }

    pub(crate) fn unsplit(&mut self, out: &mut Writer) {
        if self.bottom.is_none() {
            self.message("(not split)", out);
            return;
        }
        if self.active_bottom {
            let index = self.active_buffer_index();
            self.top.buffer = index;
            self.buffers.set_current(index);
        }
        self.bottom = None;
        self.divider_row = None;
        self.active_bottom = false;
        let line_count = self
            .buffers
            .at(self.top.buffer)
            .map(|b| b.number_of_lines())
            .unwrap_or(1);
        self.top.view.set_suppress_status(false);
        self.top.view.place_full(self.rows, self.cols, line_count);
        self.redraw_all(out);
        self.message("(unsplit)", out);
    }

    pub(crate) fn switch_active_view(&mut self, out: &mut Writer) {
        if self.bottom.is_none() {
            return;
        }
        self.active_bottom = !self.active_bottom;
        self.buffers.set_current(self.active_buffer_index());
        self.place_active_cursor(out);
    }

    fn paint_divider(&self, out: &mut Writer) {
        let Some(row) = self.divider_row else { return };
        out.move_to(0, row as u16);
        let bar: String = std::iter::repeat_n('─', self.cols).collect();
        out.print(format!(
            "{}{}{bar}{}",
            self.defaults.status_bar_text,
            self.defaults.status_bar_background,
            cm_config::RESET
        ));
        out.clear_to_eol();
    }

    //---------------------------------------------------------------
    // Whole-screen painting
    //---------------------------------------------------------------

    pub fn redraw_all(&mut self, out: &mut Writer) {
        out.clear_all();
        match self.mode {
            ProgramMode::ProjectView | ProgramMode::HelpView | ProgramMode::BuildView => {
                if let Some(pane) = &self.pane {
                    pane.update_screen(&self.defaults, out);
                }
            }
            ProgramMode::Edit | ProgramMode::CommandLine => {
                let top_buffer = self.top.buffer;
                if let Some(buf) = self.buffers.at(top_buffer) {
                    self.top.view.update_screen(buf, &self.defaults, out);
                }
                if let Some(slot) = &self.bottom
                    && let Some(buf) = self.buffers.at(slot.buffer)
                {
                    slot.view.update_screen(buf, &self.defaults, out);
                }
                self.paint_divider(out);
                self.command_line.update_screen(out);
                if matches!(self.mode, ProgramMode::CommandLine) {
                    self.command_line.place_cursor(out);
                } else {
                    self.place_active_cursor(out);
                }
            }
        }
    }

    pub fn resize(&mut self, rows: usize, cols: usize, out: &mut Writer) {
        self.rows = rows.max(4);
        self.cols = cols.max(20);
        let top_lines = self
            .buffers
            .at(self.top.buffer)
            .map(|b| b.number_of_lines())
            .unwrap_or(1);
        if self.bottom.is_some() {
            let divider = (self.rows.saturating_sub(2)) / 2;
            self.top
                .view
                .place_region(0, divider, self.cols, top_lines);
            self.divider_row = Some(divider);
            let bottom_last = self.rows.saturating_sub(2);
            if let Some(slot) = self.bottom.as_mut() {
                let lines = self
                    .buffers
                    .at(slot.buffer)
                    .map(|b| b.number_of_lines())
                    .unwrap_or(1);
                slot.view
                    .place_region(divider + 1, bottom_last, self.cols, lines);
            }
        } else {
            self.top.view.place_full(self.rows, self.cols, top_lines);
        }
        self.command_line.place(self.rows - 1, self.cols);
        if let Some(pane) = self.pane.as_mut() {
            pane.place(self.rows, self.cols);
        }
        self.redraw_all(out);
    }

    //---------------------------------------------------------------
    // Agent bridge servicing
    //---------------------------------------------------------------

    /// Between keystrokes: process at most one pending bridge request
    /// and absorb connect/disconnect edges. Returns whether anything
    /// was handled.
    pub fn service_bridge(&mut self, handle: &cm_bridge::BridgeHandle, out: &mut Writer) -> bool {
        let mut handled = false;
        if let Some(pending) = handle.try_take_request() {
            let response = self.execute_bridge_request(&pending.request, out);
            // A worker that died mid-request drops the receiver; the
            // editor carries on.
            let _ = pending.reply.send(response);
            handled = true;
        }
        if handle.take_redraw() {
            self.agent_connected = handle.is_connected();
            let connected = self.agent_connected;
            self.with_active(|view, buf, defaults| {
                view.set_agent_connected(connected);
                view.update_status_line(buf, defaults, out);
                view.place_cursor(buf, out);
            });
            handled = true;
        }
        handled
    }
}

/// Final path component for messages.
fn display_name(path: &str) -> &str {
    if path.is_empty() {
        "[unnamed]"
    } else {
        path.rsplit('/').next().unwrap_or(path)
    }
}
