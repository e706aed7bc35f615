//! Drive the editor the way the main loop does: one key at a time,
//! observing mode transitions, painted output, and buffer state.

use cm_config::ProgramDefaults;
use cm_editor::{LoopStatus, ProgramMode, ScreenEditor};
use cm_input::KeyAction;
use cm_view::Writer;

fn editor() -> ScreenEditor {
    let mut defaults = ProgramDefaults::default();
    defaults.jump_scroll = false;
    ScreenEditor::new(defaults, 24, 80)
}

/// Feed one key; return the loop status and the painted ANSI.
fn key(ed: &mut ScreenEditor, k: KeyAction) -> (LoopStatus, String) {
    let mut out = Writer::new();
    let status = ed.handle_key(k, &mut out);
    (status, out.to_ansi())
}

fn type_str(ed: &mut ScreenEditor, s: &str) {
    for c in s.chars() {
        if c == '\n' {
            key(ed, KeyAction::Enter);
        } else {
            key(ed, KeyAction::Char(c));
        }
    }
}

#[test]
fn escape_toggles_between_edit_and_commandline() {
    let mut ed = editor();
    assert_eq!(ed.mode, ProgramMode::Edit);
    key(&mut ed, KeyAction::Esc);
    assert_eq!(ed.mode, ProgramMode::CommandLine);
    // First key after entering is the hint key; escape cancels.
    key(&mut ed, KeyAction::Esc);
    assert_eq!(ed.mode, ProgramMode::Edit);
}

#[test]
fn modal_views_open_and_close_on_escape() {
    let mut ed = editor();
    key(&mut ed, KeyAction::Ctrl('P'));
    assert_eq!(ed.mode, ProgramMode::ProjectView);
    key(&mut ed, KeyAction::Esc);
    assert_eq!(ed.mode, ProgramMode::Edit);

    key(&mut ed, KeyAction::Ctrl('_'));
    assert_eq!(ed.mode, ProgramMode::HelpView);
    key(&mut ed, KeyAction::Esc);
    assert_eq!(ed.mode, ProgramMode::Edit);

    key(&mut ed, KeyAction::Ctrl('B'));
    assert_eq!(ed.mode, ProgramMode::BuildView);
    key(&mut ed, KeyAction::Esc);
    assert_eq!(ed.mode, ProgramMode::Edit);
}

#[test]
fn ctrl_x_prefix_dispatches_quit() {
    let mut ed = editor();
    let (status, _) = key(&mut ed, KeyAction::Ctrl('X'));
    assert_eq!(status, LoopStatus::Continue);
    let (status, _) = key(&mut ed, KeyAction::Ctrl('C'));
    assert_eq!(status, LoopStatus::Quit);
}

#[test]
fn unknown_ctrl_x_combination_is_ignored() {
    let mut ed = editor();
    key(&mut ed, KeyAction::Ctrl('X'));
    let (status, _) = key(&mut ed, KeyAction::Ctrl('Z'));
    assert_eq!(status, LoopStatus::Continue);
    assert_eq!(ed.mode, ProgramMode::Edit);
    // The prefix is consumed; a later C-C alone must not quit.
    let (status, _) = key(&mut ed, KeyAction::Ctrl('C'));
    assert_eq!(status, LoopStatus::Continue);
}

#[test]
fn typing_lands_in_the_buffer() {
    let mut ed = editor();
    type_str(&mut ed, "abc\n def");
    let buf = ed.buffers().current().unwrap();
    assert_eq!(buf.number_of_lines(), 2);
    assert_eq!(buf.line(0).as_str(), "abc");
    assert_eq!(buf.line(1).as_str(), " def");
    assert_eq!(buf.cursor.row, 1);
    assert_eq!(buf.cursor.col, 4);
}

#[test]
fn goto_line_hint_flow() {
    let mut ed = editor();
    type_str(&mut ed, "one\ntwo\nthree");
    key(&mut ed, KeyAction::Esc);
    // Hint: 'g' auto-types "goto-line: ".
    let (_, ansi) = key(&mut ed, KeyAction::Char('g'));
    assert!(ansi.contains("goto-line: "));
    key(&mut ed, KeyAction::Char('2'));
    let (_, ansi) = key(&mut ed, KeyAction::Enter);
    assert_eq!(ed.mode, ProgramMode::Edit);
    assert!(ansi.contains("(goto-line 2)"));
    assert_eq!(ed.buffers().current().unwrap().cursor.row, 1);
}

#[test]
fn find_then_find_again_steps_through_matches() {
    let mut ed = editor();
    type_str(&mut ed, "foo bar baz foo");
    // Back to the start, then find.
    key(&mut ed, KeyAction::Esc);
    key(&mut ed, KeyAction::Char('g'));
    type_str(&mut ed, "1");
    key(&mut ed, KeyAction::Enter);

    key(&mut ed, KeyAction::Esc);
    key(&mut ed, KeyAction::Char('f'));
    type_str(&mut ed, "foo");
    let (_, ansi) = key(&mut ed, KeyAction::Enter);
    assert!(ansi.contains("(found at line 1)"));
    assert_eq!(ed.buffers().current().unwrap().cursor.col, 0);

    key(&mut ed, KeyAction::Ctrl('F'));
    assert_eq!(ed.buffers().current().unwrap().cursor.col, 12);
    let (_, ansi) = key(&mut ed, KeyAction::Ctrl('F'));
    assert!(ansi.contains("(not found: foo)"));
}

#[test]
fn replace_keeps_the_two_step_contract() {
    let mut ed = editor();
    type_str(&mut ed, "aa bb aa");
    key(&mut ed, KeyAction::Esc);
    key(&mut ed, KeyAction::Char('g'));
    type_str(&mut ed, "1");
    key(&mut ed, KeyAction::Enter);

    // find: aa puts the cursor on the first match.
    key(&mut ed, KeyAction::Esc);
    key(&mut ed, KeyAction::Char('f'));
    type_str(&mut ed, "aa");
    key(&mut ed, KeyAction::Enter);

    // replace: XX replaces in place, then steps to the next match.
    key(&mut ed, KeyAction::Esc);
    key(&mut ed, KeyAction::Char('r'));
    type_str(&mut ed, "XX");
    let (_, ansi) = key(&mut ed, KeyAction::Enter);
    assert!(ansi.contains("(replaced)"));
    let buf = ed.buffers().current().unwrap();
    assert_eq!(buf.line(0).as_str(), "XX bb aa");
    assert_eq!(buf.cursor.col, 6, "stepped to the next match");

    // C-R replaces again at the new match.
    key(&mut ed, KeyAction::Ctrl('R'));
    assert_eq!(ed.buffers().current().unwrap().line(0).as_str(), "XX bb XX");

    // Off-match C-R only advances (nothing left to find here).
    let (_, ansi) = key(&mut ed, KeyAction::Ctrl('R'));
    assert!(ansi.contains("(no more matches)"));
}

#[test]
fn mark_hint_executes_immediately() {
    let mut ed = editor();
    type_str(&mut ed, "abcdef");
    key(&mut ed, KeyAction::Esc);
    let (_, ansi) = key(&mut ed, KeyAction::Char(' '));
    assert_eq!(ed.mode, ProgramMode::Edit);
    assert!(ansi.contains("(mark set)"));
    assert!(ed.buffers().current().unwrap().mark().is_some());
}

#[test]
fn mark_cut_paste_round_trip_through_commands() {
    let mut ed = editor();
    type_str(&mut ed, "hello world");
    // Mark at end, move home, cut, paste back.
    key(&mut ed, KeyAction::Esc);
    key(&mut ed, KeyAction::Char('m'));
    key(&mut ed, KeyAction::Home);
    let (_, ansi) = key(&mut ed, KeyAction::Ctrl('W'));
    assert!(ansi.contains("(text cut)"));
    assert_eq!(ed.buffers().current().unwrap().line(0).as_str(), "");
    key(&mut ed, KeyAction::Ctrl('Y'));
    assert_eq!(
        ed.buffers().current().unwrap().line(0).as_str(),
        "hello world"
    );
}

#[test]
fn kill_line_chord_cuts_to_end_of_line() {
    let mut ed = editor();
    type_str(&mut ed, "head tail");
    key(&mut ed, KeyAction::Home);
    for _ in 0..4 {
        key(&mut ed, KeyAction::Right);
    }
    key(&mut ed, KeyAction::Ctrl('K'));
    assert_eq!(ed.buffers().current().unwrap().line(0).as_str(), "head");
}

#[test]
fn completion_proposes_shared_prefix_then_full_name() {
    let mut ed = editor();
    key(&mut ed, KeyAction::Esc);
    // 'b' is not a hint key: typed literally.
    key(&mut ed, KeyAction::Char('b'));
    let (_, ansi) = key(&mut ed, KeyAction::Tab);
    assert!(ansi.contains("buffer-"), "proposes the shared prefix");
    key(&mut ed, KeyAction::Char('l'));
    let (_, ansi) = key(&mut ed, KeyAction::Tab);
    assert!(ansi.contains("buffer-list"), "completes uniquely");
}

#[test]
fn symbol_commands_use_the_child_completer() {
    let mut ed = editor();
    // Acronym through the box table: bc resolves to box-cross.
    key(&mut ed, KeyAction::Esc);
    key(&mut ed, KeyAction::Backspace);
    type_str(&mut ed, "utf-box bc");
    let (_, ansi) = key(&mut ed, KeyAction::Enter);
    assert!(ansi.contains("(inserted box-cross)"));
    assert_eq!(ed.buffers().current().unwrap().line(0).as_str(), "┼");

    // TAB completes a bare tail over the symbol table.
    key(&mut ed, KeyAction::Esc);
    key(&mut ed, KeyAction::Backspace);
    type_str(&mut ed, "utf-symbol bull");
    let (_, ansi) = key(&mut ed, KeyAction::Tab);
    assert!(ansi.contains("sym-bullet"));
    key(&mut ed, KeyAction::Enter);
    assert!(
        ed.buffers()
            .current()
            .unwrap()
            .line(0)
            .as_str()
            .contains('•')
    );
}

#[test]
fn wc_command_reports_counts() {
    let mut ed = editor();
    type_str(&mut ed, "one\ntwo");
    key(&mut ed, KeyAction::Esc);
    type_str(&mut ed, "wc");
    let (_, ansi) = key(&mut ed, KeyAction::Enter);
    assert!(ansi.contains("(lines: 2, characters: 7)"));
}

#[test]
fn unknown_command_reports_and_stays_running() {
    let mut ed = editor();
    key(&mut ed, KeyAction::Esc);
    type_str(&mut ed, "xyzzy");
    let (status, ansi) = key(&mut ed, KeyAction::Enter);
    assert_eq!(status, LoopStatus::Continue);
    assert!(ansi.contains("(unknown command: xyzzy)"));
    assert_eq!(ed.mode, ProgramMode::Edit);
}

#[test]
fn quit_hint_and_command_quit() {
    let mut ed = editor();
    key(&mut ed, KeyAction::Esc);
    key(&mut ed, KeyAction::Char('q'));
    let (status, _) = key(&mut ed, KeyAction::Enter);
    assert_eq!(status, LoopStatus::Quit);
}

#[test]
fn acronym_commits_like_the_full_name() {
    let mut ed = editor();
    type_str(&mut ed, "one\ntwo\nthree");
    key(&mut ed, KeyAction::Esc);
    // Swallow the hint window ('g' would auto-type), then commit the
    // acronym form directly.
    key(&mut ed, KeyAction::Backspace);
    type_str(&mut ed, "gl 1");
    key(&mut ed, KeyAction::Enter);
    assert_eq!(ed.buffers().current().unwrap().cursor.row, 0);
}

#[test]
fn split_and_unsplit_commands() {
    let mut ed = editor();
    type_str(&mut ed, "shared");
    key(&mut ed, KeyAction::Esc);
    // "split" starts with the save hint letter; swallow the hint
    // window first.
    key(&mut ed, KeyAction::Backspace);
    type_str(&mut ed, "split");
    let (_, ansi) = key(&mut ed, KeyAction::Enter);
    assert!(ansi.contains("(split)"));
    // Switch views, then back to one.
    key(&mut ed, KeyAction::Ctrl('O'));
    key(&mut ed, KeyAction::Esc);
    key(&mut ed, KeyAction::Backspace);
    type_str(&mut ed, "unsplit");
    let (_, ansi) = key(&mut ed, KeyAction::Enter);
    assert!(ansi.contains("(unsplit)"));
}

#[test]
fn buffer_switching_persists_view_state() {
    use std::io::Write as _;
    let dir = tempfile::tempdir().unwrap();
    let long: String = (0..200)
        .map(|i| format!("line {i}\n"))
        .collect();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    std::fs::File::create(&a)
        .unwrap()
        .write_all(long.as_bytes())
        .unwrap();
    std::fs::write(&b, "short\n").unwrap();

    let mut ed = editor();
    ed.load_file_startup(a.to_str().unwrap(), &mut Writer::new());
    // Scroll deep into a.txt.
    key(&mut ed, KeyAction::Esc);
    key(&mut ed, KeyAction::Char('g'));
    type_str(&mut ed, "150");
    key(&mut ed, KeyAction::Enter);
    let row_before = ed.buffers().current().unwrap().cursor.row;
    assert_eq!(row_before, 149);

    ed.load_file_startup(b.to_str().unwrap(), &mut Writer::new());
    assert!(ed.buffers().current().unwrap().file_path().ends_with("b.txt"));

    // Back to a.txt: the remembered scroll state still shows line 150.
    key(&mut ed, KeyAction::Ctrl('N'));
    let mut found = false;
    for _ in 0..ed.buffers().len() {
        if ed.buffers().current().unwrap().file_path().ends_with("a.txt") {
            found = true;
            break;
        }
        key(&mut ed, KeyAction::Ctrl('N'));
    }
    assert!(found);
    let mut out = Writer::new();
    ed.redraw_all(&mut out);
    assert!(out.to_ansi().contains("line 149"));
}
