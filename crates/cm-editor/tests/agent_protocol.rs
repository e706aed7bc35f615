//! Bridge request execution against a live editor: every wire
//! command, buffer resolution, and the error records.

use cm_bridge::BridgeRequest;
use cm_config::ProgramDefaults;
use cm_editor::ScreenEditor;
use cm_view::Writer;
use serde_json::{Value, json};
use tempfile::TempDir;

fn editor_with_file(name: &str, content: &str) -> (ScreenEditor, TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    let path = path.to_str().unwrap().to_string();

    let mut ed = ScreenEditor::new(ProgramDefaults::default(), 24, 80);
    ed.load_file_startup(&path, &mut Writer::new());
    (ed, dir, path)
}

fn request(line: &str) -> BridgeRequest {
    serde_json::from_str(line).unwrap()
}

fn execute(ed: &mut ScreenEditor, line: &str) -> cm_bridge::BridgeResponse {
    ed.execute_bridge_request(&request(line), &mut Writer::new())
}

#[test]
fn insert_lines_matches_the_wire_contract() {
    let (mut ed, _dir, _path) =
        editor_with_file("main.c", "int main() {\n    return 0;\n}\n");
    let resp = execute(
        &mut ed,
        r#"{"id":7,"cmd":"insert_lines","args":{"buffer_id":"main.c","before_line":3,"text":"// hello\n"}}"#,
    );
    assert_eq!(resp.id, 7);
    assert!(resp.ok);
    assert_eq!(
        resp.data,
        Some(Value::String("inserted 1 lines before line 3".to_string()))
    );

    let index = ed.buffers().resolve("main.c").unwrap();
    let buf = ed.buffers().at(index).unwrap();
    assert_eq!(buf.line(2).as_str(), "// hello");
    assert_eq!(buf.line(3).as_str(), "}");
    assert!(buf.is_touched());
}

#[test]
fn buffer_resolution_prefers_exact_then_suffix() {
    let (mut ed, _dir, path) = editor_with_file("view.c", "content\n");
    // Exact path.
    let resp = execute(
        &mut ed,
        &format!(r#"{{"id":1,"cmd":"get_buffer","args":{{"buffer_id":"{path}"}}}}"#),
    );
    assert!(resp.ok);
    // Suffix on the final component.
    let resp = execute(
        &mut ed,
        r#"{"id":2,"cmd":"get_buffer","args":{"buffer_id":"view.c"}}"#,
    );
    assert!(resp.ok);
    assert_eq!(resp.data, Some(Value::String("content\n".to_string())));
    // Unknown buffer.
    let resp = execute(
        &mut ed,
        r#"{"id":3,"cmd":"get_buffer","args":{"buffer_id":"ghost.c"}}"#,
    );
    assert!(!resp.ok);
    assert_eq!(resp.error.as_deref(), Some("buffer not found: ghost.c"));
}

#[test]
fn oversized_get_buffer_is_rejected_with_guidance() {
    let big = "x".repeat(11_000);
    let (mut ed, _dir, _path) = editor_with_file("big.txt", &big);
    let resp = execute(
        &mut ed,
        r#"{"id":4,"cmd":"get_buffer","args":{"buffer_id":"big.txt"}}"#,
    );
    assert!(!resp.ok);
    let error = resp.error.unwrap();
    assert!(error.starts_with("buffer too large"));
    assert!(error.contains("get_buffer_range"));
}

#[test]
fn get_buffer_range_clamps_and_validates() {
    let (mut ed, _dir, _path) = editor_with_file("r.txt", "a\nb\nc\nd");
    let resp = execute(
        &mut ed,
        r#"{"id":5,"cmd":"get_buffer_range","args":{"buffer_id":"r.txt","start_line":2,"end_line":3}}"#,
    );
    assert_eq!(resp.data, Some(Value::String("b\nc".to_string())));

    // End past the buffer clamps.
    let resp = execute(
        &mut ed,
        r#"{"id":6,"cmd":"get_buffer_range","args":{"buffer_id":"r.txt","start_line":3,"end_line":99}}"#,
    );
    assert_eq!(resp.data, Some(Value::String("c\nd".to_string())));

    // Start past the buffer errors.
    let resp = execute(
        &mut ed,
        r#"{"id":7,"cmd":"get_buffer_range","args":{"buffer_id":"r.txt","start_line":99,"end_line":99}}"#,
    );
    assert_eq!(resp.error.as_deref(), Some("start line out of range"));
}

#[test]
fn replace_range_swaps_whole_lines() {
    let (mut ed, _dir, _path) = editor_with_file("w.txt", "one\ntwo\nthree\nfour");
    let resp = execute(
        &mut ed,
        r#"{"id":8,"cmd":"replace_range","args":{"buffer_id":"w.txt","start_line":2,"end_line":3,"new_text":"TWO\nTHREE"}}"#,
    );
    assert!(resp.ok);
    assert_eq!(
        resp.data,
        Some(Value::String("replaced lines 2-3".to_string()))
    );
    let index = ed.buffers().resolve("w.txt").unwrap();
    let buf = ed.buffers().at(index).unwrap();
    assert_eq!(buf.flatten(), "one\nTWO\nTHREE\nfour");
}

#[test]
fn delete_lines_removes_the_range() {
    let (mut ed, _dir, _path) = editor_with_file("d.txt", "one\ntwo\nthree\nfour");
    let resp = execute(
        &mut ed,
        r#"{"id":9,"cmd":"delete_lines","args":{"buffer_id":"d.txt","start_line":2,"end_line":3}}"#,
    );
    assert!(resp.ok);
    let index = ed.buffers().resolve("d.txt").unwrap();
    assert_eq!(ed.buffers().at(index).unwrap().flatten(), "one\nfour");
}

#[test]
fn find_in_buffer_supports_regex_and_case_folding() {
    let (mut ed, _dir, _path) =
        editor_with_file("f.txt", "alpha\nBeta match\nbeta again\ngamma");
    let resp = execute(
        &mut ed,
        r#"{"id":10,"cmd":"find_in_buffer","args":{"buffer_id":"f.txt","pattern":"beta","is_regex":false,"case_insensitive":true}}"#,
    );
    let hits = resp.data.unwrap();
    assert_eq!(
        hits,
        json!([
            {"line": 2, "text": "Beta match"},
            {"line": 3, "text": "beta again"},
        ])
    );

    let resp = execute(
        &mut ed,
        r#"{"id":11,"cmd":"find_in_buffer","args":{"buffer_id":"f.txt","pattern":"^g.*a$","is_regex":true,"case_insensitive":false}}"#,
    );
    assert_eq!(resp.data, Some(json!([{"line": 4, "text": "gamma"}])));

    let resp = execute(
        &mut ed,
        r#"{"id":12,"cmd":"find_in_buffer","args":{"buffer_id":"f.txt","pattern":"(unclosed","is_regex":true}}"#,
    );
    assert!(!resp.ok);
    assert!(resp.error.unwrap().starts_with("invalid regex"));
}

#[test]
fn find_and_replace_honors_max_replacements() {
    let (mut ed, _dir, _path) = editor_with_file("fr.txt", "x x\nx x\nx");
    let resp = execute(
        &mut ed,
        r#"{"id":13,"cmd":"find_and_replace","args":{"buffer_id":"fr.txt","pattern":"x","replacement":"y","max_replacements":3}}"#,
    );
    assert_eq!(
        resp.data,
        Some(json!({"replacements": 3, "message": "replaced 3 occurrences"}))
    );
    let index = ed.buffers().resolve("fr.txt").unwrap();
    assert_eq!(ed.buffers().at(index).unwrap().flatten(), "y y\ny x\nx");
}

#[test]
fn get_cursor_and_goto_line_use_one_based_wire_numbers() {
    let (mut ed, _dir, path) = editor_with_file("c.txt", "a\nb\nc\nd\ne");
    let resp = execute(
        &mut ed,
        &format!(r#"{{"id":14,"cmd":"goto_line","args":{{"buffer_id":"{path}","line":4}}}}"#),
    );
    assert!(resp.ok);
    assert_eq!(resp.data, Some(Value::String("moved to line 4".to_string())));

    let resp = execute(&mut ed, r#"{"id":15,"cmd":"get_cursor","args":{}}"#);
    let data = resp.data.unwrap();
    assert_eq!(data["line"], 4);
    assert_eq!(data["col"], 1);
    assert_eq!(data["buffer_id"], Value::String(path));
}

#[test]
fn goto_line_rejects_inactive_buffers() {
    let (mut ed, dir, _path) = editor_with_file("active.txt", "a\n");
    let other = dir.path().join("other.txt");
    std::fs::write(&other, "b\n").unwrap();
    execute(
        &mut ed,
        &format!(
            r#"{{"id":16,"cmd":"open_file","args":{{"path":"{}"}}}}"#,
            other.to_str().unwrap()
        ),
    );
    // other.txt is now active; active.txt is not.
    let resp = execute(
        &mut ed,
        r#"{"id":17,"cmd":"goto_line","args":{"buffer_id":"active.txt","line":1}}"#,
    );
    assert!(!resp.ok);
    assert_eq!(resp.error.as_deref(), Some("buffer is not the active buffer"));
}

#[test]
fn open_file_switches_to_already_open_buffers() {
    let (mut ed, _dir, path) = editor_with_file("again.txt", "hi\n");
    let resp = execute(
        &mut ed,
        &format!(r#"{{"id":18,"cmd":"open_file","args":{{"path":"{path}"}}}}"#),
    );
    assert!(resp.ok);
    assert_eq!(
        resp.data,
        Some(Value::String(format!("switched to {path}")))
    );
    // Opening something that is not there fails cleanly.
    let resp = execute(
        &mut ed,
        r#"{"id":19,"cmd":"open_file","args":{"path":"/no/such/file.c"}}"#,
    );
    assert!(!resp.ok);
    assert!(resp.error.unwrap().starts_with("file not found"));
}

#[test]
fn save_buffer_writes_and_clears_modified() {
    let (mut ed, _dir, path) = editor_with_file("s.txt", "before");
    execute(
        &mut ed,
        r#"{"id":20,"cmd":"replace_range","args":{"buffer_id":"s.txt","start_line":1,"end_line":1,"new_text":"after"}}"#,
    );
    let resp = execute(
        &mut ed,
        r#"{"id":21,"cmd":"save_buffer","args":{"buffer_id":"s.txt"}}"#,
    );
    assert!(resp.ok);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "after");

    let resp = execute(&mut ed, r#"{"id":22,"cmd":"list_buffers","args":{}}"#);
    let list = resp.data.unwrap();
    let entry = list
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["path"].as_str().unwrap().ends_with("s.txt"))
        .unwrap();
    assert_eq!(entry["modified"], Value::Bool(false));
}

#[test]
fn unknown_commands_answer_with_an_error_record() {
    let (mut ed, _dir, _path) = editor_with_file("u.txt", "x");
    let resp = execute(&mut ed, r#"{"id":23,"cmd":"frobnicate","args":{}}"#);
    assert_eq!(resp.id, 23);
    assert!(!resp.ok);
    assert_eq!(resp.error.as_deref(), Some("unknown command: frobnicate"));
}
