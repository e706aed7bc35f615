use cm_buffer::{EditBuffer, Position};
use tempfile::tempdir;

#[test]
fn save_then_load_round_trips_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roundtrip.txt");
    let path = path.to_str().unwrap();

    let text = "first line\n\tindented\n\nlast line";
    let mut buf = EditBuffer::from_text(text);
    buf.save_text(path).unwrap();
    assert!(!buf.is_touched());

    let mut reloaded = EditBuffer::new();
    reloaded.load_text(path, true).unwrap();
    assert_eq!(reloaded.flatten(), text);
    assert!(!reloaded.is_touched());
    assert_eq!(reloaded.file_path(), path);
}

#[test]
fn deferred_load_reads_on_first_demand() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("deferred.txt");
    std::fs::write(&path, "lazy\ncontent").unwrap();
    let path = path.to_str().unwrap();

    let mut buf = EditBuffer::new();
    buf.load_text(path, false).unwrap();
    assert!(!buf.is_loaded());
    // Nothing read yet: still the single empty line of a fresh buffer.
    assert_eq!(buf.number_of_lines(), 1);

    buf.ensure_loaded().unwrap();
    assert!(buf.is_loaded());
    assert_eq!(buf.flatten(), "lazy\ncontent");
}

#[test]
fn load_failure_reports_and_leaves_buffer_intact() {
    let mut buf = EditBuffer::from_text("untouched");
    let err = buf.load_text("/no/such/directory/file.txt", true);
    assert!(err.is_err());
    assert_eq!(buf.line(0).as_str(), "untouched");
}

#[test]
fn save_failure_keeps_touched_set() {
    let mut buf = EditBuffer::new();
    buf.insert_char('x');
    assert!(buf.is_touched());
    let err = buf.save_text("/no/such/directory/file.txt");
    assert!(err.is_err());
    assert!(buf.is_touched());
}

#[test]
fn save_adopts_new_path() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");

    let mut buf = EditBuffer::from_text("content");
    buf.save_text(a.to_str().unwrap()).unwrap();
    buf.goto_position(Position::new(0, 7));
    buf.insert_char('!');
    buf.save_text(b.to_str().unwrap()).unwrap();

    assert_eq!(buf.file_path(), b.to_str().unwrap());
    assert_eq!(std::fs::read_to_string(&a).unwrap(), "content");
    assert_eq!(std::fs::read_to_string(&b).unwrap(), "content!");
}
