use cm_config::ProgramDefaults;
use tempfile::tempdir;

#[test]
fn first_run_writes_and_loads_bootstrap() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".cmrc");
    assert!(!path.exists());

    let defaults = ProgramDefaults::load_or_bootstrap(&path).unwrap();
    assert!(path.exists());
    assert_eq!(defaults.tab_size, 4);
    assert!(defaults.colorize_syntax);

    // Second load reads the file that was just written.
    let again = ProgramDefaults::load_or_bootstrap(&path).unwrap();
    assert_eq!(again.tab_size, defaults.tab_size);
    assert_eq!(again.status_bar_text, defaults.status_bar_text);
}

#[test]
fn user_overrides_survive_partial_configs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".cmrc");
    std::fs::write(
        &path,
        "# mine\n{\"tabs\": 8, \"jumpscroll\": false, \"colors\": {\"lineNumberTextColor\": \"ANSI:CYAN\"}}",
    )
    .unwrap();

    let defaults = ProgramDefaults::load(&path).unwrap();
    assert_eq!(defaults.tab_size, 8);
    assert!(!defaults.jump_scroll);
    assert!(!defaults.line_number_text.is_empty());
    // Slots absent from the file stay unstyled rather than erroring.
    assert!(defaults.status_bar_text.is_empty());
}

#[test]
fn malformed_json_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".cmrc");
    std::fs::write(&path, "{not json").unwrap();
    assert!(ProgramDefaults::load(&path).is_err());
}
