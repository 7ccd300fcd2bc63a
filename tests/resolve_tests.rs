use docjson::{resolve_paths, Document, Mode};

#[test]
fn resolve_paths_turns_literals_into_live_pointers() {
    let mut doc = Document::from_string(
        r#"{"db": {"primary": "postgres"}, "alias": "$cppon-path:/db/primary"}"#,
        Mode::Full,
    )
    .unwrap();
    let report = resolve_paths(&mut doc, false).unwrap();
    assert_eq!(report.resolved, 1);

    let alias = doc.get("/alias").unwrap();
    assert_eq!(doc.as_str(alias).unwrap(), "postgres");
}

#[test]
fn resolve_paths_is_idempotent_once_pointers_exist() {
    let mut doc = Document::from_string(r#"{"a": 1, "b": "$cppon-path:/a"}"#, Mode::Full).unwrap();
    let first = resolve_paths(&mut doc, false).unwrap();
    let second = resolve_paths(&mut doc, false).unwrap();
    assert_eq!(first.resolved, 1);
    assert_eq!(second.resolved, 0);
}

#[test]
fn strict_resolve_fails_on_unresolvable_path() {
    let mut doc = Document::from_string(r#"{"b": "$cppon-path:/missing"}"#, Mode::Full).unwrap();
    assert!(resolve_paths(&mut doc, true).is_err());
}
