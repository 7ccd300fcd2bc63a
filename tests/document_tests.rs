use docjson::{Document, Mode, Scalar};

#[test]
fn navigates_nested_arrays_and_objects() {
    let doc = Document::from_string(
        r#"{"users": [{"name": "ivy"}, {"name": "joe"}]}"#,
        Mode::Full,
    )
    .unwrap();
    let name = doc.get("/users/1/name").unwrap();
    assert_eq!(doc.as_str(name).unwrap(), "joe");
}

#[test]
fn progressive_navigation_matches_absolute_path() {
    let doc = Document::from_string(r#"{"users": {"guest": {"name": "Guest"}}}"#, Mode::Full).unwrap();
    let users = doc.get("/users").unwrap();
    let guest = doc.get_from(users, "guest").unwrap();
    let name = doc.get_from(guest, "name").unwrap();
    assert_eq!(doc.as_str(name).unwrap(), "Guest");
    assert_eq!(name, doc.get("/users/guest/name").unwrap());
}

#[test]
fn absolute_path_from_a_nested_base_ignores_the_base() {
    let doc = Document::from_string(r#"{"a": 1, "users": {"guest": {"name": "Guest"}}}"#, Mode::Full).unwrap();
    let guest = doc.get("/users/guest").unwrap();
    let a = doc.get_from(guest, "/a").unwrap();
    assert_eq!(doc.as_i64(a).unwrap(), 1);
}

#[test]
fn write_autovivifies_through_missing_objects() {
    let mut doc = Document::empty();
    let id = doc.get_or_create("/a/b/c").unwrap();
    doc.set(id, Scalar::Int64(9)).unwrap();
    assert_eq!(doc.as_i64(doc.get("/a/b/c").unwrap()).unwrap(), 9);
}

#[test]
fn generation_changes_invalidate_old_handles_on_rematerialize() {
    let mut doc = Document::from_string(r#"{"a": 1}"#, Mode::Full).unwrap();
    let old = doc.get("/a").unwrap();
    doc.rematerialize(&docjson::PrinterOptions::compact()).unwrap();
    assert!(doc.as_i64(old).is_err());
    assert_eq!(doc.as_i64(doc.get("/a").unwrap()).unwrap(), 1);
}

#[test]
fn index_out_of_range_reports_len() {
    let doc = Document::from_string(r#"[1, 2, 3]"#, Mode::Full).unwrap();
    let err = doc.get("/5").unwrap_err();
    assert!(err.to_string().contains("out of range"));
}

#[test]
fn path_not_found_on_missing_key() {
    let doc = Document::from_string(r#"{"a": 1}"#, Mode::Full).unwrap();
    assert!(doc.get("/missing").is_err());
}

#[test]
fn appending_one_past_array_end_extends_it() {
    let mut doc = Document::from_string(r#"{"arr":[1,2,3]}"#, Mode::Full).unwrap();
    let id = doc.get_or_create("/arr/3").unwrap();
    doc.set(id, Scalar::Int64(4)).unwrap();
    let out = doc.to_string_with(&docjson::PrinterOptions::compact()).unwrap();
    assert!(out.contains(r#""arr":[1,2,3,4]"#));
}

#[test]
fn sub_document_serialization_is_independent_of_position() {
    let doc = Document::from_string(r#"{"img": {"format": "png", "width": 10}}"#, Mode::Full).unwrap();
    let img = doc.get("/img").unwrap();
    let text = doc.to_string_from(img, &docjson::PrinterOptions::compact()).unwrap();
    assert_eq!(text, r#"{"format":"png","width":10}"#);
}
