use docjson::{get_blob, CastAccess, Document, Mode, Scalar, StrictAccess};

#[test]
fn strict_access_rejects_cross_kind_reads() {
    let mut doc = Document::empty();
    let id = doc.get_or_create("/a").unwrap();
    doc.set(id, Scalar::String("five".into())).unwrap();
    let strict: Result<i64, _> = StrictAccess::<i64>::get_strict(&doc, id);
    assert!(strict.is_err());
}

#[test]
fn cast_access_converts_numbers_to_strings() {
    let mut doc = Document::empty();
    let id = doc.get_or_create("/a").unwrap();
    doc.set(id, Scalar::Int64(42)).unwrap();
    let text: String = CastAccess::<String>::get_cast(&doc, id).unwrap();
    assert_eq!(text, "42");
}

#[test]
fn quick_mode_number_still_readable_via_strict_i64() {
    let doc = Document::from_string("7", Mode::Quick).unwrap();
    let value: i64 = StrictAccess::<i64>::get_strict(&doc, doc.root()).unwrap();
    assert_eq!(value, 7);
}

#[test]
fn blob_decodes_round_trip() {
    let mut doc = Document::empty();
    let id = doc.get_or_create("/payload").unwrap();
    doc.set(id, Scalar::Blob(b"hello".to_vec())).unwrap();
    assert_eq!(get_blob(&mut doc, id).unwrap(), b"hello");
}

#[test]
fn blob_string_sentinel_decodes_lazily() {
    let mut doc = Document::from_string(r#""$cppon-blob:aGVsbG8=""#, Mode::Full).unwrap();
    let root = doc.root();
    assert_eq!(get_blob(&mut doc, root).unwrap(), b"hello");
}

#[test]
fn blob_string_is_mutated_in_place_after_decode() {
    let mut doc = Document::from_string(r#"{"b":"$cppon-blob:aGVsbG8="}"#, Mode::Full).unwrap();
    let b = doc.get("/b").unwrap();
    get_blob(&mut doc, b).unwrap();
    assert_eq!(doc.kind(b).unwrap(), "blob");
}
