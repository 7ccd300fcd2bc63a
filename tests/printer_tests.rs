use docjson::{Document, Mode, PrinterOptions};

#[test]
fn compact_is_default_and_has_no_whitespace() {
    let doc = Document::from_string(r#"{"a": [1, 2, 3]}"#, Mode::Full).unwrap();
    let out = doc.to_string_with(&PrinterOptions::compact()).unwrap();
    assert_eq!(out, r#"{"a":[1,2,3]}"#);
}

#[test]
fn pretty_layout_from_json_shorthand() {
    let mut options = PrinterOptions::default();
    let parsed: PrinterOptions = serde_json::from_str(r#"{"layout": "pretty"}"#).unwrap();
    options.layout = parsed.layout;
    let doc = Document::from_string(r#"{"a": 1}"#, Mode::Full).unwrap();
    let out = doc.to_string_with(&options).unwrap();
    assert!(out.starts_with('{'));
    assert!(out.contains('\n'));
}

#[test]
fn round_trips_plain_json_through_parse_and_print() {
    let source = r#"{"a":1,"b":[true,false,null],"c":"text"}"#;
    let doc = Document::from_string(source, Mode::Full).unwrap();
    let printed = doc.to_string_with(&PrinterOptions::compact()).unwrap();
    assert_eq!(printed, source);
}

#[test]
fn strings_with_control_characters_are_escaped() {
    let mut doc = Document::empty();
    let id = doc.get_or_create("/a").unwrap();
    doc.set(id, docjson::Scalar::String("line\nbreak\ttab".into())).unwrap();
    let out = doc.to_string_with(&PrinterOptions::compact()).unwrap();
    assert_eq!(out, r#"{"a":"line\nbreak\ttab"}"#);
}
