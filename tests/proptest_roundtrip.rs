use docjson::{Document, PrinterOptions, Scalar};
use proptest::prelude::*;

fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}"
}

proptest! {
    /// Writing an integer at an arbitrary absolute path and reading it
    /// back from a freshly constructed document always yields the same
    /// value, regardless of how deep the autovivified path is.
    #[test]
    fn write_then_read_is_stable(segments in proptest::collection::vec(segment_strategy(), 1..5), value in any::<i64>()) {
        let path = format!("/{}", segments.join("/"));
        let mut doc = Document::empty();
        let id = doc.get_or_create(&path).unwrap();
        doc.set(id, Scalar::Int64(value)).unwrap();
        prop_assert_eq!(doc.as_i64(doc.get(&path).unwrap()).unwrap(), value);
    }

    /// Printing a document built purely from scalar path assignments and
    /// re-parsing it must reproduce the same values at the same paths.
    #[test]
    fn print_then_reparse_preserves_values(
        segments in proptest::collection::vec(segment_strategy(), 1..4),
        value in any::<i32>(),
    ) {
        let path = format!("/{}", segments.join("/"));
        let mut doc = Document::empty();
        let id = doc.get_or_create(&path).unwrap();
        doc.set(id, Scalar::Int64(value as i64)).unwrap();
        let printed = doc.to_string_with(&PrinterOptions::compact()).unwrap();

        let reparsed = Document::from_string(printed, docjson::Mode::Full).unwrap();
        prop_assert_eq!(reparsed.as_i64(reparsed.get(&path).unwrap()).unwrap(), value as i64);
    }
}
