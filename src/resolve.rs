//! Converts embedded `$cppon-path:` literals into live `Pointer` nodes,
//! document-wide. Grounded on `original_source/examples/paths_example.cpp`,
//! where path literals written during construction are turned into
//! navigable references by a single explicit pass rather than being
//! resolved automatically on read (path Values are never auto-resolved
//! during ordinary indexing — see SPEC_FULL.md §4.4).

use crate::document::Document;
use crate::error::{Error, Result};
use crate::value::Value;

/// Outcome of a `resolve_paths` pass.
#[derive(Debug, Clone, Default)]
pub struct ResolveReport {
    pub resolved: usize,
    /// Path literals that did not resolve to any node in the document;
    /// left untouched as `Path` values rather than failing the whole
    /// pass. Always empty when `resolve_paths` was called with
    /// `strict: true` (the pass fails on the first such literal instead).
    pub unresolved: Vec<String>,
}

/// Walks the document converting `Path` literals into live `Pointer`
/// nodes. `strict` selects one of the two policies named in §4.6:
/// non-strict collects unresolvable paths into `ResolveReport::unresolved`
/// and keeps going; strict fails fast with `Error::PathNotFound` on the
/// first one, leaving already-resolved pointers from earlier in this
/// same call in place (resolution is a per-node replacement, not
/// transactional across the whole pass).
pub fn resolve_paths(doc: &mut Document, strict: bool) -> Result<ResolveReport> {
    let mut report = ResolveReport::default();
    for idx in doc.structural_node_indices() {
        let Some(path) = doc.path_literal_at(idx) else {
            continue;
        };
        match doc.idx_from_root_path(&path) {
            Ok(target) => {
                *doc.raw_mut_idx(idx) = Value::Pointer(target);
                report.resolved += 1;
            }
            Err(_) if strict => return Err(Error::PathNotFound(path)),
            Err(_) => report.unresolved.push(path),
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Scalar;
    use crate::parser::Mode;

    #[test]
    fn resolves_embedded_path_literal_into_pointer() {
        let mut doc =
            Document::from_string(r#"{"a": 1, "b": "$cppon-path:/a"}"#, Mode::Full).unwrap();
        let report = resolve_paths(&mut doc, false).unwrap();
        assert_eq!(report.resolved, 1);
        assert!(report.unresolved.is_empty());
        let b = doc.get("/b").unwrap();
        assert_eq!(doc.as_i64(b).unwrap(), 1);
    }

    #[test]
    fn records_unresolvable_path_without_failing_the_pass() {
        let mut doc = Document::from_string(r#"{"b": "$cppon-path:/missing"}"#, Mode::Full).unwrap();
        let report = resolve_paths(&mut doc, false).unwrap();
        assert_eq!(report.resolved, 0);
        assert_eq!(report.unresolved, vec!["/missing".to_string()]);
    }

    #[test]
    fn leaves_non_path_values_untouched() {
        let mut doc = Document::empty();
        let id = doc.get_or_create("/a").unwrap();
        doc.set(id, Scalar::Int64(1)).unwrap();
        let report = resolve_paths(&mut doc, false).unwrap();
        assert_eq!(report.resolved, 0);
    }

    #[test]
    fn strict_mode_fails_fast_on_unresolvable_path() {
        let mut doc = Document::from_string(r#"{"b": "$cppon-path:/missing"}"#, Mode::Full).unwrap();
        let err = resolve_paths(&mut doc, true).unwrap_err();
        assert!(matches!(err, crate::error::Error::PathNotFound(p) if p == "/missing"));
    }
}
