use crate::span::Span;

/// An internal, generation-less arena index. Only ever stored inside
/// `Value::Array`/`Value::Object`/`Value::Pointer` — never handed to a
/// caller. `Document` is the only place that turns an `Idx` into the
/// public, generation-checked `NodeId` (and back).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Idx(pub u32);

/// A single JSON-family value. See SPEC_FULL.md §3.1.
///
/// `Array`/`Object` hold arena indices rather than nested `Value`s: the
/// tree is stored as a flat arena owned by the enclosing `Document`,
/// which is what lets `Pointer` be a plain index instead of a raw
/// reference into the tree.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    /// Digits + optional sign/exponent/decimal, not yet converted.
    NumberLazy(Span),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    StringView(Span),
    StringOwned(String),
    Array(Vec<Idx>),
    /// Insertion-order member list. Lookup is linear, which is the
    /// right tradeoff for the small, human-authored documents this
    /// engine targets; last-wins de-duplication happens on insert.
    Object(Vec<(String, Idx)>),
    Blob(Vec<u8>),
    /// Lazy Base64 payload; decoded in place into `Blob` by `get_blob`.
    BlobString(Span),
    Path(String),
    Pointer(Idx),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::NumberLazy(_) => "number-lazy",
            Value::Int64(_) => "int64",
            Value::UInt64(_) => "uint64",
            Value::Double(_) => "double",
            Value::StringView(_) => "string-view",
            Value::StringOwned(_) => "string-owned",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Blob(_) => "blob",
            Value::BlobString(_) => "blob-string",
            Value::Path(_) => "path",
            Value::Pointer(_) => "pointer",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_string_like(&self) -> bool {
        matches!(self, Value::StringView(_) | Value::StringOwned(_))
    }
}
