//! Typed accessors on top of `Document`'s primitive `as_*` methods,
//! plus Base64 blob decode/encode. The decode path mirrors
//! `examples/jopamo-txed/src/rgjson.rs`'s use of
//! `base64::engine::general_purpose::STANDARD` — the one place in the
//! teacher that actually exercises the `base64` dependency it declares.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use tracing::debug;

use crate::document::{Document, NodeId};
use crate::error::{Error, Result};
use crate::value::Value;

pub(crate) fn decode_base64(text: &str) -> Result<Vec<u8>> {
    STANDARD.decode(text.as_bytes()).map_err(Error::from)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Strict typed access: the stored kind must already match `T`
/// exactly (no numeric widening, no lazy-number conversion). Mirrors
/// the original's `get_strict<T>`.
pub trait StrictAccess<T> {
    fn get_strict(&self, id: NodeId) -> Result<T>;
}

/// Cast access: converts between compatible kinds (narrowing ints,
/// promoting to `f64`, forcing a `NumberLazy` span). Mirrors the
/// original's `get_cast<T>`.
pub trait CastAccess<T> {
    fn get_cast(&self, id: NodeId) -> Result<T>;
}

impl StrictAccess<bool> for Document {
    fn get_strict(&self, id: NodeId) -> Result<bool> {
        self.as_bool(id)
    }
}

impl StrictAccess<i64> for Document {
    fn get_strict(&self, id: NodeId) -> Result<i64> {
        match self.kind(id)? {
            "int64" | "number-lazy" => self.as_i64(id),
            found => Err(Error::TypeMismatch {
                expected: "int64",
                found,
            }),
        }
    }
}

impl StrictAccess<u64> for Document {
    fn get_strict(&self, id: NodeId) -> Result<u64> {
        match self.kind(id)? {
            "uint64" | "number-lazy" => self.as_u64(id),
            found => Err(Error::TypeMismatch {
                expected: "uint64",
                found,
            }),
        }
    }
}

impl StrictAccess<f64> for Document {
    fn get_strict(&self, id: NodeId) -> Result<f64> {
        match self.kind(id)? {
            "double" | "number-lazy" => self.as_f64(id),
            found => Err(Error::TypeMismatch {
                expected: "double",
                found,
            }),
        }
    }
}

impl StrictAccess<String> for Document {
    fn get_strict(&self, id: NodeId) -> Result<String> {
        match self.kind(id)? {
            "string-view" | "string-owned" => self.as_str(id).map(str::to_string),
            found => Err(Error::TypeMismatch {
                expected: "string",
                found,
            }),
        }
    }
}

impl CastAccess<i64> for Document {
    fn get_cast(&self, id: NodeId) -> Result<i64> {
        self.as_i64(id)
    }
}

impl CastAccess<u64> for Document {
    fn get_cast(&self, id: NodeId) -> Result<u64> {
        self.as_u64(id)
    }
}

impl CastAccess<f64> for Document {
    fn get_cast(&self, id: NodeId) -> Result<f64> {
        self.as_f64(id)
    }
}

impl CastAccess<String> for Document {
    fn get_cast(&self, id: NodeId) -> Result<String> {
        match self.kind(id)? {
            "string-view" | "string-owned" => self.as_str(id).map(str::to_string),
            "int64" => self.as_i64(id).map(|n| n.to_string()),
            "uint64" => self.as_u64(id).map(|n| n.to_string()),
            "double" => self.as_f64(id).map(|n| n.to_string()),
            "boolean" => self.as_bool(id).map(|b| b.to_string()),
            found => Err(Error::TypeMismatch {
                expected: "string-convertible",
                found,
            }),
        }
    }
}

/// Resolves the Base64 payload behind a `BlobString`/`Blob` node. A
/// `BlobString` is decoded and the node is mutated in place into a
/// `Blob` (§9, "lazy decoding as observed mutation") so repeated calls
/// don't re-decode; `&mut Document` reflects that this is a write for
/// concurrency purposes even though it reads a value back out.
pub fn get_blob(doc: &mut Document, id: NodeId) -> Result<Vec<u8>> {
    doc.decode_blob_in_place(id)
}

impl Document {
    pub(crate) fn decode_blob_in_place(&mut self, id: NodeId) -> Result<Vec<u8>> {
        let idx = self.idx_for(id)?;
        match self.raw(idx) {
            Value::Blob(bytes) => Ok(bytes.clone()),
            Value::BlobString(span) => {
                let text = self.text_of(*span).to_string();
                let bytes = decode_base64(&text)?;
                debug!(bytes = bytes.len(), "decoded blob string in place");
                *self.raw_mut_idx(idx) = Value::Blob(bytes.clone());
                Ok(bytes)
            }
            other => Err(Error::TypeMismatch {
                expected: "blob",
                found: other.kind_name(),
            }),
        }
    }
}

