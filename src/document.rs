use std::fs;
use std::path::Path;

use tracing::{instrument, trace};

use crate::error::{Error, Result};
use crate::parser::{self, Mode};
use crate::path;
use crate::options::PrinterOptions;
use crate::printer;
use crate::span::Span;
use crate::value::{Idx, Value};

/// A generation-checked handle into a `Document`'s arena.
///
/// Stands in for the original's non-owning pointer Values: cheap to
/// copy, cheap to compare, but — unlike a raw pointer — a `NodeId`
/// minted before a `clear`/`rematerialize`/re-`parse` is caught and
/// rejected rather than silently dereferencing stale data, because the
/// `generation` it carries stops matching the document's current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// An in-memory JSON-family document: an arena of `Value`s plus the
/// owned text buffer that `StringView`/`NumberLazy`/`BlobString` spans
/// are resolved against.
#[derive(Debug)]
pub struct Document {
    arena: Vec<Value>,
    buffer: String,
    generation: u32,
    root: Idx,
    mode: Mode,
}

impl Document {
    /// Empty buffer, root is an empty object — the default-constructed state.
    pub fn empty() -> Self {
        Self {
            arena: vec![Value::Object(Vec::new())],
            buffer: String::new(),
            generation: 0,
            root: Idx(0),
            mode: Mode::Full,
        }
    }

    #[instrument(skip(text))]
    pub fn from_string(text: impl Into<String>, mode: Mode) -> Result<Self> {
        let buffer = text.into();
        if buffer.is_empty() {
            return Ok(Self::empty_with_mode(mode));
        }
        let parsed = parser::parse(&buffer, mode)?;
        trace!(nodes = parsed.arena.len(), "parsed document");
        Ok(Self {
            arena: parsed.arena,
            buffer,
            generation: 0,
            root: parsed.root,
            mode,
        })
    }

    fn empty_with_mode(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::empty()
        }
    }

    pub fn from_file(path: impl AsRef<Path>, mode: Mode) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_string(text, mode)
    }

    /// The raw text this document was parsed from (empty for documents
    /// built purely via `get_or_create`).
    pub fn source(&self) -> &str {
        &self.buffer
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// True iff the buffer is empty and the root is an empty object.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && matches!(self.raw(self.root), Value::Object(members) if members.is_empty())
    }

    pub fn root(&self) -> NodeId {
        self.handle(self.root)
    }

    fn handle(&self, idx: Idx) -> NodeId {
        NodeId {
            index: idx.0,
            generation: self.generation,
        }
    }

    fn idx_of(&self, id: NodeId) -> Result<Idx> {
        if id.generation != self.generation {
            return Err(Error::PathNotFound(
                "node handle belongs to a previous generation of this document".to_string(),
            ));
        }
        Ok(Idx(id.index))
    }

    pub(crate) fn raw(&self, idx: Idx) -> &Value {
        &self.arena[idx.0 as usize]
    }

    /// Resolves a public handle to its arena index, dereferencing any
    /// pointer chain. Used by `access.rs` to reach a node's raw
    /// representation without exposing `Value` itself.
    pub(crate) fn idx_for(&self, id: NodeId) -> Result<Idx> {
        self.deref(self.idx_of(id)?)
    }

    /// Like `idx_for` but does not follow `Pointer` chains — the
    /// printer needs the raw node (which may itself be a `Pointer`) at
    /// the requested root, not its target.
    pub(crate) fn raw_idx(&self, id: NodeId) -> Result<Idx> {
        self.idx_of(id)
    }

    pub(crate) fn root_idx(&self) -> Idx {
        self.root
    }

    pub(crate) fn raw_mut_idx(&mut self, idx: Idx) -> &mut Value {
        self.raw_mut(idx)
    }

    /// Every node reachable from the root through object/array
    /// membership, visited depth-first. Used by `resolve_paths` to
    /// find embedded `Path` literals anywhere in the tree.
    pub(crate) fn structural_node_indices(&self) -> Vec<Idx> {
        let mut out = Vec::new();
        self.collect_indices(self.root, &mut out);
        out
    }

    fn collect_indices(&self, idx: Idx, out: &mut Vec<Idx>) {
        out.push(idx);
        match self.raw(idx) {
            Value::Object(members) => {
                for (_, child) in members {
                    self.collect_indices(*child, out);
                }
            }
            Value::Array(items) => {
                for child in items {
                    self.collect_indices(*child, out);
                }
            }
            _ => {}
        }
    }

    pub(crate) fn path_literal_at(&self, idx: Idx) -> Option<String> {
        match self.raw(idx) {
            Value::Path(p) => Some(p.clone()),
            _ => None,
        }
    }

    /// Resolves `path` from the document root to a raw arena index,
    /// without following any pointer chain at the destination.
    pub(crate) fn idx_from_root_path(&self, path: &str) -> Result<Idx> {
        let segments = path::split_segments(path);
        let mut idx = self.root;
        for segment in &segments {
            idx = self.step(idx, segment)?;
        }
        Ok(idx)
    }

    fn raw_mut(&mut self, idx: Idx) -> &mut Value {
        &mut self.arena[idx.0 as usize]
    }

    fn push(&mut self, value: Value) -> Idx {
        let idx = Idx(self.arena.len() as u32);
        self.arena.push(value);
        idx
    }

    /// Follows `Pointer` nodes until a non-pointer value is reached.
    /// Path navigation and typed accessors both go through this; path
    /// Values themselves are never auto-resolved (§4.4).
    pub(crate) fn deref(&self, mut idx: Idx) -> Result<Idx> {
        let mut hops = 0usize;
        while let Value::Pointer(target) = self.raw(idx) {
            idx = *target;
            hops += 1;
            if hops > self.arena.len() {
                return Err(Error::Range("pointer cycle detected".to_string()));
            }
        }
        Ok(idx)
    }

    pub fn kind(&self, id: NodeId) -> Result<&'static str> {
        let idx = self.deref(self.idx_of(id)?)?;
        Ok(self.raw(idx).kind_name())
    }

    pub(crate) fn text_of(&self, span: Span) -> &str {
        span.resolve(&self.buffer)
    }

    pub fn as_str(&self, id: NodeId) -> Result<&str> {
        let idx = self.deref(self.idx_of(id)?)?;
        match self.raw(idx) {
            Value::StringView(span) => Ok(self.text_of(*span)),
            Value::StringOwned(s) => Ok(s.as_str()),
            other => Err(type_mismatch("string", other)),
        }
    }

    pub fn as_i64(&self, id: NodeId) -> Result<i64> {
        let idx = self.deref(self.idx_of(id)?)?;
        match self.raw(idx) {
            Value::Int64(n) => Ok(*n),
            Value::UInt64(n) => i64::try_from(*n)
                .map_err(|_| Error::Range(format!("{n} does not fit in i64"))),
            Value::NumberLazy(span) => parser::eager_number(self.text_of(*span))
                .and_then(|v| self.coerce_i64(v)),
            other => Err(type_mismatch("int64", other)),
        }
    }

    fn coerce_i64(&self, v: Value) -> Result<i64> {
        match v {
            Value::Int64(n) => Ok(n),
            Value::UInt64(n) => {
                i64::try_from(n).map_err(|_| Error::Range(format!("{n} does not fit in i64")))
            }
            Value::Double(d) => Err(Error::Range(format!("{d} has no exact int64 representation"))),
            _ => unreachable!("eager_number only returns numeric variants"),
        }
    }

    pub fn as_u64(&self, id: NodeId) -> Result<u64> {
        let idx = self.deref(self.idx_of(id)?)?;
        match self.raw(idx) {
            Value::UInt64(n) => Ok(*n),
            Value::Int64(n) => {
                u64::try_from(*n).map_err(|_| Error::Range(format!("{n} does not fit in u64")))
            }
            Value::NumberLazy(span) => match parser::eager_number(self.text_of(*span))? {
                Value::UInt64(n) => Ok(n),
                Value::Int64(n) => {
                    u64::try_from(n).map_err(|_| Error::Range(format!("{n} does not fit in u64")))
                }
                other => Err(type_mismatch("uint64", &other)),
            },
            other => Err(type_mismatch("uint64", other)),
        }
    }

    pub fn as_f64(&self, id: NodeId) -> Result<f64> {
        let idx = self.deref(self.idx_of(id)?)?;
        match self.raw(idx) {
            Value::Double(d) => Ok(*d),
            Value::Int64(n) => Ok(*n as f64),
            Value::UInt64(n) => Ok(*n as f64),
            Value::NumberLazy(span) => match parser::eager_number(self.text_of(*span))? {
                Value::Double(d) => Ok(d),
                Value::Int64(n) => Ok(n as f64),
                Value::UInt64(n) => Ok(n as f64),
                other => Err(type_mismatch("double", &other)),
            },
            other => Err(type_mismatch("double", other)),
        }
    }

    pub fn as_bool(&self, id: NodeId) -> Result<bool> {
        let idx = self.deref(self.idx_of(id)?)?;
        match self.raw(idx) {
            Value::Boolean(b) => Ok(*b),
            other => Err(type_mismatch("boolean", other)),
        }
    }

    pub fn is_null(&self, id: NodeId) -> Result<bool> {
        let idx = self.deref(self.idx_of(id)?)?;
        Ok(self.raw(idx).is_null())
    }

    pub fn array_len(&self, id: NodeId) -> Result<usize> {
        let idx = self.deref(self.idx_of(id)?)?;
        match self.raw(idx) {
            Value::Array(items) => Ok(items.len()),
            other => Err(type_mismatch("array", other)),
        }
    }

    pub fn array_get(&self, id: NodeId, index: usize) -> Result<NodeId> {
        let idx = self.deref(self.idx_of(id)?)?;
        match self.raw(idx) {
            Value::Array(items) => items
                .get(index)
                .map(|child| self.handle(*child))
                .ok_or(Error::IndexOutOfRange {
                    index,
                    len: items.len(),
                }),
            other => Err(type_mismatch("array", other)),
        }
    }

    pub fn array_iter(&self, id: NodeId) -> Result<impl Iterator<Item = NodeId> + '_> {
        let idx = self.deref(self.idx_of(id)?)?;
        match self.raw(idx) {
            Value::Array(items) => Ok(items.iter().map(move |child| self.handle(*child))),
            other => Err(type_mismatch("array", other)),
        }
    }

    pub fn object_keys(&self, id: NodeId) -> Result<impl Iterator<Item = &str> + '_> {
        let idx = self.deref(self.idx_of(id)?)?;
        match self.raw(idx) {
            Value::Object(members) => Ok(members.iter().map(|(k, _)| k.as_str())),
            other => Err(type_mismatch("object", other)),
        }
    }

    pub fn object_get(&self, id: NodeId, key: &str) -> Result<NodeId> {
        let idx = self.deref(self.idx_of(id)?)?;
        match self.raw(idx) {
            Value::Object(members) => members
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, child)| self.handle(*child))
                .ok_or_else(|| Error::PathNotFound(key.to_string())),
            other => Err(type_mismatch("object", other)),
        }
    }

    /// Reads a path from the document root. Never autovivifies; fails
    /// with `PathNotFound`/`IndexOutOfRange` on a missing segment.
    pub fn get(&self, path: &str) -> Result<NodeId> {
        self.get_from(self.root(), path)
    }

    /// Reads a path relative to `base` (which may itself be a
    /// `Pointer`, dereferenced before the first segment is applied). A
    /// leading `/` makes the path absolute: it is resolved from the
    /// document root instead of `base` (§4.3).
    pub fn get_from(&self, base: NodeId, path: &str) -> Result<NodeId> {
        let segments = path::split_segments(path);
        let start = if path::is_absolute(path) { self.root } else { self.idx_of(base)? };
        let mut idx = self.deref(start)?;
        for segment in &segments {
            idx = self.step(idx, segment)?;
            idx = self.deref(idx)?;
        }
        Ok(self.handle(idx))
    }

    fn step(&self, idx: Idx, segment: &str) -> Result<Idx> {
        match self.raw(idx) {
            Value::Object(members) => members
                .iter()
                .find(|(k, _)| k == segment)
                .map(|(_, child)| *child)
                .ok_or_else(|| Error::PathNotFound(segment.to_string())),
            Value::Array(items) => {
                let i = path::as_index(segment)
                    .ok_or_else(|| Error::PathNotFound(segment.to_string()))?;
                items.get(i).copied().ok_or(Error::IndexOutOfRange {
                    index: i,
                    len: items.len(),
                })
            }
            other => Err(type_mismatch("object or array", other)),
        }
    }

    /// Writes a path from the root, autovivifying missing objects,
    /// arrays, and array slots along the way (§4.4).
    pub fn get_or_create(&mut self, path: &str) -> Result<NodeId> {
        let root = self.root;
        let idx = self.get_or_create_idx(root, path)?;
        Ok(self.handle(idx))
    }

    /// Writes a path relative to `base`. A leading `/` makes the path
    /// absolute, resolved (and autovivified) from the document root
    /// instead of `base` (§4.3).
    pub fn get_or_create_from(&mut self, base: NodeId, path: &str) -> Result<NodeId> {
        let start = if path::is_absolute(path) {
            self.root
        } else {
            self.idx_of(base)?
        };
        let idx = self.get_or_create_idx(start, path)?;
        Ok(self.handle(idx))
    }

    fn get_or_create_idx(&mut self, base: Idx, path: &str) -> Result<Idx> {
        let segments = path::split_segments(path);
        let mut idx = self.deref(base)?;
        for segment in &segments {
            idx = self.step_or_create(idx, segment)?;
            idx = self.deref(idx)?;
        }
        Ok(idx)
    }

    /// Autovivification rule: a `Null` node becomes an object (or an
    /// array, if the segment parses as an index) on first write;
    /// anything else must already be a compatible container.
    fn step_or_create(&mut self, idx: Idx, segment: &str) -> Result<Idx> {
        if matches!(self.raw(idx), Value::Null) {
            if path::as_index(segment).is_some() {
                *self.raw_mut(idx) = Value::Array(Vec::new());
            } else {
                *self.raw_mut(idx) = Value::Object(Vec::new());
            }
        }
        match self.raw(idx) {
            Value::Object(_) => self.object_step_or_create(idx, segment),
            Value::Array(_) => self.array_step_or_create(idx, segment),
            other => Err(type_mismatch("object or array", other)),
        }
    }

    fn object_step_or_create(&mut self, idx: Idx, segment: &str) -> Result<Idx> {
        if let Value::Object(members) = self.raw(idx) {
            if let Some((_, child)) = members.iter().find(|(k, _)| k == segment) {
                return Ok(*child);
            }
        }
        let child = self.push(Value::Null);
        if let Value::Object(members) = self.raw_mut(idx) {
            members.push((segment.to_string(), child));
        }
        Ok(child)
    }

    /// Array write traversal per §4.3: `i < size` descends into the
    /// existing element; `i == size` appends one null and descends
    /// into it (ordinary append). `i > size` also appends exactly one
    /// null and descends into it rather than filling the gap up to
    /// `i` — there is no sparse growth on write.
    fn array_step_or_create(&mut self, idx: Idx, segment: &str) -> Result<Idx> {
        let i = path::as_index(segment).ok_or_else(|| {
            Error::PathNotFound(format!("`{segment}` is not a valid array index"))
        })?;
        if let Value::Array(items) = self.raw(idx) {
            if i < items.len() {
                return Ok(items[i]);
            }
        }
        let child = self.push(Value::Null);
        if let Value::Array(items) = self.raw_mut(idx) {
            items.push(child);
        }
        Ok(child)
    }

    /// Overwrites the value at `id` in place (the node keeps its
    /// identity — any existing pointer to it now sees the new value).
    pub fn set(&mut self, id: NodeId, value: Scalar) -> Result<()> {
        let idx = self.idx_of(id)?;
        *self.raw_mut(idx) = value.into_value();
        Ok(())
    }

    /// Turns the node at `id` into a `Pointer` aimed at `target`. Both
    /// handles must belong to this document's current generation.
    pub fn set_pointer(&mut self, id: NodeId, target: NodeId) -> Result<()> {
        let idx = self.idx_of(id)?;
        let target_idx = self.idx_of(target)?;
        *self.raw_mut(idx) = Value::Pointer(target_idx);
        Ok(())
    }

    pub fn push_array_item(&mut self, id: NodeId, value: Scalar) -> Result<NodeId> {
        let idx = self.deref(self.idx_of(id)?)?;
        let child = self.push(value.into_value());
        match self.raw_mut(idx) {
            Value::Array(items) => {
                items.push(child);
                Ok(self.handle(child))
            }
            other => Err(type_mismatch("array", other)),
        }
    }

    /// Atomically replaces the buffer and root with a fresh parse of
    /// `text`. Parses into a scratch arena first and only swaps it in
    /// on success, so a failed `eval` leaves the document in its prior
    /// state. An empty `text` yields an empty object and an empty
    /// buffer, same as `Document::empty()`.
    #[instrument(skip(self, text))]
    pub fn eval(&mut self, text: impl Into<String>, mode: Mode) -> Result<()> {
        let buffer = text.into();
        if buffer.is_empty() {
            self.arena = vec![Value::Object(Vec::new())];
            self.buffer = buffer;
            self.root = Idx(0);
            self.mode = mode;
            self.generation += 1;
            return Ok(());
        }
        let parsed = parser::parse(&buffer, mode)?;
        trace!(nodes = parsed.arena.len(), "evaluated document");
        self.arena = parsed.arena;
        self.buffer = buffer;
        self.root = parsed.root;
        self.mode = mode;
        self.generation += 1;
        Ok(())
    }

    /// Resets the document to an empty object and bumps the
    /// generation, invalidating every `NodeId` minted so far.
    pub fn clear(&mut self) {
        self.arena = vec![Value::Object(Vec::new())];
        self.buffer.clear();
        self.root = Idx(0);
        self.generation += 1;
    }

    /// Prints the document, then re-parses that text into a fresh
    /// arena — the one operation that can turn `Pointer`/`Path` nodes
    /// produced by sharing back into a self-contained tree. Bumps the
    /// generation; every previously minted `NodeId` becomes invalid.
    #[instrument(skip(self, options))]
    pub fn rematerialize(&mut self, options: &PrinterOptions) -> Result<()> {
        let printed = printer::print(self, self.root(), options)?;
        let parsed = parser::parse(&printed, self.mode)?;
        self.arena = parsed.arena;
        self.buffer = printed;
        self.root = parsed.root;
        self.generation += 1;
        Ok(())
    }

    /// Serializes the whole document.
    pub fn to_string_with(&self, options: &PrinterOptions) -> Result<String> {
        printer::print(self, self.root(), options)
    }

    /// Serializes only the sub-tree rooted at `id`, independent of its
    /// position in the full document (§6, "partial serialization").
    pub fn to_string_from(&self, id: NodeId, options: &PrinterOptions) -> Result<String> {
        printer::print(self, id, options)
    }
}

/// A value ready to be written into a document via `Document::set` /
/// `push_array_item` — the write-side counterpart of the typed read
/// accessors, kept distinct from `Value` so callers never construct
/// `Array`/`Object`/`Pointer` variants (which hold internal arena
/// indices) directly.
#[derive(Debug, Clone)]
pub enum Scalar {
    Null,
    Boolean(bool),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    String(String),
    Blob(Vec<u8>),
}

impl Scalar {
    fn into_value(self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Boolean(b) => Value::Boolean(b),
            Scalar::Int64(n) => Value::Int64(n),
            Scalar::UInt64(n) => Value::UInt64(n),
            Scalar::Double(d) => Value::Double(d),
            Scalar::String(s) => Value::StringOwned(s),
            Scalar::Blob(b) => Value::Blob(b),
        }
    }
}

fn type_mismatch(expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        expected,
        found: found.kind_name(),
    }
}
