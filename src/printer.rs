//! Serializes a `Document` back to text, per SPEC_FULL.md §6: compact
//! or pretty layout, strict-JSON vs native extension sentinels, and
//! cycle/shared-node handling via path back-references.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::access::encode_base64;
use crate::document::{Document, NodeId};
use crate::error::Result;
use crate::options::{BufferHint, PrinterOptions, Style};
use crate::path;
use crate::value::{Idx, Value};

/// Rough average bytes a printed node contributes (a short key, punctuation,
/// and a small scalar) — used only to pre-size the output buffer when
/// `buffer: "reserve"` is requested; an under- or over-estimate just costs
/// a reallocation or a few wasted bytes, never correctness.
const BYTES_PER_NODE_ESTIMATE: usize = 12;

pub fn print(doc: &Document, root: NodeId, options: &PrinterOptions) -> Result<String> {
    let paths = canonical_paths(doc);
    let mut printer = Printer {
        doc,
        options,
        paths,
        first_seen: HashMap::new(),
        ancestors: Vec::new(),
        out: String::new(),
    };
    if options.buffer == BufferHint::Reserve {
        printer.out.reserve(doc.node_count() * BYTES_PER_NODE_ESTIMATE);
    }
    let start = doc.raw_idx(root)?;
    printer.write_value(start, 0)?;
    Ok(printer.out)
}

/// Maps every node reachable from the document root through ordinary
/// object/array membership to the path that reaches it — computed
/// once, up front, so that a `Pointer` encountered anywhere in the
/// print walk can resolve its target's path without caring whether
/// that target has been printed yet. Pointer edges are not followed
/// when building this map: a pointer's target always owns its own
/// structural slot elsewhere in the tree, which this walk visits on
/// its own.
fn canonical_paths(doc: &Document) -> HashMap<u32, String> {
    let mut paths = HashMap::new();
    walk_structure(doc, doc.root_idx(), String::new(), &mut paths);
    paths
}

fn walk_structure(doc: &Document, idx: Idx, current: String, paths: &mut HashMap<u32, String>) {
    paths.entry(idx.0).or_insert_with(|| current.clone());
    match doc.raw(idx) {
        Value::Object(members) => {
            for (key, child) in members {
                walk_structure(doc, *child, join(&current, &path::escape_segment(key)), paths);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                walk_structure(doc, *child, join(&current, &i.to_string()), paths);
            }
        }
        _ => {}
    }
}

fn join(base: &str, segment: &str) -> String {
    format!("{base}/{segment}")
}

fn root_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

struct Printer<'a> {
    doc: &'a Document,
    options: &'a PrinterOptions,
    paths: HashMap<u32, String>,
    /// Nodes already inlined once, and the path they were inlined at.
    /// Consulted when `flatten` (or strict `json`, which implies the
    /// same behaviour for pointer targets) is on.
    first_seen: HashMap<u32, String>,
    /// Indices currently open on the recursion stack — a `Pointer`
    /// resolving to one of these is a cycle and must always print as
    /// a path sentinel, regardless of layout flags.
    ancestors: Vec<u32>,
    out: String,
}

impl<'a> Printer<'a> {
    fn pretty(&self) -> bool {
        self.options.layout.style == Style::Pretty
    }

    fn indent(&mut self, depth: usize) {
        if self.pretty() {
            self.out.push('\n');
            for _ in 0..depth {
                self.out.push_str("  ");
            }
        }
    }

    fn write_value(&mut self, idx: Idx, depth: usize) -> Result<()> {
        match self.doc.raw(idx).clone() {
            Value::Null => self.out.push_str("null"),
            Value::Boolean(b) => self.out.push_str(if b { "true" } else { "false" }),
            Value::Int64(n) => {
                let _ = write!(self.out, "{n}");
            }
            Value::UInt64(n) => {
                let _ = write!(self.out, "{n}");
            }
            Value::Double(d) => {
                let _ = write!(self.out, "{}", format_double(d));
            }
            Value::NumberLazy(span) => self.out.push_str(self.doc.text_of(span)),
            Value::StringView(span) => write_json_string(&mut self.out, self.doc.text_of(span)),
            Value::StringOwned(ref s) => write_json_string(&mut self.out, s),
            Value::Blob(ref bytes) => {
                write_json_string(&mut self.out, &format!("$cppon-blob:{}", encode_base64(bytes)))
            }
            Value::BlobString(span) => {
                write_json_string(&mut self.out, &format!("$cppon-blob:{}", self.doc.text_of(span)))
            }
            Value::Path(ref p) => write_json_string(&mut self.out, &format!("$cppon-path:{p}")),
            Value::Array(ref items) => self.write_array(items, depth)?,
            Value::Object(ref members) => self.write_object(members, depth)?,
            Value::Pointer(target) => self.write_pointer(idx, target, depth)?,
        }
        Ok(())
    }

    fn write_array(&mut self, items: &[Idx], depth: usize) -> Result<()> {
        self.out.push('[');
        for (i, child) in items.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.indent(depth + 1);
            self.enter_and_write(*child, depth + 1)?;
        }
        if !items.is_empty() {
            self.indent(depth);
        }
        self.out.push(']');
        Ok(())
    }

    fn write_object(&mut self, members: &[(String, Idx)], depth: usize) -> Result<()> {
        self.out.push('{');
        for (i, (key, child)) in members.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.indent(depth + 1);
            write_json_string(&mut self.out, key);
            self.out.push(':');
            if self.pretty() {
                self.out.push(' ');
            }
            self.enter_and_write(*child, depth + 1)?;
        }
        if !members.is_empty() {
            self.indent(depth);
        }
        self.out.push('}');
        Ok(())
    }

    fn enter_and_write(&mut self, idx: Idx, depth: usize) -> Result<()> {
        self.ancestors.push(idx.0);
        let path = self.paths.get(&idx.0).cloned();
        if let Some(path) = &path {
            self.first_seen.entry(idx.0).or_insert_with(|| path.clone());
        }
        let result = self.write_value(idx, depth);
        self.ancestors.pop();
        result
    }

    /// A pointer re-entering a currently-open ancestor always prints as
    /// a path sentinel (the only way to avoid infinite recursion).
    /// Under `layout.json`, every pointer is standard-JSON-incompatible
    /// by definition, so it *always* prints as a sentinel, whether or
    /// not its target has been visited yet. Under `layout.flatten`
    /// (without `json`), a non-root object/array target already printed
    /// once inline is replaced by a sentinel on subsequent visits;
    /// scalar targets are inlined on every visit like any other scalar,
    /// since there's nothing to deduplicate. Otherwise pointers are
    /// inlined in full.
    fn write_pointer(&mut self, _self_idx: Idx, target: Idx, depth: usize) -> Result<()> {
        if self.ancestors.contains(&target.0) {
            return self.write_path_sentinel(target);
        }
        if self.options.layout.json {
            return self.write_path_sentinel(target);
        }
        if self.options.layout.flatten
            && self.is_structural(target)
            && self.first_seen.contains_key(&target.0)
        {
            return self.write_path_sentinel(target);
        }
        self.enter_and_write(target, depth)
    }

    fn is_structural(&self, idx: Idx) -> bool {
        matches!(self.doc.raw(idx), Value::Object(_) | Value::Array(_))
    }

    fn write_path_sentinel(&mut self, target: Idx) -> Result<()> {
        let target_path = self.paths.get(&target.0).cloned().unwrap_or_default();
        write_json_string(&mut self.out, &format!("$cppon-path:{}", root_path(&target_path)));
        Ok(())
    }
}

fn format_double(d: f64) -> String {
    if d.fract() == 0.0 && d.is_finite() && d.abs() < 1e15 {
        format!("{d:.1}")
    } else {
        let mut s = format!("{d}");
        if !s.contains('.') && !s.contains('e') && !s.contains("inf") && !s.contains("NaN") {
            s.push_str(".0");
        }
        s
    }
}

fn write_json_string(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
