//! An in-memory JSON-family document engine: zero-copy parsing, path
//! addressing with autovivification, layout-aware printing, and three
//! extensions beyond plain JSON — binary blobs, typed paths, and
//! direct pointers between nodes of the same document.

pub mod access;
pub mod document;
pub mod error;
pub mod options;
mod parser;
mod path;
pub mod printer;
pub mod resolve;
mod span;
mod value;

pub use access::{get_blob, CastAccess, StrictAccess};
pub use document::{Document, NodeId, Scalar};
pub use error::{Error, Result};
pub use options::{BufferHint, Layout, PrinterOptions, Style};
pub use parser::Mode;
pub use resolve::{resolve_paths, ResolveReport};
