use std::path::PathBuf;

use clap::Parser;

/// docjson: an in-memory JSON-family document engine with path
/// addressing, binary blobs, and cross-document pointers.
#[derive(Parser, Debug)]
#[command(
    name = "docjson",
    author,
    version,
    about,
    max_term_width = 100,
    after_help = "\
EXIT STATUS:
  0  Success
  1  Error (parse failure, path not found, I/O error)"
)]
pub enum Cli {
    /// Parse a document and print it back out.
    #[command(visible_alias = "p")]
    Print(PrintArgs),
    /// Read a single value at a path and print it.
    #[command(visible_alias = "g")]
    Get(GetArgs),
    /// Resolve embedded `$cppon-path:` literals into live pointers.
    #[command(visible_alias = "r")]
    Resolve(ResolveArgs),
    /// Print, then re-parse the result into a fresh document — the
    /// one operation that flattens shared/cyclic structure into a
    /// self-contained tree.
    #[command(visible_alias = "m")]
    Rematerialize(RematerializeArgs),
    /// Print the JSON Schema for printer options.
    #[command(visible_alias = "s")]
    Schema,
}

#[derive(Parser, Debug)]
pub struct SourceArgs {
    /// Document to read, or `-` for stdin.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Parse numbers eagerly instead of lazily.
    #[arg(long = "full")]
    pub full_mode: bool,

    /// Emit the JSON event stream instead of human-readable text.
    #[arg(long = "format", value_name = "FORMAT", default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct PrintArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Indented, multi-line layout instead of compact single-line.
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Emit extensions so the output is strict, portable JSON.
    #[arg(long = "json-layout")]
    pub json_layout: bool,

    /// Inline each shared/cyclic node only on first visit; later
    /// visits become a `$cppon-path:` back-reference.
    #[arg(long = "flatten")]
    pub flatten: bool,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Fail on the first unresolvable path instead of recording it and
    /// continuing.
    #[arg(long = "strict")]
    pub strict: bool,
}

#[derive(Parser, Debug)]
pub struct RematerializeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Show a unified diff between the original and rematerialized text.
    #[arg(long = "show-diff")]
    pub show_diff: bool,
}

#[derive(Parser, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Path to read, e.g. `/users/0/name`.
    #[arg(value_name = "PATH")]
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}
