use memchr::memchr2;
use tracing::trace;

use crate::error::{Error, Result};
use crate::span::Span;
use crate::value::{Idx, Value};

/// Parsing strategy for numbers, per SPEC_FULL.md §2.
///
/// `Quick` defers numeric conversion (`NumberLazy`) so that skimming a
/// document for a handful of fields doesn't pay for converting every
/// number in it; `Full` converts eagerly so that every `Value` handed
/// back is immediately ready for a typed accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Quick,
    Full,
}

/// The result of a fresh parse: a self-contained arena rooted at index
/// 0's `Idx`, handed to `Document` to adopt wholesale.
pub(crate) struct ParsedTree {
    pub arena: Vec<Value>,
    pub root: Idx,
}

const BLOB_SENTINEL: &str = "$cppon-blob:";
const PATH_SENTINEL: &str = "$cppon-path:";

pub(crate) fn parse(text: &str, mode: Mode) -> Result<ParsedTree> {
    let mut parser = Parser {
        bytes: text.as_bytes(),
        pos: 0,
        mode,
        arena: Vec::new(),
    };
    parser.skip_ws();
    let root = parser.parse_value()?;
    parser.skip_ws();
    if parser.pos != parser.bytes.len() {
        return Err(parser.err("trailing content after document"));
    }
    trace!(bytes = text.len(), nodes = parser.arena.len(), "parse complete");
    Ok(ParsedTree {
        arena: parser.arena,
        root,
    })
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    mode: Mode,
    arena: Vec<Value>,
}

impl<'a> Parser<'a> {
    fn err(&self, reason: impl Into<String>) -> Error {
        Error::Parse {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn push(&mut self, value: Value) -> Idx {
        let idx = Idx(self.arena.len() as u32);
        self.arena.push(value);
        idx
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.err(format!("expected '{}'", byte as char)))
        }
    }

    fn parse_value(&mut self) -> Result<Idx> {
        self.skip_ws();
        match self.peek() {
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => self.parse_string_value(),
            Some(b't') => self.parse_literal("true", Value::Boolean(true)),
            Some(b'f') => self.parse_literal("false", Value::Boolean(false)),
            Some(b'n') => self.parse_literal("null", Value::Null),
            Some(b'-') | Some(b'0'..=b'9') => self.parse_number(),
            Some(other) => Err(self.err(format!("unexpected byte 0x{other:02x}"))),
            None => Err(self.err("unexpected end of input")),
        }
    }

    fn parse_literal(&mut self, word: &str, value: Value) -> Result<Idx> {
        if self.bytes[self.pos..].starts_with(word.as_bytes()) {
            self.pos += word.len();
            Ok(self.push(value))
        } else {
            Err(self.err(format!("expected `{word}`")))
        }
    }

    fn parse_object(&mut self) -> Result<Idx> {
        self.expect(b'{')?;
        let mut members = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(self.push(Value::Object(members)));
        }
        loop {
            self.skip_ws();
            let key = self.parse_raw_string()?;
            self.skip_ws();
            self.expect(b':')?;
            let value = self.parse_value()?;
            // Last-wins on duplicate keys (§3.3).
            if let Some(slot) = members.iter_mut().find(|(k, _): &&mut (String, Idx)| *k == key)
            {
                slot.1 = value;
            } else {
                members.push((key, value));
            }
            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_ws();
                    if self.peek() == Some(b'}') {
                        return Err(self.err("trailing comma before '}'"));
                    }
                }
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.err("expected ',' or '}'")),
            }
        }
        Ok(self.push(Value::Object(members)))
    }

    fn parse_array(&mut self) -> Result<Idx> {
        self.expect(b'[')?;
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(self.push(Value::Array(items)));
        }
        loop {
            let value = self.parse_value()?;
            items.push(value);
            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_ws();
                    if self.peek() == Some(b']') {
                        return Err(self.err("trailing comma before ']'"));
                    }
                }
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.err("expected ',' or ']'")),
            }
        }
        Ok(self.push(Value::Array(items)))
    }

    /// Scans a quoted string (without unescaping) to its closing quote,
    /// using `memchr2` to jump past runs of ordinary characters instead
    /// of branching per byte.
    fn scan_string_span(&mut self) -> Result<(usize, usize, bool)> {
        self.expect(b'"')?;
        let start = self.pos;
        let mut has_escapes = false;
        loop {
            match memchr2(b'"', b'\\', &self.bytes[self.pos..]) {
                Some(rel) => {
                    self.pos += rel;
                    match self.bytes[self.pos] {
                        b'"' => {
                            let end = self.pos;
                            self.pos += 1;
                            return Ok((start, end, has_escapes));
                        }
                        b'\\' => {
                            has_escapes = true;
                            self.pos += 2;
                        }
                        _ => unreachable!(),
                    }
                }
                None => return Err(self.err("unterminated string")),
            }
        }
    }

    fn parse_raw_string(&mut self) -> Result<String> {
        let (start, end, has_escapes) = self.scan_string_span()?;
        let raw = std::str::from_utf8(&self.bytes[start..end])
            .map_err(|_| self.err("invalid utf-8 in string"))?;
        if has_escapes {
            unescape_json_string(raw).ok_or_else(|| self.err("invalid escape sequence"))
        } else {
            Ok(raw.to_string())
        }
    }

    fn parse_string_value(&mut self) -> Result<Idx> {
        let (start, end, has_escapes) = self.scan_string_span()?;
        let raw = std::str::from_utf8(&self.bytes[start..end])
            .map_err(|_| self.err("invalid utf-8 in string"))?;

        if let Some(b64) = raw.strip_prefix(BLOB_SENTINEL) {
            return self.parse_blob_sentinel(b64, has_escapes);
        }
        if let Some(rest) = raw.strip_prefix(PATH_SENTINEL) {
            let path = if has_escapes {
                unescape_json_string(rest).ok_or_else(|| self.err("invalid escape sequence"))?
            } else {
                rest.to_string()
            };
            return Ok(self.push(Value::Path(path)));
        }

        if has_escapes {
            let owned = unescape_json_string(raw).ok_or_else(|| self.err("invalid escape sequence"))?;
            Ok(self.push(Value::StringOwned(owned)))
        } else {
            Ok(self.push(Value::StringView(Span::new(start, end))))
        }
    }

    /// A blob payload is normally left as a lazy span over the Base64
    /// text (decoded on demand by `access::get_blob`); if the sentinel
    /// line itself contained JSON escapes the unescaped text is no
    /// longer a slice of the buffer, so it is decoded eagerly instead.
    fn parse_blob_sentinel(&mut self, b64_with_prefix: &str, has_escapes: bool) -> Result<Idx> {
        if has_escapes {
            let unescaped =
                unescape_json_string(b64_with_prefix).ok_or_else(|| self.err("invalid escape sequence"))?;
            let bytes = crate::access::decode_base64(&unescaped)?;
            Ok(self.push(Value::Blob(bytes)))
        } else {
            let prefix_end = self.pos - 1 - b64_with_prefix.len();
            let b64_start = prefix_end + BLOB_SENTINEL.len();
            let b64_end = self.pos - 1;
            Ok(self.push(Value::BlobString(Span::new(b64_start, b64_end))))
        }
    }

    fn parse_number(&mut self) -> Result<Idx> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        self.consume_digits()?;
        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.consume_digits()?;
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            self.consume_digits()?;
        }
        let end = self.pos;
        let text = std::str::from_utf8(&self.bytes[start..end]).expect("numeric ASCII");
        match self.mode {
            Mode::Quick => Ok(self.push(Value::NumberLazy(Span::new(start, end)))),
            Mode::Full => {
                let value = eager_number(text)?;
                Ok(self.push(value))
            }
        }
    }

    fn consume_digits(&mut self) -> Result<()> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.err("expected digit"));
        }
        Ok(())
    }
}

/// Converts the literal text of a number token into a concrete
/// numeric `Value`: `Int64` if it fits, else `UInt64` for large
/// unsigned literals, else `Double` for anything with a fractional
/// part or exponent. Used both for `Mode::Full` parsing and to resolve
/// a `NumberLazy` span on demand (`Document::eval`/typed accessors).
pub(crate) fn eager_number(text: &str) -> Result<Value> {
    if !text.contains('.') && !text.contains('e') && !text.contains('E') {
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::Int64(n));
        }
        if let Ok(n) = text.parse::<u64>() {
            return Ok(Value::UInt64(n));
        }
    }
    text.parse::<f64>()
        .map(Value::Double)
        .map_err(|_| Error::Parse {
            offset: 0,
            reason: format!("`{text}` is not a valid number"),
        })
}

/// Unescapes a JSON string body (no surrounding quotes). Returns
/// `None` on a malformed escape, matching the conservative behaviour
/// of rejecting rather than guessing at intent.
fn unescape_json_string(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            '/' => out.push('/'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                let hex: String = (0..4).map(|_| chars.next()).collect::<Option<String>>()?;
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_full(text: &str) -> ParsedTree {
        parse(text, Mode::Full).expect("should parse")
    }

    #[test]
    fn parses_flat_object() {
        let tree = parse_full(r#"{"a": 1, "b": "x"}"#);
        assert!(matches!(tree.arena[tree.root.0 as usize], Value::Object(_)));
    }

    #[test]
    fn quick_mode_defers_integer_conversion() {
        let tree = parse(r#"42"#, Mode::Quick).unwrap();
        assert!(matches!(tree.arena[tree.root.0 as usize], Value::NumberLazy(_)));
    }

    #[test]
    fn quick_mode_defers_float_and_exponent_conversion() {
        let tree = parse(r#"3.14"#, Mode::Quick).unwrap();
        assert!(matches!(tree.arena[tree.root.0 as usize], Value::NumberLazy(_)));
        let tree = parse(r#"2e10"#, Mode::Quick).unwrap();
        assert!(matches!(tree.arena[tree.root.0 as usize], Value::NumberLazy(_)));
    }

    #[test]
    fn full_mode_converts_integer_eagerly() {
        let tree = parse_full("42");
        assert!(matches!(tree.arena[tree.root.0 as usize], Value::Int64(42)));
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let tree = parse_full(r#"{"a": 1, "a": 2}"#);
        match &tree.arena[tree.root.0 as usize] {
            Value::Object(members) => {
                assert_eq!(members.len(), 1);
                let (_, idx) = members[0];
                assert!(matches!(tree.arena[idx.0 as usize], Value::Int64(2)));
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn rejects_trailing_comma_in_array() {
        assert!(parse(r#"[1, 2,]"#, Mode::Full).is_err());
    }

    #[test]
    fn rejects_trailing_comma_in_object() {
        assert!(parse(r#"{"a": 1,}"#, Mode::Full).is_err());
    }

    #[test]
    fn recognizes_path_sentinel() {
        let tree = parse_full(r#""$cppon-path:/a/b""#);
        assert!(matches!(tree.arena[tree.root.0 as usize], Value::Path(ref p) if p == "/a/b"));
    }

    #[test]
    fn recognizes_blob_sentinel_as_lazy_span() {
        let tree = parse_full(r#""$cppon-blob:aGVsbG8=""#);
        assert!(matches!(tree.arena[tree.root.0 as usize], Value::BlobString(_)));
    }

    #[test]
    fn large_unsigned_literal_becomes_uint64() {
        let tree = parse_full("18446744073709551615");
        assert!(matches!(tree.arena[tree.root.0 as usize], Value::UInt64(u64::MAX)));
    }
}
