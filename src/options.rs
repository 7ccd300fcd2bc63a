//! Printer configuration, deserialized with `serde_json` and
//! self-describing via `schemars`, the same pairing the teacher uses
//! for `model::Pipeline` (`examples/jopamo-txed/src/model.rs`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Wire shape accepted by `serde`: alongside the nested `layout` object,
/// §4.4's options table also documents top-level `compact`/`pretty`
/// booleans sibling to it (e.g. `{"layout":{"json":true},"compact":true}`),
/// with `pretty` acting as the documented alias for `compact:false`.
/// Folded into `Layout::style` by `PrinterOptions`'s `From` impl rather
/// than kept as separate fields, the same shorthand-folding approach
/// `LayoutSpec` already uses for the bare-string `layout` shorthand.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
struct OptionsWire {
    #[serde(default)]
    layout: Layout,
    #[serde(default)]
    buffer: BufferHint,
    #[serde(default)]
    compact: Option<bool>,
    #[serde(default)]
    pretty: Option<bool>,
}

/// Top-level printer configuration, per SPEC_FULL.md §6.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case", from = "OptionsWire", into = "OptionsWire")]
pub struct PrinterOptions {
    pub layout: Layout,
    pub buffer: BufferHint,
}

impl From<OptionsWire> for PrinterOptions {
    fn from(wire: OptionsWire) -> Self {
        let mut layout = wire.layout;
        if let Some(pretty) = wire.pretty {
            layout.style = if pretty { Style::Pretty } else { Style::Compact };
        }
        if let Some(compact) = wire.compact {
            layout.style = if compact { Style::Compact } else { Style::Pretty };
        }
        PrinterOptions {
            layout,
            buffer: wire.buffer,
        }
    }
}

impl From<PrinterOptions> for OptionsWire {
    fn from(options: PrinterOptions) -> Self {
        OptionsWire {
            layout: options.layout,
            buffer: options.buffer,
            compact: None,
            pretty: None,
        }
    }
}

impl PrinterOptions {
    pub fn compact() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            layout: Layout {
                style: Style::Pretty,
                ..Layout::default()
            },
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Compact,
    Pretty,
}

impl Default for Style {
    fn default() -> Self {
        Style::Compact
    }
}

/// Accepted either as a bare string (`"pretty"`/`"compact"`, the
/// common case) or as a full object when `json`/`flatten` also need
/// setting — `pretty` is a shorthand alias for `{"style": "pretty"}`,
/// applied here rather than via `#[serde(alias = ...)]` because it
/// aliases a whole shape, not a single field name.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
enum LayoutSpec {
    Shorthand(Style),
    Full(Layout),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case", from = "LayoutSpec", into = "LayoutSpec")]
pub struct Layout {
    pub style: Style,
    /// Strict JSON emission: extensions are written as their sentinel
    /// strings rather than the default layout (§6.2).
    pub json: bool,
    /// First visit to a shared node is inlined; later visits become a
    /// `$cppon-path:` back-reference instead of being duplicated.
    pub flatten: bool,
}

impl From<LayoutSpec> for Layout {
    fn from(spec: LayoutSpec) -> Self {
        match spec {
            LayoutSpec::Shorthand(style) => Layout {
                style,
                ..Layout::default_with(style)
            },
            LayoutSpec::Full(layout) => layout,
        }
    }
}

impl From<Layout> for LayoutSpec {
    fn from(layout: Layout) -> Self {
        LayoutSpec::Full(layout)
    }
}

impl Layout {
    fn default_with(style: Style) -> Self {
        Layout {
            style,
            json: false,
            flatten: false,
        }
    }
}

/// A hint for whether the printer should pre-size its output buffer —
/// the `buffer:"reserve"` option from §4.4 / `original_source/examples/formatting_options.cpp`.
/// The value is the bare string `"reserve"` or the key is absent; the
/// printer itself estimates how much to reserve from the subtree's node
/// count, there is no caller-supplied byte count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BufferHint {
    None,
    Reserve,
}

impl Default for BufferHint {
    fn default() -> Self {
        BufferHint::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_shorthand_parses_as_style() {
        let opts: PrinterOptions = serde_json::from_str(r#"{"layout": "pretty"}"#).unwrap();
        assert_eq!(opts.layout.style, Style::Pretty);
        assert!(!opts.layout.json);
    }

    #[test]
    fn full_layout_object_parses() {
        let opts: PrinterOptions =
            serde_json::from_str(r#"{"layout": {"style": "pretty", "json": true, "flatten": true}}"#)
                .unwrap();
        assert_eq!(opts.layout.style, Style::Pretty);
        assert!(opts.layout.json);
        assert!(opts.layout.flatten);
    }

    #[test]
    fn top_level_compact_and_pretty_booleans_round_trip() {
        let opts: PrinterOptions = serde_json::from_str(r#"{"pretty": true}"#).unwrap();
        assert_eq!(opts.layout.style, Style::Pretty);

        let opts: PrinterOptions = serde_json::from_str(r#"{"compact": false}"#).unwrap();
        assert_eq!(opts.layout.style, Style::Pretty);

        let opts: PrinterOptions =
            serde_json::from_str(r#"{"layout":{"json":true},"compact":true}"#).unwrap();
        assert_eq!(opts.layout.style, Style::Compact);
        assert!(opts.layout.json);
    }

    #[test]
    fn buffer_reserve_parses_from_bare_string() {
        let opts: PrinterOptions = serde_json::from_str(r#"{"buffer": "reserve"}"#).unwrap();
        assert_eq!(opts.buffer, BufferHint::Reserve);
    }

    #[test]
    fn defaults_are_compact_no_flags() {
        let opts = PrinterOptions::default();
        assert_eq!(opts.layout.style, Style::Compact);
        assert!(!opts.layout.json);
        assert!(!opts.layout.flatten);
        assert!(matches!(opts.buffer, BufferHint::None));
    }
}
