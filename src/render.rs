//! Literal Rendering - Structured Values Back Into Source Text
//!
//! Leaves are normalized before serialization:
//! - strings carrying a `{{ ... }}` placeholder pass through uninterpreted
//! - strings spelling `true`/`false` (any case) become boolean literals
//! - everything else keeps its JSON form

use serde::{Deserialize, Serialize};

use crate::directives::{ReplacementValue, Scalar};

const PLACEHOLDER_MARKER: &str = "{{";
const INDENT: &str = "  ";

/// Spelling of boolean and null literals in the target text format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BooleanStyle {
    /// `true` / `false` / `null`
    #[default]
    Lower,
    /// `True` / `False` / `None`
    Titlecase,
}

impl BooleanStyle {
    pub fn boolean(self, value: bool) -> &'static str {
        match (self, value) {
            (Self::Lower, true) => "true",
            (Self::Lower, false) => "false",
            (Self::Titlecase, true) => "True",
            (Self::Titlecase, false) => "False",
        }
    }

    pub fn null(self) -> &'static str {
        match self {
            Self::Lower => "null",
            Self::Titlecase => "None",
        }
    }
}

pub fn is_placeholder(text: &str) -> bool {
    text.contains(PLACEHOLDER_MARKER)
}

fn boolean_text(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Plain-text form of a scalar, used for substring substitution.
pub fn render_plain(scalar: &Scalar, style: BooleanStyle) -> String {
    match scalar {
        Scalar::Text(text) => text.clone(),
        Scalar::Number(number) => number.to_string(),
        Scalar::Bool(flag) => style.boolean(*flag).to_string(),
        Scalar::Null => style.null().to_string(),
    }
}

/// Literal form of a leaf inside a mapping or sequence.
pub fn render_leaf(scalar: &Scalar, style: BooleanStyle) -> String {
    match scalar {
        Scalar::Text(text) if is_placeholder(text) => format!("\"{text}\""),
        Scalar::Text(text) => match boolean_text(text) {
            Some(flag) => style.boolean(flag).to_string(),
            None => quote(text),
        },
        Scalar::Number(number) => number.to_string(),
        Scalar::Bool(flag) => style.boolean(*flag).to_string(),
        Scalar::Null => style.null().to_string(),
    }
}

/// Single-line rendering: `{"a": 1, "b": [true, "x"]}`.
pub fn render_inline(value: &ReplacementValue, style: BooleanStyle) -> String {
    let mut out = String::new();
    write_inline(&mut out, value, style);
    out
}

fn write_inline(out: &mut String, value: &ReplacementValue, style: BooleanStyle) {
    match value {
        ReplacementValue::Scalar(scalar) => out.push_str(&render_leaf(scalar, style)),
        ReplacementValue::Mapping(entries) => {
            out.push('{');
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&quote(key));
                out.push_str(": ");
                write_inline(out, value, style);
            }
            out.push('}');
        }
        ReplacementValue::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(out, item, style);
            }
            out.push(']');
        }
    }
}

/// Multi-line rendering with two spaces per nesting level, starting at column 0.
pub fn render_block(value: &ReplacementValue, style: BooleanStyle) -> String {
    let mut out = String::new();
    write_block(&mut out, value, style, 0);
    out
}

fn write_block(out: &mut String, value: &ReplacementValue, style: BooleanStyle, depth: usize) {
    match value {
        ReplacementValue::Scalar(scalar) => out.push_str(&render_leaf(scalar, style)),
        ReplacementValue::Mapping(entries) if entries.is_empty() => out.push_str("{}"),
        ReplacementValue::Sequence(items) if items.is_empty() => out.push_str("[]"),
        ReplacementValue::Mapping(entries) => {
            out.push('{');
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('\n');
                push_indent(out, depth + 1);
                out.push_str(&quote(key));
                out.push_str(": ");
                write_block(out, value, style, depth + 1);
            }
            out.push('\n');
            push_indent(out, depth);
            out.push('}');
        }
        ReplacementValue::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('\n');
                push_indent(out, depth + 1);
                write_block(out, item, style, depth + 1);
            }
            out.push('\n');
            push_indent(out, depth);
            out.push(']');
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

/// Double-quoted string literal with JSON escapes. Non-ASCII is kept as is.
fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{text:?}"))
}
