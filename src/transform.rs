//! Line Transformer
//!
//! Each line is matched against the directives in list order; the first
//! directive whose `find` token occurs in the line is applied and the rest
//! are not tried. Lines are independent of each other.
//!
//! Assignment detection is a heuristic: the line is split on its first `=`.
//! The target format is not parsed.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::directives::{Directive, ReplacementValue};
use crate::render::{self, BooleanStyle};

const ASSIGNMENT: &str = " = ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOptions {
    pub boolean_style: BooleanStyle,
    /// Omit lines that a directive turned into whitespace only
    pub drop_empty_lines: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome<'a> {
    Unchanged(&'a str),
    Replaced { directive: usize, text: String },
    Omitted { directive: usize },
}

impl LineOutcome<'_> {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Unchanged(line) => Some(line),
            Self::Replaced { text, .. } => Some(text),
            Self::Omitted { .. } => None,
        }
    }
}

pub fn transform_line<'a>(
    line: &'a str,
    directives: &[Directive],
    options: &TransformOptions,
) -> LineOutcome<'a> {
    let matched = directives
        .iter()
        .enumerate()
        .find(|(_, d)| !d.find.is_empty() && line.contains(d.find.as_str()));

    let Some((index, directive)) = matched else {
        return LineOutcome::Unchanged(line);
    };

    let text = apply(line, directive, options.boolean_style);
    if options.drop_empty_lines && text.trim().is_empty() {
        LineOutcome::Omitted { directive: index }
    } else {
        LineOutcome::Replaced {
            directive: index,
            text,
        }
    }
}

fn apply(line: &str, directive: &Directive, style: BooleanStyle) -> String {
    match &directive.replace {
        ReplacementValue::Scalar(scalar) => {
            line.replace(&directive.find, &render::render_plain(scalar, style))
        }
        structured => match line.split_once('=') {
            Some((lhs, _)) => {
                let lhs = lhs.trim_end();
                let column = lhs.chars().count() + ASSIGNMENT.len();
                let rendered = align_continuation(&render::render_block(structured, style), column);
                format!("{lhs}{ASSIGNMENT}{rendered}")
            }
            None => line.replace(&directive.find, &render::render_inline(structured, style)),
        },
    }
}

/// Shift every line after the first right by `column` spaces.
fn align_continuation(rendered: &str, column: usize) -> String {
    let pad = " ".repeat(column);
    let mut lines = rendered.lines();
    let mut out = String::with_capacity(rendered.len());
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        out.push_str(&pad);
        out.push_str(line);
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    pub lines_read: usize,
    pub lines_written: usize,
    pub lines_replaced: usize,
    pub lines_dropped: usize,
    /// Lines matched, indexed like the directive list
    pub directive_matches: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct TransformedDocument {
    pub text: String,
    pub stats: TransformStats,
}

/// Transform a whole document. `\r\n` endings come out as `\n`; a trailing
/// newline on the source is kept.
pub fn transform_document(
    source: &str,
    directives: &[Directive],
    options: &TransformOptions,
) -> TransformedDocument {
    let mut stats = TransformStats {
        directive_matches: vec![0; directives.len()],
        ..Default::default()
    };
    let mut lines: Vec<Cow<'_, str>> = Vec::new();

    for line in source.lines() {
        stats.lines_read += 1;
        match transform_line(line, directives, options) {
            LineOutcome::Unchanged(line) => lines.push(Cow::Borrowed(line)),
            LineOutcome::Replaced { directive, text } => {
                stats.lines_replaced += 1;
                stats.directive_matches[directive] += 1;
                lines.push(Cow::Owned(text));
            }
            LineOutcome::Omitted { directive } => {
                stats.lines_dropped += 1;
                stats.directive_matches[directive] += 1;
            }
        }
    }

    let mut text = lines.join("\n");
    if source.ends_with('\n') && !lines.is_empty() {
        text.push('\n');
    }
    stats.lines_written = text.lines().count();

    TransformedDocument { text, stats }
}
