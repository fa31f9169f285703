//! Directive Model - Find/Replace Rules
//!
//! A directive list arrives as JSON. Parsing here only checks that the text
//! is well-formed and is a list; per-item shape checks live in `validation`.

use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectiveParseError {
    #[error("Failed to parse directive list at position {offset} (line {line}, column {column}): {source}")]
    Syntax {
        line: usize,
        column: usize,
        /// Byte offset into the raw directive text
        offset: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Directive list must be a JSON array, got {0}")]
    NotAList(&'static str),
}

impl DirectiveParseError {
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Syntax { offset, .. } => Some(*offset),
            Self::NotAList(_) => None,
        }
    }
}

/// Parse the raw directive list into its items, untouched.
pub fn parse_directive_list(raw: &str) -> Result<Vec<Value>, DirectiveParseError> {
    let value: Value = serde_json::from_str(raw).map_err(|source| {
        let (line, column) = (source.line(), source.column());
        // EOF errors point at the last byte read; the failure is past it
        let offset = if source.is_eof() {
            raw.len()
        } else {
            byte_offset(raw, line, column)
        };
        DirectiveParseError::Syntax {
            line,
            column,
            offset,
            source,
        }
    })?;

    match value {
        Value::Array(items) => Ok(items),
        other => Err(DirectiveParseError::NotAList(value_kind(&other))),
    }
}

/// serde_json reports 1-based line/column pairs; fold them back into an offset.
fn byte_offset(raw: &str, line: usize, column: usize) -> usize {
    let line_start: usize = raw
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(raw.len())
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A leaf value, keeping the JSON kind it arrived as.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplacementValue {
    Scalar(Scalar),
    /// Keys stay in the order they appeared in the directive list
    Mapping(Vec<(String, ReplacementValue)>),
    Sequence(Vec<ReplacementValue>),
}

impl ReplacementValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(Scalar::Text(text)) => Value::String(text.clone()),
            Self::Scalar(Scalar::Number(number)) => Value::Number(number.clone()),
            Self::Scalar(Scalar::Bool(flag)) => Value::Bool(*flag),
            Self::Scalar(Scalar::Null) => Value::Null,
            Self::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl From<&Value> for ReplacementValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(flag) => Self::Scalar(Scalar::Bool(*flag)),
            Value::Number(number) => Self::Scalar(Scalar::Number(number.clone())),
            Value::String(text) => Self::Scalar(Scalar::Text(text.clone())),
            Value::Array(items) => Self::Sequence(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Mapping(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for ReplacementValue {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

/// One requested substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub find: String,
    pub replace: ReplacementValue,
}

impl Directive {
    pub fn new(find: impl Into<String>, replace: impl Into<ReplacementValue>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }

    /// Build from a JSON record. Returns `None` unless `find` is a non-empty
    /// string and `replace` is present.
    pub fn from_record(item: &Value) -> Option<Self> {
        let record = item.as_object()?;
        let find = record.get("find")?.as_str().filter(|f| !f.is_empty())?;
        let replace = record.get("replace")?;
        Some(Self::new(find, replace))
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "find": self.find,
            "replace": self.replace.to_json(),
        })
    }
}
