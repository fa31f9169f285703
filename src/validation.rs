//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations per directive item.
//! Policy decides whether errors skip the item or reject the run.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::directives::{value_kind, Directive};

/// Keys whose values are never reported, even when empty.
pub const SENSITIVE_KEYS: &[&str] = &["AZURE_CLIENT_SECRET", "AZURE_CLIENT_ID", "aad_client_id"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectiveViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    /// Position of the item in the directive list
    pub index: usize,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Skip invalid items and keep going
    #[default]
    Advisory,
    /// Any invalid item rejects the whole run
    Strict,
}

impl ValidationPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Advisory
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub valid: bool,
    pub policy: ValidationPolicy,
    /// Items that passed, converted, in list order
    pub directives: Vec<Directive>,
    pub violations: Vec<DirectiveViolation>,
    pub skipped: usize,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &DirectiveViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
    }

    /// Keys reported by the missing-value rule, sorted and de-duplicated.
    pub fn missing_values(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .violations
            .iter()
            .filter(|v| v.rule == MissingValueRule::NAME)
            .filter_map(|v| v.key.clone())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

/// Validation rule trait - produces violations
pub trait DirectiveRule {
    fn name(&self) -> &'static str;
    fn check(&self, index: usize, item: &Value) -> Vec<DirectiveViolation>;
}

// --- Concrete Rules ---

pub struct RecordShapeRule;

impl DirectiveRule for RecordShapeRule {
    fn name(&self) -> &'static str {
        "record_shape"
    }

    fn check(&self, index: usize, item: &Value) -> Vec<DirectiveViolation> {
        if item.is_object() {
            return vec![];
        }
        vec![DirectiveViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Error,
            index,
            message: format!("Invalid directive item type: {}", value_kind(item)),
            key: None,
            remediation: vec![r#"Use an object of the form {"find": ..., "replace": ...}"#.to_string()],
        }]
    }
}

pub struct RequiredFieldsRule;

impl RequiredFieldsRule {
    fn violation(&self, index: usize, message: String) -> DirectiveViolation {
        DirectiveViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Error,
            index,
            message,
            key: None,
            remediation: vec!["Provide a non-empty string 'find' and a 'replace' value".to_string()],
        }
    }
}

impl DirectiveRule for RequiredFieldsRule {
    fn name(&self) -> &'static str {
        "required_fields"
    }

    fn check(&self, index: usize, item: &Value) -> Vec<DirectiveViolation> {
        let Some(record) = item.as_object() else {
            return vec![];
        };

        let mut violations = vec![];
        match record.get("find") {
            None => violations.push(self.violation(index, "Directive is missing required 'find' key".into())),
            Some(Value::String(find)) if find.is_empty() => {
                violations.push(self.violation(index, "Directive 'find' token is empty".into()))
            }
            Some(Value::String(_)) => {}
            Some(other) => violations.push(self.violation(
                index,
                format!("Directive 'find' must be a string, got {}", value_kind(other)),
            )),
        }
        if !record.contains_key("replace") {
            violations.push(self.violation(index, "Directive is missing required 'replace' key".into()));
        }
        violations
    }
}

/// Flags mapping entries whose value is empty. Advisory only.
pub struct MissingValueRule {
    sensitive_keys: &'static [&'static str],
}

impl MissingValueRule {
    pub const NAME: &'static str = "missing_value";

    pub fn new() -> Self {
        Self {
            sensitive_keys: SENSITIVE_KEYS,
        }
    }
}

impl Default for MissingValueRule {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectiveRule for MissingValueRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, index: usize, item: &Value) -> Vec<DirectiveViolation> {
        // Items without a usable token are skipped, so their values never apply
        let has_find = item
            .get("find")
            .and_then(Value::as_str)
            .is_some_and(|find| !find.is_empty());
        let Some(Value::Object(mapping)) = item.get("replace").filter(|_| has_find) else {
            return vec![];
        };

        mapping
            .iter()
            .filter(|(key, value)| is_empty_value(value) && !self.sensitive_keys.contains(&key.as_str()))
            .map(|(key, _)| DirectiveViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                index,
                message: format!("Value for '{key}' is missing or empty"),
                key: Some(key.clone()),
                remediation: vec![format!("Provide a value for '{key}'")],
            })
            .collect()
    }
}

/// JSON values that count as "not provided".
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn DirectiveRule>>,
    policy: ValidationPolicy,
}

impl Validator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            rules: vec![
                Box::new(RecordShapeRule),
                Box::new(RequiredFieldsRule),
                Box::new(MissingValueRule::new()),
            ],
            policy,
        }
    }

    pub fn validate(&self, items: &[Value]) -> ValidationReport {
        let mut directives = vec![];
        let mut all_violations = vec![];
        let mut skipped = 0;

        for (index, item) in items.iter().enumerate() {
            let violations: Vec<_> = self
                .rules
                .iter()
                .flat_map(|rule| rule.check(index, item))
                .collect();

            let rejected = violations.iter().any(|v| v.severity == ViolationSeverity::Error);
            match Directive::from_record(item) {
                Some(directive) if !rejected => directives.push(directive),
                _ => skipped += 1,
            }
            all_violations.extend(violations);
        }

        let has_errors = all_violations
            .iter()
            .any(|v| v.severity == ViolationSeverity::Error);

        ValidationReport {
            valid: !(self.policy == ValidationPolicy::Strict && has_errors),
            policy: self.policy,
            directives,
            violations: all_violations,
            skipped,
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationPolicy::default())
    }
}
