//! Engine Configuration
//!
//! Named inputs are collected into [`ConfigInputs`] (every field optional),
//! then resolved into an [`EngineConfig`]. A missing required input fails
//! here, before any file is touched.

use std::path::PathBuf;

use clap::ValueEnum;
use thiserror::Error;

use crate::render::BooleanStyle;
use crate::transform::TransformOptions;
use crate::validation::ValidationPolicy;

pub const INPUT_FILE: &str = "INPUT_FILE";
pub const OUTPUT_FILE: &str = "OUTPUT_FILE";
pub const SEARCH_AND_REPLACE: &str = "SEARCH_AND_REPLACE";
pub const STRICT_VALIDATION: &str = "STRICT_VALIDATION";
pub const DROP_EMPTY_LINES: &str = "DROP_EMPTY_LINES";
pub const BOOLEAN_STYLE: &str = "BOOLEAN_STYLE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required input: {0}")]
    MissingInput(&'static str),

    #[error("Invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Raw named inputs. Only `Some` values take part in resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigInputs {
    pub input_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub directives: Option<String>,
    pub strict_validation: Option<bool>,
    pub drop_empty_lines: Option<bool>,
    pub boolean_style: Option<BooleanStyle>,
}

impl ConfigInputs {
    /// Read the named inputs from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let strict_validation = lookup(STRICT_VALIDATION)
            .map(|v| parse_flag(STRICT_VALIDATION, &v))
            .transpose()?;
        let drop_empty_lines = lookup(DROP_EMPTY_LINES)
            .map(|v| parse_flag(DROP_EMPTY_LINES, &v))
            .transpose()?;
        let boolean_style = lookup(BOOLEAN_STYLE)
            .map(|v| parse_boolean_style(&v))
            .transpose()?;

        Ok(Self {
            input_path: lookup(INPUT_FILE).map(PathBuf::from),
            output_path: lookup(OUTPUT_FILE).map(PathBuf::from),
            directives: lookup(SEARCH_AND_REPLACE),
            strict_validation,
            drop_empty_lines,
            boolean_style,
        })
    }

    /// Values set in `overrides` replace the ones here.
    pub fn overlay(self, overrides: ConfigInputs) -> Self {
        Self {
            input_path: overrides.input_path.or(self.input_path),
            output_path: overrides.output_path.or(self.output_path),
            directives: overrides.directives.or(self.directives),
            strict_validation: overrides.strict_validation.or(self.strict_validation),
            drop_empty_lines: overrides.drop_empty_lines.or(self.drop_empty_lines),
            boolean_style: overrides.boolean_style.or(self.boolean_style),
        }
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

fn parse_boolean_style(value: &str) -> Result<BooleanStyle, ConfigError> {
    BooleanStyle::from_str(value.trim(), true).map_err(|reason| ConfigError::InvalidValue {
        name: BOOLEAN_STYLE,
        value: value.to_string(),
        reason,
    })
}

/// Everything one engine run needs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Raw JSON directive list, parsed by the pipeline
    pub directives: String,
    pub strict_validation: bool,
    pub drop_empty_lines: bool,
    pub boolean_style: BooleanStyle,
}

impl EngineConfig {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        directives: impl Into<String>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            directives: directives.into(),
            strict_validation: false,
            drop_empty_lines: false,
            boolean_style: BooleanStyle::default(),
        }
    }

    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    pub fn with_drop_empty_lines(mut self, drop: bool) -> Self {
        self.drop_empty_lines = drop;
        self
    }

    pub fn with_boolean_style(mut self, style: BooleanStyle) -> Self {
        self.boolean_style = style;
        self
    }

    /// Empty required values count as missing.
    pub fn resolve(inputs: ConfigInputs) -> Result<Self, ConfigError> {
        let input_path = inputs
            .input_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingInput(INPUT_FILE))?;
        let output_path = inputs
            .output_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingInput(OUTPUT_FILE))?;
        let directives = inputs
            .directives
            .filter(|d| !d.trim().is_empty())
            .ok_or(ConfigError::MissingInput(SEARCH_AND_REPLACE))?;

        let config = Self::new(input_path, output_path, directives)
            .with_strict_validation(inputs.strict_validation.unwrap_or(false))
            .with_drop_empty_lines(inputs.drop_empty_lines.unwrap_or(false))
            .with_boolean_style(inputs.boolean_style.unwrap_or_default());
        Ok(config)
    }

    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            boolean_style: self.boolean_style,
            drop_empty_lines: self.drop_empty_lines,
        }
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy::from_strict(self.strict_validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_resolve_with_defaults() {
        let inputs = ConfigInputs::from_lookup(lookup(&[
            (INPUT_FILE, "in.py"),
            (OUTPUT_FILE, "out.py"),
            (SEARCH_AND_REPLACE, "[]"),
        ]))
        .unwrap();
        let config = EngineConfig::resolve(inputs).unwrap();

        assert_eq!(config.input_path, PathBuf::from("in.py"));
        assert_eq!(config.output_path, PathBuf::from("out.py"));
        assert_eq!(config.directives, "[]");
        assert!(!config.strict_validation);
        assert!(!config.drop_empty_lines);
        assert_eq!(config.boolean_style, BooleanStyle::Lower);
    }

    #[test]
    fn test_missing_input_named() {
        let inputs = ConfigInputs::from_lookup(lookup(&[
            (OUTPUT_FILE, "out.py"),
            (SEARCH_AND_REPLACE, "[]"),
        ]))
        .unwrap();
        let err = EngineConfig::resolve(inputs).unwrap_err();
        assert!(matches!(err, ConfigError::MissingInput(INPUT_FILE)));
    }

    #[test]
    fn test_empty_value_is_missing() {
        let inputs = ConfigInputs::from_lookup(lookup(&[
            (INPUT_FILE, "in.py"),
            (OUTPUT_FILE, "out.py"),
            (SEARCH_AND_REPLACE, "  "),
        ]))
        .unwrap();
        let err = EngineConfig::resolve(inputs).unwrap_err();
        assert!(matches!(err, ConfigError::MissingInput(SEARCH_AND_REPLACE)));
    }

    #[test]
    fn test_policy_knobs_parsed() {
        let inputs = ConfigInputs::from_lookup(lookup(&[
            (STRICT_VALIDATION, "Yes"),
            (DROP_EMPTY_LINES, "1"),
            (BOOLEAN_STYLE, "TitleCase"),
        ]))
        .unwrap();
        assert_eq!(inputs.strict_validation, Some(true));
        assert_eq!(inputs.drop_empty_lines, Some(true));
        assert_eq!(inputs.boolean_style, Some(BooleanStyle::Titlecase));
    }

    #[test]
    fn test_invalid_flag_rejected() {
        let err = ConfigInputs::from_lookup(lookup(&[(STRICT_VALIDATION, "maybe")])).unwrap_err();
        assert!(err.to_string().contains(STRICT_VALIDATION));

        let err = ConfigInputs::from_lookup(lookup(&[(BOOLEAN_STYLE, "upper")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: BOOLEAN_STYLE, .. }));
    }

    #[test]
    fn test_overlay_prefers_overrides() {
        let base = ConfigInputs {
            input_path: Some("env.py".into()),
            strict_validation: Some(true),
            ..Default::default()
        };
        let overrides = ConfigInputs {
            input_path: Some("cli.py".into()),
            ..Default::default()
        };
        let merged = base.overlay(overrides);
        assert_eq!(merged.input_path, Some(PathBuf::from("cli.py")));
        assert_eq!(merged.strict_validation, Some(true));
    }
}
