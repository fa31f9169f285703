//! Templating Pipeline - Single Entry Point
//!
//! parse -> validate -> read -> transform -> write. Nothing is written
//! unless every earlier stage succeeded.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::directives::{parse_directive_list, DirectiveParseError};
use crate::hashing::{compute_run_fingerprint, sha256_hex};
use crate::transform::{transform_document, TransformStats};
use crate::validation::{DirectiveViolation, ValidationPolicy, ValidationReport, Validator};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Parse(#[from] DirectiveParseError),

    #[error("Validation rejected {count} invalid directive(s): {details}")]
    ValidationRejected { count: usize, details: String },

    #[error("Failed to read input file {}: {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output file {}: {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub engine_version: String,
    pub policy: ValidationPolicy,
    pub directives_parsed: usize,
    pub directives_applied: usize,
    pub directives_skipped: usize,
    pub missing_values: Vec<String>,
    pub violations: Vec<DirectiveViolation>,
    pub stats: TransformStats,
    pub output_sha256: String,
    pub run_fingerprint: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Directive list after parsing and validation.
#[derive(Debug, Clone)]
pub struct PreparedDirectives {
    pub parsed: usize,
    pub report: ValidationReport,
}

pub struct TemplatingPipeline {
    config: EngineConfig,
    validator: Validator,
}

impl TemplatingPipeline {
    pub fn new(config: EngineConfig) -> Self {
        let validator = Validator::new(config.validation_policy());
        Self { config, validator }
    }

    /// Parse and validate the directive list, logging diagnostics.
    ///
    /// Fails on malformed JSON, and on invalid items under strict validation.
    pub fn prepare(&self) -> Result<PreparedDirectives, PipelineError> {
        let items = parse_directive_list(&self.config.directives)?;
        info!(
            "Successfully parsed directive list with {} replacement rules",
            items.len()
        );

        let report = self.validator.validate(&items);
        for violation in report.errors() {
            error!("Directive #{}: {}", violation.index, violation.message);
        }

        if !report.valid {
            let details: Vec<_> = report
                .errors()
                .map(|v| format!("#{} {}", v.index, v.message))
                .collect();
            return Err(PipelineError::ValidationRejected {
                count: details.len(),
                details: details.join("; "),
            });
        }
        if report.skipped > 0 {
            warn!("Skipped {} invalid directive(s)", report.skipped);
        }

        let missing = report.missing_values();
        if !missing.is_empty() {
            warn!("The following values are missing or empty: {}", missing.join(", "));
            warn!("Please check your configuration and ensure all required values are provided");
        }

        Ok(PreparedDirectives {
            parsed: items.len(),
            report,
        })
    }

    pub fn run(&self) -> Result<RunSummary, PipelineError> {
        let started_at = Utc::now();
        let prepared = self.prepare()?;
        let directives = &prepared.report.directives;

        let input_path = &self.config.input_path;
        let source = fs::read_to_string(input_path).map_err(|source| PipelineError::ReadInput {
            path: input_path.clone(),
            source,
        })?;

        let options = self.config.transform_options();
        let document = transform_document(&source, directives, &options);

        for (directive, matches) in directives.iter().zip(&document.stats.directive_matches) {
            if *matches == 0 {
                debug!("Directive {:?} matched no lines", directive.find);
            }
        }

        let output_path = &self.config.output_path;
        fs::write(output_path, &document.text).map_err(|source| PipelineError::WriteOutput {
            path: output_path.clone(),
            source,
        })?;

        let applied_json = Value::Array(directives.iter().map(|d| d.to_json()).collect());
        let run_fingerprint =
            compute_run_fingerprint(&source, &applied_json, &options, ENGINE_VERSION)?;
        debug!("Run fingerprint {}", run_fingerprint);

        info!(
            "Successfully processed {} to {} ({} directives applied, {} lines replaced)",
            input_path.display(),
            output_path.display(),
            directives.len(),
            document.stats.lines_replaced
        );

        Ok(RunSummary {
            input_path: input_path.clone(),
            output_path: output_path.clone(),
            engine_version: ENGINE_VERSION.to_string(),
            policy: prepared.report.policy,
            directives_parsed: prepared.parsed,
            directives_applied: directives.len(),
            directives_skipped: prepared.report.skipped,
            missing_values: prepared.report.missing_values(),
            violations: prepared.report.violations.clone(),
            output_sha256: sha256_hex(document.text.as_bytes()),
            stats: document.stats,
            run_fingerprint,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
