//! ConfTemplate Core - Deployment-Time Configuration Templating
//!
//! Rewrites a text file line by line from an ordered list of find/replace
//! directives. Scalar replacements are plain substring substitutions;
//! mapping and sequence replacements are rendered back into literal syntax,
//! spread over several aligned lines when they land on an assignment.
//!
//! # Guarantees
//! 1. Lines without a matching token come out unchanged
//! 2. The first matching directive wins, per line
//! 3. The same inputs always produce the same bytes
//! 4. Nothing is written before parsing and validation succeed

pub mod config;
pub mod directives;
pub mod hashing;
pub mod pipeline;
pub mod render;
pub mod transform;
pub mod validation;

pub use config::{ConfigError, ConfigInputs, EngineConfig};
pub use directives::{parse_directive_list, Directive, DirectiveParseError, ReplacementValue, Scalar};
pub use hashing::{compute_run_fingerprint, sha256_hex};
pub use pipeline::{PipelineError, PreparedDirectives, RunSummary, TemplatingPipeline};
pub use render::BooleanStyle;
pub use transform::{transform_document, transform_line, LineOutcome, TransformOptions, TransformStats};
pub use validation::{DirectiveViolation, ValidationPolicy, ValidationReport, Validator, ViolationSeverity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
