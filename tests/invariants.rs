//! Contract Invariant Tests
//!
//! These tests verify the engine's guarantees end to end.

use std::fs;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use conftemplate::{
    transform_line, BooleanStyle, ConfigError, ConfigInputs, Directive, EngineConfig, LineOutcome,
    PipelineError, TemplatingPipeline, TransformOptions, Validator,
};

fn directives(list: serde_json::Value) -> Vec<Directive> {
    Validator::default()
        .validate(list.as_array().unwrap())
        .directives
}

fn transformed(line: &str, list: serde_json::Value) -> String {
    let directives = directives(list);
    transform_line(line, &directives, &TransformOptions::default())
        .text()
        .unwrap()
        .to_string()
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(source: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("settings.py"), source).unwrap();
        Self { dir }
    }

    fn config(&self, list: &str) -> EngineConfig {
        EngineConfig::new(
            self.dir.path().join("settings.py"),
            self.dir.path().join("rendered.py"),
            list,
        )
    }

    fn output(&self) -> String {
        fs::read_to_string(self.dir.path().join("rendered.py")).unwrap()
    }
}

#[test]
fn invariant_non_matching_lines_unchanged() {
    let list = directives(json!([
        {"find": "TOKEN", "replace": "x"},
        {"find": "OTHER", "replace": {"a": 1}},
    ]));
    let options = TransformOptions {
        drop_empty_lines: true,
        ..Default::default()
    };

    for line in ["", "   ", "plain = value", "token lower case", "x = {\"a\": 1}"] {
        assert_eq!(
            transform_line(line, &list, &options),
            LineOutcome::Unchanged(line)
        );
    }
}

#[test]
fn invariant_first_match_wins() {
    let out = transformed(
        "A = B",
        json!([
            {"find": "B", "replace": "first"},
            {"find": "A", "replace": "second"},
        ]),
    );
    assert_eq!(out, "A = first");
    assert!(!out.contains("second"));
}

#[test]
fn invariant_scalar_substring_replacement() {
    let out = transformed("KEY=VAL_HERE", json!([{"find": "VAL_HERE", "replace": "xyz"}]));
    assert_eq!(out, "KEY=xyz");
}

#[test]
fn invariant_structured_assignment_replacement() {
    let out = transformed(
        "config = OLD",
        json!([{"find": "OLD", "replace": {"a": 1, "b": "true"}}]),
    );
    assert_eq!(
        out,
        "config = {\n           \"a\": 1,\n           \"b\": true\n         }"
    );
}

#[test]
fn invariant_titlecase_booleans() {
    let list = directives(json!([{"find": "OLD", "replace": {"debug": "False", "tls": true}}]));
    let options = TransformOptions {
        boolean_style: BooleanStyle::Titlecase,
        ..Default::default()
    };
    let out = transform_line("flags = OLD", &list, &options);
    assert_eq!(
        out.text(),
        Some("flags = {\n          \"debug\": False,\n          \"tls\": True\n        }")
    );
}

#[test]
fn invariant_template_placeholder_passthrough() {
    let out = transformed(
        "env = OLD",
        json!([{"find": "OLD", "replace": {"password": "{{ secret }}"}}]),
    );
    assert!(out.contains("\"password\": \"{{ secret }}\""));

    let inline = transformed(
        "call(OLD)",
        json!([{"find": "OLD", "replace": ["{{ var.value.get('x') }}"]}]),
    );
    assert_eq!(inline, "call([\"{{ var.value.get('x') }}\"])");
}

#[test]
fn invariant_sensitive_keys_suppressed() {
    let workspace = Workspace::new("env = ENV\n");
    let pipeline = TemplatingPipeline::new(workspace.config(
        r#"[{"find": "ENV", "replace": {"AZURE_CLIENT_SECRET": "", "DB_HOST": ""}}]"#,
    ));

    let summary = pipeline.run().unwrap();
    assert_eq!(summary.missing_values, vec!["DB_HOST"]);
    assert_eq!(summary.directives_applied, 1);
}

#[test]
fn invariant_malformed_directive_list() {
    let workspace = Workspace::new("x = 1\n");
    let err = TemplatingPipeline::new(workspace.config("{not valid json"))
        .run()
        .unwrap_err();

    assert!(matches!(err, PipelineError::Parse(_)));
    assert!(err.to_string().contains("position 1"));
    assert!(!workspace.dir.path().join("rendered.py").exists());
}

#[test]
fn invariant_missing_required_input() {
    let inputs = ConfigInputs {
        output_path: Some("out.py".into()),
        directives: Some("[]".into()),
        ..Default::default()
    };
    let err = EngineConfig::resolve(inputs).unwrap_err();
    assert!(matches!(err, ConfigError::MissingInput("INPUT_FILE")));
    assert!(err.to_string().contains("INPUT_FILE"));
}

#[test]
fn invariant_runs_are_deterministic() {
    let source = "# settings\nconn = CONN\nhosts = HOSTS\nname = NAME\n\nflag = FLAG\n";
    let list = r#"[
        {"find": "CONN", "replace": {"host": "db", "port": 5432, "tls": "TRUE", "extra": {"k": [1, null]}}},
        {"find": "HOSTS", "replace": ["a", "b"]},
        {"find": "NAME", "replace": "svc"},
        {"find": "FLAG", "replace": ""}
    ]"#;
    let workspace = Workspace::new(source);
    let config = workspace.config(list).with_drop_empty_lines(true);

    let first = TemplatingPipeline::new(config.clone()).run().unwrap();
    let first_output = workspace.output();
    let second = TemplatingPipeline::new(config).run().unwrap();

    assert_eq!(first_output, workspace.output());
    assert_eq!(first.output_sha256, second.output_sha256);
    assert_eq!(first.run_fingerprint, second.run_fingerprint);
}

#[test]
fn invariant_full_document() {
    let source = "\
import os

SETTINGS = PLACEHOLDER_SETTINGS
BUCKET = \"PLACEHOLDER_BUCKET\"
REMOVE_ME_LINE
";
    let list = r#"[
        {"find": "PLACEHOLDER_SETTINGS", "replace": {"region": "eu", "verify": "false", "token": "{{ token }}"}},
        {"find": "PLACEHOLDER_BUCKET", "replace": "assets"},
        {"find": "REMOVE_ME_LINE", "replace": ""},
        {"find": "UNUSED"}
    ]"#;
    let workspace = Workspace::new(source);
    let summary = TemplatingPipeline::new(workspace.config(list).with_drop_empty_lines(true))
        .run()
        .unwrap();

    assert_eq!(
        workspace.output(),
        "\
import os

SETTINGS = {
             \"region\": \"eu\",
             \"verify\": false,
             \"token\": \"{{ token }}\"
           }
BUCKET = \"assets\"
"
    );
    assert_eq!(summary.directives_parsed, 4);
    assert_eq!(summary.directives_applied, 3);
    assert_eq!(summary.directives_skipped, 1);
    assert_eq!(summary.stats.lines_dropped, 1);
}
