//! ConfTemplate CLI - Pipeline step entry point
//!
//! Inputs come from the environment (INPUT_FILE, OUTPUT_FILE,
//! SEARCH_AND_REPLACE, ...); flags override them.
//! Diagnostics go to stderr; `--summary-json` prints the run summary to stdout.
//! Returns 1 on any argument, configuration, parse, validation or I/O failure.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use conftemplate::{
    BooleanStyle, ConfigInputs, EngineConfig, PipelineError, RunSummary, TemplatingPipeline,
};

#[derive(Parser)]
#[command(name = "conftemplate", version)]
#[command(about = "ConfTemplate - find/replace templating for configuration files")]
struct Cli {
    /// Source document [env: INPUT_FILE]
    #[arg(short, long)]
    input_file: Option<PathBuf>,

    /// Where to write the transformed document [env: OUTPUT_FILE]
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    /// JSON directive list [env: SEARCH_AND_REPLACE]
    #[arg(short = 'r', long)]
    search_and_replace: Option<String>,

    /// Reject the run if any directive is invalid [env: STRICT_VALIDATION]
    #[arg(long)]
    strict: bool,

    /// Omit lines left blank by a replacement [env: DROP_EMPTY_LINES]
    #[arg(long)]
    drop_empty_lines: bool,

    /// Boolean literal spelling in rendered values [env: BOOLEAN_STYLE]
    #[arg(long, value_enum)]
    boolean_style: Option<BooleanStyle>,

    /// Print the run summary as JSON to stdout
    #[arg(long)]
    summary_json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigInputs {
        ConfigInputs {
            input_path: self.input_file.clone(),
            output_path: self.output_file.clone(),
            directives: self.search_and_replace.clone(),
            strict_validation: self.strict.then_some(true),
            drop_empty_lines: self.drop_empty_lines.then_some(true),
            boolean_style: self.boolean_style,
        }
    }
}

fn init_logging(verbose: bool) {
    // --verbose forces DEBUG, otherwise RUST_LOG or INFO
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<RunSummary, PipelineError> {
    let inputs = ConfigInputs::from_env()?.overlay(cli.overrides());
    let config = EngineConfig::resolve(inputs)?;
    TemplatingPipeline::new(config).run()
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            init_logging(false);
            error!("{}", e.to_string().trim_end());
            return ExitCode::FAILURE;
        }
    };
    init_logging(cli.verbose);

    let summary = match run(&cli) {
        Ok(summary) => summary,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.summary_json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize run summary: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
