mod logging;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::Parser;
use fixgen_core::{Error as CoreError, load_schema_config};
use fixgen_generate::{FixtureEngine, GenerateOptions, GenerationError, GenerationReport};
use thiserror::Error;
use tracing::{error, info};

use logging::init_logging;
use settings::{FixgenSettings, load_settings};

#[derive(Debug, Error)]
enum CliError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("settings error: {0}")]
    Settings(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Generation(#[from] GenerationError),
    #[error("logging error: {0}")]
    Logging(String),
}

impl CliError {
    /// 2 for bad input the user can fix, 1 for failed runs.
    fn exit_code(&self) -> u8 {
        match self {
            CliError::InvalidArgs(_) | CliError::Settings(_) | CliError::Core(_) => 2,
            CliError::Generation(GenerationError::InvalidSchema(_))
            | CliError::Generation(GenerationError::InvalidOptions(_)) => 2,
            _ => 1,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "fixgen",
    version,
    about = "Generate test fixtures and oracles from a schema config"
)]
struct Cli {
    /// Schema config JSON file.
    #[arg(value_name = "CONFIG_FILE")]
    config: PathBuf,
    /// Existing directory that receives one sub-directory per class.
    #[arg(value_name = "OUTPUT_DIRECTORY")]
    out_dir: PathBuf,
    /// Settings file (defaults to ./fixgen.toml when present).
    #[arg(long, value_name = "TOML")]
    settings: Option<PathBuf>,
    /// Sample rows per class and variant.
    #[arg(long)]
    rows: Option<usize>,
    /// Seed for every synthesized value.
    #[arg(long)]
    seed: Option<u64>,
    /// Base instant for date fields (RFC 3339).
    #[arg(long, value_name = "RFC3339", value_parser = parse_anchor)]
    anchor: Option<DateTime<Utc>>,
    /// CSV quote character.
    #[arg(long)]
    quote: Option<char>,
    /// Nesting limit for referenced classes.
    #[arg(long)]
    max_levels: Option<usize>,
    /// Fail when any class in the config had to be skipped.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Append JSON logs to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "fixgen failed");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(cli.settings.as_deref())?;
    let log_file = cli.log_file.clone().or_else(|| settings.log_file.clone());
    init_logging(log_file.as_deref())?;

    if !cli.config.is_file() {
        return Err(CliError::InvalidArgs(format!(
            "config file not found: {}",
            cli.config.display()
        )));
    }
    if !cli.out_dir.is_dir() {
        return Err(CliError::InvalidArgs(format!(
            "output directory does not exist: {}",
            cli.out_dir.display()
        )));
    }

    let options = resolve_options(&cli, &settings);
    let loaded = load_schema_config(&cli.config)?;
    info!(
        config = %cli.config.display(),
        classes = loaded.config.classes.len(),
        skipped = loaded.skipped_classes(),
        "config loaded"
    );

    match FixtureEngine::new(options).run(&loaded) {
        Ok(result) => {
            print_summary(&result.report);
            println!(
                "report: {}",
                result.out_dir.join("generation_report.json").display()
            );
            Ok(())
        }
        Err(GenerationError::Failed(report)) => {
            print_summary(&report);
            for issue in &report.errors {
                eprintln!(
                    "failed: {} ({})",
                    issue.class.as_deref().unwrap_or("-"),
                    issue.message
                );
            }
            Err(GenerationError::Failed(report).into())
        }
        Err(err) => Err(err.into()),
    }
}

/// Defaults, then settings, then flags.
fn resolve_options(cli: &Cli, settings: &FixgenSettings) -> GenerateOptions {
    let mut options = GenerateOptions {
        out_dir: cli.out_dir.clone(),
        ..GenerateOptions::default()
    };
    settings.apply(&mut options);

    if let Some(rows) = cli.rows {
        options.rows = rows;
    }
    if let Some(seed) = cli.seed {
        options.seed = seed;
    }
    if let Some(anchor) = cli.anchor {
        options.anchor = Some(anchor);
    }
    if let Some(quote) = cli.quote {
        options.quote = quote;
    }
    if let Some(max_levels) = cli.max_levels {
        options.max_levels = max_levels;
    }
    if cli.strict {
        options.strict = true;
    }
    options
}

fn print_summary(report: &GenerationReport) {
    for class in &report.classes {
        println!(
            "{}: {} rows, {} invalid, {} patch, {} search, {} files",
            class.class,
            class.rows,
            class.invalid_cases,
            class.patch_cases,
            class.search_cases,
            class.files.len()
        );
    }
    if !report.warnings.is_empty() {
        println!("warnings: {}", report.warnings.len());
    }
}

fn parse_anchor(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|anchor| anchor.with_timezone(&Utc))
        .map_err(|err| format!("invalid RFC 3339 instant '{value}': {err}"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn flags_override_settings() {
        let cli = Cli::parse_from([
            "fixgen",
            "schema.json",
            "out",
            "--seed",
            "5",
            "--quote",
            "\"",
        ]);
        let settings = FixgenSettings {
            seed: Some(1),
            rows: Some(4),
            ..FixgenSettings::default()
        };

        let options = resolve_options(&cli, &settings);
        assert_eq!(options.seed, 5);
        assert_eq!(options.rows, 4);
        assert_eq!(options.quote, '"');
        assert_eq!(options.out_dir, PathBuf::from("out"));
    }

    #[test]
    fn anchor_accepts_offsets() {
        let anchor = parse_anchor("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(anchor, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(parse_anchor("yesterday").is_err());
    }

    #[test]
    fn missing_positionals_are_usage_errors() {
        let err = Cli::try_parse_from(["fixgen", "schema.json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn exit_codes_separate_input_errors_from_failures() {
        assert_eq!(CliError::InvalidArgs("x".to_string()).exit_code(), 2);
        let report = GenerationReport::new("run".to_string(), 0, String::new(), 1);
        assert_eq!(CliError::from(GenerationError::Failed(report)).exit_code(), 1);
    }
}
