//! Fraud Detection Gateway - Main Entry Point
//!
//! Labels uploaded CSV batches or a single manually entered transaction with
//! a pre-trained classifier, and writes the labeled results back out as CSV.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fraud_detection_gateway::{
    batch,
    config::{AppConfig, LoggingConfig},
    manual::ManualEntry,
    report::{self, SummaryReport},
    InferenceGateway, ModelLoader, FEATURE_COLUMNS,
};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "fraud-gateway",
    version,
    about = "Label card transactions as genuine or fraudulent"
)]
struct Cli {
    /// Configuration file (defaults to config/gateway.toml when present)
    #[arg(long, global = true, env = "FRAUD_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Serialized classifier, overriding model.path
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Label every row of a CSV file with the 30 schema columns
    Batch {
        /// CSV file with a header row
        input: PathBuf,

        /// Where to write the labeled CSV (defaults to output.file_name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rows to show in the preview table
        #[arg(long)]
        show: Option<usize>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Label a single transaction entered field by field
    Manual {
        /// Field assignment; unset fields are 0
        #[arg(long = "set", value_name = "NAME=VALUE")]
        assignments: Vec<String>,

        /// Prompt for each field on stdin
        #[arg(short, long)]
        interactive: bool,
    },

    /// Print the expected CSV columns in order
    Schema,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    let is_upload = matches!(cli.command, Command::Batch { .. });

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, is_upload);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("fraud_detection_gateway={}", logging.level).parse()?)
        .add_directive(format!("fraud_gateway={}", logging.level).parse()?);

    // Logs go to stderr; stdout carries results
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn run(cli: Cli, config: AppConfig) -> Result<()> {
    if let Command::Schema = cli.command {
        let mut out = io::stdout().lock();
        for column in FEATURE_COLUMNS {
            writeln!(out, "{}", column)?;
        }
        return Ok(());
    }

    // Load the classifier once; it is shared read-only from here on
    let model_path = cli
        .model
        .unwrap_or_else(|| PathBuf::from(&config.model.path));
    let classifier = ModelLoader::from_config(&config.model)
        .load(&model_path, config.model.format)
        .context("Failed to load classifier")?;
    let gateway = InferenceGateway::new(classifier);
    info!(model = %gateway.classifier_name(), path = %model_path.display(), "Classifier ready");

    match cli.command {
        Command::Batch {
            input,
            output,
            show,
            json,
        } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.output.file_name));
            let show = show.unwrap_or(config.output.preview_rows);
            run_batch(&gateway, &input, &output, show, json)
        }
        Command::Manual {
            assignments,
            interactive,
        } => run_manual(&gateway, &assignments, interactive),
        Command::Schema => Ok(()),
    }
}

fn run_batch(
    gateway: &InferenceGateway,
    input: &Path,
    output: &Path,
    show: usize,
    json: bool,
) -> Result<()> {
    info!(input = %input.display(), "Processing upload");

    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let records = batch::ingest(gateway, BufReader::new(file))?;
    let results = gateway.predict(records)?;
    let summary = InferenceGateway::summarize(&results);

    let mut out = io::stdout().lock();
    writeln!(out, "Prediction completed!")?;
    report::render_preview(&mut out, &results, show)?;
    writeln!(out)?;

    if json {
        let summary_report = SummaryReport::new(gateway.classifier_name(), summary);
        serde_json::to_writer_pretty(&mut out, &summary_report)?;
        writeln!(out)?;
    } else {
        report::render_summary(&mut out, &summary)?;
    }

    batch::write_results_to_path(output, &results)?;
    writeln!(out, "Results written to {}", output.display())?;

    Ok(())
}

fn run_manual(gateway: &InferenceGateway, assignments: &[String], interactive: bool) -> Result<()> {
    let mut entry = ManualEntry::new();
    for assignment in assignments {
        entry.apply(assignment)?;
    }

    if interactive {
        entry.prompt(io::stdin().lock(), io::stdout())?;
    }

    let result = gateway.predict_one(entry.finish())?;
    report::render_verdict(&mut io::stdout().lock(), &result)?;
    Ok(())
}

fn report_error(e: &anyhow::Error, is_upload: bool) {
    report::render_error(&mut io::stderr().lock(), e, is_upload).ok();
}
