//! splitscore CLI: the main entry point.
//!
//! ```text
//! splitscore <input.csv> [--config PATH] [--verbose]
//! ```
//!
//! Splits every message in the input CSV with the splitter model, grades
//! each result with the evaluator model, writes both workbooks to the output
//! directory and prints the average scores.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use splitscore::pipeline::{self, Pipeline, RunReport};
use splitscore_agent::ATTENTION_THRESHOLD;
use splitscore_config::AppConfig;
use splitscore_providers::OpenAiCompatProvider;

#[derive(Parser)]
#[command(
    name = "splitscore",
    about = "Split free-text messages into categories and grade the result",
    version
)]
struct Cli {
    /// Input CSV: a path, or a file name inside the data input directory
    input: Option<PathBuf>,

    /// Config file to use instead of ~/.splitscore/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let Some(input) = cli.input else {
        eprintln!("{}", Cli::command().render_usage());
        return ExitCode::FAILURE;
    };

    match run(&input, cli.config).await {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("An error occurred: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    input: &std::path::Path,
    config_path: Option<PathBuf>,
) -> splitscore_core::Result<RunReport> {
    let config = match config_path {
        Some(path) => AppConfig::load_with(&path),
        None => AppConfig::load(),
    }
    .map_err(pipeline::config_error)?;

    let provider = Arc::new(OpenAiCompatProvider::from_config(&config)?);
    let pipeline = Pipeline::from_config(&config, provider)?;

    let input = pipeline::resolve_input(&config, input);
    let output_dir = config.ensure_output_dir().map_err(pipeline::config_error)?;

    pipeline.run(&input, &output_dir).await
}

fn print_report(report: &RunReport) {
    println!("Total messages processed: {}", report.processed);
    println!("Split results written to {}", report.split_path.display());
    println!(
        "Evaluation results written to {}",
        report.evaluation_path.display()
    );

    if report.summary.is_empty() {
        return;
    }

    println!("\nAverage evaluation scores:");
    for (metric, average) in report.summary.averages() {
        println!("{}: {average:.2}", metric.label());
    }
    for (metric, _) in report.summary.below(ATTENTION_THRESHOLD) {
        println!("ATTENTION: the {metric} score is below {ATTENTION_THRESHOLD}.");
    }
}
