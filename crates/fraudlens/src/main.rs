use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fraudlens_core::chart::{counts_table, render_svg, ChartOptions};
use fraudlens_core::config::{
    PipelineConfig, CHART_PATH_ENV, CORRUPT_MODE_ENV, DEFAULT_PREVIEW_ROWS, INPUT_ENV,
};
use fraudlens_core::{outputs, pipeline, preview};
use fraudlens_parser::{load_json_lines, CorruptRecordMode};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Credit-card transaction cleanup and fraud summary", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a JSON lines file, print a preview and the fraud counts
    Run(RunArgs),
    /// Print the processed column layout of a JSON lines file
    Schema(SchemaArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Permissive,
    DropMalformed,
    FailFast,
}

impl From<ModeArg> for CorruptRecordMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Permissive => CorruptRecordMode::Permissive,
            ModeArg::DropMalformed => CorruptRecordMode::DropMalformed,
            ModeArg::FailFast => CorruptRecordMode::FailFast,
        }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Newline-delimited JSON input (falls back to FRAUDLENS_INPUT)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Handling of lines that are not JSON objects (falls back to FRAUDLENS_CORRUPT_MODE)
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Number of processed rows to print
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,
    /// Write the grouped bar chart as SVG (falls back to FRAUDLENS_CHART_PATH)
    #[arg(long)]
    chart: Option<PathBuf>,
    /// Write the processed rows as parquet
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write the run report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Newline-delimited JSON input (falls back to FRAUDLENS_INPUT)
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Schema(args) => handle_schema(args),
    }
}

fn resolve_input(input: Option<PathBuf>) -> Result<PathBuf> {
    match input {
        Some(path) => Ok(path),
        None => env::var(INPUT_ENV)
            .map(PathBuf::from)
            .with_context(|| format!("--input (or {INPUT_ENV}) must be set")),
    }
}

fn resolve_mode(mode: Option<ModeArg>) -> Result<CorruptRecordMode> {
    match mode {
        Some(mode) => Ok(mode.into()),
        None => match env::var(CORRUPT_MODE_ENV) {
            Ok(value) => value
                .parse::<CorruptRecordMode>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid {CORRUPT_MODE_ENV}")),
            Err(_) => Ok(CorruptRecordMode::default()),
        },
    }
}

fn handle_run(args: RunArgs) -> Result<()> {
    let config = PipelineConfig::new(resolve_input(args.input)?)
        .with_corrupt_mode(resolve_mode(args.mode)?)
        .with_preview_rows(args.preview_rows);
    let chart_path = args
        .chart
        .or_else(|| env::var(CHART_PATH_ENV).ok().map(PathBuf::from));

    info!(input = %config.input.display(), mode = %config.corrupt_mode, "starting run");
    let run = pipeline::run_pipeline(&config)
        .with_context(|| format!("pipeline failed for {}", config.input.display()))?;

    let table = preview::preview_table(&run.processed, config.preview_rows)
        .context("failed to format preview")?;
    println!("{table}");
    println!(
        "{} rows processed ({} corrupt lines)",
        run.report.output_rows,
        run.report.load.corrupt_lines.len()
    );

    match &run.summary {
        Some(summary) => {
            println!("{}", counts_table(summary));
            if let Some(path) = chart_path.as_deref() {
                let written = render_svg(summary, &ChartOptions::default())
                    .context("failed to render chart")
                    .and_then(|svg| outputs::write_chart(&svg, path));
                if let Err(err) = written {
                    warn!(error = %err, "chart could not be written");
                }
            }
        }
        None => warn!("fraud summary unavailable; skipping chart"),
    }

    if let Some(path) = args.output.as_deref() {
        outputs::write_parquet(&run.processed, path)?;
    }
    if let Some(path) = args.report.as_deref() {
        outputs::write_run_report(&run.report, path)?;
    }

    Ok(())
}

fn handle_schema(args: SchemaArgs) -> Result<()> {
    let input = resolve_input(args.input)?;
    let loaded = load_json_lines(&input, CorruptRecordMode::Permissive)
        .with_context(|| format!("failed to load {}", input.display()))?;
    let sample = loaded.frame.head(Some(1));
    let processed = pipeline::process_frame(sample).context("failed to process sample row")?;

    for column in processed.frame.get_columns() {
        println!("{}\t{}", column.name(), column.dtype());
    }
    Ok(())
}
