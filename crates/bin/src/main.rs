//! Hobart CLI binary.
//!
//! `extract` turns accounts archives into a metrics CSV, `join` merges that
//! CSV with the company snapshot, and `vocabulary` prints the metric
//! vocabulary as editable JSON.

use clap::{Parser, Subcommand};
use hobart::data::RunCounters;
use hobart::output::{EnrichmentMap, JoinEngine};
use hobart::{ExtractionPipeline, RunConfig};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "hobart")]
#[command(about = "Financial metrics from Companies House accounts", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON run configuration; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract metrics from accounts archives
    Extract {
        /// Archive files, or directories of archives
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Metrics CSV to write
        #[arg(short, long, default_value = "all_metrics.csv")]
        output: PathBuf,

        /// Vocabulary JSON file
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Minimum label match confidence
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Left-join a metrics CSV with the company snapshot
    Join {
        /// Metrics CSV produced by `extract`
        #[arg(long, default_value = "all_metrics.csv")]
        metrics: PathBuf,

        /// Basic company data snapshot (.csv or .zip)
        #[arg(long)]
        snapshot: PathBuf,

        /// Merged CSV to write
        #[arg(short, long, default_value = "merged_metrics.csv")]
        output: PathBuf,

        /// Metrics rows per chunk
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Also count distinct unmatched company numbers
        #[arg(long)]
        distinct_unmatched: bool,
    },

    /// Print the metric vocabulary as JSON
    Vocabulary {
        /// Vocabulary JSON file to validate and print instead of the built-in one
        #[arg(long)]
        vocabulary: Option<PathBuf>,
    },
}

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_path(path)?,
        None => RunConfig::default(),
    };

    match cli.command {
        Commands::Extract {
            inputs,
            output,
            vocabulary,
            threshold,
        } => {
            if vocabulary.is_some() {
                config.vocabulary = vocabulary;
            }
            if let Some(threshold) = threshold {
                config.fuzzy_threshold = threshold;
            }
            extract(&config, &inputs, &output)?;
        }
        Commands::Join {
            metrics,
            snapshot,
            output,
            chunk_size,
            distinct_unmatched,
        } => {
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            config.track_distinct_unmatched |= distinct_unmatched;
            join(&config, &metrics, &snapshot, &output)?;
        }
        Commands::Vocabulary { vocabulary } => {
            if vocabulary.is_some() {
                config.vocabulary = vocabulary;
            }
            println!("{}", config.load_vocabulary()?.to_json()?);
        }
    }

    Ok(())
}

fn extract(
    config: &RunConfig,
    inputs: &[PathBuf],
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = ExtractionPipeline::from_config(config)?;
    info!(
        "Vocabulary {} at threshold {}",
        pipeline.normalizer().vocabulary_version(),
        pipeline.normalizer().threshold()
    );

    let mut archives = Vec::new();
    for input in inputs {
        if input.is_dir() {
            archives.extend(hobart::data::archives_in(input)?);
        } else {
            archives.push(input.clone());
        }
    }

    let mut counters = RunCounters::default();
    let rows = pipeline.run(&archives, output, &mut counters)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "output": output.display().to_string(),
            "archives": archives.len(),
            "rows_written": rows,
            "counters": counters,
        }))?
    );
    Ok(())
}

fn join(
    config: &RunConfig,
    metrics: &Path,
    snapshot: &Path,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    let enrichment = EnrichmentMap::from_path(snapshot)?;
    let engine = JoinEngine::new(&enrichment, config.join_config())?;

    let mut counters = RunCounters::default();
    let summary = engine.run_paths(metrics, output, &mut counters)?;

    if let Some(distinct) = summary.distinct_unmatched {
        info!("Unique company numbers with no match: {}", distinct);
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
