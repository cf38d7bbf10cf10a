use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chartfuse_common::chart::ChartCreate;
use chartfuse_common::types::AggOp;
use chartfuse_data::csv::read_csv_path;
use chartfuse_data::Dataset;
use chartfuse_engine::{EngineConfig, FusionEngine};
use clap::{Parser, Subcommand};
use log::{error, info};
use serde::Serialize;
use strum::VariantNames;

/// Build charts from a CSV file and fuse them
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Aggregation used when fusing charts that name none
    #[arg(long, global = true, default_value = "sum", value_parser = parse_agg)]
    default_agg: AggOp,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the categorized columns and row count of a CSV file
    Profile {
        /// Path to the CSV file (header row required)
        csv_path: PathBuf,
    },

    /// Create one chart and print it
    Chart {
        csv_path: PathBuf,

        /// Chart spec as JSON, or `@path` to read it from a file
        #[arg(long)]
        spec: String,
    },

    /// Create two charts and print the chart produced by fusing them
    Fuse {
        csv_path: PathBuf,

        /// First chart spec as JSON, or `@path`
        #[arg(long)]
        chart1: String,

        /// Second chart spec as JSON, or `@path`
        #[arg(long)]
        chart2: String,
    },
}

#[derive(Serialize)]
struct DatasetProfile<'a> {
    dataset_id: &'a str,
    name: &'a str,
    rows: usize,
    dimensions: &'a [String],
    measures: &'a [String],
}

impl<'a> From<&'a Dataset> for DatasetProfile<'a> {
    fn from(dataset: &'a Dataset) -> Self {
        Self {
            dataset_id: &dataset.dataset_id,
            name: &dataset.name,
            rows: dataset.table.num_rows(),
            dimensions: &dataset.columns.dimensions,
            measures: &dataset.columns.measures,
        }
    }
}

fn parse_agg(value: &str) -> Result<AggOp, String> {
    value
        .parse()
        .map_err(|_| format!("expected one of: {}", AggOp::VARIANTS.join(", ")))
}

/// Parse a chart spec given inline or as `@path`, bound to `dataset_id`
fn load_chart_spec(arg: &str, dataset_id: &str) -> Result<ChartCreate> {
    let text = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read chart spec from {path}"))?,
        None => arg.to_string(),
    };
    let mut spec: ChartCreate =
        serde_json::from_str(&text).context("Failed to parse chart spec")?;
    spec.dataset_id = dataset_id.to_string();
    Ok(spec)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

fn load_dataset(engine: &FusionEngine, csv_path: &Path) -> Result<String> {
    let table = read_csv_path(csv_path)
        .with_context(|| format!("Failed to read {}", csv_path.display()))?;
    let name = csv_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let dataset = engine.add_dataset(name, table)?;
    info!("Loaded {}", csv_path.display());
    Ok(dataset.dataset_id.clone())
}

async fn run(cli: Cli) -> Result<()> {
    let engine = FusionEngine::in_memory().with_config(EngineConfig {
        default_agg: cli.default_agg,
        ..Default::default()
    });
    match cli.command {
        Commands::Profile { csv_path } => {
            let dataset_id = load_dataset(&engine, &csv_path)?;
            let dataset = engine.dataset(&dataset_id)?;
            print_json(&DatasetProfile::from(dataset.as_ref()), cli.pretty)
        }
        Commands::Chart { csv_path, spec } => {
            let dataset_id = load_dataset(&engine, &csv_path)?;
            let chart = engine
                .create_chart(load_chart_spec(&spec, &dataset_id)?)
                .await?;
            print_json(&chart, cli.pretty)
        }
        Commands::Fuse {
            csv_path,
            chart1,
            chart2,
        } => {
            let dataset_id = load_dataset(&engine, &csv_path)?;
            let c1 = engine
                .create_chart(load_chart_spec(&chart1, &dataset_id)?)
                .await?;
            let c2 = engine
                .create_chart(load_chart_spec(&chart2, &dataset_id)?)
                .await?;
            let fused = engine.fuse(&c1.chart_id, &c2.chart_id).await?;
            if let Some(strategy) = &fused.strategy {
                info!("Fused charts with strategy {}", strategy.kind);
            }
            print_json(&fused, cli.pretty)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;
    rt.block_on(run(cli)).inspect_err(|err| error!("{err:#}"))
}
