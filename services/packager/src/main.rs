//! Forecast packaging demonstration.
//!
//! Simulates a toy two-species forecast, then packages one iteration the
//! standard way: a Zarr array container for the raw ensemble, a
//! full-ensemble CSV, a summary CSV, and a validated metadata record
//! serialized to XML and JSON.

mod metadata;
mod simulate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use forecast_core::ForecastIdentifiers;
use forecast_output::{ContainerWriter, EnsembleTable, SummaryTable};

use simulate::SimulationConfig;

#[derive(Parser, Debug)]
#[command(name = "packager")]
#[command(about = "Package a demonstration forecast into standard exchange formats")]
struct Args {
    /// Output directory for all artifacts
    #[arg(short, long, default_value = "forecast-output")]
    output: PathBuf,

    /// First forecast date (YYYY-MM-DD)
    #[arg(long, default_value = "2001-03-04")]
    start: NaiveDate,

    /// Forecast horizon in days
    #[arg(long, default_value_t = 30)]
    days: usize,

    /// Number of ensemble members
    #[arg(long, default_value_t = 10)]
    ensembles: u32,

    /// RNG seed for the demonstration simulation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(days = args.days, ensembles = args.ensembles, "simulating demonstration forecast");

    let config = SimulationConfig {
        start: args.start,
        days: args.days,
        depths: vec![1.0, 3.0, 5.0],
        ensembles: args.ensembles,
        seed: args.seed,
    };
    let (dims, tensor, flags) = simulate::run(&config).context("simulation failed")?;

    let issue_time = args
        .start
        .and_hms_opt(6, 0, 0)
        .context("invalid issue time")?;
    let ids = ForecastIdentifiers::new(
        "logistic-demo",
        "v0.1",
        issue_time.format("%Y%m%dT%H%M%S").to_string(),
    )?;

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("creating output directory {}", args.output.display()))?;

    // Array container for the raw ensemble.
    let container_path = args.output.join("forecast.zarr");
    ContainerWriter::write_to_path(
        &container_path,
        &tensor,
        &dims,
        &flags,
        &ids,
        metadata::SPECIES_UNIT,
    )
    .context("writing array container")?;
    info!(path = %container_path.display(), "wrote array container");

    // Long-format ensemble table and its summary companion.
    let table = EnsembleTable::from_tensor(&tensor, &dims, &flags)
        .context("flattening ensemble table")?;
    let ensemble_path = args.output.join("forecast-ensemble.csv");
    table
        .write_csv(&ensemble_path)
        .context("writing ensemble table")?;
    info!(path = %ensemble_path.display(), rows = table.row_count(), "wrote ensemble table");

    let summary = SummaryTable::from_ensemble(&table);
    let summary_path = args.output.join("forecast-summary.csv");
    summary
        .write_csv(&summary_path)
        .context("writing summary table")?;
    info!(path = %summary_path.display(), rows = summary.row_count(), "wrote summary table");

    // Metadata record: assemble, validate, then (and only then) serialize.
    let record = metadata::build_record(&dims, &ids, issue_time, "forecast-ensemble.csv")
        .context("assembling metadata record")?;
    let columns = metadata::ensemble_columns(&dims);
    let validated = record
        .validate(&columns)
        .context("validating metadata record")?;

    let xml_path = args.output.join("forecast-metadata.xml");
    std::fs::write(&xml_path, validated.to_xml()).context("writing metadata XML")?;
    info!(path = %xml_path.display(), "wrote metadata document");

    let json_path = args.output.join("forecast-metadata.json");
    let json = serde_json::to_string_pretty(&validated.to_json())?;
    std::fs::write(&json_path, json).context("writing metadata JSON")?;
    info!(path = %json_path.display(), "wrote metadata graph form");

    info!(package_id = %validated.record().package_id, "forecast iteration packaged");
    Ok(())
}
