use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use dotenvy::dotenv;
use tracing::info;

use rf_common::cleaning::OutcomeConfig;
use rf_common::embedding::HashEmbedder;
use rf_common::features::{FeatureConfig, ScoringContext, DEFAULT_REFERENCE_ADDRESS};
use rf_common::geo::{Geocoder, NominatimClient, NullGeocoder};
use rf_common::pipeline::{self, PipelineConfig};
use rf_common::{logging, Table, Value};

const APP_NAME: &str = "rf-pipeline";

#[derive(Debug, Parser)]
#[command(name = APP_NAME, about = "Clean a candidate-event extract and compute match features")]
struct Args {
    /// Candidate/job-event extract to process.
    #[arg(long)]
    input: PathBuf,

    /// Where the cleaned and scored table is written.
    #[arg(long)]
    output: PathBuf,

    /// Columns that must hold one value per true identity, comma separated.
    #[arg(
        long,
        env = "RF_INVARIANT_COLUMNS",
        default_value = "Study Title,Study area,Residence Italian City,Residence Italian Province,Residence Italian Region,Residence Country"
    )]
    invariant_columns: String,

    /// Address every candidate's residence is measured against.
    #[arg(long, env = "RF_REFERENCE_ADDRESS", default_value = DEFAULT_REFERENCE_ADDRESS)]
    reference_address: String,

    /// Skip the external geocoding service; proximity columns stay empty.
    #[arg(long)]
    offline: bool,

    /// Optional comma-separated subset of columns to keep in the output.
    #[arg(long, env = "RF_KEEP_COLUMNS")]
    keep_columns: Option<String>,
}

fn main() {
    dotenv().ok();
    logging::init_tracing_subscriber(APP_NAME);
    logging::install_tracing_panic_hook(APP_NAME);

    let args = Args::parse();
    if let Err(err) = run(&args) {
        tracing::error!(error = %err, "pipeline run failed");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut table = read_table(&args.input)?;
    info!(
        rows = table.len(),
        columns = table.columns().len(),
        input = %args.input.display(),
        "loaded extract"
    );

    let geocoder: Box<dyn Geocoder> = if args.offline {
        Box::new(NullGeocoder)
    } else {
        Box::new(NominatimClient::new()?)
    };
    let mut ctx = ScoringContext::new(Box::new(HashEmbedder::default()), geocoder)
        .with_reference_address(args.reference_address.clone());

    let config = PipelineConfig {
        invariant_columns: split_list(&args.invariant_columns),
        outcome: OutcomeConfig::default(),
        features: FeatureConfig::default(),
    };
    let summary = pipeline::run(&mut table, &config, &mut ctx)?;

    if let Some(keep) = &args.keep_columns {
        let keep: Vec<String> = split_list(keep);
        let keep: Vec<&str> = keep.iter().map(String::as_str).collect();
        table.retain_columns(&keep);
    }

    write_table(&table, &args.output)?;
    println!(
        "ids {} -> {} | early-stage removed {} | non-progressing removed {} | rows scored {}",
        summary.reconcile.unique_ids_before,
        summary.reconcile.unique_ids_after,
        summary.early_stage.ids_removed,
        summary.outcome.ids_removed,
        summary.rows_scored
    );
    Ok(())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_table(path: &Path) -> Result<Table, Box<dyn Error>> {
    let mut reader = csv::ReaderBuilder::new().flexible(false).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(headers)?;
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(Value::from_csv_field).collect())?;
    }
    Ok(table)
}

fn write_table(table: &Table, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in table.to_csv_records() {
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
