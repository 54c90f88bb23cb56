use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use disaster_synth::{
    pipeline::AssemblerBuilder,
    scenario::{Scenario, ScenarioLoader},
    schema::{Schema, SchemaPreset},
    sink,
    summary::DatasetSummary,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Synthetic natural-disaster dataset generator")]
struct Cli {
    /// Path to a scenario YAML file (canonical tables when omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override the number of records
    #[arg(long)]
    records: Option<usize>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output column preset (uses the scenario's schema when omitted)
    #[arg(long, value_enum)]
    schema: Option<SchemaPreset>,

    /// Destination CSV file
    #[arg(long, default_value = "output/natural_disasters_dataset.csv")]
    output: PathBuf,

    /// Also write the summary statistics as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Keep the curated relations table exactly as configured
    #[arg(long)]
    no_relations_noise: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("disaster_synth=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let scenario = match &cli.scenario {
        Some(path) => ScenarioLoader::new(".").load(path)?,
        None => Scenario::default(),
    };

    let mut builder = AssemblerBuilder::new(scenario);
    if let Some(records) = cli.records {
        builder = builder.with_records(records);
    }
    if let Some(seed) = cli.seed {
        builder = builder.with_seed(seed);
    }
    if let Some(preset) = cli.schema {
        builder = builder.with_schema(Schema::preset(preset));
    }
    if cli.no_relations_noise {
        builder = builder.without_relations_noise();
    }

    let mut assembler = builder.build()?;
    let table = assembler.generate()?;
    sink::write_csv_file(&table, &cli.output)?;
    tracing::info!(path = %cli.output.display(), rows = table.len(), "dataset written");

    let summary = DatasetSummary::from_table(&table);
    eprintln!("Dataset Summary:");
    eprint!("{summary}");
    if let Some(path) = &cli.summary_json {
        summary.write_json(path)?;
    }
    Ok(())
}
