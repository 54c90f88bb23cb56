//! Dataset assembler: seeds the streams, runs the stages a schema needs and
//! folds the columnar batch into one record per index.

use std::fmt;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::{
    calendar::Season,
    geography::{Region, Severity},
    relations::RelationsGraph,
    rng::RngManager,
    scenario::Scenario,
    schema::{Column, Schema},
    stages::{RecordBatch, Stage, StageContext, StageId},
};

/// Name of the stream that drives the one-time relations perturbation.
pub const RELATIONS_STREAM: &str = "relations";

pub struct AssemblerBuilder {
    scenario: Scenario,
}

impl AssemblerBuilder {
    pub fn new(scenario: Scenario) -> Self {
        Self { scenario }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.scenario.schema = schema;
        self
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.scenario.schema.push(column);
        self
    }

    pub fn with_records(mut self, records: usize) -> Self {
        self.scenario.records = records;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.scenario.seed = seed;
        self
    }

    pub fn without_relations_noise(mut self) -> Self {
        self.scenario.relations_noise.enabled = false;
        self
    }

    pub fn build(self) -> Result<Assembler> {
        let scenario = self.scenario;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario '{}'", scenario.name))?;

        let mut relations = scenario.relations.clone();
        let mut rng = RngManager::new(scenario.seed);
        let weakened = relations.perturb(
            &mut rng.stream(RELATIONS_STREAM),
            &scenario.relations_noise,
        );
        debug!(
            weakened,
            edges = relations.edge_count(),
            "perturbed relations graph"
        );

        let stages = StageId::resolve(scenario.schema.columns())
            .into_iter()
            .map(StageId::build)
            .collect();

        Ok(Assembler {
            scenario,
            relations,
            stages,
        })
    }
}

pub struct Assembler {
    scenario: Scenario,
    relations: RelationsGraph,
    stages: Vec<Box<dyn Stage>>,
}

impl Assembler {
    pub fn schema(&self) -> &Schema {
        &self.scenario.schema
    }

    /// The relations graph after the seeded perturbation pass.
    pub fn relations(&self) -> &RelationsGraph {
        &self.relations
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs every stage from freshly seeded streams; repeated calls return
    /// identical tables.
    pub fn generate(&mut self) -> Result<DisasterTable> {
        let records = self.scenario.records;
        info!(
            scenario = %self.scenario.name,
            seed = self.scenario.seed,
            records,
            "generating disaster records"
        );
        let mut rng = RngManager::new(self.scenario.seed);
        let mut batch = RecordBatch::default();
        let ctx = StageContext {
            records,
            scenario: &self.scenario,
            relations: &self.relations,
        };
        for stage in &mut self.stages {
            let name = stage.name();
            let mut stream = rng.stream(name);
            stage
                .run(&ctx, &mut batch, &mut stream)
                .with_context(|| format!("stage '{name}' failed"))?;
            debug!(stage = name, "stage complete");
        }
        let table = DisasterTable::assemble(self.scenario.schema.clone(), records, batch);
        info!(rows = table.len(), "dataset assembled");
        Ok(table)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisasterRecord {
    pub serial: u64,
    pub date: NaiveDate,
    pub season: Season,
    pub region: Region,
    pub country: String,
    pub severity: Severity,
    pub gdp_per_capita: Option<u32>,
    pub population_density: Option<u32>,
    pub economic_damage: Option<u64>,
    pub international_relief: Option<f64>,
    pub relief_donor: Option<String>,
    pub families_affected: Option<u64>,
    pub families_displaced: Option<u64>,
    pub international_aid: Option<f64>,
    pub donor_country: Option<String>,
    pub donation_amount: Option<f64>,
    pub female_and_children_affected: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(u64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(value) => Some(*value as f64),
            Cell::Float(value) => Some(*value),
            Cell::Text(_) | Cell::Date(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(value) => write!(f, "{value}"),
            Cell::Float(value) => write!(f, "{value}"),
            Cell::Text(value) => f.write_str(value),
            Cell::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
        }
    }
}

impl DisasterRecord {
    pub fn cell(&self, column: Column) -> Option<Cell> {
        match column {
            Column::SerialNumber => Some(Cell::Int(self.serial)),
            Column::Date => Some(Cell::Date(self.date)),
            Column::Season => Some(Cell::Text(self.season.to_string())),
            Column::Region => Some(Cell::Text(self.region.to_string())),
            Column::Country => Some(Cell::Text(self.country.clone())),
            Column::Severity => Some(Cell::Text(self.severity.to_string())),
            Column::GdpPerCapita => self.gdp_per_capita.map(|v| Cell::Int(v as u64)),
            Column::PopulationDensity => self.population_density.map(|v| Cell::Int(v as u64)),
            Column::EconomicDamage => self.economic_damage.map(Cell::Int),
            Column::InternationalRelief => self.international_relief.map(Cell::Float),
            Column::ReliefDonor => self.relief_donor.clone().map(Cell::Text),
            Column::FamiliesAffected => self.families_affected.map(Cell::Int),
            Column::FamiliesDisplaced => self.families_displaced.map(Cell::Int),
            Column::InternationalAid => self.international_aid.map(Cell::Float),
            Column::DonorCountry => self.donor_country.clone().map(Cell::Text),
            Column::DonationAmount => self.donation_amount.map(Cell::Float),
            Column::FemaleAndChildrenAffected => {
                self.female_and_children_affected.map(Cell::Float)
            }
        }
    }
}

/// Final flat table handed to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct DisasterTable {
    schema: Schema,
    records: Vec<DisasterRecord>,
}

impl DisasterTable {
    fn assemble(schema: Schema, records: usize, mut batch: RecordBatch) -> Self {
        let mut relief = std::mem::take(&mut batch.relief).into_iter();
        let mut countries = std::mem::take(&mut batch.countries).into_iter();
        let mut donors = std::mem::take(&mut batch.donor_countries).into_iter();
        let rows = (0..records)
            .map(|i| {
                let relief = relief.next();
                DisasterRecord {
                    serial: i as u64 + 1,
                    date: batch.dates[i],
                    season: batch.seasons[i],
                    region: batch.regions[i],
                    country: countries.next().unwrap_or_default(),
                    severity: batch.severities[i],
                    gdp_per_capita: batch.gdp_per_capita.get(i).copied(),
                    population_density: batch.population_density.get(i).copied(),
                    economic_damage: batch.economic_damage.get(i).copied(),
                    international_relief: relief.as_ref().map(|r| r.amount),
                    relief_donor: relief.map(|r| r.donor),
                    families_affected: batch.families_affected.get(i).copied(),
                    families_displaced: batch.families_displaced.get(i).copied(),
                    international_aid: batch.international_aid.get(i).copied(),
                    donor_country: donors.next(),
                    donation_amount: batch.donations.get(i).copied(),
                    female_and_children_affected: batch.female_and_children.get(i).copied(),
                }
            })
            .collect();
        Self {
            schema,
            records: rows,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[DisasterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.schema.headers()
    }

    /// Cells for the schema's columns; a column whose stage did not run is blank.
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.records.iter().map(|record| {
            self.schema
                .columns()
                .iter()
                .map(|column| {
                    record
                        .cell(*column)
                        .map(|cell| cell.to_string())
                        .unwrap_or_default()
                })
                .collect()
        })
    }

    pub fn numeric_column(&self, column: Column) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|record| record.cell(column).and_then(|cell| cell.as_f64()))
            .collect()
    }
}
