//! Column-wise derivation stages run by the dataset assembler.
//!
//! A stage reads the columns its dependencies produced from the
//! [`RecordBatch`] and writes exactly one group of new columns. Stages always
//! run in [`StageId`] order and each one owns a random stream named after it.

mod demographics;
mod economy;
mod placement;
mod relief;

use anyhow::{bail, Result};
use chrono::NaiveDate;

pub use demographics::{AffectedStage, DisplacedStage, VulnerableStage};
pub use economy::{DamageStage, DensityStage, GdpStage};
pub use placement::{CalendarStage, CountryStage, RegionStage, SeverityStage};
pub use relief::{AidStage, DonationStage, ReliefStage};

use crate::{
    calendar::Season,
    geography::{Region, Severity},
    impact::Relief,
    relations::RelationsGraph,
    rng::StageRng,
    scenario::Scenario,
    schema::Column,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageId {
    Regions,
    Countries,
    Calendar,
    GdpPerCapita,
    PopulationDensity,
    EconomicDamage,
    Severity,
    Relief,
    FamiliesAffected,
    FamiliesDisplaced,
    Aid,
    Donation,
    Vulnerable,
}

impl StageId {
    /// Stages every table needs regardless of its columns.
    pub const CORE: [StageId; 4] = [
        StageId::Regions,
        StageId::Countries,
        StageId::Calendar,
        StageId::Severity,
    ];

    pub fn dependencies(self) -> &'static [StageId] {
        match self {
            StageId::Regions | StageId::Severity => &[],
            StageId::Countries
            | StageId::Calendar
            | StageId::GdpPerCapita
            | StageId::PopulationDensity
            | StageId::EconomicDamage => &[StageId::Regions],
            StageId::Relief => &[StageId::Countries, StageId::GdpPerCapita, StageId::Severity],
            StageId::FamiliesAffected => &[StageId::GdpPerCapita, StageId::Severity],
            StageId::FamiliesDisplaced => &[StageId::FamiliesAffected, StageId::Severity],
            StageId::Aid => &[StageId::GdpPerCapita, StageId::FamiliesAffected],
            StageId::Donation => &[StageId::Aid],
            StageId::Vulnerable => &[StageId::Regions, StageId::Severity],
        }
    }

    pub fn producing(column: Column) -> Option<StageId> {
        match column {
            Column::SerialNumber => None,
            Column::Date | Column::Season => Some(StageId::Calendar),
            Column::Region => Some(StageId::Regions),
            Column::Country => Some(StageId::Countries),
            Column::GdpPerCapita => Some(StageId::GdpPerCapita),
            Column::PopulationDensity => Some(StageId::PopulationDensity),
            Column::EconomicDamage => Some(StageId::EconomicDamage),
            Column::Severity => Some(StageId::Severity),
            Column::InternationalRelief | Column::ReliefDonor => Some(StageId::Relief),
            Column::FamiliesAffected => Some(StageId::FamiliesAffected),
            Column::FamiliesDisplaced => Some(StageId::FamiliesDisplaced),
            Column::InternationalAid => Some(StageId::Aid),
            Column::DonorCountry | Column::DonationAmount => Some(StageId::Donation),
            Column::FemaleAndChildrenAffected => Some(StageId::Vulnerable),
        }
    }

    /// Core stages plus everything the columns need, transitively, in run order.
    pub fn resolve(columns: &[Column]) -> Vec<StageId> {
        let mut pending: Vec<StageId> = StageId::CORE.to_vec();
        pending.extend(columns.iter().filter_map(|c| StageId::producing(*c)));
        let mut resolved: Vec<StageId> = Vec::new();
        while let Some(stage) = pending.pop() {
            if resolved.contains(&stage) {
                continue;
            }
            resolved.push(stage);
            pending.extend_from_slice(stage.dependencies());
        }
        resolved.sort();
        resolved
    }

    pub fn build(self) -> Box<dyn Stage> {
        match self {
            StageId::Regions => Box::new(RegionStage),
            StageId::Countries => Box::new(CountryStage),
            StageId::Calendar => Box::new(CalendarStage),
            StageId::GdpPerCapita => Box::new(GdpStage),
            StageId::PopulationDensity => Box::new(DensityStage),
            StageId::EconomicDamage => Box::new(DamageStage),
            StageId::Severity => Box::new(SeverityStage),
            StageId::Relief => Box::new(ReliefStage),
            StageId::FamiliesAffected => Box::new(AffectedStage),
            StageId::FamiliesDisplaced => Box::new(DisplacedStage),
            StageId::Aid => Box::new(AidStage),
            StageId::Donation => Box::new(DonationStage),
            StageId::Vulnerable => Box::new(VulnerableStage),
        }
    }
}

pub struct StageContext<'a> {
    pub records: usize,
    pub scenario: &'a Scenario,
    pub relations: &'a RelationsGraph,
}

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()>;
}

/// Columnar working set; a column stays empty until its stage has run.
#[derive(Debug, Default)]
pub struct RecordBatch {
    pub regions: Vec<Region>,
    pub countries: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub seasons: Vec<Season>,
    pub gdp_per_capita: Vec<u32>,
    pub population_density: Vec<u32>,
    pub economic_damage: Vec<u64>,
    pub severities: Vec<Severity>,
    pub relief: Vec<Relief>,
    pub families_affected: Vec<u64>,
    pub families_displaced: Vec<u64>,
    pub international_aid: Vec<f64>,
    pub donor_countries: Vec<String>,
    pub donations: Vec<f64>,
    pub female_and_children: Vec<f64>,
}

pub(crate) fn require<'a, T>(column: &'a [T], name: &str, records: usize) -> Result<&'a [T]> {
    if column.len() != records {
        bail!(
            "column '{name}' holds {} values, expected {records}",
            column.len()
        );
    }
    Ok(column)
}
