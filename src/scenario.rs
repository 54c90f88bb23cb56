use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    calendar::DateRange,
    error::GenerationError,
    geography::{RegionCountries, Severity},
    impact::ImpactTables,
    profile::EconomicProfile,
    relations::{RelationsGraph, RelationsNoise},
    schema::{Column, Schema},
    stages::StageId,
};

fn default_name() -> String {
    "natural_disasters".to_string()
}

fn default_seed() -> u64 {
    42
}

fn default_records() -> usize {
    10_000
}

fn default_severity_weights() -> BTreeMap<Severity, f64> {
    BTreeMap::from([
        (Severity::Minor, 0.4),
        (Severity::Moderate, 0.3),
        (Severity::Severe, 0.2),
        (Severity::Catastrophic, 0.1),
    ])
}

/// Immutable generator configuration. Every section falls back to the
/// canonical tables when omitted from the YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_records")]
    pub records: usize,
    #[serde(default)]
    pub dates: DateRange,
    #[serde(default)]
    pub schema: Schema,
    #[serde(default)]
    pub regions: RegionCountries,
    #[serde(default = "default_severity_weights")]
    pub severity_weights: BTreeMap<Severity, f64>,
    #[serde(default)]
    pub relations: RelationsGraph,
    #[serde(default)]
    pub relations_noise: RelationsNoise,
    #[serde(default)]
    pub economy: EconomicProfile,
    #[serde(default)]
    pub impact: ImpactTables,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: default_name(),
            seed: default_seed(),
            records: default_records(),
            dates: DateRange::default(),
            schema: Schema::default(),
            regions: RegionCountries::default(),
            severity_weights: default_severity_weights(),
            relations: RelationsGraph::default(),
            relations_noise: RelationsNoise::default(),
            economy: EconomicProfile::default(),
            impact: ImpactTables::default(),
        }
    }
}

impl Scenario {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(text).context("Failed to parse scenario")?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.records == 0 {
            return Err(GenerationError::InvalidConfig(
                "record count must be greater than zero".into(),
            ));
        }
        if self.schema.is_empty() {
            return Err(GenerationError::InvalidConfig(
                "schema must name at least one column".into(),
            ));
        }
        self.dates.validate()?;
        self.regions.validate()?;
        let weights_ok = self
            .severity_weights
            .values()
            .all(|w| w.is_finite() && *w >= 0.0);
        if !weights_ok || !self.severity_weights.values().any(|w| *w > 0.0) {
            return Err(GenerationError::InvalidConfig(
                "severity weights must be non-negative with at least one positive".into(),
            ));
        }
        self.economy.validate()?;
        self.impact.validate()?;
        self.relations.validate()?;
        self.relations_noise.validate()?;
        if self.needs_relations() && self.relations.donors().is_empty() {
            return Err(GenerationError::InvalidConfig(
                "relief columns need at least one donor in the relations table".into(),
            ));
        }
        Ok(())
    }

    fn needs_relations(&self) -> bool {
        self.schema
            .columns()
            .iter()
            .any(|c| StageId::producing(*c) == Some(StageId::Relief))
    }

    pub fn with_columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.schema = Schema::new(columns);
        self
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geography::Region;

    #[test]
    fn empty_document_yields_canonical_scenario() {
        let scenario = Scenario::from_yaml("{}").unwrap();
        assert_eq!(scenario, Scenario::default());
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let text = r#"
name: tiny
seed: 9
records: 25
schema: relief
regions:
  Africa: [Kenya]
relations_noise:
  enabled: false
"#;
        let scenario = Scenario::from_yaml(text).unwrap();
        assert_eq!(scenario.name, "tiny");
        assert_eq!(scenario.records, 25);
        assert_eq!(scenario.regions.regions(), vec![Region::Africa]);
        assert!(!scenario.relations_noise.enabled);
        assert_eq!(scenario.relations_noise.decrement, 0.1);
        assert_eq!(scenario.economy, EconomicProfile::default());
    }

    #[test]
    fn zero_records_is_rejected() {
        let scenario = Scenario {
            records: 0,
            ..Scenario::default()
        };
        assert!(matches!(
            scenario.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let text = r#"
dates:
  start: 2024-01-01
  end: 2023-01-01
"#;
        let scenario = Scenario::from_yaml(text).unwrap();
        assert!(matches!(
            scenario.validate(),
            Err(GenerationError::InvalidRange { .. })
        ));
    }

    #[test]
    fn relief_without_donors_is_rejected() {
        let scenario = Scenario {
            relations: RelationsGraph::empty(),
            ..Scenario::default()
        }
        .with_columns([Column::InternationalRelief]);
        assert!(scenario.validate().is_err());

        let no_relief = Scenario {
            relations: RelationsGraph::empty(),
            ..Scenario::default()
        }
        .with_columns([Column::FamiliesDisplaced]);
        assert!(no_relief.validate().is_ok());
    }

    #[test]
    fn negative_relation_weight_is_rejected() {
        let text = r#"
relations:
  USA:
    Kenya: -0.5
relations_noise:
  enabled: false
"#;
        let scenario = Scenario::from_yaml(text).unwrap();
        assert!(matches!(
            scenario.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn nan_noise_probability_is_rejected() {
        let text = r#"
relations_noise:
  probability: .nan
"#;
        let scenario = Scenario::from_yaml(text).unwrap();
        assert!(matches!(
            scenario.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn nan_vulnerable_bound_is_rejected() {
        let text = r#"
impact:
  vulnerable_bounds: [.nan, 75.0]
"#;
        let scenario = Scenario::from_yaml(text).unwrap();
        assert!(matches!(
            scenario.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn all_zero_severity_weights_are_rejected() {
        let mut scenario = Scenario::default();
        for weight in scenario.severity_weights.values_mut() {
            *weight = 0.0;
        }
        assert!(scenario.validate().is_err());
    }
}
