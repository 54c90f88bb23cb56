use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};
use crate::geography::Region;

/// Half-open integer range `[low, high)`, written `[low, high]` in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange(pub u32, pub u32);

impl ValueRange {
    pub fn low(self) -> u32 {
        self.0
    }

    pub fn high(self) -> u32 {
        self.1
    }

    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> u32 {
        rng.gen_range(self.0..self.1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicProfile {
    #[serde(default = "default_gdp_ranges")]
    pub gdp_per_capita: BTreeMap<Region, ValueRange>,
    #[serde(default = "default_density_ranges")]
    pub population_density: BTreeMap<Region, ValueRange>,
    #[serde(default = "default_fallback_gdp")]
    pub fallback_gdp_per_capita: u32,
    #[serde(default = "default_fallback_density")]
    pub fallback_population_density: u32,
}

fn default_gdp_ranges() -> BTreeMap<Region, ValueRange> {
    BTreeMap::from([
        (Region::NorthAmerica, ValueRange(50_000, 70_000)),
        (Region::Europe, ValueRange(40_000, 60_000)),
        (Region::Asia, ValueRange(10_000, 30_000)),
        (Region::SouthAmerica, ValueRange(5_000, 20_000)),
        (Region::Africa, ValueRange(1_000, 10_000)),
        (Region::Australia, ValueRange(45_000, 65_000)),
    ])
}

fn default_density_ranges() -> BTreeMap<Region, ValueRange> {
    BTreeMap::from([
        (Region::NorthAmerica, ValueRange(50, 500)),
        (Region::Europe, ValueRange(100, 1_000)),
        (Region::Asia, ValueRange(300, 1_500)),
        (Region::SouthAmerica, ValueRange(50, 600)),
        (Region::Africa, ValueRange(20, 500)),
        (Region::Australia, ValueRange(10, 300)),
    ])
}

fn default_fallback_gdp() -> u32 {
    20_000
}

fn default_fallback_density() -> u32 {
    200
}

impl Default for EconomicProfile {
    fn default() -> Self {
        Self {
            gdp_per_capita: default_gdp_ranges(),
            population_density: default_density_ranges(),
            fallback_gdp_per_capita: default_fallback_gdp(),
            fallback_population_density: default_fallback_density(),
        }
    }
}

impl EconomicProfile {
    /// Fresh draw on every call; regions outside the table get the fallback.
    pub fn gdp_per_capita<R: Rng + ?Sized>(&self, region: Region, rng: &mut R) -> u32 {
        match self.gdp_per_capita.get(&region) {
            Some(range) => range.sample(rng),
            None => self.fallback_gdp_per_capita,
        }
    }

    pub fn population_density<R: Rng + ?Sized>(&self, region: Region, rng: &mut R) -> u32 {
        match self.population_density.get(&region) {
            Some(range) => range.sample(rng),
            None => self.fallback_population_density,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let tables = [
            ("gdp_per_capita", &self.gdp_per_capita),
            ("population_density", &self.population_density),
        ];
        for (name, table) in tables {
            for (region, range) in table {
                if range.low() >= range.high() {
                    return Err(GenerationError::InvalidConfig(format!(
                        "{name} range for {region} is empty: [{}, {})",
                        range.low(),
                        range.high()
                    )));
                }
            }
        }
        if self.fallback_gdp_per_capita == 0 {
            return Err(GenerationError::InvalidConfig(
                "fallback_gdp_per_capita must be positive".into(),
            ));
        }
        Ok(())
    }
}
