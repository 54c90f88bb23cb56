//! Impact derivations: damage, relief, displacement, aid and demographics.
//!
//! Every derivation is a function of upstream samples, the constant tables in
//! [`ImpactTables`] and fresh draws from the caller's rng. Draw order inside
//! each function is fixed, so a seeded stream reproduces its output exactly.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::Gamma;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};
use crate::geography::{Region, Severity};
use crate::profile::{EconomicProfile, ValueRange};
use crate::relations::RelationsGraph;

pub const NO_DONOR: &str = "None";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactTables {
    #[serde(default = "default_damage_shape")]
    pub damage_shape: f64,
    #[serde(default = "default_damage_scale")]
    pub damage_scale: f64,
    #[serde(default = "default_relief_base")]
    pub relief_base: ValueRange,
    #[serde(default = "default_severity_factor")]
    pub severity_factor: BTreeMap<Severity, f64>,
    #[serde(default = "default_affected_base")]
    pub affected_base: ValueRange,
    #[serde(default = "default_displacement_ratio")]
    pub displacement_ratio: BTreeMap<Severity, f64>,
    #[serde(default = "default_displacement_cap")]
    pub displacement_cap: f64,
    #[serde(default = "default_jitter")]
    pub jitter: f64,
    #[serde(default = "default_aid_per_family")]
    pub aid_per_family: f64,
    #[serde(default = "default_aid_gdp_decay")]
    pub aid_gdp_decay: f64,
    #[serde(default = "default_wealthy_donors")]
    pub wealthy_donors: Vec<String>,
    #[serde(default = "default_donation_share")]
    pub donation_share: (f64, f64),
    #[serde(default = "default_vulnerable_base_rate")]
    pub vulnerable_base_rate: BTreeMap<Region, f64>,
    #[serde(default = "default_vulnerable_severity_factor")]
    pub vulnerable_severity_factor: BTreeMap<Severity, f64>,
    #[serde(default = "default_vulnerable_bounds")]
    pub vulnerable_bounds: (f64, f64),
    #[serde(default = "default_vulnerable_jitter")]
    pub vulnerable_jitter: f64,
}

fn default_damage_shape() -> f64 {
    2.0
}

fn default_damage_scale() -> f64 {
    500.0
}

fn default_relief_base() -> ValueRange {
    ValueRange(5, 15)
}

fn default_severity_factor() -> BTreeMap<Severity, f64> {
    BTreeMap::from([
        (Severity::Minor, 1.0),
        (Severity::Moderate, 2.0),
        (Severity::Severe, 3.0),
        (Severity::Catastrophic, 5.0),
    ])
}

fn default_affected_base() -> ValueRange {
    ValueRange(100, 1_000)
}

fn default_displacement_ratio() -> BTreeMap<Severity, f64> {
    BTreeMap::from([
        (Severity::Minor, 0.1),
        (Severity::Moderate, 0.3),
        (Severity::Severe, 0.5),
        (Severity::Catastrophic, 0.5),
    ])
}

fn default_displacement_cap() -> f64 {
    0.5
}

fn default_jitter() -> f64 {
    0.1
}

fn default_aid_per_family() -> f64 {
    1_000.0
}

fn default_aid_gdp_decay() -> f64 {
    50_000.0
}

fn default_wealthy_donors() -> Vec<String> {
    ["USA", "UK", "Germany", "France", "Japan", "Canada", "Australia"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_donation_share() -> (f64, f64) {
    (0.05, 0.10)
}

fn default_vulnerable_base_rate() -> BTreeMap<Region, f64> {
    BTreeMap::from([
        (Region::NorthAmerica, 0.1),
        (Region::Europe, 0.1),
        (Region::Australia, 0.1),
        (Region::Asia, 0.4),
        (Region::SouthAmerica, 0.4),
        (Region::Africa, 0.5),
    ])
}

fn default_vulnerable_severity_factor() -> BTreeMap<Severity, f64> {
    BTreeMap::from([
        (Severity::Minor, 1.0),
        (Severity::Moderate, 1.5),
        (Severity::Severe, 2.0),
        (Severity::Catastrophic, 3.0),
    ])
}

fn default_vulnerable_bounds() -> (f64, f64) {
    (55.0, 75.0)
}

fn default_vulnerable_jitter() -> f64 {
    5.0
}

impl Default for ImpactTables {
    fn default() -> Self {
        Self {
            damage_shape: default_damage_shape(),
            damage_scale: default_damage_scale(),
            relief_base: default_relief_base(),
            severity_factor: default_severity_factor(),
            affected_base: default_affected_base(),
            displacement_ratio: default_displacement_ratio(),
            displacement_cap: default_displacement_cap(),
            jitter: default_jitter(),
            aid_per_family: default_aid_per_family(),
            aid_gdp_decay: default_aid_gdp_decay(),
            wealthy_donors: default_wealthy_donors(),
            donation_share: default_donation_share(),
            vulnerable_base_rate: default_vulnerable_base_rate(),
            vulnerable_severity_factor: default_vulnerable_severity_factor(),
            vulnerable_bounds: default_vulnerable_bounds(),
            vulnerable_jitter: default_vulnerable_jitter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relief {
    pub donor: String,
    pub amount: f64,
}

impl ImpactTables {
    pub fn validate(&self) -> Result<()> {
        if self.relief_base.low() >= self.relief_base.high()
            || self.affected_base.low() >= self.affected_base.high()
        {
            return Err(GenerationError::InvalidConfig(
                "relief_base and affected_base must be non-empty ranges".into(),
            ));
        }
        if !(0.0..=0.5).contains(&self.displacement_cap) {
            return Err(GenerationError::InvalidConfig(format!(
                "displacement_cap {} must lie in [0, 0.5]",
                self.displacement_cap
            )));
        }
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(GenerationError::InvalidConfig(format!(
                "jitter {} must lie in [0, 1)",
                self.jitter
            )));
        }
        let (low, high) = self.donation_share;
        if !low.is_finite() || !high.is_finite() || low < 0.0 || low > high {
            return Err(GenerationError::InvalidConfig(format!(
                "donation_share ({low}, {high}) is not an ordered non-negative pair"
            )));
        }
        let (floor, ceiling) = self.vulnerable_bounds;
        let bounded = [floor, ceiling, self.vulnerable_jitter]
            .iter()
            .all(|v| v.is_finite());
        if !bounded || floor > ceiling || self.vulnerable_jitter < 0.0 {
            return Err(GenerationError::InvalidConfig(
                "vulnerable_bounds must be finite and ordered, vulnerable_jitter finite and non-negative"
                    .into(),
            ));
        }
        if !self.aid_per_family.is_finite() || !self.aid_gdp_decay.is_finite() {
            return Err(GenerationError::InvalidConfig(
                "aid_per_family and aid_gdp_decay must be finite".into(),
            ));
        }
        if self.wealthy_donors.is_empty() {
            return Err(GenerationError::InvalidConfig(
                "wealthy_donors must list at least one country".into(),
            ));
        }
        Ok(())
    }

    pub fn damage_distribution(&self) -> Result<Gamma<f64>> {
        Gamma::new(self.damage_shape, self.damage_scale).map_err(|err| {
            GenerationError::InvalidConfig(format!(
                "gamma(shape {}, scale {}): {err}",
                self.damage_shape, self.damage_scale
            ))
        })
    }

    /// Scales a base damage by a fresh GDP and density draw for the region.
    pub fn economic_damage<R: Rng + ?Sized>(
        &self,
        profile: &EconomicProfile,
        region: Region,
        base_damage: u64,
        rng: &mut R,
    ) -> u64 {
        let gdp_factor = profile.gdp_per_capita(region, rng) as f64 / 10_000.0;
        let density_factor = profile.population_density(region, rng) as f64 / 100.0;
        (base_damage as f64 * gdp_factor * density_factor) as u64
    }

    pub fn international_relief<R: Rng + ?Sized>(
        &self,
        relations: &RelationsGraph,
        country: &str,
        gdp_per_capita: u32,
        severity: Severity,
        rng: &mut R,
    ) -> Result<Relief> {
        let base = self.relief_base.sample(rng) as f64;
        let factor = self.severity_factor(severity)?;
        let donors = relations.donors();
        let donor = donors.choose(rng).ok_or_else(|| {
            GenerationError::InvalidConfig("relations graph has no donors".into())
        })?;
        let score = relations.relation_score(donor, country);
        let amount = base * inverse_gdp(gdp_per_capita) * factor * score;
        Ok(Relief {
            donor: donor.to_string(),
            amount: round_to(amount, 2),
        })
    }

    pub fn families_affected<R: Rng + ?Sized>(
        &self,
        gdp_per_capita: u32,
        severity: Severity,
        rng: &mut R,
    ) -> Result<u64> {
        let base = self.affected_base.sample(rng) as f64;
        let factor = self.severity_factor(severity)?;
        let affected = jitter(rng, base * factor * inverse_gdp(gdp_per_capita), self.jitter);
        Ok(affected.round().max(0.0) as u64)
    }

    /// Never exceeds `displacement_cap` of the affected families, jitter included.
    pub fn families_displaced<R: Rng + ?Sized>(
        &self,
        affected: u64,
        severity: Severity,
        rng: &mut R,
    ) -> Result<u64> {
        let ratio = self
            .displacement_ratio
            .get(&severity)
            .copied()
            .ok_or_else(|| GenerationError::unknown("severity", severity, "displacement ratio"))?
            .min(self.displacement_cap);
        let affected = affected as f64;
        let displaced = jitter(rng, affected * ratio, self.jitter);
        let cap = affected * self.displacement_cap;
        Ok(displaced.min(cap).max(0.0).floor() as u64)
    }

    pub fn international_aid<R: Rng + ?Sized>(
        &self,
        gdp_per_capita: u32,
        affected: u64,
        rng: &mut R,
    ) -> f64 {
        let base = affected as f64 * self.aid_per_family;
        let decayed = base * (-(gdp_per_capita as f64) / self.aid_gdp_decay).exp();
        round_to(jitter(rng, decayed, self.jitter).max(0.0), 2)
    }

    pub fn donor_country<R: Rng + ?Sized>(&self, aid: f64, rng: &mut R) -> String {
        if aid <= 0.0 {
            return NO_DONOR.to_string();
        }
        self.wealthy_donors
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| NO_DONOR.to_string())
    }

    pub fn donation_amount<R: Rng + ?Sized>(&self, aid: f64, rng: &mut R) -> f64 {
        if aid <= 0.0 {
            return 0.0;
        }
        let (low, high) = self.donation_share;
        aid * rng.gen_range(low..=high)
    }

    /// Percentage of affected people who are women or children.
    pub fn female_and_children_affected<R: Rng + ?Sized>(
        &self,
        region: Region,
        severity: Severity,
        rng: &mut R,
    ) -> Result<f64> {
        let rate = self
            .vulnerable_base_rate
            .get(&region)
            .copied()
            .ok_or_else(|| GenerationError::unknown("region", region, "vulnerable base rate"))?;
        let factor = self
            .vulnerable_severity_factor
            .get(&severity)
            .copied()
            .ok_or_else(|| {
                GenerationError::unknown("severity", severity, "vulnerable severity factor")
            })?;
        let (floor, ceiling) = self.vulnerable_bounds;
        let share = (rate * factor * 100.0).clamp(floor, ceiling);
        let spread = self.vulnerable_jitter;
        let share = share + rng.gen_range(-spread..=spread);
        Ok(round_to(share, 2))
    }

    fn severity_factor(&self, severity: Severity) -> Result<f64> {
        self.severity_factor
            .get(&severity)
            .copied()
            .ok_or_else(|| GenerationError::unknown("severity", severity, "severity factor"))
    }
}

fn inverse_gdp(gdp_per_capita: u32) -> f64 {
    10_000.0 / gdp_per_capita.max(1) as f64
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, value: f64, fraction: f64) -> f64 {
    value * (1.0 + rng.gen_range(-fraction..=fraction))
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}
