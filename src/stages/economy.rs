use anyhow::Result;
use rand::distributions::Distribution;

use crate::rng::StageRng;

use super::{require, RecordBatch, Stage, StageContext};

pub struct GdpStage;

impl Stage for GdpStage {
    fn name(&self) -> &'static str {
        "gdp_per_capita"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let regions = require(&batch.regions, "regions", ctx.records)?;
        let profile = &ctx.scenario.economy;
        batch.gdp_per_capita = regions
            .iter()
            .map(|region| profile.gdp_per_capita(*region, rng))
            .collect();
        Ok(())
    }
}

pub struct DensityStage;

impl Stage for DensityStage {
    fn name(&self) -> &'static str {
        "population_density"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let regions = require(&batch.regions, "regions", ctx.records)?;
        let profile = &ctx.scenario.economy;
        batch.population_density = regions
            .iter()
            .map(|region| profile.population_density(*region, rng))
            .collect();
        Ok(())
    }
}

/// Draws every base damage first, then scales each by a fresh economic
/// profile of its region.
pub struct DamageStage;

impl Stage for DamageStage {
    fn name(&self) -> &'static str {
        "economic_damage"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let regions = require(&batch.regions, "regions", ctx.records)?;
        let impact = &ctx.scenario.impact;
        let gamma = impact.damage_distribution()?;
        let base_damage: Vec<u64> = (0..ctx.records)
            .map(|_| gamma.sample(rng).max(0.0) as u64)
            .collect();
        batch.economic_damage = regions
            .iter()
            .zip(&base_damage)
            .map(|(region, base)| {
                impact.economic_damage(&ctx.scenario.economy, *region, *base, rng)
            })
            .collect();
        Ok(())
    }
}
