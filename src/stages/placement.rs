use anyhow::{Context, Result};
use chrono::Datelike;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;

use crate::{
    calendar::{sample_dates, season_for},
    error::GenerationError,
    geography::Severity,
    rng::StageRng,
};

use super::{require, RecordBatch, Stage, StageContext};

pub struct RegionStage;

impl Stage for RegionStage {
    fn name(&self) -> &'static str {
        "regions"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let regions = ctx.scenario.regions.regions();
        batch.regions = (0..ctx.records)
            .map(|_| {
                regions.choose(rng).copied().ok_or_else(|| {
                    GenerationError::InvalidConfig("no regions to sample from".into())
                })
            })
            .collect::<Result<Vec<_>, GenerationError>>()?;
        Ok(())
    }
}

pub struct CountryStage;

impl Stage for CountryStage {
    fn name(&self) -> &'static str {
        "countries"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let regions = require(&batch.regions, "regions", ctx.records)?;
        let mut countries = Vec::with_capacity(ctx.records);
        for region in regions {
            let candidates = ctx.scenario.regions.countries(*region)?;
            let country = candidates
                .choose(rng)
                .with_context(|| format!("region {region} has no countries"))?;
            countries.push(country.clone());
        }
        batch.countries = countries;
        Ok(())
    }
}

pub struct CalendarStage;

impl Stage for CalendarStage {
    fn name(&self) -> &'static str {
        "calendar"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let regions = require(&batch.regions, "regions", ctx.records)?;
        let dates = sample_dates(rng, &ctx.scenario.dates, ctx.records)?;
        batch.seasons = dates
            .iter()
            .zip(regions)
            .map(|(date, region)| season_for(date.month(), *region))
            .collect();
        batch.dates = dates;
        Ok(())
    }
}

pub struct SeverityStage;

impl Stage for SeverityStage {
    fn name(&self) -> &'static str {
        "severity"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let weights: Vec<f64> = Severity::ALL
            .iter()
            .map(|s| ctx.scenario.severity_weights.get(s).copied().unwrap_or(0.0))
            .collect();
        let index = WeightedIndex::new(&weights).map_err(|err| {
            GenerationError::InvalidConfig(format!("severity weights {weights:?}: {err}"))
        })?;
        batch.severities = (0..ctx.records)
            .map(|_| Severity::ALL[index.sample(rng)])
            .collect();
        Ok(())
    }
}
