use anyhow::Result;

use crate::rng::StageRng;

use super::{require, RecordBatch, Stage, StageContext};

pub struct ReliefStage;

impl Stage for ReliefStage {
    fn name(&self) -> &'static str {
        "relief"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let countries = require(&batch.countries, "countries", ctx.records)?;
        let gdp = require(&batch.gdp_per_capita, "gdp_per_capita", ctx.records)?;
        let severities = require(&batch.severities, "severities", ctx.records)?;
        let impact = &ctx.scenario.impact;
        let mut relief = Vec::with_capacity(ctx.records);
        for ((country, gdp), severity) in countries.iter().zip(gdp).zip(severities) {
            relief.push(impact.international_relief(
                ctx.relations,
                country,
                *gdp,
                *severity,
                rng,
            )?);
        }
        batch.relief = relief;
        Ok(())
    }
}

pub struct AidStage;

impl Stage for AidStage {
    fn name(&self) -> &'static str {
        "international_aid"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let gdp = require(&batch.gdp_per_capita, "gdp_per_capita", ctx.records)?;
        let affected = require(&batch.families_affected, "families_affected", ctx.records)?;
        let impact = &ctx.scenario.impact;
        batch.international_aid = gdp
            .iter()
            .zip(affected)
            .map(|(gdp, affected)| impact.international_aid(*gdp, *affected, rng))
            .collect();
        Ok(())
    }
}

/// Picks a wealthy donor and its share for every record that received aid.
pub struct DonationStage;

impl Stage for DonationStage {
    fn name(&self) -> &'static str {
        "donation"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let aid = require(&batch.international_aid, "international_aid", ctx.records)?;
        let impact = &ctx.scenario.impact;
        let mut donors = Vec::with_capacity(ctx.records);
        let mut donations = Vec::with_capacity(ctx.records);
        for amount in aid {
            donors.push(impact.donor_country(*amount, rng));
            donations.push(impact.donation_amount(*amount, rng));
        }
        batch.donor_countries = donors;
        batch.donations = donations;
        Ok(())
    }
}
