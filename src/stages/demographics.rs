use anyhow::Result;

use crate::rng::StageRng;

use super::{require, RecordBatch, Stage, StageContext};

pub struct AffectedStage;

impl Stage for AffectedStage {
    fn name(&self) -> &'static str {
        "families_affected"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let gdp = require(&batch.gdp_per_capita, "gdp_per_capita", ctx.records)?;
        let severities = require(&batch.severities, "severities", ctx.records)?;
        let impact = &ctx.scenario.impact;
        batch.families_affected = gdp
            .iter()
            .zip(severities)
            .map(|(gdp, severity)| impact.families_affected(*gdp, *severity, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }
}

pub struct DisplacedStage;

impl Stage for DisplacedStage {
    fn name(&self) -> &'static str {
        "families_displaced"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let affected = require(&batch.families_affected, "families_affected", ctx.records)?;
        let severities = require(&batch.severities, "severities", ctx.records)?;
        let impact = &ctx.scenario.impact;
        batch.families_displaced = affected
            .iter()
            .zip(severities)
            .map(|(affected, severity)| impact.families_displaced(*affected, *severity, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }
}

pub struct VulnerableStage;

impl Stage for VulnerableStage {
    fn name(&self) -> &'static str {
        "female_and_children"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        batch: &mut RecordBatch,
        rng: &mut StageRng<'_>,
    ) -> Result<()> {
        let regions = require(&batch.regions, "regions", ctx.records)?;
        let severities = require(&batch.severities, "severities", ctx.records)?;
        let impact = &ctx.scenario.impact;
        batch.female_and_children = regions
            .iter()
            .zip(severities)
            .map(|(region, severity)| {
                impact.female_and_children_affected(*region, *severity, rng)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }
}
