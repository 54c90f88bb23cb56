use std::fmt;

use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};
use crate::geography::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
    Unknown,
}

impl Season {
    pub fn name(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive span of calendar days disasters are placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(GenerationError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MAX),
        }
    }
}

/// Draws `n` days uniformly, with replacement, from the inclusive range.
pub fn sample_dates<R: Rng + ?Sized>(
    rng: &mut R,
    range: &DateRange,
    n: usize,
) -> Result<Vec<NaiveDate>> {
    range.validate()?;
    let span = range.span_days();
    Ok((0..n)
        .map(|_| range.start + Duration::days(rng.gen_range(0..=span)))
        .collect())
}

pub fn season_for(month: u32, region: Region) -> Season {
    let northern = match month {
        12 | 1 | 2 => Season::Winter,
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        9..=11 => Season::Autumn,
        _ => return Season::Unknown,
    };
    if region.is_northern() {
        northern
    } else {
        match northern {
            Season::Winter => Season::Summer,
            Season::Spring => Season::Autumn,
            Season::Summer => Season::Winter,
            Season::Autumn => Season::Spring,
            Season::Unknown => Season::Unknown,
        }
    }
}
