use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "South America")]
    SouthAmerica,
    Europe,
    Africa,
    Asia,
    Australia,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::NorthAmerica,
        Region::SouthAmerica,
        Region::Europe,
        Region::Africa,
        Region::Asia,
        Region::Australia,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::NorthAmerica => "North America",
            Region::SouthAmerica => "South America",
            Region::Europe => "Europe",
            Region::Africa => "Africa",
            Region::Asia => "Asia",
            Region::Australia => "Australia",
        }
    }

    /// Regions whose seasons follow the northern-hemisphere calendar.
    pub fn is_northern(self) -> bool {
        matches!(self, Region::NorthAmerica | Region::Europe | Region::Asia)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
    Catastrophic,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Minor,
        Severity::Moderate,
        Severity::Severe,
        Severity::Catastrophic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Severity::Minor => "Minor",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
            Severity::Catastrophic => "Catastrophic",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static region to countries mapping used to place each disaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionCountries(BTreeMap<Region, Vec<String>>);

impl RegionCountries {
    pub fn new(table: BTreeMap<Region, Vec<String>>) -> Self {
        Self(table)
    }

    pub fn single(region: Region, countries: &[&str]) -> Self {
        let mut table = BTreeMap::new();
        table.insert(region, countries.iter().map(|c| c.to_string()).collect());
        Self(table)
    }

    pub fn regions(&self) -> Vec<Region> {
        self.0.keys().copied().collect()
    }

    pub fn countries(&self, region: Region) -> Result<&[String]> {
        self.0
            .get(&region)
            .map(Vec::as_slice)
            .ok_or_else(|| GenerationError::unknown("region", region, "region countries"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(GenerationError::InvalidConfig(
                "region countries table must name at least one region".into(),
            ));
        }
        for (region, countries) in &self.0 {
            if countries.is_empty() {
                return Err(GenerationError::InvalidConfig(format!(
                    "region {region} has no countries"
                )));
            }
        }
        Ok(())
    }
}

impl Default for RegionCountries {
    fn default() -> Self {
        let table = [
            (Region::NorthAmerica, &["USA", "Canada", "Mexico"][..]),
            (Region::SouthAmerica, &["Brazil", "Argentina", "Chile"][..]),
            (Region::Europe, &["Germany", "France", "UK"][..]),
            (Region::Africa, &["South Africa", "Nigeria", "Kenya"][..]),
            (Region::Asia, &["India", "China", "Japan"][..]),
            (Region::Australia, &["Australia", "New Zealand"][..]),
        ]
        .into_iter()
        .map(|(region, countries)| {
            (
                region,
                countries.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
            )
        })
        .collect();
        Self(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_every_region() {
        let table = RegionCountries::default();
        assert_eq!(table.regions(), Region::ALL.to_vec());
        assert_eq!(
            table.countries(Region::Australia).unwrap(),
            &["Australia".to_string(), "New Zealand".to_string()]
        );
    }

    #[test]
    fn missing_region_is_an_unknown_category() {
        let table = RegionCountries::single(Region::Europe, &["France"]);
        let err = table.countries(Region::Asia).unwrap_err();
        assert!(matches!(err, GenerationError::UnknownCategory { .. }));
    }

    #[test]
    fn empty_country_list_fails_validation() {
        let table = RegionCountries::single(Region::Africa, &[]);
        assert!(matches!(
            table.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn region_names_round_trip_through_yaml() {
        let region: Region = serde_yaml::from_str("\"North America\"").unwrap();
        assert_eq!(region, Region::NorthAmerica);
        assert_eq!(region.to_string(), "North America");
    }
}
