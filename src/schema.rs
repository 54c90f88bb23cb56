//! Output columns and the presets that select them.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    SerialNumber,
    Date,
    Season,
    Region,
    Country,
    GdpPerCapita,
    PopulationDensity,
    EconomicDamage,
    Severity,
    InternationalRelief,
    ReliefDonor,
    FamiliesAffected,
    FamiliesDisplaced,
    InternationalAid,
    DonorCountry,
    DonationAmount,
    FemaleAndChildrenAffected,
}

impl Column {
    pub const ALL: [Column; 17] = [
        Column::SerialNumber,
        Column::Date,
        Column::Season,
        Column::Region,
        Column::Country,
        Column::GdpPerCapita,
        Column::PopulationDensity,
        Column::EconomicDamage,
        Column::Severity,
        Column::InternationalRelief,
        Column::ReliefDonor,
        Column::FamiliesAffected,
        Column::FamiliesDisplaced,
        Column::InternationalAid,
        Column::DonorCountry,
        Column::DonationAmount,
        Column::FemaleAndChildrenAffected,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::SerialNumber => "S.no",
            Column::Date => "Date",
            Column::Season => "Season",
            Column::Region => "Region",
            Column::Country => "Country",
            Column::GdpPerCapita => "GDP per Capita ($)",
            Column::PopulationDensity => "Population Density (per sq km)",
            Column::EconomicDamage => "Economic Damage (Million $)",
            Column::Severity => "Disaster Severity",
            Column::InternationalRelief => "International Relief Received ($ Million)",
            Column::ReliefDonor => "Relief Donor",
            Column::FamiliesAffected => "Families Affected",
            Column::FamiliesDisplaced => "Families Displaced",
            Column::InternationalAid => "International Aid ($)",
            Column::DonorCountry => "Donor Country",
            Column::DonationAmount => "Donation Amount ($)",
            Column::FemaleAndChildrenAffected => "% of Female and Children Affected",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPreset {
    /// Relief-centred table: damage, severity, relief and demographics.
    Relief,
    /// Displacement-centred table: economy, families and aid donations.
    Displacement,
    /// Every column the generator knows.
    Full,
}

/// Ordered list of columns a generated table carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SchemaSpec", into = "SchemaSpec")]
pub struct Schema {
    columns: Vec<Column>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum SchemaSpec {
    Preset(SchemaPreset),
    Columns(Vec<Column>),
}

impl From<SchemaSpec> for Schema {
    fn from(spec: SchemaSpec) -> Self {
        match spec {
            SchemaSpec::Preset(preset) => Schema::preset(preset),
            SchemaSpec::Columns(columns) => Schema::new(columns),
        }
    }
}

impl From<Schema> for SchemaSpec {
    fn from(schema: Schema) -> Self {
        SchemaSpec::Columns(schema.columns)
    }
}

impl Schema {
    /// Keeps the first occurrence of each column.
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        let mut schema = Self {
            columns: Vec::new(),
        };
        for column in columns {
            schema.push(column);
        }
        schema
    }

    pub fn preset(preset: SchemaPreset) -> Self {
        match preset {
            SchemaPreset::Relief => Self::new([
                Column::SerialNumber,
                Column::Date,
                Column::Season,
                Column::Region,
                Column::Country,
                Column::EconomicDamage,
                Column::Severity,
                Column::InternationalRelief,
                Column::FemaleAndChildrenAffected,
            ]),
            SchemaPreset::Displacement => Self::new([
                Column::SerialNumber,
                Column::Date,
                Column::Season,
                Column::Region,
                Column::Country,
                Column::GdpPerCapita,
                Column::PopulationDensity,
                Column::EconomicDamage,
                Column::Severity,
                Column::FamiliesAffected,
                Column::FamiliesDisplaced,
                Column::InternationalAid,
                Column::DonorCountry,
                Column::DonationAmount,
            ]),
            SchemaPreset::Full => Self::new(Column::ALL),
        }
    }

    pub fn push(&mut self, column: Column) {
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn contains(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header()).collect()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::preset(SchemaPreset::Full)
    }
}
