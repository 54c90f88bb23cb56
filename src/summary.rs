//! Describe-style statistics over the numeric columns of a table.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{GenerationError, Result};
use crate::pipeline::DisasterTable;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl DatasetSummary {
    pub fn from_table(table: &DisasterTable) -> Self {
        let columns = table
            .schema()
            .columns()
            .iter()
            .filter_map(|column| describe(column.header(), table.numeric_column(*column)))
            .collect();
        Self {
            rows: table.len(),
            columns,
        }
    }

    pub fn column(&self, header: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.column == header)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let sink_error = |source: std::io::Error| GenerationError::SinkWrite {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|err| sink_error(err.into()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(sink_error)?;
        }
        fs::write(path, json).map_err(sink_error)
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .columns
            .iter()
            .map(|c| c.column.len())
            .max()
            .unwrap_or(6)
            .max(6);
        writeln!(
            f,
            "{:<width$} {:>8} {:>14} {:>14} {:>12} {:>12} {:>12} {:>12} {:>14}",
            "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for c in &self.columns {
            writeln!(
                f,
                "{:<width$} {:>8} {:>14.4} {:>14.4} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
                c.column, c.count, c.mean, c.std, c.min, c.p25, c.p50, c.p75, c.max
            )?;
        }
        Ok(())
    }
}

fn describe(header: &str, mut values: Vec<f64>) -> Option<ColumnSummary> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    // sample standard deviation
    let std = if count > 1 {
        let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (sum_sq / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };
    Some(ColumnSummary {
        column: header.to_string(),
        count,
        mean,
        std,
        min: values[0],
        p25: quantile(&values, 0.25),
        p50: quantile(&values, 0.5),
        p75: quantile(&values, 0.75),
        max: values[count - 1],
    })
}

/// Linear interpolation between closest ranks of sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_matches_hand_computed_values() {
        let summary = describe("x", vec![4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert!((summary.std - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.p25, 1.75);
        assert_eq!(summary.p50, 2.5);
        assert_eq!(summary.p75, 3.25);
        assert_eq!(summary.max, 4.0);
    }

    #[test]
    fn single_value_has_undefined_std() {
        let summary = describe("x", vec![9.0]).unwrap();
        assert!(summary.std.is_nan());
        assert_eq!(summary.p75, 9.0);
    }

    #[test]
    fn empty_column_is_skipped() {
        assert!(describe("x", Vec::new()).is_none());
    }

    #[test]
    fn json_summary_creates_missing_directories() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("reports").join("nested").join("summary.json");
        let summary = DatasetSummary {
            rows: 3,
            columns: describe("Families Affected", vec![10.0, 20.0, 30.0])
                .into_iter()
                .collect(),
        };
        summary.write_json(&path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["rows"], 3);
        assert_eq!(written["columns"][0]["column"], "Families Affected");
        assert_eq!(written["columns"][0]["p50"], 20.0);
    }
}
