use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("invalid date range: end {end} precedes start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown {kind} '{value}' in {table}")]
    UnknownCategory {
        kind: &'static str,
        value: String,
        table: &'static str,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unable to write {}: {source}", path.display())]
    SinkWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerationError {
    pub fn unknown(kind: &'static str, value: impl ToString, table: &'static str) -> Self {
        GenerationError::UnknownCategory {
            kind,
            value: value.to_string(),
            table,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
