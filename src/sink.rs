use std::fs;
use std::io;
use std::path::Path;

use crate::error::{GenerationError, Result};
use crate::pipeline::DisasterTable;

/// Writes the header row followed by one row per record.
pub fn write_csv<W: io::Write>(table: &DisasterTable, writer: W) -> io::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(table.headers())?;
    for row in table.rows() {
        csv.write_record(&row)?;
    }
    csv.flush()
}

pub fn write_csv_file(table: &DisasterTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let sink_error = |source: io::Error| GenerationError::SinkWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(sink_error)?;
    }
    let file = fs::File::create(path).map_err(sink_error)?;
    write_csv(table, io::BufWriter::new(file)).map_err(sink_error)
}
