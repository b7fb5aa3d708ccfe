//! Result export: rows to a file in a caller-chosen format.
//!
//! Unknown formats are a hard error rather than a silent default; a bad
//! format string is a programmer mistake, not a data condition.

use crate::error::{PrismError, Result};
use crate::types::{Column, Value};
use serde_json::Map;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = PrismError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            "json" => Ok(ExportFormat::Json),
            other => Err(PrismError::UnsupportedFormat(other.to_string())),
        }
    }
}

pub fn export(
    columns: &[Column],
    rows: &[Vec<Value>],
    path: &Path,
    format: ExportFormat,
) -> Result<()> {
    match format {
        ExportFormat::Csv => write_delimited(columns, rows, path, b','),
        ExportFormat::Tsv => write_delimited(columns, rows, path, b'\t'),
        ExportFormat::Json => write_json(columns, rows, path),
    }?;
    info!(path = %path.display(), rows = rows.len(), "exported result");
    Ok(())
}

fn write_delimited(
    columns: &[Column],
    rows: &[Vec<Value>],
    path: &Path,
    delimiter: u8,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;

    writer.write_record(columns.iter().map(|c| c.name.as_str()))?;
    for row in rows {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(columns: &[Column], rows: &[Vec<Value>], path: &Path) -> Result<()> {
    let objects: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for (column, value) in columns.iter().zip(row) {
                object.insert(column.name.clone(), value.to_json());
            }
            serde_json::Value::Object(object)
        })
        .collect();

    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &objects)?;
    Ok(())
}
