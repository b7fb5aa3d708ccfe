//! Tabular ingestion: CSV and JSON files into typed columns and rows.
//!
//! Column names are cleaned the same way regardless of source (trimmed,
//! spaces and dashes become underscores). Types are inferred per column:
//! all-integer wins Integer, otherwise anything numeric wins Real,
//! otherwise Text. Empty CSV cells and JSON nulls become NULL without
//! affecting the column type.

use crate::error::{PrismError, Result};
use crate::types::{Column, DataType, Value};
use std::fs::File;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

/// Clean a table or column name: trim, spaces/dashes to underscores.
pub fn sanitize_name(raw: &str) -> String {
    raw.trim().replace([' ', '-'], "_")
}

/// Default table name for a file: its sanitized stem.
pub fn table_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("data");
    sanitize_name(stem)
}

pub fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().from_path(path)?;

    let columns_raw: Vec<String> = reader.headers()?.iter().map(sanitize_name).collect();

    let mut records: Vec<csv::StringRecord> = Vec::new();
    for record in reader.records() {
        records.push(record?);
    }

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(records.len());
    for record in &records {
        let row = (0..columns_raw.len())
            .map(|i| parse_cell(record.get(i).unwrap_or("")))
            .collect();
        rows.push(row);
    }

    let columns = infer_columns(columns_raw, &rows);
    debug!(path = %path.display(), rows = rows.len(), "loaded csv");
    Ok(Dataset { columns, rows })
}

pub fn load_json(path: &Path) -> Result<Dataset> {
    let file = File::open(path)?;
    let payload: serde_json::Value = serde_json::from_reader(file)?;

    let objects = payload
        .as_array()
        .ok_or_else(|| PrismError::Ingest("expected a top-level JSON array".to_string()))?;

    let first = objects
        .first()
        .and_then(|v| v.as_object())
        .ok_or_else(|| PrismError::Ingest("expected an array of objects".to_string()))?;

    let columns_raw: Vec<String> = first.keys().map(|k| sanitize_name(k)).collect();
    let keys: Vec<String> = first.keys().cloned().collect();

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(objects.len());
    for object in objects {
        let object = object
            .as_object()
            .ok_or_else(|| PrismError::Ingest("expected an array of objects".to_string()))?;
        let row = keys
            .iter()
            .map(|key| json_to_value(object.get(key).unwrap_or(&serde_json::Value::Null)))
            .collect();
        rows.push(row);
    }

    let columns = infer_columns(columns_raw, &rows);
    debug!(path = %path.display(), rows = rows.len(), "loaded json");
    Ok(Dataset { columns, rows })
}

fn parse_cell(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(r) = trimmed.parse::<f64>() {
        if r.is_finite() {
            return Value::Real(r);
        }
    }
    Value::Text(trimmed.to_string())
}

fn json_to_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(i64::from(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::Text(s.clone()),
        // nested structures are stored as their JSON text
        other => Value::Text(other.to_string()),
    }
}

fn infer_columns(names: Vec<String>, rows: &[Vec<Value>]) -> Vec<Column> {
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let data_type = rows
                .iter()
                .map(|row| row[i].data_type())
                .fold(DataType::Null, unify);
            Column { name, data_type }
        })
        .collect()
}

fn unify(a: DataType, b: DataType) -> DataType {
    use DataType::*;
    match (a, b) {
        (Null, t) | (t, Null) => t,
        (x, y) if x == y => x,
        (Integer, Real) | (Real, Integer) => Real,
        _ => Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("  order id "), "order_id");
        assert_eq!(sanitize_name("my-table"), "my_table");
        assert_eq!(sanitize_name("plain"), "plain");
    }

    #[test]
    fn test_table_name_from_path() {
        assert_eq!(
            table_name_from_path(Path::new("/tmp/sales data-2024.csv")),
            "sales_data_2024"
        );
    }

    #[test]
    fn test_load_csv_with_inference() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "product,amount,price,region").unwrap();
        writeln!(file, "Laptop,1500,999.99,North").unwrap();
        writeln!(file, "Mouse,250,19.5,South").unwrap();
        file.flush().unwrap();

        let dataset = load_csv(file.path()).unwrap();
        assert_eq!(dataset.columns.len(), 4);
        assert_eq!(dataset.columns[0].data_type, DataType::Text);
        assert_eq!(dataset.columns[1].data_type, DataType::Integer);
        assert_eq!(dataset.columns[2].data_type, DataType::Real);
        assert_eq!(dataset.rows.len(), 2);
        assert_eq!(dataset.rows[0][1], Value::Integer(1500));
        assert_eq!(dataset.rows[1][2], Value::Real(19.5));
    }

    #[test]
    fn test_load_csv_empty_cells_are_null() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a,b").unwrap();
        writeln!(file, "1,").unwrap();
        writeln!(file, "2,x").unwrap();
        file.flush().unwrap();

        let dataset = load_csv(file.path()).unwrap();
        assert_eq!(dataset.rows[0][1], Value::Null);
        // the null cell does not demote the column type
        assert_eq!(dataset.columns[1].data_type, DataType::Text);
    }

    #[test]
    fn test_load_csv_mixed_numeric_widens_to_real() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "v").unwrap();
        writeln!(file, "1").unwrap();
        writeln!(file, "2.5").unwrap();
        file.flush().unwrap();

        let dataset = load_csv(file.path()).unwrap();
        assert_eq!(dataset.columns[0].data_type, DataType::Real);
    }

    #[test]
    fn test_load_json_objects() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Laptop", "amount": 1500, "in stock": true}},
                {{"name": "Mouse", "amount": 250, "in stock": false}}]"#
        )
        .unwrap();
        file.flush().unwrap();

        let dataset = load_json(file.path()).unwrap();
        assert_eq!(dataset.columns[0].name, "name");
        assert_eq!(dataset.columns[2].name, "in_stock");
        assert_eq!(dataset.columns[1].data_type, DataType::Integer);
        assert_eq!(dataset.rows[0][2], Value::Integer(1));
        assert_eq!(dataset.rows[1][2], Value::Integer(0));
    }

    #[test]
    fn test_load_json_rejects_non_array() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"not": "an array"}}"#).unwrap();
        file.flush().unwrap();

        assert!(matches!(
            load_json(file.path()),
            Err(PrismError::Ingest(_))
        ));
    }
}
