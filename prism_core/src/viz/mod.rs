//! Automatic chart selection.
//!
//! `select` is a pure, total function from a query result's shape to either
//! a chart choice or "no suitable chart". It only classifies; rendering is
//! a separate concern behind [`render::RenderSurface`].
//!
//! The decision procedure, in fixed order:
//!
//! - empty or single-row results are not charted
//! - results with no numeric column are not charted
//! - one numeric column: histogram
//! - two columns, both numeric: scatter (alternates: line, histogram)
//! - two columns, numeric + categorical: bar (alternate: pie)
//! - three or more columns, mixed: bar of first categorical vs first
//!   numeric, second categorical as color (alternates: line, pie, histogram)
//! - three or more columns, all numeric: line over row index
//!   (alternates: scatter, histogram)

pub mod render;

use crate::executor::QueryResult;
use crate::types::Column;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
    Histogram,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
            ChartKind::Histogram => "histogram",
        };
        write!(f, "{name}")
    }
}

/// Data-only chart description handed to a rendering surface.
///
/// `x = None` means the row index serves as the x axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x: Option<String>,
    pub y: Option<String>,
    pub color: Option<String>,
    pub title: String,
}

/// The deterministic default plus the alternates an interactive caller may
/// offer instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartChoice {
    pub spec: ChartSpec,
    pub alternates: Vec<ChartKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Transient per-call classification of one result column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
}

pub fn profile_columns(columns: &[Column]) -> Vec<ColumnProfile> {
    columns
        .iter()
        .map(|c| ColumnProfile {
            name: c.name.clone(),
            kind: if c.data_type.is_numeric() {
                ColumnKind::Numeric
            } else {
                ColumnKind::Categorical
            },
        })
        .collect()
}

/// Pick a chart for a result, or decline.
pub fn select(result: &QueryResult, title: &str) -> Option<ChartChoice> {
    if result.rows.len() <= 1 {
        return None;
    }

    let profiles = profile_columns(&result.columns);
    let numeric: Vec<&ColumnProfile> = profiles
        .iter()
        .filter(|p| p.kind == ColumnKind::Numeric)
        .collect();
    let categorical: Vec<&ColumnProfile> = profiles
        .iter()
        .filter(|p| p.kind == ColumnKind::Categorical)
        .collect();

    if numeric.is_empty() {
        return None;
    }

    let spec = |kind, x: Option<&ColumnProfile>, y: Option<&ColumnProfile>, color: Option<&ColumnProfile>| ChartSpec {
        kind,
        x: x.map(|p| p.name.clone()),
        y: y.map(|p| p.name.clone()),
        color: color.map(|p| p.name.clone()),
        title: title.to_string(),
    };

    match profiles.len() {
        1 => Some(ChartChoice {
            spec: spec(ChartKind::Histogram, Some(numeric[0]), None, None),
            alternates: vec![],
        }),
        2 if numeric.len() == 2 => Some(ChartChoice {
            spec: spec(ChartKind::Scatter, Some(numeric[0]), Some(numeric[1]), None),
            alternates: vec![ChartKind::Line, ChartKind::Histogram],
        }),
        2 => Some(ChartChoice {
            spec: spec(ChartKind::Bar, Some(categorical[0]), Some(numeric[0]), None),
            alternates: vec![ChartKind::Pie],
        }),
        _ if categorical.is_empty() => Some(ChartChoice {
            spec: spec(ChartKind::Line, None, Some(numeric[0]), None),
            alternates: vec![ChartKind::Scatter, ChartKind::Histogram],
        }),
        _ => Some(ChartChoice {
            spec: spec(
                ChartKind::Bar,
                Some(categorical[0]),
                Some(numeric[0]),
                categorical.get(1).copied(),
            ),
            alternates: vec![ChartKind::Line, ChartKind::Pie, ChartKind::Histogram],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Value};

    fn result_with(columns: Vec<(&str, DataType)>, row_count: usize) -> QueryResult {
        let cols: Vec<Column> = columns
            .iter()
            .map(|(name, ty)| Column::new(*name, *ty))
            .collect();
        let rows = (0..row_count)
            .map(|i| {
                cols.iter()
                    .map(|c| match c.data_type {
                        DataType::Integer => Value::Integer(i as i64),
                        DataType::Real => Value::Real(i as f64),
                        _ => Value::Text(format!("v{i}")),
                    })
                    .collect()
            })
            .collect();
        QueryResult::ok("SELECT 1", cols, rows)
    }

    #[test]
    fn test_too_few_rows_declines() {
        let result = result_with(vec![("amount", DataType::Integer)], 1);
        assert!(select(&result, "t").is_none());

        let empty = result_with(vec![("amount", DataType::Integer)], 0);
        assert!(select(&empty, "t").is_none());
    }

    #[test]
    fn test_categorical_only_declines() {
        let result = result_with(
            vec![("a", DataType::Text), ("b", DataType::Text)],
            5,
        );
        assert!(select(&result, "t").is_none());
    }

    #[test]
    fn test_single_numeric_column_histogram() {
        let result = result_with(vec![("amount", DataType::Integer)], 5);
        let choice = select(&result, "t").unwrap();
        assert_eq!(choice.spec.kind, ChartKind::Histogram);
        assert_eq!(choice.spec.x.as_deref(), Some("amount"));
        assert!(choice.alternates.is_empty());
    }

    #[test]
    fn test_two_numeric_columns_scatter() {
        let result = result_with(
            vec![("x", DataType::Real), ("y", DataType::Integer)],
            5,
        );
        let choice = select(&result, "t").unwrap();
        assert_eq!(choice.spec.kind, ChartKind::Scatter);
        assert_eq!(choice.spec.x.as_deref(), Some("x"));
        assert_eq!(choice.spec.y.as_deref(), Some("y"));
        assert_eq!(
            choice.alternates,
            vec![ChartKind::Line, ChartKind::Histogram]
        );
    }

    #[test]
    fn test_numeric_plus_categorical_bar() {
        let result = result_with(
            vec![("region", DataType::Text), ("total", DataType::Integer)],
            2,
        );
        let choice = select(&result, "sales by region").unwrap();
        assert_eq!(choice.spec.kind, ChartKind::Bar);
        assert_eq!(choice.spec.x.as_deref(), Some("region"));
        assert_eq!(choice.spec.y.as_deref(), Some("total"));
        assert_eq!(choice.spec.title, "sales by region");
        assert_eq!(choice.alternates, vec![ChartKind::Pie]);
    }

    #[test]
    fn test_wide_mixed_bar_with_color() {
        let result = result_with(
            vec![
                ("region", DataType::Text),
                ("amount", DataType::Integer),
                ("product", DataType::Text),
            ],
            4,
        );
        let choice = select(&result, "t").unwrap();
        assert_eq!(choice.spec.kind, ChartKind::Bar);
        assert_eq!(choice.spec.x.as_deref(), Some("region"));
        assert_eq!(choice.spec.y.as_deref(), Some("amount"));
        assert_eq!(choice.spec.color.as_deref(), Some("product"));
        assert_eq!(
            choice.alternates,
            vec![ChartKind::Line, ChartKind::Pie, ChartKind::Histogram]
        );
    }

    #[test]
    fn test_wide_mixed_without_second_categorical() {
        let result = result_with(
            vec![
                ("region", DataType::Text),
                ("amount", DataType::Integer),
                ("count", DataType::Integer),
            ],
            4,
        );
        let choice = select(&result, "t").unwrap();
        assert_eq!(choice.spec.kind, ChartKind::Bar);
        assert!(choice.spec.color.is_none());
    }

    #[test]
    fn test_wide_all_numeric_line() {
        let result = result_with(
            vec![
                ("a", DataType::Integer),
                ("b", DataType::Real),
                ("c", DataType::Integer),
            ],
            4,
        );
        let choice = select(&result, "t").unwrap();
        assert_eq!(choice.spec.kind, ChartKind::Line);
        assert!(choice.spec.x.is_none());
        assert_eq!(choice.spec.y.as_deref(), Some("a"));
        assert_eq!(
            choice.alternates,
            vec![ChartKind::Scatter, ChartKind::Histogram]
        );
    }

    #[test]
    fn test_totality_over_shape_grid() {
        // every (numeric, categorical, rows) combination must produce a
        // decision without panicking
        for numeric in 0..4usize {
            for categorical in 0..4usize {
                for rows in 0..4usize {
                    let mut columns = Vec::new();
                    for i in 0..numeric {
                        columns.push((format!("n{i}"), DataType::Integer));
                    }
                    for i in 0..categorical {
                        columns.push((format!("c{i}"), DataType::Text));
                    }
                    if columns.is_empty() {
                        continue;
                    }
                    let named: Vec<(&str, DataType)> = columns
                        .iter()
                        .map(|(n, t)| (n.as_str(), *t))
                        .collect();
                    let result = result_with(named, rows);
                    let choice = select(&result, "grid");

                    if rows <= 1 || numeric == 0 {
                        assert!(choice.is_none(), "n={numeric} c={categorical} r={rows}");
                    } else {
                        assert!(choice.is_some(), "n={numeric} c={categorical} r={rows}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_profile_classification() {
        let profiles = profile_columns(&[
            Column::new("amount", DataType::Integer),
            Column::new("price", DataType::Real),
            Column::new("name", DataType::Text),
            Column::new("raw", DataType::Blob),
            Column::new("anything", DataType::Null),
        ]);
        assert_eq!(profiles[0].kind, ColumnKind::Numeric);
        assert_eq!(profiles[1].kind, ColumnKind::Numeric);
        assert_eq!(profiles[2].kind, ColumnKind::Categorical);
        assert_eq!(profiles[3].kind, ColumnKind::Categorical);
        assert_eq!(profiles[4].kind, ColumnKind::Categorical);
    }
}
