//! Rendering surface boundary.
//!
//! Selection produces a data-only [`ChartSpec`]; anything that can draw it
//! sits behind [`RenderSurface`]. The default implementation writes a
//! Vega-Lite v5 document with inline data, displayable by any vega-embed
//! host, so a non-interactive caller still gets a concrete artifact.

use super::{ChartKind, ChartSpec};
use crate::error::Result;
use crate::types::{Column, Value};
use serde_json::{json, Map};

pub trait RenderSurface {
    /// Produce an opaque handle for the chart; here, the serialized chart
    /// document itself.
    fn render(&self, spec: &ChartSpec, columns: &[Column], rows: &[Vec<Value>]) -> Result<String>;
}

#[derive(Debug, Default)]
pub struct VegaLiteRenderer;

impl VegaLiteRenderer {
    pub fn new() -> Self {
        Self
    }
}

const ROW_INDEX_FIELD: &str = "_row";

impl RenderSurface for VegaLiteRenderer {
    fn render(&self, spec: &ChartSpec, columns: &[Column], rows: &[Vec<Value>]) -> Result<String> {
        let values: Vec<serde_json::Value> = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let mut object = Map::new();
                object.insert(ROW_INDEX_FIELD.to_string(), json!(index));
                for (column, value) in columns.iter().zip(row) {
                    object.insert(column.name.clone(), value.to_json());
                }
                serde_json::Value::Object(object)
            })
            .collect();

        let x_field = spec.x.as_deref().unwrap_or(ROW_INDEX_FIELD);
        let line_x_type = if spec.x.is_some() {
            "nominal"
        } else {
            "quantitative"
        };

        let (mark, encoding) = match spec.kind {
            ChartKind::Bar => (
                json!("bar"),
                json!({
                    "x": {"field": x_field, "type": "nominal"},
                    "y": {"field": spec.y, "type": "quantitative"},
                }),
            ),
            ChartKind::Line => (
                json!("line"),
                json!({
                    "x": {"field": x_field, "type": line_x_type},
                    "y": {"field": spec.y, "type": "quantitative"},
                }),
            ),
            ChartKind::Scatter => (
                json!("point"),
                json!({
                    "x": {"field": x_field, "type": "quantitative"},
                    "y": {"field": spec.y, "type": "quantitative"},
                }),
            ),
            ChartKind::Pie => (
                json!("arc"),
                json!({
                    "theta": {"field": spec.y, "type": "quantitative"},
                    "color": {"field": x_field, "type": "nominal"},
                }),
            ),
            ChartKind::Histogram => (
                json!("bar"),
                json!({
                    "x": {"field": x_field, "bin": true},
                    "y": {"aggregate": "count"},
                }),
            ),
        };

        let mut encoding = encoding;
        if spec.kind != ChartKind::Pie {
            if let Some(color) = &spec.color {
                encoding["color"] = json!({"field": color, "type": "nominal"});
            }
        }

        let document = json!({
            "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
            "title": spec.title,
            "data": {"values": values},
            "mark": mark,
            "encoding": encoding,
        });

        Ok(serde_json::to_string_pretty(&document)?)
    }
}
