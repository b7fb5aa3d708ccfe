//! Query execution against the data store.
//!
//! `execute` never propagates an error: every SQL failure (syntax, unknown
//! column, type mismatch) is caught and folded into a failed [`QueryResult`]
//! so callers can branch on `success` without unwinding. SQL passes through
//! verbatim; this component is not a security boundary.

use crate::error::PrismError;
use crate::store::Store;
use crate::types::{Column, Value};
use crate::viz::ChartSpec;
use serde::Serialize;
use tracing::{debug, warn};

/// The result contract returned to every caller.
///
/// Immutable once constructed. Downstream callers branch on `success`
/// before touching `rows`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub success: bool,
    pub sql: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
    pub chart: Option<ChartSpec>,
    pub error: Option<String>,
}

impl QueryResult {
    pub fn ok(sql: impl Into<String>, columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            success: true,
            sql: sql.into(),
            columns,
            rows,
            chart: None,
            error: None,
        }
    }

    pub fn failed(sql: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            sql: sql.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            chart: None,
            error: Some(error.into()),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Run SQL against the store, folding any failure into the result value.
pub fn execute(store: &Store, sql: &str) -> QueryResult {
    match store.query(sql) {
        Ok((columns, rows)) => {
            debug!(rows = rows.len(), "query succeeded");
            QueryResult::ok(sql, columns, rows)
        }
        Err(e) => {
            let error = PrismError::Execution(e.to_string());
            warn!(error = %error, "query failed");
            QueryResult::failed(sql, error.to_string())
        }
    }
}
