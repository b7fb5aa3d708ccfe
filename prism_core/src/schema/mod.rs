//! Schema registry: table name -> ordered column/type mapping.
//!
//! The registry is rebuilt in full on every `refresh` so readers never see a
//! partially updated mapping, and a version counter increments with each
//! rebuild. The query cache folds that counter into its fingerprints, which
//! invalidates cached SQL whenever the table set changes.

use crate::error::{PrismError, Result};
use crate::store::Store;
use crate::types::{Column, DataType, TableSchema};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    tables: HashMap<String, TableSchema>,
    version: u64,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-enumerate every table in the store and swap in the new mapping.
    ///
    /// Must be called after any operation that creates, drops, or replaces
    /// a table. The new mapping is built completely before it becomes
    /// visible; a mid-refresh introspection failure leaves the old state
    /// intact.
    pub fn refresh(&mut self, store: &Store) -> Result<()> {
        let mut next = HashMap::new();
        for table in store.list_tables()? {
            let columns = store
                .describe(&table)?
                .into_iter()
                .map(|(name, declared)| Column::new(name, DataType::from_declared(&declared)))
                .collect();
            next.insert(
                table.clone(),
                TableSchema {
                    name: table,
                    columns,
                },
            );
        }
        self.tables = next;
        self.version += 1;
        debug!(
            tables = self.tables.len(),
            version = self.version,
            "schema registry refreshed"
        );
        Ok(())
    }

    pub fn get(&self, table: &str) -> Result<&TableSchema> {
        self.tables
            .get(table)
            .ok_or_else(|| PrismError::SchemaLookup(table.to_string()))
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Known table names, alphabetical.
    pub fn tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Monotonic counter, bumped on every refresh.
    pub fn version(&self) -> u64 {
        self.version
    }
}
