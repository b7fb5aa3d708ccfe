//! Data Store boundary: a thin wrapper over one SQLite connection.
//!
//! The store executes SQL verbatim and exposes the introspection calls the
//! schema registry needs. It performs no query rewriting and no validation;
//! failures surface as `PrismError::Sqlite` for callers to fold into result
//! values.

use crate::error::{PrismError, Result};
use crate::types::{Column, DataType, Value};
use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

pub struct Store {
    conn: Option<Connection>,
}

impl Store {
    /// Open (or create) a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened database");
        Ok(Self { conn: Some(conn) })
    }

    /// Open an in-memory database.
    pub fn memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn: Some(conn) })
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(PrismError::Closed)
    }

    /// List user tables, alphabetical.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// Ordered (column name, declared type) pairs for one table.
    pub fn describe(&self, table: &str) -> Result<Vec<(String, String)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let cols = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cols)
    }

    /// Run SQL verbatim, returning typed columns and rows.
    ///
    /// Result column types come from the declared type where SQLite reports
    /// one; expression columns fall back to the first non-NULL row value.
    pub fn query(&self, sql: &str) -> Result<(Vec<Column>, Vec<Vec<Value>>)> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let column_count = stmt.column_count();

        let mut names = Vec::with_capacity(column_count);
        let mut declared = Vec::with_capacity(column_count);
        for col in stmt.columns() {
            names.push(col.name().to_string());
            declared.push(col.decl_type().map(DataType::from_declared));
        }

        let mut data: Vec<Vec<Value>> = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(Value::from(row.get_ref(i)?));
            }
            data.push(values);
        }

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let data_type = declared[i].unwrap_or_else(|| {
                    data.iter()
                        .map(|r| r[i].data_type())
                        .find(|t| *t != DataType::Null)
                        .unwrap_or(DataType::Null)
                });
                Column { name, data_type }
            })
            .collect();

        Ok((columns, data))
    }

    /// Run a multi-statement script (used for `.sql` file ingestion).
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    /// Replace the contents of a table with the given rows, all-or-nothing.
    pub fn replace_table(
        &mut self,
        name: &str,
        columns: &[Column],
        rows: &[Vec<Value>],
    ) -> Result<()> {
        let conn = self.conn.as_mut().ok_or(PrismError::Closed)?;
        let tx = conn.transaction()?;

        tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)))?;

        let defs: Vec<String> = columns
            .iter()
            .map(|c| {
                let keyword = c.data_type.sql_keyword();
                if keyword.is_empty() {
                    quote_ident(&c.name)
                } else {
                    format!("{} {}", quote_ident(&c.name), keyword)
                }
            })
            .collect();
        tx.execute_batch(&format!(
            "CREATE TABLE {} ({})",
            quote_ident(name),
            defs.join(", ")
        ))?;

        {
            let placeholders: Vec<String> =
                (1..=columns.len()).map(|i| format!("?{i}")).collect();
            let mut insert = tx.prepare(&format!(
                "INSERT INTO {} VALUES ({})",
                quote_ident(name),
                placeholders.join(", ")
            ))?;
            for row in rows {
                insert.execute(rusqlite::params_from_iter(row.iter()))?;
            }
        }

        tx.commit()?;
        debug!(table = name, rows = rows.len(), "replaced table contents");
        Ok(())
    }

    /// Release the connection. Closing twice is a no-op.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            // a failed close still drops the handle
            let _ = conn.close();
        }
    }
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
