//! Session façade composing the store, registry, cache, translator,
//! executor, and selector behind a small API.
//!
//! One session owns one store connection. Everything is synchronous and
//! single-threaded; callers needing concurrency run one session per worker.

use crate::cache::{fingerprint, QueryCache};
use crate::error::{PrismError, Result};
use crate::executor::{self, QueryResult};
use crate::export::{self, ExportFormat};
use crate::ingest;
use crate::schema::SchemaRegistry;
use crate::store::{quote_ident, Store};
use crate::translate::{
    LanguageModel, OpenAiClient, Translator, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
use crate::types::{Column, TableSchema, Value};
use crate::viz;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Database file; `None` means in-memory.
    pub db_path: Option<PathBuf>,
    /// Explicit credential; falls back to `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// When a cached translation fails to execute, drop it and re-translate
    /// exactly once before giving up.
    pub retranslate_on_cache_failure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            retranslate_on_cache_failure: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadSummary {
    /// Target table; `None` for multi-statement `.sql` scripts.
    pub table: Option<String>,
    pub rows: usize,
    pub columns: usize,
}

pub struct Session {
    store: Store,
    registry: SchemaRegistry,
    cache: QueryCache,
    translator: Option<Translator>,
    current_table: Option<String>,
    retranslate_on_cache_failure: bool,
}

impl Session {
    /// Open a session. A missing API key is a soft condition: direct SQL
    /// needs no credential, so only `ask` is affected.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.is_empty());

        let translator = match api_key {
            Some(key) => Some(Translator::new(Box::new(OpenAiClient::new(
                key,
                config.model.clone(),
                config.base_url.clone(),
            )?))),
            None => {
                warn!("no API key configured; natural language queries are disabled");
                None
            }
        };

        Self::build(config, translator)
    }

    /// Open a session over a caller-supplied language model backend.
    pub fn with_model(config: SessionConfig, model: Box<dyn LanguageModel>) -> Result<Self> {
        Self::build(config, Some(Translator::new(model)))
    }

    fn build(config: SessionConfig, translator: Option<Translator>) -> Result<Self> {
        let store = match &config.db_path {
            Some(path) => Store::open(path)?,
            None => Store::memory()?,
        };

        let mut session = Self {
            store,
            registry: SchemaRegistry::new(),
            cache: QueryCache::new(),
            translator,
            current_table: None,
            retranslate_on_cache_failure: config.retranslate_on_cache_failure,
        };
        session.registry.refresh(&session.store)?;
        info!(
            tables = session.registry.tables().len(),
            "session ready"
        );
        Ok(session)
    }

    /// Load a file (csv, json, or a .sql script) into the store.
    pub fn upload(&mut self, path: impl AsRef<Path>, name: Option<&str>) -> Result<UploadSummary> {
        self.ensure_open()?;
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "json" => {
                let dataset = if ext == "csv" {
                    ingest::load_csv(path)?
                } else {
                    ingest::load_json(path)?
                };
                let table = name
                    .map(ingest::sanitize_name)
                    .unwrap_or_else(|| ingest::table_name_from_path(path));
                let summary = UploadSummary {
                    table: Some(table.clone()),
                    rows: dataset.rows.len(),
                    columns: dataset.columns.len(),
                };
                self.store
                    .replace_table(&table, &dataset.columns, &dataset.rows)?;
                self.registry.refresh(&self.store)?;
                self.current_table = Some(table.clone());
                info!(table, rows = summary.rows, "uploaded dataset");
                Ok(summary)
            }
            "sql" => {
                let script = std::fs::read_to_string(path)?;
                self.store.execute_batch(&script)?;
                self.registry.refresh(&self.store)?;
                info!(path = %path.display(), "executed sql script");
                Ok(UploadSummary {
                    table: None,
                    rows: 0,
                    columns: 0,
                })
            }
            other => Err(PrismError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Programmatic upload of already-typed rows.
    pub fn upload_rows(
        &mut self,
        name: &str,
        columns: &[Column],
        rows: &[Vec<Value>],
    ) -> Result<UploadSummary> {
        self.ensure_open()?;
        let table = ingest::sanitize_name(name);
        self.store.replace_table(&table, columns, rows)?;
        self.registry.refresh(&self.store)?;
        self.current_table = Some(table.clone());
        Ok(UploadSummary {
            table: Some(table),
            rows: rows.len(),
            columns: columns.len(),
        })
    }

    /// Ask a natural-language question against the current (or named) table.
    ///
    /// Schema lookup and translation failures are folded into the returned
    /// result; nothing here raises across the public boundary.
    pub fn ask(&mut self, question: &str, viz: bool, table: Option<&str>) -> QueryResult {
        if !self.store.is_open() {
            return QueryResult::failed("", "session is closed");
        }

        let table = match table
            .map(str::to_string)
            .or_else(|| self.current_table.clone())
        {
            Some(t) => t,
            None => return QueryResult::failed("", "no table specified; upload data first"),
        };

        let schema = match self.registry.get(&table) {
            Ok(s) => s.clone(),
            Err(e) => return QueryResult::failed("", e.to_string()),
        };

        let translator = match &self.translator {
            Some(t) => t,
            None => return QueryResult::failed("", "no API key configured"),
        };

        let key = fingerprint(question, &table, self.registry.version());
        let (sql, from_cache) = match self.cache.lookup(&key) {
            Some(hit) => {
                debug!("translation served from cache");
                (hit.to_string(), true)
            }
            None => match translator.translate(question, &table, &schema) {
                Ok(sql) => {
                    self.cache.store(key.clone(), sql.clone());
                    (sql, false)
                }
                Err(e) => return QueryResult::failed("", e.to_string()),
            },
        };

        let mut result = executor::execute(&self.store, &sql);

        if !result.success && from_cache && self.retranslate_on_cache_failure {
            debug!("cached SQL failed to execute; re-translating once");
            self.cache.remove(&key);
            if let Ok(fresh) = translator.translate(question, &table, &schema) {
                self.cache.store(key, fresh.clone());
                result = executor::execute(&self.store, &fresh);
            }
        }

        if viz && result.success {
            if let Some(choice) = viz::select(&result, question) {
                result.chart = Some(choice.spec);
            }
        }
        result
    }

    /// Execute SQL directly, bypassing the translator (no model cost).
    pub fn sql(&self, query: &str, viz: bool) -> QueryResult {
        if !self.store.is_open() {
            return QueryResult::failed(query, "session is closed");
        }
        let mut result = executor::execute(&self.store, query);
        if viz && result.success {
            if let Some(choice) = viz::select(&result, "SQL Query Result") {
                result.chart = Some(choice.spec);
            }
        }
        result
    }

    /// Sample rows from a table.
    pub fn peek(&self, table: Option<&str>, limit: usize) -> QueryResult {
        let table = match table
            .map(str::to_string)
            .or_else(|| self.current_table.clone())
        {
            Some(t) => t,
            None => return QueryResult::failed("", "no table specified; upload data first"),
        };
        self.sql(
            &format!("SELECT * FROM {} LIMIT {limit}", quote_ident(&table)),
            false,
        )
    }

    /// Write a result's rows to a file. Unknown formats fail hard upstream
    /// when parsing [`ExportFormat`].
    pub fn export(&self, result: &QueryResult, path: &Path, format: ExportFormat) -> Result<()> {
        self.ensure_open()?;
        export::export(&result.columns, &result.rows, path, format)
    }

    pub fn tables(&self) -> Vec<String> {
        self.registry.tables().iter().map(|t| t.to_string()).collect()
    }

    pub fn schema(&self, table: &str) -> Result<&TableSchema> {
        self.registry.get(table)
    }

    pub fn current_table(&self) -> Option<&str> {
        self.current_table.as_deref()
    }

    pub fn has_translator(&self) -> bool {
        self.translator.is_some()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Explicit cache reset; the only way entries leave the cache besides
    /// the retranslate-on-failure path.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Release the store connection. Idempotent; a closed session rejects
    /// every other operation.
    pub fn close(&mut self) {
        if self.store.is_open() {
            self.store.close();
            info!("session closed");
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.store.is_open() {
            Ok(())
        } else {
            Err(PrismError::Closed)
        }
    }
}
