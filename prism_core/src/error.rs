use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrismError {
    #[error("unknown table: {0}")]
    SchemaLookup(String),

    #[error("translation failed: {0}")]
    Translation(String),

    #[error("execution failed: {0}")]
    Execution(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("session is closed")]
    Closed,

    #[error("ingest error: {0}")]
    Ingest(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("http error: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, PrismError>;
