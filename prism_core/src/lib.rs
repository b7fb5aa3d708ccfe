/// Module providing the translation cache and query fingerprints.
pub mod cache;

/// Module defining the error taxonomy.
pub mod error;

/// Module responsible for executing queries.
pub mod executor;

/// Module writing query results out to files.
pub mod export;

/// Module loading tabular files into the store.
pub mod ingest;

/// Module tracking each table's column names and types.
pub mod schema;

/// Module composing everything behind the session API.
pub mod session;

/// Module wrapping the SQLite data store.
pub mod store;

/// Module for natural-language to SQL translation.
pub mod translate;

/// Module with the core value and schema types.
pub mod types;

/// Module for automatic chart selection and rendering.
pub mod viz;

/// Re-exports for the fingerprint function and translation cache.
pub use cache::{fingerprint, QueryCache};

/// Re-export of the error taxonomy and result alias.
pub use error::{PrismError, Result};

/// Re-export of the result contract returned by every query path.
pub use executor::QueryResult;

/// Re-export of the export format selector.
pub use export::ExportFormat;

/// Re-export of the schema registry.
pub use schema::SchemaRegistry;

/// Re-exports for the session façade and its configuration.
pub use session::{Session, SessionConfig, UploadSummary};

/// Re-export of the data store wrapper.
pub use store::Store;

/// Re-exports for the language model boundary and translator.
pub use translate::{LanguageModel, OpenAiClient, Translator};

/// Re-exports of the core data types.
pub use types::{Column, DataType, TableSchema, Value};

/// Re-exports for chart selection and rendering.
pub use viz::render::{RenderSurface, VegaLiteRenderer};
pub use viz::{ChartChoice, ChartKind, ChartSpec, ColumnProfile};
