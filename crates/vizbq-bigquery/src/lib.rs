pub mod client;
pub mod error;
pub mod job;
pub mod schema;
pub mod staging;

pub use client::{BigQueryClient, LoadSettings, LoadSummary, LoadTarget};
pub use error::BigQueryError;
pub use schema::{annotation_table_schema, FieldMode, FieldType, TableFieldSchema, TableSchema};
pub use staging::{staging_path, write_ndjson};
