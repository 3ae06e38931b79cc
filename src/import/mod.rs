//! Import functionality
//!
//! Producers of the canonical [`TableSchema`](crate::models::TableSchema):
//! - SQL (a pasted `CREATE TABLE` statement)
//! - JSON (the interchange format, hand-written or exported)
//! - Catalog (column records read from a live source database)

pub mod catalog;
pub mod json;
#[cfg(feature = "postgres-backend")]
pub mod postgres;
pub mod sql;

/// Error during import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Source reported an error: {0}")]
    SourceError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::IoError(err.to_string())
    }
}

// Re-export for convenience
pub use catalog::{
    CatalogColumn, CatalogError, CatalogReader, CatalogTable, ConnectionConfig, SourceEngine,
};
pub use json::JSONImporter;
#[cfg(feature = "postgres-backend")]
pub use postgres::PostgresCatalogReader;
pub use sql::{SQLImporter, TableIdentifier};
