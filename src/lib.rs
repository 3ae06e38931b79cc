//! BigQuery DDL SDK - turn source database schemas into BigQuery tables
//!
//! Provides unified interfaces for:
//! - Schema input (pasted DDL, schema JSON, live catalog readers)
//! - Type mapping from MySQL, PostgreSQL, SQL Server and Oracle types
//! - Schema normalization
//! - BigQuery `CREATE OR REPLACE TABLE` rendering
//! - Optional LLM-generated column and table comments

pub mod config;
pub mod export;
pub mod import;
#[cfg(feature = "llm")]
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod typemap;
pub mod validation;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError};
pub use export::{BigQueryExporter, ExportError, ExportResult, TargetOptions};
pub use import::{
    CatalogColumn, CatalogError, CatalogReader, CatalogTable, ConnectionConfig, ImportError,
    JSONImporter, SQLImporter, SourceEngine, TableIdentifier,
};
#[cfg(feature = "postgres-backend")]
pub use import::PostgresCatalogReader;
pub use pipeline::{DdlRequest, PipelineError, PipelineOutput, SchemaInput, generate_ddl};
#[cfg(feature = "llm")]
pub use pipeline::generate_ddl_with_comments;
pub use typemap::map_type;
pub use validation::{NormalizationReport, NormalizeError, SchemaNormalizer, normalize_schema};

// Re-export models
pub use models::{Column, TableSchema};
