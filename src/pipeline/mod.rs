//! End-to-end DDL generation
//!
//! Raw input (DDL text, schema JSON or a catalog record) is turned into a
//! canonical schema, normalized, optionally enriched with generated
//! comments, and rendered as a BigQuery statement.
//!
//! # Example
//!
//! ```rust
//! use bq_ddl_sdk::export::TargetOptions;
//! use bq_ddl_sdk::pipeline::{DdlRequest, generate_ddl};
//!
//! let request = DdlRequest::ddl("CREATE TABLE hr.employees (id INT NOT NULL, name VARCHAR(100))")
//!     .with_target(TargetOptions::new().with_dataset("staging"));
//! let output = generate_ddl(&request).unwrap();
//! assert!(output.ddl.starts_with("CREATE OR REPLACE TABLE `staging.employees` ("));
//! ```

use serde::Serialize;

use crate::export::{BigQueryExporter, ExportError, TargetOptions};
use crate::import::{CatalogTable, ImportError, JSONImporter, SQLImporter};
use crate::models::TableSchema;
use crate::validation::{NormalizeError, SchemaNormalizer};

#[cfg(feature = "llm")]
use crate::llm::{CommentEnricher, LlmClient};

/// Error from any pipeline stage
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Where the schema comes from
#[derive(Debug, Clone)]
pub enum SchemaInput {
    /// A `CREATE TABLE` statement, tokenized with the named dialect
    Ddl { text: String, dialect: String },
    /// Schema JSON in the interchange format
    Json(String),
    /// A record read from a live catalog
    Catalog(CatalogTable),
}

/// One generation request
#[derive(Debug, Clone)]
pub struct DdlRequest {
    pub input: SchemaInput,
    pub target: TargetOptions,
    /// Reject duplicate column names instead of warning
    pub strict: bool,
}

impl DdlRequest {
    pub fn new(input: SchemaInput) -> Self {
        Self {
            input,
            target: TargetOptions::default(),
            strict: false,
        }
    }

    /// Request for pasted DDL in the generic dialect
    pub fn ddl(text: impl Into<String>) -> Self {
        Self::new(SchemaInput::Ddl {
            text: text.into(),
            dialect: "generic".to_string(),
        })
    }

    /// Request for schema JSON
    pub fn json(text: impl Into<String>) -> Self {
        Self::new(SchemaInput::Json(text.into()))
    }

    /// Request for a catalog record
    pub fn catalog(table: CatalogTable) -> Self {
        Self::new(SchemaInput::Catalog(table))
    }

    pub fn with_target(mut self, target: TargetOptions) -> Self {
        self.target = target;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn normalizer(&self) -> SchemaNormalizer {
        if self.strict {
            SchemaNormalizer::strict()
        } else {
            SchemaNormalizer::new()
        }
    }
}

/// Result of a generation request
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// The schema that was rendered
    pub schema: TableSchema,
    /// The rendered statement
    pub ddl: String,
    /// Parser diagnostic, for DDL input
    pub diagnostic: Option<String>,
    /// Normalization and enrichment warnings
    pub warnings: Vec<String>,
}

/// Produce the canonical schema for an input, before normalization
pub fn extract_schema(input: &SchemaInput) -> Result<TableSchema, PipelineError> {
    let schema = match input {
        SchemaInput::Ddl { text, dialect } => SQLImporter::new(dialect).parse(text),
        SchemaInput::Json(text) => JSONImporter::new().parse(text)?,
        SchemaInput::Catalog(table) => table.clone().into_schema(),
    };
    Ok(schema)
}

fn prepare(request: &DdlRequest) -> Result<(TableSchema, Option<String>, Vec<String>), PipelineError> {
    let schema = extract_schema(&request.input)?;
    let diagnostic = schema.diagnostic_message.clone();
    let normalized = request.normalizer().normalize(schema)?;
    Ok((normalized.schema, diagnostic, normalized.report.warnings))
}

fn finish(
    request: &DdlRequest,
    schema: TableSchema,
    diagnostic: Option<String>,
    warnings: Vec<String>,
) -> Result<PipelineOutput, PipelineError> {
    let exported = BigQueryExporter::export(&schema, &request.target)?;
    tracing::info!(
        table = %schema.table_name,
        columns = schema.columns.len(),
        warnings = warnings.len(),
        "Generated BigQuery DDL"
    );
    Ok(PipelineOutput {
        schema,
        ddl: exported.content,
        diagnostic,
        warnings,
    })
}

/// Extract, normalize and render
pub fn generate_ddl(request: &DdlRequest) -> Result<PipelineOutput, PipelineError> {
    let (schema, diagnostic, warnings) = prepare(request)?;
    finish(request, schema, diagnostic, warnings)
}

/// Extract, normalize, enrich and render
///
/// A failed enrichment pass does not fail the request: the schema is
/// rendered with its original comments and the error is added to the
/// warnings.
#[cfg(feature = "llm")]
pub async fn generate_ddl_with_comments<C: LlmClient>(
    request: &DdlRequest,
    enricher: &CommentEnricher<C>,
) -> Result<PipelineOutput, PipelineError> {
    let (schema, diagnostic, mut warnings) = prepare(request)?;

    let schema = match enricher.enrich(&schema).await {
        Ok(result) => result.schema,
        Err(e) => {
            tracing::warn!(error = %e, "Comment enrichment failed, rendering without it");
            warnings.push(format!("comment enrichment failed: {}", e));
            schema
        }
    };

    finish(request, schema, diagnostic, warnings)
}
