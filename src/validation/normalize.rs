//! Schema normalization
//!
//! Brings a schema from any producer into the state the renderer expects:
//! every column named and typed, target types resolved, qualifiers either
//! set or `None`. Column order is never changed and no column is dropped.

use std::collections::HashMap;

use crate::models::TableSchema;
use crate::typemap::{self, DEFAULT_TARGET_TYPE};

/// Table name used when the input carries none
pub const DEFAULT_TABLE_NAME: &str = "my_table";

/// Error during normalization
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Duplicate column name '{name}' at positions {first} and {second}")]
    DuplicateColumn {
        name: String,
        first: usize,
        second: usize,
    },
}

/// What the normalizer changed or noticed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationReport {
    /// Defaults filled in, one entry per field
    pub defaults_applied: Vec<String>,
    /// Problems that did not stop normalization
    pub warnings: Vec<String>,
}

impl NormalizationReport {
    pub fn is_clean(&self) -> bool {
        self.defaults_applied.is_empty() && self.warnings.is_empty()
    }
}

/// A normalized schema and its report
#[derive(Debug, Clone)]
pub struct Normalized {
    pub schema: TableSchema,
    pub report: NormalizationReport,
}

/// Schema normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaNormalizer {
    reject_duplicates: bool,
}

impl SchemaNormalizer {
    /// Create a lenient normalizer: duplicate column names are reported as warnings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer that rejects duplicate column names
    pub fn strict() -> Self {
        Self {
            reject_duplicates: true,
        }
    }

    /// Normalize a schema
    ///
    /// # Example
    ///
    /// ```rust
    /// use bq_ddl_sdk::models::{Column, TableSchema};
    /// use bq_ddl_sdk::validation::SchemaNormalizer;
    ///
    /// let schema = TableSchema::new("", vec![Column::new("", "")]);
    /// let normalized = SchemaNormalizer::new().normalize(schema).unwrap();
    /// assert_eq!(normalized.schema.table_name, "my_table");
    /// assert_eq!(normalized.schema.columns[0].name, "column_1");
    /// assert_eq!(normalized.schema.columns[0].target_type.as_deref(), Some("STRING"));
    /// ```
    pub fn normalize(&self, mut schema: TableSchema) -> Result<Normalized, NormalizeError> {
        let mut report = NormalizationReport::default();
        self.apply(&mut schema, &mut report)?;
        Ok(Normalized { schema, report })
    }

    fn apply(
        &self,
        schema: &mut TableSchema,
        report: &mut NormalizationReport,
    ) -> Result<(), NormalizeError> {
        let table_name = schema.table_name.trim();
        if table_name.is_empty() {
            schema.table_name = DEFAULT_TABLE_NAME.to_string();
            report
                .defaults_applied
                .push(format!("table_name = {}", DEFAULT_TABLE_NAME));
        } else if table_name.len() != schema.table_name.len() {
            schema.table_name = table_name.to_string();
        }

        schema.database = blank_to_none(schema.database.take());
        schema.schema_namespace = blank_to_none(schema.schema_namespace.take());
        schema.table_comment = schema.table_comment.trim().to_string();

        // lower-cased name -> first 1-based position
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (index, column) in schema.columns.iter_mut().enumerate() {
            let position = index + 1;

            let name = column.name.trim();
            if name.is_empty() {
                column.name = format!("column_{}", position);
                report
                    .defaults_applied
                    .push(format!("columns[{}].name = {}", position, column.name));
            } else if name.len() != column.name.len() {
                column.name = name.to_string();
            }

            let source_type = column.source_type.trim();
            if source_type.is_empty() {
                column.source_type = DEFAULT_TARGET_TYPE.to_string();
                report
                    .defaults_applied
                    .push(format!("columns[{}].type = {}", position, DEFAULT_TARGET_TYPE));
            } else if source_type.len() != column.source_type.len() {
                column.source_type = source_type.to_string();
            }

            column.comment = column.comment.trim().to_string();

            if !typemap::is_known_type(&column.source_type) {
                report.warnings.push(format!(
                    "column '{}': unknown type '{}' mapped to {}",
                    column.name, column.source_type, DEFAULT_TARGET_TYPE
                ));
            }
            column.resolve_target_type();

            match seen.get(&column.name.to_lowercase()) {
                Some(&first) => {
                    if self.reject_duplicates {
                        return Err(NormalizeError::DuplicateColumn {
                            name: column.name.clone(),
                            first,
                            second: position,
                        });
                    }
                    tracing::warn!(
                        column = %column.name,
                        first,
                        second = position,
                        "Duplicate column name"
                    );
                    report.warnings.push(format!(
                        "duplicate column name '{}' at positions {} and {}",
                        column.name, first, position
                    ));
                }
                None => {
                    seen.insert(column.name.to_lowercase(), position);
                }
            }
        }

        tracing::debug!(
            table = %schema.table_name,
            columns = schema.columns.len(),
            defaults = report.defaults_applied.len(),
            warnings = report.warnings.len(),
            "Normalized schema"
        );

        Ok(())
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize leniently and drop the report
pub fn normalize_schema(mut schema: TableSchema) -> TableSchema {
    let mut report = NormalizationReport::default();
    // lenient mode never returns an error
    let _ = SchemaNormalizer::new().apply(&mut schema, &mut report);
    schema
}
