//! BigQuery exporter for generating `CREATE OR REPLACE TABLE` statements.
//!
//! # Escaping
//!
//! The qualified table name is wrapped in back-quotes with inner back-quotes
//! escaped. Descriptions are emitted as double-quoted BigQuery string
//! literals with backslash, quote and control characters escaped, so a
//! comment can never terminate the literal early.

use serde::{Deserialize, Serialize};

use crate::export::{ExportError, ExportResult};
use crate::models::TableSchema;
use crate::validation::DEFAULT_TABLE_NAME;

/// Where the rendered table should land
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetOptions {
    /// GCP project, used only together with `dataset_id`
    pub project_id: Option<String>,
    pub dataset_id: Option<String>,
    /// Overrides the schema's own table name
    pub table_name: Option<String>,
    /// Use the source schema namespace as dataset when none is configured
    pub fallback_to_namespace: bool,
}

impl TargetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_dataset(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn with_namespace_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_namespace = enabled;
        self
    }

    /// Resolve the dataset qualifier for `schema`
    ///
    /// `project.dataset` when both are set, else the dataset alone, else the
    /// schema namespace if the fallback is enabled. A project without a
    /// dataset is ignored.
    pub fn resolve_dataset(&self, schema: &TableSchema) -> Option<String> {
        let project = non_blank(self.project_id.as_deref());
        let dataset = non_blank(self.dataset_id.as_deref());

        match (project, dataset) {
            (Some(project), Some(dataset)) => Some(format!("{}.{}", project, dataset)),
            (None, Some(dataset)) => Some(dataset.to_string()),
            _ if self.fallback_to_namespace => {
                non_blank(schema.schema_namespace.as_deref()).map(str::to_string)
            }
            _ => None,
        }
    }

    /// Resolve the table name for `schema`
    pub fn resolve_table_name<'a>(&'a self, schema: &'a TableSchema) -> &'a str {
        non_blank(self.table_name.as_deref())
            .or_else(|| non_blank(Some(schema.table_name.as_str())))
            .unwrap_or(DEFAULT_TABLE_NAME)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Exporter for BigQuery DDL
pub struct BigQueryExporter;

impl BigQueryExporter {
    /// Export a schema to a BigQuery `CREATE OR REPLACE TABLE` statement.
    ///
    /// # Arguments
    ///
    /// * `schema` - The schema to export
    /// * `dataset` - Optional dataset qualifier (`dataset` or `project.dataset`)
    ///
    /// # Example
    ///
    /// ```rust
    /// use bq_ddl_sdk::export::bigquery::BigQueryExporter;
    /// use bq_ddl_sdk::models::{Column, TableSchema};
    ///
    /// let schema = TableSchema::new("users", vec![Column::new("ID", "INT").with_nullable(false)]);
    /// let ddl = BigQueryExporter::export_table(&schema, Some("analytics"));
    /// assert_eq!(ddl, "CREATE OR REPLACE TABLE `analytics.users` (\n  id INT64 NOT NULL\n);");
    /// ```
    pub fn export_table(schema: &TableSchema, dataset: Option<&str>) -> String {
        let table_name = if schema.table_name.trim().is_empty() {
            DEFAULT_TABLE_NAME
        } else {
            schema.table_name.as_str()
        };
        Self::render(schema, dataset, table_name)
    }

    fn render(schema: &TableSchema, dataset: Option<&str>, table_name: &str) -> String {
        let qualified = match dataset.map(str::trim).filter(|d| !d.is_empty()) {
            Some(dataset) => format!("{}.{}", dataset, table_name),
            None => table_name.to_string(),
        };

        let mut sql = format!(
            "CREATE OR REPLACE TABLE {} (\n",
            Self::quote_identifier(&qualified)
        );

        let lines: Vec<String> = schema
            .columns
            .iter()
            .map(|column| {
                let mut line = format!(
                    "  {} {}",
                    column.name.to_lowercase(),
                    column.resolved_target_type()
                );
                if !column.nullable {
                    line.push_str(" NOT NULL");
                }
                if column.has_comment() {
                    line.push_str(&Self::description_option(column.comment.trim()));
                }
                line
            })
            .collect();

        if !lines.is_empty() {
            sql.push_str(&lines.join(",\n"));
            sql.push('\n');
        }
        sql.push(')');

        if schema.has_table_comment() {
            sql.push_str(&Self::description_option(schema.table_comment.trim()));
        }
        sql.push(';');

        tracing::debug!(
            table = %qualified,
            columns = schema.columns.len(),
            "Rendered BigQuery DDL"
        );
        sql
    }

    /// Export with target options, checking the schema is renderable
    pub fn export(schema: &TableSchema, target: &TargetOptions) -> Result<ExportResult, ExportError> {
        if let Some(position) = schema.columns.iter().position(|c| c.name.trim().is_empty()) {
            return Err(ExportError::ValidationError(format!(
                "column {} has no name",
                position + 1
            )));
        }

        let dataset = target.resolve_dataset(schema);
        let table_name = target.resolve_table_name(schema);

        Ok(ExportResult {
            content: Self::render(schema, dataset.as_deref(), table_name),
            format: "bigquery".to_string(),
        })
    }

    /// Quote a (possibly dotted) table path with back-quotes
    pub fn quote_identifier(name: &str) -> String {
        format!("`{}`", name.replace('`', "\\`"))
    }

    /// Escape text as the body of a double-quoted BigQuery string literal
    pub fn escape_string_literal(text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '\\' => escaped.push_str("\\\\"),
                '"' => escaped.push_str("\\\""),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                other => escaped.push(other),
            }
        }
        escaped
    }

    fn description_option(text: &str) -> String {
        format!(
            " OPTIONS(description=\"{}\")",
            Self::escape_string_literal(text)
        )
    }
}
