//! Canonical table schema

use serde::{Deserialize, Serialize};

use super::column::{Column, null_as_empty};

/// Diagnostic set by the DDL parser when at least one column was read
pub const PARSE_SUCCESS_MESSAGE: &str = "Columns parsed successfully";

/// Diagnostic set by the DDL parser when no column could be read
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse columns";

/// Dialect-neutral description of one table
///
/// Serializes to the interchange JSON shared by every producer and consumer:
///
/// ```json
/// {
///   "table_name": "employees",
///   "columns": [{"name": "id", "type": "int", "nullable": false, "comment": ""}],
///   "db": "hrdb",
///   "schema": "hr",
///   "table_comment": "Employee master table"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TableSchema {
    #[serde(default)]
    pub table_name: String,
    /// Columns in source order
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(rename = "db", default)]
    pub database: Option<String>,
    #[serde(rename = "schema", default)]
    pub schema_namespace: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub table_comment: String,
    /// Producer status message, e.g. the parser's success/failure note
    #[serde(rename = "msg", default, skip_serializing_if = "Option::is_none")]
    pub diagnostic_message: Option<String>,
}

impl TableSchema {
    pub fn new(table_name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            ..Default::default()
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_schema_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.schema_namespace = Some(namespace.into());
        self
    }

    pub fn with_table_comment(mut self, comment: impl Into<String>) -> Self {
        self.table_comment = comment.into();
        self
    }

    pub fn has_table_comment(&self) -> bool {
        !self.table_comment.trim().is_empty()
    }

    /// True when the parser flagged this schema as a failed extraction
    pub fn is_parse_failure(&self) -> bool {
        self.diagnostic_message.as_deref() == Some(PARSE_FAILURE_MESSAGE)
    }

    /// Serialize to the interchange JSON format
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_keys() {
        let schema = TableSchema::new(
            "employees",
            vec![Column::new("id", "int").with_nullable(false)],
        )
        .with_database("hrdb")
        .with_schema_namespace("hr")
        .with_table_comment("Employee master table");

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["table_name"], "employees");
        assert_eq!(json["db"], "hrdb");
        assert_eq!(json["schema"], "hr");
        assert_eq!(json["table_comment"], "Employee master table");
        assert_eq!(json["columns"][0]["type"], "int");
        assert!(json.get("msg").is_none());
    }

    #[test]
    fn test_round_trip_drops_only_target_type() {
        let mut schema = TableSchema::new(
            "t",
            vec![
                Column::new("id", "INT").with_nullable(false),
                Column::new("name", "VARCHAR(10)").with_comment("Full name"),
            ],
        )
        .with_schema_namespace("public");
        for col in &mut schema.columns {
            col.resolve_target_type();
        }

        let json = schema.to_json_pretty().unwrap();
        let decoded: TableSchema = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.columns.len(), 2);
        assert!(decoded.columns.iter().all(|c| c.target_type.is_none()));
        assert_eq!(decoded.columns[1].comment, "Full name");
        assert_eq!(decoded.database, None);
        assert_eq!(decoded.schema_namespace.as_deref(), Some("public"));
    }
}
