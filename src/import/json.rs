//! JSON schema input
//!
//! Decodes the interchange JSON (`table_name`, `columns`, `db`, `schema`,
//! `table_comment`) into a [`TableSchema`]. Missing optional fields take
//! their serde defaults; the normalizer fills the rest.

use serde_json::Value;

use super::ImportError;
use crate::models::TableSchema;

/// JSON Importer - decodes hand-written or exported schema JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct JSONImporter;

impl JSONImporter {
    pub fn new() -> Self {
        Self
    }

    /// Decode a schema from JSON text.
    ///
    /// Accepts the bare schema object, or an envelope of the form
    /// `{"schema": {...}}` as returned by catalog endpoints. An envelope
    /// carrying `{"error": "..."}` is reported as [`ImportError::SourceError`].
    pub fn parse(&self, json: &str) -> Result<TableSchema, ImportError> {
        let value: Value = serde_json::from_str(json)?;
        self.parse_value(value)
    }

    /// Decode a schema from an already-parsed JSON value
    pub fn parse_value(&self, value: Value) -> Result<TableSchema, ImportError> {
        let Value::Object(mut map) = value else {
            return Err(ImportError::ValidationError(
                "schema JSON must be an object".to_string(),
            ));
        };

        if let Some(Value::String(message)) = map.get("error") {
            return Err(ImportError::SourceError(message.clone()));
        }

        // `schema` is the namespace when it is a string, an envelope when it is an object
        if matches!(map.get("schema"), Some(Value::Object(_))) && !map.contains_key("columns") {
            if let Some(inner) = map.remove("schema") {
                return self.parse_value(inner);
            }
        }

        if let Some(columns) = map.get("columns") {
            if !columns.is_array() {
                return Err(ImportError::ValidationError(
                    "`columns` must be an array".to_string(),
                ));
            }
        }

        let schema: TableSchema = serde_json::from_value(Value::Object(map))?;
        tracing::debug!(
            table = %schema.table_name,
            columns = schema.columns.len(),
            "Decoded JSON schema"
        );
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPLOYEES: &str = r#"{
        "table_name": "employees",
        "columns": [
            {"name": "id", "type": "int", "nullable": false, "comment": "Employee ID"},
            {"name": "name", "type": "varchar", "nullable": true, "comment": "Employee Name"},
            {"name": "hire_date", "type": "date"}
        ],
        "db": "hrdb",
        "schema": "hr",
        "table_comment": "Employee master table"
    }"#;

    #[test]
    fn test_parse_schema() {
        let schema = JSONImporter::new().parse(EMPLOYEES).unwrap();
        assert_eq!(schema.table_name, "employees");
        assert_eq!(schema.columns.len(), 3);
        assert_eq!(schema.database.as_deref(), Some("hrdb"));
        assert_eq!(schema.schema_namespace.as_deref(), Some("hr"));
        assert!(!schema.columns[0].nullable);
        assert!(schema.columns[2].nullable);
        assert_eq!(schema.columns[2].comment, "");
    }

    #[test]
    fn test_parse_envelope() {
        let json = format!(r#"{{"schema": {}}}"#, EMPLOYEES);
        let schema = JSONImporter::new().parse(&json).unwrap();
        assert_eq!(schema.table_name, "employees");
    }

    #[test]
    fn test_error_envelope() {
        let err = JSONImporter::new()
            .parse(r#"{"schema": {"error": "Access denied"}}"#)
            .unwrap_err();
        assert!(matches!(err, ImportError::SourceError(msg) if msg == "Access denied"));
    }

    #[test]
    fn test_invalid_json() {
        let err = JSONImporter::new().parse("{not json").unwrap_err();
        assert!(matches!(err, ImportError::ParseError(_)));

        let err = JSONImporter::new().parse("[1, 2]").unwrap_err();
        assert!(matches!(err, ImportError::ValidationError(_)));

        let err = JSONImporter::new()
            .parse(r#"{"table_name": "t", "columns": "id"}"#)
            .unwrap_err();
        assert!(matches!(err, ImportError::ValidationError(_)));
    }

    #[test]
    fn test_null_fields_take_normalizer_defaults() {
        let schema = JSONImporter::new()
            .parse(r#"{"table_name": "t", "columns": [{"name": "flag", "type": null, "nullable": null}]}"#)
            .unwrap();
        let schema = crate::validation::normalize_schema(schema);
        assert_eq!(schema.columns[0].source_type, "STRING");
        assert_eq!(schema.columns[0].target_type.as_deref(), Some("STRING"));
        assert!(schema.columns[0].nullable);
    }

    #[test]
    fn test_minimal_object() {
        let schema = JSONImporter::new().parse("{}").unwrap();
        assert!(schema.table_name.is_empty());
        assert!(schema.columns.is_empty());
    }
}
