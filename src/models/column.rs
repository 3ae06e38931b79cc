//! Column model for the SDK

use serde::{Deserialize, Deserializer, Serialize};

use crate::typemap;

/// Column model representing a field in a canonical table schema
///
/// The source type is kept exactly as captured from the producer
/// (`"VARCHAR(100)"`, `"character varying"`); the BigQuery type is derived
/// from it during normalization and is never serialized.
///
/// # Example
///
/// ```rust
/// use bq_ddl_sdk::models::Column;
///
/// let column = Column::new("id", "INT").with_nullable(false);
/// assert_eq!(column.resolved_target_type(), "INT64");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    /// Column name, case preserved
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Type as written in the source (e.g., "VARCHAR(100)", "bigint")
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub source_type: String,
    /// BigQuery type resolved by the type mapper
    #[serde(skip)]
    pub target_type: Option<String>,
    /// Whether the column allows NULL values (default: true)
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub nullable: bool,
    /// Column description; empty when absent
    #[serde(default, deserialize_with = "null_as_empty")]
    pub comment: String,
}

fn default_true() -> bool {
    true
}

fn null_as_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// Treat an explicit JSON `null` the same as a missing key
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Column {
    /// Create a nullable column with no comment
    pub fn new(name: impl Into<String>, source_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_type: source_type.into(),
            target_type: None,
            nullable: true,
            comment: String::new(),
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Whether a non-blank comment is present
    pub fn has_comment(&self) -> bool {
        !self.comment.trim().is_empty()
    }

    /// Populate `target_type` from the source type
    pub fn resolve_target_type(&mut self) {
        self.target_type = Some(typemap::map_type(&self.source_type).to_string());
    }

    /// The BigQuery type for this column, mapping on the fly if unresolved
    pub fn resolved_target_type(&self) -> &str {
        match &self.target_type {
            Some(t) => t.as_str(),
            None => typemap::map_type(&self.source_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_defaults() {
        let col = Column::new("name", "VARCHAR(100)");
        assert!(col.nullable);
        assert!(col.comment.is_empty());
        assert!(col.target_type.is_none());
        assert_eq!(col.resolved_target_type(), "STRING");
    }

    #[test]
    fn test_deserialize_defaults() {
        let col: Column = serde_json::from_str(r#"{"name": "id", "type": "int"}"#).unwrap();
        assert!(col.nullable);
        assert_eq!(col.comment, "");

        let col: Column =
            serde_json::from_str(r#"{"name": "id", "type": "int", "comment": null}"#).unwrap();
        assert_eq!(col.comment, "");
    }

    #[test]
    fn test_deserialize_nulls_as_absent() {
        let col: Column = serde_json::from_str(
            r#"{"name": null, "type": null, "nullable": null, "comment": null}"#,
        )
        .unwrap();
        assert_eq!(col.name, "");
        assert_eq!(col.source_type, "");
        assert!(col.nullable);

        let col: Column =
            serde_json::from_str(r#"{"name": "id", "type": "int", "nullable": false}"#).unwrap();
        assert!(!col.nullable);
    }

    #[test]
    fn test_target_type_not_serialized() {
        let mut col = Column::new("id", "INT").with_nullable(false);
        col.resolve_target_type();
        assert_eq!(col.target_type.as_deref(), Some("INT64"));

        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(json["type"], "INT");
        assert_eq!(json["nullable"], false);
        assert!(json.get("target_type").is_none());
    }

    #[test]
    fn test_has_comment() {
        assert!(!Column::new("a", "INT").with_comment("   ").has_comment());
        assert!(Column::new("a", "INT").with_comment("Key").has_comment());
    }
}
