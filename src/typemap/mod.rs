//! Type mapping from source database types to BigQuery.
//!
//! Lookup is case-insensitive and keyed on the base type name, so
//! `VARCHAR(100)`, `varchar` and `Varchar(20)` all resolve the same way.
//! Unknown types never fail; they degrade to [`DEFAULT_TARGET_TYPE`].

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Target type used when a source type is not in the mapping table
pub const DEFAULT_TARGET_TYPE: &str = "STRING";

/// BigQuery column types produced by the mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BigQueryType {
    Int64,
    Float64,
    Numeric,
    BigNumeric,
    String,
    Bool,
    Date,
    Time,
    Datetime,
    Timestamp,
    Json,
    Bytes,
    Geography,
}

impl BigQueryType {
    /// The keyword as written in DDL
    pub fn as_str(&self) -> &'static str {
        match self {
            BigQueryType::Int64 => "INT64",
            BigQueryType::Float64 => "FLOAT64",
            BigQueryType::Numeric => "NUMERIC",
            BigQueryType::BigNumeric => "BIGNUMERIC",
            BigQueryType::String => "STRING",
            BigQueryType::Bool => "BOOL",
            BigQueryType::Date => "DATE",
            BigQueryType::Time => "TIME",
            BigQueryType::Datetime => "DATETIME",
            BigQueryType::Timestamp => "TIMESTAMP",
            BigQueryType::Json => "JSON",
            BigQueryType::Bytes => "BYTES",
            BigQueryType::Geography => "GEOGRAPHY",
        }
    }
}

impl fmt::Display for BigQueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source type name (upper-case, no length suffix) to BigQuery type
pub static TYPE_MAPPING: Lazy<HashMap<&'static str, BigQueryType>> = Lazy::new(|| {
    use BigQueryType::*;

    let entries: &[(&str, BigQueryType)] = &[
        // Integer family
        ("INTEGER", Int64),
        ("INT", Int64),
        ("INT2", Int64),
        ("INT4", Int64),
        ("INT8", Int64),
        ("BIGINT", Int64),
        ("SMALLINT", Int64),
        ("TINYINT", Int64),
        ("MEDIUMINT", Int64),
        ("SERIAL", Int64),
        ("BIGSERIAL", Int64),
        ("SMALLSERIAL", Int64),
        ("PLS_INTEGER", Int64),
        ("INT64", Int64),
        // Floating point
        ("FLOAT", Float64),
        ("FLOAT4", Float64),
        ("FLOAT8", Float64),
        ("DOUBLE", Float64),
        ("DOUBLE PRECISION", Float64),
        ("REAL", Float64),
        ("BINARY_FLOAT", Float64),
        ("BINARY_DOUBLE", Float64),
        ("FLOAT64", Float64),
        // Exact numerics
        ("NUMERIC", Numeric),
        ("DECIMAL", Numeric),
        ("NUMBER", Numeric),
        ("MONEY", Numeric),
        ("SMALLMONEY", Numeric),
        ("BIGNUMERIC", BigNumeric),
        // Character data
        ("VARCHAR", String),
        ("VARCHAR2", String),
        ("NVARCHAR", String),
        ("NVARCHAR2", String),
        ("CHAR", String),
        ("NCHAR", String),
        ("CHARACTER", String),
        ("CHARACTER VARYING", String),
        ("BPCHAR", String),
        ("TEXT", String),
        ("NTEXT", String),
        ("TINYTEXT", String),
        ("MEDIUMTEXT", String),
        ("LONGTEXT", String),
        ("CLOB", String),
        ("NCLOB", String),
        ("LONG", String),
        ("UUID", String),
        ("UNIQUEIDENTIFIER", String),
        ("ENUM", String),
        ("XML", String),
        ("STRING", String),
        // Boolean
        ("BOOLEAN", Bool),
        ("BOOL", Bool),
        ("BIT", Bool),
        // Date and time
        ("DATE", Date),
        ("TIME", Time),
        ("TIME WITHOUT TIME ZONE", Time),
        ("TIMESTAMP", Timestamp),
        ("TIMESTAMPTZ", Timestamp),
        ("TIMESTAMP WITH TIME ZONE", Timestamp),
        ("TIMESTAMP WITHOUT TIME ZONE", Timestamp),
        ("TIMESTAMP WITH LOCAL TIME ZONE", Timestamp),
        ("DATETIME", Timestamp),
        ("DATETIME2", Timestamp),
        ("SMALLDATETIME", Timestamp),
        ("DATETIMEOFFSET", Timestamp),
        // JSON
        ("JSON", Json),
        ("JSONB", Json),
        // Binary
        ("BYTEA", Bytes),
        ("BLOB", Bytes),
        ("TINYBLOB", Bytes),
        ("MEDIUMBLOB", Bytes),
        ("LONGBLOB", Bytes),
        ("BINARY", Bytes),
        ("VARBINARY", Bytes),
        ("IMAGE", Bytes),
        ("RAW", Bytes),
        ("LONG RAW", Bytes),
        ("BYTES", Bytes),
        // Spatial
        ("GEOGRAPHY", Geography),
        ("GEOMETRY", Geography),
    ];

    entries.iter().copied().collect()
});

/// Extract the lookup key for a source type.
///
/// Drops any parenthesized suffix, collapses whitespace and upper-cases:
/// `"character varying(20)"` becomes `"CHARACTER VARYING"`.
pub fn base_type(source_type: &str) -> String {
    let head = source_type.split('(').next().unwrap_or_default();
    head.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Resolve the BigQuery type for a source type, if the mapping table knows it
pub fn lookup(source_type: &str) -> Option<BigQueryType> {
    let base = base_type(source_type);
    if let Some(mapped) = TYPE_MAPPING.get(base.as_str()) {
        return Some(*mapped);
    }

    // `INT UNSIGNED` and similar modifiers: retry with the first word only
    let first_word = base.split(' ').next()?;
    TYPE_MAPPING.get(first_word).copied()
}

/// Map a source type to its BigQuery type name.
///
/// # Example
///
/// ```rust
/// use bq_ddl_sdk::typemap::map_type;
///
/// assert_eq!(map_type("VARCHAR(100)"), "STRING");
/// assert_eq!(map_type("bigint"), "INT64");
/// assert_eq!(map_type("some_custom_type"), "STRING");
/// ```
pub fn map_type(source_type: &str) -> &'static str {
    match lookup(source_type) {
        Some(mapped) => mapped.as_str(),
        None => {
            tracing::debug!(source_type, "Unmapped source type, using {}", DEFAULT_TARGET_TYPE);
            DEFAULT_TARGET_TYPE
        }
    }
}

/// Whether the mapping table has an entry for this type
pub fn is_known_type(source_type: &str) -> bool {
    lookup(source_type).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_type_families() {
        assert_eq!(map_type("INT"), "INT64");
        assert_eq!(map_type("smallint"), "INT64");
        assert_eq!(map_type("DOUBLE"), "FLOAT64");
        assert_eq!(map_type("DECIMAL"), "NUMERIC");
        assert_eq!(map_type("TEXT"), "STRING");
        assert_eq!(map_type("BOOLEAN"), "BOOL");
        assert_eq!(map_type("DATE"), "DATE");
        assert_eq!(map_type("DATETIME"), "TIMESTAMP");
        assert_eq!(map_type("JSONB"), "JSON");
        assert_eq!(map_type("BYTEA"), "BYTES");
    }

    fn alternate_case(text: &str) -> String {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                if i % 2 == 0 {
                    c.to_ascii_lowercase()
                } else {
                    c.to_ascii_uppercase()
                }
            })
            .collect()
    }

    #[test]
    fn test_every_mapping_key_ignores_case_and_suffix() {
        for (key, expected) in TYPE_MAPPING.iter() {
            let expected = expected.as_str();
            let variants = [
                key.to_string(),
                key.to_lowercase(),
                alternate_case(key),
                format!("{}(10)", key.to_lowercase()),
                format!("{} (18, 4)", alternate_case(key)),
                format!("  {}  ", key.replace(' ', "   ")),
            ];
            for variant in &variants {
                assert_eq!(map_type(variant), expected, "{variant:?} (key {key})");
                assert!(is_known_type(variant), "{variant:?} (key {key})");
            }
        }
    }

    #[test]
    fn test_unknown_type_ignores_case() {
        for t in ["nonsense", "NONSENSE", "NonSense(3)"] {
            assert_eq!(map_type(t), DEFAULT_TARGET_TYPE);
        }
    }

    #[test]
    fn test_precision_suffix_ignored() {
        assert_eq!(map_type("DECIMAL(10,2)"), map_type("DECIMAL"));
        assert_eq!(map_type("VARCHAR(100)"), "STRING");
        assert_eq!(map_type("timestamp(6)"), "TIMESTAMP");
    }

    #[test]
    fn test_multi_word_catalog_types() {
        assert_eq!(map_type("character varying"), "STRING");
        assert_eq!(map_type("double precision"), "FLOAT64");
        assert_eq!(map_type("timestamp without time zone"), "TIMESTAMP");
        assert_eq!(map_type("INT UNSIGNED"), "INT64");
    }

    #[test]
    fn test_unknown_falls_back() {
        assert_eq!(map_type("hstore"), DEFAULT_TARGET_TYPE);
        assert_eq!(map_type(""), DEFAULT_TARGET_TYPE);
        assert!(!is_known_type("hstore"));
        assert!(is_known_type("nvarchar(max)"));
    }

    #[test]
    fn test_bigquery_names_are_identity() {
        for t in ["INT64", "FLOAT64", "NUMERIC", "STRING", "BOOL", "DATE", "TIMESTAMP", "JSON", "BYTES"] {
            assert_eq!(map_type(t), t);
        }
    }

    #[test]
    fn test_base_type() {
        assert_eq!(base_type("character  varying(20)"), "CHARACTER VARYING");
        assert_eq!(base_type(" numeric (10, 2)"), "NUMERIC");
    }
}
