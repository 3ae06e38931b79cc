//! Source database catalog interface
//!
//! Catalog readers query a live database's metadata tables and hand back
//! [`CatalogTable`] records in ordinal column order. The engine is chosen
//! once, as a [`SourceEngine`] value or a concrete [`CatalogReader`], and the
//! connection details travel with every call in a [`ConnectionConfig`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Column, TableSchema};
use crate::validation::normalize::normalize_schema;

/// Errors raised by catalog readers
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Could not reach or authenticate against the source
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A catalog query failed
    #[error("Catalog query failed: {0}")]
    Query(String),

    /// The requested table does not exist or has no columns
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The engine has no reader in this build
    #[error("No catalog reader for {0}. Enable with --features {1}")]
    Unsupported(SourceEngine, &'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Supported source database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceEngine {
    MySql,
    Postgres,
    SqlServer,
    Oracle,
}

/// Catalog SQL for one engine, using the engine's own bind placeholder syntax
#[derive(Debug, Clone, Copy)]
pub struct CatalogQueries {
    pub list_databases: &'static str,
    pub list_schemas: &'static str,
    /// Binds: schema
    pub list_tables: &'static str,
    /// Binds: schema, table. Rows: name, data type, nullable flag, comment
    pub columns: &'static str,
    /// Binds: schema, table. Rows: column name, comment
    pub column_comments: Option<&'static str>,
    /// Binds: schema, table. Row: comment
    pub table_comment: &'static str,
}

const MYSQL_QUERIES: CatalogQueries = CatalogQueries {
    list_databases: "SHOW DATABASES",
    list_schemas: "SHOW DATABASES",
    list_tables: "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
                  WHERE TABLE_SCHEMA = ? ORDER BY TABLE_NAME",
    columns: "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE, COLUMN_COMMENT \
              FROM INFORMATION_SCHEMA.COLUMNS \
              WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
              ORDER BY ORDINAL_POSITION",
    column_comments: None,
    table_comment: "SELECT TABLE_COMMENT FROM INFORMATION_SCHEMA.TABLES \
                    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?",
};

const POSTGRES_QUERIES: CatalogQueries = CatalogQueries {
    list_databases: "SELECT datname::text FROM pg_database WHERE datistemplate = false ORDER BY datname",
    list_schemas: "SELECT schema_name::text FROM information_schema.schemata \
                   WHERE schema_name NOT IN ('pg_catalog', 'information_schema') \
                   ORDER BY schema_name",
    list_tables: "SELECT table_name::text FROM information_schema.tables \
                  WHERE table_schema = $1::text ORDER BY table_name",
    columns: "SELECT column_name::text, data_type::text, is_nullable::text, NULL::text \
              FROM information_schema.columns \
              WHERE table_schema = $1::text AND table_name = $2::text \
              ORDER BY ordinal_position",
    column_comments: Some(
        "SELECT a.attname::text, d.description \
         FROM pg_catalog.pg_attribute a \
         LEFT JOIN pg_catalog.pg_description d \
           ON d.objoid = a.attrelid AND d.objsubid = a.attnum \
         WHERE a.attrelid = format('%I.%I', $1::text, $2::text)::regclass \
           AND a.attnum > 0 AND NOT a.attisdropped",
    ),
    table_comment: "SELECT obj_description(format('%I.%I', $1::text, $2::text)::regclass, 'pg_class')",
};

const SQLSERVER_QUERIES: CatalogQueries = CatalogQueries {
    list_databases: "SELECT name FROM sys.databases ORDER BY name",
    list_schemas: "SELECT name FROM sys.schemas ORDER BY name",
    list_tables: "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
                  WHERE TABLE_SCHEMA = @P1 ORDER BY TABLE_NAME",
    columns: "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE, CAST(NULL AS NVARCHAR(4000)) \
              FROM INFORMATION_SCHEMA.COLUMNS \
              WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2 \
              ORDER BY ORDINAL_POSITION",
    column_comments: Some(
        "SELECT c.name, CAST(ep.value AS NVARCHAR(4000)) \
         FROM sys.columns c \
         LEFT JOIN sys.extended_properties ep \
           ON ep.major_id = c.object_id AND ep.minor_id = c.column_id \
          AND ep.name = 'MS_Description' \
         WHERE c.object_id = OBJECT_ID(QUOTENAME(@P1) + '.' + QUOTENAME(@P2))",
    ),
    table_comment: "SELECT CAST(ep.value AS NVARCHAR(4000)) FROM sys.extended_properties ep \
                    WHERE ep.major_id = OBJECT_ID(QUOTENAME(@P1) + '.' + QUOTENAME(@P2)) \
                      AND ep.minor_id = 0 AND ep.name = 'MS_Description'",
};

const ORACLE_QUERIES: CatalogQueries = CatalogQueries {
    list_databases: "SELECT name FROM v$database",
    list_schemas: "SELECT username FROM all_users ORDER BY username",
    list_tables: "SELECT table_name FROM all_tables WHERE owner = :1 ORDER BY table_name",
    columns: "SELECT col.column_name, col.data_type, col.nullable, comm.comments \
              FROM all_tab_columns col \
              LEFT JOIN all_col_comments comm \
                ON col.owner = comm.owner \
               AND col.table_name = comm.table_name \
               AND col.column_name = comm.column_name \
              WHERE col.owner = :1 AND col.table_name = :2 \
              ORDER BY col.column_id",
    column_comments: None,
    table_comment: "SELECT comments FROM all_tab_comments WHERE owner = :1 AND table_name = :2",
};

impl SourceEngine {
    pub const ALL: [SourceEngine; 4] = [
        SourceEngine::MySql,
        SourceEngine::Postgres,
        SourceEngine::SqlServer,
        SourceEngine::Oracle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceEngine::MySql => "mysql",
            SourceEngine::Postgres => "postgresql",
            SourceEngine::SqlServer => "sqlserver",
            SourceEngine::Oracle => "oracle",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            SourceEngine::MySql => 3306,
            SourceEngine::Postgres => 5432,
            SourceEngine::SqlServer => 1433,
            SourceEngine::Oracle => 1521,
        }
    }

    /// The tokenizer dialect to use for DDL pasted from this engine
    pub fn sql_dialect(&self) -> &'static str {
        match self {
            SourceEngine::MySql => "mysql",
            SourceEngine::Postgres => "postgresql",
            SourceEngine::SqlServer => "mssql",
            SourceEngine::Oracle => "generic",
        }
    }

    pub fn queries(&self) -> &'static CatalogQueries {
        match self {
            SourceEngine::MySql => &MYSQL_QUERIES,
            SourceEngine::Postgres => &POSTGRES_QUERIES,
            SourceEngine::SqlServer => &SQLSERVER_QUERIES,
            SourceEngine::Oracle => &ORACLE_QUERIES,
        }
    }

    /// Decode the catalog's nullability flag (`YES`/`NO`, or Oracle's `Y`/`N`)
    pub fn parse_nullable(&self, flag: &str) -> bool {
        let flag = flag.trim();
        match self {
            SourceEngine::Oracle => flag.eq_ignore_ascii_case("Y"),
            _ => flag.eq_ignore_ascii_case("YES"),
        }
    }

    /// `(database, schema namespace)` recorded on a schema read from this engine
    ///
    /// MySQL has no namespace below the database, so the database doubles as
    /// the namespace. Oracle connects to a service and has owners only.
    pub fn qualifiers(&self, database: &str, schema: &str) -> (Option<String>, Option<String>) {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        match self {
            SourceEngine::MySql => (non_empty(database), non_empty(database)),
            SourceEngine::Oracle => (None, non_empty(schema)),
            _ => (non_empty(database), non_empty(schema)),
        }
    }
}

impl fmt::Display for SourceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceEngine {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(SourceEngine::MySql),
            "postgresql" | "postgres" | "pg" => Ok(SourceEngine::Postgres),
            "sqlserver" | "mssql" => Ok(SourceEngine::SqlServer),
            "oracle" => Ok(SourceEngine::Oracle),
            other => Err(CatalogError::Config(format!(
                "unknown database system '{}'",
                other
            ))),
        }
    }
}

/// Connection details passed to every catalog call
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub engine: SourceEngine,
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Database to connect to (Oracle: service name)
    #[serde(default)]
    pub database: Option<String>,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

impl ConnectionConfig {
    pub fn new(engine: SourceEngine, host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            engine,
            host: host.into(),
            port: None,
            username: username.into(),
            password: String::new(),
            database: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or_else(|| self.engine.default_port())
    }

    /// Copy of this config pointed at another database
    pub fn for_database(&self, database: &str) -> Self {
        let mut config = self.clone();
        config.database = Some(database.to_string());
        config
    }
}

/// One column as read from a catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

impl CatalogColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            comment: None,
        }
    }
}

/// One table as read from a catalog, columns in ordinal order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTable {
    pub table_name: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub schema_namespace: Option<String>,
    #[serde(default)]
    pub table_comment: Option<String>,
    pub columns: Vec<CatalogColumn>,
}

impl CatalogTable {
    /// Convert to a normalized canonical schema
    pub fn into_schema(self) -> TableSchema {
        let columns = self
            .columns
            .into_iter()
            .map(|c| {
                Column::new(c.name, c.data_type)
                    .with_nullable(c.nullable)
                    .with_comment(c.comment.unwrap_or_default())
            })
            .collect();

        let schema = TableSchema {
            table_name: self.table_name,
            columns,
            database: self.database,
            schema_namespace: self.schema_namespace,
            table_comment: self.table_comment.unwrap_or_default(),
            diagnostic_message: None,
        };
        normalize_schema(schema)
    }
}

/// Fill column comments read by a separate catalog query
///
/// Columns absent from `comments` keep whatever comment they already carry.
pub fn apply_column_comments(columns: &mut [CatalogColumn], comments: &HashMap<String, String>) {
    for column in columns.iter_mut() {
        if let Some(comment) = comments.get(&column.name) {
            if !comment.is_empty() {
                column.comment = Some(comment.clone());
            }
        }
    }
}

/// A live metadata reader for one source engine
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Engine this reader talks to
    fn engine(&self) -> SourceEngine;

    /// Connect and list the databases visible to the user
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<Vec<String>, CatalogError>;

    /// List schemas (owners for Oracle, databases for MySQL)
    async fn list_schemas(
        &self,
        config: &ConnectionConfig,
        database: &str,
    ) -> Result<Vec<String>, CatalogError>;

    /// List tables in a schema
    async fn list_tables(
        &self,
        config: &ConnectionConfig,
        database: &str,
        schema: &str,
    ) -> Result<Vec<String>, CatalogError>;

    /// Read one table's columns and comments
    async fn read_table(
        &self,
        config: &ConnectionConfig,
        database: &str,
        schema: &str,
        table: &str,
    ) -> Result<CatalogTable, CatalogError>;

    /// Read one table straight into a normalized canonical schema
    async fn read_table_schema(
        &self,
        config: &ConnectionConfig,
        database: &str,
        schema: &str,
        table: &str,
    ) -> Result<TableSchema, CatalogError> {
        let table = self.read_table(config, database, schema, table).await?;
        Ok(table.into_schema())
    }
}
