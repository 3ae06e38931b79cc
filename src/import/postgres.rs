//! PostgreSQL catalog reader
//!
//! Reads column metadata from `information_schema.columns` and comments from
//! `pg_description`, using the statements in
//! [`SourceEngine::queries`](super::catalog::SourceEngine::queries).

use std::collections::HashMap;

use async_trait::async_trait;
use tokio_postgres::types::FromSql;
use tokio_postgres::{Client, NoTls, Row};

use super::catalog::{
    CatalogColumn, CatalogError, CatalogReader, CatalogTable, ConnectionConfig, SourceEngine,
    apply_column_comments,
};

/// Catalog reader for PostgreSQL sources
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresCatalogReader;

impl PostgresCatalogReader {
    pub fn new() -> Self {
        Self
    }

    /// Open a client for `database`, falling back to the configured database
    async fn connect(
        &self,
        config: &ConnectionConfig,
        database: Option<&str>,
    ) -> Result<Client, CatalogError> {
        if config.engine != SourceEngine::Postgres {
            return Err(CatalogError::Config(format!(
                "PostgreSQL reader cannot connect to {}",
                config.engine
            )));
        }

        let mut pg = tokio_postgres::Config::new();
        pg.host(&config.host)
            .port(config.port_or_default())
            .user(&config.username);
        if !config.password.is_empty() {
            pg.password(&config.password);
        }
        if let Some(dbname) = database
            .filter(|d| !d.is_empty())
            .or(config.database.as_deref())
        {
            pg.dbname(dbname);
        }

        let (client, connection) = pg
            .connect(NoTls)
            .await
            .map_err(|e| CatalogError::Connection(e.to_string()))?;

        // Spawn connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "PostgreSQL connection error");
            }
        });

        Ok(client)
    }

    async fn single_column(
        client: &Client,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<String>, CatalogError> {
        let rows = client
            .query(sql, params)
            .await
            .map_err(|e| CatalogError::Query(e.to_string()))?;
        rows.iter().map(|row| value(row, 0)).collect()
    }
}

/// Read a column, reporting type mismatches as query errors
fn value<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> Result<T, CatalogError> {
    row.try_get(idx)
        .map_err(|e| CatalogError::Query(format!("column {}: {}", idx, e)))
}

#[async_trait]
impl CatalogReader for PostgresCatalogReader {
    fn engine(&self) -> SourceEngine {
        SourceEngine::Postgres
    }

    async fn test_connection(&self, config: &ConnectionConfig) -> Result<Vec<String>, CatalogError> {
        let client = self.connect(config, None).await?;
        let databases =
            Self::single_column(&client, SourceEngine::Postgres.queries().list_databases, &[])
                .await?;
        tracing::info!(host = %config.host, databases = databases.len(), "Connected to PostgreSQL");
        Ok(databases)
    }

    async fn list_schemas(
        &self,
        config: &ConnectionConfig,
        database: &str,
    ) -> Result<Vec<String>, CatalogError> {
        let client = self.connect(config, Some(database)).await?;
        Self::single_column(&client, SourceEngine::Postgres.queries().list_schemas, &[]).await
    }

    async fn list_tables(
        &self,
        config: &ConnectionConfig,
        database: &str,
        schema: &str,
    ) -> Result<Vec<String>, CatalogError> {
        let client = self.connect(config, Some(database)).await?;
        Self::single_column(
            &client,
            SourceEngine::Postgres.queries().list_tables,
            &[&schema],
        )
        .await
    }

    async fn read_table(
        &self,
        config: &ConnectionConfig,
        database: &str,
        schema: &str,
        table: &str,
    ) -> Result<CatalogTable, CatalogError> {
        let engine = SourceEngine::Postgres;
        let queries = engine.queries();
        let client = self.connect(config, Some(database)).await?;

        let rows = client
            .query(queries.columns, &[&schema, &table])
            .await
            .map_err(|e| CatalogError::Query(e.to_string()))?;
        if rows.is_empty() {
            return Err(CatalogError::TableNotFound(format!("{}.{}", schema, table)));
        }

        let mut columns = rows
            .iter()
            .map(|row| {
                let nullable: String = value(row, 2)?;
                Ok(CatalogColumn {
                    name: value(row, 0)?,
                    data_type: value(row, 1)?,
                    nullable: engine.parse_nullable(&nullable),
                    comment: value(row, 3)?,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        if let Some(sql) = queries.column_comments {
            let comment_rows = client
                .query(sql, &[&schema, &table])
                .await
                .map_err(|e| CatalogError::Query(e.to_string()))?;
            let mut comments = HashMap::new();
            for row in &comment_rows {
                if let Some(description) = value::<Option<String>>(row, 1)? {
                    comments.insert(value::<String>(row, 0)?, description);
                }
            }
            apply_column_comments(&mut columns, &comments);
        }

        let table_comment = match client
            .query_opt(queries.table_comment, &[&schema, &table])
            .await
            .map_err(|e| CatalogError::Query(e.to_string()))?
        {
            Some(row) => value::<Option<String>>(&row, 0)?,
            None => None,
        };

        let (database, schema_namespace) = engine.qualifiers(database, schema);
        tracing::debug!(table, columns = columns.len(), "Read PostgreSQL table metadata");

        Ok(CatalogTable {
            table_name: table.to_string(),
            database,
            schema_namespace,
            table_comment,
            columns,
        })
    }
}
