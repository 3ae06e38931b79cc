//! `catalog` command: browse a live source database

use std::path::PathBuf;

use clap::{Args, Subcommand};

use bq_ddl_sdk::import::{
    CatalogError, CatalogReader, ConnectionConfig, PostgresCatalogReader, SourceEngine,
};

use crate::error::CliError;
use crate::output::{format_list, format_schema, write_output};

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Source engine (only postgresql has a reader in this build)
    #[arg(long, default_value = "postgresql")]
    pub engine: String,

    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Port (engine default if not provided)
    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long, short = 'u')]
    pub user: String,

    #[arg(long, default_value = "")]
    pub password: String,
}

impl ConnectionArgs {
    fn connection(&self) -> Result<ConnectionConfig, CliError> {
        let engine: SourceEngine = self
            .engine
            .parse()
            .map_err(|e: CatalogError| CliError::InvalidArgument(e.to_string()))?;
        let mut config =
            ConnectionConfig::new(engine, &self.host, &self.user).with_password(&self.password);
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Test the connection and list databases
    Databases,

    /// List schemas of a database
    Schemas {
        #[arg(long)]
        database: String,
    },

    /// List tables of a schema
    Tables {
        #[arg(long)]
        database: String,
        #[arg(long)]
        schema: String,
    },

    /// Read one table as a canonical schema
    Show {
        #[arg(long)]
        database: String,
        #[arg(long)]
        schema: String,
        #[arg(long)]
        table: String,

        /// Output format: json or yaml
        #[arg(long, default_value = "json")]
        format: String,

        /// Output file (stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: CatalogCommand,
}

fn reader_for(engine: SourceEngine) -> Result<impl CatalogReader, CliError> {
    match engine {
        SourceEngine::Postgres => Ok(PostgresCatalogReader::new()),
        other => Err(CliError::Catalog(format!(
            "no catalog reader for {} in this build",
            other
        ))),
    }
}

/// Handle the catalog command
pub async fn handle_catalog(args: &CatalogArgs) -> Result<(), CliError> {
    let config = args.connection.connection()?;
    let reader = reader_for(config.engine)?;
    let catalog_err = |e: CatalogError| CliError::Catalog(e.to_string());

    match &args.command {
        CatalogCommand::Databases => {
            let databases = reader.test_connection(&config).await.map_err(catalog_err)?;
            println!("{}", format_list(&databases, "(no databases)"));
        }
        CatalogCommand::Schemas { database } => {
            let schemas = reader
                .list_schemas(&config, database)
                .await
                .map_err(catalog_err)?;
            println!("{}", format_list(&schemas, "(no schemas)"));
        }
        CatalogCommand::Tables { database, schema } => {
            let tables = reader
                .list_tables(&config, database, schema)
                .await
                .map_err(catalog_err)?;
            println!("{}", format_list(&tables, "(no tables)"));
        }
        CatalogCommand::Show {
            database,
            schema,
            table,
            format,
            output,
        } => {
            let table_schema = reader
                .read_table_schema(&config, database, schema, table)
                .await
                .map_err(catalog_err)?;
            write_output(&format_schema(&table_schema, format)?, output.as_deref())?;
        }
    }
    Ok(())
}
