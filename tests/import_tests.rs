//! Import module tests

use bq_ddl_sdk::import::{JSONImporter, SQLImporter, TableIdentifier};
use bq_ddl_sdk::models::{PARSE_FAILURE_MESSAGE, PARSE_SUCCESS_MESSAGE};

mod sql_import_tests {
    use super::*;

    #[test]
    fn test_parse_employees() {
        let importer = SQLImporter::new("mysql");
        let sql = "CREATE TABLE employees (\n\
                   id INT NOT NULL COMMENT 'Employee ID',\n\
                   name VARCHAR(100) COMMENT 'Employee Name',\n\
                   hire_date DATE\n\
                   ) COMMENT = 'Employee master table';";
        let schema = importer.parse(sql);

        assert_eq!(schema.table_name, "employees");
        assert_eq!(schema.diagnostic_message.as_deref(), Some(PARSE_SUCCESS_MESSAGE));
        assert_eq!(schema.columns.len(), 3);

        let id = &schema.columns[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.source_type, "INT");
        assert!(!id.nullable);
        assert_eq!(id.comment, "Employee ID");

        let name = &schema.columns[1];
        assert_eq!(name.source_type, "VARCHAR(100)");
        assert!(name.nullable);
        assert_eq!(name.comment, "Employee Name");

        assert_eq!(schema.columns[2].comment, "");
        assert_eq!(schema.table_comment, "Employee master table");
    }

    #[test]
    fn test_fully_qualified_name() {
        let importer = SQLImporter::default().without_placeholders();
        let schema = importer.parse("CREATE TABLE db1.sch1.t1 (a INT)");

        assert_eq!(schema.table_name, "t1");
        assert_eq!(schema.schema_namespace.as_deref(), Some("sch1"));
        assert_eq!(schema.database.as_deref(), Some("db1"));
        assert_eq!(
            importer.parse_identifier("CREATE TABLE db1.sch1.t1 (a INT)"),
            TableIdentifier::FullyQualified {
                database: "db1".to_string(),
                schema: "sch1".to_string(),
                table: "t1".to_string(),
            }
        );
    }

    #[test]
    fn test_schema_qualified_name() {
        let importer = SQLImporter::new("postgresql").without_placeholders();
        let schema = importer.parse("CREATE TABLE public.users (id SERIAL, email TEXT NOT NULL)");

        assert_eq!(schema.table_name, "users");
        assert_eq!(schema.schema_namespace.as_deref(), Some("public"));
        assert_eq!(schema.database, None);
    }

    #[test]
    fn test_placeholders_for_missing_qualifiers() {
        let schema = SQLImporter::default().parse("CREATE TABLE users (id INT)");
        assert_eq!(schema.database.as_deref(), Some("sourcedb"));
        assert_eq!(schema.schema_namespace.as_deref(), Some("sourceschema"));
    }

    #[test]
    fn test_no_column_block() {
        let schema = SQLImporter::default().parse("CREATE TABLE widgets");
        assert_eq!(schema.table_name, "widgets");
        assert!(schema.columns.is_empty());
        assert_eq!(schema.diagnostic_message.as_deref(), Some(PARSE_FAILURE_MESSAGE));
        assert!(schema.is_parse_failure());
    }

    #[test]
    fn test_decimal_precision_stays_in_one_column() {
        let schema = SQLImporter::default()
            .parse("CREATE TABLE prices (amount DECIMAL(10,2) NOT NULL, currency CHAR(3))");

        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.columns[0].name, "amount");
        assert_eq!(schema.columns[0].source_type, "DECIMAL(10,2)");
        assert!(!schema.columns[0].nullable);
        assert_eq!(schema.columns[1].source_type, "CHAR(3)");
    }

    #[test]
    fn test_table_constraints_are_not_columns() {
        let schema = SQLImporter::new("postgresql").parse(
            "CREATE TABLE orders (\n\
               id BIGINT NOT NULL,\n\
               customer_id BIGINT,\n\
               PRIMARY KEY (id),\n\
               CONSTRAINT fk_customer FOREIGN KEY (customer_id) REFERENCES customers (id)\n\
             )",
        );
        let names: Vec<_> = schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "customer_id"]);
    }

    #[test]
    fn test_sql_server_brackets() {
        let schema = SQLImporter::new("mssql")
            .parse("CREATE TABLE [sales].[dbo].[Invoices] ([InvoiceId] INT NOT NULL, [Total] MONEY)");
        assert_eq!(schema.table_name, "Invoices");
        assert_eq!(schema.schema_namespace.as_deref(), Some("dbo"));
        assert_eq!(schema.database.as_deref(), Some("sales"));
        assert_eq!(schema.columns[1].source_type, "MONEY");
    }
}

mod json_import_tests {
    use super::*;

    #[test]
    fn test_parse_interchange_json() {
        let json = r#"{
            "table_name": "employees",
            "columns": [
                {"name": "id", "type": "int", "nullable": false, "comment": "Employee ID"},
                {"name": "salary", "type": "decimal(10,2)", "comment": null}
            ],
            "db": "hrdb",
            "schema": "hr",
            "table_comment": "Employee master table"
        }"#;
        let schema = JSONImporter::new().parse(json).unwrap();

        assert_eq!(schema.table_name, "employees");
        assert_eq!(schema.database.as_deref(), Some("hrdb"));
        assert_eq!(schema.schema_namespace.as_deref(), Some("hr"));
        assert!(!schema.columns[0].nullable);
        assert!(schema.columns[1].nullable);
        assert_eq!(schema.columns[1].comment, "");
    }

    #[test]
    fn test_parse_output_of_sql_importer() {
        let parsed = SQLImporter::default().parse("CREATE TABLE t (a INT NOT NULL, b TEXT)");
        let json = parsed.to_json_pretty().unwrap();
        let decoded = JSONImporter::new().parse(&json).unwrap();

        assert_eq!(decoded.table_name, parsed.table_name);
        assert_eq!(decoded.columns, parsed.columns);
        assert_eq!(decoded.diagnostic_message, parsed.diagnostic_message);
    }
}
