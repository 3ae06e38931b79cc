//! End-to-end pipeline tests

use bq_ddl_sdk::import::{CatalogColumn, CatalogTable};
use bq_ddl_sdk::{DdlRequest, PipelineError, TargetOptions, generate_ddl};

const EMPLOYEES_DDL: &str = "CREATE TABLE employees (\n\
    id INT NOT NULL COMMENT 'Employee ID',\n\
    name VARCHAR(100),\n\
    salary DECIMAL(10,2)\n\
);";

mod generate_tests {
    use super::*;

    #[test]
    fn test_ddl_to_bigquery() {
        let request =
            DdlRequest::ddl(EMPLOYEES_DDL).with_target(TargetOptions::new().with_dataset("hr"));
        let output = generate_ddl(&request).unwrap();

        assert_eq!(
            output.ddl,
            "CREATE OR REPLACE TABLE `hr.employees` (\n  \
             id INT64 NOT NULL OPTIONS(description=\"Employee ID\"),\n  \
             name STRING,\n  \
             salary NUMERIC\n);"
        );
        assert_eq!(output.diagnostic.as_deref(), Some("Columns parsed successfully"));
        assert_eq!(output.schema.columns[2].target_type.as_deref(), Some("NUMERIC"));
    }

    #[test]
    fn test_json_to_bigquery() {
        let json = r#"{
            "table_name": "Orders",
            "columns": [
                {"name": "order_id", "type": "bigint", "nullable": false},
                {"name": "payload", "type": "jsonb"},
                {"name": "", "type": "geometry"}
            ]
        }"#;
        let output = generate_ddl(&DdlRequest::json(json)).unwrap();

        assert_eq!(
            output.ddl,
            "CREATE OR REPLACE TABLE `Orders` (\n  \
             order_id INT64 NOT NULL,\n  \
             payload JSON,\n  \
             column_3 GEOGRAPHY\n);"
        );
    }

    #[test]
    fn test_catalog_to_bigquery() {
        let mut status = CatalogColumn::new("Status", "character varying", true);
        status.comment = Some("Order status".to_string());
        let table = CatalogTable {
            table_name: "orders".to_string(),
            database: Some("shop".to_string()),
            schema_namespace: Some("public".to_string()),
            table_comment: None,
            columns: vec![CatalogColumn::new("id", "integer", false), status],
        };

        let request = DdlRequest::catalog(table)
            .with_target(TargetOptions::new().with_namespace_fallback(true));
        let output = generate_ddl(&request).unwrap();

        assert_eq!(
            output.ddl,
            "CREATE OR REPLACE TABLE `public.orders` (\n  \
             id INT64 NOT NULL,\n  \
             status STRING OPTIONS(description=\"Order status\")\n);"
        );
    }

    #[test]
    fn test_unparseable_input_still_renders() {
        let output = generate_ddl(&DdlRequest::ddl("SELECT 1")).unwrap();
        assert_eq!(output.diagnostic.as_deref(), Some("Failed to parse columns"));
        assert!(output.ddl.ends_with("(\n);"));
    }

    #[test]
    fn test_invalid_json_fails() {
        let err = generate_ddl(&DdlRequest::json("{broken")).unwrap_err();
        assert!(matches!(err, PipelineError::Import(_)));
    }

    #[test]
    fn test_duplicate_columns() {
        let ddl = "CREATE TABLE t (id INT, ID BIGINT)";

        let output = generate_ddl(&DdlRequest::ddl(ddl)).unwrap();
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.schema.columns.len(), 2);

        let err = generate_ddl(&DdlRequest::ddl(ddl).with_strict(true)).unwrap_err();
        assert!(matches!(err, PipelineError::Normalize(_)));
    }
}

#[cfg(feature = "llm")]
mod enrichment_tests {
    use super::*;

    use async_trait::async_trait;
    use bq_ddl_sdk::generate_ddl_with_comments;
    use bq_ddl_sdk::llm::{
        CommentEnricher, CompletionResponse, EnrichmentConfig, GenerationRequest, LlmClient,
        LlmError, LlmResult, sanitize_comment,
    };

    /// Replies with the same text to every prompt, or fails every call
    struct ScriptedClient {
        reply: Option<String>,
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, _request: &GenerationRequest) -> LlmResult<CompletionResponse> {
            match &self.reply {
                Some(text) => Ok(CompletionResponse::new(text.clone())),
                None => Err(LlmError::ConnectionError("connection refused".to_string())),
            }
        }

        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn is_ready(&self) -> bool {
            self.reply.is_some()
        }
    }

    #[test]
    fn test_sanitize_labelled_reply() {
        assert_eq!(
            sanitize_comment("Description: Employee's unique ID.\n"),
            "Employee's unique ID."
        );
    }

    #[tokio::test]
    async fn test_enriched_comments_are_rendered() {
        let client = ScriptedClient {
            reply: Some("Description: Employee's unique ID.\n".to_string()),
        };
        let enricher = CommentEnricher::new(client, EnrichmentConfig::default());

        let output = generate_ddl_with_comments(&DdlRequest::ddl(EMPLOYEES_DDL), &enricher)
            .await
            .unwrap();

        // Existing comments are kept
        assert!(output.ddl.contains("id INT64 NOT NULL OPTIONS(description=\"Employee ID\")"));
        assert!(output.ddl.contains("name STRING OPTIONS(description=\"Employee's unique ID.\")"));
        assert!(output.ddl.ends_with(") OPTIONS(description=\"Employee's unique ID.\");"));
        assert!(output.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_failed_enrichment_becomes_warning() {
        let enricher = CommentEnricher::new(ScriptedClient { reply: None }, EnrichmentConfig::default());

        let output = generate_ddl_with_comments(&DdlRequest::ddl(EMPLOYEES_DDL), &enricher)
            .await
            .unwrap();

        assert!(output.ddl.contains("  name STRING,\n"));
        assert_eq!(output.warnings.len(), 1);
        assert!(output.warnings[0].starts_with("comment enrichment failed"));
    }
}
