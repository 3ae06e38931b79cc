//! Prompt templates and output cleanup for comment generation
//!
//! Small models rarely follow "output only the description" to the letter:
//! replies come back with labels (`Description:`), chat-template markers
//! (`<|end|>`), markdown noise and several candidate lines.
//! [`sanitize_comment`] reduces such a reply to one plain line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Prompt for a single column description
pub const COLUMN_COMMENT_PROMPT: &str = r#"You are a database expert.
Write a single-line, human-readable description for the column below.
- Output ONLY the description.
- Do NOT add 'Solution:', 'Output:', 'Response:', examples, JSON, markdown, assistant, end, explanation or any commentary.
- Keep it concise, one line.

Column: {column_name}
Type: {column_type}
"#;

/// Prompt for a table description
pub const TABLE_COMMENT_PROMPT: &str = r#"Table: {table_name}
Task: Write a short, meaningful comment describing this table for a database schema.
Return ONLY the comment as a string.
"#;

/// Prompt for annotating a whole rendered statement
pub const ANNOTATE_DDL_PROMPT: &str = r#"Add helpful comments to each column and the table in this BigQuery DDL using OPTIONS(description="...") for both columns and the table.
Return only the modified DDL.
{ddl}"#;

/// Chat-template markers and markdown noise, removed wherever they appear
static NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<\|end\|>|<\|assistant\|>|\[response\]:|\*{2,}|-{3,}|###[^\n]*")
        .expect("Invalid noise regex")
});

/// Answer labels at the start of a line, e.g. `Description:`, `- answer:`, `Solution 1:`
static LABEL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^[ \t]*[-*]?[ \t]*(?:description|solution|output|answer|response|tutor)[ \t]*\d*[ \t]*[:\-]+[ \t]*",
    )
    .expect("Invalid label regex")
});

/// Build the prompt for one column
pub fn column_prompt(column_name: &str, column_type: &str) -> String {
    COLUMN_COMMENT_PROMPT
        .replace("{column_name}", column_name)
        .replace("{column_type}", column_type)
}

/// Build the prompt for a table
pub fn table_prompt(table_name: &str) -> String {
    TABLE_COMMENT_PROMPT.replace("{table_name}", table_name)
}

/// Build the prompt for annotating a DDL statement
pub fn annotate_prompt(ddl: &str) -> String {
    ANNOTATE_DDL_PROMPT.replace("{ddl}", ddl)
}

/// Reduce a raw model reply to a single description line
///
/// Strips markers and line-leading labels, drops wrapping quotes, then keeps
/// the longest remaining non-empty line (the first one on a tie). Returns an
/// empty string when nothing is left.
///
/// # Example
///
/// ```rust
/// use bq_ddl_sdk::llm::prompt::sanitize_comment;
///
/// assert_eq!(sanitize_comment("Description: Employee's unique ID.\n"), "Employee's unique ID.");
/// ```
pub fn sanitize_comment(raw: &str) -> String {
    let without_noise = NOISE.replace_all(raw, "");
    let without_labels = LABEL_PREFIX.replace_all(&without_noise, "");

    without_labels
        .lines()
        .map(strip_wrapping_quotes)
        .filter(|line| !line.is_empty())
        .fold(None::<&str>, |best, line| match best {
            Some(b) if b.chars().count() >= line.chars().count() => Some(b),
            _ => Some(line),
        })
        .unwrap_or_default()
        .to_string()
}

fn strip_wrapping_quotes(line: &str) -> &str {
    let mut line = line.trim();
    loop {
        let bytes = line.as_bytes();
        let wrapped = bytes.len() >= 2
            && matches!(bytes[0], b'"' | b'\'')
            && bytes[bytes.len() - 1] == bytes[0];
        if !wrapped {
            break;
        }
        line = line[1..line.len() - 1].trim();
    }
    line.trim_matches('"').trim()
}

/// Pull the statement out of a reply that may wrap it in a code fence
pub fn extract_ddl(response: &str) -> String {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```") {
        let content_start = start + 3;
        // Skip the language tag
        let content_start = trimmed[content_start..]
            .find('\n')
            .map(|n| content_start + n + 1)
            .unwrap_or(content_start);
        if let Some(end) = trimmed[content_start..].find("```") {
            return trimmed[content_start..content_start + end]
                .trim()
                .to_string();
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_prompt() {
        let prompt = column_prompt("hire_date", "DATE");
        assert!(prompt.contains("database expert"));
        assert!(prompt.contains("Column: hire_date"));
        assert!(prompt.contains("Type: DATE"));
    }

    #[test]
    fn test_table_and_annotate_prompts() {
        assert!(table_prompt("employees").starts_with("Table: employees\n"));
        let prompt = annotate_prompt("CREATE OR REPLACE TABLE `t` (\n);");
        assert!(prompt.contains("OPTIONS(description="));
        assert!(prompt.ends_with("CREATE OR REPLACE TABLE `t` (\n);"));
    }

    #[test]
    fn test_sanitize_description_label() {
        assert_eq!(
            sanitize_comment("Description: Employee's unique ID.\n"),
            "Employee's unique ID."
        );
    }

    #[test]
    fn test_sanitize_markers() {
        assert_eq!(
            sanitize_comment("<|assistant|>**response:** Date the employee was hired<|end|>"),
            "Date the employee was hired"
        );
        assert_eq!(
            sanitize_comment("### Answer\n- answer: Customer email address\n---"),
            "Customer email address"
        );
        assert_eq!(sanitize_comment("[response]: Order total"), "Order total");
    }

    #[test]
    fn test_sanitize_quotes() {
        assert_eq!(sanitize_comment("\"Primary key of the table\""), "Primary key of the table");
        assert_eq!(sanitize_comment("'Row creation time'"), "Row creation time");
    }

    #[test]
    fn test_sanitize_keeps_longest_line() {
        let raw = "Output: Id\nSolution 1: Unique identifier of the employee\nok";
        assert_eq!(sanitize_comment(raw), "Unique identifier of the employee");
    }

    #[test]
    fn test_sanitize_label_only_at_line_start() {
        assert_eq!(
            sanitize_comment("Short description: of the product"),
            "Short description: of the product"
        );
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_comment(""), "");
        assert_eq!(sanitize_comment("<|end|>\n  \n---"), "");
    }

    #[test]
    fn test_extract_ddl() {
        let response = "Here you go:\n```sql\nCREATE OR REPLACE TABLE `t` (\n  id INT64\n);\n```\nDone.";
        assert_eq!(extract_ddl(response), "CREATE OR REPLACE TABLE `t` (\n  id INT64\n);");
        assert_eq!(extract_ddl("  CREATE TABLE x;  "), "CREATE TABLE x;");
    }
}
