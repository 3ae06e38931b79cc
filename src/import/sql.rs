//! SQL Import functionality
//!
//! Reads a single free-form `CREATE TABLE` statement into a [`TableSchema`].
//!
//! The statement is tokenized with `sqlparser`'s tokenizer and then walked by
//! hand: first the table identifier, then the parenthesized column block,
//! then one column definition per top-level comma. Parsing never fails; input
//! that yields no columns produces a schema whose diagnostic message is
//! [`PARSE_FAILURE_MESSAGE`].

use once_cell::sync::Lazy;
use regex::Regex;
use sqlparser::dialect::{Dialect, GenericDialect, MySqlDialect, dialect_from_str};
use sqlparser::tokenizer::{Token, Tokenizer, Word};

use crate::models::{Column, PARSE_FAILURE_MESSAGE, PARSE_SUCCESS_MESSAGE, TableSchema};
use crate::typemap::TYPE_MAPPING;

/// Table name used when no identifier can be recovered
pub const PLACEHOLDER_TABLE_NAME: &str = "extracted_table";

/// Database shown when the statement carries no database qualifier
pub const PLACEHOLDER_DATABASE: &str = "sourcedb";

/// Namespace shown when the statement carries no schema qualifier
pub const PLACEHOLDER_SCHEMA: &str = "sourceschema";

static LOOSE_TABLE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)CREATE\s+(?:OR\s+REPLACE\s+)?TABLE\s+([^\s(]+)").unwrap()
});

/// Shape of the identifier following `CREATE TABLE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableIdentifier {
    /// `database.schema.table`
    FullyQualified {
        database: String,
        schema: String,
        table: String,
    },
    /// `schema.table`
    SchemaQualified { schema: String, table: String },
    /// `table`
    Unqualified { table: String },
    /// No `CREATE TABLE <name>` form was found
    Unrecognized,
}

impl TableIdentifier {
    fn from_parts(mut parts: Vec<String>) -> Self {
        // `server.db.schema.table` and longer keep the last three parts
        if parts.len() > 3 {
            parts.drain(..parts.len() - 3);
        }
        let mut parts = parts.into_iter();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(database), Some(schema), Some(table)) => TableIdentifier::FullyQualified {
                database,
                schema,
                table,
            },
            (Some(schema), Some(table), None) => TableIdentifier::SchemaQualified { schema, table },
            (Some(table), None, None) => TableIdentifier::Unqualified { table },
            _ => TableIdentifier::Unrecognized,
        }
    }

    pub fn table(&self) -> Option<&str> {
        match self {
            TableIdentifier::FullyQualified { table, .. }
            | TableIdentifier::SchemaQualified { table, .. }
            | TableIdentifier::Unqualified { table } => Some(table),
            TableIdentifier::Unrecognized => None,
        }
    }

    pub fn schema(&self) -> Option<&str> {
        match self {
            TableIdentifier::FullyQualified { schema, .. }
            | TableIdentifier::SchemaQualified { schema, .. } => Some(schema),
            _ => None,
        }
    }

    pub fn database(&self) -> Option<&str> {
        match self {
            TableIdentifier::FullyQualified { database, .. } => Some(database),
            _ => None,
        }
    }
}

/// SQL Importer - parses a CREATE TABLE statement
pub struct SQLImporter {
    /// SQL dialect used by the tokenizer ("generic", "mysql", "postgresql", "mssql", ...)
    pub dialect: String,
    /// Fill unresolved database/schema qualifiers with display placeholders
    pub fill_placeholders: bool,
}

impl Default for SQLImporter {
    fn default() -> Self {
        Self {
            dialect: "generic".to_string(),
            fill_placeholders: true,
        }
    }
}

impl SQLImporter {
    /// Create a new SQL importer with the specified dialect
    pub fn new(dialect: &str) -> Self {
        Self {
            dialect: dialect.to_string(),
            ..Default::default()
        }
    }

    /// Leave unresolved qualifiers as `None` instead of the display placeholders
    pub fn without_placeholders(mut self) -> Self {
        self.fill_placeholders = false;
        self
    }

    /// Parse a CREATE TABLE statement into a canonical schema
    ///
    /// # Example
    ///
    /// ```rust
    /// use bq_ddl_sdk::import::sql::SQLImporter;
    ///
    /// let schema = SQLImporter::default()
    ///     .parse("CREATE TABLE employees (id INT NOT NULL, name VARCHAR(100));");
    /// assert_eq!(schema.table_name, "employees");
    /// assert_eq!(schema.columns.len(), 2);
    /// assert!(!schema.columns[0].nullable);
    /// ```
    pub fn parse(&self, raw_ddl: &str) -> TableSchema {
        let mut schema = match self.tokenize(raw_ddl) {
            Ok(tokens) => parse_tokens(&tokens, raw_ddl),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to tokenize DDL, reading column definitions one by one");
                self.parse_fragments(raw_ddl)
            }
        };

        schema.diagnostic_message = Some(if schema.columns.is_empty() {
            PARSE_FAILURE_MESSAGE.to_string()
        } else {
            PARSE_SUCCESS_MESSAGE.to_string()
        });

        if self.fill_placeholders {
            schema
                .database
                .get_or_insert_with(|| PLACEHOLDER_DATABASE.to_string());
            schema
                .schema_namespace
                .get_or_insert_with(|| PLACEHOLDER_SCHEMA.to_string());
        }

        tracing::debug!(
            table = %schema.table_name,
            columns = schema.columns.len(),
            "Parsed DDL"
        );
        schema
    }

    /// Recovery path for statements the tokenizer rejects as a whole
    ///
    /// The column block is located on the raw text, split with
    /// [`split_column_definitions`], and each definition is tokenized on its
    /// own so one bad fragment only loses itself.
    fn parse_fragments(&self, raw_ddl: &str) -> TableSchema {
        let block = find_text_column_block(raw_ddl);
        let header = match block {
            Some((open, _)) => &raw_ddl[..open],
            None => raw_ddl,
        };

        let identifier = self
            .tokenize(header)
            .ok()
            .and_then(|tokens| {
                find_create_table(&tokens).map(|start| parse_identifier_at(&tokens, start).0)
            })
            .unwrap_or(TableIdentifier::Unrecognized);

        let mut schema = TableSchema::default();
        apply_identifier(&mut schema, &identifier, raw_ddl);

        if let Some((open, close)) = block {
            for definition in split_column_definitions(&raw_ddl[open + 1..close]) {
                let Some(tokens) = self.tokenize_fragment(&definition) else {
                    tracing::debug!(definition = %definition, "Skipping unreadable column definition");
                    continue;
                };
                if let Some(column) = parse_column_definition(&tokens) {
                    schema.columns.push(column);
                }
            }
            if let Ok(trailing) = self.tokenize(&raw_ddl[close + 1..]) {
                if let Some(comment) = find_table_comment(&trailing) {
                    schema.table_comment = comment;
                }
            }
        }
        schema
    }

    /// Tokenize one column definition, retrying with backslash escapes and
    /// finally without its quoted tail
    fn tokenize_fragment(&self, definition: &str) -> Option<Vec<Token>> {
        self.tokenize(definition)
            .or_else(|_| tokenize_with(&MySqlDialect {}, definition))
            .or_else(|_| {
                let head = definition.split(['\'', '"']).next().unwrap_or_default();
                self.tokenize(head)
            })
            .ok()
    }

    /// Identify the table identifier shape without reading columns
    pub fn parse_identifier(&self, raw_ddl: &str) -> TableIdentifier {
        let Ok(tokens) = self.tokenize(raw_ddl) else {
            return TableIdentifier::Unrecognized;
        };
        match find_create_table(&tokens) {
            Some(start) => parse_identifier_at(&tokens, start).0,
            None => TableIdentifier::Unrecognized,
        }
    }

    fn tokenize(&self, raw_ddl: &str) -> Result<Vec<Token>, String> {
        let dialect: Box<dyn Dialect> =
            dialect_from_str(&self.dialect).unwrap_or_else(|| Box::new(GenericDialect {}));
        tokenize_with(dialect.as_ref(), raw_ddl)
    }
}

fn tokenize_with(dialect: &dyn Dialect, text: &str) -> Result<Vec<Token>, String> {
    let tokens = Tokenizer::new(dialect, text)
        .tokenize()
        .map_err(|e| e.to_string())?;
    Ok(tokens
        .into_iter()
        .filter(|t| !matches!(t, Token::Whitespace(_)))
        .collect())
}

fn parse_tokens(tokens: &[Token], raw_ddl: &str) -> TableSchema {
    let (identifier, ident_end) = match find_create_table(tokens) {
        Some(start) => parse_identifier_at(tokens, start),
        None => (TableIdentifier::Unrecognized, 0),
    };

    let mut schema = TableSchema::default();
    apply_identifier(&mut schema, &identifier, raw_ddl);

    if let Some((open, close)) = find_column_block(tokens, ident_end) {
        let block = &tokens[open + 1..close];
        for definition in split_token_definitions(block) {
            if let Some(column) = parse_column_definition(definition) {
                schema.columns.push(column);
            }
        }
        if let Some(comment) = find_table_comment(&tokens[close + 1..]) {
            schema.table_comment = comment;
        }
    }
    schema
}

fn apply_identifier(schema: &mut TableSchema, identifier: &TableIdentifier, raw_ddl: &str) {
    match identifier.table() {
        Some(table) => {
            schema.table_name = table.to_string();
            schema.schema_namespace = identifier.schema().map(str::to_string);
            schema.database = identifier.database().map(str::to_string);
        }
        None => {
            schema.table_name =
                loose_table_name(raw_ddl).unwrap_or_else(|| PLACEHOLDER_TABLE_NAME.to_string());
            tracing::debug!(table = %schema.table_name, "Fell back to loose table name match");
        }
    }
}

/// Byte range (open paren, matching close paren) of the column block in raw text
///
/// Quotes are skipped, including backslash-escaped quote characters. Falls
/// back to the last `)` when the parentheses do not balance.
fn find_text_column_block(raw_ddl: &str) -> Option<(usize, usize)> {
    let from = LOOSE_TABLE_NAME.find(raw_ddl).map_or(0, |m| m.end());
    let open = from + raw_ddl[from..].find('(')?;

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (offset, ch) in raw_ddl[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' && q != '`' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' | '`' => quote = Some(ch),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open, open + offset));
                }
            }
            _ => {}
        }
    }

    let close = raw_ddl.rfind(')')?;
    (close > open).then_some((open, close))
}

/// Collapse every run of whitespace (including newlines) to one space
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a column block on commas that are not nested in parentheses or quotes.
///
/// ```rust
/// use bq_ddl_sdk::import::sql::split_column_definitions;
///
/// let parts = split_column_definitions("a DECIMAL(10,2), b INT");
/// assert_eq!(parts, vec!["a DECIMAL(10,2)", "b INT"]);
/// ```
pub fn split_column_definitions(block: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in block.chars() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' && q != '`' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
                current.push(ch);
            }
            None => match ch {
                '\'' | '"' | '`' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '(' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                }
                ',' if depth == 0 => {
                    parts.push(std::mem::take(&mut current));
                }
                _ => current.push(ch),
            },
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

fn loose_table_name(raw_ddl: &str) -> Option<String> {
    let normalized = normalize_whitespace(raw_ddl);
    LOOSE_TABLE_NAME
        .captures(&normalized)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn is_keyword(token: Option<&Token>, keyword: &str) -> bool {
    matches!(
        token,
        Some(Token::Word(Word { value, quote_style: None, .. })) if value.eq_ignore_ascii_case(keyword)
    )
}

/// Position just after `CREATE [OR REPLACE] [TEMP|TEMPORARY] TABLE [IF NOT EXISTS]`
fn find_create_table(tokens: &[Token]) -> Option<usize> {
    for start in 0..tokens.len() {
        if !is_keyword(tokens.get(start), "CREATE") {
            continue;
        }
        let mut pos = start + 1;
        if is_keyword(tokens.get(pos), "OR") && is_keyword(tokens.get(pos + 1), "REPLACE") {
            pos += 2;
        }
        if is_keyword(tokens.get(pos), "TEMPORARY") || is_keyword(tokens.get(pos), "TEMP") {
            pos += 1;
        }
        if !is_keyword(tokens.get(pos), "TABLE") {
            continue;
        }
        pos += 1;
        if is_keyword(tokens.get(pos), "IF")
            && is_keyword(tokens.get(pos + 1), "NOT")
            && is_keyword(tokens.get(pos + 2), "EXISTS")
        {
            pos += 3;
        }
        return Some(pos);
    }
    None
}

/// Read one identifier part: bare, quoted, or `[bracketed]`
fn identifier_part(tokens: &[Token], pos: usize) -> Option<(Vec<String>, usize)> {
    match tokens.get(pos)? {
        Token::Word(w) if w.quote_style == Some('`') && w.value.contains('.') => Some((
            w.value.split('.').map(str::to_string).collect(),
            pos + 1,
        )),
        Token::Word(w) => Some((vec![w.value.clone()], pos + 1)),
        Token::LBracket => match (tokens.get(pos + 1), tokens.get(pos + 2)) {
            (Some(Token::Word(w)), Some(Token::RBracket)) => Some((vec![w.value.clone()], pos + 3)),
            _ => None,
        },
        _ => None,
    }
}

fn parse_identifier_at(tokens: &[Token], start: usize) -> (TableIdentifier, usize) {
    let mut parts = Vec::new();
    let mut pos = start;

    while let Some((part, next)) = identifier_part(tokens, pos) {
        parts.extend(part);
        pos = next;
        if matches!(tokens.get(pos), Some(Token::Period)) {
            pos += 1;
        } else {
            break;
        }
    }

    (TableIdentifier::from_parts(parts), pos)
}

/// Locate the column block as (open paren index, matching close paren index)
fn find_column_block(tokens: &[Token], from: usize) -> Option<(usize, usize)> {
    let open = (from..tokens.len()).find(|&i| tokens[i] == Token::LParen)?;

    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Some((open, i));
                }
            }
            _ => {}
        }
    }

    // Unbalanced: settle for the last closing paren
    let close = tokens.iter().rposition(|t| *t == Token::RParen)?;
    (close > open).then_some((open, close))
}

fn split_token_definitions(block: &[Token]) -> Vec<&[Token]> {
    let mut definitions = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, token) in block.iter().enumerate() {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::Comma if depth == 0 => {
                definitions.push(&block[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    definitions.push(&block[start..]);

    definitions.into_iter().filter(|d| !d.is_empty()).collect()
}

fn is_table_constraint(definition: &[Token]) -> bool {
    let first = definition.first();
    let second = definition.get(1);
    if is_keyword(first, "CONSTRAINT") {
        return true;
    }
    if is_keyword(first, "PRIMARY") || is_keyword(first, "FOREIGN") {
        return is_keyword(second, "KEY");
    }
    if is_keyword(first, "UNIQUE") || is_keyword(first, "CHECK") {
        return matches!(second, Some(Token::LParen))
            || is_keyword(second, "KEY")
            || is_keyword(second, "INDEX");
    }
    if is_keyword(first, "KEY")
        || is_keyword(first, "INDEX")
        || is_keyword(first, "FULLTEXT")
        || is_keyword(first, "SPATIAL")
    {
        // `KEY idx (col)` vs a column literally named `key`
        return match second {
            Some(Token::LParen) => true,
            Some(Token::Word(w)) => !TYPE_MAPPING.contains_key(w.value.to_uppercase().as_str()),
            _ => false,
        };
    }
    false
}

fn is_multiword_type_prefix(candidate: &str) -> bool {
    TYPE_MAPPING
        .keys()
        .any(|k| k.len() > candidate.len() && k.starts_with(candidate) && k[candidate.len()..].starts_with(' '))
}

/// Render the tokens of a parenthesized suffix back to text, e.g. `(10,2)`
fn render_suffix(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev_was_word = false;
    for token in tokens {
        let is_word = matches!(token, Token::Word(_) | Token::Number(_, _));
        if is_word && prev_was_word {
            out.push(' ');
        }
        out.push_str(&token.to_string());
        prev_was_word = is_word;
    }
    out
}

/// Read `<type word>[(suffix)][ more type words]` starting at `pos`
fn parse_type(definition: &[Token], pos: usize) -> Option<(String, usize)> {
    let Some(Token::Word(first)) = definition.get(pos) else {
        return None;
    };

    let mut words = vec![first.value.clone()];
    let mut suffix = String::new();
    let mut pos = pos + 1;
    let mut accepted_words = 1;
    let mut accepted_pos = pos;

    loop {
        match definition.get(pos) {
            Some(Token::LParen) if suffix.is_empty() => {
                let mut depth = 0usize;
                let start = pos;
                while let Some(token) = definition.get(pos) {
                    match token {
                        Token::LParen => depth += 1,
                        Token::RParen => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    pos += 1;
                }
                let end = pos.min(definition.len().saturating_sub(1));
                suffix = render_suffix(&definition[start..=end]);
                pos = end + 1;
                accepted_pos = pos;
            }
            Some(Token::Word(w)) if w.quote_style.is_none() => {
                let candidate = format!("{} {}", words.join(" "), w.value).to_uppercase();
                if TYPE_MAPPING.contains_key(candidate.as_str()) {
                    words.push(w.value.clone());
                    pos += 1;
                    accepted_words = words.len();
                    accepted_pos = pos;
                } else if is_multiword_type_prefix(&candidate) {
                    words.push(w.value.clone());
                    pos += 1;
                } else {
                    break;
                }
            }
            _ => break,
        }
    }

    words.truncate(accepted_words);
    Some((format!("{}{}", words.join(" "), suffix), accepted_pos))
}

fn string_literal(token: Option<&Token>) -> Option<String> {
    match token? {
        Token::SingleQuotedString(s) | Token::DoubleQuotedString(s) => Some(s.clone()),
        Token::Word(Word {
            value,
            quote_style: Some('"'),
            ..
        }) => Some(value.clone()),
        _ => None,
    }
}

/// Parse one column definition; `None` for constraints and unreadable fragments
fn parse_column_definition(definition: &[Token]) -> Option<Column> {
    if is_table_constraint(definition) {
        tracing::debug!("Skipping table constraint clause");
        return None;
    }

    let (name_parts, pos) = identifier_part(definition, 0)?;
    let name = name_parts.join(".");
    let (source_type, mut pos) = parse_type(definition, pos)?;

    let mut column = Column::new(name, source_type);
    let mut depth = 0usize;

    while pos < definition.len() {
        let token = &definition[pos];
        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            _ if is_keyword(Some(token), "NOT") && is_keyword(definition.get(pos + 1), "NULL") => {
                column.nullable = false;
                pos += 1;
            }
            _ if is_keyword(Some(token), "COMMENT") => {
                let mut value_pos = pos + 1;
                if matches!(definition.get(value_pos), Some(Token::Eq)) {
                    value_pos += 1;
                }
                if let Some(comment) = string_literal(definition.get(value_pos)) {
                    column.comment = comment;
                    pos = value_pos;
                }
            }
            _ => {}
        }
        pos += 1;
    }

    Some(column)
}

/// Table-level `COMMENT [=] '...'` following the column block
fn find_table_comment(trailing: &[Token]) -> Option<String> {
    let pos = trailing
        .iter()
        .position(|t| is_keyword(Some(t), "COMMENT"))?;
    let mut value_pos = pos + 1;
    if matches!(trailing.get(value_pos), Some(Token::Eq)) {
        value_pos += 1;
    }
    string_literal(trailing.get(value_pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_importer_default() {
        let importer = SQLImporter::default();
        assert_eq!(importer.dialect, "generic");
        assert!(importer.fill_placeholders);
    }

    #[test]
    fn test_parse_employees() {
        let schema = SQLImporter::default().parse(
            "CREATE TABLE employees (id INT NOT NULL, name VARCHAR(100), hire_date DATE);",
        );
        assert_eq!(schema.table_name, "employees");
        assert_eq!(schema.columns.len(), 3);
        assert!(!schema.columns[0].nullable);
        assert!(schema.columns[1].nullable);
        assert!(schema.columns[2].nullable);
        assert_eq!(schema.columns[1].source_type, "VARCHAR(100)");
        assert_eq!(
            schema.diagnostic_message.as_deref(),
            Some(PARSE_SUCCESS_MESSAGE)
        );
    }

    #[test]
    fn test_identifier_shapes() {
        let importer = SQLImporter::default();
        assert_eq!(
            importer.parse_identifier("CREATE TABLE db1.sch1.t1 (a INT)"),
            TableIdentifier::FullyQualified {
                database: "db1".into(),
                schema: "sch1".into(),
                table: "t1".into()
            }
        );
        assert_eq!(
            importer.parse_identifier("create or replace table hr.people (a INT)"),
            TableIdentifier::SchemaQualified {
                schema: "hr".into(),
                table: "people".into()
            }
        );
        assert_eq!(
            importer.parse_identifier("CREATE TABLE people (a INT)"),
            TableIdentifier::Unqualified {
                table: "people".into()
            }
        );
        assert_eq!(
            importer.parse_identifier("SELECT 1"),
            TableIdentifier::Unrecognized
        );
    }

    #[test]
    fn test_bare_table_keeps_qualifiers_unset() {
        let schema = SQLImporter::default()
            .without_placeholders()
            .parse("CREATE TABLE people (a INT)");
        assert_eq!(schema.database, None);
        assert_eq!(schema.schema_namespace, None);

        let schema = SQLImporter::default().parse("CREATE TABLE people (a INT)");
        assert_eq!(schema.database.as_deref(), Some(PLACEHOLDER_DATABASE));
        assert_eq!(schema.schema_namespace.as_deref(), Some(PLACEHOLDER_SCHEMA));
    }

    #[test]
    fn test_quoted_identifiers() {
        let schema = SQLImporter::new("mysql")
            .parse("CREATE TABLE `shop`.`orders` (`id` BIGINT NOT NULL, `total` DECIMAL(12, 2))");
        assert_eq!(schema.table_name, "orders");
        assert_eq!(schema.schema_namespace.as_deref(), Some("shop"));
        assert_eq!(schema.columns[0].name, "id");
        assert_eq!(schema.columns[1].source_type, "DECIMAL(12,2)");

        let identifier =
            SQLImporter::default().parse_identifier("CREATE OR REPLACE TABLE `proj.ds.t` (a INT64)");
        assert_eq!(
            identifier,
            TableIdentifier::FullyQualified {
                database: "proj".into(),
                schema: "ds".into(),
                table: "t".into()
            }
        );
    }

    #[test]
    fn test_bracket_identifiers() {
        let schema = SQLImporter::new("mssql")
            .parse("CREATE TABLE [dbo].[Users] ([UserId] INT NOT NULL, [Email] NVARCHAR(255) NULL)");
        assert_eq!(schema.table_name, "Users");
        assert_eq!(schema.schema_namespace.as_deref(), Some("dbo"));
        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.columns[0].name, "UserId");
        assert!(!schema.columns[0].nullable);
        assert!(schema.columns[1].nullable);
    }

    #[test]
    fn test_comments() {
        let schema = SQLImporter::new("mysql").parse(
            "CREATE TABLE t (id INT NOT NULL COMMENT 'Primary id', note TEXT COMMENT \"Free text\") COMMENT='Audit table'",
        );
        assert_eq!(schema.columns[0].comment, "Primary id");
        assert_eq!(schema.columns[1].comment, "Free text");
        assert_eq!(schema.table_comment, "Audit table");
    }

    #[test]
    fn test_no_column_block() {
        let schema = SQLImporter::default().parse("CREATE TABLE lonely");
        assert!(schema.columns.is_empty());
        assert_eq!(schema.table_name, "lonely");
        assert!(schema.is_parse_failure());
    }

    #[test]
    fn test_backslash_escaped_comment_recovers_columns() {
        let schema = SQLImporter::default().parse(
            "CREATE TABLE t (id INT NOT NULL, note TEXT COMMENT 'Customer\\'s note', qty INT)",
        );
        assert_eq!(schema.table_name, "t");
        assert_eq!(schema.diagnostic_message.as_deref(), Some(PARSE_SUCCESS_MESSAGE));
        let names: Vec<_> = schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "note", "qty"]);
        assert!(!schema.columns[0].nullable);
        assert_eq!(schema.columns[1].comment, "Customer's note");
        assert_eq!(schema.columns[2].source_type, "INT");
    }

    #[test]
    fn test_unterminated_quote_after_block_keeps_columns() {
        let schema = SQLImporter::default()
            .without_placeholders()
            .parse("CREATE TABLE sales.t (id INT NOT NULL, name VARCHAR(10)) COMMENT='oops");
        assert_eq!(schema.table_name, "t");
        assert_eq!(schema.schema_namespace.as_deref(), Some("sales"));
        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.columns[1].source_type, "VARCHAR(10)");
        assert!(schema.table_comment.is_empty());
    }

    #[test]
    fn test_unreadable_definition_keeps_its_name_and_type() {
        let schema = SQLImporter::default()
            .parse("CREATE TABLE t (a INT, b TEXT COMMENT 'never closed, c DATE)");
        assert_eq!(schema.columns[0].name, "a");
        assert_eq!(schema.columns[1].name, "b");
        assert_eq!(schema.columns[1].source_type, "TEXT");
    }

    #[test]
    fn test_garbage_input() {
        let schema = SQLImporter::default().parse("this is not sql at all 'unterminated");
        assert!(schema.columns.is_empty());
        assert_eq!(schema.table_name, PLACEHOLDER_TABLE_NAME);
        assert!(schema.is_parse_failure());
    }

    #[test]
    fn test_skips_constraints() {
        let schema = SQLImporter::default().parse(
            "CREATE TABLE t (id INT, key VARCHAR(10), PRIMARY KEY (id), CONSTRAINT fk FOREIGN KEY (id) REFERENCES o(id), UNIQUE (key))",
        );
        let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "key"]);
    }

    #[test]
    fn test_multiword_types() {
        let schema = SQLImporter::new("postgresql").parse(
            "CREATE TABLE t (a DOUBLE PRECISION, b CHARACTER VARYING(20) NOT NULL, c TIMESTAMP WITH TIME ZONE, d TIMESTAMP NULL)",
        );
        let types: Vec<&str> = schema.columns.iter().map(|c| c.source_type.as_str()).collect();
        assert_eq!(
            types,
            vec![
                "DOUBLE PRECISION",
                "CHARACTER VARYING(20)",
                "TIMESTAMP WITH TIME ZONE",
                "TIMESTAMP"
            ]
        );
        assert!(!schema.columns[1].nullable);
        assert!(schema.columns[3].nullable);
    }

    #[test]
    fn test_multiline_input_with_sql_comments() {
        let ddl = "CREATE TABLE IF NOT EXISTS logs (\n  -- surrogate key\n  id BIGINT NOT NULL,\n  payload JSON\n);";
        let schema = SQLImporter::default().parse(ddl);
        assert_eq!(schema.table_name, "logs");
        assert_eq!(schema.columns.len(), 2);
        assert_eq!(schema.columns[1].source_type, "JSON");
    }

    #[test]
    fn test_split_column_definitions() {
        assert_eq!(
            split_column_definitions("a DECIMAL(10,2), b INT"),
            vec!["a DECIMAL(10,2)", "b INT"]
        );
        assert_eq!(
            split_column_definitions("a TEXT COMMENT 'x, y', b INT,  "),
            vec!["a TEXT COMMENT 'x, y'", "b INT"]
        );
        assert_eq!(
            split_column_definitions(r"a TEXT COMMENT 'it\'s, fine', b INT"),
            vec![r"a TEXT COMMENT 'it\'s, fine'", "b INT"]
        );
        assert!(split_column_definitions("   ").is_empty());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("CREATE\n  TABLE\tt ( a INT )"), "CREATE TABLE t ( a INT )");
    }
}
