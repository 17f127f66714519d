//! Standard SQL parser wrapping sqlparser-rs.
//!
//! The sandbox parses with `GenericDialect`, the same dialect DataFusion
//! uses by default, so whatever the validator admits is parsed the same
//! way by the engine.

use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};

/// Tokenize SQL text. Comments come back as whitespace tokens.
pub fn tokenize_sql(sql: &str) -> Result<Vec<Token>, String> {
    let dialect = GenericDialect {};
    Tokenizer::new(&dialect, sql)
        .tokenize()
        .map_err(|e| e.to_string())
}

/// Parse SQL statement(s).
///
/// # Errors
///
/// Returns the parser message if the SQL syntax is invalid.
pub fn parse_sql(sql: &str) -> Result<Vec<Statement>, String> {
    Parser::parse_sql(&GenericDialect {}, sql).map_err(|e| e.to_string())
}
