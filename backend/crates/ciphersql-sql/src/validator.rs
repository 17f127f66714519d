//! QueryValidator: admit a single read-only query or reject it with a reason.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. empty / too long
//! 2. tokenize (strings and comments recognized)
//! 3. first significant token is `SELECT` or `WITH`
//! 4. no significant tokens after a statement terminator
//! 5. no unquoted mutating keyword ([`MutatingKeyword`])
//! 6. parse; exactly one statement; [`check_read_only`] on its tree
//!
//! The validator is pure: no I/O, no engine interaction.

use crate::keywords::MutatingKeyword;
use crate::parser::{parse_sql, tokenize_sql};
use crate::readonly::check_read_only;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::Token;
use std::fmt;
use thiserror::Error;

/// Default upper bound on raw query length, in bytes.
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 64 * 1024;

const READ_ONLY_GUIDANCE: &str = "Only SELECT queries are allowed.";

/// Why a query was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    Empty,
    TooLong,
    Syntax,
    NotSelect,
    MultipleStatements,
    ProhibitedOperation,
}

impl RejectionKind {
    /// Stable error code reported to callers.
    pub fn code(self) -> &'static str {
        match self {
            RejectionKind::Empty => "EMPTY_QUERY",
            RejectionKind::TooLong => "QUERY_TOO_LONG",
            RejectionKind::Syntax => "SYNTAX_ERROR",
            RejectionKind::NotSelect => "ONLY_SELECT_ALLOWED",
            RejectionKind::MultipleStatements => "MULTIPLE_STATEMENTS",
            RejectionKind::ProhibitedOperation => "PROHIBITED_OPERATION",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A rejected query: the kind plus a learner-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Rejection {
    pub kind: RejectionKind,
    pub message: String,
}

impl Rejection {
    fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// A query that passed every check. Only the validator creates these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmittedQuery {
    sql: String,
}

impl AdmittedQuery {
    /// The trimmed query text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn into_sql(self) -> String {
        self.sql
    }
}

/// Validation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Admitted(AdmittedQuery),
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Verdict::Admitted(_))
    }

    pub fn into_result(self) -> Result<AdmittedQuery, Rejection> {
        match self {
            Verdict::Admitted(query) => Ok(query),
            Verdict::Rejected(rejection) => Err(rejection),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryValidator {
    max_query_length: usize,
}

impl Default for QueryValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUERY_LENGTH)
    }
}

impl QueryValidator {
    pub fn new(max_query_length: usize) -> Self {
        Self { max_query_length }
    }

    pub fn max_query_length(&self) -> usize {
        self.max_query_length
    }

    /// Classify `raw` as admitted or rejected.
    pub fn validate(&self, raw: &str) -> Verdict {
        match self.check(raw) {
            Ok(sql) => Verdict::Admitted(AdmittedQuery { sql }),
            Err(rejection) => {
                log::debug!("🚫 Query rejected [{}]: {}", rejection.code(), rejection.message);
                Verdict::Rejected(rejection)
            },
        }
    }

    fn check(&self, raw: &str) -> Result<String, Rejection> {
        let sql = raw.trim();
        if sql.is_empty() {
            return Err(Rejection::new(RejectionKind::Empty, "Query cannot be empty."));
        }
        if sql.len() > self.max_query_length {
            return Err(Rejection::new(
                RejectionKind::TooLong,
                format!(
                    "Query exceeds the maximum length of {} characters.",
                    self.max_query_length
                ),
            ));
        }

        let tokens = tokenize_sql(sql).map_err(|e| {
            Rejection::new(RejectionKind::Syntax, format!("Syntax error: {}", e))
        })?;

        check_leading_keyword(&tokens)?;
        check_single_statement(&tokens)?;
        check_mutating_keywords(&tokens)?;

        let statements = parse_sql(sql).map_err(|e| {
            Rejection::new(RejectionKind::Syntax, format!("Syntax error: {}", e))
        })?;
        let statement = match statements.as_slice() {
            [statement] => statement,
            [] => return Err(Rejection::new(RejectionKind::Empty, "Query cannot be empty.")),
            _ => {
                return Err(Rejection::new(
                    RejectionKind::MultipleStatements,
                    format!("Multiple statements are not allowed. {}", READ_ONLY_GUIDANCE),
                ))
            },
        };

        check_read_only(statement).map_err(|violation| {
            Rejection::new(
                RejectionKind::ProhibitedOperation,
                format!(
                    "Query contains prohibited operations ({}). {}",
                    violation, READ_ONLY_GUIDANCE
                ),
            )
        })?;

        Ok(sql.to_string())
    }
}

fn is_significant(token: &Token) -> bool {
    !matches!(token, Token::Whitespace(_) | Token::EOF)
}

fn check_leading_keyword(tokens: &[Token]) -> Result<(), Rejection> {
    match tokens.iter().find(|t| is_significant(t)) {
        Some(Token::Word(word))
            if word.quote_style.is_none()
                && matches!(word.keyword, Keyword::SELECT | Keyword::WITH) =>
        {
            Ok(())
        },
        Some(_) => Err(Rejection::new(RejectionKind::NotSelect, READ_ONLY_GUIDANCE)),
        None => Err(Rejection::new(RejectionKind::Empty, "Query cannot be empty.")),
    }
}

/// A terminator may only be followed by whitespace and comments.
fn check_single_statement(tokens: &[Token]) -> Result<(), Rejection> {
    let Some(terminator) = tokens.iter().position(|t| matches!(t, Token::SemiColon)) else {
        return Ok(());
    };

    if tokens[terminator + 1..].iter().any(is_significant) {
        return Err(Rejection::new(
            RejectionKind::MultipleStatements,
            format!("Multiple statements are not allowed. {}", READ_ONLY_GUIDANCE),
        ));
    }

    Ok(())
}

fn check_mutating_keywords(tokens: &[Token]) -> Result<(), Rejection> {
    let found = tokens.iter().find_map(|token| match token {
        Token::Word(word) if word.quote_style.is_none() => {
            word.value.parse::<MutatingKeyword>().ok()
        },
        _ => None,
    });

    match found {
        Some(keyword) => Err(Rejection::new(
            RejectionKind::ProhibitedOperation,
            format!(
                "Query contains prohibited operations ({}). {}",
                keyword, READ_ONLY_GUIDANCE
            ),
        )),
        None => Ok(()),
    }
}
