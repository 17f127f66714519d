//! AST read-only guard.
//!
//! Walks a parsed statement with sqlparser's [`Visitor`] and stops at the
//! first construct that could change state:
//!
//! - a root statement that is not a query
//! - any statement nested inside the query (e.g. DML in a CTE)
//! - `SELECT ... INTO`
//! - row-locking clauses (`FOR UPDATE`, `FOR SHARE`)

use sqlparser::ast::{Query, SetExpr, Statement, Visit, Visitor};
use std::ops::ControlFlow;
use thiserror::Error;

/// First write-capable construct found in a statement tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{0} statements are not allowed")]
    NotAQuery(String),

    #[error("Nested {0} statements are not allowed")]
    NestedStatement(String),

    #[error("SELECT ... INTO is not allowed")]
    SelectInto,

    #[error("Row-locking clauses (FOR UPDATE / FOR SHARE) are not allowed")]
    RowLock,
}

#[derive(Debug, Default)]
pub struct ReadOnlyGuard {
    statements_seen: usize,
}

impl Visitor for ReadOnlyGuard {
    type Break = Violation;

    fn pre_visit_statement(&mut self, statement: &Statement) -> ControlFlow<Self::Break> {
        self.statements_seen += 1;

        if self.statements_seen > 1 {
            return ControlFlow::Break(Violation::NestedStatement(statement_label(statement)));
        }

        if !matches!(statement, Statement::Query(_)) {
            return ControlFlow::Break(Violation::NotAQuery(statement_label(statement)));
        }

        ControlFlow::Continue(())
    }

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if !query.locks.is_empty() {
            return ControlFlow::Break(Violation::RowLock);
        }

        if set_expr_has_into(&query.body) {
            return ControlFlow::Break(Violation::SelectInto);
        }

        ControlFlow::Continue(())
    }
}

/// Check a single parsed statement.
pub fn check_read_only(statement: &Statement) -> Result<(), Violation> {
    let mut guard = ReadOnlyGuard::default();
    match statement.visit(&mut guard) {
        ControlFlow::Break(violation) => Err(violation),
        ControlFlow::Continue(()) => Ok(()),
    }
}

// Nested `Query` nodes are visited on their own; only set operations need
// to be unrolled here.
fn set_expr_has_into(body: &SetExpr) -> bool {
    match body {
        SetExpr::Select(select) => select.into.is_some(),
        SetExpr::SetOperation { left, right, .. } => {
            set_expr_has_into(left) || set_expr_has_into(right)
        },
        _ => false,
    }
}

fn statement_label(statement: &Statement) -> String {
    statement
        .to_string()
        .split_whitespace()
        .next()
        .map(|word| word.to_uppercase())
        .unwrap_or_else(|| "Unknown".to_string())
}
