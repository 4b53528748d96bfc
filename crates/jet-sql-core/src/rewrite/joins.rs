//! Join-clause parenthesizer.
//!
//! Jet only accepts binary joins, so a flat chain
//! `A join B on .. join C on ..` has to be nested as
//! `(A join B on ..) join C on ..`. FROM clauses that mix comma-separated
//! tables with joins get each joined block wrapped in an aliased derived
//! table, `(select * from <block>) as alias<index>`.

use std::ops::Range;

use tracing::trace;

use super::edit::EditSet;
use super::tokens::TokenizedSql;
use crate::error::{Result, RewriteError};
use crate::lexer::{Keyword, Span};

/// One top-level join operator inside a block.
#[derive(Debug, Clone, Copy)]
struct JoinOperator {
    /// First token of the operator (`INNER`, `LEFT`, `RIGHT` or `JOIN`).
    prefix: usize,
    /// The `JOIN` token.
    join: usize,
}

/// Parenthesizes a bare FROM clause body (the text after `FROM`).
///
/// # Errors
///
/// Returns [`RewriteError::Syntax`] for malformed or unsupported joins.
///
/// # Example
///
/// ```
/// use jet_sql_core::rewrite::parenthesize_from_clause;
///
/// let from = parenthesize_from_clause("A join B on A.id = B.id join C on B.id = C.id").unwrap();
/// assert_eq!(from, "(A join B on A.id = B.id) join C on B.id = C.id");
/// ```
pub fn parenthesize_from_clause(from: &str) -> Result<String> {
    let sql = TokenizedSql::new(from)?;
    let mut edits = EditSet::new();
    parenthesize(&sql, &(0..sql.eof()), 0, &mut edits)?;
    edits.apply(from)
}

/// Queues the edits that parenthesize the FROM clause `range`, whose
/// top-level tokens sit at `depth`.
pub(crate) fn parenthesize(
    sql: &TokenizedSql<'_>,
    range: &Range<usize>,
    depth: usize,
    edits: &mut EditSet,
) -> Result<()> {
    let blocks = sql.split_commas(range.clone(), depth);
    let wrap = blocks.len() > 1;

    for (index, block) in blocks.iter().enumerate() {
        let Some(block_span) = sql.range_span(block) else {
            let at = sql.span(block.start.min(sql.eof())).start;
            return Err(RewriteError::syntax(
                "Empty table expression in FROM clause",
                Span::new(at, at),
            ));
        };

        let joins = find_joins(sql, block, depth)?;
        if joins.is_empty() {
            continue;
        }
        trace!(block = %block_span.text(sql.src()), joins = joins.len(), "Parenthesizing joins");

        if wrap {
            edits.insert(block_span.start, "(select * from ");
        }
        if joins.len() > 1 {
            edits.insert(block_span.start, "(".repeat(joins.len() - 1));
            for op in &joins[1..] {
                edits.insert(sql.span(op.prefix - 1).end, ")");
            }
        }
        if wrap {
            edits.insert(block_span.end, format!(") as alias{index}"));
        }
    }
    Ok(())
}

/// Finds and validates the top-level join operators of a block.
fn find_joins(
    sql: &TokenizedSql<'_>,
    block: &Range<usize>,
    depth: usize,
) -> Result<Vec<JoinOperator>> {
    let mut joins = Vec::new();

    for i in block.clone() {
        if sql.depth(i) != depth {
            continue;
        }
        if (sql.is_keyword(i, Keyword::Full) || sql.is_keyword(i, Keyword::Cross))
            && joins_follow(sql, i + 1, block.end)
        {
            return Err(RewriteError::syntax(
                format!("{} JOIN is not supported by Jet", sql.text(i).to_ascii_uppercase()),
                sql.span(i),
            ));
        }
        if !sql.is_keyword(i, Keyword::Join) {
            continue;
        }

        let prefix = join_prefix(sql, block.start, i)?;
        if prefix == block.start {
            return Err(RewriteError::syntax(
                "JOIN without a left operand",
                sql.span(i),
            ));
        }
        joins.push(JoinOperator { prefix, join: i });
    }

    for (n, op) in joins.iter().enumerate() {
        let operand_end = joins.get(n + 1).map_or(block.end, |next| next.prefix);
        let table = op.join + 1;
        if table >= operand_end || sql.is_keyword(table, Keyword::On) {
            return Err(RewriteError::syntax(
                "JOIN without a table after it",
                sql.span(op.join),
            ));
        }
        let Some(on) = sql.find_keyword(table..operand_end, Keyword::On, depth) else {
            return Err(RewriteError::syntax(
                "JOIN without an ON condition",
                sql.span(op.join),
            ));
        };
        if on + 1 >= operand_end {
            return Err(RewriteError::syntax("Empty ON condition", sql.span(on)));
        }
    }

    Ok(joins)
}

/// True if `JOIN` follows at `from`, optionally after `OUTER`.
fn joins_follow(sql: &TokenizedSql<'_>, from: usize, end: usize) -> bool {
    let at = if sql.is_keyword(from, Keyword::Outer) { from + 1 } else { from };
    at < end && sql.is_keyword(at, Keyword::Join)
}

/// Index of the first token of the join operator ending at `join`.
fn join_prefix(sql: &TokenizedSql<'_>, start: usize, join: usize) -> Result<usize> {
    if join == start {
        return Ok(join);
    }
    let prev = join - 1;
    if sql.is_keyword(prev, Keyword::Inner)
        || sql.is_keyword(prev, Keyword::Left)
        || sql.is_keyword(prev, Keyword::Right)
    {
        return Ok(prev);
    }
    if sql.is_keyword(prev, Keyword::Outer) {
        if prev > start
            && (sql.is_keyword(prev - 1, Keyword::Left) || sql.is_keyword(prev - 1, Keyword::Right))
        {
            return Ok(prev - 1);
        }
        return Err(RewriteError::syntax(
            "OUTER JOIN must be LEFT or RIGHT",
            sql.span(prev),
        ));
    }
    Ok(join)
}
