#![allow(dead_code)]

use jet_sql_core::{Parameter, RewriteError, Rewriter, SqlStatement, SqlValue, ToSqlValue};

pub fn statement<V: ToSqlValue>(sql: &str, values: Vec<V>) -> SqlStatement {
    SqlStatement::parse(sql, values)
        .unwrap_or_else(|e| panic!("Failed to build statement: {sql}\nError: {e:?}"))
}

pub fn rewrite(sql: &str) -> String {
    rewrite_with(&Rewriter::default(), sql)
}

pub fn rewrite_with(rewriter: &Rewriter, sql: &str) -> String {
    let stmt = statement(sql, Vec::<i64>::new());
    let (out, _) = rewriter
        .rewrite(&stmt)
        .unwrap_or_else(|e| panic!("Failed to rewrite: {sql}\nError: {e:?}"));
    out.to_sql()
}

pub fn rewrite_err(sql: &str) -> RewriteError {
    let stmt = statement(sql, Vec::<i64>::new());
    Rewriter::default()
        .rewrite(&stmt)
        .expect_err(&format!("Expected rewrite error for: {sql}"))
}

/// Ordinal to value pairs, in output order.
pub fn bindings(parameters: &[Parameter]) -> Vec<(usize, SqlValue)> {
    parameters
        .iter()
        .map(|p| (p.position.expect("rewritten parameters carry ordinals"), p.value.clone()))
        .collect()
}
