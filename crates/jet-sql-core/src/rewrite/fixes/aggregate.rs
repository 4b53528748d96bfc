//! `AGG(DISTINCT x)` emulation.
//!
//! Jet has no DISTINCT inside aggregate calls. `MIN` and `MAX` do not need
//! it; `COUNT`, `SUM` and `AVG` are computed over a `SELECT DISTINCT`
//! derived table when the aggregate is the whole select list.

use std::fmt::Write;

use crate::error::{Result, RewriteError};
use crate::lexer::{Keyword, Span, TokenKind};
use crate::rewrite::tokens::TokenizedSql;

const DISTINCT_COLUMN: &str = "distinct_value";
const DISTINCT_TABLE: &str = "distinct_rows";

/// An aggregate call whose argument list starts with `DISTINCT`.
struct DistinctCall {
    name: usize,
    keyword: Keyword,
    open: usize,
    close: usize,
}

fn find_distinct_call(tokens: &TokenizedSql<'_>) -> Option<DistinctCall> {
    (0..tokens.eof()).find_map(|name| {
        let keyword = tokens.token(name).as_keyword().filter(|keyword| keyword.is_aggregate())?;
        let (open, close) = tokens.call_at(name, keyword.as_str())?;
        tokens
            .is_keyword(open + 1, Keyword::Distinct)
            .then_some(DistinctCall {
                name,
                keyword,
                open,
                close,
            })
    })
}

pub(super) fn aggregate_distinct(sql: &str) -> Result<String> {
    let mut text = String::from(sql);

    // One call per pass; the rewritten text never matches again.
    loop {
        let tokens = TokenizedSql::new(&text)?;
        let Some(call) = find_distinct_call(&tokens) else {
            return Ok(text);
        };

        let (span, replacement) = match call.keyword {
            Keyword::Min | Keyword::Max => {
                let distinct = tokens.span(call.open + 1);
                let next = tokens.span(call.open + 2);
                (Span::new(distinct.start, next.start), String::new())
            }
            _ => derived_table(&tokens, &call)?,
        };
        text.replace_range(span.start..span.end, &replacement);
    }
}

/// Rewrites the SELECT scope holding `call` around a `SELECT DISTINCT`
/// derived table.
fn derived_table(tokens: &TokenizedSql<'_>, call: &DistinctCall) -> Result<(Span, String)> {
    let construct = match call.keyword {
        Keyword::Count => "COUNT(DISTINCT)",
        Keyword::Sum => "SUM(DISTINCT)",
        _ => "AVG(DISTINCT)",
    };
    let unsupported = |reason: &str| RewriteError::unsupported(construct, reason);

    let scope = tokens
        .scope_of_select_item(call.name)
        .ok_or_else(|| unsupported("only supported in a select list"))?;
    let items = tokens.split_commas(scope.list.clone(), scope.depth);
    if items.len() != 1 || items[0].start != call.name {
        return Err(unsupported("must be the only item of the select list"));
    }
    if scope.group_by.is_some() || scope.having.is_some() {
        return Err(unsupported("can not be combined with GROUP BY or HAVING"));
    }
    let from = scope
        .from
        .as_ref()
        .ok_or_else(|| unsupported("requires a FROM clause"))?;

    let item_end = items[0].end;
    let alias_start = call.close + 1;
    let has_alias = match item_end - alias_start {
        0 => false,
        1 => matches!(tokens.token(alias_start).kind, TokenKind::Identifier(_)),
        2 => tokens.is_keyword(alias_start, Keyword::As),
        _ => false,
    };
    if alias_start != item_end && !has_alias {
        return Err(unsupported("the aggregate can only be followed by an alias"));
    }

    let expr = call.open + 2..call.close;
    if expr.is_empty()
        || tokens.is_kind(expr.start, &TokenKind::Star)
        || tokens.split_commas(expr.clone(), tokens.depth(call.open) + 1).len() > 1
    {
        return Err(unsupported("expects exactly one expression"));
    }

    let src = tokens.src();
    let select_span = tokens.span(scope.select);
    let list_start = tokens.span(scope.list.start).start;
    let body_end = scope.order_by.as_ref().map_or(scope.end, |order| order.start - 2);
    let body = from.start..body_end;

    let mut out = String::new();
    out.push_str(&src[select_span.start..list_start]);
    out.push_str(tokens.text(call.name));
    let _ = write!(out, "({DISTINCT_COLUMN})");
    if has_alias {
        out.push(' ');
        out.push_str(tokens.range_text(&(alias_start..item_end)));
    }
    let _ = write!(
        out,
        " FROM (SELECT DISTINCT {} AS {DISTINCT_COLUMN} FROM {}) AS {DISTINCT_TABLE}",
        tokens.range_text(&expr),
        tokens.range_text(&body),
    );
    if let Some(order) = &scope.order_by {
        out.push(' ');
        out.push_str(tokens.range_text(&(order.start - 2..order.end)));
    }

    let end = tokens
        .range_span(&(scope.select..scope.end))
        .map_or(select_span.end, |span| span.end);
    Ok((Span::new(select_span.start, end), out))
}
