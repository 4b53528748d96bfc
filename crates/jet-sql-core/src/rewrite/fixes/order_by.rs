//! ORDER BY alias substitution. Jet resolves ORDER BY names against the
//! source columns only, so a select-list alias has to be spelled out.

use std::ops::Range;

use crate::error::Result;
use crate::lexer::{Keyword, TokenKind};
use crate::rewrite::edit::EditSet;
use crate::rewrite::tokens::{SelectScope, TokenizedSql};

pub(super) fn order_by_alias(sql: &str) -> Result<String> {
    let tokens = TokenizedSql::new(sql)?;
    let mut edits = EditSet::new();

    for scope in tokens.select_scopes() {
        let Some(order_by) = &scope.order_by else {
            continue;
        };
        for item in tokens.split_commas(order_by.clone(), scope.depth) {
            let Some(name) = bare_identifier(&tokens, &item) else {
                continue;
            };
            let Some(expr) = aliased_expression(&tokens, &scope, name) else {
                continue;
            };
            // Copying a marker would bind its parameter twice.
            if tokens.has_parameter(&expr) {
                continue;
            }
            // A subquery is rewritten on its own; the copy would miss that.
            if expr.clone().any(|i| tokens.is_keyword(i, Keyword::Select)) {
                continue;
            }
            let text = tokens.range_text(&expr);
            if text.eq_ignore_ascii_case(name) {
                continue;
            }
            edits.replace(tokens.span(item.start), text);
        }
    }

    edits.apply(sql)
}

/// The identifier of an ORDER BY item of the form `name [ASC | DESC]`.
fn bare_identifier<'t>(tokens: &'t TokenizedSql<'_>, item: &Range<usize>) -> Option<&'t str> {
    let TokenKind::Identifier(name) = &tokens.token(item.start).kind else {
        return None;
    };
    let direction = item.start + 1;
    let plain = item.len() == 1
        || (item.len() == 2
            && (tokens.is_keyword(direction, Keyword::Asc)
                || tokens.is_keyword(direction, Keyword::Desc)));
    plain.then_some(name.as_str())
}

/// The expression of the select-list item `expr AS alias` whose alias is
/// `name`.
fn aliased_expression(
    tokens: &TokenizedSql<'_>,
    scope: &SelectScope,
    name: &str,
) -> Option<Range<usize>> {
    tokens
        .split_commas(scope.list.clone(), scope.depth)
        .into_iter()
        .find_map(|item| {
            if item.len() < 3 {
                return None;
            }
            let alias = item.end - 1;
            let TokenKind::Identifier(alias_name) = &tokens.token(alias).kind else {
                return None;
            };
            (tokens.is_keyword(alias - 1, Keyword::As) && alias_name.eq_ignore_ascii_case(name))
                .then_some(item.start..alias - 1)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_is_replaced() {
        assert_eq!(
            order_by_alias("select a + b as total, c from T order by total desc, c").unwrap(),
            "select a + b as total, c from T order by a + b desc, c"
        );
    }

    #[test]
    fn test_quoted_alias() {
        assert_eq!(
            order_by_alias("select first & last as [Full Name] from T order by [full name]").unwrap(),
            "select first & last as [Full Name] from T order by first & last"
        );
    }

    #[test]
    fn test_parameterized_alias_is_kept() {
        let sql = "select a + @p0 as x from T order by x";
        assert_eq!(order_by_alias(sql).unwrap(), sql);
    }

    #[test]
    fn test_non_alias_and_expressions_are_kept() {
        let sql = "select a as a, b from T order by a, b, c + 1";
        assert_eq!(order_by_alias(sql).unwrap(), sql);
    }

    #[test]
    fn test_subquery_alias_is_kept() {
        let sql = "select (select max(b) as m from U order by m) as x from T order by x";
        assert_eq!(
            order_by_alias(sql).unwrap(),
            "select (select max(b) as m from U order by max(b)) as x from T order by x"
        );
    }

    #[test]
    fn test_each_scope_uses_its_own_aliases() {
        assert_eq!(
            order_by_alias(
                "select x.n as m from (select name as n from U order by n) x order by m"
            )
            .unwrap(),
            "select x.n as m from (select name as n from U order by name) x order by x.n"
        );
    }
}
