//! Statement assembler: drives a statement through the whole pipeline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cache::{CachedRewrite, RewriteCache};
use super::edit::EditSet;
use super::fixes::{FixChain, FixRule};
use super::joins;
use super::params::ParameterTracker;
use super::tokens::TokenizedSql;
use crate::error::Result;
use crate::lexer::Keyword;
use crate::statement::{Parameter, SqlStatement};

/// Rewriter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteOptions {
    /// Enabled fix rules. They always run in their fixed order.
    pub fixes: Vec<FixRule>,
    /// Stop caching new statement shapes after this many.
    pub cache_max_entries: Option<usize>,
    /// Marker some query generators place after nested FROM clauses. It is
    /// removed from the text before rewriting.
    pub end_join_marker: Option<String>,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            fixes: FixRule::ALL.to_vec(),
            cache_max_entries: None,
            end_join_marker: None,
        }
    }
}

/// Rewrites ORM-generated SQL into SQL Jet accepts.
///
/// Cloning is cheap and clones share the cache.
///
/// # Example
///
/// ```
/// use jet_sql_core::rewrite::Rewriter;
/// use jet_sql_core::SqlStatement;
///
/// let rewriter = Rewriter::default();
/// let statement = SqlStatement::parse(
///     "SELECT upper(name) FROM A JOIN B ON A.id=B.id JOIN C ON B.id=C.id WHERE A.id = ?",
///     [7],
/// )
/// .unwrap();
/// let (rewritten, parameters) = rewriter.rewrite(&statement).unwrap();
/// assert_eq!(
///     rewritten.to_sql(),
///     "SELECT ucase(name) FROM (A JOIN B ON A.id=B.id) JOIN C ON B.id=C.id WHERE A.id = ?"
/// );
/// assert_eq!(parameters.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Rewriter {
    chain: FixChain,
    end_join_marker: Option<String>,
    cache: Arc<RewriteCache>,
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new(&RewriteOptions::default())
    }
}

impl Rewriter {
    /// Creates a rewriter with its own cache.
    #[must_use]
    pub fn new(options: &RewriteOptions) -> Self {
        let cache = options
            .cache_max_entries
            .map_or_else(RewriteCache::new, RewriteCache::with_max_entries);
        Self::with_cache(options, Arc::new(cache))
    }

    /// Creates a rewriter sharing an existing cache.
    #[must_use]
    pub fn with_cache(options: &RewriteOptions, cache: Arc<RewriteCache>) -> Self {
        Self {
            chain: FixChain::with_rules(options.fixes.iter().copied()),
            end_join_marker: options
                .end_join_marker
                .clone()
                .filter(|marker| !marker.is_empty()),
            cache,
        }
    }

    /// The fix chain in use.
    #[must_use]
    pub const fn chain(&self) -> &FixChain {
        &self.chain
    }

    /// The shared rewrite cache.
    #[must_use]
    pub const fn cache(&self) -> &Arc<RewriteCache> {
        &self.cache
    }

    /// Rewrites a statement for Jet.
    ///
    /// Returns the rewritten statement and its parameters in output order.
    /// Every parameter of the input appears exactly once in the output,
    /// bound to the same value. Statements that are not SELECTs are returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns a syntax error for malformed joins, an unsupported-construct
    /// error from the fix chain, or an irrecoverable-parameter-loss error if
    /// the parameters cannot be re-attached.
    pub fn rewrite(&self, statement: &SqlStatement) -> Result<(SqlStatement, Vec<Parameter>)> {
        let (tracker, linearized) = ParameterTracker::linearize(statement);

        if let Some(template) = self.cache.lookup(&linearized) {
            let rewritten = template.bind(&tracker)?;
            let parameters = rewritten.parameters().cloned().collect();
            return Ok((rewritten, parameters));
        }

        if !statement.is_select() {
            debug!(sql = %linearized, "Not a SELECT, passing through");
            let parameters = tracker.parameters().to_vec();
            return Ok((statement.clone(), parameters));
        }

        let text = self.rewrite_text(&linearized)?;
        let rewritten = tracker.restore(&text)?;
        tracker.verify(&rewritten)?;

        self.cache
            .store(&linearized, CachedRewrite::from_statement(&rewritten));
        debug!(
            original = %linearized,
            rewritten = %text,
            parameters = tracker.len(),
            "Rewrote statement"
        );

        let parameters = rewritten.parameters().cloned().collect();
        Ok((rewritten, parameters))
    }

    /// Rewrites statement text with its parameter markers already
    /// linearized. Joins are parenthesized in every SELECT scope, unless the
    /// statement is a UNION, then the fix chain runs over the whole text.
    ///
    /// # Errors
    ///
    /// See [`Rewriter::rewrite`].
    pub fn rewrite_text(&self, sql: &str) -> Result<String> {
        let stripped;
        let sql = match &self.end_join_marker {
            Some(marker) if sql.contains(marker.as_str()) => {
                stripped = sql.replace(marker.as_str(), "");
                stripped.as_str()
            }
            _ => sql,
        };

        let tokens = TokenizedSql::new(sql)?;
        let joined = if tokens.contains_keyword(Keyword::Union) {
            debug!(sql = %sql, "UNION statement, skipping join parenthesization");
            String::from(sql)
        } else {
            let mut edits = EditSet::new();
            for scope in tokens.select_scopes() {
                if let Some(from) = &scope.from {
                    joins::parenthesize(&tokens, from, scope.depth, &mut edits)?;
                }
            }
            edits.apply(sql)?
        };

        self.chain.apply(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RewriteError;

    #[test]
    fn test_non_select_passes_through() {
        let rewriter = Rewriter::default();
        let stmt = SqlStatement::parse("update T set a = upper(?)", ["x"]).unwrap();
        let (out, params) = rewriter.rewrite(&stmt).unwrap();
        assert_eq!(out, stmt);
        assert_eq!(params.len(), 1);
        assert!(rewriter.cache().is_empty());
    }

    #[test]
    fn test_union_skips_joins() {
        let rewriter = Rewriter::default();
        let sql = "select a from A join B on A.id = B.id join C on B.id = C.id \
                   union select upper(a) from D";
        assert_eq!(
            rewriter.rewrite_text(sql).unwrap(),
            "select a from A join B on A.id = B.id join C on B.id = C.id \
             union select ucase(a) from D"
        );
    }

    #[test]
    fn test_end_join_marker_is_stripped() {
        let options = RewriteOptions {
            end_join_marker: Some(String::from(" /*endjoin*/")),
            ..RewriteOptions::default()
        };
        let rewriter = Rewriter::new(&options);
        assert_eq!(
            rewriter
                .rewrite_text("select * from A where A.x in (select y from B /*endjoin*/)")
                .unwrap(),
            "select * from A where A.x in (select y from B)"
        );
    }

    #[test]
    fn test_nested_scopes_are_parenthesized() {
        let rewriter = Rewriter::default();
        assert_eq!(
            rewriter
                .rewrite_text(
                    "select * from A where exists (select 1 from B join C on B.id = C.id \
                     join D on C.id = D.id where B.a = A.id)"
                )
                .unwrap(),
            "select * from A where exists (select 1 from (B join C on B.id = C.id) \
             join D on C.id = D.id where B.a = A.id)"
        );
    }

    #[test]
    fn test_failed_rewrite_is_not_cached() {
        let rewriter = Rewriter::default();
        let stmt = SqlStatement::parse("select * from A join", Vec::<i64>::new()).unwrap();
        assert!(matches!(
            rewriter.rewrite(&stmt),
            Err(RewriteError::Syntax { .. })
        ));
        assert!(rewriter.cache().is_empty());
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: RewriteOptions =
            serde_json::from_str(r#"{"fixes": ["upper_lower"], "cache_max_entries": 10}"#).unwrap();
        assert_eq!(options.fixes, vec![FixRule::UpperLower]);
        assert_eq!(options.cache_max_entries, Some(10));
        assert_eq!(options.end_join_marker, None);

        let rewriter = Rewriter::new(&options);
        assert_eq!(rewriter.chain().rules(), &[FixRule::UpperLower]);
        assert_eq!(rewriter.cache().max_entries(), Some(10));
    }
}
