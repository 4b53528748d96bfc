//! Microsoft Jet (Access) dialect.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::functions::{self, FunctionTemplate};
use super::Dialect;
use crate::error::{Result, RewriteError};
use crate::lexer::{Keyword, Lexer};
use crate::statement::{Parameter, Segment, SqlStatement};

/// Words Jet refuses as bare identifiers.
const RESERVED_WORDS: &[&str] = &[
    "action", "add", "all", "alter", "and", "any", "as", "asc", "between", "by", "column",
    "constraint", "count", "create", "currency", "database", "date", "delete", "desc",
    "distinct", "drop", "exists", "from", "group", "having", "in", "index", "inner", "insert",
    "into", "is", "join", "key", "left", "level", "like", "long", "max", "memo", "min", "name",
    "not", "null", "number", "on", "or", "order", "outer", "password", "percent", "primary",
    "references", "right", "select", "set", "single", "sum", "table", "text", "time", "top",
    "union", "unique", "update", "user", "value", "values", "where", "yesno",
];

/// Optional parts of the Jet dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectFeatures {
    /// Register `concat`, `length`, `substring`, `date`, `sqrt`, `coalesce`
    /// and `nullif`.
    pub extended_functions: bool,
    /// Register `trim`, `ltrim` and `rtrim`.
    pub trim_emulation: bool,
    /// Allow a limit bound to a parameter, inlined as a literal.
    pub variable_limit: bool,
}

impl Default for DialectFeatures {
    fn default() -> Self {
        Self {
            extended_functions: true,
            trim_emulation: true,
            variable_limit: false,
        }
    }
}

/// The row limit of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Limit {
    /// A literal row count.
    Fixed(u64),
    /// A row count bound to a parameter.
    Bound(Parameter),
}

/// The Jet dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct JetDialect {
    features: DialectFeatures,
}

impl JetDialect {
    /// Creates a Jet dialect with the default features.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a Jet dialect with the given features.
    #[must_use]
    pub const fn with_features(features: DialectFeatures) -> Self {
        Self { features }
    }

    /// The enabled features.
    #[must_use]
    pub const fn features(&self) -> DialectFeatures {
        self.features
    }

    /// Looks up how a portable function is spelled in Jet.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<FunctionTemplate> {
        let name = name.to_ascii_lowercase();
        functions::base(&name)
            .or_else(|| {
                self.features
                    .extended_functions
                    .then(|| functions::extended(&name))
                    .flatten()
            })
            .or_else(|| {
                self.features
                    .trim_emulation
                    .then(|| functions::trim(&name))
                    .flatten()
            })
    }

    /// Renders a portable function call. Returns `None` for functions Jet
    /// spells like everyone else.
    ///
    /// # Errors
    ///
    /// Returns an error when the arguments do not fit the Jet template.
    pub fn render_function(&self, name: &str, args: &[&str]) -> Result<Option<String>> {
        self.function(name)
            .map(|template| template.render(name, args))
            .transpose()
    }

    /// Adds a `TOP n` clause to a SELECT.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::UnsupportedClause`] for a nonzero offset or
    /// when `sql` does not start with `SELECT`.
    pub fn limit_string(&self, sql: &str, offset: u64, limit: u64) -> Result<String> {
        check_offset(offset)?;
        let at = top_insert_point(sql)?;
        let out = format!("{} top {limit}{}", &sql[..at], &sql[at..]);
        debug!(sql = %out, "Applied row limit");
        Ok(out)
    }

    /// Adds a `TOP n` clause to a statement. A [`Limit::Bound`] is inlined
    /// as an integer literal and dropped from the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::UnsupportedClause`] for a nonzero offset, a
    /// statement that is not a SELECT, or a bound limit the dialect cannot
    /// inline.
    pub fn apply_limit(
        &self,
        statement: &SqlStatement,
        offset: u64,
        limit: &Limit,
    ) -> Result<SqlStatement> {
        let rows = match limit {
            Limit::Fixed(rows) => *rows,
            Limit::Bound(parameter) => {
                if !self.supports_variable_limit() {
                    return Err(RewriteError::UnsupportedClause(String::from(
                        "Jet does not support a parameterized limit",
                    )));
                }
                let invalid = || {
                    RewriteError::UnsupportedClause(format!(
                        "limit must be a non-negative integer, got {}",
                        parameter.value.to_sql_inline()
                    ))
                };
                let rows = parameter.value.as_int().ok_or_else(invalid)?;
                u64::try_from(rows).map_err(|_| invalid())?
            }
        };

        let mut segments = statement.segments().iter();
        let Some(Segment::Text(head)) = segments.next() else {
            return Err(not_a_select());
        };
        let head = self.limit_string(head, offset, rows)?;

        let mut builder = SqlStatement::builder().text(&head);
        for segment in segments {
            builder = match segment {
                Segment::Text(text) => builder.text(text),
                Segment::Parameter(p) => builder.parameter(p.clone()),
            };
        }
        Ok(builder.build())
    }
}

fn check_offset(offset: u64) -> Result<()> {
    if offset > 0 {
        return Err(RewriteError::UnsupportedClause(String::from(
            "Jet does not support an offset",
        )));
    }
    Ok(())
}

fn not_a_select() -> RewriteError {
    RewriteError::UnsupportedClause(String::from(
        "The query should start with 'SELECT' or 'SELECT DISTINCT'",
    ))
}

/// Byte offset just after `SELECT` or `SELECT DISTINCT`.
fn top_insert_point(sql: &str) -> Result<usize> {
    let mut lexer = Lexer::new(sql);
    let select = lexer.next_token();
    if !select.is_keyword(Keyword::Select) {
        return Err(not_a_select());
    }
    let next = lexer.next_token();
    if next.is_keyword(Keyword::Distinct) {
        Ok(next.span.end)
    } else {
        Ok(select.span.end)
    }
}

impl Dialect for JetDialect {
    fn name(&self) -> &'static str {
        "jet"
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('[', ']')
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value { "-1" } else { "0" }
    }

    fn supports_limit_offset(&self) -> bool {
        false
    }

    fn supports_variable_limit(&self) -> bool {
        self.features.variable_limit
    }

    fn is_reserved_word(&self, word: &str) -> bool {
        let word = word.to_ascii_lowercase();
        RESERVED_WORDS.contains(&word.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jet_dialect_basics() {
        let dialect = JetDialect::new();
        assert_eq!(dialect.name(), "jet");
        assert_eq!(dialect.quote_identifier("Order Details"), "[Order Details]");
        assert_eq!(dialect.quote_if_reserved("Action"), "[Action]");
        assert_eq!(dialect.quote_if_reserved("customer"), "customer");
        assert_eq!(dialect.boolean_literal(true), "-1");
        assert_eq!(dialect.boolean_literal(false), "0");
        assert!(!dialect.supports_limit_offset());
    }

    #[test]
    fn test_limit_string() {
        let dialect = JetDialect::new();
        assert_eq!(
            dialect.limit_string("select a from T", 0, 10).unwrap(),
            "select top 10 a from T"
        );
        assert_eq!(
            dialect.limit_string("SELECT DISTINCT a from T", 0, 5).unwrap(),
            "SELECT DISTINCT top 5 a from T"
        );
    }

    #[test]
    fn test_limit_offset_is_unsupported() {
        let err = JetDialect::new()
            .limit_string("select a from T", 20, 10)
            .unwrap_err();
        assert_eq!(
            err,
            RewriteError::UnsupportedClause(String::from("Jet does not support an offset"))
        );
    }

    #[test]
    fn test_limit_requires_select() {
        assert!(matches!(
            JetDialect::new().limit_string("update T set a = 1", 0, 1),
            Err(RewriteError::UnsupportedClause(_))
        ));
    }

    #[test]
    fn test_apply_limit_keeps_parameters() {
        let stmt = SqlStatement::parse("select a from T where b = ?", [3]).unwrap();
        let limited = JetDialect::new()
            .apply_limit(&stmt, 0, &Limit::Fixed(2))
            .unwrap();
        assert_eq!(limited.to_sql(), "select top 2 a from T where b = ?");
        assert_eq!(limited.parameter_count(), 1);
    }

    #[test]
    fn test_bound_limit_needs_feature() {
        let stmt = SqlStatement::parse("select a from T", Vec::<i64>::new()).unwrap();
        let bound = Limit::Bound(Parameter::new(7));
        assert!(JetDialect::new().apply_limit(&stmt, 0, &bound).is_err());

        let dialect = JetDialect::with_features(DialectFeatures {
            variable_limit: true,
            ..DialectFeatures::default()
        });
        assert_eq!(
            dialect.apply_limit(&stmt, 0, &bound).unwrap().to_sql(),
            "select top 7 a from T"
        );
        assert!(dialect
            .apply_limit(&stmt, 0, &Limit::Bound(Parameter::new("x")))
            .is_err());
    }

    #[test]
    fn test_function_registry_follows_features() {
        let full = JetDialect::new();
        assert_eq!(
            full.render_function("CONCAT", &["a", "b"]).unwrap().as_deref(),
            Some("(a + b)")
        );
        assert_eq!(
            full.render_function("nullif", &["a", "0"]).unwrap().as_deref(),
            Some("IIf(a = 0, Null, a)")
        );
        assert_eq!(full.render_function("abs", &["a"]).unwrap(), None);

        let base = JetDialect::with_features(DialectFeatures {
            extended_functions: false,
            trim_emulation: false,
            variable_limit: false,
        });
        assert_eq!(base.render_function("concat", &["a", "b"]).unwrap(), None);
        assert_eq!(base.render_function("trim", &["a"]).unwrap(), None);
        assert_eq!(
            base.render_function("mod", &["a", "2"]).unwrap().as_deref(),
            Some("(a Mod 2)")
        );
    }

    #[test]
    fn test_features_deserialize_with_defaults() {
        let features: DialectFeatures = serde_json::from_str(r#"{"variable_limit": true}"#).unwrap();
        assert!(features.variable_limit);
        assert!(features.extended_functions);
    }
}
