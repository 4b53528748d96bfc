//! SQL statements as produced by the ORM query generator.
//!
//! A statement is an ordered list of literal text runs and parameter
//! placeholders. Rendering it with `?` for every parameter reproduces the
//! exact text the generator submitted.

mod value;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RewriteError};
use crate::lexer::{Keyword, Lexer, TokenKind};

pub use value::{SqlValue, ToSqlValue};

/// How parameter markers are spelled in rendered SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterStyle {
    /// `?`
    Positional,
    /// `@p<ordinal>`, what the Jet driver expects.
    #[default]
    Named,
}

/// A bound value and its ordinal position.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// The bound value.
    pub value: SqlValue,
    /// Ordinal assigned the first time the statement is linearized.
    pub position: Option<usize>,
}

impl Parameter {
    /// Creates a parameter without an ordinal.
    #[must_use]
    pub fn new(value: impl ToSqlValue) -> Self {
        Self {
            value: value.to_sql_value(),
            position: None,
        }
    }

    /// Creates a parameter with a fixed ordinal.
    #[must_use]
    pub fn at(position: usize, value: impl ToSqlValue) -> Self {
        Self {
            value: value.to_sql_value(),
            position: Some(position),
        }
    }
}

/// One piece of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal SQL text.
    Text(String),
    /// A parameter placeholder.
    Parameter(Parameter),
}

/// An ordered sequence of text runs and parameter placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlStatement {
    segments: Vec<Segment>,
}

impl SqlStatement {
    /// Starts building a statement.
    #[must_use]
    pub fn builder() -> SqlStatementBuilder {
        SqlStatementBuilder::default()
    }

    /// Splits `sql` on its `?` markers and binds `values` to them in order.
    ///
    /// Markers inside string literals and quoted identifiers are text.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::ParameterMismatch`] if the number of values
    /// differs from the number of markers.
    pub fn parse<I, V>(sql: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        let markers: Vec<_> = Lexer::new(sql)
            .tokenize()
            .into_iter()
            .filter(|t| t.kind == TokenKind::Placeholder)
            .map(|t| t.span)
            .collect();
        let values: Vec<SqlValue> = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        if markers.len() != values.len() {
            return Err(RewriteError::ParameterMismatch {
                markers: markers.len(),
                values: values.len(),
            });
        }

        let mut builder = Self::builder();
        let mut last = 0;
        for (span, value) in markers.into_iter().zip(values) {
            builder = builder.text(&sql[last..span.start]).parameter(Parameter {
                value,
                position: None,
            });
            last = span.end;
        }
        Ok(builder.text(&sql[last..]).build())
    }

    /// Returns the segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the parameters in order of appearance.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Parameter(p) => Some(p),
            Segment::Text(_) => None,
        })
    }

    pub(crate) fn parameters_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.segments.iter_mut().filter_map(|s| match s {
            Segment::Parameter(p) => Some(p),
            Segment::Text(_) => None,
        })
    }

    /// Returns the number of parameter placeholders.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameters().count()
    }

    /// Renders the statement with `?` markers.
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.render(ParameterStyle::Positional)
    }

    /// Renders the statement with the given marker style.
    ///
    /// Named markers use the parameter's ordinal, or its index when no
    /// ordinal has been assigned yet.
    #[must_use]
    pub fn render(&self, style: ParameterStyle) -> String {
        let mut out = String::new();
        let mut index = 0;
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Parameter(p) => {
                    match style {
                        ParameterStyle::Positional => out.push('?'),
                        ParameterStyle::Named => {
                            out.push_str(&format!("@p{}", p.position.unwrap_or(index)));
                        }
                    }
                    index += 1;
                }
            }
        }
        out
    }

    /// Returns true if the statement text starts with `SELECT`.
    #[must_use]
    pub fn is_select(&self) -> bool {
        let sql = self.to_sql();
        Lexer::new(&sql).next_token().is_keyword(Keyword::Select)
    }
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Builds a [`SqlStatement`] piece by piece; adjacent text is merged.
#[derive(Debug, Default)]
pub struct SqlStatementBuilder {
    segments: Vec<Segment>,
}

impl SqlStatementBuilder {
    /// Appends literal text.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    /// Appends a parameter placeholder.
    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.push_parameter(parameter);
        self
    }

    /// Appends a placeholder bound to `value`.
    #[must_use]
    pub fn value(self, value: impl ToSqlValue) -> Self {
        self.parameter(Parameter::new(value))
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(String::from(text)));
        }
    }

    pub(crate) fn push_parameter(&mut self, parameter: Parameter) {
        self.segments.push(Segment::Parameter(parameter));
    }

    /// Finishes the statement.
    #[must_use]
    pub fn build(self) -> SqlStatement {
        SqlStatement {
            segments: self.segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_text() {
        let sql = "select * from T where a = ? and b = ?";
        let stmt = SqlStatement::parse(sql, [1, 2]).unwrap();
        assert_eq!(stmt.to_sql(), sql);
        assert_eq!(stmt.parameter_count(), 2);
        assert_eq!(stmt.segments().len(), 4);
    }

    #[test]
    fn test_parse_ignores_markers_in_literals() {
        let sql = "select '?' from T where a = ?";
        let stmt = SqlStatement::parse(sql, ["x"]).unwrap();
        assert_eq!(stmt.parameter_count(), 1);
        assert_eq!(stmt.to_sql(), sql);
    }

    #[test]
    fn test_parse_counts_must_match() {
        let err = SqlStatement::parse("select ? from T", Vec::<i64>::new()).unwrap_err();
        assert_eq!(
            err,
            RewriteError::ParameterMismatch {
                markers: 1,
                values: 0
            }
        );
    }

    #[test]
    fn test_named_rendering_uses_ordinals() {
        let stmt = SqlStatement::builder()
            .text("select * from T where a = ")
            .parameter(Parameter::at(4, 1))
            .text(" and b = ")
            .value(2)
            .build();
        assert_eq!(
            stmt.render(ParameterStyle::Named),
            "select * from T where a = @p4 and b = @p1"
        );
    }

    #[test]
    fn test_builder_merges_text() {
        let stmt = SqlStatement::builder().text("select ").text("1").build();
        assert_eq!(stmt.segments(), &[Segment::Text(String::from("select 1"))]);
    }

    #[test]
    fn test_is_select() {
        assert!(SqlStatement::builder().text("  SELECT 1").build().is_select());
        assert!(!SqlStatement::builder()
            .text("update T set a = 1")
            .build()
            .is_select());
    }
}
