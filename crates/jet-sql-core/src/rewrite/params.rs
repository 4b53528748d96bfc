//! Parameter ordinal tracking across text rewrites.
//!
//! Before rewriting, every `?` is replaced by a named marker `@p<ordinal>`.
//! Named markers are ordinary tokens to every rewrite rule, so they survive
//! being moved around. Afterwards the markers are scanned in text order and
//! the parameters re-attached by ordinal.

use std::collections::{HashMap, HashSet};

use tracing::error;

use crate::error::{Result, RewriteError};
use crate::lexer::{Lexer, Span, TokenKind};
use crate::statement::{Parameter, ParameterStyle, SqlStatement};

/// The parameters of one statement, keyed by ordinal.
#[derive(Debug, Clone)]
pub struct ParameterTracker {
    parameters: Vec<Parameter>,
}

/// A parameter marker found in rewritten text.
enum Marker {
    Named(usize),
    Positional,
}

impl ParameterTracker {
    /// Assigns an ordinal to every parameter that has none and renders the
    /// statement with `@p<ordinal>` markers.
    #[must_use]
    pub fn linearize(statement: &SqlStatement) -> (Self, String) {
        let mut statement = statement.clone();
        for (index, parameter) in statement.parameters_mut().enumerate() {
            parameter.position.get_or_insert(index);
        }
        let text = statement.render(ParameterStyle::Named);
        let parameters = statement.parameters().cloned().collect();
        (Self { parameters }, text)
    }

    /// The tracked parameters in their original order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Number of tracked parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns true when the statement had no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Looks up a parameter by ordinal.
    #[must_use]
    pub fn get(&self, ordinal: usize) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.position == Some(ordinal))
    }

    /// Re-attaches the tracked parameters to rewritten text.
    ///
    /// Named `@p<ordinal>` markers are resolved by ordinal. Text without
    /// named markers falls back to binding `?` markers in order.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::IrrecoverableParameterLoss`] when a marker
    /// names an unknown ordinal, when both marker kinds are present, or when
    /// the marker count differs from the tracked parameter count.
    pub fn restore(&self, text: &str) -> Result<SqlStatement> {
        let markers = scan_markers(text);
        let named = markers.iter().filter(|(_, m)| matches!(m, Marker::Named(_))).count();

        let loss = || {
            let err = RewriteError::IrrecoverableParameterLoss {
                expected: self.parameters.len(),
                found: markers.len(),
            };
            error!(sql = %text, error = %err, "Rewrite lost parameters");
            err
        };

        if markers.len() != self.parameters.len() || (named != 0 && named != markers.len()) {
            return Err(loss());
        }

        let mut seen = HashSet::new();
        let mut builder = SqlStatement::builder();
        let mut last = 0;
        for (index, (span, marker)) in markers.iter().enumerate() {
            let parameter = match marker {
                Marker::Named(ordinal) if seen.insert(*ordinal) => self.get(*ordinal),
                Marker::Named(_) => None,
                Marker::Positional => self.parameters.get(index),
            }
            .ok_or_else(loss)?;
            builder.push_text(&text[last..span.start]);
            builder.push_parameter(parameter.clone());
            last = span.end;
        }
        builder.push_text(&text[last..]);
        Ok(builder.build())
    }

    /// Checks that `statement` binds exactly the tracked ordinals, each
    /// once.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::IrrecoverableParameterLoss`] on any
    /// difference.
    pub fn verify(&self, statement: &SqlStatement) -> Result<()> {
        let mut expected: HashMap<Option<usize>, usize> = HashMap::new();
        for p in &self.parameters {
            *expected.entry(p.position).or_default() += 1;
        }
        let matched = statement.parameters().all(|p| match expected.get_mut(&p.position) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        });
        if matched && statement.parameter_count() == self.parameters.len() {
            Ok(())
        } else {
            Err(self.verify_failure(statement))
        }
    }

    fn verify_failure(&self, statement: &SqlStatement) -> RewriteError {
        let err = RewriteError::IrrecoverableParameterLoss {
            expected: self.parameters.len(),
            found: statement.parameter_count(),
        };
        error!(sql = %statement, error = %err, "Rewritten statement does not bind the original parameters");
        err
    }
}

/// Parameter markers of `text`, with spans, in text order.
fn scan_markers(text: &str) -> Vec<(Span, Marker)> {
    Lexer::new(text)
        .tokenize()
        .into_iter()
        .filter_map(|token| match &token.kind {
            TokenKind::Placeholder => Some((token.span, Marker::Positional)),
            TokenKind::NamedParameter(name) => {
                // Foreign names such as `@x` resolve to no ordinal.
                let ordinal = name
                    .strip_prefix('p')
                    .and_then(|digits| digits.parse().ok())
                    .unwrap_or(usize::MAX);
                Some((token.span, Marker::Named(ordinal)))
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::SqlValue;

    fn statement() -> SqlStatement {
        SqlStatement::parse("select * from T where a = ? and b = ?", ["x", "y"]).unwrap()
    }

    #[test]
    fn test_linearize_assigns_ordinals() {
        let (tracker, text) = ParameterTracker::linearize(&statement());
        assert_eq!(text, "select * from T where a = @p0 and b = @p1");
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.get(1).unwrap().value, SqlValue::Text(String::from("y")));
    }

    #[test]
    fn test_linearize_keeps_existing_ordinals() {
        let stmt = SqlStatement::builder()
            .text("select ")
            .parameter(Parameter::at(7, 1))
            .build();
        let (tracker, text) = ParameterTracker::linearize(&stmt);
        assert_eq!(text, "select @p7");
        assert!(tracker.get(7).is_some());
    }

    #[test]
    fn test_restore_follows_moved_markers() {
        let (tracker, _) = ParameterTracker::linearize(&statement());
        let restored = tracker.restore("select * from T where b = @p1 and a = @p0").unwrap();
        assert_eq!(restored.to_sql(), "select * from T where b = ? and a = ?");
        let values: Vec<_> = restored.parameters().map(|p| p.value.clone()).collect();
        assert_eq!(
            values,
            vec![SqlValue::Text(String::from("y")), SqlValue::Text(String::from("x"))]
        );
        tracker.verify(&restored).unwrap();
    }

    #[test]
    fn test_restore_positional_fallback() {
        let (tracker, _) = ParameterTracker::linearize(&statement());
        let restored = tracker.restore("select * from T where a = ? and b = ?").unwrap();
        assert_eq!(restored.parameters().next().unwrap().position, Some(0));
    }

    #[test]
    fn test_restore_failures() {
        let (tracker, _) = ParameterTracker::linearize(&statement());
        for text in [
            "select * from T where a = @p0",
            "select * from T where a = @p0 and b = @p0 and c = @p1",
            "select * from T where a = @p0 and b = ?",
            "select * from T where a = @p0 and b = @p9",
            "select * from T where a = @p0 and b = @name",
        ] {
            assert!(
                matches!(
                    tracker.restore(text),
                    Err(RewriteError::IrrecoverableParameterLoss { .. })
                ),
                "{text} should fail"
            );
        }
    }

    #[test]
    fn test_verify_detects_duplicates() {
        let (tracker, _) = ParameterTracker::linearize(&statement());
        let duplicated = tracker.restore("select @p0 from T where a = @p0").unwrap_err();
        assert!(matches!(duplicated, RewriteError::IrrecoverableParameterLoss { .. }));

        let twice = SqlStatement::builder()
            .parameter(Parameter::at(0, "x"))
            .parameter(Parameter::at(0, "x"))
            .build();
        assert!(tracker.verify(&twice).is_err());
    }

    #[test]
    fn test_markers_in_literals_are_text() {
        let (tracker, _) = ParameterTracker::linearize(&statement());
        let restored = tracker
            .restore("select '@p5 ?' from T where a = @p0 and b = @p1")
            .unwrap();
        assert_eq!(restored.parameter_count(), 2);
    }
}
