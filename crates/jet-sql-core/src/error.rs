//! Error types for the rewriting pipeline and the Jet dialect.

use crate::lexer::Span;

/// Errors raised while rewriting a statement for Jet.
///
/// Every variant is a deterministic function of the input text: retrying the
/// same statement fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// Malformed or unsupported join syntax, or an unterminated literal.
    #[error("Invalid SQL syntax at {}..{}: {message}", span.start, span.end)]
    Syntax {
        /// What went wrong.
        message: String,
        /// Where in the linearized statement text.
        span: Span,
    },

    /// A rewrite changed the parameter bindings and they could not be
    /// re-attached one-to-one.
    #[error(
        "Rewrite removed SQL parameters and they can not be restored \
         (expected {expected}, found {found})"
    )]
    IrrecoverableParameterLoss {
        /// Parameters attached to the original statement.
        expected: usize,
        /// Parameter markers found in the rewritten text.
        found: usize,
    },

    /// A clause Jet cannot express, rejected at the dialect layer.
    #[error("Unsupported clause: {0}")]
    UnsupportedClause(String),

    /// A fix rule met a construct it cannot translate.
    #[error("Unsupported {construct}: {reason}")]
    UnsupportedConstruct {
        /// The construct, e.g. `EXTRACT`.
        construct: &'static str,
        /// Why it cannot be translated.
        reason: String,
    },

    /// The number of supplied values does not match the `?` markers.
    #[error("Statement has {markers} parameter markers but {values} values were supplied")]
    ParameterMismatch {
        /// Markers found in the SQL text.
        markers: usize,
        /// Values supplied by the caller.
        values: usize,
    },
}

impl RewriteError {
    /// Creates a syntax error at `span`.
    #[must_use]
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
        }
    }

    /// Creates an unsupported-construct error.
    #[must_use]
    pub fn unsupported(construct: &'static str, reason: impl Into<String>) -> Self {
        Self::UnsupportedConstruct {
            construct,
            reason: reason.into(),
        }
    }
}

/// Result type for rewriting operations.
pub type Result<T> = std::result::Result<T, RewriteError>;
