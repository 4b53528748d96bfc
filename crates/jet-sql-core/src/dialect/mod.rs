//! SQL Dialect support.
//!
//! The rewriter only ever targets Jet, but the driver layer talks to the
//! dialect through this trait so that quoting, literals and limits stay in
//! one place.

mod functions;
mod generic;
mod jet;

pub use functions::FunctionTemplate;
pub use generic::GenericDialect;
pub use jet::{DialectFeatures, JetDialect, Limit};

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the opening and closing identifier quote characters.
    fn identifier_quotes(&self) -> (char, char) {
        ('"', '"')
    }

    /// Returns the parameter placeholder style.
    fn parameter_placeholder(&self) -> &'static str {
        "?"
    }

    /// Returns the literal for a boolean value.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    /// Returns whether the dialect supports LIMIT with OFFSET.
    fn supports_limit_offset(&self) -> bool {
        true
    }

    /// Returns whether a limit may come from a bound parameter.
    fn supports_variable_limit(&self) -> bool {
        true
    }

    /// Returns whether `word` must be quoted when used as an identifier.
    fn is_reserved_word(&self, _word: &str) -> bool {
        false
    }

    /// Quotes an identifier.
    fn quote_identifier(&self, name: &str) -> String {
        let (open, close) = self.identifier_quotes();
        format!("{open}{name}{close}")
    }

    /// Quotes an identifier only if it is a reserved word.
    fn quote_if_reserved(&self, name: &str) -> String {
        if self.is_reserved_word(name) {
            self.quote_identifier(name)
        } else {
            String::from(name)
        }
    }
}
