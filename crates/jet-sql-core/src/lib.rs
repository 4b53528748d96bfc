//! # jet-sql-core
//!
//! Rewrites the SQL an ORM query generator produces into SQL that
//! Microsoft Jet (Access) accepts.
//!
//! Jet rejects several constructs every other engine takes for granted:
//! flat multi-way joins, `upper`/`lower`, `CAST`, `EXTRACT`, `CASE`,
//! `COUNT(DISTINCT ..)`, ORDER BY on select-list aliases. The [`Rewriter`]
//! fixes these at the text level while keeping every bound parameter
//! attached to the same value.
//!
//! ```rust
//! use jet_sql_core::{Rewriter, SqlStatement};
//!
//! let rewriter = Rewriter::default();
//! let statement = SqlStatement::parse("SELECT upper(name) FROM T WHERE id = ?", [42]).unwrap();
//!
//! let (rewritten, parameters) = rewriter.rewrite(&statement).unwrap();
//! assert_eq!(rewritten.to_sql(), "SELECT ucase(name) FROM T WHERE id = ?");
//! assert_eq!(parameters.len(), 1);
//! ```
//!
//! Rewriting is a deterministic function of the statement text. A failure
//! is reported as a [`RewriteError`] and never retried.

pub mod dialect;
pub mod error;
pub mod lexer;
pub mod rewrite;
pub mod statement;

pub use dialect::{Dialect, DialectFeatures, GenericDialect, JetDialect, Limit};
pub use error::{Result, RewriteError};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use rewrite::{FixChain, FixRule, RewriteCache, RewriteOptions, Rewriter};
pub use statement::{Parameter, ParameterStyle, Segment, SqlStatement, SqlValue, ToSqlValue};
