//! SQL Lexer/Tokenizer
//!
//! A hand-written lexer producing span-carrying tokens. The rewriter locates
//! clauses and function calls on tokens and edits the source text by span.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
