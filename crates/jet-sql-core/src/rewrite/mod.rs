//! The Jet rewriting pipeline.
//!
//! [`Rewriter::rewrite`] takes a statement through these steps:
//!
//! 1. parameters are linearized to `@p<ordinal>` markers ([`ParameterTracker`])
//! 2. the [`RewriteCache`] is consulted with the linearized text
//! 3. join chains in every FROM clause are parenthesized
//! 4. the [`FixChain`] rewrites functions and syntax Jet lacks
//! 5. parameters are re-attached by ordinal and verified
//! 6. the result is cached

mod cache;
mod edit;
mod fixes;
mod joins;
mod params;
mod rewriter;
mod tokens;

pub use cache::{CachedRewrite, RewriteCache, TemplatePart};
pub use fixes::{FixChain, FixRule, UnknownFixRule};
pub use joins::parenthesize_from_clause;
pub use params::ParameterTracker;
pub use rewriter::{RewriteOptions, Rewriter};
