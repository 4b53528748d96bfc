//! Rewrite cache.
//!
//! Keys are the linearized statement text, so statements that differ only in
//! their bound values share an entry. Values are templates: the rewritten
//! text with parameter slots identified by ordinal, re-bound on every hit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{error, trace};

use super::params::ParameterTracker;
use crate::error::{Result, RewriteError};
use crate::statement::{Segment, SqlStatement};

/// One piece of a cached rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Literal SQL text.
    Text(String),
    /// Slot for the parameter with this ordinal.
    Parameter(usize),
}

/// A rewritten statement with its parameter values stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedRewrite {
    parts: Vec<TemplatePart>,
}

impl CachedRewrite {
    /// Builds a template from a rewritten statement whose parameters all
    /// carry ordinals.
    #[must_use]
    pub fn from_statement(statement: &SqlStatement) -> Self {
        let parts = statement
            .segments()
            .iter()
            .enumerate()
            .map(|(index, segment)| match segment {
                Segment::Text(text) => TemplatePart::Text(text.clone()),
                Segment::Parameter(p) => TemplatePart::Parameter(p.position.unwrap_or(index)),
            })
            .collect();
        Self { parts }
    }

    /// The template pieces in order.
    #[must_use]
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// Rebinds the template to the parameters of the statement being
    /// rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::IrrecoverableParameterLoss`] if the template
    /// refers to an ordinal the tracker does not hold, or its slot count
    /// differs from the tracked parameter count.
    pub fn bind(&self, tracker: &ParameterTracker) -> Result<SqlStatement> {
        let slots = self
            .parts
            .iter()
            .filter(|part| matches!(part, TemplatePart::Parameter(_)))
            .count();
        let loss = || {
            let err = RewriteError::IrrecoverableParameterLoss {
                expected: tracker.len(),
                found: slots,
            };
            error!(template = %self.text(), error = %err, "Cached rewrite lost parameters");
            err
        };
        if slots != tracker.len() {
            return Err(loss());
        }

        let mut builder = SqlStatement::builder();
        for part in &self.parts {
            match part {
                TemplatePart::Text(text) => builder.push_text(text),
                TemplatePart::Parameter(ordinal) => {
                    let parameter = tracker.get(*ordinal).ok_or_else(loss)?;
                    builder.push_parameter(parameter.clone());
                }
            }
        }
        Ok(builder.build())
    }

    /// The rewritten text with `?` markers.
    #[must_use]
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                TemplatePart::Text(text) => text.as_str(),
                TemplatePart::Parameter(_) => "?",
            })
            .collect()
    }
}

/// Thread-safe map from linearized statement text to rewrite template.
///
/// There is no eviction; with `max_entries` set, new shapes stop being
/// stored once the cache is full.
#[derive(Debug, Default)]
pub struct RewriteCache {
    entries: Mutex<HashMap<String, Arc<CachedRewrite>>>,
    max_entries: Option<usize>,
}

impl RewriteCache {
    /// Creates an unbounded cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache that stops storing after `max_entries` shapes.
    #[must_use]
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Mutex::default(),
            max_entries: Some(max_entries),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<CachedRewrite>>> {
        // Entries are inserted whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Looks up the template for `original`.
    #[must_use]
    pub fn lookup(&self, original: &str) -> Option<Arc<CachedRewrite>> {
        let hit = self.entries().get(original).cloned();
        if hit.is_some() {
            trace!(sql = %original, "Rewrite cache hit");
        } else {
            trace!(sql = %original, "Rewrite cache miss");
        }
        hit
    }

    /// Stores the template for `original`. Returns false when the cache is
    /// full and the entry was not stored.
    pub fn store(&self, original: &str, rewrite: CachedRewrite) -> bool {
        let mut entries = self.entries();
        if let Some(max) = self.max_entries {
            if entries.len() >= max && !entries.contains_key(original) {
                trace!(sql = %original, max_entries = max, "Rewrite cache full, not storing");
                return false;
            }
        }
        entries.insert(String::from(original), Arc::new(rewrite));
        true
    }

    /// Number of cached shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// The configured capacity, if any.
    #[must_use]
    pub const fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }
}
