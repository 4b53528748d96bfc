//! Span-based edits applied to statement text in one pass.

use crate::error::{Result, RewriteError};
use crate::lexer::Span;

#[derive(Debug)]
struct Edit {
    span: Span,
    text: String,
    seq: usize,
}

/// A batch of non-overlapping edits against one source text.
///
/// Insertions at the same offset are applied in the order they were added,
/// and before any replacement starting at that offset.
#[derive(Debug, Default)]
pub(crate) struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(Span::new(at, at), text);
    }

    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        let seq = self.edits.len();
        self.edits.push(Edit {
            span,
            text: text.into(),
            seq,
        });
    }

    pub fn apply(mut self, src: &str) -> Result<String> {
        if self.is_empty() {
            return Ok(String::from(src));
        }
        self.edits
            .sort_by_key(|e| (e.span.start, !e.span.is_empty(), e.seq));

        let mut out = String::with_capacity(src.len() + 32);
        let mut cursor = 0;
        for edit in self.edits {
            if edit.span.start < cursor {
                return Err(RewriteError::syntax(
                    "Overlapping rewrites of the same text",
                    edit.span,
                ));
            }
            out.push_str(&src[cursor..edit.span.start]);
            out.push_str(&edit.text);
            cursor = edit.span.end;
        }
        out.push_str(&src[cursor..]);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertions_keep_order() {
        let mut edits = EditSet::new();
        edits.insert(5, "(select * from ");
        edits.insert(5, "((");
        edits.insert(6, ")");
        assert_eq!(edits.apply("from A join").unwrap(), "from (select * from ((A) join");
    }

    #[test]
    fn test_replace_and_insert_at_same_offset() {
        let mut edits = EditSet::new();
        edits.replace(Span::new(0, 5), "ucase");
        edits.insert(0, "x ");
        assert_eq!(edits.apply("upper(a)").unwrap(), "x ucase(a)");
    }

    #[test]
    fn test_overlap_is_rejected() {
        let mut edits = EditSet::new();
        edits.replace(Span::new(0, 4), "a");
        edits.replace(Span::new(2, 6), "b");
        assert!(edits.apply("0123456789").is_err());
    }

    #[test]
    fn test_empty_set_is_identity() {
        let edits = EditSet::new();
        assert!(edits.is_empty());
        assert_eq!(edits.apply("select 1").unwrap(), "select 1");
    }
}
