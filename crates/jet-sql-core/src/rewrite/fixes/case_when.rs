//! `CASE` to nested `IIf`.

use std::ops::Range;

use crate::error::{Result, RewriteError};
use crate::lexer::Keyword;
use crate::rewrite::tokens::TokenizedSql;

struct Branch {
    when: Range<usize>,
    then: Range<usize>,
}

pub(super) fn case_when(sql: &str) -> Result<String> {
    let mut text = String::from(sql);

    // The last CASE in the text has no CASE inside it, so nesting resolves
    // innermost first.
    loop {
        let tokens = TokenizedSql::new(&text)?;
        let Some(case) = (0..tokens.eof())
            .rev()
            .find(|&i| tokens.is_keyword(i, Keyword::Case))
        else {
            return Ok(text);
        };
        let (end, replacement) = rewrite_case(&tokens, case)?;
        let span = tokens.span(case).to(tokens.span(end));
        text.replace_range(span.start..span.end, &replacement);
    }
}

fn rewrite_case(tokens: &TokenizedSql<'_>, case: usize) -> Result<(usize, String)> {
    let depth = tokens.depth(case);
    let at_depth = |i: usize, keyword: Keyword| tokens.depth(i) == depth && tokens.is_keyword(i, keyword);
    let malformed = |reason: &str| RewriteError::unsupported("CASE", reason);

    let end = (case + 1..tokens.eof())
        .find(|&i| at_depth(i, Keyword::End))
        .ok_or_else(|| malformed("missing END"))?;

    let first_when = (case + 1..end)
        .find(|&i| at_depth(i, Keyword::When))
        .ok_or_else(|| malformed("expected at least one WHEN"))?;
    let operand = case + 1..first_when;

    let else_at = (first_when..end).find(|&i| at_depth(i, Keyword::Else));
    let branches_end = else_at.unwrap_or(end);

    let mut branches = Vec::new();
    let mut i = first_when;
    while i < branches_end {
        let then = (i + 1..branches_end)
            .find(|&j| at_depth(j, Keyword::Then))
            .ok_or_else(|| malformed("WHEN without THEN"))?;
        let next = (then + 1..branches_end)
            .find(|&j| at_depth(j, Keyword::When))
            .unwrap_or(branches_end);
        let branch = Branch {
            when: i + 1..then,
            then: then + 1..next,
        };
        if branch.when.is_empty() || branch.then.is_empty() {
            return Err(malformed("empty WHEN or THEN"));
        }
        branches.push(branch);
        i = next;
    }

    if !operand.is_empty() && branches.len() > 1 && tokens.has_parameter(&operand) {
        return Err(malformed(
            "a parameterized operand would be bound once per WHEN",
        ));
    }

    let mut out = match else_at {
        Some(e) if e + 1 < end => String::from(tokens.range_text(&(e + 1..end))),
        Some(_) => return Err(malformed("empty ELSE")),
        None => String::from("Null"),
    };
    for branch in branches.iter().rev() {
        let condition = if operand.is_empty() {
            String::from(tokens.range_text(&branch.when))
        } else {
            format!(
                "{} = {}",
                comparand(tokens, &operand),
                comparand(tokens, &branch.when)
            )
        };
        out = format!("IIf({condition}, {}, {out})", tokens.range_text(&branch.then));
    }

    Ok((end, out))
}

/// Text of one side of the generated `=`, parenthesized unless it is a
/// single token.
fn comparand(tokens: &TokenizedSql<'_>, range: &Range<usize>) -> String {
    let text = tokens.range_text(range);
    if range.len() == 1 {
        String::from(text)
    } else {
        format!("({text})")
    }
}
