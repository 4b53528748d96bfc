//! Scalar function renames: `upper`/`lower`, `CAST`, `EXTRACT` and `LOCATE`.

use tracing::warn;

use crate::error::{Result, RewriteError};
use crate::lexer::{Keyword, Span, TokenKind};
use crate::rewrite::edit::EditSet;
use crate::rewrite::tokens::TokenizedSql;

pub(super) fn upper_lower(sql: &str) -> Result<String> {
    let tokens = TokenizedSql::new(sql)?;
    let mut edits = EditSet::new();

    for i in 0..tokens.eof() {
        let jet_name = if tokens.call_at(i, "upper").is_some() {
            "ucase"
        } else if tokens.call_at(i, "lower").is_some() {
            "lcase"
        } else {
            continue;
        };
        let name = tokens.text(i);
        if name.chars().all(|c| c.is_ascii_uppercase()) {
            edits.replace(tokens.span(i), jet_name.to_ascii_uppercase());
        } else {
            edits.replace(tokens.span(i), jet_name);
        }
    }

    edits.apply(sql)
}

/// Jet conversion function for an SQL type name.
fn conversion_function(type_name: &str) -> Option<&'static str> {
    let function = match type_name {
        "tinyint" | "byte" => "CByte",
        "smallint" => "CInt",
        "int" | "integer" | "long" | "bigint" | "counter" => "CLng",
        "real" | "single" => "CSng",
        "float" | "double" | "double precision" | "decimal" | "numeric" => "CDbl",
        "money" | "currency" => "CCur",
        "char" | "varchar" | "nchar" | "nvarchar" | "text" | "string" | "memo" => "CStr",
        "date" | "time" | "datetime" | "timestamp" => "CDate",
        "bit" | "bool" | "boolean" | "yesno" => "CBool",
        _ => return None,
    };
    Some(function)
}

pub(super) fn cast(sql: &str) -> Result<String> {
    let tokens = TokenizedSql::new(sql)?;
    let mut edits = EditSet::new();

    for i in 0..tokens.eof() {
        if !tokens.is_keyword(i, Keyword::Cast) {
            continue;
        }
        let Some((open, close)) = tokens.call_at(i, "cast") else {
            continue;
        };
        let inner = tokens.depth(open) + 1;
        let Some(as_index) = (open + 1..close)
            .rev()
            .find(|&j| tokens.depth(j) == inner && tokens.is_keyword(j, Keyword::As))
        else {
            continue;
        };
        if as_index == open + 1 {
            continue;
        }

        // Length and precision arguments stop the type name.
        let type_name = (as_index + 1..close)
            .take_while(|&j| matches!(tokens.token(j).kind, TokenKind::Identifier(_)))
            .map(|j| tokens.text(j).to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        let Some(function) = conversion_function(&type_name) else {
            warn!(
                target_type = %tokens.range_text(&(as_index + 1..close)),
                "CAST target type has no Jet conversion function, left untouched"
            );
            continue;
        };

        edits.replace(tokens.span(i).to(tokens.span(open)), format!("{function}("));
        let type_start = tokens.span(as_index - 1).end;
        edits.replace(Span::new(type_start, tokens.span(close).start), "");
    }

    edits.apply(sql)
}

/// Jet `DatePart` interval for an `EXTRACT` field.
fn date_part_interval(part: &str) -> Option<&'static str> {
    let interval = match part.to_ascii_lowercase().as_str() {
        "year" => "yyyy",
        "quarter" => "q",
        "month" => "m",
        "dayofyear" => "y",
        "day" => "d",
        "weekday" | "dow" => "w",
        "week" => "ww",
        "hour" => "h",
        "minute" => "n",
        "second" => "s",
        _ => return None,
    };
    Some(interval)
}

pub(super) fn extract(sql: &str) -> Result<String> {
    let tokens = TokenizedSql::new(sql)?;
    let mut edits = EditSet::new();

    for i in 0..tokens.eof() {
        let Some((open, close)) = tokens.call_at(i, "extract") else {
            continue;
        };
        let part = open + 1;
        let from = open + 2;
        if from >= close
            || !tokens.is_keyword(from, Keyword::From)
            || from + 1 == close
            || !matches!(tokens.token(part).kind, TokenKind::Identifier(_))
        {
            return Err(RewriteError::unsupported(
                "EXTRACT",
                format!("expected EXTRACT(field FROM expr), got {}", tokens.range_text(&(i..close + 1))),
            ));
        }
        let field = tokens.text(part);
        let interval = date_part_interval(field).ok_or_else(|| {
            RewriteError::unsupported("EXTRACT", format!("no Jet interval for field '{field}'"))
        })?;

        edits.replace(
            tokens.span(i).to(tokens.span(from)),
            format!("DatePart('{interval}',"),
        );
    }

    edits.apply(sql)
}

pub(super) fn locate(sql: &str) -> Result<String> {
    let mut text = String::from(sql);

    // Rewrite the last call first: it cannot contain another LOCATE, so its
    // arguments can be moved as plain text.
    loop {
        let tokens = TokenizedSql::new(&text)?;
        let Some((name, open, close)) = (0..tokens.eof())
            .rev()
            .find_map(|i| tokens.call_at(i, "locate").map(|(open, close)| (i, open, close)))
        else {
            return Ok(text);
        };

        let args = tokens.split_commas(open + 1..close, tokens.depth(open) + 1);
        if args.iter().any(|arg| arg.is_empty()) || !(2..=3).contains(&args.len()) {
            return Err(RewriteError::unsupported(
                "LOCATE",
                format!("expected 2 or 3 arguments, got {}", tokens.range_text(&(name..close + 1))),
            ));
        }
        let needle = tokens.range_text(&args[0]);
        let haystack = tokens.range_text(&args[1]);
        let replacement = match args.get(2) {
            Some(start) => format!("InStr({}, {haystack}, {needle})", tokens.range_text(start)),
            None => format!("InStr({haystack}, {needle})"),
        };

        let span = tokens.span(name).to(tokens.span(close));
        text.replace_range(span.start..span.end, &replacement);
    }
}
