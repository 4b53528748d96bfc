//! Token-level view of a statement: parenthesis depth, comma splitting and
//! SELECT scope boundaries.

use std::ops::Range;

use crate::error::{Result, RewriteError};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// A statement's tokens together with the text they were read from.
#[derive(Debug)]
pub(crate) struct TokenizedSql<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    /// Parenthesis depth enclosing each token; a `(` and its `)` share the
    /// depth of the surrounding expression.
    depth: Vec<usize>,
}

/// The clauses of one `SELECT`, as token ranges. Clause ranges exclude their
/// introducing keywords.
#[derive(Debug, Clone)]
pub(crate) struct SelectScope {
    pub select: usize,
    pub depth: usize,
    pub list: Range<usize>,
    pub from: Option<Range<usize>>,
    pub where_clause: Option<Range<usize>>,
    pub group_by: Option<Range<usize>>,
    pub having: Option<Range<usize>>,
    pub order_by: Option<Range<usize>>,
    /// Index one past the scope's last token.
    pub end: usize,
}

impl<'a> TokenizedSql<'a> {
    /// Tokenizes `src`, rejecting lexer errors and unbalanced parentheses.
    pub fn new(src: &'a str) -> Result<Self> {
        let tokens = Lexer::new(src).tokenize();
        let mut depth = Vec::with_capacity(tokens.len());
        let mut current = 0usize;

        for token in &tokens {
            match &token.kind {
                TokenKind::Error(message) => {
                    return Err(RewriteError::syntax(message.clone(), token.span));
                }
                TokenKind::LeftParen => {
                    depth.push(current);
                    current += 1;
                }
                TokenKind::RightParen => {
                    current = current
                        .checked_sub(1)
                        .ok_or_else(|| RewriteError::syntax("Unbalanced ')'", token.span))?;
                    depth.push(current);
                }
                _ => depth.push(current),
            }
        }

        if current != 0 {
            return Err(RewriteError::syntax(
                "Unclosed '('",
                Span::new(src.len(), src.len()),
            ));
        }

        Ok(Self { src, tokens, depth })
    }

    pub const fn src(&self) -> &'a str {
        self.src
    }

    /// Index of the `Eof` token, which is also the number of real tokens.
    pub fn eof(&self) -> usize {
        self.tokens.len() - 1
    }

    pub fn token(&self, index: usize) -> &Token {
        &self.tokens[index]
    }

    pub fn span(&self, index: usize) -> Span {
        self.tokens[index].span
    }

    pub fn depth(&self, index: usize) -> usize {
        self.depth[index]
    }

    pub fn is_keyword(&self, index: usize, keyword: Keyword) -> bool {
        self.tokens.get(index).is_some_and(|t| t.is_keyword(keyword))
    }

    pub fn is_kind(&self, index: usize, kind: &TokenKind) -> bool {
        self.tokens.get(index).is_some_and(|t| &t.kind == kind)
    }

    pub fn contains_keyword(&self, keyword: Keyword) -> bool {
        self.tokens.iter().any(|t| t.is_keyword(keyword))
    }

    /// Source text of a token.
    pub fn text(&self, index: usize) -> &'a str {
        self.tokens[index].span.text(self.src)
    }

    /// Byte span covering a token range, or `None` for an empty range.
    pub fn range_span(&self, range: &Range<usize>) -> Option<Span> {
        if range.start >= range.end {
            return None;
        }
        Some(self.span(range.start).to(self.span(range.end - 1)))
    }

    /// Source text covering a token range, from the first token's start to
    /// the last token's end.
    pub fn range_text(&self, range: &Range<usize>) -> &'a str {
        self.range_span(range).map_or("", |span| span.text(self.src))
    }

    /// Returns true if any token in the range is a parameter marker.
    pub fn has_parameter(&self, range: &Range<usize>) -> bool {
        self.tokens[range.clone()].iter().any(Token::is_parameter)
    }

    /// Index of the `)` matching the `(` at `open`.
    pub fn matching_paren(&self, open: usize) -> Option<usize> {
        let depth = self.depth[open];
        (open + 1..self.eof()).find(|&i| {
            self.tokens[i].kind == TokenKind::RightParen && self.depth[i] == depth
        })
    }

    /// Returns the `(`..`)` pair when `index` is a function name followed by
    /// an argument list. Quoted names and qualified names (`x.upper(..)`) do
    /// not count.
    pub fn call_at(&self, index: usize, name: &str) -> Option<(usize, usize)> {
        if !self.tokens[index].is_word(name) || !self.text(index).eq_ignore_ascii_case(name) {
            return None;
        }
        if index > 0 && self.tokens[index - 1].kind == TokenKind::Dot {
            return None;
        }
        if !self.is_kind(index + 1, &TokenKind::LeftParen) {
            return None;
        }
        let close = self.matching_paren(index + 1)?;
        Some((index + 1, close))
    }

    /// Splits `range` on commas at `depth`.
    pub fn split_commas(&self, range: Range<usize>, depth: usize) -> Vec<Range<usize>> {
        let mut parts = Vec::new();
        let mut start = range.start;
        for i in range.clone() {
            if self.tokens[i].kind == TokenKind::Comma && self.depth[i] == depth {
                parts.push(start..i);
                start = i + 1;
            }
        }
        parts.push(start..range.end);
        parts
    }

    /// First index in `range` holding `keyword` at `depth`.
    pub fn find_keyword(
        &self,
        mut range: Range<usize>,
        keyword: Keyword,
        depth: usize,
    ) -> Option<usize> {
        range.find(|&i| self.depth[i] == depth && self.tokens[i].is_keyword(keyword))
    }

    /// Every SELECT scope in the statement, outermost first.
    pub fn select_scopes(&self) -> Vec<SelectScope> {
        (0..self.eof())
            .filter(|&i| self.tokens[i].is_keyword(Keyword::Select))
            .map(|i| self.scope_at(i))
            .collect()
    }

    /// The innermost scope whose select list contains `index`.
    pub fn scope_of_select_item(&self, index: usize) -> Option<SelectScope> {
        self.select_scopes()
            .into_iter()
            .rev()
            .find(|s| s.list.contains(&index))
    }

    fn scope_at(&self, select: usize) -> SelectScope {
        let depth = self.depth[select];
        let mut end = self.eof();
        let mut markers: Vec<(Keyword, usize)> = Vec::new();

        for i in select + 1..self.eof() {
            let token = &self.tokens[i];
            if self.depth[i] < depth
                || (self.depth[i] == depth
                    && (token.is_keyword(Keyword::Union) || token.kind == TokenKind::Semicolon))
            {
                end = i;
                break;
            }
            if self.depth[i] != depth {
                continue;
            }
            if let Some(kw) = token.as_keyword() {
                match kw {
                    Keyword::From | Keyword::Where | Keyword::Having => markers.push((kw, i)),
                    Keyword::Group | Keyword::Order if self.is_keyword(i + 1, Keyword::By) => {
                        markers.push((kw, i));
                    }
                    _ => {}
                }
            }
        }

        let mut list_start = select + 1;
        if self.is_keyword(list_start, Keyword::Distinct) || self.is_keyword(list_start, Keyword::All) {
            list_start += 1;
        }
        if self.is_keyword(list_start, Keyword::Top) {
            list_start += 2;
        }
        let list_end = markers.first().map_or(end, |&(_, i)| i);

        let mut scope = SelectScope {
            select,
            depth,
            list: list_start..list_end.max(list_start),
            from: None,
            where_clause: None,
            group_by: None,
            having: None,
            order_by: None,
            end,
        };

        for (n, &(kw, i)) in markers.iter().enumerate() {
            let clause_end = markers.get(n + 1).map_or(end, |&(_, next)| next);
            let body_start = match kw {
                Keyword::Group | Keyword::Order => i + 2,
                _ => i + 1,
            };
            let body = body_start..clause_end.max(body_start);
            match kw {
                Keyword::From => scope.from = Some(body),
                Keyword::Where => scope.where_clause = Some(body),
                Keyword::Group => scope.group_by = Some(body),
                Keyword::Having => scope.having = Some(body),
                _ => scope.order_by = Some(body),
            }
        }

        scope
    }
}
