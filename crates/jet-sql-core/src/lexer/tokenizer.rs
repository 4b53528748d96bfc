//! SQL tokenizer.

use super::{Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes SQL input.
///
/// Every token keeps the byte span it was read from, so callers can edit the
/// original text in place instead of re-rendering it.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skips whitespace and comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            if self.peek() == Some('-') && self.peek_next() == Some('-') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    fn error(&self, message: &str) -> Token {
        self.make_token(TokenKind::Error(String::from(message)))
    }

    fn eat_word(&mut self) {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        self.eat_word();
        let text = &self.input[self.start..self.pos];
        Keyword::lookup(text).map_or_else(
            || self.make_token(TokenKind::Identifier(String::from(text))),
            |keyword| self.make_token(TokenKind::Keyword(keyword)),
        )
    }

    /// Scans a quoted identifier: `"name"`, `` `name` `` or `[name]`.
    fn scan_quoted_identifier(&mut self, close: char) -> Token {
        self.advance(); // opening quote
        let mut name = String::new();

        loop {
            match self.advance() {
                Some(c) if c == close => {
                    // `]]` and `""` escape the closing character
                    if self.peek() == Some(close) {
                        self.advance();
                        name.push(close);
                    } else {
                        break;
                    }
                }
                Some(c) => name.push(c),
                None => return self.error("Unterminated quoted identifier"),
            }
        }

        self.make_token(TokenKind::Identifier(name))
    }

    /// Scans a number (integer or float).
    fn scan_number(&mut self) -> Token {
        let mut is_float = false;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E')
            && self
                .peek_next()
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            is_float = true;
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[self.start..self.pos];
        if is_float {
            match text.parse::<f64>() {
                Ok(f) => self.make_token(TokenKind::Float(f)),
                Err(e) => self.make_token(TokenKind::Error(format!("Invalid float: {e}"))),
            }
        } else {
            // Jet accepts integers wider than i64; the span keeps the digits.
            match text.parse::<i64>() {
                Ok(i) => self.make_token(TokenKind::Integer(i)),
                Err(_) => match text.parse::<f64>() {
                    Ok(f) => self.make_token(TokenKind::Float(f)),
                    Err(e) => self.make_token(TokenKind::Error(format!("Invalid integer: {e}"))),
                },
            }
        }
    }

    /// Scans a single-quoted string literal.
    fn scan_string(&mut self) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.advance() {
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        self.advance();
                        value.push('\'');
                    } else {
                        break;
                    }
                }
                Some(c) => value.push(c),
                None => return self.error("Unterminated string literal"),
            }
        }

        self.make_token(TokenKind::String(value))
    }

    /// Scans a Jet date literal such as `#2009-01-31#`.
    fn scan_date(&mut self) -> Token {
        self.advance(); // opening #
        let content_start = self.pos;
        while self.peek().is_some_and(|c| c != '#') {
            self.advance();
        }
        if self.peek().is_none() {
            return self.error("Unterminated date literal");
        }
        let content = String::from(&self.input[content_start..self.pos]);
        self.advance(); // closing #
        self.make_token(TokenKind::Date(content))
    }

    /// Scans a named parameter marker such as `@p0`, or a system variable
    /// such as `@@identity`, which is an identifier.
    fn scan_named_parameter(&mut self) -> Token {
        self.advance(); // @
        if self.peek() == Some('@') {
            self.advance();
            let name_start = self.pos;
            self.eat_word();
            if self.pos == name_start {
                return self.error("Expected variable name after '@@'");
            }
            let name = &self.input[self.start..self.pos];
            return self.make_token(TokenKind::Identifier(String::from(name)));
        }
        let name_start = self.pos;
        self.eat_word();
        if self.pos == name_start {
            return self.error("Expected parameter name after '@'");
        }
        let name = &self.input[name_start..self.pos];
        self.make_token(TokenKind::NamedParameter(String::from(name)))
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start = self.pos;

        let Some(c) = self.peek() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            '\'' => return self.scan_string(),
            '"' => return self.scan_quoted_identifier('"'),
            '`' => return self.scan_quoted_identifier('`'),
            '[' => return self.scan_quoted_identifier(']'),
            '#' => return self.scan_date(),
            '@' => return self.scan_named_parameter(),
            c if c.is_ascii_digit() => return self.scan_number(),
            c if c.is_alphabetic() || c == '_' => return self.scan_identifier(),
            _ => {}
        }

        self.advance();
        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            '.' => self.make_token(TokenKind::Dot),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Star),
            '/' => self.make_token(TokenKind::Slash),
            '%' => self.make_token(TokenKind::Percent),
            '&' => self.make_token(TokenKind::Ampersand),
            '\\' => self.make_token(TokenKind::Backslash),
            '^' => self.make_token(TokenKind::Caret),
            '?' => self.make_token(TokenKind::Placeholder),
            '=' => self.make_token(TokenKind::Eq),
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                }
                Some('>') => {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                }
                _ => self.make_token(TokenKind::Lt),
            },
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::GtEq)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }
            '!' if self.peek() == Some('=') => {
                self.advance();
                self.make_token(TokenKind::NotEq)
            }
            '!' => self.make_token(TokenKind::Bang),
            '|' if self.peek() == Some('|') => {
                self.advance();
                self.make_token(TokenKind::Concat)
            }
            other => self.make_token(TokenKind::Other(other)),
        }
    }

    /// Tokenizes the entire input. The last token is always `Eof`.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
