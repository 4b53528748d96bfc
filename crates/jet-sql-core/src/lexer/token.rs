//! Token types for the SQL lexer.

use super::Span;

/// Keywords the rewriter needs to recognize.
///
/// Function names (`upper`, `locate`, ...) are plain identifiers; only the
/// words that shape clause or join structure are keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Query structure
    Select,
    Distinct,
    All,
    Top,
    From,
    Where,
    Group,
    Having,
    Order,
    By,
    Asc,
    Desc,
    Union,

    // Joins
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    On,

    // Expressions
    As,
    Case,
    When,
    Then,
    Else,
    End,
    Cast,
    And,
    Or,
    Not,
    In,
    Is,
    Null,
    Exists,
    Between,
    Like,

    // Aggregates
    Count,
    Sum,
    Avg,
    Min,
    Max,

    // Other statements
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
}

/// Spelling of every keyword, in declaration order.
const SPELLINGS: &[(Keyword, &str)] = &[
    (Keyword::Select, "SELECT"),
    (Keyword::Distinct, "DISTINCT"),
    (Keyword::All, "ALL"),
    (Keyword::Top, "TOP"),
    (Keyword::From, "FROM"),
    (Keyword::Where, "WHERE"),
    (Keyword::Group, "GROUP"),
    (Keyword::Having, "HAVING"),
    (Keyword::Order, "ORDER"),
    (Keyword::By, "BY"),
    (Keyword::Asc, "ASC"),
    (Keyword::Desc, "DESC"),
    (Keyword::Union, "UNION"),
    (Keyword::Join, "JOIN"),
    (Keyword::Inner, "INNER"),
    (Keyword::Left, "LEFT"),
    (Keyword::Right, "RIGHT"),
    (Keyword::Full, "FULL"),
    (Keyword::Outer, "OUTER"),
    (Keyword::Cross, "CROSS"),
    (Keyword::On, "ON"),
    (Keyword::As, "AS"),
    (Keyword::Case, "CASE"),
    (Keyword::When, "WHEN"),
    (Keyword::Then, "THEN"),
    (Keyword::Else, "ELSE"),
    (Keyword::End, "END"),
    (Keyword::Cast, "CAST"),
    (Keyword::And, "AND"),
    (Keyword::Or, "OR"),
    (Keyword::Not, "NOT"),
    (Keyword::In, "IN"),
    (Keyword::Is, "IS"),
    (Keyword::Null, "NULL"),
    (Keyword::Exists, "EXISTS"),
    (Keyword::Between, "BETWEEN"),
    (Keyword::Like, "LIKE"),
    (Keyword::Count, "COUNT"),
    (Keyword::Sum, "SUM"),
    (Keyword::Avg, "AVG"),
    (Keyword::Min, "MIN"),
    (Keyword::Max, "MAX"),
    (Keyword::Insert, "INSERT"),
    (Keyword::Into, "INTO"),
    (Keyword::Values, "VALUES"),
    (Keyword::Update, "UPDATE"),
    (Keyword::Set, "SET"),
    (Keyword::Delete, "DELETE"),
];

impl Keyword {
    /// Looks up a keyword, ignoring ASCII case.
    #[must_use]
    pub fn lookup(word: &str) -> Option<Self> {
        SPELLINGS
            .iter()
            .find(|(_, spelling)| spelling.eq_ignore_ascii_case(word))
            .map(|(keyword, _)| *keyword)
    }

    /// Upper-case spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        SPELLINGS
            .iter()
            .find(|(keyword, _)| *keyword == self)
            .map_or("", |(_, spelling)| *spelling)
    }

    /// Returns true for the aggregate function names.
    #[must_use]
    pub const fn is_aggregate(self) -> bool {
        matches!(
            self,
            Self::Count | Self::Sum | Self::Avg | Self::Min | Self::Max
        )
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal (e.g., 42)
    Integer(i64),
    /// Float literal (e.g., 3.14)
    Float(f64),
    /// String literal with quotes removed and `''` unescaped
    String(String),
    /// Jet date literal with the `#` delimiters removed
    Date(String),

    // Identifiers and keywords
    /// Identifier, bare or quoted with `"`, `` ` `` or `[ ]`
    Identifier(String),
    /// SQL keyword
    Keyword(Keyword),

    // Parameter markers
    /// Positional marker `?`
    Placeholder,
    /// Named marker `@name`, name without the prefix
    NamedParameter(String),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// &
    Ampersand,
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,
    /// `\`, integer division
    Backslash,
    /// `^`, exponent
    Caret,
    /// `!`, Jet member access (`Forms!name`)
    Bang,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,

    // Special
    /// End of input
    Eof,
    /// A character no rule looks at, passed through as is
    Other(char),
    /// Invalid/unknown token
    Error(String),
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Returns true if this token is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.as_keyword() == Some(keyword)
    }

    /// Returns true if this token is an identifier or keyword spelled `word`,
    /// ignoring ASCII case.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        match &self.kind {
            TokenKind::Identifier(name) => name.eq_ignore_ascii_case(word),
            TokenKind::Keyword(kw) => kw.as_str().eq_ignore_ascii_case(word),
            _ => false,
        }
    }

    /// Returns true for `?` and `@name` markers.
    #[must_use]
    pub const fn is_parameter(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Placeholder | TokenKind::NamedParameter(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(Keyword::lookup("JOIN"), Some(Keyword::Join));
        assert_eq!(Keyword::lookup("join"), Some(Keyword::Join));
        assert_eq!(Keyword::lookup("JoIn"), Some(Keyword::Join));
        assert_eq!(Keyword::lookup("upper"), None);
    }

    #[test]
    fn test_keyword_round_trip_names() {
        for kw in [Keyword::Select, Keyword::Outer, Keyword::Case, Keyword::Count] {
            assert_eq!(Keyword::lookup(kw.as_str()), Some(kw));
        }
    }

    #[test]
    fn test_keyword_classes() {
        assert!(Keyword::Max.is_aggregate());
        assert!(!Keyword::Cast.is_aggregate());
    }

    #[test]
    fn test_token_is_word() {
        let ident = Token::new(TokenKind::Identifier(String::from("Upper")), Span::new(0, 5));
        let count = Token::new(TokenKind::Keyword(Keyword::Count), Span::new(0, 5));
        assert!(ident.is_word("upper"));
        assert!(count.is_word("count"));
        assert!(!count.is_word("sum"));
    }

    #[test]
    fn test_token_is_parameter() {
        let q = Token::new(TokenKind::Placeholder, Span::new(0, 1));
        let named = Token::new(TokenKind::NamedParameter(String::from("p0")), Span::new(0, 3));
        let plus = Token::new(TokenKind::Plus, Span::new(0, 1));
        assert!(q.is_parameter());
        assert!(named.is_parameter());
        assert!(!plus.is_parameter());
    }
}
