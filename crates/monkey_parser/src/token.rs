use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    Bang,

    EqualEqual,
    BangEqual,
    LessThan,
    GreaterThan,

    // Delimiters
    Comma,
    Semicolon,
    Colon,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    // Identifiers & Literals
    Identifier(String),
    Integer(i64),
    String(String),

    // Keywords
    True,
    False,
    Fn,
    Let,
    If,
    Else,
    Return,

    // Special
    Eof,
}

impl Token {
    /// Get the Token for the given keyword, if valid.
    pub fn lookup_keyword(s: &str) -> Option<Token> {
        use Token::*;

        match s {
            "true" => Some(True),
            "false" => Some(False),
            "fn" => Some(Fn),
            "let" => Some(Let),
            "if" => Some(If),
            "else" => Some(Else),
            "return" => Some(Return),
            _ => None,
        }
    }

    /// Name of the token's kind, ignoring any value it carries.
    ///
    /// Operators and delimiters are named by their symbol, everything else by an upper-case tag.
    /// # Examples
    /// ```rust
    /// use monkey_parser::token::Token;
    ///
    /// assert_eq!(Token::Identifier("x".to_string()).kind(), "IDENT");
    /// assert_eq!(Token::RightParen.kind(), ")");
    /// ```
    pub fn kind(&self) -> &'static str {
        use Token::*;

        match self {
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Equal => "=",
            Bang => "!",

            EqualEqual => "==",
            BangEqual => "!=",
            LessThan => "<",
            GreaterThan => ">",

            Comma => ",",
            Semicolon => ";",
            Colon => ":",

            LeftParen => "(",
            RightParen => ")",
            LeftBrace => "{",
            RightBrace => "}",
            LeftBracket => "[",
            RightBracket => "]",

            Identifier(_) => "IDENT",
            Integer(_) => "INT",
            String(_) => "STRING",

            True => "TRUE",
            False => "FALSE",
            Fn => "FUNCTION",
            Let => "LET",
            If => "IF",
            Else => "ELSE",
            Return => "RETURN",

            Eof => "EOF",
        }
    }

    /// Whether both tokens are of the same kind (values are not compared).
    pub fn same_kind(&self, other: &Token) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for Token {
    /// The literal text of the token
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Identifier(name) => write!(f, "{}", name),
            Integer(value) => write!(f, "{}", value),
            String(value) => write!(f, "{}", value),

            True => write!(f, "true"),
            False => write!(f, "false"),
            Fn => write!(f, "fn"),
            Let => write!(f, "let"),
            If => write!(f, "if"),
            Else => write!(f, "else"),
            Return => write!(f, "return"),

            // The sentinel has no literal text
            Eof => Ok(()),

            symbol => write!(f, "{}", symbol.kind()),
        }
    }
}
