use std::iter::Peekable;
use std::num::ParseIntError;
use std::str::Chars;

use thiserror::Error;

use crate::span::{BytePos, Span, WithSpan};
use crate::token::Token;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character \"{0}\"")]
    UnexpectedChar(char),
    #[error("expected closing {0} of string literal but reached EOF")]
    StringNotClosed(char),
    #[error("invalid escape sequence \\{0}")]
    InvalidEscape(char),
    #[error("could not parse {literal} as integer: {source}")]
    InvalidInt {
        literal: String,
        source: ParseIntError,
    },
}

pub type LexResult<T> = Result<T, LexError>;

pub struct Lexer<'a> {
    input_iter: Peekable<Chars<'a>>,
    current_position: BytePos,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input_iter: input.chars().peekable(),
            current_position: BytePos::new(0),
        }
    }

    /// Consume the next character from the list.
    fn read_char(&mut self) -> Option<char> {
        let next = self.input_iter.next();
        if let Some(c) = next {
            self.current_position = self.current_position.shift(c);
        }
        next
    }

    /// Get the next character from the list without consuming it.
    fn peek_char(&mut self) -> Option<&char> {
        self.input_iter.peek()
    }

    /// Consume the next character only if it is `expected`.
    fn read_char_if(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(&expected) {
            self.read_char();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek_char() {
            if c.is_whitespace() {
                self.read_char();
            } else {
                break;
            }
        }
    }

    /// Read the characters up to the matching `opening` quote as a string
    fn read_string(&mut self, opening: char) -> LexResult<Token> {
        let mut str = String::new();

        loop {
            match self.read_char() {
                Some(ch) if ch == opening => break,
                Some('\\') => match self.read_char() {
                    Some('\'') => str.push('\''),
                    Some('"') => str.push('"'),
                    Some('\\') => str.push('\\'),
                    Some('n') => str.push('\n'),
                    Some('r') => str.push('\r'),
                    Some('t') => str.push('\t'),
                    Some('0') => str.push('\0'),
                    Some(ch) => {
                        self.skip_string_rest(opening);
                        return Err(LexError::InvalidEscape(ch));
                    }
                    None => return Err(LexError::StringNotClosed(opening)),
                },
                Some(ch) => str.push(ch),
                None => return Err(LexError::StringNotClosed(opening)),
            }
        }

        Ok(Token::String(str))
    }

    /// Consume the rest of a string literal, up to and including the closing `opening` quote
    fn skip_string_rest(&mut self, opening: char) {
        while let Some(ch) = self.read_char() {
            if ch == opening {
                break;
            } else if ch == '\\' {
                self.read_char();
            }
        }
    }

    /// Read the current and following digits as an integer token.
    /// Underscores may be used as separators and are dropped.
    fn read_integer(&mut self, first: char) -> LexResult<Token> {
        let mut literal = String::new();
        literal.push(first);

        while let Some(&ch) = self.peek_char() {
            if ch.is_ascii_digit() {
                literal.push(ch);
                self.read_char();
            } else if ch == '_' {
                self.read_char();
            } else {
                break;
            }
        }

        literal
            .parse()
            .map(Token::Integer)
            .map_err(|source| LexError::InvalidInt { literal, source })
    }

    /// Read the current and following characters as an identifier or a keyword (if it exists).
    fn read_identifier_or_keyword(&mut self, first: char) -> Token {
        let mut identifier = String::new();
        identifier.push(first);

        while let Some(&ch) = self.peek_char() {
            if is_identifier_char(ch) || ch.is_ascii_digit() {
                identifier.push(ch);
                self.read_char();
            } else {
                break;
            }
        }

        Token::lookup_keyword(&identifier).unwrap_or(Token::Identifier(identifier))
    }

    /// Read a new token from the characters list.
    ///
    /// Once the input is exhausted, every call returns [`Token::Eof`].
    pub fn next_token(&mut self) -> LexResult<WithSpan<Token>> {
        self.skip_whitespace();

        let initial_position = self.current_position;

        let token = if let Some(c) = self.read_char() {
            match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '<' => Token::LessThan,
                '>' => Token::GreaterThan,

                '=' if self.read_char_if('=') => Token::EqualEqual,
                '=' => Token::Equal,
                '!' if self.read_char_if('=') => Token::BangEqual,
                '!' => Token::Bang,

                ',' => Token::Comma,
                ';' => Token::Semicolon,
                ':' => Token::Colon,

                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                '{' => Token::LeftBrace,
                '}' => Token::RightBrace,
                '[' => Token::LeftBracket,
                ']' => Token::RightBracket,

                '"' | '\'' => self.read_string(c)?,

                c if c.is_ascii_digit() => self.read_integer(c)?,
                c if is_identifier_char(c) => self.read_identifier_or_keyword(c),

                _ => return Err(LexError::UnexpectedChar(c)),
            }
        } else {
            Token::Eof
        };

        let span = Span::new(initial_position, self.current_position);

        Ok(WithSpan::new(token, span))
    }

    /// Byte offset of the next unread character
    pub fn position(&self) -> BytePos {
        self.current_position
    }
}

/// Whether or not the given character may start an identifier
fn is_identifier_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}
