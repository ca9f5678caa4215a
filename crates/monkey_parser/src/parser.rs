use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::ast::{
    ArrayLiteral, BlockStatement, CallExpression, Expression, FunctionLiteral, HashLiteral,
    Identifier, IfExpression, IndexExpression, InfixExpression, PrefixExpression, Program,
    Statement,
};
use crate::lexer::{LexError, Lexer};
use crate::span::{Span, WithSpan};
use crate::token::Token;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {}", .got.value.kind())]
    Expected {
        expected: &'static str,
        got: WithSpan<Token>,
    },
    #[error("no prefix parse function for {}", .0.value.kind())]
    NoPrefixParseFn(WithSpan<Token>),
    #[error("{error}")]
    Lex { error: LexError, span: Span },
}

impl ParseError {
    /// Location in the source the diagnostic refers to
    pub fn span(&self) -> Span {
        match self {
            ParseError::Expected { got, .. } => got.span,
            ParseError::NoPrefixParseFn(token) => token.span,
            ParseError::Lex { span, .. } => *span,
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

type PrefixParseFn<'a> = fn(&mut Parser<'a>) -> ParseResult<Expression>;
type InfixParseFn<'a> = fn(&mut Parser<'a>, Expression) -> ParseResult<Expression>;

/// Binding power of infix operators, lowest first
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Precedence {
    Lowest,
    /// == or !=
    Equals,
    /// < or >
    LessGreater,
    /// + or -
    Sum,
    /// * or /
    Product,
    /// -x or !x
    Prefix,
    /// myFunc(x)
    Call,
    /// myArray[x]
    Index,
}

impl Precedence {
    fn of(token: &Token) -> Precedence {
        match token {
            Token::EqualEqual | Token::BangEqual => Precedence::Equals,
            Token::LessThan | Token::GreaterThan => Precedence::LessGreater,
            Token::Plus | Token::Minus => Precedence::Sum,
            Token::Star | Token::Slash => Precedence::Product,
            Token::LeftParen => Precedence::Call,
            Token::LeftBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,

    current_token: WithSpan<Token>,
    peek_token: WithSpan<Token>,

    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Parser<'a> {
        let placeholder = WithSpan::new(Token::Eof, Span::default());
        let mut parser = Parser {
            lexer,
            current_token: placeholder.clone(),
            peek_token: placeholder,
            errors: Vec::new(),
        };

        // Fill both current and peek
        parser.next_token();
        parser.next_token();
        parser
    }

    /// Parse the whole input, recording (rather than stopping at) malformed statements.
    ///
    /// Check [`Parser::errors`] before trusting the returned program.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new();

        while !self.current_token_is(&Token::Eof) {
            match self.parse_statement() {
                Ok(statement) => program.statements.push(statement),
                Err(error) => {
                    self.recover(error);

                    // A stray `}` has no block to close at the top level
                    if self.current_token_is(&Token::RightBrace)
                        && self.peek_token_is(&Token::Semicolon)
                    {
                        self.next_token();
                    }
                }
            }
            self.next_token();
        }

        program
    }

    /// Diagnostics collected so far, in the order they were found
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Parse the whole input, returning the program only if there were no diagnostics.
    pub fn parse(mut self) -> Result<Program, Vec<ParseError>> {
        let program = self.parse_program();

        if self.errors.is_empty() {
            Ok(program)
        } else {
            Err(self.errors)
        }
    }

    /// Record `error` and skip to the end of the statement it occurred in
    fn recover(&mut self, error: ParseError) {
        debug!(%error, span = %error.span(), "recovering from parse error");
        self.errors.push(error);
        self.synchronize();
    }

    /// Advance until the current token ends a statement: a `;`, the token before a
    /// closing `}`, or the end of input.
    ///
    /// A current `}` is never skipped, as it closes the enclosing block.
    fn synchronize(&mut self) {
        while !self.current_token_is(&Token::Semicolon)
            && !self.current_token_is(&Token::RightBrace)
            && !self.current_token_is(&Token::Eof)
            && !self.peek_token_is(&Token::RightBrace)
            && !self.peek_token_is(&Token::Eof)
        {
            self.next_token();
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current_token.value {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> ParseResult<Statement> {
        let name = self.expect_peek_identifier()?;

        self.expect_peek(Token::Equal)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Ok(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        // Consume the `return` token
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Ok(Statement::Return { value })
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Ok(Statement::Expression { expression })
    }

    /// Parse a `{ ... }` block; the current token must be the opening brace.
    /// The current token is the closing brace afterwards.
    fn parse_block_statement(&mut self) -> ParseResult<BlockStatement> {
        let mut block = BlockStatement::default();
        self.next_token();

        while !self.current_token_is(&Token::RightBrace) {
            if self.current_token_is(&Token::Eof) {
                return Err(ParseError::Expected {
                    expected: Token::RightBrace.kind(),
                    got: self.current_token.clone(),
                });
            }

            match self.parse_statement() {
                Ok(statement) => {
                    block.statements.push(statement);
                    self.next_token();
                }
                Err(error) => {
                    self.recover(error);

                    // The statement failed on the closing brace itself
                    if !self.current_token_is(&Token::RightBrace) {
                        self.next_token();
                    }
                }
            }
        }

        Ok(block)
    }

    fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        let prefix = match Self::prefix_parse_fn(&self.current_token.value) {
            Some(prefix) => prefix,
            None => return Err(ParseError::NoPrefixParseFn(self.current_token.clone())),
        };

        let mut left = prefix(self)?;

        while !self.peek_token_is(&Token::Semicolon) && precedence < self.peek_precedence() {
            let infix = match Self::infix_parse_fn(&self.peek_token.value) {
                Some(infix) => infix,
                None => return Ok(left),
            };

            self.next_token();
            left = infix(self, left)?;
        }

        Ok(left)
    }

    /// Rule for a token found at the start of an expression
    fn prefix_parse_fn(token: &Token) -> Option<PrefixParseFn<'a>> {
        match token {
            Token::Identifier(_) => Some(Self::parse_identifier),
            Token::Integer(_) => Some(Self::parse_integer),
            Token::String(_) => Some(Self::parse_string),
            Token::True | Token::False => Some(Self::parse_boolean),
            Token::Bang | Token::Minus => Some(Self::parse_prefix_expression),
            Token::LeftParen => Some(Self::parse_grouped_expression),
            Token::If => Some(Self::parse_if_expression),
            Token::Fn => Some(Self::parse_function_literal),
            Token::LeftBracket => Some(Self::parse_array_literal),
            Token::LeftBrace => Some(Self::parse_hash_literal),
            _ => None,
        }
    }

    /// Rule for a token found after a complete left operand
    fn infix_parse_fn(token: &Token) -> Option<InfixParseFn<'a>> {
        match token {
            Token::Plus
            | Token::Minus
            | Token::Star
            | Token::Slash
            | Token::EqualEqual
            | Token::BangEqual
            | Token::LessThan
            | Token::GreaterThan => Some(Self::parse_infix_expression),
            Token::LeftParen => Some(Self::parse_call_expression),
            Token::LeftBracket => Some(Self::parse_index_expression),
            _ => None,
        }
    }

    fn parse_identifier(&mut self) -> ParseResult<Expression> {
        match &self.current_token.value {
            Token::Identifier(name) => Ok(Expression::Identifier(Identifier::from(name.as_str()))),
            _ => Err(self.expected_current(Token::Identifier(String::new()).kind())),
        }
    }

    fn parse_integer(&mut self) -> ParseResult<Expression> {
        match self.current_token.value {
            Token::Integer(value) => Ok(Expression::Integer(value)),
            _ => Err(self.expected_current(Token::Integer(0).kind())),
        }
    }

    fn parse_string(&mut self) -> ParseResult<Expression> {
        match &self.current_token.value {
            Token::String(value) => Ok(Expression::String(value.clone())),
            _ => Err(self.expected_current(Token::String(String::new()).kind())),
        }
    }

    fn parse_boolean(&mut self) -> ParseResult<Expression> {
        Ok(Expression::Boolean(self.current_token_is(&Token::True)))
    }

    fn parse_prefix_expression(&mut self) -> ParseResult<Expression> {
        let operator = self.current_token.value.clone();
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;

        Ok(Expression::Prefix(Box::new(PrefixExpression {
            operator,
            right,
        })))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        let operator = self.current_token.value.clone();
        let precedence = self.current_precedence();
        self.next_token();

        let right = self.parse_expression(precedence)?;

        Ok(Expression::Infix(Box::new(InfixExpression {
            left,
            operator,
            right,
        })))
    }

    fn parse_grouped_expression(&mut self) -> ParseResult<Expression> {
        self.next_token();

        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::RightParen)?;

        Ok(expression)
    }

    fn parse_if_expression(&mut self) -> ParseResult<Expression> {
        self.expect_peek(Token::LeftParen)?;
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(Token::RightParen)?;
        self.expect_peek(Token::LeftBrace)?;

        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_token_is(&Token::Else) {
            self.next_token();
            self.expect_peek(Token::LeftBrace)?;
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Ok(Expression::If(Box::new(IfExpression {
            condition,
            consequence,
            alternative,
        })))
    }

    fn parse_function_literal(&mut self) -> ParseResult<Expression> {
        self.expect_peek(Token::LeftParen)?;

        let parameters = self.parse_function_parameters()?;

        self.expect_peek(Token::LeftBrace)?;

        let body = self.parse_block_statement()?;

        Ok(Expression::Function(Box::new(FunctionLiteral {
            parameters,
            body: Rc::new(body),
        })))
    }

    /// Parse `(a, b, c)`; the current token must be the opening parenthesis.
    fn parse_function_parameters(&mut self) -> ParseResult<Vec<Identifier>> {
        let mut parameters = Vec::new();

        if self.peek_token_is(&Token::RightParen) {
            self.next_token();
            return Ok(parameters);
        }

        parameters.push(self.expect_peek_identifier()?);

        while self.peek_token_is(&Token::Comma) {
            self.next_token();
            parameters.push(self.expect_peek_identifier()?);
        }

        self.expect_peek(Token::RightParen)?;

        Ok(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> ParseResult<Expression> {
        let arguments = self.parse_expression_list(Token::RightParen)?;

        Ok(Expression::Call(Box::new(CallExpression {
            function,
            arguments,
        })))
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expression> {
        let elements = self.parse_expression_list(Token::RightBracket)?;

        Ok(Expression::Array(Box::new(ArrayLiteral { elements })))
    }

    fn parse_index_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        self.next_token();

        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::RightBracket)?;

        Ok(Expression::Index(Box::new(IndexExpression { left, index })))
    }

    fn parse_hash_literal(&mut self) -> ParseResult<Expression> {
        let mut pairs = Vec::new();

        while !self.peek_token_is(&Token::RightBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            self.expect_peek(Token::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            if !self.peek_token_is(&Token::RightBrace) {
                self.expect_peek(Token::Comma)?;
            }
        }

        self.expect_peek(Token::RightBrace)?;

        Ok(Expression::Hash(Box::new(HashLiteral { pairs })))
    }

    /// Parse comma-separated expressions up to `end`; the current token must be the opening delimiter.
    fn parse_expression_list(&mut self, end: Token) -> ParseResult<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_token_is(&end) {
            self.next_token();
            return Ok(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(&Token::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;

        Ok(list)
    }

    /// Move to the next token. Lex errors are recorded and the offending input skipped.
    fn next_token(&mut self) {
        let next = loop {
            match self.lexer.next_token() {
                Ok(token) => break token,
                Err(error) => {
                    let position = self.lexer.position();
                    self.errors.push(ParseError::Lex {
                        error,
                        span: Span::new(position, position),
                    });
                }
            }
        };

        self.current_token = std::mem::replace(&mut self.peek_token, next);
    }

    fn skip_optional_semicolon(&mut self) {
        if self.peek_token_is(&Token::Semicolon) {
            self.next_token();
        }
    }

    fn current_token_is(&self, token: &Token) -> bool {
        self.current_token.value.same_kind(token)
    }

    fn peek_token_is(&self, token: &Token) -> bool {
        self.peek_token.value.same_kind(token)
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::of(&self.current_token.value)
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(&self.peek_token.value)
    }

    /// Advance if the next token is of the same kind as `token`, otherwise error.
    fn expect_peek(&mut self, token: Token) -> ParseResult<()> {
        if self.peek_token_is(&token) {
            self.next_token();
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected: token.kind(),
                got: self.peek_token.clone(),
            })
        }
    }

    fn expect_peek_identifier(&mut self) -> ParseResult<Identifier> {
        let name = match &self.peek_token.value {
            Token::Identifier(name) => name.to_owned(),
            _ => {
                return Err(ParseError::Expected {
                    expected: Token::Identifier(String::new()).kind(),
                    got: self.peek_token.clone(),
                })
            }
        };

        self.next_token();
        Ok(Identifier::from(name))
    }

    fn expected_current(&self, expected: &'static str) -> ParseError {
        ParseError::Expected {
            expected,
            got: self.current_token.clone(),
        }
    }
}
