use crate::token::Token;
use std::{fmt::Display, rc::Rc};

#[derive(Debug, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Program {
        Program {
            statements: Vec::new(),
        }
    }

    /// Literal of the token that starts the program, or an empty string if there are no statements
    pub fn token_literal(&self) -> String {
        self.statements
            .first()
            .map(|stmt| stmt.token_literal())
            .unwrap_or_default()
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub enum Statement {
    Let {
        /// The name/identifier of the variable
        name: Identifier,
        /// The value being bound
        value: Expression,
    },
    Return {
        /// The value being returned
        value: Expression,
    },
    Expression {
        /// The expression for this statement
        expression: Expression,
    },
}

impl Statement {
    pub fn token_literal(&self) -> String {
        match self {
            Statement::Let { .. } => Token::Let.to_string(),
            Statement::Return { .. } => Token::Return.to_string(),
            Statement::Expression { expression } => expression.token_literal(),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Statement::*;

        match self {
            Let { name, value } => write!(
                f,
                "{tok} {ident} = {val};",
                tok = Token::Let,
                ident = name,
                val = value
            ),
            Return { value } => write!(f, "{} {};", Token::Return, value),
            Expression { expression } => write!(f, "{}", expression),
        }
    }
}

/// A braced sequence of statements, used as the body of `if` branches and functions
#[derive(Debug, Default, PartialEq)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub enum Expression {
    // Literal
    Identifier(Identifier),
    Integer(i64),
    Boolean(bool),
    String(String),

    // Complex
    Prefix(Box<PrefixExpression>),
    Infix(Box<InfixExpression>),
    If(Box<IfExpression>),
    Function(Box<FunctionLiteral>),
    Call(Box<CallExpression>),
    Array(Box<ArrayLiteral>),
    Index(Box<IndexExpression>),
    Hash(Box<HashLiteral>),
}

impl Expression {
    /// Literal of the token that produced this expression
    pub fn token_literal(&self) -> String {
        use Expression::*;

        match self {
            Identifier(ident) => ident.name.clone(),
            Integer(value) => value.to_string(),
            Boolean(value) => value.to_string(),
            String(value) => value.clone(),

            Prefix(prefix) => prefix.operator.to_string(),
            Infix(infix) => infix.operator.to_string(),
            If(_) => Token::If.to_string(),
            Function(_) => Token::Fn.to_string(),
            Call(_) => Token::LeftParen.to_string(),
            Array(_) | Index(_) => Token::LeftBracket.to_string(),
            Hash(_) => Token::LeftBrace.to_string(),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;

        match self {
            Identifier(name) => write!(f, "{}", name),
            Integer(value) => write!(f, "{}", value),
            Boolean(value) => write!(f, "{}", value),
            String(value) => write!(f, "\"{}\"", value),

            Prefix(prefix) => write!(f, "{}", prefix),
            Infix(infix) => write!(f, "{}", infix),
            If(if_exp) => write!(f, "{}", if_exp),
            Function(func) => write!(f, "{}", func),
            Call(call) => write!(f, "{}", call),
            Array(arr) => write!(f, "{}", arr),
            Index(index) => write!(f, "{}", index),
            Hash(hash) => write!(f, "{}", hash),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Identifier {
    pub name: String,
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Self { name }
    }
}

#[derive(Debug, PartialEq)]
pub struct PrefixExpression {
    pub operator: Token,
    pub right: Expression,
}

impl Display for PrefixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({op}{r})", op = self.operator, r = self.right)
    }
}

#[derive(Debug, PartialEq)]
pub struct InfixExpression {
    pub left: Expression,
    pub operator: Token,
    pub right: Expression,
}

impl Display for InfixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({l} {op} {r})",
            l = self.left,
            op = self.operator,
            r = self.right
        )
    }
}

#[derive(Debug, PartialEq)]
pub struct IfExpression {
    pub condition: Expression,
    /// Block if condition is truthy
    pub consequence: BlockStatement,
    /// Block if condition is falsy
    pub alternative: Option<BlockStatement>,
}

impl Display for IfExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "if {} {}", self.condition, self.consequence)?;

        if let Some(ref alt) = self.alternative {
            write!(f, " else {}", alt)?;
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub struct FunctionLiteral {
    /// Parameter identifiers
    pub parameters: Vec<Identifier>,
    /// Shared with every function object created from this literal
    pub body: Rc<BlockStatement>,
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn({}) {}", join(&self.parameters), self.body)
    }
}

#[derive(Debug, PartialEq)]
pub struct CallExpression {
    /// Identifier or function literal being called
    pub function: Expression,
    pub arguments: Vec<Expression>,
}

impl Display for CallExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.function, join(&self.arguments))
    }
}

#[derive(Debug, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
}

impl Display for ArrayLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", join(&self.elements))
    }
}

#[derive(Debug, PartialEq)]
pub struct IndexExpression {
    pub left: Expression,
    pub index: Expression,
}

impl Display for IndexExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}[{}])", self.left, self.index)
    }
}

#[derive(Debug, PartialEq)]
pub struct HashLiteral {
    /// Key/value pairs in source order
    pub pairs: Vec<(Expression, Expression)>,
}

impl Display for HashLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs = self
            .pairs
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<String>>()
            .join(", ");

        write!(f, "{{{}}}", pairs)
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}
