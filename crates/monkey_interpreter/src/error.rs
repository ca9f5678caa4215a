use thiserror::Error;

use crate::object::ObjectType;
use monkey_parser::token::Token;

/// Failures raised while evaluating a program.
///
/// Each variant renders as the message shown to the user.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    /// When attempting a prefix operation on an invalid type (e.g. `-true`)
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator { operator: Token, right: ObjectType },
    /// When both operands share a type that does not support the operator (e.g. `true + false`)
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        operator: Token,
        right: ObjectType,
    },
    /// When the operands of a non-equality operator are of different types (e.g. `5 + true`)
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectType,
        operator: Token,
        right: ObjectType,
    },
    /// When referencing an identifier that is neither bound nor a builtin
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    /// When an object that is not a function is used with call syntax
    #[error("not a function: {0}")]
    NotAFunction(ObjectType),
    /// When a hash key (in a literal or an index) is not an integer, boolean or string
    #[error("unusable as hash key: {0}")]
    UnusableHashKey(ObjectType),
    /// When attempting to index an object that does not support it (e.g. `1[0]`)
    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),
    /// When a builtin is called with the wrong number of arguments
    #[error("wrong number of arguments. got {got}, want={want}")]
    BadArity { got: usize, want: usize },
    /// When a builtin has no meaning for the argument's type (e.g. `len(1)`)
    #[error("argument to `{builtin}` not supported, got {got}")]
    UnsupportedArgument {
        builtin: &'static str,
        got: ObjectType,
    },
    /// When a builtin requires a specific argument type (e.g. `first(1)`)
    #[error("argument to `{builtin}` must be {expected}, got {got}")]
    InvalidArgumentType {
        builtin: &'static str,
        expected: ObjectType,
        got: ObjectType,
    },
}

#[cfg(test)]
mod tests {
    use crate::error::RuntimeError;
    use crate::object::ObjectType;
    use monkey_parser::token::Token;

    #[test]
    fn messages() {
        let tests = vec![
            (
                RuntimeError::UnknownPrefixOperator {
                    operator: Token::Minus,
                    right: ObjectType::Boolean,
                },
                "unknown operator: -BOOLEAN",
            ),
            (
                RuntimeError::TypeMismatch {
                    left: ObjectType::Integer,
                    operator: Token::Plus,
                    right: ObjectType::Boolean,
                },
                "type mismatch: INTEGER + BOOLEAN",
            ),
            (
                RuntimeError::BadArity { got: 2, want: 1 },
                "wrong number of arguments. got 2, want=1",
            ),
            (
                RuntimeError::UnsupportedArgument {
                    builtin: "len",
                    got: ObjectType::Integer,
                },
                "argument to `len` not supported, got INTEGER",
            ),
            (
                RuntimeError::UnusableHashKey(ObjectType::Function),
                "unusable as hash key: FUNCTION",
            ),
        ];

        for (error, expected) in tests {
            assert_eq!(error.to_string(), expected);
        }
    }
}
