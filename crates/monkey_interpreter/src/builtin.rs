use std::{fmt::Display, rc::Rc};

use crate::{
    error::RuntimeError,
    object::{Object, ObjectType},
};

/// Functions provided by the host, resolved by name when no binding shadows them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Len,
    First,
    Last,
    Puts,
    Type,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "len" => Some(Builtin::Len),
            "first" => Some(Builtin::First),
            "last" => Some(Builtin::Last),
            "puts" => Some(Builtin::Puts),
            "type" => Some(Builtin::Type),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Puts => "puts",
            Builtin::Type => "type",
        }
    }

    pub fn apply(&self, args: Vec<Rc<Object>>) -> Result<Rc<Object>, RuntimeError> {
        match self {
            Builtin::Len => {
                let arg = single_argument(args)?;
                match arg.as_ref() {
                    Object::String(str) => Ok(Rc::new(Object::Integer(str.chars().count() as i64))),
                    Object::Array(arr) => Ok(Rc::new(Object::Integer(arr.elements.len() as i64))),
                    other => Err(RuntimeError::UnsupportedArgument {
                        builtin: self.name(),
                        got: other.object_type(),
                    }),
                }
            }
            Builtin::First | Builtin::Last => {
                let arg = single_argument(args)?;
                let arr = match arg.as_ref() {
                    Object::Array(arr) => arr,
                    other => {
                        return Err(RuntimeError::InvalidArgumentType {
                            builtin: self.name(),
                            expected: ObjectType::Array,
                            got: other.object_type(),
                        })
                    }
                };

                let element = if *self == Builtin::First {
                    arr.elements.first()
                } else {
                    arr.elements.last()
                };

                Ok(element.map_or_else(|| Rc::new(Object::Null), Rc::clone))
            }
            Builtin::Puts => {
                for arg in &args {
                    println!("{}", arg);
                }
                Ok(Rc::new(Object::Null))
            }
            Builtin::Type => {
                let arg = single_argument(args)?;
                Ok(Rc::new(Object::String(arg.object_type().to_string())))
            }
        }
    }
}

/// Take the only argument, or fail with an arity error
fn single_argument(mut args: Vec<Rc<Object>>) -> Result<Rc<Object>, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::BadArity {
            got: args.len(),
            want: 1,
        });
    }

    Ok(args.remove(0))
}

impl Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "builtin function {}", self.name())
    }
}
