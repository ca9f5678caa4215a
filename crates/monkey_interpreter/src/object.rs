use std::{cell::RefCell, fmt::Display, rc::Rc};

use rustc_hash::FxHashMap;

use crate::{builtin::Builtin, environment::Environment, error::RuntimeError};

use monkey_parser::ast::{BlockStatement, Identifier};

#[derive(Debug)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Array(Array),
    Hash(Hash),
    Function(Function),
    Builtin(Builtin),
}

/// Discriminant of an [`Object`], as named in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Integer,
    Boolean,
    String,
    Null,
    Array,
    Hash,
    Function,
    Builtin,
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::String => "STRING",
            ObjectType::Null => "NULL",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
            ObjectType::Function => "FUNCTION",
            ObjectType::Builtin => "BUILTIN",
        };
        write!(f, "{}", name)
    }
}

impl Object {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Null => ObjectType::Null,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(_) => ObjectType::Builtin,
        }
    }

    /// `false` and `null` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    /// Key under which this object is stored in a hash.
    ///
    /// Only integers, booleans and strings can be hash keys.
    /// # Examples
    /// ```rust
    /// use monkey_interpreter::object::Object;
    ///
    /// let a = Object::String("name".to_string());
    /// let b = Object::String("name".to_string());
    ///
    /// assert_eq!(a.hash_key(), b.hash_key());
    /// assert!(Object::Null.hash_key().is_err());
    /// ```
    pub fn hash_key(&self) -> Result<HashKey, RuntimeError> {
        match self {
            Object::Integer(value) => Ok(HashKey::Integer(*value)),
            Object::Boolean(value) => Ok(HashKey::Boolean(*value)),
            Object::String(value) => Ok(HashKey::String(value.clone())),
            other => Err(RuntimeError::UnusableHashKey(other.object_type())),
        }
    }
}

impl Display for Object {
    /// The `inspect` form shown by the REPL and `puts`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Object::*;

        match self {
            Integer(value) => write!(f, "{}", value),
            Boolean(value) => write!(f, "{}", value),
            String(value) => write!(f, "{}", value),
            Null => write!(f, "null"),
            Array(array) => write!(f, "{}", array),
            Hash(hash) => write!(f, "{}", hash),
            Function(func) => write!(f, "{}", func),
            Builtin(builtin) => write!(f, "{}", builtin),
        }
    }
}

#[derive(Debug, Default)]
pub struct Array {
    pub elements: Vec<Rc<Object>>,
}

impl Display for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let elements: Vec<String> = self.elements.iter().map(|e| e.to_string()).collect();
        write!(f, "[{}]", elements.join(", "))
    }
}

/// Structural key of a hashable object; equal values of the same type give equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(String),
}

/// The original key object is kept alongside the value so the hash can be displayed
#[derive(Debug)]
pub struct HashPair {
    pub key: Rc<Object>,
    pub value: Rc<Object>,
}

/// Hash object; pairs are kept in insertion order
#[derive(Debug, Default)]
pub struct Hash {
    pairs: Vec<HashPair>,
    index: FxHashMap<HashKey, usize>,
}

impl Hash {
    /// Insert a pair; an existing key keeps its position and takes the new pair.
    pub fn insert(&mut self, key: HashKey, pair: HashPair) {
        match self.index.get(&key) {
            Some(&i) => self.pairs[i] = pair,
            None => {
                self.index.insert(key, self.pairs.len());
                self.pairs.push(pair);
            }
        }
    }

    pub fn get(&self, key: &HashKey) -> Option<Rc<Object>> {
        self.index
            .get(key)
            .map(|&i| Rc::clone(&self.pairs[i].value))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = &HashPair> {
        self.pairs.iter()
    }
}

impl Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs: Vec<String> = self
            .pairs()
            .map(|pair| format!("{}: {}", pair.key, pair.value))
            .collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

/// A closure: the function's code plus the scope it was defined in
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: Rc<BlockStatement>,
    pub env: Rc<RefCell<Environment>>,
}

impl std::fmt::Debug for Function {
    // The captured scope may contain this very function, so it is left out
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();

        write!(f, "fn({}) {{\n{}\n}}", params.join(", "), self.body)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use crate::error::RuntimeError;
    use crate::object::{Array, Hash, HashKey, HashPair, Object, ObjectType};

    #[test]
    fn hash_keys_are_structural() {
        let hello1 = Object::String("Hello World".to_string());
        let hello2 = Object::String("Hello World".to_string());
        let diff = Object::String("My name is johnny".to_string());

        assert_eq!(hello1.hash_key(), hello2.hash_key());
        assert_ne!(hello1.hash_key(), diff.hash_key());

        assert_eq!(Object::Integer(1).hash_key(), Object::Integer(1).hash_key());
        assert_eq!(
            Object::Boolean(true).hash_key(),
            Object::Boolean(true).hash_key()
        );
        // Same underlying representation, different types
        assert_ne!(Object::Integer(1).hash_key(), Object::Boolean(true).hash_key());
    }

    #[test]
    fn unusable_hash_keys() {
        let array = Object::Array(Array::default());
        assert_eq!(
            array.hash_key(),
            Err(RuntimeError::UnusableHashKey(ObjectType::Array))
        );
        assert_eq!(
            Object::Null.hash_key(),
            Err(RuntimeError::UnusableHashKey(ObjectType::Null))
        );
    }

    #[test]
    fn truthiness() {
        assert!(!Object::Boolean(false).is_truthy());
        assert!(!Object::Null.is_truthy());
        assert!(Object::Boolean(true).is_truthy());
        assert!(Object::Integer(0).is_truthy());
        assert!(Object::String(String::new()).is_truthy());
    }

    #[test]
    fn inspect() {
        let array = Object::Array(Array {
            elements: vec![
                Rc::new(Object::Integer(1)),
                Rc::new(Object::String("two".to_string())),
                Rc::new(Object::Null),
            ],
        });
        assert_eq!(array.to_string(), "[1, two, null]");

        let mut hash = Hash::default();
        let key = Rc::new(Object::String("a".to_string()));
        hash.insert(
            key.hash_key().unwrap(),
            HashPair {
                key,
                value: Rc::new(Object::Boolean(true)),
            },
        );
        assert_eq!(Object::Hash(hash).to_string(), "{a: true}");

        assert_eq!(ObjectType::Builtin.to_string(), "BUILTIN");
    }

    #[test]
    fn hash_lookup() {
        let mut hash = Hash::default();
        hash.insert(
            HashKey::Integer(1),
            HashPair {
                key: Rc::new(Object::Integer(1)),
                value: Rc::new(Object::Integer(10)),
            },
        );

        match hash.get(&HashKey::Integer(1)).as_deref() {
            Some(Object::Integer(10)) => {}
            other => panic!("expected 10 but got {:?}", other),
        }
        assert!(hash.get(&HashKey::Integer(2)).is_none());
    }

    #[test]
    fn hash_keeps_insertion_order() {
        let mut hash = Hash::default();
        for (k, v) in &[(7, 8), (1, 2), (5, 6), (3, 4), (1, 10)] {
            hash.insert(
                HashKey::Integer(*k),
                HashPair {
                    key: Rc::new(Object::Integer(*k)),
                    value: Rc::new(Object::Integer(*v)),
                },
            );
        }

        assert_eq!(hash.len(), 4);
        assert_eq!(Object::Hash(hash).to_string(), "{7: 8, 1: 10, 5: 6, 3: 4}");
    }
}
