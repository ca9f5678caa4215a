use std::{cell::RefCell, rc::Rc};

use rustc_hash::FxHashMap;

use crate::object::Object;

/// One scope of bindings, linked to the scope it is nested in.
#[derive(Debug, Default)]
pub struct Environment {
    store: FxHashMap<String, Rc<Object>>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new environment that is enclosed by a given outer environment
    pub fn new_enclosed(outer: Rc<RefCell<Environment>>) -> Self {
        Environment {
            store: FxHashMap::default(),
            outer: Some(outer),
        }
    }

    /// Look `name` up from this scope outwards
    pub fn get(&self, name: &str) -> Option<Rc<Object>> {
        match self.store.get(name) {
            Some(obj) => Some(Rc::clone(obj)),
            None => match self.outer {
                Some(ref outer) => outer.borrow().get(name),
                None => None,
            },
        }
    }

    /// Bind `name` in this scope, shadowing (not touching) any outer binding
    pub fn set(&mut self, name: String, value: Rc<Object>) {
        self.store.insert(name, value);
    }

    /// Number of scopes from this one out to the global scope
    pub fn depth(&self) -> usize {
        match &self.outer {
            Some(parent_env) => 1 + parent_env.borrow().depth(),
            None => 1,
        }
    }
}
