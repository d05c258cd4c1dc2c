// ABOUTME: Environment module for variable bindings and flat call frames

use crate::error::RuntimeError;
use crate::value::Value;
use std::collections::HashMap;

/// A flat name-to-value mapping.
///
/// There is no parent chain: a function call clones the whole caller
/// environment into a fresh frame, so writes inside the frame never reach
/// the caller's bindings. The evaluator keeps the suspended frames on its
/// own stack.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
        }
    }

    /// Install or overwrite a binding.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Update an existing binding; unknown names are an error.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        if !self.bindings.contains_key(name) {
            return Err(RuntimeError::VariableNotDeclared(name.to_string()));
        }
        self.bindings.insert(name.to_string(), value);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}
