// ABOUTME: Host-library type: named attribute/method aggregates exposed to scripts

use crate::error::RuntimeError;
use crate::eval::Evaluator;
use crate::value::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// A native callable provided by the host or the bundled libraries.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>;

/// A native callable that needs interpreter state (logs, environment,
/// the ability to call back into script functions).
pub type ContextFn = fn(&mut Evaluator, &[Value]) -> Result<Value, RuntimeError>;

#[derive(Clone)]
pub enum NativeKind {
    Plain(NativeFn),
    Context(ContextFn),
}

/// A named native function value.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub kind: NativeKind,
}

impl NativeFunction {
    pub fn plain(
        name: &str,
        func: impl Fn(&[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        NativeFunction {
            name: name.to_string(),
            kind: NativeKind::Plain(Rc::new(func)),
        }
    }

    pub fn context(name: &str, func: ContextFn) -> Self {
        NativeFunction {
            name: name.to_string(),
            kind: NativeKind::Context(func),
        }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// A host-provided library: a named aggregate of attributes and methods,
/// immutable from the script side and reached only through method chains.
///
/// Members listed as blocked answer every access with a permission error,
/// which is how the sandbox exposes a library's surface without its
/// capabilities.
pub struct Library {
    name: String,
    attributes: HashMap<String, Value>,
    methods: HashMap<String, NativeFunction>,
    blocked: HashSet<String>,
}

impl Library {
    pub fn new(name: &str) -> Self {
        Library {
            name: name.to_string(),
            attributes: HashMap::new(),
            methods: HashMap::new(),
            blocked: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an attribute value.
    pub fn attr(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    /// Add a method backed by a host closure.
    pub fn method(
        mut self,
        name: &str,
        func: impl Fn(&[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        self.methods
            .insert(name.to_string(), NativeFunction::plain(name, func));
        self
    }

    /// Add a method that needs interpreter state.
    pub fn context_method(mut self, name: &str, func: ContextFn) -> Self {
        self.methods
            .insert(name.to_string(), NativeFunction::context(name, func));
        self
    }

    /// Mark members as blocked; access raises a permission error.
    pub fn block(mut self, names: &[&str]) -> Self {
        self.blocked.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn is_blocked(&self, member: &str) -> bool {
        self.blocked.contains(member)
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn get_method(&self, name: &str) -> Option<&NativeFunction> {
        self.methods.get(name)
    }

    pub fn permission_error(&self, member: &str) -> RuntimeError {
        RuntimeError::PermissionError {
            library: self.name.clone(),
            method: member.to_string(),
        }
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("name", &self.name)
            .field("attributes", &self.attributes.len())
            .field("methods", &self.methods.len())
            .field("blocked", &self.blocked.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_builder() {
        let lib = Library::new("vec")
            .attr("dims", Value::Integer(3))
            .method("len", |_args| Ok(Value::Float(0.0)))
            .block(&["unsafe_op"]);

        assert_eq!(lib.name(), "vec");
        assert_eq!(lib.attribute("dims"), Some(&Value::Integer(3)));
        assert!(lib.get_method("len").is_some());
        assert!(lib.is_blocked("unsafe_op"));
        assert!(!lib.is_blocked("len"));
    }

    #[test]
    fn test_permission_error_names_member() {
        let lib = Library::new("io").block(&["open"]);
        let err = lib.permission_error("open");
        assert!(err.to_string().contains("io.open"));
    }
}
