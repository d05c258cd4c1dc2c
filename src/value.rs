// ABOUTME: Runtime value types: the tagged union, tables, and user functions

use crate::ast::Node;
use crate::error::RuntimeError;
use crate::library::{Library, NativeFunction, NativeKind};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The value universe of the scripting language.
///
/// Tables, functions, and libraries are reference values: copies share the
/// underlying object, so a table mutated inside a call frame stays mutated
/// after the frame's environment copy is discarded.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Str(String),
    Table(Rc<RefCell<Table>>),
    Function(Rc<FunctionValue>),
    Native(NativeFunction),
    Library(Rc<Library>),
    /// Multi-value result (`pcall`, `next`). Destructured by multi-name
    /// declarations; collapses to its first element everywhere else.
    Values(Rc<Vec<Value>>),
    /// Iteration sequence produced by `ipairs`, `pairs`, and `string.gmatch`.
    Pairs(Rc<Vec<(Value, Value)>>),
}

/// A user-defined function: parameter names plus a shared body.
#[derive(Debug, Clone)]
pub struct FunctionValue {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Vec<Node>>,
}

impl Value {
    pub fn table(table: Table) -> Value {
        Value::Table(Rc::new(RefCell::new(table)))
    }

    pub fn values(items: Vec<Value>) -> Value {
        Value::Values(Rc::new(items))
    }

    pub fn pairs(items: Vec<(Value, Value)>) -> Value {
        Value::Pairs(Rc::new(items))
    }

    /// nil and false are falsy; every other value is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Boolean(b) => *b,
            Value::Values(items) => items.first().map_or(false, Value::is_truthy),
            _ => true,
        }
    }

    /// Collapse a multi-value to its first element.
    pub fn first_value(self) -> Value {
        match self {
            Value::Values(items) => items.first().cloned().unwrap_or(Value::Nil),
            other => other,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::Str(_) => "string",
            Value::Table(_) => "table",
            Value::Function(_) | Value::Native(_) => "function",
            Value::Library(_) | Value::Values(_) | Value::Pairs(_) => "userdata",
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Stringification used by `print`, `tostring`, and `..`.
    pub fn to_text(&self) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => float_text(*n),
            Value::Str(s) => s.clone(),
            Value::Table(t) => format!("table: 0x{:012x}", Rc::as_ptr(t) as usize),
            Value::Function(f) => match &f.name {
                Some(name) => format!("function: {}", name),
                None => "function: anonymous".to_string(),
            },
            Value::Native(native) => format!("function: builtin: {}", native.name),
            Value::Library(lib) => format!("library: {}", lib.name()),
            Value::Values(items) => items
                .first()
                .map_or_else(|| "nil".to_string(), Value::to_text),
            Value::Pairs(_) => "iterator".to_string(),
        }
    }
}

fn float_text(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.1}", n)
    } else {
        format!("{}", n)
    }
}

/// Value equality: numbers compare across integer/float, reference values
/// compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                *a as f64 == *b
            }
            (Value::Table(a), Value::Table(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Library(a), Value::Library(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => match (&a.kind, &b.kind) {
                (NativeKind::Plain(x), NativeKind::Plain(y)) => Rc::ptr_eq(x, y),
                (NativeKind::Context(_), NativeKind::Context(_)) => a.name == b.name,
                _ => false,
            },
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "\"{}\"", s),
            other => write!(f, "{}", other.to_text()),
        }
    }
}

/// The composite data structure: an ordered sequence of key/value entries,
/// either array-shaped (1-based integer keys, insertion order) or
/// dictionary-shaped (string keys, insertion order). The shape is fixed at
/// construction.
#[derive(Debug, Clone, Default)]
pub struct Table {
    entries: Vec<(Value, Value)>,
    is_array: bool,
}

impl Table {
    pub fn new_array() -> Self {
        Table {
            entries: Vec::new(),
            is_array: true,
        }
    }

    pub fn new_dict() -> Self {
        Table {
            entries: Vec::new(),
            is_array: false,
        }
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    /// Count of entries carrying a non-nil key.
    pub fn len(&self) -> i64 {
        self.entries
            .iter()
            .filter(|(key, _)| !matches!(key, Value::Nil))
            .count() as i64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_key(&self, key: &Value) -> Result<(), RuntimeError> {
        match (self.is_array, key) {
            (true, Value::Integer(_)) | (false, Value::Str(_)) => Ok(()),
            (true, other) => Err(RuntimeError::invalid_op(format!(
                "array tables are indexed by integers, got a {} key",
                other.type_name()
            ))),
            (false, other) => Err(RuntimeError::invalid_op(format!(
                "dictionary tables are indexed by strings, got a {} key",
                other.type_name()
            ))),
        }
    }

    /// Indexed read; a missing key yields nil.
    pub fn get(&self, key: &Value) -> Result<Value, RuntimeError> {
        self.check_key(key)?;
        Ok(self
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Nil))
    }

    /// Indexed write. Writing nil removes the entry.
    pub fn set(&mut self, key: Value, value: Value) -> Result<(), RuntimeError> {
        self.check_key(&key)?;
        if matches!(value, Value::Nil) {
            self.entries.retain(|(k, _)| k != &key);
            return Ok(());
        }
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == &key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
        Ok(())
    }

    /// Append to an array table with the next 1-based index.
    pub fn push(&mut self, value: Value) {
        let next = self.len() + 1;
        self.entries.push((Value::Integer(next), value));
    }

    /// Array values in key order.
    pub fn array_values(&self) -> Vec<Value> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Replace the contents of an array table with `values`, renumbering 1..n.
    pub fn set_array_values(&mut self, values: Vec<Value>) {
        self.entries = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Value::Integer(i as i64 + 1), v))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::Str(String::new()).is_truthy());
    }

    #[test]
    fn test_number_text() {
        assert_eq!(Value::Integer(7).to_text(), "7");
        assert_eq!(Value::Float(7.0).to_text(), "7.0");
        assert_eq!(Value::Float(-2.5).to_text(), "-2.5");
    }

    #[test]
    fn test_cross_kind_number_equality() {
        assert_eq!(Value::Integer(2), Value::Float(2.0));
        assert_ne!(Value::Integer(2), Value::Float(2.5));
        assert_ne!(Value::Integer(2), Value::Str("2".to_string()));
    }

    #[test]
    fn test_array_table_get_set() {
        let mut t = Table::new_array();
        t.push(Value::Integer(10));
        t.push(Value::Integer(20));
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(&Value::Integer(2)).unwrap(), Value::Integer(20));
        assert_eq!(t.get(&Value::Integer(5)).unwrap(), Value::Nil);

        t.set(Value::Integer(1), Value::Str("x".to_string())).unwrap();
        assert_eq!(t.get(&Value::Integer(1)).unwrap(), Value::Str("x".to_string()));
    }

    #[test]
    fn test_array_table_rejects_string_keys() {
        let mut t = Table::new_array();
        assert!(t
            .set(Value::Str("k".to_string()), Value::Integer(1))
            .is_err());
        assert!(t.get(&Value::Str("k".to_string())).is_err());
    }

    #[test]
    fn test_dict_table_rejects_integer_keys() {
        let mut t = Table::new_dict();
        t.set(Value::Str("a".to_string()), Value::Integer(1)).unwrap();
        assert_eq!(
            t.get(&Value::Str("a".to_string())).unwrap(),
            Value::Integer(1)
        );
        assert!(t.set(Value::Integer(1), Value::Nil).is_err());
    }

    #[test]
    fn test_setting_nil_removes_entry() {
        let mut t = Table::new_dict();
        t.set(Value::Str("a".to_string()), Value::Integer(1)).unwrap();
        t.set(Value::Str("a".to_string()), Value::Nil).unwrap();
        assert_eq!(t.len(), 0);
        assert_eq!(t.get(&Value::Str("a".to_string())).unwrap(), Value::Nil);
    }

    #[test]
    fn test_table_identity_equality() {
        let a = Value::table(Table::new_array());
        let b = Value::table(Table::new_array());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_first_value_collapse() {
        let v = Value::values(vec![Value::Boolean(false), Value::Str("m".to_string())]);
        assert_eq!(v.first_value(), Value::Boolean(false));
        assert_eq!(Value::Integer(3).first_value(), Value::Integer(3));
    }
}
