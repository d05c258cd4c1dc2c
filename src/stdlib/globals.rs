//! Global native functions present in every environment.
//!
//! `print` appends to the interpreter's captured log instead of writing to
//! standard output; `require` binds a host-registered library; `pcall` and
//! `xpcall` turn runtime errors into values a script can inspect.

use super::{arg_at, int_arg, string_arg, table_arg, type_mismatch};
use crate::error::RuntimeError;
use crate::eval::Evaluator;
use crate::library::NativeFunction;
use crate::value::Value;

/// Register every global native in the environment.
pub fn register(evaluator: &mut Evaluator) {
    context(evaluator, "print", native_print);
    context(evaluator, "require", native_require);
    context(evaluator, "pcall", native_pcall);
    context(evaluator, "xpcall", native_xpcall);

    plain(evaluator, "assert", native_assert);
    plain(evaluator, "error", native_error);
    plain(evaluator, "type", native_type);
    plain(evaluator, "tonumber", native_tonumber);
    plain(evaluator, "tostring", native_tostring);
    plain(evaluator, "ipairs", native_ipairs);
    plain(evaluator, "pairs", native_pairs);
    plain(evaluator, "next", native_next);
    plain(evaluator, "select", native_select);
    plain(evaluator, "rawget", native_rawget);
    plain(evaluator, "rawset", native_rawset);
    plain(evaluator, "setmetatable", native_setmetatable);
    plain(evaluator, "getmetatable", native_getmetatable);
}

fn plain(
    evaluator: &mut Evaluator,
    name: &str,
    func: fn(&[Value]) -> Result<Value, RuntimeError>,
) {
    evaluator
        .env_mut()
        .define(name, Value::Native(NativeFunction::plain(name, func)));
}

fn context(
    evaluator: &mut Evaluator,
    name: &str,
    func: fn(&mut Evaluator, &[Value]) -> Result<Value, RuntimeError>,
) {
    evaluator
        .env_mut()
        .define(name, Value::Native(NativeFunction::context(name, func)));
}

// ============================================================================
// Interpreter-state natives
// ============================================================================

/// Appends the space-joined arguments plus a newline to the captured log.
/// Never writes to standard output.
pub fn native_print(evaluator: &mut Evaluator, args: &[Value]) -> Result<Value, RuntimeError> {
    let text = args.iter().map(Value::to_text).collect::<Vec<_>>().join(" ");
    evaluator.push_log(&text);
    evaluator.push_log("\n");
    Ok(Value::Nil)
}

/// Binds a registered host library into the environment by name.
pub fn native_require(evaluator: &mut Evaluator, args: &[Value]) -> Result<Value, RuntimeError> {
    let name = string_arg("require", args, 0)?.to_string();
    if evaluator.env().contains(&name) {
        return Err(RuntimeError::ImportError(format!(
            "name '{}' is already bound",
            name
        )));
    }
    let library = evaluator.registered_library(&name).ok_or_else(|| {
        RuntimeError::ImportError(format!("no library named '{}' is registered", name))
    })?;
    let value = Value::Library(library);
    evaluator.env_mut().define(name, value.clone());
    Ok(value)
}

/// Calls `f` with the remaining arguments, catching any runtime error.
/// Returns `(true, result)` or `(false, message)`.
pub fn native_pcall(evaluator: &mut Evaluator, args: &[Value]) -> Result<Value, RuntimeError> {
    let func = arg_at("pcall", args, 0)?.clone();
    match evaluator.call_value(&func, &args[1..]) {
        Ok(value) => Ok(Value::values(vec![
            Value::Boolean(true),
            value.first_value(),
        ])),
        Err(err) => Ok(Value::values(vec![
            Value::Boolean(false),
            Value::Str(err.root_message()),
        ])),
    }
}

/// Like `pcall`, but a failure message is passed through the handler first.
pub fn native_xpcall(evaluator: &mut Evaluator, args: &[Value]) -> Result<Value, RuntimeError> {
    let func = arg_at("xpcall", args, 0)?.clone();
    let handler = arg_at("xpcall", args, 1)?.clone();
    match evaluator.call_value(&func, &args[2..]) {
        Ok(value) => Ok(Value::values(vec![
            Value::Boolean(true),
            value.first_value(),
        ])),
        Err(err) => {
            let message = Value::Str(err.root_message());
            let handled = evaluator.call_value(&handler, &[message])?.first_value();
            Ok(Value::values(vec![Value::Boolean(false), handled]))
        }
    }
}

// ============================================================================
// Plain natives
// ============================================================================

/// Returns its first argument when truthy; raises otherwise.
pub fn native_assert(args: &[Value]) -> Result<Value, RuntimeError> {
    let value = arg_at("assert", args, 0)?;
    if value.is_truthy() {
        return Ok(value.clone());
    }
    let message = match args.get(1) {
        Some(message) => message.to_text(),
        None => "assertion failed!".to_string(),
    };
    Err(RuntimeError::Custom(message))
}

/// Raises a runtime error carrying the stringified argument.
pub fn native_error(args: &[Value]) -> Result<Value, RuntimeError> {
    let message = args.first().map(Value::to_text).unwrap_or_default();
    Err(RuntimeError::Custom(message))
}

pub fn native_type(args: &[Value]) -> Result<Value, RuntimeError> {
    let value = arg_at("type", args, 0)?;
    Ok(Value::Str(value.type_name().to_string()))
}

pub fn native_tonumber(args: &[Value]) -> Result<Value, RuntimeError> {
    let value = arg_at("tonumber", args, 0)?;
    Ok(match value {
        Value::Integer(_) | Value::Float(_) => value.clone(),
        Value::Str(s) => {
            let text = s.trim();
            if let Ok(n) = text.parse::<i64>() {
                Value::Integer(n)
            } else if let Ok(f) = text.parse::<f64>() {
                Value::Float(f)
            } else {
                Value::Nil
            }
        }
        _ => Value::Nil,
    })
}

pub fn native_tostring(args: &[Value]) -> Result<Value, RuntimeError> {
    let value = arg_at("tostring", args, 0)?;
    Ok(Value::Str(value.to_text()))
}

/// Iteration over an array table: `(i, v)` from a start index (default 1)
/// while entries are present.
pub fn native_ipairs(args: &[Value]) -> Result<Value, RuntimeError> {
    let table = table_arg("ipairs", args, 0)?;
    if !table.borrow().is_array() {
        return Err(type_mismatch("ipairs", "array table", arg_at("ipairs", args, 0)?, 0));
    }
    let start = match args.get(1) {
        Some(_) => int_arg("ipairs", args, 1)?,
        None => 1,
    };
    let mut items = Vec::new();
    let mut index = start;
    loop {
        let value = table.borrow().get(&Value::Integer(index))?;
        if matches!(value, Value::Nil) {
            break;
        }
        items.push((Value::Integer(index), value));
        index += 1;
    }
    Ok(Value::pairs(items))
}

/// Iteration over a dictionary table: `(k, v)` in insertion order.
pub fn native_pairs(args: &[Value]) -> Result<Value, RuntimeError> {
    let table = table_arg("pairs", args, 0)?;
    let table = table.borrow();
    if table.is_array() {
        return Err(type_mismatch("pairs", "dictionary table", arg_at("pairs", args, 0)?, 0));
    }
    Ok(Value::pairs(table.entries().to_vec()))
}

/// Steps through a table's entries: `next(t)` yields the first key/value
/// pair, `next(t, k)` the pair after `k`, nil at the end.
pub fn native_next(args: &[Value]) -> Result<Value, RuntimeError> {
    let table = table_arg("next", args, 0)?;
    let table = table.borrow();
    let entries = table.entries();
    let position = match args.get(1) {
        None | Some(Value::Nil) => 0,
        Some(key) => match entries.iter().position(|(k, _)| k == key) {
            Some(found) => found + 1,
            None => {
                return Err(RuntimeError::invalid_op(
                    "next: key is not present in the table",
                ))
            }
        },
    };
    Ok(match entries.get(position) {
        Some((key, value)) => Value::values(vec![key.clone(), value.clone()]),
        None => Value::Nil,
    })
}

/// `select("#", ...)` counts the remaining arguments; `select(n, ...)`
/// returns the n-th of them.
pub fn native_select(args: &[Value]) -> Result<Value, RuntimeError> {
    match arg_at("select", args, 0)? {
        Value::Str(s) if s == "#" => Ok(Value::Integer(args.len() as i64 - 1)),
        Value::Integer(n) if *n >= 1 => Ok(args.get(*n as usize).cloned().unwrap_or(Value::Nil)),
        Value::Integer(_) => Err(RuntimeError::invalid_op("select: index out of range")),
        other => Err(type_mismatch("select", "index or '#'", other, 0)),
    }
}

pub fn native_rawget(args: &[Value]) -> Result<Value, RuntimeError> {
    let table = table_arg("rawget", args, 0)?;
    let key = arg_at("rawget", args, 1)?;
    let result = table.borrow().get(key);
    result
}

pub fn native_rawset(args: &[Value]) -> Result<Value, RuntimeError> {
    let table = table_arg("rawset", args, 0)?;
    let key = arg_at("rawset", args, 1)?.clone();
    let value = arg_at("rawset", args, 2)?.clone();
    table.borrow_mut().set(key, value)?;
    Ok(args[0].clone())
}

/// Metatables are not part of this language; the table passes through.
pub fn native_setmetatable(args: &[Value]) -> Result<Value, RuntimeError> {
    table_arg("setmetatable", args, 0)?;
    Ok(args[0].clone())
}

pub fn native_getmetatable(args: &[Value]) -> Result<Value, RuntimeError> {
    arg_at("getmetatable", args, 0)?;
    Ok(Value::Nil)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Table;

    #[test]
    fn test_type_names() {
        assert_eq!(
            native_type(&[Value::Integer(1)]).unwrap(),
            Value::Str("number".to_string())
        );
        assert_eq!(
            native_type(&[Value::Nil]).unwrap(),
            Value::Str("nil".to_string())
        );
        assert_eq!(
            native_type(&[Value::table(Table::new_array())]).unwrap(),
            Value::Str("table".to_string())
        );
    }

    #[test]
    fn test_tonumber_parses_strings() {
        assert_eq!(
            native_tonumber(&[Value::Str("42".to_string())]).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            native_tonumber(&[Value::Str("2.5".to_string())]).unwrap(),
            Value::Float(2.5)
        );
        assert_eq!(
            native_tonumber(&[Value::Str("nope".to_string())]).unwrap(),
            Value::Nil
        );
    }

    #[test]
    fn test_assert_passes_value_through() {
        assert_eq!(
            native_assert(&[Value::Integer(5)]).unwrap(),
            Value::Integer(5)
        );
        let err = native_assert(&[Value::Boolean(false)]).unwrap_err();
        assert_eq!(err.to_string(), "assertion failed!");
        let err =
            native_assert(&[Value::Nil, Value::Str("custom".to_string())]).unwrap_err();
        assert_eq!(err.to_string(), "custom");
    }

    #[test]
    fn test_ipairs_stops_at_gap() {
        let mut t = Table::new_array();
        t.push(Value::Integer(10));
        t.push(Value::Integer(20));
        let result = native_ipairs(&[Value::table(t)]).unwrap();
        let Value::Pairs(items) = result else {
            panic!("expected pairs");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].0, Value::Integer(1));
        assert_eq!(items[1].1, Value::Integer(20));
    }

    #[test]
    fn test_pairs_requires_dictionary() {
        let err = native_pairs(&[Value::table(Table::new_array())]).unwrap_err();
        assert!(err.to_string().contains("dictionary"));
    }

    #[test]
    fn test_next_walks_entries() {
        let mut t = Table::new_dict();
        t.set(Value::Str("a".to_string()), Value::Integer(1)).unwrap();
        t.set(Value::Str("b".to_string()), Value::Integer(2)).unwrap();
        let table = Value::table(t);

        let first = native_next(&[table.clone()]).unwrap();
        let Value::Values(pair) = &first else {
            panic!("expected values");
        };
        assert_eq!(pair[0], Value::Str("a".to_string()));

        let second = native_next(&[table.clone(), pair[0].clone()]).unwrap();
        let Value::Values(pair) = &second else {
            panic!("expected values");
        };
        assert_eq!(pair[0], Value::Str("b".to_string()));

        let done = native_next(&[table, pair[0].clone()]).unwrap();
        assert_eq!(done, Value::Nil);
    }

    #[test]
    fn test_select_count_and_index() {
        let args = [
            Value::Str("#".to_string()),
            Value::Integer(10),
            Value::Integer(20),
        ];
        assert_eq!(native_select(&args).unwrap(), Value::Integer(2));

        let args = [Value::Integer(2), Value::Integer(10), Value::Integer(20)];
        assert_eq!(native_select(&args).unwrap(), Value::Integer(20));
    }

    #[test]
    fn test_metatable_stubs() {
        let t = Value::table(Table::new_dict());
        assert_eq!(native_setmetatable(&[t.clone(), Value::Nil]).unwrap(), t);
        assert_eq!(native_getmetatable(&[t]).unwrap(), Value::Nil);
    }
}
