//! The `table` library: insert, remove, sort, concat.
//!
//! All four operate on array tables and keep the 1..n key numbering
//! intact after structural changes.

use super::{arg_at, int_arg, opt_int_arg, table_arg, type_mismatch};
use crate::error::RuntimeError;
use crate::eval::Evaluator;
use crate::library::Library;
use crate::value::{Table, Value};
use std::cell::RefCell;
use std::rc::Rc;

pub fn library() -> Library {
    Library::new("table")
        .method("insert", native_insert)
        .method("remove", native_remove)
        .context_method("sort", native_sort)
        .method("concat", native_concat)
}

fn array_arg(function: &str, args: &[Value]) -> Result<Rc<RefCell<Table>>, RuntimeError> {
    let table = table_arg(function, args, 0)?;
    if !table.borrow().is_array() {
        return Err(type_mismatch(
            function,
            "array table",
            arg_at(function, args, 0)?,
            0,
        ));
    }
    Ok(table)
}

/// `insert(t, v)` appends; `insert(t, pos, v)` shifts entries right.
fn native_insert(args: &[Value]) -> Result<Value, RuntimeError> {
    let table = array_arg("insert", args)?;
    let mut values = table.borrow().array_values();
    match args.len() {
        2 => values.push(args[1].clone()),
        3 => {
            let position = int_arg("insert", args, 1)?;
            if position < 1 || position > values.len() as i64 + 1 {
                return Err(RuntimeError::invalid_op("insert: position out of bounds"));
            }
            values.insert(position as usize - 1, args[2].clone());
        }
        n => return Err(RuntimeError::arity("insert", 2, n)),
    }
    table.borrow_mut().set_array_values(values);
    Ok(Value::Nil)
}

/// `remove(t)` pops the last entry; `remove(t, pos)` shifts entries left.
/// Returns the removed value.
fn native_remove(args: &[Value]) -> Result<Value, RuntimeError> {
    let table = array_arg("remove", args)?;
    let mut values = table.borrow().array_values();
    if values.is_empty() {
        return Ok(Value::Nil);
    }
    let position = opt_int_arg("remove", args, 1)?.unwrap_or(values.len() as i64);
    if position < 1 || position > values.len() as i64 {
        return Err(RuntimeError::invalid_op("remove: position out of bounds"));
    }
    let removed = values.remove(position as usize - 1);
    table.borrow_mut().set_array_values(values);
    Ok(removed)
}

/// In-place sort. With a comparator the script function decides ordering;
/// without one, numbers and strings sort naturally.
fn native_sort(evaluator: &mut Evaluator, args: &[Value]) -> Result<Value, RuntimeError> {
    let table = array_arg("sort", args)?;
    let comparator = args.get(1).cloned();
    let mut values = table.borrow().array_values();

    // Insertion sort: the comparator is a script callback that may fail,
    // which rules out sort_by.
    for i in 1..values.len() {
        let mut j = i;
        while j > 0 {
            let before = match &comparator {
                Some(func) => evaluator
                    .call_value(func, &[values[j].clone(), values[j - 1].clone()])?
                    .is_truthy(),
                None => natural_less(&values[j], &values[j - 1])?,
            };
            if !before {
                break;
            }
            values.swap(j, j - 1);
            j -= 1;
        }
    }
    table.borrow_mut().set_array_values(values);
    Ok(Value::Nil)
}

fn natural_less(a: &Value, b: &Value) -> Result<bool, RuntimeError> {
    match (a, b) {
        (Value::Str(a), Value::Str(b)) => Ok(a < b),
        _ => match (a.as_number(), b.as_number()) {
            (Some(a), Some(b)) => Ok(a < b),
            _ => Err(RuntimeError::invalid_op(format!(
                "sort: attempt to compare {} with {}",
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

/// `concat(t [, sep [, i [, j]]])` joins stringified entries.
fn native_concat(args: &[Value]) -> Result<Value, RuntimeError> {
    let table = array_arg("concat", args)?;
    let values = table.borrow().array_values();
    let separator = match args.get(1) {
        None | Some(Value::Nil) => String::new(),
        Some(Value::Str(s)) => s.clone(),
        Some(other) => return Err(type_mismatch("concat", "string", other, 1)),
    };
    let from = opt_int_arg("concat", args, 2)?.unwrap_or(1).max(1);
    let to = opt_int_arg("concat", args, 3)?.unwrap_or(values.len() as i64);
    let to = to.min(values.len() as i64);
    if from > to {
        return Ok(Value::Str(String::new()));
    }
    let joined = values[from as usize - 1..to as usize]
        .iter()
        .map(Value::to_text)
        .collect::<Vec<_>>()
        .join(&separator);
    Ok(Value::Str(joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array(items: &[i64]) -> Value {
        let mut table = Table::new_array();
        for item in items {
            table.push(Value::Integer(*item));
        }
        Value::table(table)
    }

    fn array_items(value: &Value) -> Vec<Value> {
        match value {
            Value::Table(t) => t.borrow().array_values(),
            _ => panic!("expected table"),
        }
    }

    #[test]
    fn test_insert_appends_and_shifts() {
        let t = array(&[1, 2]);
        native_insert(&[t.clone(), Value::Integer(3)]).unwrap();
        assert_eq!(
            array_items(&t),
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );

        native_insert(&[t.clone(), Value::Integer(1), Value::Integer(0)]).unwrap();
        assert_eq!(array_items(&t)[0], Value::Integer(0));
        assert_eq!(array_items(&t).len(), 4);
    }

    #[test]
    fn test_remove_returns_value_and_renumbers() {
        let t = array(&[10, 20, 30]);
        let removed = native_remove(&[t.clone(), Value::Integer(2)]).unwrap();
        assert_eq!(removed, Value::Integer(20));
        let items = array_items(&t);
        assert_eq!(items, vec![Value::Integer(10), Value::Integer(30)]);

        let removed = native_remove(&[t.clone()]).unwrap();
        assert_eq!(removed, Value::Integer(30));

        let Value::Table(inner) = &t else { panic!() };
        assert_eq!(
            inner.borrow().get(&Value::Integer(1)).unwrap(),
            Value::Integer(10)
        );
    }

    #[test]
    fn test_remove_from_empty_is_nil() {
        let t = array(&[]);
        assert_eq!(native_remove(&[t]).unwrap(), Value::Nil);
    }

    #[test]
    fn test_concat_with_separator_and_range() {
        let t = array(&[1, 2, 3, 4]);
        assert_eq!(
            native_concat(&[t.clone(), Value::Str("-".to_string())]).unwrap(),
            Value::Str("1-2-3-4".to_string())
        );
        assert_eq!(
            native_concat(&[
                t,
                Value::Str(",".to_string()),
                Value::Integer(2),
                Value::Integer(3)
            ])
            .unwrap(),
            Value::Str("2,3".to_string())
        );
    }

    #[test]
    fn test_insert_rejects_dictionary() {
        let t = Value::table(Table::new_dict());
        assert!(native_insert(&[t, Value::Integer(1)]).is_err());
    }
}
