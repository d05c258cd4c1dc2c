//! # Built-in Globals and Host Libraries
//!
//! The fixed bindings every interpreter starts with, organized by module:
//!
//! - **[globals]**: `print`, `require`, `pcall`, `xpcall`, `assert`,
//!   `error`, `type`, `tonumber`, `tostring`, `ipairs`, `pairs`, `next`,
//!   `select`, `rawget`, `rawset`, `setmetatable`, `getmetatable`
//! - **[strings]**: the `string` library, including the pattern subset
//! - **[tables]**: the `table` library (insert, remove, sort, concat)
//! - **[math]**: numeric functions and constants
//! - **[os]**: the clock/date allowlist with everything else blocked
//! - **[restricted]**: `io`, `coroutine`, and `package`, fully blocked
//!
//! Each module exposes either a `register` function (globals) or a
//! `library()` builder returning the assembled [`crate::library::Library`].

use crate::error::RuntimeError;
use crate::eval::Evaluator;
use crate::value::{Table, Value};
use std::cell::RefCell;
use std::rc::Rc;

pub mod globals;
pub mod math;
pub mod os;
pub mod restricted;
pub mod strings;
pub mod tables;

/// Install every built-in binding into a fresh or reset environment.
pub fn install(evaluator: &mut Evaluator) {
    globals::register(evaluator);
    evaluator.define_library(strings::library());
    evaluator.define_library(tables::library());
    evaluator.define_library(math::library());
    evaluator.define_library(os::library());
    evaluator.define_library(restricted::io_library());
    evaluator.define_library(restricted::coroutine_library());
    evaluator.define_library(restricted::package_library());
}

// ============================================================================
// Argument extraction shared by the built-in modules
// ============================================================================

pub(crate) fn type_mismatch(
    function: &str,
    expected: &str,
    actual: &Value,
    position: usize,
) -> RuntimeError {
    RuntimeError::invalid_op(format!(
        "{}: expected {}, got {} at argument {}",
        function,
        expected,
        actual.type_name(),
        position + 1
    ))
}

pub(crate) fn arg_at<'a>(
    function: &str,
    args: &'a [Value],
    position: usize,
) -> Result<&'a Value, RuntimeError> {
    args.get(position)
        .ok_or_else(|| RuntimeError::arity(function, position + 1, args.len()))
}

pub(crate) fn string_arg<'a>(
    function: &str,
    args: &'a [Value],
    position: usize,
) -> Result<&'a str, RuntimeError> {
    match arg_at(function, args, position)? {
        Value::Str(s) => Ok(s),
        other => Err(type_mismatch(function, "string", other, position)),
    }
}

pub(crate) fn table_arg(
    function: &str,
    args: &[Value],
    position: usize,
) -> Result<Rc<RefCell<Table>>, RuntimeError> {
    match arg_at(function, args, position)? {
        Value::Table(table) => Ok(table.clone()),
        other => Err(type_mismatch(function, "table", other, position)),
    }
}

pub(crate) fn number_arg(
    function: &str,
    args: &[Value],
    position: usize,
) -> Result<f64, RuntimeError> {
    let value = arg_at(function, args, position)?;
    value
        .as_number()
        .ok_or_else(|| type_mismatch(function, "number", value, position))
}

/// An integer-valued argument; integral floats are accepted.
pub(crate) fn int_arg(
    function: &str,
    args: &[Value],
    position: usize,
) -> Result<i64, RuntimeError> {
    match arg_at(function, args, position)? {
        Value::Integer(n) => Ok(*n),
        Value::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
        other => Err(type_mismatch(function, "integer", other, position)),
    }
}

pub(crate) fn opt_int_arg(
    function: &str,
    args: &[Value],
    position: usize,
) -> Result<Option<i64>, RuntimeError> {
    match args.get(position) {
        None | Some(Value::Nil) => Ok(None),
        Some(_) => int_arg(function, args, position).map(Some),
    }
}
