// ABOUTME: Tree-walking evaluator: variables, control flow, calls, and host libraries

use crate::ast::{BinaryOp, ForRange, Literal, Node, NodeKind, TableKey, UnaryOp};
use crate::config::{MAX_CALL_DEPTH, MAX_LOOP_ITERATIONS};
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::library::{Library, NativeKind};
use crate::stdlib;
use crate::value::{FunctionValue, Table, Value};
use std::rc::Rc;

/// Executes a parsed program against per-interpreter state: the active
/// environment, the frame stack for calls, the captured log buffer, the
/// pending return slot, and the libraries registered for `require`.
pub struct Evaluator {
    env: Environment,
    env_stack: Vec<Environment>,
    logs: String,
    return_value: Option<Value>,
    break_flag: bool,
    libraries: Vec<Rc<Library>>,
    source: String,
}

impl Evaluator {
    /// Build an evaluator with native globals and the fixed library set
    /// installed; `libraries` become available to scripts via `require`.
    pub fn new(libraries: Vec<Library>) -> Self {
        let mut evaluator = Evaluator {
            env: Environment::new(),
            env_stack: Vec::new(),
            logs: String::new(),
            return_value: None,
            break_flag: false,
            libraries: libraries.into_iter().map(Rc::new).collect(),
            source: String::new(),
        };
        stdlib::install(&mut evaluator);
        evaluator
    }

    /// Retain the source text of the program about to run, for error context.
    pub fn set_source(&mut self, source: &str) {
        self.source = source.to_string();
    }

    pub fn logs(&self) -> &str {
        &self.logs
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    /// Drop all user definitions and reinstall natives and libraries.
    pub fn reset_environment(&mut self) {
        self.env.clear();
        self.env_stack.clear();
        self.return_value = None;
        self.break_flag = false;
        stdlib::install(self);
    }

    pub(crate) fn push_log(&mut self, text: &str) {
        self.logs.push_str(text);
    }

    pub(crate) fn env(&self) -> &Environment {
        &self.env
    }

    pub(crate) fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Install a library binding in the environment.
    pub(crate) fn define_library(&mut self, library: Library) {
        let name = library.name().to_string();
        self.env.define(name, Value::Library(Rc::new(library)));
    }

    pub(crate) fn registered_library(&self, name: &str) -> Option<Rc<Library>> {
        self.libraries.iter().find(|l| l.name() == name).cloned()
    }

    /// Run a program root. The result is the pending return value if the
    /// script returned one, otherwise the value of the last statement.
    pub fn run(&mut self, root: &Node) -> Result<Value, RuntimeError> {
        self.return_value = None;
        self.break_flag = false;
        match self.eval(root) {
            Ok(value) => {
                if self.break_flag {
                    self.break_flag = false;
                    return Err(RuntimeError::invalid_op("'break' outside of a loop"));
                }
                Ok(self.return_value.take().unwrap_or(value))
            }
            Err(err) => {
                self.return_value = None;
                self.break_flag = false;
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Evaluate one node, wrapping any failure with the node's context.
    pub(crate) fn eval(&mut self, node: &Node) -> Result<Value, RuntimeError> {
        self.eval_unwrapped(node)
            .map_err(|err| err.chain(node.kind.name(), node.line, &self.source))
    }

    /// Evaluate an expression, collapsing multi-values to one value.
    fn eval_scalar(&mut self, node: &Node) -> Result<Value, RuntimeError> {
        self.eval(node).map(Value::first_value)
    }

    fn eval_unwrapped(&mut self, node: &Node) -> Result<Value, RuntimeError> {
        match &node.kind {
            NodeKind::Root { body } => self.eval_block(body),
            NodeKind::Literal(literal) => Ok(literal_value(literal)),
            NodeKind::Table { entries, is_array } => self.eval_table(entries, *is_array),
            NodeKind::VariableDeclaration { names, value } => {
                self.eval_declaration(names, value.as_deref())
            }
            NodeKind::VariableAssignment { name, index, value } => {
                self.eval_assignment(name, index.as_deref(), value)
            }
            NodeKind::VariableReference { name, index } => {
                self.eval_reference(name, index.as_deref())
            }
            NodeKind::UnaryOperation { operator, operand } => self.eval_unary(*operator, operand),
            NodeKind::BinaryOperation {
                left,
                operator,
                right,
            } => self.eval_binary(left, *operator, right),
            NodeKind::TernaryOperation {
                condition,
                true_expr,
                false_expr,
            } => {
                if self.eval_scalar(condition)?.is_truthy() {
                    self.eval_scalar(true_expr)
                } else {
                    self.eval_scalar(false_expr)
                }
            }
            NodeKind::IfStatement {
                condition,
                then_branch,
                elseif_branches,
                else_branch,
            } => self.eval_if(condition, then_branch, elseif_branches, else_branch),
            NodeKind::ForStatement {
                var_names,
                range,
                body,
            } => self.eval_for(var_names, range, body),
            NodeKind::WhileStatement { condition, body } => self.eval_while(condition, body),
            NodeKind::BreakStatement => {
                self.break_flag = true;
                Ok(Value::Nil)
            }
            NodeKind::FunctionDeclaration { name, params, body } => {
                let function = Value::Function(Rc::new(FunctionValue {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                }));
                if let Some(name) = name {
                    self.env.define(name.clone(), function.clone());
                }
                Ok(function)
            }
            NodeKind::FunctionCall { name, arguments } => self.eval_function_call(name, arguments),
            NodeKind::ReturnStatement { value } => {
                let result = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Nil,
                };
                self.return_value = Some(result);
                Ok(Value::Nil)
            }
            NodeKind::Object { name } => self
                .env
                .get(name)
                .ok_or_else(|| RuntimeError::FunctionNotDeclared(name.clone())),
            NodeKind::MethodChain { name, parent } => self.eval_method_chain(name, parent),
            NodeKind::MethodCall {
                name,
                parent,
                arguments,
            } => self.eval_method_call(name, parent, arguments),
        }
    }

    /// Run statements in order, stopping early on a pending return or break.
    fn eval_block(&mut self, statements: &[Node]) -> Result<Value, RuntimeError> {
        let mut last = Value::Nil;
        for statement in statements {
            last = self.eval(statement)?;
            if self.return_value.is_some() || self.break_flag {
                break;
            }
        }
        Ok(last)
    }

    // ------------------------------------------------------------------
    // Variables and tables
    // ------------------------------------------------------------------

    fn eval_declaration(
        &mut self,
        names: &[String],
        value: Option<&Node>,
    ) -> Result<Value, RuntimeError> {
        let value = match value {
            Some(expr) => self.eval(expr)?,
            None => Value::Nil,
        };
        if names.len() == 1 {
            self.env.define(names[0].clone(), value.first_value());
            return Ok(Value::Nil);
        }
        // Several names destructure one multi-valued initializer.
        match value {
            Value::Values(items) => {
                for (i, name) in names.iter().enumerate() {
                    let item = items.get(i).cloned().unwrap_or(Value::Nil);
                    self.env.define(name.clone(), item);
                }
            }
            single => {
                self.env.define(names[0].clone(), single);
                for name in &names[1..] {
                    self.env.define(name.clone(), Value::Nil);
                }
            }
        }
        Ok(Value::Nil)
    }

    fn eval_assignment(
        &mut self,
        name: &str,
        index: Option<&Node>,
        value: &Node,
    ) -> Result<Value, RuntimeError> {
        let value = self.eval_scalar(value)?;
        match index {
            None => {
                self.env.assign(name, value)?;
            }
            Some(index) => {
                let target = self
                    .env
                    .get(name)
                    .ok_or_else(|| RuntimeError::VariableNotDeclared(name.to_string()))?;
                let key = self.eval_scalar(index)?;
                match target {
                    Value::Table(table) => table.borrow_mut().set(key, value)?,
                    other => return Err(RuntimeError::type_error("index", &other)),
                }
            }
        }
        Ok(Value::Nil)
    }

    fn eval_reference(
        &mut self,
        name: &str,
        index: Option<&Node>,
    ) -> Result<Value, RuntimeError> {
        let value = self
            .env
            .get(name)
            .ok_or_else(|| RuntimeError::VariableNotDeclared(name.to_string()))?;
        match index {
            None => Ok(value),
            Some(index) => {
                let key = self.eval_scalar(index)?;
                match value {
                    Value::Table(table) => table.borrow().get(&key),
                    other => Err(RuntimeError::type_error("index", &other)),
                }
            }
        }
    }

    fn eval_table(
        &mut self,
        entries: &[(TableKey, Node)],
        is_array: bool,
    ) -> Result<Value, RuntimeError> {
        let mut table = if is_array {
            Table::new_array()
        } else {
            Table::new_dict()
        };
        for (key, value_node) in entries {
            let value = self.eval_scalar(value_node)?;
            let key = match (key, is_array) {
                (TableKey::Index(i), true) => Value::Integer(*i),
                (TableKey::Name(name), false) => Value::Str(name.clone()),
                _ => {
                    return Err(RuntimeError::invalid_op(
                        "cannot mix array and named entries in one table",
                    ))
                }
            };
            table.set(key, value)?;
        }
        Ok(Value::table(table))
    }

    // ------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------

    fn eval_unary(&mut self, operator: UnaryOp, operand: &Node) -> Result<Value, RuntimeError> {
        let value = self.eval_scalar(operand)?;
        match operator {
            UnaryOp::Minus => match value {
                Value::Integer(n) => Ok(Value::Integer(n.wrapping_neg())),
                Value::Float(n) => Ok(Value::Float(-n)),
                other => Err(RuntimeError::type_error("negate", &other)),
            },
            UnaryOp::Not => Ok(Value::Boolean(!value.is_truthy())),
            UnaryOp::Length => match &value {
                Value::Table(table) => Ok(Value::Integer(table.borrow().len())),
                Value::Str(s) => Ok(Value::Integer(s.chars().count() as i64)),
                other => Err(RuntimeError::type_error("take the length of", other)),
            },
        }
    }

    fn eval_binary(
        &mut self,
        left: &Node,
        operator: BinaryOp,
        right: &Node,
    ) -> Result<Value, RuntimeError> {
        let left = self.eval_scalar(left)?;
        match operator {
            // `and`/`or` select an operand by truthiness.
            BinaryOp::And => {
                if left.is_truthy() {
                    self.eval_scalar(right)
                } else {
                    Ok(left)
                }
            }
            BinaryOp::Or => {
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval_scalar(right)
                }
            }
            _ => {
                let right = self.eval_scalar(right)?;
                apply_binary(operator, left, right)
            }
        }
    }

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------

    fn eval_if(
        &mut self,
        condition: &Node,
        then_branch: &[Node],
        elseif_branches: &[(Node, Vec<Node>)],
        else_branch: &[Node],
    ) -> Result<Value, RuntimeError> {
        if self.eval_scalar(condition)?.is_truthy() {
            self.eval_block(then_branch)?;
            return Ok(Value::Nil);
        }
        for (elseif_condition, branch) in elseif_branches {
            if self.eval_scalar(elseif_condition)?.is_truthy() {
                self.eval_block(branch)?;
                return Ok(Value::Nil);
            }
        }
        self.eval_block(else_branch)?;
        Ok(Value::Nil)
    }

    fn eval_while(&mut self, condition: &Node, body: &[Node]) -> Result<Value, RuntimeError> {
        let mut iterations = 0usize;
        while self.eval_scalar(condition)?.is_truthy() {
            iterations += 1;
            if iterations > MAX_LOOP_ITERATIONS {
                return Err(RuntimeError::MaximumLoopError);
            }
            self.eval_block(body)?;
            if self.break_flag {
                self.break_flag = false;
                break;
            }
            if self.return_value.is_some() {
                break;
            }
        }
        Ok(Value::Nil)
    }

    fn eval_for(
        &mut self,
        var_names: &[String],
        range: &ForRange,
        body: &[Node],
    ) -> Result<Value, RuntimeError> {
        match range {
            ForRange::Numeric { start, end, step } => {
                self.eval_numeric_for(var_names, start, end, step.as_deref(), body)
            }
            ForRange::Generic { iterable } => self.eval_generic_for(var_names, iterable, body),
        }
    }

    fn eval_numeric_for(
        &mut self,
        var_names: &[String],
        start: &Node,
        end: &Node,
        step: Option<&Node>,
        body: &[Node],
    ) -> Result<Value, RuntimeError> {
        let start = self.eval_loop_bound(start, "start")?;
        let end = self.eval_loop_bound(end, "end")?;
        let step = match step {
            Some(node) => self.eval_loop_bound(node, "step")?,
            None => Value::Integer(1),
        };
        let var = var_names[0].clone();

        // Integer bounds iterate as integers so the loop variable prints
        // without a decimal point; any float bound promotes the whole loop.
        if let (Value::Integer(s), Value::Integer(e), Value::Integer(st)) = (&start, &end, &step) {
            let (s, e, st) = (*s, *e, *st);
            if st == 0 {
                return Err(RuntimeError::invalid_op("'for' step is zero"));
            }
            let mut i = s;
            let mut iterations = 0usize;
            while (st > 0 && i <= e) || (st < 0 && i >= e) {
                iterations += 1;
                if iterations > MAX_LOOP_ITERATIONS {
                    return Err(RuntimeError::MaximumLoopError);
                }
                self.env.define(var.clone(), Value::Integer(i));
                self.eval_block(body)?;
                if self.break_flag {
                    self.break_flag = false;
                    return Ok(Value::Nil);
                }
                if self.return_value.is_some() {
                    return Ok(Value::Nil);
                }
                i = match i.checked_add(st) {
                    Some(next) => next,
                    None => break,
                };
            }
            return Ok(Value::Nil);
        }

        let (s, e, st) = (
            start.as_number().unwrap_or(0.0),
            end.as_number().unwrap_or(0.0),
            step.as_number().unwrap_or(1.0),
        );
        if st == 0.0 {
            return Err(RuntimeError::invalid_op("'for' step is zero"));
        }
        let mut i = s;
        let mut iterations = 0usize;
        while (st > 0.0 && i <= e) || (st < 0.0 && i >= e) {
            iterations += 1;
            if iterations > MAX_LOOP_ITERATIONS {
                return Err(RuntimeError::MaximumLoopError);
            }
            self.env.define(var.clone(), Value::Float(i));
            self.eval_block(body)?;
            if self.break_flag {
                self.break_flag = false;
                break;
            }
            if self.return_value.is_some() {
                break;
            }
            i += st;
        }
        Ok(Value::Nil)
    }

    fn eval_loop_bound(&mut self, node: &Node, role: &str) -> Result<Value, RuntimeError> {
        let value = self.eval_scalar(node)?;
        match value {
            Value::Integer(_) | Value::Float(_) => Ok(value),
            other => Err(RuntimeError::invalid_op(format!(
                "'for' {} must be a number, got {}",
                role,
                other.type_name()
            ))),
        }
    }

    fn eval_generic_for(
        &mut self,
        var_names: &[String],
        iterable: &Node,
        body: &[Node],
    ) -> Result<Value, RuntimeError> {
        let iterable = self.eval_scalar(iterable)?;
        let items: Vec<(Value, Value)> = match &iterable {
            Value::Pairs(items) => items.as_ref().clone(),
            // Bare tables iterate their entries directly.
            Value::Table(table) => table.borrow().entries().to_vec(),
            other => return Err(RuntimeError::type_error("iterate", other)),
        };

        let mut iterations = 0usize;
        for (key, value) in items {
            iterations += 1;
            if iterations > MAX_LOOP_ITERATIONS {
                return Err(RuntimeError::MaximumLoopError);
            }
            self.env.define(var_names[0].clone(), key);
            if let Some(second) = var_names.get(1) {
                self.env.define(second.clone(), value);
            }
            self.eval_block(body)?;
            if self.break_flag {
                self.break_flag = false;
                break;
            }
            if self.return_value.is_some() {
                break;
            }
        }
        Ok(Value::Nil)
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    fn eval_function_call(
        &mut self,
        name: &str,
        arguments: &[Node],
    ) -> Result<Value, RuntimeError> {
        let callee = self
            .env
            .get(name)
            .ok_or_else(|| RuntimeError::FunctionNotDeclared(name.to_string()))?;
        let mut argv = Vec::with_capacity(arguments.len());
        for argument in arguments {
            argv.push(self.eval_scalar(argument)?);
        }
        self.call_value(&callee, &argv)
    }

    /// Apply any callable value: a native, or a user function with a fresh
    /// call frame. Used by call expressions and by `pcall`/`xpcall`.
    pub fn call_value(&mut self, callee: &Value, args: &[Value]) -> Result<Value, RuntimeError> {
        match callee {
            Value::Native(native) => match &native.kind {
                NativeKind::Plain(func) => (func.as_ref())(args),
                NativeKind::Context(func) => func(self, args),
            },
            Value::Function(func) => self.call_function(func.clone(), args),
            other => Err(RuntimeError::type_error("call", other)),
        }
    }

    fn call_function(
        &mut self,
        func: Rc<FunctionValue>,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        let name = func.name.clone().unwrap_or_else(|| "anonymous".to_string());
        if args.len() != func.params.len() {
            return Err(RuntimeError::arity(&name, func.params.len(), args.len()));
        }
        if self.env_stack.len() >= MAX_CALL_DEPTH {
            return Err(RuntimeError::MaximumRecursionError);
        }

        // Flat call frame: copy the caller environment, overlay parameters.
        let mut frame = self.env.clone();
        for (param, arg) in func.params.iter().zip(args) {
            frame.define(param.clone(), arg.clone());
        }
        let caller = std::mem::replace(&mut self.env, frame);
        self.env_stack.push(caller);

        let mut outcome = Ok(());
        for statement in func.body.iter() {
            if let Err(err) = self.eval(statement) {
                outcome = Err(err);
                break;
            }
            if self.return_value.is_some() {
                break;
            }
            if self.break_flag {
                outcome = Err(RuntimeError::invalid_op("'break' outside of a loop"));
                break;
            }
        }

        // Restore the caller frame whether or not the body failed.
        if let Some(caller) = self.env_stack.pop() {
            self.env = caller;
        }
        match outcome {
            Ok(()) => Ok(self.return_value.take().unwrap_or(Value::Nil)),
            Err(err) => {
                self.return_value = None;
                self.break_flag = false;
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Method chains against libraries
    // ------------------------------------------------------------------

    fn eval_method_chain(&mut self, name: &str, parent: &Node) -> Result<Value, RuntimeError> {
        let parent = self.eval(parent)?;
        let Value::Library(library) = &parent else {
            return Err(RuntimeError::type_error("access a member of", &parent));
        };
        if library.is_blocked(name) {
            return Err(library.permission_error(name));
        }
        if let Some(value) = library.attribute(name) {
            return Ok(value.clone());
        }
        if let Some(method) = library.get_method(name) {
            return Ok(Value::Native(method.clone()));
        }
        Err(RuntimeError::FunctionNotDeclared(format!(
            "{}.{}",
            library.name(),
            name
        )))
    }

    fn eval_method_call(
        &mut self,
        name: &str,
        parent: &Node,
        arguments: &[Node],
    ) -> Result<Value, RuntimeError> {
        let parent = self.eval(parent)?;
        let Value::Library(library) = &parent else {
            return Err(RuntimeError::type_error("call a method on", &parent));
        };
        if library.is_blocked(name) {
            return Err(library.permission_error(name));
        }
        let method = match library.get_method(name) {
            Some(method) => method.clone(),
            None => {
                if library.attribute(name).is_some() {
                    return Err(RuntimeError::invalid_op(format!(
                        "'{}.{}' is not callable",
                        library.name(),
                        name
                    )));
                }
                return Err(RuntimeError::FunctionNotDeclared(format!(
                    "{}.{}",
                    library.name(),
                    name
                )));
            }
        };

        let mut argv = Vec::with_capacity(arguments.len());
        for argument in arguments {
            argv.push(self.eval_scalar(argument)?);
        }
        match &method.kind {
            NativeKind::Plain(func) => (func.as_ref())(&argv),
            NativeKind::Context(func) => func(self, &argv),
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Nil => Value::Nil,
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Integer(n) => Value::Integer(*n),
        Literal::Float(n) => Value::Float(*n),
        Literal::Str(s) => Value::Str(s.clone()),
    }
}

fn apply_binary(operator: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match operator {
        BinaryOp::Add
        | BinaryOp::Subtract
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Modulo
        | BinaryOp::Power => arithmetic(operator, left, right),
        BinaryOp::Concat => Ok(Value::Str(format!("{}{}", left.to_text(), right.to_text()))),
        BinaryOp::Equal => Ok(Value::Boolean(left == right)),
        BinaryOp::NotEqual => Ok(Value::Boolean(left != right)),
        BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEqual | BinaryOp::GreaterEqual => {
            compare(operator, left, right)
        }
        BinaryOp::And | BinaryOp::Or => unreachable!("handled before operand evaluation"),
    }
}

fn arithmetic(operator: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    // Integer pairs stay integral except for `/` and `^`, which always
    // produce floats; any float operand promotes the result.
    if let (Value::Integer(a), Value::Integer(b)) = (&left, &right) {
        let (a, b) = (*a, *b);
        return match operator {
            BinaryOp::Add => Ok(Value::Integer(a.wrapping_add(b))),
            BinaryOp::Subtract => Ok(Value::Integer(a.wrapping_sub(b))),
            BinaryOp::Multiply => Ok(Value::Integer(a.wrapping_mul(b))),
            BinaryOp::Modulo => {
                if b == 0 {
                    Err(RuntimeError::invalid_op("attempt to perform 'n % 0'"))
                } else {
                    // Floor modulo: the sign follows the divisor.
                    Ok(Value::Integer(((a % b) + b) % b))
                }
            }
            BinaryOp::Divide => Ok(Value::Float(a as f64 / b as f64)),
            BinaryOp::Power => Ok(Value::Float((a as f64).powf(b as f64))),
            _ => unreachable!("not an arithmetic operator"),
        };
    }

    let (a, b) = match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => (a, b),
        (None, _) => return Err(RuntimeError::type_error("perform arithmetic on", &left)),
        (_, None) => return Err(RuntimeError::type_error("perform arithmetic on", &right)),
    };
    match operator {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Subtract => Ok(Value::Float(a - b)),
        BinaryOp::Multiply => Ok(Value::Float(a * b)),
        BinaryOp::Divide => Ok(Value::Float(a / b)),
        BinaryOp::Modulo => Ok(Value::Float(a - (a / b).floor() * b)),
        BinaryOp::Power => Ok(Value::Float(a.powf(b))),
        _ => unreachable!("not an arithmetic operator"),
    }
}

fn compare(operator: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    let ordering = match (&left, &right) {
        (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => {
                return Err(RuntimeError::invalid_op(format!(
                    "attempt to compare {} with {}",
                    left.type_name(),
                    right.type_name()
                )))
            }
        },
    };
    let result = match (operator, ordering) {
        (_, None) => false,
        (BinaryOp::Less, Some(ord)) => ord.is_lt(),
        (BinaryOp::Greater, Some(ord)) => ord.is_gt(),
        (BinaryOp::LessEqual, Some(ord)) => ord.is_le(),
        (BinaryOp::GreaterEqual, Some(ord)) => ord.is_ge(),
        _ => unreachable!("not a relational operator"),
    };
    Ok(Value::Boolean(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn run_source(evaluator: &mut Evaluator, source: &str) -> Result<Value, RuntimeError> {
        let tokens = tokenize(source).expect("tokenize failed");
        let root = parse(tokens, source).expect("parse failed");
        evaluator.set_source(source);
        evaluator.run(&root)
    }

    fn eval_source(source: &str) -> Result<Value, RuntimeError> {
        run_source(&mut Evaluator::new(Vec::new()), source)
    }

    #[test]
    fn test_integer_arithmetic_stays_integral() {
        assert_eq!(eval_source("return 1 + 2 * 3").unwrap(), Value::Integer(7));
        assert_eq!(eval_source("return 10 - 3").unwrap(), Value::Integer(7));
        assert_eq!(eval_source("return 7 % 3").unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_division_and_power_produce_floats() {
        assert_eq!(eval_source("return 10 / 4").unwrap(), Value::Float(2.5));
        assert_eq!(eval_source("return 2 ^ 3").unwrap(), Value::Float(8.0));
    }

    #[test]
    fn test_floor_modulo_sign() {
        assert_eq!(eval_source("return -5 % 3").unwrap(), Value::Integer(1));
        assert_eq!(eval_source("return 5 % -3").unwrap(), Value::Integer(-1));
    }

    #[test]
    fn test_and_or_select_operands() {
        assert_eq!(eval_source("return nil and 1").unwrap(), Value::Nil);
        assert_eq!(eval_source("return 1 and 2").unwrap(), Value::Integer(2));
        assert_eq!(eval_source("return false or 3").unwrap(), Value::Integer(3));
        assert_eq!(eval_source("return 4 or 5").unwrap(), Value::Integer(4));
    }

    #[test]
    fn test_concat_stringifies() {
        assert_eq!(
            eval_source("return 1 .. 2").unwrap(),
            Value::Str("12".to_string())
        );
    }

    #[test]
    fn test_undeclared_variable_read() {
        let err = eval_source("return missing").unwrap_err();
        assert!(matches!(
            err.root(),
            RuntimeError::VariableNotDeclared(name) if name == "missing"
        ));
    }

    #[test]
    fn test_assignment_requires_declaration() {
        let err = eval_source("x = 1").unwrap_err();
        assert!(matches!(err.root(), RuntimeError::VariableNotDeclared(_)));
    }

    #[test]
    fn test_elseif_branches_run_in_order() {
        let mut ev = Evaluator::new(Vec::new());
        run_source(
            &mut ev,
            "local x = 2\nif x == 1 then print(\"a\") elseif x == 2 then print(\"b\") elseif x == 3 then print(\"c\") else print(\"d\") end",
        )
        .unwrap();
        assert_eq!(ev.logs(), "b\n");
    }

    #[test]
    fn test_while_loop_cap() {
        let err = eval_source("while true do end").unwrap_err();
        assert!(matches!(err.root(), RuntimeError::MaximumLoopError));
    }

    #[test]
    fn test_numeric_for_cap() {
        let err = eval_source("for i = 1, 100000 do end").unwrap_err();
        assert!(matches!(err.root(), RuntimeError::MaximumLoopError));
    }

    #[test]
    fn test_zero_iterations_when_start_past_end() {
        let mut ev = Evaluator::new(Vec::new());
        run_source(&mut ev, "for i = 3, 1 do print(i) end").unwrap();
        assert_eq!(ev.logs(), "");
    }

    #[test]
    fn test_negative_step_counts_down() {
        let mut ev = Evaluator::new(Vec::new());
        run_source(&mut ev, "for i = 3, 1, -1 do print(i) end").unwrap();
        assert_eq!(ev.logs(), "3\n2\n1\n");
    }

    #[test]
    fn test_break_exits_loop() {
        let mut ev = Evaluator::new(Vec::new());
        run_source(
            &mut ev,
            "for i = 1, 10 do if i == 3 then break end print(i) end",
        )
        .unwrap();
        assert_eq!(ev.logs(), "1\n2\n");
    }

    #[test]
    fn test_break_outside_loop_fails() {
        let err = eval_source("break").unwrap_err();
        assert!(matches!(err.root(), RuntimeError::InvalidOperation(_)));
    }

    #[test]
    fn test_function_arity_checked() {
        let err = eval_source("function f(a, b) return a end\nf(1)").unwrap_err();
        assert!(matches!(
            err.root(),
            RuntimeError::FunctionArgumentError { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn test_environment_isolation() {
        let mut ev = Evaluator::new(Vec::new());
        run_source(
            &mut ev,
            "local x = 1\nfunction f() x = 99 local y = 5 end\nf()\nprint(x)",
        )
        .unwrap();
        assert_eq!(ev.logs(), "1\n");
        let err = run_source(&mut ev, "print(y)").unwrap_err();
        assert!(matches!(err.root(), RuntimeError::VariableNotDeclared(_)));
    }

    #[test]
    fn test_tables_cross_frames_by_reference() {
        let mut ev = Evaluator::new(Vec::new());
        run_source(
            &mut ev,
            "local t = {1}\nfunction f(u) u[1] = 42 end\nf(t)\nprint(t[1])",
        )
        .unwrap();
        assert_eq!(ev.logs(), "42\n");
    }

    #[test]
    fn test_recursion_depth_capped() {
        let err = eval_source("function f() return f() end\nf()").unwrap_err();
        assert!(matches!(err.root(), RuntimeError::MaximumRecursionError));
    }

    #[test]
    fn test_chained_error_carries_line() {
        let err = eval_source("local a = 1\nreturn a + missing").unwrap_err();
        match &err {
            RuntimeError::Chained(chained) => {
                assert_eq!(chained.line, 2);
                assert_eq!(chained.node_kind, "VariableReference");
            }
            other => panic!("expected chained error, got {:?}", other),
        }
    }

    #[test]
    fn test_method_chain_attribute_and_call() {
        let mut ev = Evaluator::new(Vec::new());
        run_source(&mut ev, "print(math.floor(math.pi))").unwrap();
        assert_eq!(ev.logs(), "3\n");
    }

    #[test]
    fn test_blocked_method_permission_error() {
        let err = eval_source("os.execute(\"rm -rf /\")").unwrap_err();
        assert!(matches!(err.root(), RuntimeError::PermissionError { .. }));
    }

    #[test]
    fn test_missing_library_member() {
        let err = eval_source("math.not_a_thing()").unwrap_err();
        assert!(matches!(err.root(), RuntimeError::FunctionNotDeclared(_)));
    }

    #[test]
    fn test_attribute_not_callable() {
        let err = eval_source("math.pi()").unwrap_err();
        assert!(matches!(err.root(), RuntimeError::InvalidOperation(_)));
    }

    #[test]
    fn test_ternary_selects_branch() {
        assert_eq!(
            eval_source("return 1 < 2 ? \"y\" : \"n\"").unwrap(),
            Value::Str("y".to_string())
        );
    }

    #[test]
    fn test_reset_environment_drops_user_state() {
        let mut ev = Evaluator::new(Vec::new());
        run_source(&mut ev, "local x = 1").unwrap();
        ev.reset_environment();
        let err = run_source(&mut ev, "return x").unwrap_err();
        assert!(matches!(err.root(), RuntimeError::VariableNotDeclared(_)));
        // Natives survive the reset.
        run_source(&mut ev, "print(type(1))").unwrap();
    }
}
