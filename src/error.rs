// ABOUTME: Error types for lexing, parsing, and evaluation failures

use crate::config::{MAX_CALL_DEPTH, MAX_LOOP_ITERATIONS};
use crate::value::Value;
use std::fmt;
use thiserror::Error;

/// Fatal lexer or parser error, pinned to a source line.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} at line {line}\n-> {line}: {source_line}")]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub source_line: String,
}

impl SyntaxError {
    /// Build an error for `line`, extracting the offending line text from `source`.
    pub fn at(message: impl Into<String>, line: usize, source: &str) -> Self {
        SyntaxError {
            message: message.into(),
            line,
            source_line: line_text(source, line),
        }
    }
}

/// Runtime error kinds raised by the evaluator and native functions.
#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    #[error("variable '{0}' is not declared")]
    VariableNotDeclared(String),

    #[error("function '{0}' is not declared")]
    FunctionNotDeclared(String),

    /// Arity mismatch on a user-function call.
    #[error("{name}: expected {expected} argument{}, got {actual}", if *.expected == 1 { "" } else { "s" })]
    FunctionArgumentError {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Operator or operation applied to incompatible value types.
    #[error("{0}")]
    InvalidOperation(String),

    #[error("loop exceeded the maximum of {MAX_LOOP_ITERATIONS} iterations")]
    MaximumLoopError,

    #[error("call depth exceeded the maximum of {MAX_CALL_DEPTH}")]
    MaximumRecursionError,

    #[error("{0}")]
    ImportError(String),

    /// A blocked library member was accessed.
    #[error("'{library}.{method}' is not permitted in the sandbox")]
    PermissionError { library: String, method: String },

    /// Script-raised error (`error`, failed `assert`).
    #[error("{0}")]
    Custom(String),

    /// A runtime failure wrapped with the AST node and source-line context.
    #[error("{0}")]
    Chained(Box<ChainedError>),
}

impl RuntimeError {
    pub fn invalid_op(message: impl Into<String>) -> Self {
        RuntimeError::InvalidOperation(message.into())
    }

    /// Type mismatch phrased the way script authors expect to read it.
    pub fn type_error(action: &str, value: &Value) -> Self {
        RuntimeError::InvalidOperation(format!(
            "attempt to {} a {} value",
            action,
            value.type_name()
        ))
    }

    pub fn arity(name: &str, expected: usize, actual: usize) -> Self {
        RuntimeError::FunctionArgumentError {
            name: name.to_string(),
            expected,
            actual,
        }
    }

    /// Wrap with evaluation context unless the error already carries some.
    pub fn chain(self, node_kind: &'static str, line: usize, source: &str) -> Self {
        if matches!(self, RuntimeError::Chained(_)) {
            return self;
        }
        RuntimeError::Chained(Box::new(ChainedError {
            line,
            node_kind,
            source_line: line_text(source, line),
            cause: self,
        }))
    }

    /// The innermost error in a chain.
    pub fn root(&self) -> &RuntimeError {
        match self {
            RuntimeError::Chained(chained) => chained.cause.root(),
            other => other,
        }
    }

    /// Message of the innermost error, as handed to `pcall` handlers.
    pub fn root_message(&self) -> String {
        self.root().to_string()
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            RuntimeError::VariableNotDeclared(_) => "VariableNotDeclared",
            RuntimeError::FunctionNotDeclared(_) => "FunctionNotDeclared",
            RuntimeError::FunctionArgumentError { .. } => "FunctionArgumentError",
            RuntimeError::InvalidOperation(_) => "InvalidOperation",
            RuntimeError::MaximumLoopError => "MaximumLoopError",
            RuntimeError::MaximumRecursionError => "MaximumRecursionError",
            RuntimeError::ImportError(_) => "ImportError",
            RuntimeError::PermissionError { .. } => "PermissionError",
            RuntimeError::Custom(_) => "RuntimeError",
            RuntimeError::Chained(_) => "ChainedError",
        }
    }
}

/// Context wrapper produced at the failing AST node: the cause plus the
/// node kind, line, and offending source line.
#[derive(Debug, Clone)]
pub struct ChainedError {
    pub line: usize,
    pub node_kind: &'static str,
    pub source_line: String,
    pub cause: RuntimeError,
}

impl fmt::Display for ChainedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.cause.root_message();
        write!(
            f,
            "{} at line {} ({})\n-> {}: {}\n{}: {}",
            message,
            self.line,
            self.node_kind,
            self.line,
            self.source_line,
            self.cause.root().kind_name(),
            message
        )
    }
}

/// Top-level failure returned by the embedding surface.
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("{0}")]
    Runtime(#[from] RuntimeError),
}

/// The text of a 1-based source line, for diagnostics.
pub(crate) fn line_text(source: &str, line: usize) -> String {
    source
        .lines()
        .nth(line.saturating_sub(1))
        .unwrap_or("")
        .trim_end()
        .to_string()
}
