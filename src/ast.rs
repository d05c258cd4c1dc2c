// ABOUTME: Typed AST produced by the parser and walked by the evaluator

use std::fmt;
use std::rc::Rc;

/// An AST node: a variant plus the 1-based source line it begins on.
/// The root node uses line 0.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub line: usize,
}

impl Node {
    pub fn new(kind: NodeKind, line: usize) -> Self {
        Node { kind, line }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Root {
        body: Vec<Node>,
    },
    Literal(Literal),
    Table {
        entries: Vec<(TableKey, Node)>,
        is_array: bool,
    },
    VariableDeclaration {
        /// Several names destructure a single multi-valued initializer.
        names: Vec<String>,
        value: Option<Box<Node>>,
    },
    VariableAssignment {
        name: String,
        index: Option<Box<Node>>,
        value: Box<Node>,
    },
    VariableReference {
        name: String,
        index: Option<Box<Node>>,
    },
    UnaryOperation {
        operator: UnaryOp,
        operand: Box<Node>,
    },
    BinaryOperation {
        left: Box<Node>,
        operator: BinaryOp,
        right: Box<Node>,
    },
    TernaryOperation {
        condition: Box<Node>,
        true_expr: Box<Node>,
        false_expr: Box<Node>,
    },
    IfStatement {
        condition: Box<Node>,
        then_branch: Vec<Node>,
        elseif_branches: Vec<(Node, Vec<Node>)>,
        else_branch: Vec<Node>,
    },
    ForStatement {
        var_names: Vec<String>,
        range: ForRange,
        body: Vec<Node>,
    },
    WhileStatement {
        condition: Box<Node>,
        body: Vec<Node>,
    },
    BreakStatement,
    FunctionDeclaration {
        /// None for anonymous function expressions.
        name: Option<String>,
        params: Vec<String>,
        body: Rc<Vec<Node>>,
    },
    FunctionCall {
        name: String,
        arguments: Vec<Node>,
    },
    ReturnStatement {
        value: Option<Box<Node>>,
    },
    /// Head of a method chain, resolved by name in the environment.
    Object {
        name: String,
    },
    MethodChain {
        name: String,
        parent: Box<Node>,
    },
    MethodCall {
        name: String,
        parent: Box<Node>,
        arguments: Vec<Node>,
    },
}

impl NodeKind {
    /// Variant name used in chained-error context.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Root { .. } => "Root",
            NodeKind::Literal(_) => "Literal",
            NodeKind::Table { .. } => "Table",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::VariableAssignment { .. } => "VariableAssignment",
            NodeKind::VariableReference { .. } => "VariableReference",
            NodeKind::UnaryOperation { .. } => "UnaryOperation",
            NodeKind::BinaryOperation { .. } => "BinaryOperation",
            NodeKind::TernaryOperation { .. } => "TernaryOperation",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::BreakStatement => "BreakStatement",
            NodeKind::FunctionDeclaration { .. } => "FunctionDeclaration",
            NodeKind::FunctionCall { .. } => "FunctionCall",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::Object { .. } => "Object",
            NodeKind::MethodChain { .. } => "MethodChain",
            NodeKind::MethodCall { .. } => "MethodCall",
        }
    }
}

/// Literal value with its source category preserved.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Str(String),
}

/// Key of one table-constructor entry. Array entries carry the implicit
/// 1-based position assigned by the parser; dictionary entries carry the
/// identifier name.
#[derive(Debug, Clone, PartialEq)]
pub enum TableKey {
    Index(i64),
    Name(String),
}

#[derive(Debug, Clone)]
pub enum ForRange {
    Numeric {
        start: Box<Node>,
        end: Box<Node>,
        step: Option<Box<Node>>,
    },
    Generic {
        iterable: Box<Node>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Not,
    Length,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Concat,
    Power,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "~=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Concat => "..",
            BinaryOp::Power => "^",
        };
        write!(f, "{}", text)
    }
}
