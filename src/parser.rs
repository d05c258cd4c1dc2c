// ABOUTME: Recursive-descent statement parser with Pratt expression climbing

use crate::ast::{BinaryOp, ForRange, Literal, Node, NodeKind, TableKey, UnaryOp};
use crate::error::SyntaxError;
use crate::token::{Token, TokenKind};
use std::rc::Rc;

/// Parse a token stream into a program root node.
pub fn parse(tokens: Vec<Token>, source: &str) -> Result<Node, SyntaxError> {
    Parser::new(tokens, source).parse_program()
}

struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'src str,
}

/// Binary operator precedence. All levels are left-associative, including
/// `..` and `^`.
fn binary_op(kind: &TokenKind) -> Option<(u8, BinaryOp)> {
    match kind {
        TokenKind::Or => Some((1, BinaryOp::Or)),
        TokenKind::And => Some((2, BinaryOp::And)),
        TokenKind::Equal => Some((3, BinaryOp::Equal)),
        TokenKind::NotEqual => Some((3, BinaryOp::NotEqual)),
        TokenKind::Less => Some((4, BinaryOp::Less)),
        TokenKind::Greater => Some((4, BinaryOp::Greater)),
        TokenKind::LessEqual => Some((4, BinaryOp::LessEqual)),
        TokenKind::GreaterEqual => Some((4, BinaryOp::GreaterEqual)),
        TokenKind::Plus => Some((5, BinaryOp::Add)),
        TokenKind::Minus => Some((5, BinaryOp::Subtract)),
        TokenKind::Star => Some((6, BinaryOp::Multiply)),
        TokenKind::Slash => Some((6, BinaryOp::Divide)),
        TokenKind::Percent => Some((6, BinaryOp::Modulo)),
        TokenKind::Concat => Some((7, BinaryOp::Concat)),
        TokenKind::Caret => Some((8, BinaryOp::Power)),
        _ => None,
    }
}

impl<'src> Parser<'src> {
    fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Parser {
            tokens,
            pos: 0,
            source,
        }
    }

    fn parse_program(&mut self) -> Result<Node, SyntaxError> {
        let body = self.parse_block(&[TokenKind::Eof])?;
        Ok(Node::new(NodeKind::Root { body }, 0))
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().kind.same_kind(kind)
    }

    fn accept(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.error(format!("expected {}, found {}", kind, self.peek().kind)))
    }

    fn expect_identifier(&mut self, context: &str) -> Result<String, SyntaxError> {
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(self.error(format!("expected identifier {}, found {}", context, other))),
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::at(message, self.peek().line, self.source)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// Parse statements until one of `stops` is reached. The stop token is
    /// not consumed.
    fn parse_block(&mut self, stops: &[TokenKind]) -> Result<Vec<Node>, SyntaxError> {
        let mut body = Vec::new();
        loop {
            if stops.iter().any(|s| self.check(s)) {
                return Ok(body);
            }
            if self.check(&TokenKind::Eof) {
                return Err(self.error("unexpected end of input inside a block"));
            }
            body.push(self.parse_statement()?);
            while self.accept(&TokenKind::Semicolon) {}
        }
    }

    fn parse_statement(&mut self) -> Result<Node, SyntaxError> {
        match self.peek().kind {
            TokenKind::Local => self.parse_local(),
            TokenKind::Function => self.parse_function_statement(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Break => {
                let token = self.advance();
                Ok(Node::new(NodeKind::BreakStatement, token.line))
            }
            _ => self.parse_expression(),
        }
    }

    fn parse_local(&mut self) -> Result<Node, SyntaxError> {
        let local = self.advance();

        // `local function f(...)` declares like `function f(...)`.
        if self.check(&TokenKind::Function) {
            return self.parse_function_statement();
        }

        let mut names = vec![self.expect_identifier("after 'local'")?];
        while self.accept(&TokenKind::Comma) {
            names.push(self.expect_identifier("after ','")?);
        }

        if !self.check(&TokenKind::Assign) {
            return Err(self.error(format!(
                "expected '=' after local declaration, found {}",
                self.peek().kind
            )));
        }
        self.advance();

        let value = self.parse_expression()?;
        if self.check(&TokenKind::Comma) {
            return Err(self.error("multiple assignment is not supported"));
        }

        Ok(Node::new(
            NodeKind::VariableDeclaration {
                names,
                value: Some(Box::new(value)),
            },
            local.line,
        ))
    }

    fn parse_function_statement(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.expect(&TokenKind::Function)?;
        let name = self.expect_identifier("after 'function'")?;
        let (params, body) = self.parse_function_rest()?;
        Ok(Node::new(
            NodeKind::FunctionDeclaration {
                name: Some(name),
                params,
                body: Rc::new(body),
            },
            keyword.line,
        ))
    }

    /// Parameter list and body, shared by named and anonymous functions.
    fn parse_function_rest(&mut self) -> Result<(Vec<String>, Vec<Node>), SyntaxError> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            params.push(self.expect_identifier("in parameter list")?);
            while self.accept(&TokenKind::Comma) {
                params.push(self.expect_identifier("in parameter list")?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block(&[TokenKind::End])?;
        self.expect(&TokenKind::End)?;
        Ok((params, body))
    }

    fn parse_return(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.advance();
        let value = if matches!(
            self.peek().kind,
            TokenKind::End | TokenKind::Else | TokenKind::Elseif | TokenKind::Eof
        ) || self.check(&TokenKind::Semicolon)
        {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        Ok(Node::new(NodeKind::ReturnStatement { value }, keyword.line))
    }

    fn parse_if(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.advance();
        let condition = Box::new(self.parse_expression()?);
        self.expect(&TokenKind::Then)?;
        let branch_stops = [TokenKind::Elseif, TokenKind::Else, TokenKind::End];
        let then_branch = self.parse_block(&branch_stops)?;

        let mut elseif_branches = Vec::new();
        while self.accept(&TokenKind::Elseif) {
            let elseif_condition = self.parse_expression()?;
            self.expect(&TokenKind::Then)?;
            let branch = self.parse_block(&branch_stops)?;
            elseif_branches.push((elseif_condition, branch));
        }

        let else_branch = if self.accept(&TokenKind::Else) {
            self.parse_block(&[TokenKind::End])?
        } else {
            Vec::new()
        };
        self.expect(&TokenKind::End)?;

        Ok(Node::new(
            NodeKind::IfStatement {
                condition,
                then_branch,
                elseif_branches,
                else_branch,
            },
            keyword.line,
        ))
    }

    fn parse_for(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.advance();
        let mut var_names = vec![self.expect_identifier("after 'for'")?];
        while self.accept(&TokenKind::Comma) {
            var_names.push(self.expect_identifier("after ','")?);
        }

        let range = if self.accept(&TokenKind::Assign) {
            let start = Box::new(self.parse_expression()?);
            self.expect(&TokenKind::Comma)?;
            let end = Box::new(self.parse_expression()?);
            let step = if self.accept(&TokenKind::Comma) {
                Some(Box::new(self.parse_expression()?))
            } else {
                None
            };
            ForRange::Numeric { start, end, step }
        } else if self.accept(&TokenKind::In) {
            ForRange::Generic {
                iterable: Box::new(self.parse_expression()?),
            }
        } else {
            return Err(self.error(format!(
                "expected '=' or 'in' after for variables, found {}",
                self.peek().kind
            )));
        };

        self.expect(&TokenKind::Do)?;
        let body = self.parse_block(&[TokenKind::End])?;
        self.expect(&TokenKind::End)?;

        Ok(Node::new(
            NodeKind::ForStatement {
                var_names,
                range,
                body,
            },
            keyword.line,
        ))
    }

    fn parse_while(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.advance();
        let condition = Box::new(self.parse_expression()?);
        self.expect(&TokenKind::Do)?;
        let body = self.parse_block(&[TokenKind::End])?;
        self.expect(&TokenKind::End)?;
        Ok(Node::new(
            NodeKind::WhileStatement { condition, body },
            keyword.line,
        ))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expression(&mut self) -> Result<Node, SyntaxError> {
        let expr = self.parse_with_precedence(1)?;

        // Reserved ternary form, right-associative.
        if self.accept(&TokenKind::Question) {
            let line = expr.line;
            let true_expr = Box::new(self.parse_expression()?);
            self.expect(&TokenKind::Colon)?;
            let false_expr = Box::new(self.parse_expression()?);
            return Ok(Node::new(
                NodeKind::TernaryOperation {
                    condition: Box::new(expr),
                    true_expr,
                    false_expr,
                },
                line,
            ));
        }
        Ok(expr)
    }

    /// Pratt climbing: consume operators of precedence >= `min`, parsing
    /// the right operand one level tighter for left associativity.
    fn parse_with_precedence(&mut self, min: u8) -> Result<Node, SyntaxError> {
        let mut left = self.parse_primary()?;
        while let Some((precedence, operator)) = binary_op(&self.peek().kind) {
            if precedence < min {
                break;
            }
            let op_token = self.advance();
            let right = self.parse_with_precedence(precedence + 1)?;
            left = Node::new(
                NodeKind::BinaryOperation {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                op_token.line,
            );
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Node, SyntaxError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Node::new(NodeKind::Literal(Literal::Nil), token.line))
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(Node::new(NodeKind::Literal(Literal::Boolean(b)), token.line))
            }
            TokenKind::Integer(n) => {
                self.advance();
                Ok(Node::new(NodeKind::Literal(Literal::Integer(n)), token.line))
            }
            TokenKind::Float(n) => {
                self.advance();
                Ok(Node::new(NodeKind::Literal(Literal::Float(n)), token.line))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Node::new(NodeKind::Literal(Literal::Str(s)), token.line))
            }
            // Long strings flow through as plain string literals.
            TokenKind::LongStr(s) => {
                self.advance();
                Ok(Node::new(NodeKind::Literal(Literal::Str(s)), token.line))
            }
            TokenKind::Minus => self.parse_unary(UnaryOp::Minus),
            TokenKind::Not => self.parse_unary(UnaryOp::Not),
            TokenKind::Hash => self.parse_unary(UnaryOp::Length),
            TokenKind::LCurly => self.parse_table(),
            TokenKind::Function => self.parse_anonymous_function(),
            TokenKind::Identifier(name) => {
                self.advance();
                self.parse_identifier_headed(name, token.line)
            }
            other => Err(self.error(format!("unsupported expression starting with {}", other))),
        }
    }

    fn parse_unary(&mut self, operator: UnaryOp) -> Result<Node, SyntaxError> {
        let token = self.advance();
        let operand = Box::new(self.parse_primary()?);
        Ok(Node::new(
            NodeKind::UnaryOperation { operator, operand },
            token.line,
        ))
    }

    fn parse_anonymous_function(&mut self) -> Result<Node, SyntaxError> {
        let keyword = self.expect(&TokenKind::Function)?;
        let (params, body) = self.parse_function_rest()?;
        Ok(Node::new(
            NodeKind::FunctionDeclaration {
                name: None,
                params,
                body: Rc::new(body),
            },
            keyword.line,
        ))
    }

    /// Disambiguate what follows a leading identifier: assignment, indexed
    /// access, method chain, call, or a bare reference.
    fn parse_identifier_headed(&mut self, name: String, line: usize) -> Result<Node, SyntaxError> {
        match self.peek().kind {
            TokenKind::Assign => {
                self.advance();
                let value = Box::new(self.parse_expression()?);
                Ok(Node::new(
                    NodeKind::VariableAssignment {
                        name,
                        index: None,
                        value,
                    },
                    line,
                ))
            }
            TokenKind::LBracket => {
                self.advance();
                let index = Box::new(self.parse_expression()?);
                self.expect(&TokenKind::RBracket)?;
                if self.accept(&TokenKind::Assign) {
                    let value = Box::new(self.parse_expression()?);
                    Ok(Node::new(
                        NodeKind::VariableAssignment {
                            name,
                            index: Some(index),
                            value,
                        },
                        line,
                    ))
                } else {
                    Ok(Node::new(
                        NodeKind::VariableReference {
                            name,
                            index: Some(index),
                        },
                        line,
                    ))
                }
            }
            TokenKind::Dot => {
                let mut node = Node::new(NodeKind::Object { name }, line);
                while self.accept(&TokenKind::Dot) {
                    let member_line = self.peek().line;
                    let member = self.expect_identifier("after '.'")?;
                    node = if self.check(&TokenKind::LParen) {
                        let arguments = self.parse_arguments()?;
                        Node::new(
                            NodeKind::MethodCall {
                                name: member,
                                parent: Box::new(node),
                                arguments,
                            },
                            member_line,
                        )
                    } else {
                        Node::new(
                            NodeKind::MethodChain {
                                name: member,
                                parent: Box::new(node),
                            },
                            member_line,
                        )
                    };
                }
                Ok(node)
            }
            TokenKind::LParen => {
                let arguments = self.parse_arguments()?;
                Ok(Node::new(NodeKind::FunctionCall { name, arguments }, line))
            }
            _ => Ok(Node::new(
                NodeKind::VariableReference { name, index: None },
                line,
            )),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Node>, SyntaxError> {
        self.expect(&TokenKind::LParen)?;
        let mut arguments = Vec::new();
        if !self.check(&TokenKind::RParen) {
            arguments.push(self.parse_expression()?);
            while self.accept(&TokenKind::Comma) {
                arguments.push(self.parse_expression()?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(arguments)
    }

    /// `{ ... }` table constructor. A single `ident = expr` entry makes the
    /// whole table a dictionary; everything else is an array element with
    /// the next 1-based implicit key. Repeated and trailing commas are
    /// tolerated.
    fn parse_table(&mut self) -> Result<Node, SyntaxError> {
        let open = self.expect(&TokenKind::LCurly)?;
        let mut entries = Vec::new();
        let mut is_array = true;
        let mut next_index = 1i64;

        loop {
            while self.accept(&TokenKind::Comma) {}
            if self.accept(&TokenKind::RCurly) {
                break;
            }

            let named_entry = matches!(self.peek().kind, TokenKind::Identifier(_))
                && self.peek_at(1).kind.same_kind(&TokenKind::Assign);
            if named_entry {
                let key = self.expect_identifier("as table key")?;
                self.expect(&TokenKind::Assign)?;
                let value = self.parse_expression()?;
                entries.push((TableKey::Name(key), value));
                is_array = false;
            } else {
                let value = self.parse_expression()?;
                entries.push((TableKey::Index(next_index), value));
                next_index += 1;
            }

            if !self.check(&TokenKind::Comma) && !self.check(&TokenKind::RCurly) {
                return Err(self.error(format!(
                    "expected ',' or '}}' in table constructor, found {}",
                    self.peek().kind
                )));
            }
        }

        Ok(Node::new(NodeKind::Table { entries, is_array }, open.line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_source(source: &str) -> Node {
        let tokens = tokenize(source).expect("tokenize failed");
        parse(tokens, source).expect("parse failed")
    }

    fn parse_err(source: &str) -> SyntaxError {
        let tokens = tokenize(source).expect("tokenize failed");
        parse(tokens, source).expect_err("expected parse error")
    }

    fn root_body(node: Node) -> Vec<Node> {
        match node.kind {
            NodeKind::Root { body } => body,
            _ => panic!("expected root"),
        }
    }

    #[test]
    fn test_precedence_groups_tighter_operator() {
        // 1 + 2 * 3 must parse as 1 + (2 * 3)
        let body = root_body(parse_source("x = 1 + 2 * 3"));
        let NodeKind::VariableAssignment { value, .. } = &body[0].kind else {
            panic!("expected assignment");
        };
        let NodeKind::BinaryOperation {
            operator, right, ..
        } = &value.kind
        else {
            panic!("expected binary operation");
        };
        assert_eq!(*operator, BinaryOp::Add);
        assert!(matches!(
            right.kind,
            NodeKind::BinaryOperation {
                operator: BinaryOp::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn test_left_associativity() {
        // 10 - 3 - 2 must parse as (10 - 3) - 2
        let body = root_body(parse_source("x = 10 - 3 - 2"));
        let NodeKind::VariableAssignment { value, .. } = &body[0].kind else {
            panic!("expected assignment");
        };
        let NodeKind::BinaryOperation { left, .. } = &value.kind else {
            panic!("expected binary operation");
        };
        assert!(matches!(
            left.kind,
            NodeKind::BinaryOperation {
                operator: BinaryOp::Subtract,
                ..
            }
        ));
    }

    #[test]
    fn test_local_declaration() {
        let body = root_body(parse_source("local x = 1"));
        assert!(matches!(
            &body[0].kind,
            NodeKind::VariableDeclaration { names, value: Some(_) } if names == &["x".to_string()]
        ));
    }

    #[test]
    fn test_local_requires_equals() {
        let err = parse_err("local x");
        assert!(err.to_string().contains("expected '='"));
    }

    #[test]
    fn test_multiple_assignment_rejected() {
        let err = parse_err("local a, b = 1, 2");
        assert!(err.to_string().contains("multiple assignment"));
    }

    #[test]
    fn test_multi_name_single_initializer_allowed() {
        let body = root_body(parse_source("local ok, msg = pcall(f)"));
        assert!(matches!(
            &body[0].kind,
            NodeKind::VariableDeclaration { names, .. } if names.len() == 2
        ));
    }

    #[test]
    fn test_if_elseif_else() {
        let body = root_body(parse_source(
            "if a then x = 1 elseif b then x = 2 elseif c then x = 3 else x = 4 end",
        ));
        let NodeKind::IfStatement {
            elseif_branches,
            else_branch,
            ..
        } = &body[0].kind
        else {
            panic!("expected if statement");
        };
        assert_eq!(elseif_branches.len(), 2);
        assert_eq!(else_branch.len(), 1);
    }

    #[test]
    fn test_numeric_for_with_step() {
        let body = root_body(parse_source("for i = 1, 10, 2 do print(i) end"));
        let NodeKind::ForStatement {
            var_names, range, ..
        } = &body[0].kind
        else {
            panic!("expected for statement");
        };
        assert_eq!(var_names, &["i".to_string()]);
        assert!(matches!(range, ForRange::Numeric { step: Some(_), .. }));
    }

    #[test]
    fn test_generic_for() {
        let body = root_body(parse_source("for k, v in pairs(t) do print(k) end"));
        let NodeKind::ForStatement {
            var_names, range, ..
        } = &body[0].kind
        else {
            panic!("expected for statement");
        };
        assert_eq!(var_names.len(), 2);
        assert!(matches!(range, ForRange::Generic { .. }));
    }

    #[test]
    fn test_for_requires_equals_or_in() {
        let err = parse_err("for i do end");
        assert!(err.to_string().contains("expected '=' or 'in'"));
    }

    #[test]
    fn test_method_chain_and_call() {
        let body = root_body(parse_source("math.floor(x)"));
        let NodeKind::MethodCall {
            name,
            parent,
            arguments,
        } = &body[0].kind
        else {
            panic!("expected method call");
        };
        assert_eq!(name, "floor");
        assert_eq!(arguments.len(), 1);
        assert!(matches!(&parent.kind, NodeKind::Object { name } if name == "math"));
    }

    #[test]
    fn test_attribute_chain() {
        let body = root_body(parse_source("x = math.pi"));
        let NodeKind::VariableAssignment { value, .. } = &body[0].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(&value.kind, NodeKind::MethodChain { name, .. } if name == "pi"));
    }

    #[test]
    fn test_table_constructor_array() {
        let body = root_body(parse_source("t = {10, 20, 30,}"));
        let NodeKind::VariableAssignment { value, .. } = &body[0].kind else {
            panic!("expected assignment");
        };
        let NodeKind::Table { entries, is_array } = &value.kind else {
            panic!("expected table");
        };
        assert!(*is_array);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].0, TableKey::Index(3));
    }

    #[test]
    fn test_table_constructor_dict() {
        let body = root_body(parse_source("t = {a = 1, b = 2}"));
        let NodeKind::VariableAssignment { value, .. } = &body[0].kind else {
            panic!("expected assignment");
        };
        let NodeKind::Table { entries, is_array } = &value.kind else {
            panic!("expected table");
        };
        assert!(!*is_array);
        assert_eq!(entries[0].0, TableKey::Name("a".to_string()));
    }

    #[test]
    fn test_indexed_assignment_and_reference() {
        let body = root_body(parse_source("t[2] = t[1]"));
        let NodeKind::VariableAssignment { index, value, .. } = &body[0].kind else {
            panic!("expected assignment");
        };
        assert!(index.is_some());
        assert!(matches!(
            &value.kind,
            NodeKind::VariableReference { index: Some(_), .. }
        ));
    }

    #[test]
    fn test_anonymous_function_argument() {
        let body = root_body(parse_source("pcall(function() return 1 end)"));
        let NodeKind::FunctionCall { arguments, .. } = &body[0].kind else {
            panic!("expected call");
        };
        assert!(matches!(
            &arguments[0].kind,
            NodeKind::FunctionDeclaration { name: None, .. }
        ));
    }

    #[test]
    fn test_unsupported_primary() {
        let err = parse_err("x = then");
        assert!(err.to_string().contains("unsupported expression"));
    }

    #[test]
    fn test_missing_end_reports_eof() {
        let err = parse_err("while true do print(1)");
        assert!(err.to_string().contains("unexpected end of input"));
    }

    #[test]
    fn test_error_carries_line_and_source() {
        let err = parse_err("local x = 1\nlocal y 2");
        assert_eq!(err.line, 2);
        assert!(err.source_line.contains("local y 2"));
    }

    #[test]
    fn test_ternary_expression() {
        let body = root_body(parse_source("x = a ? 1 : 2"));
        let NodeKind::VariableAssignment { value, .. } = &body[0].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(&value.kind, NodeKind::TernaryOperation { .. }));
    }
}
