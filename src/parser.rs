//! Parser for the Jung language.
//!
//! A hand-written recursive descent parser that transforms the token
//! stream into a [`Program`] AST. Expressions use Pratt precedence
//! climbing with the binding powers from [`crate::pratt`]; statements
//! dispatch on their leading keyword.
//!
//! Parse errors are fatal: there is no recovery, and the first error
//! aborts the parse.
//!
//! # Example
//!
//! ```rust
//! use jung::parser::Parser;
//!
//! let mut parser = Parser::new("let x = 1 + 2").unwrap();
//! let program = parser.parse().unwrap();
//! assert_eq!(program.statements.len(), 1);
//! ```

use std::rc::Rc;

use crate::ast::{
    AssignTarget, BinaryOp, ClassDecl, Expr, FunctionDecl, Param, Program, Stmt, UnaryOp,
};
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::pratt::{infix_binding_power, prefix_binding_power};

/// The parser for Jung source text.
///
/// The whole source is tokenized up front; the parser then walks the
/// token sequence with single-token lookahead.
pub struct Parser {
    /// All tokens of the source, without the end-of-input sentinel
    tokens: Vec<Token>,

    /// The end-of-input sentinel, kept for span reporting
    eof: Token,

    /// Index of the current token
    position: usize,
}

impl Parser {
    /// Creates a parser for the given source text.
    ///
    /// Tokenizes eagerly; a lex error surfaces here as a [`ParseError`].
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        let eof = loop {
            let token = lexer.next_token()?;
            if token.kind == TokenKind::Eof {
                break token;
            }
            tokens.push(token);
        };

        Ok(Parser {
            tokens,
            eof,
            position: 0,
        })
    }

    /// Parses the source into a program.
    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        self.skip_semicolons();
        while !self.at_eof() {
            statements.push(self.parse_statement()?);
            self.skip_semicolons();
        }
        Ok(Program { statements })
    }

    // === Statements ===

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current().kind {
            TokenKind::Let => self.parse_let(),
            TokenKind::Print => self.parse_print(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Fn => {
                let decl = self.parse_function_decl()?;
                Ok(Stmt::Function(Rc::new(decl)))
            }
            TokenKind::Class => self.parse_class(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => {
                let span = self.current().span;
                self.advance();
                Ok(Stmt::Break { span })
            }
            TokenKind::Continue => {
                let span = self.current().span;
                self.advance();
                Ok(Stmt::Continue { span })
            }
            TokenKind::Try => self.parse_try(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Import => self.parse_import(),
            _ => self.parse_expr_or_assign(),
        }
    }

    fn parse_let(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance();
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Equal)?;
        let value = self.parse_expr(0)?;
        let span = start.merge(&value.span());
        Ok(Stmt::Let { name, value, span })
    }

    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance();
        let value = self.parse_expr(0)?;
        let span = start.merge(&value.span());
        Ok(Stmt::Print { value, span })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance();
        let condition = self.parse_expr(0)?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.matches(TokenKind::Else) {
            if self.check(TokenKind::If) {
                // `else if` chains nest as a single-statement else branch
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            span: start,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance();
        let condition = self.parse_expr(0)?;
        let body = self.parse_block()?;
        Ok(Stmt::While {
            condition,
            body,
            span: start,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance();
        let variable = self.expect_identifier()?;
        self.expect(TokenKind::In)?;
        let iterable = self.parse_expr(0)?;
        let body = self.parse_block()?;
        Ok(Stmt::ForIn {
            variable,
            iterable,
            body,
            span: start,
        })
    }

    /// Parses `fn name(params) { body }`.
    ///
    /// Each parameter may carry a default-value expression after `=`.
    fn parse_function_decl(&mut self) -> Result<FunctionDecl, ParseError> {
        let start = self.current().span;
        self.advance();
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LeftParen)?;

        let mut params = Vec::new();
        while !self.check(TokenKind::RightParen) {
            let param_name = self.expect_identifier()?;
            let default = if self.matches(TokenKind::Equal) {
                Some(self.parse_expr(0)?)
            } else {
                None
            };
            params.push(Param {
                name: param_name,
                default,
            });
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;

        let body = self.parse_block()?;
        Ok(FunctionDecl {
            name,
            params,
            body,
            span: start,
        })
    }

    fn parse_class(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance();
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LeftBrace)?;

        let mut methods = Vec::new();
        loop {
            self.skip_semicolons();
            if !self.check(TokenKind::Fn) {
                break;
            }
            methods.push(Rc::new(self.parse_function_decl()?));
        }
        self.expect(TokenKind::RightBrace)?;

        Ok(Stmt::Class(Rc::new(ClassDecl {
            name,
            methods,
            span: start,
        })))
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let span = self.current().span;
        self.advance();
        let value = if self.starts_expression() {
            Some(self.parse_expr(0)?)
        } else {
            None
        };
        Ok(Stmt::Return { value, span })
    }

    fn parse_try(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance();
        let body = self.parse_block()?;
        self.expect(TokenKind::Catch)?;

        // Catch variable: parenthesized, bare, or absent
        let catch_var = if self.matches(TokenKind::LeftParen) {
            let name = self.expect_identifier()?;
            self.expect(TokenKind::RightParen)?;
            Some(name)
        } else if self.check(TokenKind::Identifier) {
            Some(self.expect_identifier()?)
        } else {
            None
        };

        let catch_body = self.parse_block()?;
        Ok(Stmt::Try {
            body,
            catch_var,
            catch_body,
            span: start,
        })
    }

    fn parse_throw(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance();
        let value = self.parse_expr(0)?;
        let span = start.merge(&value.span());
        Ok(Stmt::Throw { value, span })
    }

    fn parse_import(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;
        self.advance();
        let token = self.expect(TokenKind::String)?;
        let span = start.merge(&token.span);
        Ok(Stmt::Import {
            path: token.lexeme,
            span,
        })
    }

    /// Parses an expression statement, or an assignment when the parsed
    /// expression turns out to be a valid target followed by `=` or a
    /// compound-assignment operator.
    fn parse_expr_or_assign(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expr(0)?;

        let op = match self.current().kind {
            TokenKind::Equal => None,
            TokenKind::PlusEqual => Some(BinaryOp::Add),
            TokenKind::MinusEqual => Some(BinaryOp::Sub),
            TokenKind::StarEqual => Some(BinaryOp::Mul),
            TokenKind::SlashEqual => Some(BinaryOp::Div),
            _ => {
                let span = expr.span();
                return Ok(Stmt::Expr { expr, span });
            }
        };
        self.advance();

        let target = match expr {
            Expr::Identifier { name, .. } => AssignTarget::Variable { name },
            Expr::Member { object, field, .. } => AssignTarget::Member {
                object: *object,
                field,
            },
            Expr::Index { target, index, .. } => AssignTarget::Index {
                target: *target,
                index: *index,
            },
            other => {
                return Err(ParseError::UnexpectedToken {
                    expected: "assignment target".to_string(),
                    found: "expression".to_string(),
                    span: other.span(),
                });
            }
        };

        let value = self.parse_expr(0)?;
        let span = value.span();
        Ok(Stmt::Assign {
            target,
            op,
            value,
            span,
        })
    }

    /// Parses a brace-delimited statement list.
    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LeftBrace)?;
        let mut statements = Vec::new();
        self.skip_semicolons();
        while !self.check(TokenKind::RightBrace) {
            if self.at_eof() {
                return Err(ParseError::UnexpectedEof {
                    context: "unclosed block".to_string(),
                    span: self.eof.span,
                });
            }
            statements.push(self.parse_statement()?);
            self.skip_semicolons();
        }
        self.expect(TokenKind::RightBrace)?;
        Ok(statements)
    }

    // === Expressions ===

    /// Parses an expression with the Pratt precedence loop.
    pub fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;

        while let Some((left_bp, right_bp)) = infix_binding_power(&self.current().kind) {
            if left_bp < min_bp {
                break;
            }

            let op_kind = self.current().kind;
            self.advance();

            if op_kind == TokenKind::Question {
                let then_branch = self.parse_expr(0)?;
                self.expect(TokenKind::Colon)?;
                let else_branch = self.parse_expr(right_bp)?;
                let span = lhs.span().merge(&else_branch.span());
                lhs = Expr::Ternary {
                    condition: Box::new(lhs),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                    span,
                };
            } else {
                let rhs = self.parse_expr(right_bp)?;
                let span = lhs.span().merge(&rhs.span());
                lhs = Expr::Binary {
                    left: Box::new(lhs),
                    op: Self::binary_op(op_kind),
                    right: Box::new(rhs),
                    span,
                };
            }
        }

        Ok(lhs)
    }

    fn binary_op(kind: TokenKind) -> BinaryOp {
        match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::Ne => BinaryOp::Ne,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Ge => BinaryOp::Ge,
            TokenKind::And => BinaryOp::And,
            TokenKind::Or => BinaryOp::Or,
            // infix_binding_power admits nothing else
            other => unreachable!("not a binary operator: {other}"),
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if let Some(bp) = prefix_binding_power(&self.current().kind) {
            let op = match self.current().kind {
                TokenKind::Minus => UnaryOp::Neg,
                _ => UnaryOp::Not,
            };
            let start = self.current().span;
            self.advance();
            let operand = self.parse_expr(bp)?;
            let span = start.merge(&operand.span());
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_postfix()
    }

    /// Parses a primary expression followed by its postfix chain:
    /// `[index]`, `.field`, and `.method(args)`.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    let field = self.expect_identifier()?;
                    if self.check(TokenKind::LeftParen) {
                        let args = self.parse_args()?;
                        let span = expr.span().merge(&self.previous().span);
                        expr = Expr::MethodCall {
                            receiver: Box::new(expr),
                            method: field,
                            args,
                            span,
                        };
                    } else {
                        let span = expr.span().merge(&self.previous().span);
                        expr = Expr::Member {
                            object: Box::new(expr),
                            field,
                            span,
                        };
                    }
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let index = self.parse_expr(0)?;
                    self.expect(TokenKind::RightBracket)?;
                    let span = expr.span().merge(&self.previous().span);
                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                        span,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                // The lexeme decides the representation: a fractional
                // part makes a float, everything else an integer
                if token.lexeme.contains('.') {
                    Ok(Expr::Float {
                        value: token.number,
                        span: token.span,
                    })
                } else {
                    Ok(Expr::Int {
                        value: token.number as i64,
                        span: token.span,
                    })
                }
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::Str {
                    value: token.lexeme,
                    span: token.span,
                })
            }
            TokenKind::InterpBegin => self.parse_interpolation(),
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool {
                    value: true,
                    span: token.span,
                })
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool {
                    value: false,
                    span: token.span,
                })
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Null { span: token.span })
            }
            TokenKind::This => {
                self.advance();
                Ok(Expr::This { span: token.span })
            }
            TokenKind::New => {
                self.advance();
                let class = self.expect_identifier()?;
                let args = self.parse_args()?;
                let span = token.span.merge(&self.previous().span);
                Ok(Expr::New { class, args, span })
            }
            TokenKind::Identifier => {
                self.advance();
                if self.check(TokenKind::LeftParen) {
                    let args = self.parse_args()?;
                    let span = token.span.merge(&self.previous().span);
                    Ok(Expr::Call {
                        callee: token.lexeme,
                        args,
                        span,
                    })
                } else {
                    Ok(Expr::Identifier {
                        name: token.lexeme,
                        span: token.span,
                    })
                }
            }
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_object_literal(),
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expr(0)?;
                self.expect(TokenKind::RightParen)?;
                Ok(expr)
            }
            _ => Err(ParseError::ExpectedExpression {
                found: Self::describe(&token),
                span: token.span,
            }),
        }
    }

    /// Parses the part list of an interpolated string.
    ///
    /// Between the markers, a bare string token is a literal run and
    /// anything else is an expression (the lexer parenthesizes each
    /// `${...}` region, so expressions always open with `(`).
    fn parse_interpolation(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.advance();

        let mut parts = Vec::new();
        while !self.check(TokenKind::InterpEnd) {
            if self.at_eof() {
                return Err(ParseError::UnexpectedEof {
                    context: "unterminated string interpolation".to_string(),
                    span: self.eof.span,
                });
            }
            if self.check(TokenKind::String) {
                let token = self.current().clone();
                self.advance();
                parts.push(Expr::Str {
                    value: token.lexeme,
                    span: token.span,
                });
            } else {
                parts.push(self.parse_expr(0)?);
            }
        }
        self.expect(TokenKind::InterpEnd)?;

        Ok(Expr::Interp { parts, span: start })
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.advance();

        let mut elements = Vec::new();
        while !self.check(TokenKind::RightBracket) {
            elements.push(self.parse_expr(0)?);
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightBracket)?;

        let span = start.merge(&self.previous().span);
        Ok(Expr::Array { elements, span })
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        self.advance();

        let mut entries = Vec::new();
        while !self.check(TokenKind::RightBrace) {
            let key = self.expect_identifier()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expr(0)?;
            entries.push((key, value));
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightBrace)?;

        let span = start.merge(&self.previous().span);
        Ok(Expr::Object { entries, span })
    }

    /// Parses a parenthesized, comma-separated argument list.
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = Vec::new();
        while !self.check(TokenKind::RightParen) {
            args.push(self.parse_expr(0)?);
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(args)
    }

    // === Token plumbing ===

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&self.eof)
    }

    fn previous(&self) -> &Token {
        if self.position == 0 {
            &self.eof
        } else {
            self.tokens.get(self.position - 1).unwrap_or(&self.eof)
        }
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn at_eof(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Consumes the current token when it matches `kind`.
    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            let token = self.current().clone();
            self.advance();
            Ok(token)
        } else {
            let token = self.current();
            Err(ParseError::UnexpectedToken {
                expected: format!("'{kind}'"),
                found: Self::describe(token),
                span: token.span,
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if self.check(TokenKind::Identifier) {
            let name = self.current().lexeme.clone();
            self.advance();
            Ok(name)
        } else {
            let token = self.current();
            Err(ParseError::UnexpectedToken {
                expected: "identifier".to_string(),
                found: Self::describe(token),
                span: token.span,
            })
        }
    }

    fn skip_semicolons(&mut self) {
        while self.matches(TokenKind::Semicolon) {}
    }

    /// Returns true when the current token can begin an expression.
    fn starts_expression(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Number
                | TokenKind::String
                | TokenKind::InterpBegin
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::This
                | TokenKind::New
                | TokenKind::Identifier
                | TokenKind::LeftBracket
                | TokenKind::LeftBrace
                | TokenKind::LeftParen
                | TokenKind::Minus
                | TokenKind::Not
        )
    }

    fn describe(token: &Token) -> String {
        match token.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::String => format!("string \"{}\"", token.lexeme),
            _ => format!("'{}'", token.lexeme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Program {
        Parser::new(input)
            .expect("lex failure")
            .parse()
            .expect("parse failure")
    }

    fn parse_err(input: &str) -> ParseError {
        match Parser::new(input) {
            Ok(mut parser) => parser.parse().expect_err("expected parse failure"),
            Err(err) => err,
        }
    }

    #[test]
    fn test_let_statement() {
        let program = parse("let x = 1 + 2");
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Stmt::Let { name, value, .. } => {
                assert_eq!(name, "x");
                assert!(matches!(value, Expr::Binary { .. }));
            }
            other => panic!("expected let, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence_shape() {
        // 1 + 2 * 3 groups the multiplication under the addition
        let program = parse("1 + 2 * 3");
        match &program.statements[0] {
            Stmt::Expr {
                expr: Expr::Binary { op, right, .. },
                ..
            } => {
                assert_eq!(*op, BinaryOp::Add);
                assert!(matches!(**right, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_subtraction_left_associative() {
        // 10 - 3 - 2 must group as (10 - 3) - 2
        let program = parse("10 - 3 - 2");
        match &program.statements[0] {
            Stmt::Expr {
                expr: Expr::Binary { left, op, .. },
                ..
            } => {
                assert_eq!(*op, BinaryOp::Sub);
                assert!(matches!(**left, Expr::Binary { op: BinaryOp::Sub, .. }));
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_ternary() {
        let program = parse("let r = x > 0 ? \"pos\" : \"neg\"");
        match &program.statements[0] {
            Stmt::Let { value, .. } => assert!(matches!(value, Expr::Ternary { .. })),
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_method_call_node() {
        let program = parse("obj.greet(1, 2)");
        match &program.statements[0] {
            Stmt::Expr {
                expr: Expr::MethodCall { method, args, .. },
                ..
            } => {
                assert_eq!(method, "greet");
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_member_assignment() {
        let program = parse("this.name = n");
        match &program.statements[0] {
            Stmt::Assign { target, op, .. } => {
                assert!(matches!(target, AssignTarget::Member { .. }));
                assert!(op.is_none());
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_index_compound_assignment() {
        let program = parse("a[0] += 5");
        match &program.statements[0] {
            Stmt::Assign { target, op, .. } => {
                assert!(matches!(target, AssignTarget::Index { .. }));
                assert_eq!(*op, Some(BinaryOp::Add));
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_class_declaration() {
        let program = parse("class Hero { fn init(n) { this.name = n } fn quest() { return 1 } }");
        match &program.statements[0] {
            Stmt::Class(decl) => {
                assert_eq!(decl.name, "Hero");
                assert_eq!(decl.methods.len(), 2);
                assert_eq!(decl.methods[0].name, "init");
                assert_eq!(decl.methods[1].params.len(), 0);
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_function_default_params() {
        let program = parse("fn f(a, b = 2) { return a + b }");
        match &program.statements[0] {
            Stmt::Function(decl) => {
                assert_eq!(decl.params.len(), 2);
                assert!(decl.params[0].default.is_none());
                assert!(decl.params[1].default.is_some());
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_catch_variable_forms() {
        for input in [
            "try { throw 1 } catch (e) { print e }",
            "try { throw 1 } catch e { print e }",
        ] {
            let program = parse(input);
            match &program.statements[0] {
                Stmt::Try { catch_var, .. } => assert_eq!(catch_var.as_deref(), Some("e")),
                other => panic!("unexpected statement {other:?}"),
            }
        }

        let program = parse("try { throw 1 } catch { print 0 }");
        match &program.statements[0] {
            Stmt::Try { catch_var, .. } => assert!(catch_var.is_none()),
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_else_if_chain_nests() {
        let program = parse("if a { } else if b { } else { }");
        match &program.statements[0] {
            Stmt::If { else_branch, .. } => {
                let chain = else_branch.as_ref().unwrap();
                assert_eq!(chain.len(), 1);
                assert!(matches!(chain[0], Stmt::If { .. }));
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_interpolation_parts() {
        let program = parse(r#"let s = "a${x}b""#);
        match &program.statements[0] {
            Stmt::Let {
                value: Expr::Interp { parts, .. },
                ..
            } => {
                assert_eq!(parts.len(), 3);
                assert!(matches!(&parts[0], Expr::Str { value, .. } if value == "a"));
                assert!(matches!(&parts[1], Expr::Identifier { name, .. } if name == "x"));
                assert!(matches!(&parts[2], Expr::Str { value, .. } if value == "b"));
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_trailing_commas() {
        let program = parse("let a = [1, 2,]\nlet o = { x: 1, y: 2, }");
        assert_eq!(program.statements.len(), 2);
        match &program.statements[1] {
            Stmt::Let {
                value: Expr::Object { entries, .. },
                ..
            } => assert_eq!(entries.len(), 2),
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_for_over_object_literal() {
        let program = parse("for k in {a: 1, b: 2} { print k }");
        match &program.statements[0] {
            Stmt::ForIn {
                variable, iterable, ..
            } => {
                assert_eq!(variable, "k");
                assert!(matches!(iterable, Expr::Object { .. }));
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_jungian_aliases_parse_identically() {
        // Spans differ (alias spellings have different lengths), so
        // compare the statement shapes rather than whole programs.
        let jungian = parse("dream f(x) { manifest x }\nperceive y = f(1)\nproject y");
        assert_eq!(jungian.statements.len(), 3);
        assert!(matches!(&jungian.statements[0], Stmt::Function(decl) if decl.name == "f"));
        assert!(matches!(&jungian.statements[1], Stmt::Let { name, .. } if name == "y"));
        assert!(matches!(&jungian.statements[2], Stmt::Print { .. }));
    }

    #[test]
    fn test_parse_error_reports_location() {
        let err = parse_err("let = 5");
        match err {
            ParseError::UnexpectedToken {
                expected, span, ..
            } => {
                assert_eq!(expected, "identifier");
                assert_eq!(span.line, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_block_is_eof_error() {
        let err = parse_err("while true { print 1");
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_new_expression() {
        let program = parse("let h = new Hero(\"Jung\")");
        match &program.statements[0] {
            Stmt::Let {
                value: Expr::New { class, args, .. },
                ..
            } => {
                assert_eq!(class, "Hero");
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }
}
