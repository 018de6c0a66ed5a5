// satori-parser - Recursive descent parser for the Satori programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Recursive descent parser producing an [`AstNode`] program.
//!
//! The parser keeps one token of lookahead (`current`) and one of memory
//! (`previous`). Errors stick in `had_error`; after an error the parser
//! resynchronises at the next newline and keeps going so a single run can
//! surface several diagnostics, but the program is discarded if any error
//! occurred.

use std::fmt;

use crate::ast::{AstKind, AstNode, BinaryOp, UnaryOp};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Parse error with position information.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// The parser converts a token stream into a program node.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token<'src>,
    previous: Token<'src>,
    had_error: bool,
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    /// Create a parser over the given source and prime the lookahead.
    pub fn new(source: &'src str) -> Self {
        let mut parser = Parser {
            lexer: Lexer::new(source),
            current: Token::new(TokenKind::Eof, "", 0, 0),
            previous: Token::new(TokenKind::Eof, "", 0, 0),
            had_error: false,
            errors: Vec::new(),
        };
        parser.advance();
        parser
    }

    /// Parse a whole program. On any error the partial tree is discarded and
    /// every collected diagnostic is returned.
    pub fn parse(mut self) -> Result<AstNode, Vec<ParseError>> {
        let mut statements = Vec::new();

        self.skip_newlines();
        while !self.check(TokenKind::Eof) {
            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(()) => self.synchronize(),
            }
            self.skip_newlines();
        }

        if self.had_error {
            Err(self.errors)
        } else {
            Ok(AstNode::new(AstKind::Program(statements), 1, 1))
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self) -> Result<AstNode, ()> {
        if self.match_kind(TokenKind::Import) {
            self.consume(TokenKind::Identifier, "expected module name after 'import'")?;
            let name = self.previous.lexeme.to_string();
            return Ok(self.node(AstKind::Import(name)));
        }

        if self.match_kind(TokenKind::Let) {
            // let name := value
            self.consume(TokenKind::Identifier, "expected variable name after 'let'")?;
            let name = self.previous.lexeme.to_string();
            let (line, column) = (self.previous.line, self.previous.column);

            self.consume(TokenKind::ColonEqual, "expected ':=' after variable name")?;

            let value = self.expression()?;
            return Ok(AstNode::new(
                AstKind::Let {
                    name,
                    value: Box::new(value),
                },
                line,
                column,
            ));
        }

        if self.match_kind(TokenKind::If) {
            // if condition then statement [else statement]
            let (line, column) = (self.previous.line, self.previous.column);

            let condition = self.expression()?;
            self.consume(TokenKind::Then, "expected 'then' after if condition")?;
            self.skip_newlines();

            let then_branch = self.statement()?;

            self.skip_newlines();
            let else_branch = if self.match_kind(TokenKind::Else) {
                self.skip_newlines();
                Some(Box::new(self.statement()?))
            } else {
                None
            };

            return Ok(AstNode::new(
                AstKind::If {
                    condition: Box::new(condition),
                    then_branch: Box::new(then_branch),
                    else_branch,
                },
                line,
                column,
            ));
        }

        if self.match_kind(TokenKind::While) {
            // while condition then statement
            let (line, column) = (self.previous.line, self.previous.column);

            let condition = self.expression()?;
            self.consume(TokenKind::Then, "expected 'then' after while condition")?;
            self.skip_newlines();

            let body = self.statement()?;
            return Ok(AstNode::new(
                AstKind::While {
                    condition: Box::new(condition),
                    body: Box::new(body),
                },
                line,
                column,
            ));
        }

        if self.match_kind(TokenKind::Loop) {
            let (line, column) = (self.previous.line, self.previous.column);
            self.skip_newlines();

            let body = self.statement()?;
            return Ok(AstNode::new(
                AstKind::Loop {
                    body: Box::new(body),
                },
                line,
                column,
            ));
        }

        if self.match_kind(TokenKind::Break) {
            return Ok(self.node(AstKind::Break));
        }

        if self.match_kind(TokenKind::Continue) {
            return Ok(self.node(AstKind::Continue));
        }

        // name = value (distinguished from an identifier expression by one
        // token of scanner lookahead)
        if self.check(TokenKind::Identifier) && self.lexer.peek_token().kind == TokenKind::Equal {
            self.advance();
            let name = self.previous.lexeme.to_string();
            let (line, column) = (self.previous.line, self.previous.column);
            self.advance(); // consume '='

            let value = self.expression()?;
            return Ok(AstNode::new(
                AstKind::Assignment {
                    name,
                    value: Box::new(value),
                },
                line,
                column,
            ));
        }

        if let Some(word) = self.reserved_word() {
            self.error_at_current(&format!("'{}' is not yet supported", word));
            return Err(());
        }

        // Expression statement
        self.expression()
    }

    // ========================================================================
    // Expressions
    // ========================================================================
    //
    // Precedence, lowest to highest:
    //   equality:     == !=
    //   comparison:   < <= > >=
    //   term:         + -
    //   factor:       * / %
    //   unary:        - !
    //   call:         .member, argument application
    //   primary:      literals, identifiers

    fn expression(&mut self) -> Result<AstNode, ()> {
        self.equality()
    }

    fn equality(&mut self) -> Result<AstNode, ()> {
        let mut expr = self.comparison()?;

        while self.match_kind(TokenKind::EqualEqual) || self.match_kind(TokenKind::BangEqual) {
            let op_token = self.previous;
            let op = if op_token.kind == TokenKind::EqualEqual {
                BinaryOp::Eq
            } else {
                BinaryOp::Neq
            };
            let right = self.comparison()?;
            expr = binary(op, expr, right, op_token);
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<AstNode, ()> {
        let mut expr = self.term()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Less => BinaryOp::Lt,
                TokenKind::LessEqual => BinaryOp::Lte,
                TokenKind::Greater => BinaryOp::Gt,
                TokenKind::GreaterEqual => BinaryOp::Gte,
                _ => break,
            };
            self.advance();
            let op_token = self.previous;
            let right = self.term()?;
            expr = binary(op, expr, right, op_token);
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<AstNode, ()> {
        let mut expr = self.factor()?;

        while self.match_kind(TokenKind::Plus) || self.match_kind(TokenKind::Minus) {
            let op_token = self.previous;
            let op = if op_token.kind == TokenKind::Plus {
                BinaryOp::Add
            } else {
                BinaryOp::Sub
            };
            let right = self.factor()?;
            expr = binary(op, expr, right, op_token);
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<AstNode, ()> {
        let mut expr = self.unary()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let op_token = self.previous;
            let right = self.unary()?;
            expr = binary(op, expr, right, op_token);
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<AstNode, ()> {
        if self.match_kind(TokenKind::Minus) || self.match_kind(TokenKind::Bang) {
            let op_token = self.previous;
            let op = if op_token.kind == TokenKind::Minus {
                UnaryOp::Negate
            } else {
                UnaryOp::Not
            };
            let operand = self.unary()?; // Right-associative
            return Ok(AstNode::new(
                AstKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                op_token.line,
                op_token.column,
            ));
        }

        self.call()
    }

    fn call(&mut self) -> Result<AstNode, ()> {
        let mut expr = self.primary()?;

        loop {
            if self.match_kind(TokenKind::Dot) {
                // Member access
                self.consume(TokenKind::Identifier, "expected member name after '.'")?;
                let member = self.previous.lexeme.to_string();
                expr = AstNode::new(
                    AstKind::MemberAccess {
                        object: Box::new(expr),
                        member,
                    },
                    self.previous.line,
                    self.previous.column,
                );
            } else if self.starts_argument() {
                // Call with comma-separated arguments, no parentheses
                let mut args = vec![self.expression()?];
                while self.match_kind(TokenKind::Comma) {
                    args.push(self.expression()?);
                }

                expr = AstNode::new(
                    AstKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    self.previous.line,
                    self.previous.column,
                );
                // A call does not become the callee of another call
                break;
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn primary(&mut self) -> Result<AstNode, ()> {
        if self.match_kind(TokenKind::Str) {
            // Strip quotes; escapes are not processed
            let lexeme = self.previous.lexeme;
            let value = lexeme[1..lexeme.len() - 1].to_string();
            return Ok(self.node(AstKind::StringLit(value)));
        }

        if self.match_kind(TokenKind::Int) {
            let value = match self.previous.lexeme.parse::<i64>() {
                Ok(value) => value,
                Err(_) => {
                    self.error_at_previous("integer literal out of range");
                    return Err(());
                }
            };
            return Ok(self.node(AstKind::IntLit(value)));
        }

        if self.match_kind(TokenKind::Float) {
            let value = match self.previous.lexeme.parse::<f64>() {
                Ok(value) => value,
                Err(_) => {
                    self.error_at_previous("invalid float literal");
                    return Err(());
                }
            };
            return Ok(self.node(AstKind::FloatLit(value)));
        }

        if self.match_kind(TokenKind::Identifier) {
            let name = self.previous.lexeme.to_string();
            return Ok(self.node(AstKind::Identifier(name)));
        }

        if let Some(word) = self.reserved_word() {
            self.error_at_current(&format!("'{}' is not yet supported", word));
            return Err(());
        }

        self.error_at_current("expected expression");
        Err(())
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn advance(&mut self) {
        self.previous = self.current;

        loop {
            self.current = self.lexer.next_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            // Error tokens carry their message as the lexeme
            let message = self.current.lexeme.to_string();
            self.error_at_current(&message);
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<(), ()> {
        if self.current.kind == kind {
            self.advance();
            return Ok(());
        }

        self.error_at_current(message);
        Err(())
    }

    fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    /// Skip forward to the next statement boundary after an error.
    fn synchronize(&mut self) {
        while !self.check(TokenKind::Newline) && !self.check(TokenKind::Eof) {
            self.advance();
        }
    }

    /// Does the current token begin an expression (and therefore a call
    /// argument list)?
    fn starts_argument(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Str
                | TokenKind::Int
                | TokenKind::Float
                | TokenKind::Identifier
                | TokenKind::Minus
                | TokenKind::Bang
                | TokenKind::LeftParen
        )
    }

    /// If the current token is a reserved word with no runtime meaning yet,
    /// return its spelling.
    fn reserved_word(&self) -> Option<&'src str> {
        matches!(
            self.current.kind,
            TokenKind::And
                | TokenKind::Or
                | TokenKind::Not
                | TokenKind::For
                | TokenKind::In
                | TokenKind::Return
                | TokenKind::Struct
                | TokenKind::Defer
                | TokenKind::Spawn
                | TokenKind::Panic
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Nil
                | TokenKind::TypeInt
                | TokenKind::TypeFloat
                | TokenKind::TypeBool
                | TokenKind::TypeString
                | TokenKind::TypeVoid
                | TokenKind::TypeByte
        )
        .then_some(self.current.lexeme)
    }

    fn node(&self, kind: AstKind) -> AstNode {
        AstNode::new(kind, self.previous.line, self.previous.column)
    }

    fn error_at_current(&mut self, message: &str) {
        let (line, column) = (self.current.line, self.current.column);
        self.error_at(message, line, column);
    }

    fn error_at_previous(&mut self, message: &str) {
        let (line, column) = (self.previous.line, self.previous.column);
        self.error_at(message, line, column);
    }

    fn error_at(&mut self, message: &str, line: u32, column: u32) {
        self.had_error = true;
        self.errors.push(ParseError {
            message: message.to_string(),
            line,
            column,
        });
    }
}

fn binary(op: BinaryOp, left: AstNode, right: AstNode, op_token: Token<'_>) -> AstNode {
    AstNode::new(
        AstKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        op_token.line,
        op_token.column,
    )
}

// ============================================================================
// Tests
// ============================================================================
