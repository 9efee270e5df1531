//! Parser for the Weft language
//!
//! Recursive descent over the token stream with one token of lookahead
//! (two for telling assignments and calls apart from bare references).
//! Expressions are right-recursive with no precedence levels: every
//! operator binds equally and associates to the right. That is a
//! deliberate property of the language, preserved exactly.

use crate::ast::{BinaryOp, Block, Definitions, Expr, FunctionDefinition, Stmt};
use crate::error::{ErrorKind, Result, WeftError};
use crate::token::{Token, TokenKind};

/// The parser state
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// Create a new parser from tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parse the tokens into a compilation unit
    pub fn parse(&mut self) -> Result<Definitions> {
        let mut items = Vec::new();

        while !self.is_at_end() {
            items.push(self.function_definition()?);
        }

        Ok(Definitions::new(items))
    }

    // ==================== Definitions ====================

    fn function_definition(&mut self) -> Result<FunctionDefinition> {
        let location = self.expect(TokenKind::Fun)?.location;
        let name = self.expect(TokenKind::Identifier)?.text;

        self.expect(TokenKind::OpeningParen)?;

        let mut params = Vec::new();
        if !self.check(TokenKind::ClosingParen) {
            loop {
                params.push(self.expect(TokenKind::Identifier)?.text);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::ClosingParen)?;

        let body = self.block()?;

        Ok(FunctionDefinition { name, params, body, location })
    }

    // ==================== Statements ====================

    fn block(&mut self) -> Result<Block> {
        let location = self.expect(TokenKind::OpeningBrace)?.location;

        let mut items = Vec::new();
        while !self.check(TokenKind::ClosingBrace) && !self.is_at_end() {
            items.push(self.statement()?);
        }

        self.expect(TokenKind::ClosingBrace)?;

        Ok(Block { items, location })
    }

    fn statement(&mut self) -> Result<Stmt> {
        let Some(token) = self.peek() else {
            return Err(WeftError::new(ErrorKind::UnexpectedEnd, None));
        };

        match token.kind {
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Var => self.var_declaration(),
            TokenKind::Return => self.return_statement(),

            // `ident = ...` is an assignment; any other expression start
            // is an expression statement.
            TokenKind::Identifier if self.peek_next_kind() == Some(TokenKind::Equals) => {
                self.assignment()
            }
            TokenKind::Identifier | TokenKind::Integer => {
                let expr = self.expression()?;
                Ok(Stmt::Expr { expr })
            }

            kind => Err(WeftError::new(
                ErrorKind::ExpectedStatement(kind.to_string()),
                Some(token.location.clone()),
            )),
        }
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        let location = self.expect(TokenKind::If)?.location;

        self.expect(TokenKind::OpeningParen)?;
        let condition = self.expression()?;
        self.expect(TokenKind::ClosingParen)?;

        let then_body = self.block()?;

        let else_body = if self.match_token(TokenKind::Else) {
            Some(self.block()?)
        } else {
            None
        };

        Ok(Stmt::If { condition, then_body, else_body, location })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        let location = self.expect(TokenKind::While)?.location;

        self.expect(TokenKind::OpeningParen)?;
        let condition = self.expression()?;
        self.expect(TokenKind::ClosingParen)?;

        let body = self.block()?;

        Ok(Stmt::While { condition, body, location })
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let location = self.expect(TokenKind::Var)?.location;
        let name = self.expect(TokenKind::Identifier)?.text;
        Ok(Stmt::VarDecl { name, location })
    }

    fn return_statement(&mut self) -> Result<Stmt> {
        let location = self.expect(TokenKind::Return)?.location;
        let value = self.expression()?;
        Ok(Stmt::Return { value, location })
    }

    fn assignment(&mut self) -> Result<Stmt> {
        let token = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Equals)?;
        let value = self.expression()?;
        Ok(Stmt::Assign {
            name: token.text,
            value,
            location: token.location,
        })
    }

    // ==================== Expressions ====================

    fn expression(&mut self) -> Result<Expr> {
        let lhs = self.primary()?;

        if self.check(TokenKind::BinaryOperator) {
            let token = self.expect(TokenKind::BinaryOperator)?;
            let op = BinaryOp::from_glyph(&token.text).ok_or_else(|| {
                WeftError::new(
                    ErrorKind::ExpectedExpression(token.text.clone()),
                    Some(token.location.clone()),
                )
            })?;

            // Right recursion: everything after the operator is the rhs.
            let rhs = self.expression()?;

            return Ok(Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                location: token.location,
            });
        }

        Ok(lhs)
    }

    fn primary(&mut self) -> Result<Expr> {
        let Some(token) = self.peek() else {
            return Err(WeftError::new(ErrorKind::UnexpectedEnd, None));
        };

        match token.kind {
            TokenKind::Integer => {
                let token = self.expect(TokenKind::Integer)?;
                let value = token.text.parse::<i64>().map_err(|_| {
                    WeftError::new(
                        ErrorKind::InvalidInteger(token.text.clone()),
                        Some(token.location.clone()),
                    )
                })?;
                Ok(Expr::Integer { value, location: token.location })
            }

            TokenKind::Identifier if self.peek_next_kind() == Some(TokenKind::OpeningParen) => {
                self.call()
            }

            TokenKind::Identifier => {
                let token = self.expect(TokenKind::Identifier)?;
                Ok(Expr::Variable {
                    name: token.text,
                    location: token.location,
                })
            }

            kind => Err(WeftError::new(
                ErrorKind::ExpectedExpression(kind.to_string()),
                Some(token.location.clone()),
            )),
        }
    }

    fn call(&mut self) -> Result<Expr> {
        let token = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::OpeningParen)?;

        let mut args = Vec::new();
        if !self.check(TokenKind::ClosingParen) {
            loop {
                args.push(self.expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::ClosingParen)?;

        Ok(Expr::Call {
            name: token.text,
            args,
            location: token.location,
        })
    }

    // ==================== Helpers ====================

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn peek_next_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.current + 1).map(|t| t.kind)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().map_or(false, |t| t.kind == kind)
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                let token = token.clone();
                self.current += 1;
                Ok(token)
            }
            Some(token) => Err(WeftError::new(
                ErrorKind::ExpectedToken(kind.to_string(), token.kind.to_string()),
                Some(token.location.clone()),
            )),
            None => Err(WeftError::new(ErrorKind::UnexpectedEnd, None)),
        }
    }
}
