//! Recursive-descent parser: tokens to surface AST.
//!
//! Precedence, tight to loose: unary `-`/`!`; `*`/`/`/`%`; `+`/`-`;
//! comparisons; `&&`; `||`; assignment. All binary operators are
//! left-associative except assignment, which is right-associative and sits
//! at the loosest level so it can nest (`a = b = c`) and appear anywhere an
//! expression can (`print(x = 5)`).
mod error;

pub use error::{ParseError, ParseResult};

use crate::ast::surface::*;
use crate::lexer::{Token, TokenKind, Tokens};

pub struct Parser {
    tokens: Tokens<Token>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: Tokens::new(tokens),
        }
    }

    pub fn parse_program(tokens: Vec<Token>) -> ParseResult<Program> {
        let mut parser = Self::new(tokens);
        parser.parse_program_internal()
    }

    /// Parse a single block's worth of statements without the surrounding
    /// braces — used by the REPL, which treats each submitted input as an
    /// implicit block.
    pub fn parse_repl_input(tokens: Vec<Token>) -> ParseResult<Program> {
        Self::parse_program(tokens)
    }

    fn parse_program_internal(&mut self) -> ParseResult<Program> {
        let mut statements = vec![];

        self.skip_terminators();

        while !self.check(&TokenKind::Eof) {
            statements.push(self.parse_statement()?);
            self.expect_terminator_or_end()?;
        }

        Ok(Program { statements })
    }

    // ---- token stream helpers -------------------------------------------

    fn peek(&self) -> &Token {
        self.tokens
            .peek()
            .expect("token stream always ends in Eof")
    }

    fn peek_second(&self) -> Option<&Token> {
        self.tokens.peek_second()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().kind == *kind
    }

    fn advance(&mut self) -> Token {
        self.tokens.advance().expect("token stream always ends in Eof")
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            let found = self.peek().clone();
            Err(ParseError {
                position: found.position,
                message: format!("expected {kind}, found {}", found.kind),
            })
        }
    }

    fn skip_terminators(&mut self) {
        while matches!(self.peek().kind, TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn expect_terminator_or_end(&mut self) -> ParseResult<()> {
        if matches!(
            self.peek().kind,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) {
            self.skip_terminators();
            return Ok(());
        }

        let found = self.peek().clone();
        Err(ParseError {
            position: found.position,
            message: format!(
                "expected newline or ';' after statement, found {}",
                found.kind
            ),
        })
    }

    // ---- statements -------------------------------------------------------

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match &self.peek().kind {
            TokenKind::Val | TokenKind::Var => self.parse_declaration(),
            TokenKind::Def => self.parse_fn_def(),
            TokenKind::While => self.parse_while(),
            TokenKind::Break => {
                let position = self.advance().position;
                Ok(Stmt::Break(position))
            }
            TokenKind::Continue => {
                let position = self.advance().position;
                Ok(Stmt::Continue(position))
            }
            TokenKind::Return => self.parse_return(),
            _ => Ok(Stmt::Expr(self.parse_expression()?)),
        }
    }

    fn parse_declaration(&mut self) -> ParseResult<Stmt> {
        let mutability = match self.advance().kind {
            TokenKind::Val => Mutability::Val,
            TokenKind::Var => Mutability::Var,
            _ => unreachable!("caller checked this"),
        };

        let ident = self.parse_ident()?;
        let position = ident.position;

        let type_annotation = self.parse_optional_type_annotation()?;

        self.expect(TokenKind::Eq)?;
        let value = self.parse_expression()?;

        Ok(Stmt::Declaration(Declaration {
            mutability,
            ident,
            type_annotation,
            value,
            position,
        }))
    }

    fn parse_fn_def(&mut self) -> ParseResult<Stmt> {
        let position = self.expect(TokenKind::Def)?.position;
        let ident = self.parse_ident()?;

        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;

        let return_type = self.parse_optional_type_annotation()?;

        let body = self.parse_block()?;

        Ok(Stmt::FnDef(FnDef {
            ident,
            params,
            return_type,
            body,
            position,
        }))
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let position = self.expect(TokenKind::While)?.position;
        let condition = Box::new(self.parse_expression()?);
        let body = self.parse_block()?;

        Ok(Stmt::While(WhileLoop {
            condition,
            body,
            position,
        }))
    }

    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let position = self.expect(TokenKind::Return)?.position;

        let value = if self.starts_expression() {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(Stmt::Return(value, position))
    }

    fn starts_expression(&self) -> bool {
        !matches!(
            self.peek().kind,
            TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::Eof
                | TokenKind::Else
        )
    }

    // ---- shared bits --------------------------------------------------

    fn parse_ident(&mut self) -> ParseResult<Ident> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Ident {
                    name,
                    position: token.position,
                })
            }
            other => Err(ParseError {
                position: token.position,
                message: format!("expected identifier, found {other}"),
            }),
        }
    }

    fn parse_optional_type_annotation(&mut self) -> ParseResult<Option<TypeName>> {
        if self.check(&TokenKind::Colon) {
            self.advance();
            Ok(Some(self.parse_type_name()?))
        } else {
            Ok(None)
        }
    }

    fn parse_type_name(&mut self) -> ParseResult<TypeName> {
        let ident = self.parse_ident()?;
        Ok(TypeName {
            name: ident.name,
            position: ident.position,
        })
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = vec![];
        let mut seen_default = false;

        while !self.check(&TokenKind::RParen) {
            let ident = self.parse_ident()?;
            let position = ident.position;
            let type_annotation = self.parse_optional_type_annotation()?;

            let default = if self.check(&TokenKind::Eq) {
                self.advance();
                Some(self.parse_expression()?)
            } else {
                None
            };

            if default.is_some() {
                seen_default = true;
            } else if seen_default {
                return Err(ParseError {
                    position,
                    message: format!(
                        "parameter '{}' without a default follows a parameter with one",
                        ident.name
                    ),
                });
            }

            params.push(Param {
                ident,
                type_annotation,
                default,
                position,
            });

            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        Ok(params)
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        let position = self.expect(TokenKind::LBrace)?.position;
        self.skip_terminators();

        let mut statements = vec![];

        while !self.check(&TokenKind::RBrace) {
            statements.push(self.parse_statement()?);
            self.expect_terminator_or_end()?;
        }

        self.expect(TokenKind::RBrace)?;

        Ok(Block {
            statements,
            position,
        })
    }

    // ---- expressions, precedence climbing ---------------------------------

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_assignment_expr()
    }

    /// Loosest level of the precedence chain. Right-associative: the
    /// recursive call on the right lets `a = b = c` parse as `a = (b = c)`.
    fn parse_assignment_expr(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_or()?;

        let op = match self.peek().kind {
            TokenKind::Eq => AssignOp::Eq,
            TokenKind::PlusEq => AssignOp::PlusEq,
            TokenKind::MinusEq => AssignOp::MinusEq,
            _ => return Ok(lhs),
        };

        let target = match lhs {
            Expr::Ident(ident) => ident,
            other => {
                return Err(ParseError {
                    position: other.position(),
                    message: "left-hand side of assignment must be an identifier".to_owned(),
                })
            }
        };
        let position = target.position;

        self.advance();
        let value = Box::new(self.parse_assignment_expr()?);

        Ok(Expr::Assign(Assignment {
            target,
            op,
            value,
            position,
        }))
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_and()?;

        while self.check(&TokenKind::OrOr) {
            let position = self.advance().position;
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinaryExpr {
                op: BinaryOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                position,
            });
        }

        Ok(lhs)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_comparison()?;

        while self.check(&TokenKind::AndAnd) {
            let position = self.advance().position;
            let rhs = self.parse_comparison()?;
            lhs = Expr::Binary(BinaryExpr {
                op: BinaryOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                position,
            });
        }

        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_term()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            let position = self.advance().position;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary(BinaryExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                position,
            });
        }

        Ok(lhs)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_factor()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let position = self.advance().position;
            let rhs = self.parse_factor()?;
            lhs = Expr::Binary(BinaryExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                position,
            });
        }

        Ok(lhs)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_unary()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let position = self.advance().position;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(BinaryExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                position,
            });
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        let position = self.advance().position;
        let operand = Box::new(self.parse_unary()?);

        Ok(Expr::Unary(UnaryExpr {
            op,
            operand,
            position,
        }))
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;

        while self.check(&TokenKind::LParen) {
            let position = self.advance().position;
            let args = self.parse_args()?;
            self.expect(TokenKind::RParen)?;
            expr = Expr::Call(Call {
                callee: Box::new(expr),
                args,
                position,
            });
        }

        Ok(expr)
    }

    fn parse_args(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = vec![];

        while !self.check(&TokenKind::RParen) {
            args.push(self.parse_expression()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        Ok(args)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Int(value) => {
                self.advance();
                Ok(Expr::Int(IntLiteral {
                    value,
                    position: token.position,
                }))
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(Expr::Str(StrLiteral {
                    value,
                    position: token.position,
                }))
            }
            TokenKind::Bool(value) => {
                self.advance();
                Ok(Expr::Bool(BoolLiteral {
                    value,
                    position: token.position,
                }))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Ident(Ident {
                    name,
                    position: token.position,
                }))
            }
            TokenKind::LBrace => Ok(Expr::Block(self.parse_block()?)),
            TokenKind::If => Ok(Expr::If(self.parse_if()?)),
            TokenKind::Fn => Ok(Expr::Lambda(self.parse_block_lambda()?)),
            TokenKind::LParen if self.looks_like_compact_lambda() => {
                Ok(Expr::Lambda(self.parse_compact_lambda()?))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            other => Err(ParseError {
                position: token.position,
                message: format!("unexpected {other} while parsing an expression"),
            }),
        }
    }

    fn parse_if(&mut self) -> ParseResult<If> {
        let position = self.expect(TokenKind::If)?.position;
        let condition = Box::new(self.parse_expression()?);

        if self.check(&TokenKind::Then) {
            self.advance();
            let then_expr = self.parse_expression()?;
            self.expect(TokenKind::Else)?;
            let else_expr = self.parse_expression()?;

            return Ok(If {
                condition,
                then_branch: Self::wrap_as_block(then_expr),
                else_branch: Some(Self::wrap_as_block(else_expr)),
                position,
            });
        }

        let then_branch = self.parse_block()?;

        let else_branch = if self.check(&TokenKind::Else) {
            self.advance();
            if self.check(&TokenKind::If) {
                let nested = self.parse_if()?;
                let nested_position = nested.position;
                Some(Block {
                    statements: vec![Stmt::Expr(Expr::If(nested))],
                    position: nested_position,
                })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(If {
            condition,
            then_branch,
            else_branch,
            position,
        })
    }

    fn wrap_as_block(expr: Expr) -> Block {
        let position = expr.position();
        Block {
            statements: vec![Stmt::Expr(expr)],
            position,
        }
    }

    fn parse_block_lambda(&mut self) -> ParseResult<Lambda> {
        let position = self.expect(TokenKind::Fn)?.position;
        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;

        Ok(Lambda {
            params,
            body: LambdaBody::Block(body),
            position,
        })
    }

    fn parse_compact_lambda(&mut self) -> ParseResult<Lambda> {
        let position = self.expect(TokenKind::LParen)?.position;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Arrow)?;
        let body = self.parse_expression()?;

        Ok(Lambda {
            params,
            body: LambdaBody::Expr(Box::new(body)),
            position,
        })
    }

    /// Lookahead for `(params) => ..`: scan to the matching close paren and
    /// check whether `=>` follows. Without this we cannot tell `(x)` (a
    /// grouped expression) from `(x) => x` (a lambda) until after the close
    /// paren, and the grammar gives no other hint.
    fn looks_like_compact_lambda(&self) -> bool {
        let mut depth = 0i32;
        let mut scratch = self.tokens.clone();

        loop {
            let Some(token) = scratch.peek().cloned() else {
                return false;
            };
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        scratch.advance();
                        break;
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            scratch.advance();
        }

        matches!(scratch.peek().map(|t| &t.kind), Some(TokenKind::Arrow))
    }
}
