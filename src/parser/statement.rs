//! Statement parser for MiniJava.

use super::expression::ExpressionParser;
use super::{Ident, Parser, Span, Stmt};
use crate::diagnostics::codes;
use crate::lexer::TokenKind;

/// Trait extension for statement parsing
pub trait StatementParser {
    fn statement(&mut self) -> Option<Stmt>;
}

impl<'a> StatementParser for Parser<'a> {
    fn statement(&mut self) -> Option<Stmt> {
        self.parse_statement()
    }
}

impl<'a> Parser<'a> {
    /// Parse statements until one of `terminators` (or end of input) is next
    pub(crate) fn statements_until(&mut self, terminators: &[TokenKind]) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.is_at_end() && !terminators.contains(&self.peek().kind) {
            let before = self.current;
            match self.statement() {
                Some(stmt) => statements.push(stmt),
                None => {
                    self.synchronize();
                    if self.current == before {
                        self.advance();
                    }
                }
            }
        }

        statements
    }

    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        match self.peek().kind {
            TokenKind::LeftBrace => self.block_statement(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Println => self.print_statement(),
            TokenKind::Identifier => self.assignment_statement(),
            _ => {
                let found = self.peek().lexeme.clone();
                self.error_at_current(
                    codes::UNEXPECTED_TOKEN,
                    &format!("expected statement, found '{}'", found),
                );
                None
            }
        }
    }

    /// `{ Stmt* }`
    fn block_statement(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::LeftBrace, "expected '{'")?;
        let statements = self.statements_until(&[TokenKind::RightBrace]);
        self.expect(TokenKind::RightBrace, "expected '}' to close block")?;
        Some(Stmt::Block(statements))
    }

    /// `if ( Expr ) Stmt else Stmt`
    fn if_statement(&mut self) -> Option<Stmt> {
        self.advance(); // consume 'if'
        self.expect(TokenKind::LeftParen, "expected '(' after 'if'")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after if condition")?;
        let then_branch = self.statement()?;
        self.expect(TokenKind::Else, "expected 'else' branch")?;
        let else_branch = self.statement()?;

        Some(Stmt::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    /// `while ( Expr ) Stmt`
    fn while_statement(&mut self) -> Option<Stmt> {
        self.advance(); // consume 'while'
        self.expect(TokenKind::LeftParen, "expected '(' after 'while'")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after while condition")?;
        let body = self.statement()?;

        Some(Stmt::While {
            condition,
            body: Box::new(body),
        })
    }

    /// `System.out.println ( Expr ) ;`
    fn print_statement(&mut self) -> Option<Stmt> {
        self.advance(); // consume 'System.out.println'
        self.expect(TokenKind::LeftParen, "expected '(' after 'System.out.println'")?;
        let value = self.expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after print argument")?;
        self.expect(TokenKind::Semicolon, "expected ';' after print statement")?;
        Some(Stmt::Print(value))
    }

    /// `Id = Expr ;` or `Id [ Expr ] = Expr ;`
    fn assignment_statement(&mut self) -> Option<Stmt> {
        let token = self.advance();
        let target = Ident::new(token.lexeme.clone(), Span::new(token.offset, token.length));

        if self.match_token(TokenKind::LeftBracket) {
            let index = self.expression()?;
            self.expect(TokenKind::RightBracket, "expected ']' after array index")?;
            self.expect(TokenKind::Equal, "expected '=' in array assignment")?;
            let value = self.expression()?;
            self.expect(TokenKind::Semicolon, "expected ';' after assignment")?;
            return Some(Stmt::ArrayAssign {
                target,
                index,
                value,
            });
        }

        self.expect(TokenKind::Equal, "expected '=' after assignment target")?;
        let value = self.expression()?;
        self.expect(TokenKind::Semicolon, "expected ';' after assignment")?;
        Some(Stmt::Assign { target, value })
    }
}
