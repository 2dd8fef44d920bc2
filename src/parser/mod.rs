//! Parser module for building the MiniJava AST from tokens.

mod ast;
mod expression;
mod statement;

pub use ast::*;
pub use expression::ExpressionParser;
pub use statement::StatementParser;

use crate::diagnostics::{codes, Diagnostic, DiagnosticReporter};
use crate::lexer::{Token, TokenKind};

/// Recursive descent parser for MiniJava
pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    reporter: &'a mut DiagnosticReporter,
    panic_mode: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, reporter: &'a mut DiagnosticReporter) -> Self {
        let tokens = if tokens.is_empty() {
            vec![Token::eof(0)]
        } else {
            tokens
        };

        Self {
            tokens,
            current: 0,
            reporter,
            panic_mode: false,
        }
    }

    /// Parse an entire compiled unit: the main class followed by class declarations.
    ///
    /// Returns `None` when the main class itself cannot be parsed; errors in
    /// later classes are reported and the parser resynchronises at the next
    /// `class` keyword.
    pub fn parse(&mut self) -> Option<Program> {
        let main = match self.main_class() {
            Some(main) => main,
            None => {
                self.synchronize_to_class();
                return None;
            }
        };

        let mut classes = Vec::new();

        while !self.is_at_end() {
            match self.class_declaration() {
                Some(class) => classes.push(class),
                None => self.synchronize_to_class(),
            }
        }

        Some(Program { main, classes })
    }

    /// `class Id { public static void main ( String [ ] Id ) { VarDecl* Stmt* } }`
    fn main_class(&mut self) -> Option<MainClass> {
        self.expect(TokenKind::Class, "expected 'class' to open the main class")?;
        let name = self.expect_identifier("expected main class name")?;
        self.expect(TokenKind::LeftBrace, "expected '{' after main class name")?;
        self.expect(TokenKind::Public, "expected 'public' before main method")?;
        self.expect(TokenKind::Static, "expected 'static' before main method")?;
        self.expect(TokenKind::Void, "expected 'void' before main method")?;

        let main_name = self.expect_identifier("expected 'main'")?;
        if main_name.name != "main" {
            self.error_at(
                codes::EXPECTED_IDENTIFIER,
                &format!("expected 'main', found '{}'", main_name.name),
                main_name.span,
            );
            return None;
        }

        self.expect(TokenKind::LeftParen, "expected '(' after 'main'")?;
        self.expect(TokenKind::String, "expected 'String' parameter type")?;
        self.expect(TokenKind::LeftBracket, "expected '[' after 'String'")?;
        self.expect(TokenKind::RightBracket, "expected ']' after '['")?;
        let arg = self.expect_identifier("expected parameter name")?;
        self.expect(TokenKind::RightParen, "expected ')' after parameter")?;
        self.expect(TokenKind::LeftBrace, "expected '{' to open main body")?;

        let locals = self.var_declarations();
        let body = self.statements_until(&[TokenKind::RightBrace]);

        self.expect(TokenKind::RightBrace, "expected '}' to close main body")?;
        self.expect(TokenKind::RightBrace, "expected '}' to close main class")?;

        Some(MainClass {
            name,
            arg,
            locals,
            body,
        })
    }

    /// `class Id [extends Id] { VarDecl* MethodDecl* }`
    fn class_declaration(&mut self) -> Option<ClassDecl> {
        self.expect(TokenKind::Class, "expected 'class'")?;
        let name = self.expect_identifier("expected class name")?;

        let parent = if self.match_token(TokenKind::Extends) {
            Some(self.expect_identifier("expected parent class name after 'extends'")?)
        } else {
            None
        };

        self.expect(TokenKind::LeftBrace, "expected '{' for class body")?;

        let fields = self.var_declarations();

        let mut methods = Vec::new();
        while self.check(TokenKind::Public) {
            match self.method_declaration() {
                Some(method) => methods.push(method),
                None => return None,
            }
        }

        self.expect(TokenKind::RightBrace, "expected '}' after class body")?;

        Some(ClassDecl {
            name,
            parent,
            fields,
            methods,
        })
    }

    /// `public Type Id ( Params ) { VarDecl* Stmt* return Expr ; }`
    fn method_declaration(&mut self) -> Option<MethodDecl> {
        self.expect(TokenKind::Public, "expected 'public'")?;
        let return_type = self.parse_type()?;
        let name = self.expect_identifier("expected method name")?;
        self.expect(TokenKind::LeftParen, "expected '(' after method name")?;

        let mut params = Vec::new();
        if self.peek().kind.can_start_type() {
            loop {
                let type_spec = self.parse_type()?;
                let name = self.expect_identifier("expected parameter name")?;
                params.push(VarDecl { type_spec, name });

                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RightParen, "expected ')' after parameters")?;
        self.expect(TokenKind::LeftBrace, "expected '{' for method body")?;

        let locals = self.var_declarations();
        let body = self.statements_until(&[TokenKind::Return, TokenKind::RightBrace]);

        self.expect(TokenKind::Return, "expected 'return' at the end of the method body")?;
        let return_expr = self.expression()?;
        self.expect(TokenKind::Semicolon, "expected ';' after return expression")?;
        self.expect(TokenKind::RightBrace, "expected '}' after method body")?;

        Some(MethodDecl {
            return_type,
            name,
            params,
            locals,
            body,
            return_expr,
        })
    }

    /// Parse `Type Id ;` declarations until the next token cannot start one
    fn var_declarations(&mut self) -> Vec<VarDecl> {
        let mut decls = Vec::new();

        while self.is_var_decl_start() {
            match self.var_declaration() {
                Some(decl) => decls.push(decl),
                None => self.synchronize(),
            }
        }

        decls
    }

    fn var_declaration(&mut self) -> Option<VarDecl> {
        let type_spec = self.parse_type()?;
        let name = self.expect_identifier("expected variable name")?;
        self.expect(TokenKind::Semicolon, "expected ';' after variable declaration")?;
        Some(VarDecl { type_spec, name })
    }

    /// `int` and `boolean` always start a declaration; an identifier only when
    /// followed by another identifier (`Tree left;`)
    fn is_var_decl_start(&self) -> bool {
        match self.peek().kind {
            TokenKind::Int | TokenKind::Boolean => true,
            TokenKind::Identifier => self.peek_next().kind == TokenKind::Identifier,
            _ => false,
        }
    }

    /// `int [ ]` | `boolean` | `int` | Id
    fn parse_type(&mut self) -> Option<TypeSpec> {
        let token = self.peek().clone();
        let start = Span::new(token.offset, token.length);

        let base = match token.kind {
            TokenKind::Int => {
                self.advance();
                if self.match_token(TokenKind::LeftBracket) {
                    self.expect(TokenKind::RightBracket, "expected ']' in 'int[]'")?;
                    BaseType::IntArray
                } else {
                    BaseType::Int
                }
            }
            TokenKind::Boolean => {
                self.advance();
                BaseType::Boolean
            }
            TokenKind::Identifier => {
                self.advance();
                BaseType::Named(token.lexeme.clone())
            }
            _ => {
                self.error_at_current(
                    codes::EXPECTED_TYPE,
                    &format!("expected type, found '{}'", token.lexeme),
                );
                return None;
            }
        };

        Some(TypeSpec {
            base,
            span: start.merge(&self.previous_span()),
        })
    }

    // === Helper methods ===

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next(&self) -> &Token {
        let index = (self.current + 1).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn previous_span(&self) -> Span {
        let token = self.previous();
        Span::new(token.offset, token.length)
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Option<&Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            self.error_at_current(codes::EXPECTED_TOKEN, message);
            None
        }
    }

    fn expect_identifier(&mut self, message: &str) -> Option<Ident> {
        if self.check(TokenKind::Identifier) {
            let token = self.advance();
            Some(Ident::new(
                token.lexeme.clone(),
                Span::new(token.offset, token.length),
            ))
        } else {
            self.error_at_current(codes::EXPECTED_IDENTIFIER, message);
            None
        }
    }

    fn error_at_current(&mut self, code: &str, message: &str) {
        let token = self.peek();
        let span = Span::new(token.offset, token.length);
        self.error_at(code, message, span);
    }

    fn error_at(&mut self, code: &str, message: &str, span: Span) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;

        self.reporter
            .report(Diagnostic::error(code, message), span.offset, span.length);
    }

    /// Error recovery inside a body: skip to the token after the next `;`, or
    /// stop before a token that opens or closes a construct
    fn synchronize(&mut self) {
        self.panic_mode = false;

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon && self.current > 0 {
                return;
            }

            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Public
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Println
                | TokenKind::RightBrace => return,
                _ => {}
            }

            self.advance();
        }
    }

    /// Error recovery at the top level: skip to the next `class` keyword
    fn synchronize_to_class(&mut self) {
        self.panic_mode = false;

        if self.check(TokenKind::Class) {
            self.advance();
        }
        while !self.is_at_end() && !self.check(TokenKind::Class) {
            self.advance();
        }
    }
}
