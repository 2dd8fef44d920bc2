//! Expression parser for MiniJava.
//! Precedence, loosest first: `&&`, `<`, `+ -`, `*`, `!`, postfix, primary.

use super::{BinaryOp, Expr, Ident, Parser, Span};
use crate::diagnostics::{codes, Diagnostic};
use crate::lexer::TokenKind;
use crate::semantic::is_integer_literal;

/// Trait extension for expression parsing
pub trait ExpressionParser {
    fn expression(&mut self) -> Option<Expr>;
}

impl<'a> ExpressionParser for Parser<'a> {
    fn expression(&mut self) -> Option<Expr> {
        self.parse_and()
    }
}

impl<'a> Parser<'a> {
    fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
        let span = left.span().merge(&right.span());
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
            span,
        }
    }

    /// Parse logical AND: a && b
    fn parse_and(&mut self) -> Option<Expr> {
        let mut expr = self.parse_comparison()?;

        while self.match_token(TokenKind::AmpersandAmpersand) {
            let right = self.parse_comparison()?;
            expr = Self::binary(expr, BinaryOp::And, right);
        }

        Some(expr)
    }

    /// Parse comparison: a < b
    fn parse_comparison(&mut self) -> Option<Expr> {
        let mut expr = self.parse_additive()?;

        while self.match_token(TokenKind::Less) {
            let right = self.parse_additive()?;
            expr = Self::binary(expr, BinaryOp::Lt, right);
        }

        Some(expr)
    }

    /// Parse additive: a + b, a - b
    fn parse_additive(&mut self) -> Option<Expr> {
        let mut expr = self.parse_multiplicative()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            expr = Self::binary(expr, op, right);
        }

        Some(expr)
    }

    /// Parse multiplicative: a * b
    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut expr = self.parse_unary()?;

        while self.match_token(TokenKind::Star) {
            let right = self.parse_unary()?;
            expr = Self::binary(expr, BinaryOp::Mul, right);
        }

        Some(expr)
    }

    /// Parse unary: !a
    fn parse_unary(&mut self) -> Option<Expr> {
        if self.check(TokenKind::Bang) {
            let start = self.span_of_current();
            self.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(&operand.span());
            return Some(Expr::Not {
                operand: Box::new(operand),
                span,
            });
        }

        self.parse_postfix()
    }

    /// Parse postfix chains: a[i], a.length, a.m(args)
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.match_token(TokenKind::LeftBracket) {
                let index = self.expression()?;
                self.expect(TokenKind::RightBracket, "expected ']' after array index")?;
                let span = expr.span().merge(&self.previous_span());
                expr = Expr::ArrayLookup {
                    array: Box::new(expr),
                    index: Box::new(index),
                    span,
                };
            } else if self.match_token(TokenKind::Dot) {
                let member = self.expect_identifier("expected 'length' or a method name after '.'")?;

                if member.name == "length" && !self.check(TokenKind::LeftParen) {
                    let span = expr.span().merge(&member.span);
                    expr = Expr::ArrayLength {
                        array: Box::new(expr),
                        span,
                    };
                    continue;
                }

                self.expect(TokenKind::LeftParen, "expected '(' after method name")?;
                let args = self.arguments()?;
                self.expect(TokenKind::RightParen, "expected ')' after arguments")?;
                let span = expr.span().merge(&self.previous_span());
                expr = Expr::Call {
                    receiver: Box::new(expr),
                    method: member,
                    args,
                    span,
                };
            } else {
                break;
            }
        }

        Some(expr)
    }

    /// Comma-separated argument list, possibly empty
    fn arguments(&mut self) -> Option<Vec<Expr>> {
        let mut args = Vec::new();

        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        Some(args)
    }

    /// Parse primary expressions
    fn parse_primary(&mut self) -> Option<Expr> {
        let token = self.peek().clone();
        let span = Span::new(token.offset, token.length);

        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                self.integer_literal(&token.lexeme, span)
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::BoolLiteral { value: true, span })
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::BoolLiteral { value: false, span })
            }
            TokenKind::Identifier => {
                self.advance();
                Some(Expr::Identifier(Ident::new(token.lexeme, span)))
            }
            TokenKind::This => {
                self.advance();
                Some(Expr::This(span))
            }
            TokenKind::New => {
                self.advance();
                self.parse_allocation(span)
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(TokenKind::RightParen, "expected ')' after expression")?;
                Some(Expr::Paren {
                    inner: Box::new(inner),
                    span: span.merge(&self.previous_span()),
                })
            }
            _ => {
                self.error_at_current(
                    codes::EXPECTED_EXPRESSION,
                    &format!("expected expression, found '{}'", token.lexeme),
                );
                None
            }
        }
    }

    /// `new int [ Expr ]` or `new Id ( )`, after `new` has been consumed
    fn parse_allocation(&mut self, start: Span) -> Option<Expr> {
        if self.match_token(TokenKind::Int) {
            self.expect(TokenKind::LeftBracket, "expected '[' after 'new int'")?;
            let size = self.expression()?;
            self.expect(TokenKind::RightBracket, "expected ']' after array size")?;
            return Some(Expr::NewArray {
                size: Box::new(size),
                span: start.merge(&self.previous_span()),
            });
        }

        let class = self.expect_identifier("expected class name or 'int' after 'new'")?;
        self.expect(TokenKind::LeftParen, "expected '(' after class name")?;
        self.expect(TokenKind::RightParen, "expected ')' in allocation")?;
        Some(Expr::NewObject {
            class,
            span: start.merge(&self.previous_span()),
        })
    }

    fn integer_literal(&mut self, lexeme: &str, span: Span) -> Option<Expr> {
        if !is_integer_literal(lexeme) {
            self.error_at(
                codes::INVALID_NUMBER,
                &format!("integer literal '{}' does not fit in an int", lexeme),
                span,
            );
            return None;
        }

        if lexeme.len() > 1 && lexeme.starts_with('0') {
            self.reporter.report_with_label(
                Diagnostic::warning(
                    codes::LEADING_ZERO_LITERAL,
                    format!("integer literal '{}' has a leading zero", lexeme),
                )
                .with_help("MiniJava literals are always decimal; the zero is ignored"),
                span.offset,
                span.length,
                "read as decimal",
            );
        }

        let value = lexeme.parse::<i32>().unwrap_or_default();
        Some(Expr::IntLiteral { value, span })
    }

    fn span_of_current(&self) -> Span {
        let token = self.peek();
        Span::new(token.offset, token.length)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::parse_source;
    use super::super::{BinaryOp, Expr, Stmt};

    fn parse_print(expr: &str) -> Expr {
        let source = format!(
            "class M {{ public static void main(String[] a) {{ System.out.println({}); }} }}",
            expr
        );
        let (program, reporter) = parse_source(&source);
        assert!(!reporter.has_errors(), "{:?}", reporter.diagnostics());
        match program.expect("program").main.body.into_iter().next() {
            Some(Stmt::Print(expr)) => expr,
            other => panic!("expected print statement, got {:?}", other),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        match parse_print("1 + 2 * 3") {
            Expr::Binary { op, right, .. } => {
                assert_eq!(op, BinaryOp::Add);
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn and_is_loosest() {
        match parse_print("a < b && !c") {
            Expr::Binary { left, op, right, .. } => {
                assert_eq!(op, BinaryOp::And);
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Lt, .. }));
                assert!(matches!(*right, Expr::Not { .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn postfix_chains_nest_left_to_right() {
        match parse_print("new A().b(1, x).c()[2]") {
            Expr::ArrayLookup { array, .. } => match *array {
                Expr::Call {
                    receiver, method, ..
                } => {
                    assert_eq!(method.name, "c");
                    assert!(matches!(*receiver, Expr::Call { ref args, .. } if args.len() == 2));
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn length_is_recognized() {
        assert!(matches!(parse_print("arr.length"), Expr::ArrayLength { .. }));
        assert!(matches!(parse_print("new int[5].length"), Expr::ArrayLength { .. }));
    }

    #[test]
    fn out_of_range_literal_is_an_error() {
        let (_, reporter) = parse_source(
            "class M { public static void main(String[] a) { System.out.println(99999999999); } }",
        );
        assert!(reporter.has_errors());
        assert_eq!(reporter.diagnostics()[0].code, "E005");
    }

    #[test]
    fn leading_zero_literal_warns() {
        let (program, reporter) = parse_source(
            "class M { public static void main(String[] a) { System.out.println(010); } }",
        );
        assert!(!reporter.has_errors());
        assert_eq!(reporter.diagnostics().len(), 1);
        assert_eq!(reporter.diagnostics()[0].code, "W001");
        match program.expect("program").main.body.first() {
            Some(Stmt::Print(Expr::IntLiteral { value, .. })) => assert_eq!(*value, 10),
            other => panic!("unexpected {:?}", other),
        }
    }
}
