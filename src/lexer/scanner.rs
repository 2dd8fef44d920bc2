//! Scanner for MiniJava source code tokenization.

use super::token::{lookup_keyword, Token, TokenKind};
use crate::diagnostics::{codes, Diagnostic, DiagnosticReporter};

const PRINTLN_TAIL: &str = ".out.println";

/// Scanner that produces tokens from source code
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_offset: usize,
    start_offset: usize,
    reporter: &'a mut DiagnosticReporter,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, reporter: &'a mut DiagnosticReporter) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_offset: 0,
            start_offset: 0,
            reporter,
        }
    }

    /// Tokenize the entire source
    pub fn scan_tokens(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;

            if token.kind != TokenKind::Error {
                tokens.push(token);
            }

            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Scan a single token
    fn scan_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        self.start_offset = self.current_offset;

        match self.advance() {
            None => Token::eof(self.current_offset),
            Some((offset, c)) => {
                self.start_offset = offset;
                self.current_offset = offset + c.len_utf8();

                match c {
                    '(' => self.make_token(TokenKind::LeftParen),
                    ')' => self.make_token(TokenKind::RightParen),
                    '{' => self.make_token(TokenKind::LeftBrace),
                    '}' => self.make_token(TokenKind::RightBrace),
                    '[' => self.make_token(TokenKind::LeftBracket),
                    ']' => self.make_token(TokenKind::RightBracket),
                    ',' => self.make_token(TokenKind::Comma),
                    ';' => self.make_token(TokenKind::Semicolon),
                    '.' => self.make_token(TokenKind::Dot),
                    '<' => self.make_token(TokenKind::Less),
                    '+' => self.make_token(TokenKind::Plus),
                    '-' => self.make_token(TokenKind::Minus),
                    '*' => self.make_token(TokenKind::Star),
                    '!' => self.make_token(TokenKind::Bang),
                    '=' => self.make_token(TokenKind::Equal),

                    '&' => {
                        if self.match_char('&') {
                            self.make_token(TokenKind::AmpersandAmpersand)
                        } else {
                            self.reporter.report(
                                Diagnostic::error(codes::UNEXPECTED_CHARACTER, "unexpected character '&'")
                                    .with_help("MiniJava has no bitwise operators; use '&&' for logical and"),
                                self.start_offset,
                                1,
                            );
                            Token::new(TokenKind::Error, "&", self.start_offset, 1)
                        }
                    }

                    '0'..='9' => self.scan_number(),

                    c if is_ident_start(c) => self.scan_identifier(c),

                    _ => self.error_token(c),
                }
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.advance();
                }
                Some('/') => {
                    let mut chars = self.chars.clone();
                    chars.next(); // consume '/'
                    match chars.peek() {
                        Some((_, '/')) => {
                            self.advance(); // '/'
                            self.advance(); // '/'
                            while self.peek().is_some_and(|c| c != '\n') {
                                self.advance();
                            }
                        }
                        Some((_, '*')) => {
                            let start = self.current_offset;
                            self.advance(); // '/'
                            self.advance(); // '*'
                            let mut depth = 1;
                            while depth > 0 {
                                match self.advance() {
                                    None => {
                                        self.reporter.report(
                                            Diagnostic::error(
                                                codes::UNTERMINATED_COMMENT,
                                                "unterminated block comment",
                                            )
                                            .with_help("close the comment with '*/'"),
                                            start,
                                            2,
                                        );
                                        break;
                                    }
                                    Some((_, '*')) => {
                                        if self.match_char('/') {
                                            depth -= 1;
                                        }
                                    }
                                    Some((_, '/')) => {
                                        if self.match_char('*') {
                                            depth += 1;
                                        }
                                    }
                                    _ => {}
                                }
                            }
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((_, c)) = result {
            self.current_offset += c.len_utf8();
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        let lexeme = &self.source[self.start_offset..self.current_offset];
        Token::new(kind, lexeme, self.start_offset, self.current_offset - self.start_offset)
    }

    fn error_token(&mut self, c: char) -> Token {
        self.reporter.report(
            Diagnostic::error(codes::UNEXPECTED_CHARACTER, format!("unexpected character '{}'", c)),
            self.start_offset,
            c.len_utf8(),
        );
        Token::new(TokenKind::Error, c, self.start_offset, c.len_utf8())
    }

    fn scan_identifier(&mut self, first: char) -> Token {
        let mut ident = String::new();
        ident.push(first);

        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if ident == "System" && self.at_println_tail() {
            for _ in PRINTLN_TAIL.chars() {
                self.advance();
            }
            return self.make_token(TokenKind::Println);
        }

        let kind = lookup_keyword(&ident).unwrap_or(TokenKind::Identifier);
        self.make_token(kind)
    }

    /// `System` followed directly by `.out.println` and not by more identifier characters
    fn at_println_tail(&self) -> bool {
        let rest = &self.source[self.current_offset..];
        rest.starts_with(PRINTLN_TAIL)
            && !rest[PRINTLN_TAIL.len()..]
                .chars()
                .next()
                .is_some_and(is_ident_continue)
    }

    fn scan_number(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        self.make_token(TokenKind::IntLiteral)
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_xid::UnicodeXID::is_xid_start(c)
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || unicode_xid::UnicodeXID::is_xid_continue(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> (Vec<TokenKind>, DiagnosticReporter) {
        let mut reporter = DiagnosticReporter::new("test.java", source);
        let tokens = Scanner::new(source, &mut reporter).scan_tokens();
        (tokens.into_iter().map(|t| t.kind).collect(), reporter)
    }

    #[test]
    fn scans_keywords_operators_and_literals() {
        let (kinds, reporter) = kinds("class A extends B { int[] a; boolean b; } x && y < 10");
        assert!(!reporter.has_errors());
        assert_eq!(
            kinds,
            vec![
                TokenKind::Class,
                TokenKind::Identifier,
                TokenKind::Extends,
                TokenKind::Identifier,
                TokenKind::LeftBrace,
                TokenKind::Int,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Boolean,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::RightBrace,
                TokenKind::Identifier,
                TokenKind::AmpersandAmpersand,
                TokenKind::Identifier,
                TokenKind::Less,
                TokenKind::IntLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn println_is_a_single_token() {
        let (kinds, _) = kinds("System.out.println(1);");
        assert_eq!(kinds[0], TokenKind::Println);
        assert_eq!(kinds[1], TokenKind::LeftParen);

        let (kinds, _) = self::kinds("System.out.printlnx");
        assert_eq!(kinds[0], TokenKind::Identifier);
        assert_eq!(kinds[1], TokenKind::Dot);
    }

    #[test]
    fn comments_are_skipped() {
        let (kinds, reporter) = kinds("// line\n/* block /* nested */ */ this");
        assert!(!reporter.has_errors());
        assert_eq!(kinds, vec![TokenKind::This, TokenKind::Eof]);
    }

    #[test]
    fn unterminated_comment_is_reported_at_its_start() {
        let (kinds, reporter) = kinds("this\n  /* open /* inner */ never closed");
        assert_eq!(kinds, vec![TokenKind::This, TokenKind::Eof]);
        assert_eq!(reporter.error_count(), 1);

        let diag = &reporter.diagnostics()[0];
        assert_eq!(diag.code, codes::UNTERMINATED_COMMENT);
        let location = diag.location.as_ref().expect("location");
        assert_eq!((location.line, location.column), (2, 3));
    }

    #[test]
    fn unexpected_characters_are_reported_and_dropped() {
        let (kinds, reporter) = kinds("a # b & c");
        assert_eq!(reporter.error_count(), 2);
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }
}
