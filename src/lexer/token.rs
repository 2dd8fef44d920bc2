//! Token definitions for the MiniJava lexer.

use std::fmt;

/// A token with its kind, lexeme, and position
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub offset: usize,
    pub length: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, offset: usize, length: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            offset,
            length,
        }
    }

    pub fn eof(offset: usize) -> Self {
        Self::new(TokenKind::Eof, "", offset, 0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}('{}')", self.kind, self.lexeme)
    }
}

/// All token kinds in MiniJava
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    IntLiteral,

    Identifier,

    // Keywords
    Class,
    Public,
    Static,
    Void,
    Extends,
    Return,
    Int,
    Boolean,
    If,
    Else,
    While,
    True,
    False,
    This,
    New,
    String,

    /// `System.out.println`, scanned as a single token
    Println,

    // Operators
    AmpersandAmpersand, // &&
    Less,               // <
    Plus,               // +
    Minus,              // -
    Star,               // *
    Bang,               // !
    Equal,              // =
    Dot,                // .
    Comma,              // ,
    Semicolon,          // ;

    // Delimiters
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]

    // Special
    Eof,
    Error,
}

impl TokenKind {
    /// Check if this token can begin a type annotation
    pub fn can_start_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Int | TokenKind::Boolean | TokenKind::Identifier
        )
    }
}

/// Map string to keyword token kind
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    match ident {
        "class" => Some(TokenKind::Class),
        "public" => Some(TokenKind::Public),
        "static" => Some(TokenKind::Static),
        "void" => Some(TokenKind::Void),
        "extends" => Some(TokenKind::Extends),
        "return" => Some(TokenKind::Return),

        // Types
        "int" => Some(TokenKind::Int),
        "boolean" => Some(TokenKind::Boolean),
        "String" => Some(TokenKind::String),

        // Control flow
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "while" => Some(TokenKind::While),

        // Values
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "this" => Some(TokenKind::This),
        "new" => Some(TokenKind::New),

        _ => None,
    }
}
