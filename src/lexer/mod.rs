//! Lexer module for tokenizing MiniJava source code.

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Token, TokenKind};
