//! Semantic errors. Analysis stops at the first one.

use thiserror::Error;

use super::types::Type;
use crate::diagnostics::{codes, Diagnostic};
use crate::parser::Span;

pub type SemanticResult<T> = Result<T, SemanticError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("{kind} '{name}' is already declared{}", scope_suffix(.scope))]
    DuplicateDeclaration {
        kind: DeclKind,
        name: String,
        scope: Option<String>,
        span: Span,
    },

    #[error("cannot find class '{name}'")]
    UnknownClass { name: String, span: Span },

    #[error("no method '{method}' in class '{class}' or its ancestors")]
    UnknownMethod {
        class: String,
        method: String,
        span: Span,
    },

    #[error("cannot find symbol '{name}'{}", scope_suffix(.scope))]
    UnknownSymbol {
        name: String,
        scope: Option<String>,
        span: Span,
    },

    #[error("method '{class}.{method}' takes {expected} argument(s) but {found} were supplied")]
    ArityMismatch {
        class: String,
        method: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("mismatched types in {context}: expected '{expected}', found '{found}'")]
    TypeMismatch {
        context: String,
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("method '{class}.{method}' does not match the signature of '{ancestor}.{method}'")]
    OverrideSignatureMismatch {
        class: String,
        ancestor: String,
        method: String,
        span: Span,
    },
}

/// What kind of name collided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Class,
    Field,
    Method,
    Parameter,
    Variable,
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let word = match self {
            DeclKind::Class => "class",
            DeclKind::Field => "field",
            DeclKind::Method => "method",
            DeclKind::Parameter => "parameter",
            DeclKind::Variable => "variable",
        };
        f.write_str(word)
    }
}

fn scope_suffix(scope: &Option<String>) -> String {
    match scope {
        Some(scope) => format!(" in {}", scope),
        None => String::new(),
    }
}

impl SemanticError {
    pub fn code(&self) -> &'static str {
        match self {
            SemanticError::DuplicateDeclaration { .. } => codes::DUPLICATE_DECLARATION,
            SemanticError::UnknownClass { .. } => codes::UNKNOWN_CLASS,
            SemanticError::UnknownMethod { .. } => codes::UNKNOWN_METHOD,
            SemanticError::UnknownSymbol { .. } => codes::UNKNOWN_SYMBOL,
            SemanticError::ArityMismatch { .. } => codes::ARITY_MISMATCH,
            SemanticError::TypeMismatch { .. } => codes::TYPE_MISMATCH,
            SemanticError::OverrideSignatureMismatch { .. } => codes::OVERRIDE_SIGNATURE_MISMATCH,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            SemanticError::DuplicateDeclaration { span, .. }
            | SemanticError::UnknownClass { span, .. }
            | SemanticError::UnknownMethod { span, .. }
            | SemanticError::UnknownSymbol { span, .. }
            | SemanticError::ArityMismatch { span, .. }
            | SemanticError::TypeMismatch { span, .. }
            | SemanticError::OverrideSignatureMismatch { span, .. } => *span,
        }
    }

    /// Short text placed under the offending source
    pub fn label(&self) -> &'static str {
        match self {
            SemanticError::DuplicateDeclaration { .. } => "declared again here",
            SemanticError::UnknownClass { .. } => "not a declared class",
            SemanticError::UnknownMethod { .. } => "method not found",
            SemanticError::UnknownSymbol { .. } => "not found in this scope",
            SemanticError::ArityMismatch { .. } => "wrong number of arguments",
            SemanticError::TypeMismatch { .. } => "type mismatch",
            SemanticError::OverrideSignatureMismatch { .. } => "incompatible override",
        }
    }

    /// Diagnostic without location; the reporter attaches it
    pub fn into_diagnostic(self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.code(), self.to_string());
        match self {
            SemanticError::TypeMismatch { .. } => {
                diagnostic.with_note("MiniJava has no implicit conversions between types")
            }
            SemanticError::OverrideSignatureMismatch { .. } => diagnostic
                .with_help("an overriding method must keep the return type and parameter types"),
            SemanticError::DuplicateDeclaration {
                kind: DeclKind::Variable,
                ..
            } => diagnostic.with_note("locals and parameters share one namespace"),
            _ => diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offenders() {
        let err = SemanticError::UnknownMethod {
            class: "A".into(),
            method: "foo".into(),
            span: Span::new(3, 3),
        };
        assert_eq!(err.to_string(), "no method 'foo' in class 'A' or its ancestors");
        assert_eq!(err.code(), "E202");
        assert_eq!(err.span(), Span::new(3, 3));

        let err = SemanticError::DuplicateDeclaration {
            kind: DeclKind::Parameter,
            name: "x".into(),
            scope: Some("method 'A.f'".into()),
            span: Span::default(),
        };
        assert_eq!(
            err.to_string(),
            "parameter 'x' is already declared in method 'A.f'"
        );
    }

    #[test]
    fn diagnostics_carry_code_and_notes() {
        let diagnostic = SemanticError::TypeMismatch {
            context: "assignment to 'x'".into(),
            expected: Type::Int,
            found: Type::Boolean,
            span: Span::default(),
        }
        .into_diagnostic();
        assert_eq!(diagnostic.code, codes::TYPE_MISMATCH);
        assert!(diagnostic.is_error());
        assert_eq!(diagnostic.notes.len(), 1);
        assert!(diagnostic.message.contains("expected 'int', found 'boolean'"));
    }
}
