//! mjc - semantic analyzer for MiniJava
//!
//! Builds per-lineage class tables, type-checks every method body and
//! computes field and method offsets for each compiled unit.

pub mod diagnostics;
pub mod driver;
pub mod lexer;
pub mod logging;
pub mod parser;
pub mod semantic;

// Re-export commonly used types
pub use diagnostics::{Diagnostic, DiagnosticLevel, SourceLocation};
pub use driver::Driver;
pub use semantic::{analyze, CheckOptions, LayoutReport, SemanticError};
