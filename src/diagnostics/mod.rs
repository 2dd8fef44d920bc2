//! Diagnostic reporting for lexer, parser and semantic errors.

mod reporter;

pub use reporter::DiagnosticReporter;

use colored::Colorize;
use std::fmt;

/// Location in source code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl SourceLocation {
    pub fn new(file: &str, line: usize, column: usize, length: usize) -> Self {
        Self {
            file: file.to_string(),
            line,
            column,
            length,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "{}", "error".red().bold()),
            DiagnosticLevel::Warning => write!(f, "{}", "warning".yellow().bold()),
        }
    }
}

/// A compiler diagnostic with source context
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: String,
    pub message: String,
    pub location: Option<SourceLocation>,
    pub source_line: Option<String>,
    pub labels: Vec<(usize, usize, String)>, // (column, length, label)
    pub help: Option<String>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn with_level(level: DiagnosticLevel, code: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            code: code.to_string(),
            message: message.into(),
            location: None,
            source_line: None,
            labels: Vec::new(),
            help: None,
            notes: Vec::new(),
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::with_level(DiagnosticLevel::Error, code, message)
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self::with_level(DiagnosticLevel::Warning, code, message)
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_source_line(mut self, line: impl Into<String>) -> Self {
        self.source_line = Some(line.into());
        self
    }

    pub fn with_label(mut self, column: usize, length: usize, label: impl Into<String>) -> Self {
        self.labels.push((column, length, label.into()));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.level, DiagnosticLevel::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header: error[E200]: message
        writeln!(f, "{}[{}]: {}", self.level, self.code.cyan(), self.message)?;

        if let Some(ref loc) = self.location {
            let line_num_width = loc.line.to_string().len();
            let padding = " ".repeat(line_num_width);

            writeln!(f, "{}--> {}", padding, loc.to_string().blue())?;
            writeln!(f, "{} {}", padding, "|".blue())?;

            if let Some(ref source) = self.source_line {
                writeln!(
                    f,
                    "{} {} {}",
                    loc.line.to_string().blue().bold(),
                    "|".blue(),
                    source
                )?;

                for (column, length, label) in &self.labels {
                    let underline_padding = " ".repeat(column.saturating_sub(1));
                    let underline = "^".repeat((*length).max(1));

                    let (colored_underline, colored_label) = match self.level {
                        DiagnosticLevel::Error => {
                            (underline.red().bold().to_string(), label.red().to_string())
                        }
                        DiagnosticLevel::Warning => (
                            underline.yellow().bold().to_string(),
                            label.yellow().to_string(),
                        ),
                    };

                    writeln!(
                        f,
                        "{} {} {}{} {}",
                        padding,
                        "|".blue(),
                        underline_padding,
                        colored_underline,
                        colored_label
                    )?;
                }
            }

            writeln!(f, "{} {}", padding, "|".blue())?;
        }

        if let Some(ref help) = self.help {
            writeln!(f, "   {} {}: {}", "=".blue(), "help".green().bold(), help)?;
        }

        for note in &self.notes {
            writeln!(f, "   {} {}: {}", "=".blue(), "note".cyan().bold(), note)?;
        }

        Ok(())
    }
}

/// Error codes for MiniJava diagnostics
pub mod codes {
    // Lexer errors (E0xx)
    pub const UNEXPECTED_CHARACTER: &str = "E001";
    pub const UNTERMINATED_COMMENT: &str = "E002";
    pub const INVALID_NUMBER: &str = "E005";

    // Parser errors (E1xx)
    pub const EXPECTED_TOKEN: &str = "E100";
    pub const EXPECTED_EXPRESSION: &str = "E101";
    pub const EXPECTED_TYPE: &str = "E103";
    pub const EXPECTED_IDENTIFIER: &str = "E104";
    pub const UNEXPECTED_TOKEN: &str = "E105";

    // Semantic errors (E2xx)
    pub const DUPLICATE_DECLARATION: &str = "E200";
    pub const UNKNOWN_CLASS: &str = "E201";
    pub const UNKNOWN_METHOD: &str = "E202";
    pub const UNKNOWN_SYMBOL: &str = "E203";
    pub const ARITY_MISMATCH: &str = "E204";
    pub const TYPE_MISMATCH: &str = "E205";
    pub const OVERRIDE_SIGNATURE_MISMATCH: &str = "E206";

    // Warning codes (W0xx)
    pub const LEADING_ZERO_LITERAL: &str = "W001";
}
