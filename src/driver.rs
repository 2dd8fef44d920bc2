//! Driver that runs one compiled unit through the pipeline.

use tracing::{error, info};

use crate::diagnostics::{Diagnostic, DiagnosticReporter};
use crate::lexer::Scanner;
use crate::parser::Parser;
use crate::semantic::{self, CheckOptions, LayoutReport};

/// The compilation driver
pub struct Driver {
    file: String,
    source: String,
    check_options: CheckOptions,
    dump_ast: bool,
    dump_tokens: bool,
}

impl Driver {
    pub fn new(file: String, source: String) -> Self {
        Self {
            file,
            source,
            check_options: CheckOptions::default(),
            dump_ast: false,
            dump_tokens: false,
        }
    }

    pub fn set_check_options(&mut self, options: CheckOptions) {
        self.check_options = options;
    }

    pub fn set_dump_ast(&mut self, enabled: bool) {
        self.dump_ast = enabled;
    }

    pub fn set_dump_tokens(&mut self, enabled: bool) {
        self.dump_tokens = enabled;
    }

    /// Run the pipeline. Warnings are printed to stderr on success; on
    /// failure every collected diagnostic is returned.
    pub fn compile(&mut self) -> Result<LayoutReport, Vec<Diagnostic>> {
        let mut reporter = DiagnosticReporter::new(&self.file, &self.source);

        // === Lexical Analysis ===
        let scanner = Scanner::new(&self.source, &mut reporter);
        let tokens = scanner.scan_tokens();
        info!(target: "pipeline", stage = "lex", file = %self.file, tokens = tokens.len());

        if self.dump_tokens {
            eprintln!("=== Tokens ===");
            for token in &tokens {
                eprintln!("  {:>5}  {}", token.offset, token);
            }
            eprintln!();
        }

        if reporter.has_errors() {
            error!(target: "pipeline", stage = "lex", status = "error", errors = reporter.error_count());
            return Err(reporter.take_diagnostics());
        }

        // === Parsing ===
        let mut parser = Parser::new(tokens, &mut reporter);
        let program = parser.parse();

        if self.dump_ast {
            eprintln!("=== AST ===");
            eprintln!("{:#?}", program);
            eprintln!();
        }

        let program = match program {
            Some(program) if !reporter.has_errors() => program,
            _ => {
                error!(target: "pipeline", stage = "parse", status = "error", errors = reporter.error_count());
                return Err(reporter.take_diagnostics());
            }
        };
        info!(
            target: "pipeline",
            stage = "parse",
            status = "ok",
            file = %self.file,
            classes = program.classes.len() + 1,
            "program parsed successfully"
        );

        // === Semantic Analysis ===
        match semantic::analyze(&program, self.check_options) {
            Ok(report) => {
                for diag in reporter.diagnostics() {
                    eprintln!("{}", diag);
                }
                Ok(report)
            }
            Err(err) => {
                error!(target: "pipeline", stage = "semantic", status = "error", code = err.code(), error = %err);
                let span = err.span();
                let label = err.label();
                reporter.report_with_label(err.into_diagnostic(), span.offset, span.length, label);
                Err(reporter.take_diagnostics())
            }
        }
    }
}
