//! MiniJava semantic analyzer CLI
//!
//! Usage: mjc [OPTIONS] <INPUT>...

use clap::Parser;
use colored::Colorize;
use mjc::logging::{init_logging, LogLevel, LogOptions};
use mjc::{CheckOptions, Diagnostic, Driver};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "mjc")]
#[command(version = "0.1.0")]
#[command(about = "MiniJava semantic analyzer - type checks programs and prints field/method offsets", long_about = None)]
struct Args {
    /// MiniJava source files (.java); each one is checked independently
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Require boolean conditions and operand types for `&&`, `<` and `!`
    #[arg(long, default_value_t = false)]
    strict_conditions: bool,

    /// Print the AST for debugging
    #[arg(long, default_value_t = false)]
    dump_ast: bool,

    /// Print tokens for debugging
    #[arg(long, default_value_t = false)]
    dump_tokens: bool,

    /// Log verbosity (error, warn, info, debug, trace); overrides MJC_LOG_LEVEL
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(&LogOptions::resolve(args.log_level));

    let show_headers = args.inputs.len() > 1;
    let mut failed = 0usize;

    for input in &args.inputs {
        if show_headers {
            println!("== {} ==", input.display());
        }
        if !analyze_file(input, &args) {
            failed += 1;
        }
    }

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Check one file and print its report; returns whether it passed
fn analyze_file(input: &Path, args: &Args) -> bool {
    // Validate input file extension
    if input.extension().map_or(true, |ext| ext != "java") {
        eprintln!(
            "{}: input file must have .java extension: {}",
            "error".red().bold(),
            input.display()
        );
        return false;
    }

    let source = match std::fs::read_to_string(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!(
                "{}: could not read file '{}': {}",
                "error".red().bold(),
                input.display(),
                e
            );
            return false;
        }
    };

    let mut driver = Driver::new(input.to_string_lossy().to_string(), source);
    driver.set_check_options(CheckOptions {
        strict_conditions: args.strict_conditions,
    });
    driver.set_dump_ast(args.dump_ast);
    driver.set_dump_tokens(args.dump_tokens);

    match driver.compile() {
        Ok(report) => {
            print!("{}", report);
            true
        }
        Err(diagnostics) => {
            print_diagnostics(&diagnostics);
            false
        }
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        eprintln!("{}", diag);
    }

    let error_count = diagnostics.iter().filter(|d| d.is_error()).count();
    let warning_count = diagnostics.len() - error_count;

    eprintln!(
        "\n{} generated{}",
        plural(error_count, "error").red().bold(),
        if warning_count > 0 {
            format!(", {}", plural(warning_count, "warning"))
        } else {
            String::new()
        }
    );
}

fn plural(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, if count == 1 { "" } else { "s" })
}
