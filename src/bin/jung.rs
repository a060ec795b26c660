//! jung - run Jung programs or start a REPL.
//!
//! # Usage
//!
//! ```bash
//! # Run a script
//! jung script.jung
//!
//! # Evaluate an inline snippet
//! jung -e 'print "hello"'
//!
//! # Start the interactive REPL
//! jung
//! ```
//!
//! Exit status is 0 on success and 1 on any lex, parse, or runtime
//! failure, including an uncaught exception. Program output goes to
//! stdout; diagnostics go to stderr.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;

use jung::Interpreter;

/// The Jung language interpreter
#[derive(Parser, Debug)]
#[command(name = "jung")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Args {
    /// Script file to execute; omit to start the REPL
    file: Option<PathBuf>,

    /// Evaluate an inline snippet and exit
    #[arg(short = 'e', long = "eval", value_name = "SOURCE")]
    eval: Option<String>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Print version information
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    let _ = simple_logger::SimpleLogger::new().with_level(level).init();

    if let Some(source) = &args.eval {
        return execute(source);
    }

    if let Some(path) = &args.file {
        let source = match std::fs::read_to_string(path)
            .with_context(|| format!("cannot read '{}'", path.display()))
        {
            Ok(source) => source,
            Err(error) => {
                eprintln!("{} {:#}", "error:".red().bold(), error);
                return ExitCode::FAILURE;
            }
        };
        return execute(&source);
    }

    repl()
}

/// Runs a complete source text in a fresh interpreter.
fn execute(source: &str) -> ExitCode {
    match Interpreter::new().run_source(source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", error.to_string().red());
            ExitCode::FAILURE
        }
    }
}

/// The line-oriented REPL.
///
/// One interpreter persists across lines, so bindings, functions, and
/// classes survive between inputs. A line that parses to a single
/// expression prints its rendered value unless it is null.
fn repl() -> ExitCode {
    println!("jung {} (type Ctrl-D to exit)", env!("CARGO_PKG_VERSION"));

    let mut interpreter = Interpreter::new();
    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        print!("{} ", ">".cyan());
        let _ = std::io::stdout().flush();

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        if line.trim().is_empty() {
            continue;
        }

        match interpreter.run_repl_line(&line) {
            Ok(Some(value)) if !matches!(value, jung::Value::Null) => {
                println!("{}", value.render());
            }
            Ok(_) => {}
            Err(error) => eprintln!("{}", error.to_string().red()),
        }
    }

    ExitCode::SUCCESS
}
