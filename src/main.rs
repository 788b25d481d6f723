use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
    process,
};

use anyhow::Context;
use clap::Parser as ArgParser;

use crate::{error::ErrorReporter, interpreter::Interpreter, parser::Parser, scanner::Scanner};

mod ast_printer;
mod environment;
mod error;
mod expr;
mod interpreter;
mod lox_callable;
mod parser;
mod scanner;
mod stmt;
mod token;
mod token_type;

/// A tree-walking interpreter for the Lox language.
#[derive(ArgParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Lox script to execute; starts a REPL when omitted.
    script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.script {
        Some(path) => run_file(&path),
        None => run_prompt(),
    }
}

fn run_file(path: &PathBuf) -> anyhow::Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut reporter = ErrorReporter::new();
    let mut stdout = io::stdout();
    let mut interpreter = Interpreter::new(&mut stdout);

    run(&source, &mut interpreter, &mut reporter);

    if reporter.had_error {
        process::exit(65);
    }
    if reporter.had_runtime_error {
        process::exit(70);
    }

    Ok(())
}

fn run_prompt() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut prompt = io::stdout();
    let mut output = io::stdout();

    let mut reporter = ErrorReporter::new();
    let mut interpreter = Interpreter::new(&mut output);

    let mut line = String::new();
    loop {
        write!(prompt, "> ")?;
        prompt.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        run(&line, &mut interpreter, &mut reporter);

        // One bad line must not end the session or taint the next one.
        reporter.had_error = false;
        reporter.had_runtime_error = false;
    }

    Ok(())
}

fn run<W: Write>(source: &str, interpreter: &mut Interpreter<'_, W>, reporter: &mut ErrorReporter) {
    let tokens = Scanner::new(source, reporter).scan_tokens();
    let statements = Parser::new(tokens, reporter).parse();

    // Syntax errors mean the statement list has holes; don't run it.
    if reporter.had_error {
        return;
    }

    interpreter.interpret(&statements, reporter);
}
