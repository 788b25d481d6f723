use crate::{interpreter::RuntimeError, token::Token, token_type::TokenType};

/// Diagnostic sink shared by the scanner, parser and interpreter.
///
/// The two flags decide the process exit code: `had_error` maps to 65,
/// `had_runtime_error` to 70. The REPL clears the flags between lines so one
/// bad input does not poison the session.
#[derive(Debug, Default)]
pub struct ErrorReporter {
    pub had_error: bool,
    pub had_runtime_error: bool,
}

impl ErrorReporter {
    pub fn new() -> ErrorReporter {
        ErrorReporter::default()
    }

    /// Report a diagnostic that is not tied to a token (scanner errors).
    pub fn error(&mut self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    /// Report a parse diagnostic at a specific token.
    pub fn error_token(&mut self, token: &Token, message: &str) {
        match token.token_type {
            TokenType::Eof => self.report(token.line, " at end", message),
            _ => {
                let location = format!(" at '{}'", token.lexeme);
                self.report(token.line, &location, message);
            }
        }
    }

    pub fn runtime_error(&mut self, error: &RuntimeError) {
        eprintln!("{}\n[line {}]", error.message, error.token.line);
        self.had_runtime_error = true;
    }

    fn report(&mut self, line: usize, location: &str, message: &str) {
        eprintln!("[line {}] Error{}: {}", line, location, message);
        self.had_error = true;
    }
}
