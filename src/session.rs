//! One interpreter plus the front end that feeds it.
//!
//! A [`Session`] keeps its globals between calls to [`Session::run`], which is
//! what the REPL relies on.  Every call gets a fresh [`Diagnostics`].

use std::io::{self, Stdout, Write};

use log::{debug, info};

use crate::error::Diagnostics;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::scan_tokens;
use crate::value::Value;

pub struct Session<W: Write = Stdout> {
    interpreter: Interpreter<W>,
}

impl Session<Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Session<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Session<W> {
    pub fn with_output(out: W) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
        }
    }

    /// Scans, parses, resolves and executes `source`.  Static errors stop the
    /// pipeline before anything runs; a runtime error stops execution at the
    /// failing statement.  Both end up in the returned diagnostics.
    pub fn run(&mut self, source: &str) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        let tokens = scan_tokens(source, &mut diagnostics);
        let statements = Parser::new(&tokens).parse(&mut diagnostics);

        if diagnostics.has_errors() {
            info!("Skipping execution: {} static errors", diagnostics.len());
            return diagnostics;
        }

        let locals = Resolver::new().resolve(&statements, &mut diagnostics);

        if diagnostics.has_errors() {
            info!("Skipping execution: {} resolution errors", diagnostics.len());
            return diagnostics;
        }

        self.interpreter.resolve(locals);

        if let Err(e) = self.interpreter.interpret(&statements) {
            debug!("Runtime error: {}", e);
            diagnostics.report(e);
        }

        diagnostics
    }

    /// Parses `source` as a single expression and evaluates it in the global
    /// scope.
    pub fn evaluate(&mut self, source: &str) -> (Option<Value>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();

        let tokens = scan_tokens(source, &mut diagnostics);
        let expr = Parser::new(&tokens).parse_expression(&mut diagnostics);

        let expr = match expr {
            Some(expr) if !diagnostics.has_errors() => expr,
            _ => return (None, diagnostics),
        };

        match self.interpreter.evaluate(&expr) {
            Ok(value) => (Some(value), diagnostics),
            Err(e) => {
                diagnostics.report(e);
                (None, diagnostics)
            }
        }
    }

    pub fn output(&self) -> &W {
        self.interpreter.output()
    }

    pub fn into_output(self) -> W {
        self.interpreter.into_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn output(session: &Session<Vec<u8>>) -> String {
        String::from_utf8_lossy(session.output()).into_owned()
    }

    #[test]
    fn globals_survive_between_runs() {
        let mut session = Session::with_output(Vec::new());

        assert!(session.run("var a = 1; fun inc() { a = a + 1; return a; }").is_empty());
        assert!(session.run("print inc();").is_empty());
        assert!(session.run("print inc();").is_empty());
        assert_eq!(output(&session), "2\n3\n");
    }

    #[test]
    fn static_errors_prevent_execution() {
        let mut session = Session::with_output(Vec::new());

        let diagnostics = session.run("print 1;\nprint (;");
        assert!(diagnostics.has_errors());
        assert!(!diagnostics.had_runtime_error());
        assert_eq!(output(&session), "");

        let diagnostics = session.run("print 1;\n{ var a = a; }");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(output(&session), "");
    }

    #[test]
    fn runtime_errors_are_reported() {
        let mut session = Session::with_output(Vec::new());

        let diagnostics = session.run("print 1;\nprint nil + 1;\nprint 2;");
        assert!(diagnostics.had_runtime_error());
        assert_eq!(output(&session), "1\n");

        let messages: Vec<String> = diagnostics.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec!["[line 2] Operands must be either two numbers or two strings.".to_string()]
        );
    }

    #[test]
    fn evaluate_sees_globals() {
        let mut session = Session::with_output(Vec::new());
        session.run("var x = 20;");

        let (value, diagnostics) = session.evaluate("x + 22");
        assert!(diagnostics.is_empty());
        assert_eq!(value, Some(Value::Number(42.0)));

        let (value, diagnostics) = session.evaluate("1 +");
        assert_eq!(value, None);
        assert!(diagnostics.has_errors());
    }
}
