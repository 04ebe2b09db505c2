use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Stdout, Write};
use std::mem;
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};

use crate::ast::{BinaryOp, ClassDecl, Expr, ExprId, LiteralValue, LogicalOp, Stmt, UnaryOp};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::object::{Callable, LoxClass, LoxFunction, LoxInstance};
use crate::resolver::Locals;
use crate::value::Value;

/// How a statement finished.  `Return` travels up through blocks and loops
/// until the enclosing call consumes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Normal,
    Return(Value),
}

/// Tree‑walking evaluator.  `print` output goes to `W` (stdout by default).
pub struct Interpreter<W: Write = Stdout> {
    globals: EnvRef,
    environment: EnvRef,
    locals: Locals,
    out: W,
}

impl Interpreter<Stdout> {
    /// Creates a new Interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

fn clock(_args: &[Value]) -> std::result::Result<Value, String> {
    let micros: i64 = Utc::now().timestamp_micros();
    Ok(Value::Number(micros as f64 / 1_000_000.0))
}

impl<W: Write> Interpreter<W> {
    /// Creates a new Interpreter and defines native functions such as `clock`.
    pub fn with_output(out: W) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                func: clock,
            },
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Adds resolver output.  Tables from successive runs accumulate, so
    /// functions defined by earlier REPL lines keep their distances.
    pub fn resolve(&mut self, locals: Locals) {
        debug!("Recording {} resolved locals", locals.len());
        self.locals.extend(locals);
    }

    /// Interprets a list of statements (a "program").  The first runtime
    /// error stops execution.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            if let Completion::Return(_) = self.execute(stmt)? {
                break;
            }
        }

        self.out.flush()?;

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Completion> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                debug!("Printed value: {}", value);
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let env: EnvRef = Environment::child_of(&self.environment);
                return self.execute_block(statements, env);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_stmt) = else_branch {
                    return self.execute(else_stmt);
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Completion::Return(value) = self.execute(body)? {
                        return Ok(Completion::Return(value));
                    }
                }
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );
                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", value);
                return Ok(Completion::Return(value));
            }

            Stmt::Class(class) => self.execute_class(class)?,
        }

        Ok(Completion::Normal)
    }

    /// Runs `statements` inside `env`, then puts the previous environment
    /// back no matter how the statements finished.
    pub fn execute_block(&mut self, statements: &[Stmt], env: EnvRef) -> Result<Completion> {
        let previous: EnvRef = mem::replace(&mut self.environment, env);
        let result: Result<Completion> = self.execute_all(statements);
        self.environment = previous;

        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Completion> {
        for stmt in statements {
            if let done @ Completion::Return(_) = self.execute(stmt)? {
                return Ok(done);
            }
        }

        Ok(Completion::Normal)
    }

    fn execute_class(&mut self, class: &ClassDecl) -> Result<()> {
        debug!("Declaring class '{}'", class.name.lexeme);

        // Placeholder so methods can refer to the class by name.
        self.environment
            .borrow_mut()
            .define(&class.name.lexeme, Value::Nil);

        let superclass: Option<Rc<LoxClass>> = match &class.superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(superclass) => Some(superclass),
                _ => {
                    let line = match expr {
                        Expr::Variable { name, .. } => name.line,
                        _ => class.name.line,
                    };
                    return Err(LoxError::runtime(line, "Superclass must be a class."));
                }
            },
            None => None,
        };

        let method_env: EnvRef = match &superclass {
            Some(superclass) => {
                let env: EnvRef = Environment::child_of(&self.environment);
                env.borrow_mut()
                    .define("super", Value::Class(Rc::clone(superclass)));
                env
            }
            None => Rc::clone(&self.environment),
        };

        let methods: HashMap<String, Rc<LoxFunction>> = class
            .methods
            .iter()
            .map(|declaration| {
                let is_initializer: bool = declaration.name.lexeme == "init";
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&method_env),
                    is_initializer,
                );
                (declaration.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let klass = LoxClass::new(class.name.lexeme.clone(), superclass, methods);

        self.environment
            .borrow_mut()
            .define(&class.name.lexeme, Value::Class(Rc::new(klass)));

        info!("Class '{}' defined", class.name.lexeme);
        Ok(())
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary {
                operator,
                line,
                right,
            } => {
                let right: Value = self.evaluate(right)?;

                match operator {
                    UnaryOp::Negate => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(LoxError::runtime(*line, "Operand must be a number.")),
                    },
                    UnaryOp::Not => Ok(Value::Bool(!right.is_truthy())),
                }
            }

            Expr::Binary {
                left,
                operator,
                line,
                right,
            } => {
                let left: Value = self.evaluate(left)?;
                let right: Value = self.evaluate(right)?;
                evaluate_binary(*operator, *line, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;

                let short_circuit: bool = match operator {
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::And => !left.is_truthy(),
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, &name.lexeme, name.line),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => Environment::assign_at(
                        &self.environment,
                        distance,
                        &name.lexeme,
                        value.clone(),
                        name.line,
                    )?,
                    None => self
                        .globals
                        .borrow_mut()
                        .assign(&name.lexeme, value.clone(), name.line)?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                line,
                arguments,
            } => {
                let callee: Value = self.evaluate(callee)?;

                let mut values: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                self.call(callee, values, *line)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, &name.lexeme)
                    .ok_or_else(|| undefined_property(&name.lexeme, name.line)),
                _ => Err(LoxError::runtime(name.line, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name.line, "Only instances have fields."));
                };

                let value: Value = self.evaluate(value)?;
                instance.borrow_mut().set(&name.lexeme, value.clone());

                Ok(value)
            }

            Expr::This { id, line } => self.look_up_variable(*id, "this", *line),

            Expr::Super { id, line, method } => {
                let distance: usize = self
                    .locals
                    .get(id)
                    .copied()
                    .ok_or_else(|| LoxError::runtime(*line, "Can't use 'super' here."))?;

                let Value::Class(superclass) =
                    Environment::get_at(&self.environment, distance, "super", *line)?
                else {
                    return Err(LoxError::runtime(*line, "Superclass must be a class."));
                };

                // `this` lives in the scope just inside the `super` scope.
                let this_distance: usize = distance.saturating_sub(1);
                let Value::Instance(instance) =
                    Environment::get_at(&self.environment, this_distance, "this", *line)?
                else {
                    return Err(LoxError::runtime(*line, "Can't use 'super' here."));
                };

                let function = superclass
                    .find_method(&method.lexeme)
                    .ok_or_else(|| undefined_property(&method.lexeme, method.line))?;

                Ok(Value::Function(Rc::new(function.bind(instance))))
            }
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &str, line: usize) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name, line),
            None => self.globals.borrow().get(name, line),
        }
    }

    /// Invokes a callable (native, user function or class constructor).
    fn call(&mut self, callee: Value, arguments: Vec<Value>, line: usize) -> Result<Value> {
        match callee {
            Value::NativeFunction { name, arity, func } => {
                debug!("Calling native function '{}'", name);
                check_arity(arity, arguments.len(), line)?;
                func(&arguments).map_err(|message| LoxError::runtime(line, message))
            }

            Value::Function(function) => {
                check_arity(function.arity(), arguments.len(), line)?;
                self.call_function(&function, arguments)
            }

            Value::Class(class) => {
                check_arity(class.arity(), arguments.len(), line)?;

                let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(&class))));

                if let Some(init) = class.find_method("init") {
                    self.call_function(&init.bind(Rc::clone(&instance)), arguments)?;
                }

                debug!("Instantiated '{}'", class.name());
                Ok(Value::Instance(instance))
            }

            _ => Err(LoxError::runtime(line, "Can only call functions and classes.")),
        }
    }

    /// Binds parameters in a fresh scope under the closure and runs the body.
    fn call_function(&mut self, function: &LoxFunction, arguments: Vec<Value>) -> Result<Value> {
        debug!("Calling user-defined function '{}'", function.name());

        let env: EnvRef = Environment::child_of(&function.closure);
        {
            let mut scope = env.borrow_mut();
            for (param, argument) in function.declaration.params.iter().zip(arguments) {
                scope.define(&param.lexeme, argument);
            }
        }

        let completion: Completion = self.execute_block(&function.declaration.body, env)?;

        // An initializer always hands back the instance it initialized.
        if function.is_initializer {
            let line: usize = function.declaration.name.line;
            return Environment::get_at(&function.closure, 0, "this", line);
        }

        match completion {
            Completion::Return(value) => Ok(value),
            Completion::Normal => Ok(Value::Nil),
        }
    }
}

fn check_arity(expected: usize, got: usize, line: usize) -> Result<()> {
    if expected == got {
        return Ok(());
    }

    Err(LoxError::runtime(
        line,
        format!("Expected {} arguments but got {}.", expected, got),
    ))
}

fn undefined_property(name: &str, line: usize) -> LoxError {
    LoxError::runtime(line, format!("Undefined property '{}'.", name))
}

/// Both operands must be numbers; the error says which one is not.
fn number_operands(line: usize, left: &Value, right: &Value) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        (Value::Number(_), _) => Err(LoxError::runtime(line, "Right operand must be a number.")),
        _ => Err(LoxError::runtime(line, "Left operand must be a number.")),
    }
}

fn evaluate_binary(operator: BinaryOp, line: usize, left: Value, right: Value) -> Result<Value> {
    let value: Value = match operator {
        BinaryOp::Equal => Value::Bool(left == right),
        BinaryOp::NotEqual => Value::Bool(left != right),

        BinaryOp::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (Value::String(a), Value::String(b)) => Value::String(a + &b),
            _ => {
                return Err(LoxError::runtime(
                    line,
                    "Operands must be either two numbers or two strings.",
                ))
            }
        },

        BinaryOp::Subtract => {
            let (a, b) = number_operands(line, &left, &right)?;
            Value::Number(a - b)
        }
        BinaryOp::Multiply => {
            let (a, b) = number_operands(line, &left, &right)?;
            Value::Number(a * b)
        }
        BinaryOp::Divide => {
            let (a, b) = number_operands(line, &left, &right)?;
            Value::Number(a / b)
        }
        BinaryOp::Greater => {
            let (a, b) = number_operands(line, &left, &right)?;
            Value::Bool(a > b)
        }
        BinaryOp::GreaterEqual => {
            let (a, b) = number_operands(line, &left, &right)?;
            Value::Bool(a >= b)
        }
        BinaryOp::Less => {
            let (a, b) = number_operands(line, &left, &right)?;
            Value::Bool(a < b)
        }
        BinaryOp::LessEqual => {
            let (a, b) = number_operands(line, &left, &right)?;
            Value::Bool(a <= b)
        }
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostics;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::scan_tokens;
    use pretty_assertions::assert_eq;

    fn eval(text: &str) -> Result<Value> {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan_tokens(text, &mut diagnostics);
        let expr = Parser::new(&tokens)
            .parse_expression(&mut diagnostics)
            .expect("expression should parse");
        Interpreter::with_output(Vec::new()).evaluate(&expr)
    }

    fn run(text: &str) -> (String, Result<()>) {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan_tokens(text, &mut diagnostics);
        let statements = Parser::new(&tokens).parse(&mut diagnostics);
        let locals = Resolver::new().resolve(&statements, &mut diagnostics);
        assert!(!diagnostics.has_errors(), "static errors in {:?}", text);

        let mut interpreter = Interpreter::with_output(Vec::new());
        interpreter.resolve(locals);
        let result = interpreter.interpret(&statements);
        let out = String::from_utf8(interpreter.into_output()).expect("utf-8 output");
        (out, result)
    }

    fn runtime_message(text: &str) -> String {
        match run(text).1 {
            Err(e) => e.to_string(),
            Ok(()) => panic!("expected a runtime error from {:?}", text),
        }
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(eval("1+2*3").ok(), Some(Value::Number(7.0)));
        assert_eq!(eval("1-2-3").ok(), Some(Value::Number(-4.0)));
        assert_eq!(eval("(1+2)*3").ok(), Some(Value::Number(9.0)));
        assert_eq!(eval("-2 * -3").ok(), Some(Value::Number(6.0)));
    }

    #[test]
    fn equality_and_truthiness() {
        assert_eq!(eval("nil == nil").ok(), Some(Value::Bool(true)));
        assert_eq!(eval("nil == false").ok(), Some(Value::Bool(false)));
        assert_eq!(eval("\"1\" == 1").ok(), Some(Value::Bool(false)));
        assert_eq!(eval("!0").ok(), Some(Value::Bool(false)));
        assert_eq!(eval("!nil").ok(), Some(Value::Bool(true)));
        assert_eq!(eval("1 != 2").ok(), Some(Value::Bool(true)));
    }

    #[test]
    fn logical_operators_return_operands() {
        assert_eq!(eval("nil or \"yes\"").ok(), Some(Value::String("yes".into())));
        assert_eq!(eval("0 or 1").ok(), Some(Value::Number(0.0)));
        assert_eq!(eval("false and undefined").ok(), Some(Value::Bool(false)));
        assert_eq!(eval("1 and 2").ok(), Some(Value::Number(2.0)));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(eval("\"a\" + \"b\"").ok(), Some(Value::String("ab".into())));
    }

    #[test]
    fn operand_type_errors_name_the_side() {
        let err = eval("\"a\" - 1").unwrap_err();
        assert_eq!(err.to_string(), "[line 1] Left operand must be a number.");

        let err = eval("1 < nil").unwrap_err();
        assert_eq!(err.to_string(), "[line 1] Right operand must be a number.");

        let err = eval("1 + \"a\"").unwrap_err();
        assert_eq!(
            err.to_string(),
            "[line 1] Operands must be either two numbers or two strings."
        );

        let err = eval("-\"a\"").unwrap_err();
        assert_eq!(err.to_string(), "[line 1] Operand must be a number.");
    }

    #[test]
    fn print_formats_values() {
        let (out, result) = run("print 1; print 2.5; print nil; print true; print \"s\";");
        assert!(result.is_ok());
        assert_eq!(out, "1\n2.5\nnil\ntrue\ns\n");
    }

    #[test]
    fn closures_share_captured_state() {
        let (out, result) = run(
            "fun makeCounter() {
               var count = 0;
               fun counter() { count = count + 1; return count; }
               return counter;
             }
             var c = makeCounter();
             print c();
             print c();
             var d = makeCounter();
             print d();",
        );
        assert!(result.is_ok());
        assert_eq!(out, "1\n2\n1\n");
    }

    #[test]
    fn closures_bind_to_declaration_scope() {
        let (out, _) = run(
            "var a = \"global\";
             {
               fun show() { print a; }
               show();
               var a = \"block\";
               show();
             }",
        );
        assert_eq!(out, "global\nglobal\n");
    }

    #[test]
    fn shadowing_leaves_outer_untouched() {
        let (out, _) = run(
            "var x = \"outer\";
             {
               var x = \"inner\";
               x = \"changed\";
               print x;
             }
             print x;",
        );
        assert_eq!(out, "changed\nouter\n");
    }

    #[test]
    fn return_unwinds_loops() {
        let (out, _) = run(
            "fun first() {
               for (var i = 0; i < 10; i = i + 1) {
                 if (i == 3) return i;
               }
               return -1;
             }
             print first();
             fun nothing() { return; }
             print nothing();",
        );
        assert_eq!(out, "3\nnil\n");
    }

    #[test]
    fn recursion() {
        let (out, _) = run(
            "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
             print fib(15);",
        );
        assert_eq!(out, "610\n");
    }

    #[test]
    fn arity_is_checked_exactly() {
        assert_eq!(
            runtime_message("fun f(a) { return a; }\nf();"),
            "[line 2] Expected 1 arguments but got 0."
        );
        assert_eq!(
            runtime_message("fun f(a) { return a; }\nf(1, 2);"),
            "[line 2] Expected 1 arguments but got 2."
        );
        let (out, result) = run("fun f(a) { return a; } print f(1);");
        assert!(result.is_ok());
        assert_eq!(out, "1\n");
    }

    #[test]
    fn runtime_error_stops_execution() {
        let (out, result) = run("print 1;\nprint -nil;\nprint 2;");
        assert_eq!(out, "1\n");
        assert!(result.is_err());
    }

    #[test]
    fn environment_is_restored_after_error_in_block() {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan_tokens("var a = 1; { var a = 2; a + nil; }", &mut diagnostics);
        let statements = Parser::new(&tokens).parse(&mut diagnostics);
        let locals = Resolver::new().resolve(&statements, &mut diagnostics);

        let mut interpreter = Interpreter::with_output(Vec::new());
        interpreter.resolve(locals);
        assert!(interpreter.interpret(&statements).is_err());
        assert!(Rc::ptr_eq(&interpreter.environment, &interpreter.globals));
    }

    #[test]
    fn undefined_variables() {
        assert_eq!(
            runtime_message("print missing;"),
            "[line 1] Undefined variable 'missing'."
        );
        assert_eq!(
            runtime_message("missing = 1;"),
            "[line 1] Undefined variable 'missing'."
        );
    }

    #[test]
    fn calling_non_callables() {
        assert_eq!(
            runtime_message("\"str\"();"),
            "[line 1] Can only call functions and classes."
        );
    }

    #[test]
    fn classes_fields_and_methods() {
        let (out, result) = run(
            "class Point {
               init(x, y) { this.x = x; this.y = y; }
               sum() { return this.x + this.y; }
             }
             var p = Point(1, 2);
             print p.sum();
             p.x = 10;
             print p.sum();
             print p;
             print Point;",
        );
        assert!(result.is_ok());
        assert_eq!(out, "3\n12\nPoint instance\nPoint\n");
    }

    #[test]
    fn initializer_returns_instance() {
        let (out, _) = run(
            "class A { init() { this.v = 1; return; } }
             var a = A();
             print a.init() == a;",
        );
        assert_eq!(out, "true\n");
    }

    #[test]
    fn bound_methods_remember_receiver() {
        let (out, _) = run(
            "class Cat { init(n) { this.n = n; } name() { return this.n; } }
             var m = Cat(\"tom\").name;
             print m();",
        );
        assert_eq!(out, "tom\n");
    }

    #[test]
    fn inheritance_override_and_super() {
        let (out, result) = run(
            "class A {
               method() { return \"A.method\"; }
               who() { return \"A sees \" + this.name; }
             }
             class B < A {
               init() { this.name = \"b\"; }
               method() { return \"B.method\"; }
               parent() { return super.method(); }
               who() { return super.who(); }
             }
             var b = B();
             print b.method();
             print b.parent();
             print b.who();",
        );
        assert!(result.is_ok());
        assert_eq!(out, "B.method\nA.method\nA sees b\n");
    }

    #[test]
    fn inherited_initializer() {
        let (out, _) = run(
            "class A { init(v) { this.v = v; } }
             class B < A {}
             print B(5).v;",
        );
        assert_eq!(out, "5\n");
    }

    #[test]
    fn property_errors() {
        assert_eq!(
            runtime_message("class A {} print A().nope;"),
            "[line 1] Undefined property 'nope'."
        );
        assert_eq!(
            runtime_message("var x = 1; print x.y;"),
            "[line 1] Only instances have properties."
        );
        assert_eq!(
            runtime_message("var x = 1; x.y = 2;"),
            "[line 1] Only instances have fields."
        );
    }

    #[test]
    fn superclass_must_be_a_class() {
        assert_eq!(
            runtime_message("var NotClass = 1;\nclass B < NotClass {}"),
            "[line 2] Superclass must be a class."
        );
    }

    #[test]
    fn clock_returns_seconds() {
        let Ok(Value::Number(now)) = eval("clock()") else {
            panic!("clock should return a number");
        };
        assert!(now > 1_600_000_000.0);
    }
}
