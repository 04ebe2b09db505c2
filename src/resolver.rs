//! Static resolver pass for the **Lox** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of `HashMap<String,bool>` tracking declared/defined).
//! 2. Report static errors (redeclaration, read in own initializer, invalid
//!    `return`, `this` or `super`, self‑inheritance).
//! 3. Record, for *each* variable occurrence, how many scopes separate it from
//!    its declaration.  Occurrences not found in any local scope are globals and
//!    get no entry.
//!
//! The scopes pushed here mirror the environments the interpreter creates, one
//! for one: blocks, function bodies, the `super` scope of a subclass and the
//! `this` scope of every method.  Errors do not stop the walk.

use crate::ast::{ClassDecl, Expr, ExprId, FunctionDecl, Identifier, Stmt};
use crate::error::{Diagnostics, LoxError};
use log::{debug, info};
use std::collections::{HashMap, HashSet};

/// Resolution distances keyed by the referencing node.
pub type Locals = HashMap<ExprId, usize>;

/// What kind of function body we are in.  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// What kind of class body we are in.  Used to validate `this` and `super`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

pub struct Resolver {
    scopes: Vec<HashMap<String, bool>>, // false=declared, true=defined
    locals: Locals,
    errors: Vec<LoxError>,
    current_function: FunctionType,
    current_class: ClassType,
    /// Global whose initializer is being resolved; globals have no scope frame.
    initializing_global: Option<String>,
    /// Globals declared earlier in this pass.  Redeclaring one may read the
    /// previous binding.
    known_globals: HashSet<String>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        info!("Resolver instantiated");

        Resolver {
            scopes: Vec::new(),
            locals: Locals::new(),
            errors: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            initializing_global: None,
            known_globals: HashSet::new(),
        }
    }

    /// Walk all top‑level statements and return the distance table.  Any
    /// errors are appended to `diagnostics`; the caller must not run the
    /// program if there were some.
    pub fn resolve(mut self, statements: &[Stmt], diagnostics: &mut Diagnostics) -> Locals {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        for stmt in statements {
            self.resolve_stmt(stmt);
        }

        info!(
            "Resolved {} local reference(s), {} error(s)",
            self.locals.len(),
            self.errors.len()
        );

        diagnostics.extend(self.errors);

        self.locals
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                for s in statements {
                    self.resolve_stmt(s);
                }
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name);
                if let Some(expr) = initializer {
                    if self.scopes.is_empty() && !self.known_globals.contains(&name.lexeme) {
                        self.initializing_global = Some(name.lexeme.clone());
                        self.resolve_expr(expr);
                        self.initializing_global = None;
                    } else {
                        self.resolve_expr(expr);
                    }
                }
                self.define(name);
            }

            Stmt::Function(function) => {
                // The name is visible inside its own body, so recursion works.
                self.declare(&function.name);
                self.define(&function.name);
                self.resolve_function(function, FunctionType::Function);
            }

            Stmt::Class(class) => self.resolve_class(class),

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { line, value } => {
                if self.current_function == FunctionType::None {
                    self.error(*line, "return", "Can't return from top-level code.");
                }

                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(
                            *line,
                            "return",
                            "Can't return a value from an initializer.",
                        );
                    }
                    self.resolve_expr(expr);
                }
            }
        }
    }

    fn resolve_class(&mut self, class: &ClassDecl) {
        debug!("Resolving class '{}'", class.name.lexeme);

        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(&class.name);
        self.define(&class.name);

        if let Some(superclass) = &class.superclass {
            if let Expr::Variable { name, .. } = superclass {
                if name.lexeme == class.name.lexeme {
                    self.error(name.line, &name.lexeme, "A class can't inherit from itself.");
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            self.begin_scope();
            self.bind_implicit("super");
        }

        self.begin_scope();
        self.bind_implicit("this");

        for method in &class.methods {
            let kind = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };

            self.resolve_function(method, kind);
        }

        self.end_scope();

        if class.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                let in_own_initializer = match self.scopes.last() {
                    Some(scope) => scope.get(&name.lexeme) == Some(&false),
                    None => self.initializing_global.as_deref() == Some(name.lexeme.as_str()),
                };

                if in_own_initializer {
                    self.error(
                        name.line,
                        &name.lexeme,
                        "Can't read local variable in its own initializer.",
                    );
                }

                self.resolve_local(*id, &name.lexeme);
            }

            Expr::Assign { id, name, value } => {
                // First resolve RHS, then bind LHS
                self.resolve_expr(value);
                self.resolve_local(*id, &name.lexeme);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::Get { object, .. } => self.resolve_expr(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }

            Expr::This { id, line } => {
                if self.current_class == ClassType::None {
                    self.error(*line, "this", "Can't use 'this' outside of a class.");
                    return;
                }

                self.resolve_local(*id, "this");
            }

            Expr::Super { id, line, .. } => {
                match self.current_class {
                    ClassType::None => {
                        self.error(*line, "super", "Can't use 'super' outside of a class.");
                        return;
                    }
                    ClassType::Class => {
                        self.error(
                            *line,
                            "super",
                            "Can't use 'super' in a class with no superclass.",
                        );
                        return;
                    }
                    ClassType::Subclass => {}
                }

                self.resolve_local(*id, "super");
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// One scope holds both the parameters and the body's top-level
    /// declarations, matching the single environment a call creates.
    fn resolve_function(&mut self, function: &FunctionDecl, kind: FunctionType) {
        let enclosing = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &function.params {
            self.declare(param);
            self.define(param);
        }
        for stmt in &function.body {
            self.resolve_stmt(stmt);
        }
        self.end_scope();

        self.current_function = enclosing;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Identifier) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };

        if scope.contains_key(&name.lexeme) {
            let err = LoxError::resolve(
                name.line,
                &name.lexeme,
                "Already a variable with this name in this scope.",
            );
            self.errors.push(err);
        }

        scope.insert(name.lexeme.clone(), false);
    }

    fn define(&mut self, name: &Identifier) {
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name.lexeme.clone(), true);
            }
            None => {
                self.known_globals.insert(name.lexeme.clone());
            }
        }
    }

    /// `this` and `super` are defined by the interpreter, not by source.
    fn bind_implicit(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    fn error(&mut self, line: usize, lexeme: &str, message: &str) {
        self.errors.push(LoxError::resolve(line, lexeme, message));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this occurrence as a local at depth `d`, or leave it out of
    /// the table when it is not found in *any* scope (a global).
    fn resolve_local(&mut self, id: ExprId, name: &str) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name) {
                debug!("Resolved '{}' at depth {}", name, depth);
                self.locals.insert(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::scan_tokens;

    fn resolve(text: &str) -> (Vec<Stmt>, Locals, Vec<String>) {
        let mut diagnostics = Diagnostics::new();
        let tokens = scan_tokens(text, &mut diagnostics);
        let statements = Parser::new(&tokens).parse(&mut diagnostics);
        assert!(!diagnostics.has_errors(), "syntax errors in {:?}", text);

        let locals = Resolver::new().resolve(&statements, &mut diagnostics);
        let messages = diagnostics.iter().map(|e| e.message()).collect();
        (statements, locals, messages)
    }

    fn errors(text: &str) -> Vec<String> {
        resolve(text).2
    }

    #[test]
    fn self_reference_in_initializer() {
        assert_eq!(
            errors("{ var a = a; }"),
            vec!["Can't read local variable in its own initializer."]
        );
        assert_eq!(
            errors("var a = a;"),
            vec!["Can't read local variable in its own initializer."]
        );
        assert!(errors("var a = 1; { var b = a; }").is_empty());
    }

    #[test]
    fn duplicate_local_declaration() {
        assert_eq!(
            errors("fun f() { var x = 1; var x = 2; }"),
            vec!["Already a variable with this name in this scope."]
        );
        // Globals may be redeclared.
        assert!(errors("var x = 1; var x = 2;").is_empty());
    }

    #[test]
    fn global_redeclaration_may_read_previous_value() {
        assert!(errors("var a = 1; var a = a + 1;").is_empty());
        assert_eq!(
            errors("var b = b;"),
            vec!["Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn misplaced_return_this_and_super() {
        assert_eq!(errors("return 1;"), vec!["Can't return from top-level code."]);
        assert_eq!(errors("print this;"), vec!["Can't use 'this' outside of a class."]);
        assert_eq!(
            errors("fun f() { super.g(); }"),
            vec!["Can't use 'super' outside of a class."]
        );
        assert_eq!(
            errors("class A { f() { super.f(); } }"),
            vec!["Can't use 'super' in a class with no superclass."]
        );
        assert_eq!(
            errors("class A { init() { return 1; } }"),
            vec!["Can't return a value from an initializer."]
        );
        assert!(errors("class A { init() { return; } }").is_empty());
    }

    #[test]
    fn class_cannot_inherit_from_itself() {
        assert_eq!(
            errors("class A < A {}"),
            vec!["A class can't inherit from itself."]
        );
    }

    #[test]
    fn errors_do_not_stop_the_walk() {
        assert_eq!(errors("return; print this; { var a = a; }").len(), 3);
    }

    #[test]
    fn distances_count_scopes() {
        let (statements, locals, messages) =
            resolve("var g; { var a; { var b; a = b; g; } }");
        assert!(messages.is_empty());

        let Stmt::Block(outer) = &statements[1] else {
            panic!("expected block");
        };
        let Stmt::Block(inner) = &outer[1] else {
            panic!("expected inner block");
        };
        let Stmt::Expression(Expr::Assign { id, value, .. }) = &inner[1] else {
            panic!("expected assignment");
        };
        let Expr::Variable { id: b_id, .. } = value.as_ref() else {
            panic!("expected variable");
        };
        let Stmt::Expression(Expr::Variable { id: g_id, .. }) = &inner[2] else {
            panic!("expected global read");
        };

        assert_eq!(locals.get(id), Some(&1));
        assert_eq!(locals.get(b_id), Some(&0));
        assert_eq!(locals.get(g_id), None);
    }

    #[test]
    fn method_scopes_include_this_and_super() {
        let (statements, locals, messages) =
            resolve("class A {} class B < A { m() { this; super.m; } }");
        assert!(messages.is_empty());

        let Stmt::Class(class) = &statements[1] else {
            panic!("expected class");
        };
        let body = &class.methods[0].body;
        let Stmt::Expression(Expr::This { id: this_id, .. }) = &body[0] else {
            panic!("expected this");
        };
        let Stmt::Expression(Expr::Super { id: super_id, .. }) = &body[1] else {
            panic!("expected super");
        };

        assert_eq!(locals.get(this_id), Some(&1));
        assert_eq!(locals.get(super_id), Some(&2));
    }
}
