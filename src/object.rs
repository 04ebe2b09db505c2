//! Heap objects behind [`Value`]: user functions, classes and instances.
//!
//! All three are shared through `Rc`; instances are additionally wrapped in
//! `RefCell` because property writes mutate them in place.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::environment::{EnvRef, Environment};
use crate::value::Value;

/// Anything a call expression can invoke.
pub trait Callable {
    /// Exact number of arguments the callee accepts.
    fn arity(&self) -> usize;

    fn name(&self) -> &str;
}

/// A user function or method together with the scope it closes over.
#[derive(Clone)]
pub struct LoxFunction {
    pub declaration: Rc<FunctionDecl>,
    pub closure: EnvRef,
    pub is_initializer: bool,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    /// A copy of this method whose closure has `this` bound to `instance`.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance>>) -> LoxFunction {
        let env: EnvRef = Environment::child_of(&self.closure);
        env.borrow_mut().define("this", Value::Instance(instance));

        LoxFunction::new(Rc::clone(&self.declaration), env, self.is_initializer)
    }
}

impl Callable for LoxFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }
}

// The closure usually contains the function itself; print the name only.
impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

pub struct LoxClass {
    pub name: String,
    pub superclass: Option<Rc<LoxClass>>,
    pub methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Rc<LoxFunction>>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    /// Own methods first, then each superclass in turn.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }
}

impl Callable for LoxClass {
    /// A class takes whatever its initializer takes.
    fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxClass")
            .field("name", &self.name)
            .field(
                "superclass",
                &self.superclass.as_ref().map(|s| s.name.as_str()),
            )
            .finish_non_exhaustive()
    }
}

pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    fields: HashMap<String, Value>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    /// Property read: a field if one is set, otherwise a method of the
    /// class (or a superclass) bound to this instance.
    pub fn get(instance: &Rc<RefCell<LoxInstance>>, name: &str) -> Option<Value> {
        let this = instance.borrow();

        if let Some(value) = this.fields.get(name) {
            return Some(value.clone());
        }

        this.class
            .find_method(name)
            .map(|method| Value::Function(Rc::new(method.bind(Rc::clone(instance)))))
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }
}

// Fields may point back at the instance; keep Debug shallow.
impl fmt::Debug for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.class.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Identifier;

    fn method(name: &str, params: usize) -> Rc<LoxFunction> {
        let ident = |lexeme: String| Identifier { lexeme, line: 1 };
        let declaration = FunctionDecl {
            name: ident(name.to_string()),
            params: (0..params).map(|i| ident(format!("p{}", i))).collect(),
            body: Vec::new(),
        };
        let closure: EnvRef = Rc::new(RefCell::new(Environment::new()));

        Rc::new(LoxFunction::new(
            Rc::new(declaration),
            closure,
            name == "init",
        ))
    }

    fn class(
        name: &str,
        superclass: Option<Rc<LoxClass>>,
        methods: &[(&str, usize)],
    ) -> Rc<LoxClass> {
        let methods = methods
            .iter()
            .map(|(n, arity)| (n.to_string(), method(n, *arity)))
            .collect();

        Rc::new(LoxClass::new(name.to_string(), superclass, methods))
    }

    #[test]
    fn method_lookup_walks_superclasses() {
        let base = class("Base", None, &[("speak", 0), ("init", 2)]);
        let derived = class("Derived", Some(Rc::clone(&base)), &[("speak", 1)]);

        assert_eq!(derived.find_method("speak").map(|m| m.arity()), Some(1));
        assert_eq!(derived.find_method("init").map(|m| m.arity()), Some(2));
        assert!(derived.find_method("missing").is_none());
        assert_eq!(derived.arity(), 2);
    }

    #[test]
    fn fields_shadow_methods() {
        let klass = class("Point", None, &[("x", 0)]);
        let instance = Rc::new(RefCell::new(LoxInstance::new(klass)));

        assert!(matches!(
            LoxInstance::get(&instance, "x"),
            Some(Value::Function(_))
        ));

        instance.borrow_mut().set("x", Value::Number(3.0));
        assert_eq!(LoxInstance::get(&instance, "x"), Some(Value::Number(3.0)));
        assert_eq!(LoxInstance::get(&instance, "y"), None);
    }

    #[test]
    fn bound_method_sees_this() {
        let klass = class("Point", None, &[("x", 0)]);
        let instance = Rc::new(RefCell::new(LoxInstance::new(klass)));

        let Some(Value::Function(bound)) = LoxInstance::get(&instance, "x") else {
            panic!("expected a bound method");
        };

        let this = Environment::get_at(&bound.closure, 0, "this", 1).ok();
        assert_eq!(this, Some(Value::Instance(instance)));
    }
}
