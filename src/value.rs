use indexmap::IndexMap;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::Stmt;

/// A flat name-to-value mapping: the top-level scope, a method body's locals,
/// or an instance's fields. There is no parent chaining; method bodies start
/// from a fresh closure holding only `self` and the formal parameters.
pub type Closure = IndexMap<Rc<str>, Value>;

/// A runtime value. Primitives are value-typed and cloned per holder;
/// instances and classes are reference-shared, so every holder observes the
/// same underlying object.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Number(i64),
    Str(Rc<str>),
    Bool(bool),
    Instance(Rc<ClassInstance>),
    Class(Rc<Class>),
}

impl Value {
    pub fn as_number(&self) -> Option<i64> {
        if let Value::Number(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::Str(text) = self {
            Some(text.as_ref())
        } else {
            None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    pub fn as_instance(&self) -> Option<&Rc<ClassInstance>> {
        if let Value::Instance(instance) = self {
            Some(instance)
        } else {
            None
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(value) => *value,
            Value::Number(value) => *value != 0,
            Value::Str(text) => !text.is_empty(),
            Value::Instance(_) | Value::Class(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "None",
            Value::Number(_) => "Number",
            Value::Str(_) => "String",
            Value::Bool(_) => "Bool",
            Value::Instance(_) => "object",
            Value::Class(_) => "Class",
        }
    }
}

/// One method of a class. `self` is not a formal parameter; it is injected
/// into the method scope at every call site.
#[derive(Debug)]
pub struct Method {
    pub name: Rc<str>,
    pub formal_params: Vec<Rc<str>>,
    pub body: Vec<Stmt>,
}

/// A class object: immutable after construction. Method lookup uses a table
/// built in the constructor and falls through to the parent class on a miss.
#[derive(Debug)]
pub struct Class {
    name: Rc<str>,
    methods: Vec<Method>,
    method_table: HashMap<Rc<str>, usize>,
    parent: Option<Rc<Class>>,
}

impl Class {
    pub fn new(name: Rc<str>, methods: Vec<Method>, parent: Option<Rc<Class>>) -> Self {
        let mut method_table = HashMap::with_capacity(methods.len());
        for (index, method) in methods.iter().enumerate() {
            method_table.insert(Rc::clone(&method.name), index);
        }
        Self {
            name,
            methods,
            method_table,
            parent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_handle(&self) -> Rc<str> {
        Rc::clone(&self.name)
    }

    pub fn get_method(&self, name: &str) -> Option<&Method> {
        if let Some(&index) = self.method_table.get(name) {
            return Some(&self.methods[index]);
        }
        self.parent.as_ref().and_then(|parent| parent.get_method(name))
    }
}

/// An instance of a user-defined class. Fields start empty and are populated
/// by field assignments; they are shared between all holders of the instance.
#[derive(Debug)]
pub struct ClassInstance {
    class: Rc<Class>,
    fields: RefCell<Closure>,
}

impl ClassInstance {
    pub fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            fields: RefCell::new(Closure::new()),
        }
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    pub fn fields(&self) -> Ref<'_, Closure> {
        self.fields.borrow()
    }

    pub fn fields_mut(&self) -> RefMut<'_, Closure> {
        self.fields.borrow_mut()
    }

    /// True iff the class (or an ancestor) defines `name` with exactly
    /// `arity` formal parameters, `self` not counted.
    pub fn has_method(&self, name: &str, arity: usize) -> bool {
        self.class
            .get_method(name)
            .is_some_and(|method| method.formal_params.len() == arity)
    }
}
