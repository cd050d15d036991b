use std::io::Write;
use std::rc::Rc;

use crate::ast::{BinaryOp, CompareOp, Expr, Stmt};
use crate::value::{ClassInstance, Closure, Value};

use super::error::RuntimeError;

const INIT_METHOD: &str = "__init__";
const STR_METHOD: &str = "__str__";
const ADD_METHOD: &str = "__add__";
const EQ_METHOD: &str = "__eq__";
const LT_METHOD: &str = "__lt__";

/// Outcome of executing one statement. `Return` unwinds to the nearest
/// enclosing method body, which is the sole catch point.
#[derive(Debug)]
pub enum ControlFlow {
    Advance,
    Return(Value),
}

/// Tree-walking evaluator. Owns the output sink; scopes are passed down
/// explicitly since method bodies never see their caller's locals.
pub struct Interpreter<W> {
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Runs a program against a fresh top-level scope.
    pub fn run(&mut self, program: &[Stmt]) -> Result<(), RuntimeError> {
        let mut scope = Closure::new();
        match self.exec_block(program, &mut scope)? {
            ControlFlow::Advance => Ok(()),
            ControlFlow::Return(_) => Err(RuntimeError::ReturnOutsideMethod),
        }
    }

    fn exec_block(&mut self, stmts: &[Stmt], scope: &mut Closure) -> Result<ControlFlow, RuntimeError> {
        for stmt in stmts {
            if let ControlFlow::Return(value) = self.exec_statement(stmt, scope)? {
                return Ok(ControlFlow::Return(value));
            }
        }
        Ok(ControlFlow::Advance)
    }

    fn exec_statement(&mut self, stmt: &Stmt, scope: &mut Closure) -> Result<ControlFlow, RuntimeError> {
        match stmt {
            Stmt::Assign { name, value } => {
                let value = self.eval(value, scope)?;
                scope.insert(Rc::clone(name), value);
                Ok(ControlFlow::Advance)
            }
            Stmt::FieldAssign {
                object,
                field,
                value,
            } => {
                let instance = match self.eval(object, scope)? {
                    Value::Instance(instance) => instance,
                    other => {
                        return Err(RuntimeError::type_mismatch(format!(
                            "cannot assign field `{}` on a {}",
                            field,
                            other.type_name()
                        )))
                    }
                };
                let value = self.eval(value, scope)?;
                instance.fields_mut().insert(Rc::clone(field), value);
                Ok(ControlFlow::Advance)
            }
            Stmt::Print { args } => {
                self.print_line(args, scope)?;
                Ok(ControlFlow::Advance)
            }
            Stmt::Return(expr) => {
                let value = self.eval(expr, scope)?;
                Ok(ControlFlow::Return(value))
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = match self.eval(condition, scope)? {
                    Value::Bool(value) => value,
                    other => {
                        return Err(RuntimeError::type_mismatch(format!(
                            "if condition must be a Bool, found {}",
                            other.type_name()
                        )))
                    }
                };
                if condition {
                    self.exec_block(then_branch, scope)
                } else if let Some(else_branch) = else_branch {
                    self.exec_block(else_branch, scope)
                } else {
                    Ok(ControlFlow::Advance)
                }
            }
            Stmt::ClassDef(class) => {
                scope.insert(class.name_handle(), Value::Class(Rc::clone(class)));
                Ok(ControlFlow::Advance)
            }
            Stmt::Expr(expr) => {
                self.eval(expr, scope)?;
                Ok(ControlFlow::Advance)
            }
        }
    }

    fn eval(&mut self, expr: &Expr, scope: &mut Closure) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Variable(path) => lookup(path, scope),
            Expr::MethodCall {
                object,
                method,
                args,
            } => {
                let instance = match self.eval(object, scope)? {
                    Value::Instance(instance) => instance,
                    other => {
                        return Err(RuntimeError::type_mismatch(format!(
                            "cannot call method `{}` on a {}",
                            method,
                            other.type_name()
                        )))
                    }
                };
                if !instance.has_method(method, args.len()) {
                    return Err(RuntimeError::method_not_found(
                        instance.class().name(),
                        method.as_ref(),
                        args.len(),
                    ));
                }
                let actual = self.eval_args(args, scope)?;
                self.call_method(&instance, method, actual)
            }
            Expr::NewInstance { class, args } => {
                let instance = Rc::new(ClassInstance::new(Rc::clone(class)));
                if instance.has_method(INIT_METHOD, args.len()) {
                    let actual = self.eval_args(args, scope)?;
                    self.call_method(&instance, INIT_METHOD, actual)?;
                }
                Ok(Value::Instance(instance))
            }
            Expr::Stringify(inner) => {
                let value = self.eval(inner, scope)?;
                let text = self.render(&value)?;
                Ok(Value::Str(Rc::from(text)))
            }
            Expr::Binary { left, op, right } => self.eval_binary(left, *op, right, scope),
            Expr::Not(inner) => {
                let value = self.eval(inner, scope)?;
                match value {
                    Value::Bool(value) => Ok(Value::Bool(!value)),
                    other => Err(RuntimeError::type_mismatch(format!(
                        "argument of `not` must be a Bool, found {}",
                        other.type_name()
                    ))),
                }
            }
        }
    }

    fn eval_args(&mut self, args: &[Expr], scope: &mut Closure) -> Result<Vec<Value>, RuntimeError> {
        let mut actual = Vec::with_capacity(args.len());
        for arg in args {
            actual.push(self.eval(arg, scope)?);
        }
        Ok(actual)
    }

    /// Invokes a method: a fresh scope with `self` plus the formals bound in
    /// order, then the body. A `return` anywhere in the body surfaces here;
    /// falling off the end yields `None`.
    fn call_method(
        &mut self,
        instance: &Rc<ClassInstance>,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let class = Rc::clone(instance.class());
        let Some(method) = class.get_method(name) else {
            return Err(RuntimeError::method_not_found(class.name(), name, args.len()));
        };
        if method.formal_params.len() != args.len() {
            return Err(RuntimeError::method_not_found(class.name(), name, args.len()));
        }

        let mut locals = Closure::new();
        locals.insert(Rc::from("self"), Value::Instance(Rc::clone(instance)));
        for (param, value) in method.formal_params.iter().zip(args) {
            locals.insert(Rc::clone(param), value);
        }

        match self.exec_block(&method.body, &mut locals)? {
            ControlFlow::Return(value) => Ok(value),
            ControlFlow::Advance => Ok(Value::None),
        }
    }

    /// Evaluates all arguments, renders them joined by single spaces, and
    /// writes the line. Returns the line (without the newline) as a string
    /// value.
    fn print_line(&mut self, args: &[Expr], scope: &mut Closure) -> Result<Value, RuntimeError> {
        let values = self.eval_args(args, scope)?;

        let mut line = String::new();
        for (i, value) in values.iter().enumerate() {
            if i != 0 {
                line.push(' ');
            }
            let rendered = self.render(value)?;
            line.push_str(&rendered);
        }

        writeln!(self.out, "{}", line).map_err(RuntimeError::io)?;
        Ok(Value::Str(Rc::from(line.as_str())))
    }

    /// The printed form of a value. Instances go through `__str__` when the
    /// class defines it with no parameters; otherwise an address-like
    /// identity token. Never writes to the program output itself.
    fn render(&mut self, value: &Value) -> Result<String, RuntimeError> {
        match value {
            Value::None => Ok("None".to_string()),
            Value::Number(value) => Ok(value.to_string()),
            Value::Str(text) => Ok(text.to_string()),
            Value::Bool(true) => Ok("True".to_string()),
            Value::Bool(false) => Ok("False".to_string()),
            Value::Class(class) => Ok(format!("Class {}", class.name())),
            Value::Instance(instance) => {
                if instance.has_method(STR_METHOD, 0) {
                    let result = self.call_method(instance, STR_METHOD, Vec::new())?;
                    self.render(&result)
                } else {
                    Ok(format!(
                        "<{} object at {:p}>",
                        instance.class().name(),
                        Rc::as_ptr(instance)
                    ))
                }
            }
        }
    }

    fn eval_binary(
        &mut self,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
        scope: &mut Closure,
    ) -> Result<Value, RuntimeError> {
        // `and`/`or` only look at genuine Bools and short-circuit on the
        // left operand; anything else behaves as false.
        match op {
            BinaryOp::And => {
                let lhs = self.eval(left, scope)?;
                if !matches!(lhs, Value::Bool(true)) {
                    return Ok(Value::Bool(false));
                }
                let rhs = self.eval(right, scope)?;
                Ok(Value::Bool(matches!(rhs, Value::Bool(true))))
            }
            BinaryOp::Or => {
                let lhs = self.eval(left, scope)?;
                if matches!(lhs, Value::Bool(true)) {
                    return Ok(Value::Bool(true));
                }
                let rhs = self.eval(right, scope)?;
                Ok(Value::Bool(matches!(rhs, Value::Bool(true))))
            }
            BinaryOp::Compare(op) => {
                let lhs = self.eval(left, scope)?;
                let rhs = self.eval(right, scope)?;
                let result = self.compare(op, &lhs, &rhs)?;
                Ok(Value::Bool(result))
            }
            BinaryOp::Add => {
                let lhs = self.eval(left, scope)?;
                let rhs = self.eval(right, scope)?;
                self.add(lhs, rhs)
            }
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                let lhs = self.eval(left, scope)?;
                let rhs = self.eval(right, scope)?;
                self.arithmetic(op, lhs, rhs)
            }
        }
    }

    /// Addition is number + number, string + string, or `__add__` on a
    /// left-hand instance.
    fn add(&mut self, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
        match (&lhs, &rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.wrapping_add(*b))),
            (Value::Str(a), Value::Str(b)) => {
                Ok(Value::Str(Rc::from(format!("{}{}", a, b))))
            }
            (Value::Instance(instance), _) if instance.has_method(ADD_METHOD, 1) => {
                let instance = Rc::clone(instance);
                self.call_method(&instance, ADD_METHOD, vec![rhs])
            }
            _ => Err(RuntimeError::type_mismatch(format!(
                "cannot add {} and {}",
                lhs.type_name(),
                rhs.type_name()
            ))),
        }
    }

    fn arithmetic(&mut self, op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
        let (Value::Number(a), Value::Number(b)) = (&lhs, &rhs) else {
            let verb = match op {
                BinaryOp::Sub => "subtract",
                BinaryOp::Mul => "multiply",
                _ => "divide",
            };
            return Err(RuntimeError::type_mismatch(format!(
                "cannot {} {} and {}",
                verb,
                lhs.type_name(),
                rhs.type_name()
            )));
        };

        match op {
            BinaryOp::Sub => Ok(Value::Number(a.wrapping_sub(*b))),
            BinaryOp::Mul => Ok(Value::Number(a.wrapping_mul(*b))),
            _ => {
                if *b == 0 {
                    Err(RuntimeError::DivisionByZero)
                } else {
                    Ok(Value::Number(a.wrapping_div(*b)))
                }
            }
        }
    }

    fn compare(&mut self, op: CompareOp, lhs: &Value, rhs: &Value) -> Result<bool, RuntimeError> {
        match op {
            CompareOp::Eq => self.values_equal(lhs, rhs),
            CompareOp::NotEq => Ok(!self.values_equal(lhs, rhs)?),
            CompareOp::Less => self.value_less(lhs, rhs),
            CompareOp::Greater => {
                Ok(!self.value_less(lhs, rhs)? && !self.values_equal(lhs, rhs)?)
            }
            CompareOp::LessEq => Ok(self.value_less(lhs, rhs)? || self.values_equal(lhs, rhs)?),
            CompareOp::GreaterEq => Ok(!self.value_less(lhs, rhs)?),
        }
    }

    /// Equality: `None` equals `None`, primitives compare by value, and an
    /// instance on the left may define `__eq__`.
    fn values_equal(&mut self, lhs: &Value, rhs: &Value) -> Result<bool, RuntimeError> {
        match (lhs, rhs) {
            (Value::None, Value::None) => Ok(true),
            (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
            (Value::Number(a), Value::Number(b)) => Ok(a == b),
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            (Value::Instance(instance), _) if instance.has_method(EQ_METHOD, 1) => {
                self.dunder_compare(instance, EQ_METHOD, rhs)
            }
            _ => Err(RuntimeError::not_comparable(
                lhs.type_name(),
                rhs.type_name(),
            )),
        }
    }

    /// Ordering: numbers numerically, strings lexicographically, bools with
    /// false < true, and an instance on the left may define `__lt__`.
    fn value_less(&mut self, lhs: &Value, rhs: &Value) -> Result<bool, RuntimeError> {
        match (lhs, rhs) {
            (Value::Bool(a), Value::Bool(b)) => Ok(a < b),
            (Value::Number(a), Value::Number(b)) => Ok(a < b),
            (Value::Str(a), Value::Str(b)) => Ok(a < b),
            (Value::Instance(instance), _) if instance.has_method(LT_METHOD, 1) => {
                self.dunder_compare(instance, LT_METHOD, rhs)
            }
            _ => Err(RuntimeError::not_comparable(
                lhs.type_name(),
                rhs.type_name(),
            )),
        }
    }

    fn dunder_compare(
        &mut self,
        instance: &Rc<ClassInstance>,
        method: &str,
        rhs: &Value,
    ) -> Result<bool, RuntimeError> {
        let instance = Rc::clone(instance);
        let result = self.call_method(&instance, method, vec![rhs.clone()])?;
        match result {
            Value::Bool(value) => Ok(value),
            other => Err(RuntimeError::type_mismatch(format!(
                "{} must return a Bool, found {}",
                method,
                other.type_name()
            ))),
        }
    }
}

/// Resolves a dotted path: the first segment in the given scope, every later
/// segment in the fields of the instance resolved so far.
fn lookup(path: &[Rc<str>], scope: &Closure) -> Result<Value, RuntimeError> {
    let Some((first, rest)) = path.split_first() else {
        return Err(RuntimeError::undefined_variable(""));
    };

    let mut value = match scope.get(first.as_ref()) {
        Some(value) => value.clone(),
        None => return Err(RuntimeError::undefined_variable(first.as_ref())),
    };

    for segment in rest {
        let Value::Instance(instance) = &value else {
            return Err(RuntimeError::type_mismatch(format!(
                "cannot read field `{}` of a {}",
                segment,
                value.type_name()
            )));
        };
        let field = instance.fields().get(segment.as_ref()).cloned();
        match field {
            Some(next) => value = next,
            None => return Err(RuntimeError::field_not_found(segment.as_ref())),
        }
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::interpreter::parser::Parser;

    fn run(source: &str) -> Result<String, RuntimeError> {
        let lexer = Lexer::new(source).expect("source should lex");
        let program = Parser::new(lexer).parse().expect("source should parse");
        let mut interpreter = Interpreter::new(Vec::new());
        interpreter.run(&program)?;
        Ok(String::from_utf8(interpreter.into_inner()).expect("output should be UTF-8"))
    }

    #[test]
    fn test_print_joins_with_spaces() {
        assert_eq!(run("print 1, 'two', True, None\n").unwrap(), "1 two True None\n");
    }

    #[test]
    fn test_assignment_and_lookup() {
        assert_eq!(run("a = 10\nb = a\nprint b\n").unwrap(), "10\n");
    }

    #[test]
    fn test_integer_division_truncates() {
        assert_eq!(run("print 7 / 2\n").unwrap(), "3\n");
        assert_eq!(run("print -7 / 2\n").unwrap(), "-3\n");
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            run("print 1 / 0\n").unwrap_err(),
            RuntimeError::DivisionByZero
        ));
    }

    #[test]
    fn test_top_level_return_rejected() {
        assert!(matches!(
            run("return 1\n").unwrap_err(),
            RuntimeError::ReturnOutsideMethod
        ));
    }

    #[test]
    fn test_none_equality() {
        assert_eq!(run("print None == None\n").unwrap(), "True\n");
        assert_eq!(run("print None != None\n").unwrap(), "False\n");
    }

    #[test]
    fn test_none_ordering_is_an_error() {
        assert!(matches!(
            run("print None < None\n").unwrap_err(),
            RuntimeError::NotComparable { .. }
        ));
    }

    #[test]
    fn test_logic_on_non_bools_is_false() {
        assert_eq!(run("print 1 and True\n").unwrap(), "False\n");
        assert_eq!(run("print 'x' or False\n").unwrap(), "False\n");
        assert_eq!(run("print False or 'x'\n").unwrap(), "False\n");
    }

    #[test]
    fn test_stringify() {
        assert_eq!(run("print str(42)\n").unwrap(), "42\n");
        assert_eq!(run("print str(None) + '!'\n").unwrap(), "None!\n");
        assert_eq!(run("print str(True)\n").unwrap(), "True\n");
    }
}
