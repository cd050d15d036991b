use indexmap::IndexMap;
use std::rc::Rc;

use crate::ast::{BinaryOp, CompareOp, Expr, Stmt};
use crate::diagnostic::Span;
use crate::lexer::Lexer;
use crate::token::Token;
use crate::value::{Class, Method, Value};

use super::error::ParseError;

/// Recursive-descent parser over the token cursor.
///
/// Classes are resolved at parse time: `declared_classes` maps every class
/// declared so far to its class object, so base-class references and
/// `ClassName(...)` constructions bind directly to the class. The registry
/// keeps all classes alive for the lifetime of the program.
pub struct Parser {
    lexer: Lexer,
    declared_classes: IndexMap<String, Rc<Class>>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        Self {
            lexer,
            declared_classes: IndexMap::new(),
        }
    }

    pub fn parse(mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut program = Vec::new();
        while !matches!(self.lexer.current(), Token::Eof) {
            program.push(self.statement()?);
        }
        Ok(program)
    }

    fn advance(&mut self) {
        self.lexer.advance();
    }

    fn span(&self) -> Span {
        self.lexer.current_span()
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::unexpected_token(expected, self.lexer.current().to_string(), self.span())
    }

    fn expect(&mut self, expected: &Token, describe: &str) -> Result<(), ParseError> {
        if std::mem::discriminant(self.lexer.current()) == std::mem::discriminant(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(describe))
        }
    }

    fn expect_char(&mut self, c: u8) -> Result<(), ParseError> {
        if self.lexer.current().is_char(c) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{}`", c as char)))
        }
    }

    fn expect_id(&mut self) -> Result<Rc<str>, ParseError> {
        if let Token::Id(name) = self.lexer.current() {
            let name = Rc::from(name.as_str());
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("an identifier"))
        }
    }

    // Statement = "class" ClassDef | "if" Condition | SimpleStatement NEWLINE
    fn statement(&mut self) -> Result<Stmt, ParseError> {
        match self.lexer.current() {
            Token::Class => {
                self.advance();
                self.class_definition()
            }
            Token::If => self.condition(),
            _ => {
                let stmt = self.simple_statement()?;
                self.expect(&Token::Newline, "end of line")?;
                Ok(stmt)
            }
        }
    }

    // ClassDef = Id [ "(" Id ")" ] ":" NEWLINE INDENT "def" MethodList DEDENT
    fn class_definition(&mut self) -> Result<Stmt, ParseError> {
        let name_span = self.span();
        let name = self.expect_id()?;

        let parent = if self.lexer.current().is_char(b'(') {
            self.advance();
            let base_span = self.span();
            let base = self.expect_id()?;
            self.expect_char(b')')?;
            match self.declared_classes.get(base.as_ref()) {
                Some(class) => Some(Rc::clone(class)),
                None => {
                    return Err(ParseError::unknown_base_class(
                        base.as_ref(),
                        name.as_ref(),
                        base_span,
                    ))
                }
            }
        } else {
            None
        };

        self.expect_char(b':')?;
        self.expect(&Token::Newline, "end of line")?;
        self.expect(&Token::Indent, "an indented class body")?;

        if !matches!(self.lexer.current(), Token::Def) {
            return Err(self.unexpected("`def`"));
        }
        let mut methods = Vec::new();
        while matches!(self.lexer.current(), Token::Def) {
            methods.push(self.method()?);
        }

        self.expect(&Token::Dedent, "end of class body")?;

        if self.declared_classes.contains_key(name.as_ref()) {
            return Err(ParseError::duplicate_class(name.as_ref(), name_span));
        }
        let class = Rc::new(Class::new(name, methods, parent));
        self.declared_classes
            .insert(class.name().to_string(), Rc::clone(&class));
        Ok(Stmt::ClassDef(class))
    }

    // Method = "def" Id "(" [ Id { "," Id } ] ")" ":" Suite
    fn method(&mut self) -> Result<Method, ParseError> {
        self.advance(); // def
        let name = self.expect_id()?;
        self.expect_char(b'(')?;

        let mut formal_params = Vec::new();
        if matches!(self.lexer.current(), Token::Id(_)) {
            formal_params.push(self.expect_id()?);
            while self.lexer.current().is_char(b',') {
                self.advance();
                formal_params.push(self.expect_id()?);
            }
        }

        self.expect_char(b')')?;
        self.expect_char(b':')?;
        let body = self.suite()?;

        Ok(Method {
            name,
            formal_params,
            body,
        })
    }

    // Suite = NEWLINE INDENT { Statement } DEDENT
    fn suite(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&Token::Newline, "end of line")?;
        self.expect(&Token::Indent, "an indented block")?;

        let mut statements = Vec::new();
        while !matches!(self.lexer.current(), Token::Dedent) {
            statements.push(self.statement()?);
        }
        self.advance(); // dedent
        Ok(statements)
    }

    // Condition = "if" Test ":" Suite [ "else" ":" Suite ]
    fn condition(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // if
        let condition = self.test()?;
        self.expect_char(b':')?;
        let then_branch = self.suite()?;

        let else_branch = if matches!(self.lexer.current(), Token::Else) {
            self.advance();
            self.expect_char(b':')?;
            Some(self.suite()?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    // SimpleStatement = "return" Test | "print" [ TestList ] | AssignOrCall
    fn simple_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.lexer.current() {
            Token::Return => {
                self.advance();
                Ok(Stmt::Return(self.test()?))
            }
            Token::Print => {
                self.advance();
                let args = if matches!(self.lexer.current(), Token::Newline) {
                    Vec::new()
                } else {
                    self.test_list()?
                };
                Ok(Stmt::Print { args })
            }
            _ => self.assignment_or_call(),
        }
    }

    // AssignOrCall = DottedIds ( "=" Test | "(" [ TestList ] ")" )
    fn assignment_or_call(&mut self) -> Result<Stmt, ParseError> {
        let start_span = self.span();
        let (prefix, last) = self.dotted_ids()?;

        if self.lexer.current().is_char(b'=') {
            self.advance();
            let value = self.test()?;
            if prefix.is_empty() {
                return Ok(Stmt::Assign { name: last, value });
            }
            return Ok(Stmt::FieldAssign {
                object: Expr::Variable(prefix),
                field: last,
                value,
            });
        }

        self.expect_char(b'(')?;
        let args = if self.lexer.current().is_char(b')') {
            Vec::new()
        } else {
            self.test_list()?
        };
        self.expect_char(b')')?;

        let call = self.finish_call(prefix, last, args, start_span)?;
        Ok(Stmt::Expr(call))
    }

    // DottedIds = Id { "." Id }; returns the path split into prefix + last.
    fn dotted_ids(&mut self) -> Result<(Vec<Rc<str>>, Rc<str>), ParseError> {
        let mut prefix = Vec::new();
        let mut last = self.expect_id()?;
        while self.lexer.current().is_char(b'.') {
            self.advance();
            let next = self.expect_id()?;
            prefix.push(std::mem::replace(&mut last, next));
        }
        Ok((prefix, last))
    }

    /// Disambiguates `a.b.c(args)`: a dotted prefix makes a method call on
    /// the prefix; a bare name is a construction if it names a declared
    /// class, a stringification if it is `str`, and an error otherwise.
    fn finish_call(
        &mut self,
        prefix: Vec<Rc<str>>,
        name: Rc<str>,
        args: Vec<Expr>,
        span: Span,
    ) -> Result<Expr, ParseError> {
        if !prefix.is_empty() {
            return Ok(Expr::MethodCall {
                object: Box::new(Expr::Variable(prefix)),
                method: name,
                args,
            });
        }

        if let Some(class) = self.declared_classes.get(name.as_ref()) {
            return Ok(Expr::NewInstance {
                class: Rc::clone(class),
                args,
            });
        }

        if name.as_ref() == "str" {
            if args.len() != 1 {
                return Err(ParseError::str_arity(args.len(), span));
            }
            let mut args = args;
            return Ok(Expr::Stringify(Box::new(args.remove(0))));
        }

        Err(ParseError::free_function_call(name.as_ref(), span))
    }

    // Test = AndTest { "or" AndTest }
    fn test(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_test()?;
        while matches!(self.lexer.current(), Token::Or) {
            self.advance();
            let right = self.and_test()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::Or,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    // AndTest = NotTest { "and" NotTest }
    fn and_test(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.not_test()?;
        while matches!(self.lexer.current(), Token::And) {
            self.advance();
            let right = self.not_test()?;
            left = Expr::Binary {
                left: Box::new(left),
                op: BinaryOp::And,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    // NotTest = "not" NotTest | Comparison
    fn not_test(&mut self) -> Result<Expr, ParseError> {
        if matches!(self.lexer.current(), Token::Not) {
            self.advance();
            return Ok(Expr::Not(Box::new(self.not_test()?)));
        }
        self.comparison()
    }

    // Comparison = Expr [ comp_op Expr ]; comparisons do not chain.
    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.additive()?;

        let op = match self.lexer.current() {
            Token::Char(b'<') => Some(CompareOp::Less),
            Token::Char(b'>') => Some(CompareOp::Greater),
            Token::Eq => Some(CompareOp::Eq),
            Token::NotEq => Some(CompareOp::NotEq),
            Token::LessOrEq => Some(CompareOp::LessEq),
            Token::GreaterOrEq => Some(CompareOp::GreaterEq),
            _ => None,
        };

        match op {
            Some(op) => {
                self.advance();
                let right = self.additive()?;
                Ok(Expr::Binary {
                    left: Box::new(left),
                    op: BinaryOp::Compare(op),
                    right: Box::new(right),
                })
            }
            None => Ok(left),
        }
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.lexer.current() {
                Token::Char(b'+') => BinaryOp::Add,
                Token::Char(b'-') => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.multiplicative()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.primary()?;
        loop {
            let op = match self.lexer.current() {
                Token::Char(b'*') => BinaryOp::Mul,
                Token::Char(b'/') => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.primary()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        match self.lexer.current() {
            Token::Char(b'(') => {
                self.advance();
                let expr = self.test()?;
                self.expect_char(b')')?;
                Ok(expr)
            }
            // Unary minus is multiplication by -1.
            Token::Char(b'-') => {
                self.advance();
                let operand = self.primary()?;
                Ok(Expr::Binary {
                    left: Box::new(operand),
                    op: BinaryOp::Mul,
                    right: Box::new(Expr::Literal(Value::Number(-1))),
                })
            }
            Token::Number(value) => {
                let value = *value;
                self.advance();
                Ok(Expr::Literal(Value::Number(value)))
            }
            Token::Str(text) => {
                let text = Rc::from(text.as_str());
                self.advance();
                Ok(Expr::Literal(Value::Str(text)))
            }
            Token::True => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(true)))
            }
            Token::False => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(false)))
            }
            Token::None => {
                self.advance();
                Ok(Expr::Literal(Value::None))
            }
            Token::Id(_) => {
                let start_span = self.span();
                let (prefix, last) = self.dotted_ids()?;

                if self.lexer.current().is_char(b'(') {
                    self.advance();
                    let args = if self.lexer.current().is_char(b')') {
                        Vec::new()
                    } else {
                        self.test_list()?
                    };
                    self.expect_char(b')')?;
                    return self.finish_call(prefix, last, args, start_span);
                }

                let mut path = prefix;
                path.push(last);
                Ok(Expr::Variable(path))
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    // TestList = Test { "," Test }
    fn test_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.test()?];
        while self.lexer.current().is_char(b',') {
            self.advance();
            exprs.push(self.test()?);
        }
        Ok(exprs)
    }
}
