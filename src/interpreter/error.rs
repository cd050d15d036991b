use std::fmt;

use crate::diagnostic::{Diagnostic, Label, Span};

/// A lexical failure: the character stream could not be tokenized.
#[derive(Debug, Clone)]
pub enum LexError {
    BadIndent { spaces: usize, span: Span },
    UnterminatedString { span: Span },
    UnknownEscape { escape: char, span: Span },
    NewlineInString { span: Span },
    UnexpectedChar { ch: char, span: Span },
    NumberTooLarge { literal: String, span: Span },
}

impl LexError {
    pub fn bad_indent(spaces: usize, span: Span) -> Self {
        Self::BadIndent { spaces, span }
    }

    pub fn unterminated_string(span: Span) -> Self {
        Self::UnterminatedString { span }
    }

    pub fn unknown_escape(escape: char, span: Span) -> Self {
        Self::UnknownEscape { escape, span }
    }

    pub fn newline_in_string(span: Span) -> Self {
        Self::NewlineInString { span }
    }

    pub fn unexpected_char(ch: char, span: Span) -> Self {
        Self::UnexpectedChar { ch, span }
    }

    pub fn number_too_large(literal: impl Into<String>, span: Span) -> Self {
        Self::NumberTooLarge {
            literal: literal.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::BadIndent { span, .. } => *span,
            Self::UnterminatedString { span } => *span,
            Self::UnknownEscape { span, .. } => *span,
            Self::NewlineInString { span } => *span,
            Self::UnexpectedChar { span, .. } => *span,
            Self::NumberTooLarge { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::BadIndent { spaces, span } => {
                Diagnostic::error(format!(
                    "indentation of {} spaces is not a multiple of 2",
                    spaces
                ))
                .with_code("E0101")
                .with_label(Label::new(*span, "indented here"))
                .with_help("each indentation level is exactly two spaces")
            }
            Self::UnterminatedString { span } => {
                Diagnostic::error("string literal was never closed")
                    .with_code("E0102")
                    .with_label(Label::new(*span, "started here"))
            }
            Self::UnknownEscape { escape, span } => {
                Diagnostic::error(format!("unrecognized escape sequence `\\{}`", escape))
                    .with_code("E0103")
                    .with_label(Label::new(*span, "unknown escape"))
                    .with_help("supported escapes are \\n \\t \\r \\\" \\\\ \\'")
            }
            Self::NewlineInString { span } => {
                Diagnostic::error("string literal contains a raw line break")
                    .with_code("E0104")
                    .with_label(Label::new(*span, "string interrupted here"))
                    .with_help("use \\n to embed a line break")
            }
            Self::UnexpectedChar { ch, span } => {
                Diagnostic::error(format!("unexpected character {:?}", ch))
                    .with_code("E0105")
                    .with_label(Label::new(*span, "cannot be tokenized"))
            }
            Self::NumberTooLarge { literal, span } => {
                Diagnostic::error(format!("number literal `{}` does not fit", literal))
                    .with_code("E0106")
                    .with_label(Label::new(*span, "out of range"))
            }
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadIndent { spaces, .. } => {
                write!(f, "indentation of {} spaces is not a multiple of 2", spaces)
            }
            Self::UnterminatedString { .. } => write!(f, "string literal was never closed"),
            Self::UnknownEscape { escape, .. } => {
                write!(f, "unrecognized escape sequence \\{}", escape)
            }
            Self::NewlineInString { .. } => {
                write!(f, "string literal contains a raw line break")
            }
            Self::UnexpectedChar { ch, .. } => write!(f, "unexpected character {:?}", ch),
            Self::NumberTooLarge { literal, .. } => {
                write!(f, "number literal `{}` does not fit", literal)
            }
        }
    }
}

impl std::error::Error for LexError {}

/// A grammar violation found while building the executable tree.
#[derive(Debug, Clone)]
pub enum ParseError {
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    UnknownBaseClass {
        base: String,
        class: String,
        span: Span,
    },
    DuplicateClass {
        name: String,
        span: Span,
    },
    FreeFunctionCall {
        name: String,
        span: Span,
    },
    StrArity {
        found: usize,
        span: Span,
    },
}

impl ParseError {
    pub fn unexpected_token(
        expected: impl Into<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn unknown_base_class(base: impl Into<String>, class: impl Into<String>, span: Span) -> Self {
        Self::UnknownBaseClass {
            base: base.into(),
            class: class.into(),
            span,
        }
    }

    pub fn duplicate_class(name: impl Into<String>, span: Span) -> Self {
        Self::DuplicateClass {
            name: name.into(),
            span,
        }
    }

    pub fn free_function_call(name: impl Into<String>, span: Span) -> Self {
        Self::FreeFunctionCall {
            name: name.into(),
            span,
        }
    }

    pub fn str_arity(found: usize, span: Span) -> Self {
        Self::StrArity { found, span }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. } => *span,
            Self::UnknownBaseClass { span, .. } => *span,
            Self::DuplicateClass { span, .. } => *span,
            Self::FreeFunctionCall { span, .. } => *span,
            Self::StrArity { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::UnexpectedToken {
                expected,
                found,
                span,
            } => Diagnostic::error(format!("expected {}, found {}", expected, found))
                .with_code("E0201")
                .with_label(Label::new(*span, format!("expected {}", expected))),
            Self::UnknownBaseClass { base, class, span } => {
                Diagnostic::error(format!("base class `{}` of `{}` is not declared", base, class))
                    .with_code("E0202")
                    .with_label(Label::new(*span, "unknown base class"))
                    .with_help("a base class must be declared before its subclasses")
            }
            Self::DuplicateClass { name, span } => {
                Diagnostic::error(format!("class `{}` is declared twice", name))
                    .with_code("E0203")
                    .with_label(Label::new(*span, "second declaration"))
            }
            Self::FreeFunctionCall { name, span } => {
                Diagnostic::error(format!(
                    "functions are not supported, only methods: `{}`",
                    name
                ))
                .with_code("E0204")
                .with_label(Label::new(*span, "free call"))
            }
            Self::StrArity { found, span } => {
                Diagnostic::error(format!("str takes exactly one argument, found {}", found))
                    .with_code("E0205")
                    .with_label(Label::new(*span, "wrong argument count"))
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken {
                expected, found, ..
            } => write!(f, "expected {}, found {}", expected, found),
            Self::UnknownBaseClass { base, class, .. } => {
                write!(f, "base class `{}` of `{}` is not declared", base, class)
            }
            Self::DuplicateClass { name, .. } => write!(f, "class `{}` is declared twice", name),
            Self::FreeFunctionCall { name, .. } => {
                write!(f, "functions are not supported, only methods: `{}`", name)
            }
            Self::StrArity { found, .. } => {
                write!(f, "str takes exactly one argument, found {}", found)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// An evaluation failure. Aborts the run; there is no user-level catch.
#[derive(Debug, Clone)]
pub enum RuntimeError {
    UndefinedVariable { name: String },
    FieldNotFound { field: String },
    MethodNotFound { class: String, method: String, arity: usize },
    TypeMismatch { message: String },
    NotComparable { left: String, right: String },
    DivisionByZero,
    ReturnOutsideMethod,
    Io { message: String },
}

impl RuntimeError {
    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Self::UndefinedVariable { name: name.into() }
    }

    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
        }
    }

    pub fn method_not_found(
        class: impl Into<String>,
        method: impl Into<String>,
        arity: usize,
    ) -> Self {
        Self::MethodNotFound {
            class: class.into(),
            method: method.into(),
            arity,
        }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
        }
    }

    pub fn not_comparable(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::NotComparable {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn io(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::UndefinedVariable { name } => {
                Diagnostic::error(format!("name `{}` is not defined", name))
                    .with_code("E0301")
            }
            Self::FieldNotFound { field } => {
                Diagnostic::error(format!("object has no field `{}`", field)).with_code("E0302")
            }
            Self::MethodNotFound {
                class,
                method,
                arity,
            } => Diagnostic::error(format!(
                "class `{}` has no method `{}` taking {} argument(s)",
                class, method, arity
            ))
            .with_code("E0303"),
            Self::TypeMismatch { message } => {
                Diagnostic::error(message.clone()).with_code("E0304")
            }
            Self::NotComparable { left, right } => {
                Diagnostic::error(format!("non-comparable objects: {} and {}", left, right))
                    .with_code("E0305")
            }
            Self::DivisionByZero => Diagnostic::error("division by zero").with_code("E0306"),
            Self::ReturnOutsideMethod => {
                Diagnostic::error("return outside of a method body").with_code("E0307")
            }
            Self::Io { message } => {
                Diagnostic::error(format!("failed to write output: {}", message))
                    .with_code("E0308")
            }
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedVariable { name } => write!(f, "name `{}` is not defined", name),
            Self::FieldNotFound { field } => write!(f, "object has no field `{}`", field),
            Self::MethodNotFound {
                class,
                method,
                arity,
            } => write!(
                f,
                "class `{}` has no method `{}` taking {} argument(s)",
                class, method, arity
            ),
            Self::TypeMismatch { message } => f.write_str(message),
            Self::NotComparable { left, right } => {
                write!(f, "non-comparable objects: {} and {}", left, right)
            }
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::ReturnOutsideMethod => write!(f, "return outside of a method body"),
            Self::Io { message } => write!(f, "failed to write output: {}", message),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Any failure of the lex-parse-execute pipeline, for embedders that drive
/// the whole pipeline at once.
#[derive(Debug, Clone)]
pub enum MythonError {
    Lex(LexError),
    Parse(ParseError),
    Runtime(RuntimeError),
}

impl MythonError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Lex(err) => err.to_diagnostic(),
            Self::Parse(err) => err.to_diagnostic(),
            Self::Runtime(err) => err.to_diagnostic(),
        }
    }
}

impl From<LexError> for MythonError {
    fn from(err: LexError) -> Self {
        Self::Lex(err)
    }
}

impl From<ParseError> for MythonError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<RuntimeError> for MythonError {
    fn from(err: RuntimeError) -> Self {
        Self::Runtime(err)
    }
}

impl fmt::Display for MythonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "lex error: {}", err),
            Self::Parse(err) => write!(f, "parse error: {}", err),
            Self::Runtime(err) => write!(f, "runtime error: {}", err),
        }
    }
}

impl std::error::Error for MythonError {}
