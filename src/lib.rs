pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod interpreter;
pub mod lexer;
pub mod token;
pub mod value;

// Re-export commonly used types for convenience
pub use interpreter::{Interpreter, LexError, MythonError, ParseError, Parser, RuntimeError};
pub use lexer::Lexer;
pub use token::Token;
pub use value::Value;

/// Lexes, parses, and executes a program, writing its output to `out`.
pub fn run_program(source: &str, out: impl std::io::Write) -> Result<(), MythonError> {
    let lexer = Lexer::new(source)?;
    let program = Parser::new(lexer).parse()?;
    let mut interpreter = Interpreter::new(out);
    interpreter.run(&program)?;
    Ok(())
}
