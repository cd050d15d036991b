pub mod error;
pub mod evaluator;
pub mod parser;

pub use error::{LexError, MythonError, ParseError, RuntimeError};
pub use evaluator::{ControlFlow, Interpreter};
pub use parser::Parser;
