#[macro_use]
extern crate lazy_static;

pub mod arithmetic;
pub mod cmdline;
pub mod core;
pub mod environment;
pub mod evaluator;
pub mod interpreter;
pub mod printer;
pub mod reader;
pub mod source;
pub mod table;
pub mod tokens;
pub mod types;

pub use interpreter::Interpreter;
pub use types::Expression;
