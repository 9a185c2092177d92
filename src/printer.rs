use crate::types::Expression;
use itertools::Itertools;
use std::fmt;

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Symbol(name) => write!(f, "{}", name),
            Expression::Integer(value) => write!(f, "{}", value),
            Expression::Real(value) => write!(f, "{}", real_repr(*value)),
            Expression::String(text) => write!(f, "{}", text),
            Expression::Cons(_) => write!(f, "({})", self.iter().join(", ")),
            Expression::Function(c) => write!(f, "<function {}>", c.name),
            Expression::Special(c) => write!(f, "<special {}>", c.name),
            Expression::Host(value) => write!(f, "{}", value),
        }
    }
}

impl Expression {
    /// Describes the role of the expression, for the REPL's `:info`.
    pub fn info(&self) -> String {
        match self {
            Expression::Symbol(name) => format!("Symbol expression named {}", name),
            Expression::Integer(value) => format!("Integer expression with value {}", value),
            Expression::Real(value) => format!("Real expression with value {}", real_repr(*value)),
            Expression::String(text) => format!("String expression: {}", string_repr(text)),
            Expression::Cons(cell) => format!(
                "ConsCell expression with head {} that is {} of its list",
                cell.head,
                match cell.tail.is_nil() {
                    true => "the end",
                    false => "not the end",
                }
            ),
            Expression::Function(c) => format!("Function {}: {}", c.name, c.description),
            Expression::Special(c) => format!("Special form {}: {}", c.name, c.description),
            Expression::Host(value) => value.info(),
        }
    }
}

/// Positional notation with at least one fractional digit, so that the
/// lexer reads finite values back unchanged: `3.0`, `0.0000001`.
pub fn real_repr(value: f64) -> String {
    let text = value.to_string();
    match value.is_finite() && !text.contains('.') {
        true => text + ".0",
        false => text,
    }
}

/// Quotes `src` so that the lexer would read it back unchanged.
pub fn string_repr(src: &str) -> String {
    let mut output = String::with_capacity(src.len() + 2);
    output.push('"');
    for c in src.chars() {
        if c == '"' || c == '\\' {
            output.push('\\');
        }
        output.push(c);
    }
    output.push('"');
    output
}
