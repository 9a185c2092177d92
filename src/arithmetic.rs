//! Numeric tower of two: integer operations stay integral, anything involving
//! a real is carried out on reals.

use crate::types::{Expression, Int};
use std::convert::TryFrom;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(Int),
    Real(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    DivideByZero,
    Overflow,
}

impl fmt::Display for ArithmeticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticError::DivideByZero => write!(f, "cannot divide by zero!"),
            ArithmeticError::Overflow => write!(f, "integer overflow"),
        }
    }
}

pub type Result = std::result::Result<Number, ArithmeticError>;

enum Operands {
    Integers(Int, Int),
    Reals(f64, f64),
}

impl Number {
    pub fn from_expression(expr: &Expression) -> Option<Self> {
        match expr {
            Expression::Integer(i) => Some(Number::Integer(*i)),
            Expression::Real(r) => Some(Number::Real(*r)),
            _ => None,
        }
    }

    fn as_real(self) -> f64 {
        match self {
            Number::Integer(i) => i as f64,
            Number::Real(r) => r,
        }
    }

    fn promote(self, other: Number) -> Operands {
        match (self, other) {
            (Number::Integer(x), Number::Integer(y)) => Operands::Integers(x, y),
            (x, y) => Operands::Reals(x.as_real(), y.as_real()),
        }
    }
}

impl From<Number> for Expression {
    fn from(n: Number) -> Self {
        match n {
            Number::Integer(i) => Expression::Integer(i),
            Number::Real(r) => Expression::Real(r),
        }
    }
}

fn integral(value: Option<Int>) -> Result {
    value.map(Number::Integer).ok_or(ArithmeticError::Overflow)
}

pub fn add(x: Number, y: Number) -> Result {
    match x.promote(y) {
        Operands::Integers(x, y) => integral(x.checked_add(y)),
        Operands::Reals(x, y) => Ok(Number::Real(x + y)),
    }
}

pub fn subtract(x: Number, y: Number) -> Result {
    match x.promote(y) {
        Operands::Integers(x, y) => integral(x.checked_sub(y)),
        Operands::Reals(x, y) => Ok(Number::Real(x - y)),
    }
}

pub fn multiply(x: Number, y: Number) -> Result {
    match x.promote(y) {
        Operands::Integers(x, y) => integral(x.checked_mul(y)),
        Operands::Reals(x, y) => Ok(Number::Real(x * y)),
    }
}

/// Integer division truncates toward zero.
pub fn divide(x: Number, y: Number) -> Result {
    match x.promote(y) {
        Operands::Integers(_, 0) => Err(ArithmeticError::DivideByZero),
        Operands::Integers(x, y) => integral(x.checked_div(y)),
        Operands::Reals(_, y) if y == 0.0 => Err(ArithmeticError::DivideByZero),
        Operands::Reals(x, y) => Ok(Number::Real(x / y)),
    }
}

/// A negative integer exponent truncates the exact result toward zero.
pub fn power(x: Number, y: Number) -> Result {
    match x.promote(y) {
        Operands::Integers(1, _) => Ok(Number::Integer(1)),
        Operands::Integers(-1, exponent) => match exponent % 2 {
            0 => Ok(Number::Integer(1)),
            _ => Ok(Number::Integer(-1)),
        },
        Operands::Integers(0, exponent) if exponent < 0 => Err(ArithmeticError::DivideByZero),
        Operands::Integers(0, exponent) if exponent > 0 => Ok(Number::Integer(0)),
        Operands::Integers(base, exponent) if exponent >= 0 => {
            let exponent = u32::try_from(exponent).map_err(|_| ArithmeticError::Overflow)?;
            integral(base.checked_pow(exponent))
        }
        Operands::Integers(_, _) => Ok(Number::Integer(0)),
        Operands::Reals(x, y) if x == 0.0 && y < 0.0 => Err(ArithmeticError::DivideByZero),
        Operands::Reals(x, y) => Ok(Number::Real(x.powf(y))),
    }
}
