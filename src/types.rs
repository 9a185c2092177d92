use crate::environment::Environment;
use crate::evaluator;
use derive_more::{Deref, Display};
use std::fmt::{self, Formatter};
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::{RangeFrom, RangeInclusive};
use std::rc::Rc;

pub type Int = i64;

pub const NIL: &str = "nil";
pub const TRUE: &str = "true";
pub const FALSE: &str = "false";

#[derive(Deref, Display, Debug, PartialEq, Eq, Hash, Clone)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Self(Rc::from(name))
    }

    pub fn nil() -> Self {
        Self::new(NIL)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Debug, Clone)]
pub enum Arity {
    Between(RangeInclusive<usize>),
    AtLeast(RangeFrom<usize>),
}

#[derive(Debug)]
pub struct BadArgCount {
    name: String,
    expected: Arity,
    got: usize,
}

impl fmt::Display for BadArgCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "When evaluating {} expected {} arguments, but received {} arguments",
            self.name, self.expected, self.got
        )
    }
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Self::Between(n..=n)
    }

    pub const fn at_least(n: usize) -> Self {
        Self::AtLeast(n..)
    }

    pub fn contains(&self, n: usize) -> bool {
        match self {
            Self::Between(range) => range.contains(&n),
            Self::AtLeast(range) => range.contains(&n),
        }
    }

    pub fn validate_for(&self, n: usize, name: &str) -> Result<(), BadArgCount> {
        match self.contains(n) {
            true => Ok(()),
            false => Err(BadArgCount {
                name: name.to_string(),
                expected: self.clone(),
                got: n,
            }),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Between(r) => {
                if r.start() == r.end() {
                    write!(f, "exactly {}", r.start())
                } else {
                    write!(f, "from {} to {}", r.start(), r.end())
                }
            }
            Arity::AtLeast(r) => write!(f, "at least {}", r.start),
        }
    }
}

#[derive(Debug, Display)]
pub enum TypeMismatch {
    #[display(fmt = "a number")]
    NotANumber,
    #[display(fmt = "a symbol")]
    NotASymbol,
    #[display(fmt = "a string")]
    NotAString,
    #[display(fmt = "a function")]
    NotAFunction,
}

#[derive(Debug)]
pub struct BadArgType {
    pub name: String,
    pub index: usize,
    pub expected: TypeMismatch,
    pub got: &'static str,
}

impl fmt::Display for BadArgType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: argument {} should be {}, but received a {}",
            self.name, self.index, self.expected, self.got
        )
    }
}

pub type Procedure = dyn Fn(&Expression, &mut Environment<'_>) -> evaluator::Result;

/// Compile-time description of a built-in callable.
pub struct PrimitiveFn {
    pub name: &'static str,
    pub description: &'static str,
    pub arity: Arity,
    pub fn_ptr: fn(&Expression, &mut Environment<'_>) -> evaluator::Result,
}

impl fmt::Debug for PrimitiveFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "primitive function #<{}>", self.name)
    }
}

/// The body shared by both calling conventions. Whether the arguments reach
/// it evaluated or not is decided by the [`Expression`] variant wrapping it.
pub struct Callable {
    pub name: String,
    pub description: String,
    pub arity: Arity,
    procedure: Box<Procedure>,
}

impl Callable {
    pub fn new<F>(name: String, description: String, arity: Arity, procedure: F) -> Self
    where
        F: Fn(&Expression, &mut Environment<'_>) -> evaluator::Result + 'static,
    {
        Self {
            name,
            description,
            arity,
            procedure: Box::new(procedure),
        }
    }

    pub fn apply(&self, args: &Expression, env: &mut Environment<'_>) -> evaluator::Result {
        self.arity
            .validate_for(args.length(), &self.name)
            .map_err(evaluator::Error::BadArgCount)?;
        log::trace!("Call {} with {}", self.name, args);
        let result = (self.procedure)(args, env);
        match &result {
            Ok(val) => log::trace!("Call to {} resulted in {}", self.name, val),
            Err(e) => log::trace!("Call to {} failed: {}", self.name, e),
        }
        result
    }
}

impl From<&'static PrimitiveFn> for Callable {
    fn from(primitive: &'static PrimitiveFn) -> Self {
        Self {
            name: primitive.name.to_string(),
            description: primitive.description.to_string(),
            arity: primitive.arity.clone(),
            procedure: Box::new(primitive.fn_ptr),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Callable #<{}>", self.name)
    }
}

/// A value owned by a collaborator library, carried through the language
/// without the core knowing its structure.
pub trait HostValue: fmt::Debug + fmt::Display {
    fn type_name(&self) -> &'static str;
    fn info(&self) -> String;
}

pub struct ConsCell {
    pub head: Expression,
    pub tail: Expression,
}

// Lists are unlinked, compared and hashed iteratively along their tails, so
// only nesting depth costs host stack.
impl Drop for ConsCell {
    fn drop(&mut self) {
        let mut tail = mem::replace(&mut self.tail, Expression::nil());
        while let Expression::Cons(rc) = tail {
            match Rc::try_unwrap(rc) {
                Ok(mut cell) => tail = mem::replace(&mut cell.tail, Expression::nil()),
                Err(_) => break,
            }
        }
    }
}

impl fmt::Debug for ConsCell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        list.entry(&self.head);
        let mut cursor = &self.tail;
        while let Expression::Cons(cell) = cursor {
            list.entry(&cell.head);
            cursor = &cell.tail;
        }
        if !cursor.is_nil() {
            list.entry(&format_args!(". {:?}", cursor));
        }
        list.finish()
    }
}

fn cells_eq(mut x: &Rc<ConsCell>, mut y: &Rc<ConsCell>) -> bool {
    loop {
        if Rc::ptr_eq(x, y) {
            return true;
        }
        if x.head != y.head {
            return false;
        }
        match (&x.tail, &y.tail) {
            (Expression::Cons(a), Expression::Cons(b)) => {
                x = a;
                y = b;
            }
            (a, b) => return a == b,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expression {
    Symbol(Symbol),
    Integer(Int),
    Real(f64),
    String(Rc<str>),
    Cons(Rc<ConsCell>),
    Function(Rc<Callable>),
    Special(Rc<Callable>),
    Host(Rc<dyn HostValue>),
}

impl Expression {
    pub fn symbol(name: &str) -> Self {
        Self::Symbol(Symbol::new(name))
    }

    pub fn nil() -> Self {
        Self::Symbol(Symbol::nil())
    }

    pub fn string(text: &str) -> Self {
        Self::String(Rc::from(text))
    }

    pub fn cons(head: Expression, tail: Expression) -> Self {
        Self::Cons(Rc::new(ConsCell { head, tail }))
    }

    pub fn function(callable: Callable) -> Self {
        Self::Function(Rc::new(callable))
    }

    pub fn special(callable: Callable) -> Self {
        Self::Special(Rc::new(callable))
    }

    pub fn host<T: HostValue + 'static>(value: T) -> Self {
        Self::Host(Rc::new(value))
    }

    /// Builds a `nil` terminated chain of cells holding `elements` in order.
    pub fn wrap_list(elements: Vec<Expression>) -> Self {
        elements
            .into_iter()
            .rev()
            .fold(Self::nil(), |tail, head| Self::cons(head, tail))
    }

    pub fn is_nil(&self) -> bool {
        match self {
            Expression::Symbol(s) => s.name() == NIL,
            _ => false,
        }
    }

    pub fn is_proper_list(&self) -> bool {
        let mut cursor = self;
        loop {
            match cursor {
                Expression::Cons(cell) => cursor = &cell.tail,
                other => return other.is_nil(),
            }
        }
    }

    /// Walks a chain of cells. Iteration ends at the first tail that is not a
    /// cell, so an improper tail is silently dropped.
    pub fn iter(&self) -> ListIter {
        ListIter {
            cursor: self.clone(),
        }
    }

    pub fn length(&self) -> usize {
        self.iter().count()
    }

    pub fn nth(&self, n: usize) -> Option<Expression> {
        self.iter().nth(n)
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Expression::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Expression::Symbol(_) => "symbol",
            Expression::Integer(_) => "integer",
            Expression::Real(_) => "real",
            Expression::String(_) => "string",
            Expression::Cons(_) => "cons cell",
            Expression::Function(_) => "function",
            Expression::Special(_) => "special form",
            Expression::Host(h) => h.type_name(),
        }
    }
}

pub struct ListIter {
    cursor: Expression,
}

impl Iterator for ListIter {
    type Item = Expression;

    fn next(&mut self) -> Option<Self::Item> {
        let cell = match &self.cursor {
            Expression::Cons(cell) => cell.clone(),
            _ => return None,
        };
        self.cursor = cell.tail.clone();
        Some(cell.head.clone())
    }
}

fn address<T: ?Sized>(rc: &Rc<T>) -> *const () {
    Rc::as_ptr(rc) as *const ()
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        use Expression::*;
        match (self, other) {
            (Symbol(x), Symbol(y)) => x == y,
            (Integer(x), Integer(y)) => x == y,
            (Real(x), Real(y)) => x == y,
            (String(x), String(y)) => x == y,
            (Cons(x), Cons(y)) => cells_eq(x, y),
            (Function(x), Function(y)) | (Special(x), Special(y)) => address(x) == address(y),
            (Host(x), Host(y)) => address(x) == address(y),
            (_, _) => false,
        }
    }
}

impl Hash for Expression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Expression::Symbol(s) => s.hash(state),
            Expression::Integer(i) => i.hash(state),
            // 0.0 == -0.0, so they must hash alike
            Expression::Real(r) if *r == 0.0 => 0u64.hash(state),
            Expression::Real(r) => r.to_bits().hash(state),
            Expression::String(s) => s.hash(state),
            Expression::Cons(cell) => {
                cell.head.hash(state);
                let mut tail = &cell.tail;
                while let Expression::Cons(next) = tail {
                    mem::discriminant(tail).hash(state);
                    next.head.hash(state);
                    tail = &next.tail;
                }
                tail.hash(state);
            }
            Expression::Function(c) | Expression::Special(c) => address(c).hash(state),
            Expression::Host(h) => address(h).hash(state),
        }
    }
}
