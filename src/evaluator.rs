//! Evaluation is a plain recursive descent over the expression tree: each
//! level of list nesting costs a level of host stack, and there is no tail
//! call elimination. Input nested deeply enough to exhaust the stack aborts
//! the process rather than producing a wrong result.

use crate::arithmetic::ArithmeticError;
use crate::environment::{Environment, LockedSymbol, UnknownSymbol};
use crate::types::{BadArgCount, BadArgType, Expression};
use std::fmt;

pub type Result<T = Expression> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    UnknownSymbol(UnknownSymbol),
    LockedSymbol(LockedSymbol),
    NotCallable(Expression),
    ImproperArguments(Expression),
    BadArgCount(BadArgCount),
    BadArgType(BadArgType),
    Arithmetic(ArithmeticError),
    IOError(std::io::Error),
    Table(csv::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownSymbol(e) => write!(f, "{}", e),
            Error::LockedSymbol(e) => write!(f, "{}", e),
            Error::NotCallable(head) => write!(
                f,
                "error evaluating '{}', which is not a callable s-expression",
                head
            ),
            Error::ImproperArguments(args) => {
                write!(f, "arguments must be nil or a list, found '{}'", args)
            }
            Error::BadArgCount(e) => write!(f, "{}", e),
            Error::BadArgType(e) => write!(f, "{}", e),
            Error::Arithmetic(e) => write!(f, "{}", e),
            Error::IOError(e) => write!(f, "io error: {}", e),
            Error::Table(e) => write!(f, "table error: {}", e),
        }
    }
}

impl From<UnknownSymbol> for Error {
    fn from(e: UnknownSymbol) -> Self {
        Self::UnknownSymbol(e)
    }
}

impl From<LockedSymbol> for Error {
    fn from(e: LockedSymbol) -> Self {
        Self::LockedSymbol(e)
    }
}

impl From<ArithmeticError> for Error {
    fn from(e: ArithmeticError) -> Self {
        Self::Arithmetic(e)
    }
}

impl From<BadArgType> for Error {
    fn from(e: BadArgType) -> Self {
        Self::BadArgType(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::IOError(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Self::Table(e)
    }
}

pub fn eval(expr: &Expression, env: &mut Environment<'_>) -> Result {
    log::trace!("eval {}", expr);
    match expr {
        Expression::Symbol(s) => Ok(env.find(s)?),
        Expression::Cons(cell) => match eval(&cell.head, env)? {
            Expression::Function(f) => {
                let args = evaluate_arguments(&cell.tail, env)?;
                f.apply(&args, env)
            }
            Expression::Special(s) => s.apply(&cell.tail, env),
            _ => Err(Error::NotCallable(cell.head.clone())),
        },
        _ => Ok(expr.clone()),
    }
}

/// Evaluates each element of `args` in order in the caller's environment,
/// producing a parallel list.
pub fn evaluate_arguments(args: &Expression, env: &mut Environment<'_>) -> Result {
    if !args.is_proper_list() {
        return Err(Error::ImproperArguments(args.clone()));
    }
    let evaluated: Result<Vec<Expression>> = args.iter().map(|arg| eval(&arg, env)).collect();
    Ok(Expression::wrap_list(evaluated?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::ScopeTree;
    use crate::reader::read_str;
    use crate::types::{Arity, Callable, Symbol};
    use std::cell::Cell;
    use std::rc::Rc;

    fn run(source: &str, env: &mut Environment<'_>) -> Result {
        eval(&read_str(source).unwrap(), env)
    }

    fn bind(env: &mut Environment<'_>, name: &str, value: Expression) {
        env.bind(Symbol::new(name), value).unwrap();
    }

    fn returning_args(name: &str) -> Callable {
        Callable::new(name.into(), "".into(), Arity::at_least(0), |args, _| {
            Ok(args.clone())
        })
    }

    #[test]
    fn atoms_evaluate_to_themselves() {
        let mut tree = ScopeTree::new();
        let mut env = tree.root();
        for source in &["42", "-1.5", "\"text\""] {
            let expr = read_str(source).unwrap();
            assert_eq!(eval(&expr, &mut env).unwrap(), expr);
        }
    }

    #[test]
    fn symbols_resolve_through_the_environment() {
        let mut tree = ScopeTree::new();
        let mut env = tree.root();
        bind(&mut env, "answer", Expression::Integer(42));
        assert_eq!(run("answer", &mut env).unwrap(), Expression::Integer(42));
        match run("question", &mut env) {
            Err(Error::UnknownSymbol(UnknownSymbol(s))) => assert_eq!(s, Symbol::new("question")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn non_callable_heads_are_rejected() {
        let mut tree = ScopeTree::new();
        let mut env = tree.root();
        match run("(1 2 3)", &mut env) {
            Err(Error::NotCallable(head)) => assert_eq!(head, Expression::Integer(1)),
            other => panic!("unexpected {:?}", other),
        }
        bind(&mut env, "x", Expression::Integer(1));
        let err = run("(x)", &mut env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "error evaluating 'x', which is not a callable s-expression"
        );
    }

    #[test]
    fn functions_receive_evaluated_arguments() {
        let mut tree = ScopeTree::new();
        let mut env = tree.root();
        bind(&mut env, "list", Expression::function(returning_args("list")));
        bind(&mut env, "a", Expression::Integer(1));
        assert_eq!(
            run("(list a 2 (list a))", &mut env).unwrap(),
            read_str("(1 2 (1))").unwrap()
        );
    }

    #[test]
    fn specials_receive_raw_arguments() {
        let mut tree = ScopeTree::new();
        let mut env = tree.root();
        bind(&mut env, "quote", Expression::special(returning_args("quote")));
        assert_eq!(
            run("(quote undefined (also undefined))", &mut env).unwrap(),
            read_str("(undefined (also undefined))").unwrap()
        );
    }

    #[test]
    fn evaluation_order_differs_by_calling_convention() {
        let mut tree = ScopeTree::new();
        let mut env = tree.root();
        let ticks = Rc::new(Cell::new(0));
        let counter = ticks.clone();
        let tick = Callable::new("tick".into(), "".into(), Arity::exactly(0), move |_, _| {
            counter.set(counter.get() + 1);
            Ok(Expression::nil())
        });
        bind(&mut env, "tick", Expression::function(tick));
        bind(&mut env, "f", Expression::function(returning_args("f")));
        bind(&mut env, "s", Expression::special(returning_args("s")));

        run("(f (tick) (tick) (tick))", &mut env).unwrap();
        assert_eq!(ticks.get(), 3);
        run("(s (tick) (tick) (tick))", &mut env).unwrap();
        assert_eq!(ticks.get(), 3);
    }

    #[test]
    fn callable_heads_may_be_computed() {
        let mut tree = ScopeTree::new();
        let mut env = tree.root();
        let picker = Callable::new("pick".into(), "".into(), Arity::exactly(1), |args, env| {
            match args.nth(0) {
                Some(Expression::Symbol(s)) => Ok(env.find(&s)?),
                _ => Ok(Expression::nil()),
            }
        });
        bind(&mut env, "pick", Expression::special(picker));
        bind(&mut env, "id", Expression::function(returning_args("id")));
        assert_eq!(
            run("((pick id) 5)", &mut env).unwrap(),
            read_str("(5)").unwrap()
        );
    }

    #[test]
    fn arity_is_checked_before_the_body_runs() {
        let mut tree = ScopeTree::new();
        let mut env = tree.root();
        let strict = Callable::new("strict".into(), "".into(), Arity::exactly(1), |_, _| {
            panic!("body must not run")
        });
        bind(&mut env, "strict", Expression::function(strict));
        match run("(strict 1 2)", &mut env) {
            Err(Error::BadArgCount(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn improper_argument_lists_are_rejected() {
        let mut tree = ScopeTree::new();
        let mut env = tree.root();
        let improper = Expression::cons(Expression::Integer(1), Expression::Integer(2));
        match evaluate_arguments(&improper, &mut env) {
            Err(Error::ImproperArguments(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
