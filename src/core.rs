use crate::arithmetic::{self, Number};
use crate::environment::{Environment, LockedSymbol};
use crate::evaluator::{self, eval, Error};
use crate::table::Table;
use crate::types::{
    Arity, BadArgType, Callable, Expression, Int, PrimitiveFn, Symbol, TypeMismatch, FALSE, NIL,
    TRUE,
};
use itertools::Itertools;
use std::rc::Rc;

fn bad_arg(name: &str, index: usize, expected: TypeMismatch, got: Option<&Expression>) -> Error {
    Error::BadArgType(BadArgType {
        name: name.to_string(),
        index,
        expected,
        got: got.map_or("nothing", Expression::type_name),
    })
}

fn grab_numbers(args: &Expression, name: &str) -> evaluator::Result<Vec<Number>> {
    args.iter()
        .enumerate()
        .map(|(index, arg)| {
            Number::from_expression(&arg)
                .ok_or_else(|| bad_arg(name, index, TypeMismatch::NotANumber, Some(&arg)))
        })
        .collect()
}

fn function_arg(args: &Expression, index: usize, name: &str) -> evaluator::Result<Rc<Callable>> {
    match args.nth(index) {
        Some(Expression::Function(f)) => Ok(f),
        other => Err(bad_arg(name, index, TypeMismatch::NotAFunction, other.as_ref())),
    }
}

fn string_arg(args: &Expression, index: usize, name: &str) -> evaluator::Result<Rc<str>> {
    match args.nth(index) {
        Some(Expression::String(s)) => Ok(s),
        other => Err(bad_arg(name, index, TypeMismatch::NotAString, other.as_ref())),
    }
}

// Folds left to right. Seeded folds start from their first argument and only
// fall back to the identity when called with no arguments.
fn fold_numbers(
    args: &Expression,
    name: &str,
    identity: Int,
    seeded: bool,
    op: fn(Number, Number) -> arithmetic::Result,
) -> evaluator::Result {
    let mut numbers = grab_numbers(args, name)?.into_iter();
    let seed = match seeded {
        true => numbers.next(),
        false => None,
    }
    .unwrap_or(Number::Integer(identity));
    let total = numbers.try_fold(seed, op)?;
    Ok(total.into())
}

macro_rules! arithmetic_primitive {
    ($SYMBOL:tt, $NAME:ident, $IDENTITY:expr, $SEEDED:expr, $DESCRIPTION:expr) => {
        paste::item! {
            const $NAME: PrimitiveFn = PrimitiveFn {
                name: stringify!($SYMBOL),
                description: $DESCRIPTION,
                arity: Arity::at_least(0),
                fn_ptr: |args, _env| {
                    fold_numbers(
                        args,
                        stringify!($SYMBOL),
                        $IDENTITY,
                        $SEEDED,
                        arithmetic::[<$NAME:lower>],
                    )
                },
            };
        }
    };
}

arithmetic_primitive!(+, ADD, 0, false, "Adds its arguments; (+) is 0");
arithmetic_primitive!(-, SUBTRACT, 0, true, "Subtracts the remaining arguments from the first");
arithmetic_primitive!(*, MULTIPLY, 1, false, "Multiplies its arguments; (*) is 1");
arithmetic_primitive!(/, DIVIDE, 1, true, "Divides the first argument by the remaining ones");
arithmetic_primitive!(^, POWER, 1, true, "Raises the first argument to each of the remaining ones");

const PRINT: PrimitiveFn = PrimitiveFn {
    name: "print",
    description: "Writes its arguments to standard output",
    arity: Arity::at_least(0),
    fn_ptr: print_,
};

fn print_(args: &Expression, _env: &mut Environment<'_>) -> evaluator::Result {
    println!("{}", args.iter().join(" "));
    Ok(Expression::nil())
}

const COMPOSE: PrimitiveFn = PrimitiveFn {
    name: ".",
    description: "Composes two functions: ((. f g) x) is (f (g x))",
    arity: Arity::exactly(2),
    fn_ptr: compose_,
};

fn compose_(args: &Expression, _env: &mut Environment<'_>) -> evaluator::Result {
    let f = function_arg(args, 0, COMPOSE.name)?;
    let g = function_arg(args, 1, COMPOSE.name)?;
    let name = format!("{}∘{}", f.name, g.name);
    let description = format!("Composition of {} after {}", f.name, g.name);
    let arity = g.arity.clone();
    let composed = Callable::new(name, description, arity, move |args, env| {
        let intermediate = g.apply(args, env)?;
        f.apply(&Expression::wrap_list(vec![intermediate]), env)
    });
    Ok(Expression::function(composed))
}

const READ_CSV: PrimitiveFn = PrimitiveFn {
    name: "read_csv",
    description: "Loads a CSV file, whose first row names the columns, into a table",
    arity: Arity::exactly(1),
    fn_ptr: read_csv_,
};

fn read_csv_(args: &Expression, _env: &mut Environment<'_>) -> evaluator::Result {
    let path = string_arg(args, 0, READ_CSV.name)?;
    Ok(Expression::host(Table::from_csv_file(&*path)?))
}

const LET: PrimitiveFn = PrimitiveFn {
    name: "let",
    description: "(let NAME EXPR) binds NAME to the value of EXPR in the current scope",
    arity: Arity::exactly(2),
    fn_ptr: let_,
};

fn let_(args: &Expression, env: &mut Environment<'_>) -> evaluator::Result {
    let symbol = match args.nth(0) {
        Some(Expression::Symbol(s)) => s,
        other => return Err(bad_arg(LET.name, 0, TypeMismatch::NotASymbol, other.as_ref())),
    };
    let value = eval(&args.nth(1).unwrap_or_else(Expression::nil), env)?;
    log::debug!("let {} be {}", symbol, value);
    env.bind(symbol, value)?;
    Ok(Expression::nil())
}

const BASIC: &[PrimitiveFn] = &[COMPOSE, PRINT];
const ARITHMETIC: &[PrimitiveFn] = &[ADD, SUBTRACT, MULTIPLY, DIVIDE, POWER];
const TABLES: &[PrimitiveFn] = &[READ_CSV];
const SPECIALS: &[PrimitiveFn] = &[LET];

fn install(
    env: &mut Environment<'_>,
    primitives: &'static [PrimitiveFn],
    wrap: fn(Callable) -> Expression,
) -> Result<(), LockedSymbol> {
    for primitive in primitives {
        env.bind_global(Symbol::new(primitive.name), wrap(primitive.into()))?
            .lock();
    }
    Ok(())
}

/// Installs and locks every built-in name in the origin scope of `env`.
pub fn load_all(env: &mut Environment<'_>) -> Result<(), LockedSymbol> {
    log::debug!("Loading all system primitives");
    load_default_symbols(env)?;
    load_basic_functions(env)?;
    load_arithmetic_functions(env)?;
    load_table_functions(env)?;
    load_special_operations(env)
}

pub fn load_default_symbols(env: &mut Environment<'_>) -> Result<(), LockedSymbol> {
    log::debug!("Loading default symbols: {}, {} and {}", NIL, FALSE, TRUE);
    for name in [NIL, FALSE, TRUE].iter() {
        let symbol = Symbol::new(name);
        env.bind_global(symbol.clone(), Expression::Symbol(symbol))?
            .lock();
    }
    Ok(())
}

pub fn load_basic_functions(env: &mut Environment<'_>) -> Result<(), LockedSymbol> {
    log::debug!("Loading basic functions");
    install(env, BASIC, Expression::function)
}

pub fn load_arithmetic_functions(env: &mut Environment<'_>) -> Result<(), LockedSymbol> {
    log::debug!("Loading arithmetic functions");
    install(env, ARITHMETIC, Expression::function)
}

pub fn load_table_functions(env: &mut Environment<'_>) -> Result<(), LockedSymbol> {
    log::debug!("Loading table functions");
    install(env, TABLES, Expression::function)
}

pub fn load_special_operations(env: &mut Environment<'_>) -> Result<(), LockedSymbol> {
    log::debug!("Loading special operations");
    install(env, SPECIALS, Expression::special)
}
