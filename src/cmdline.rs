use crate::interpreter::{self, Interpreter};
use crate::types::Expression;
use ansi_term::Colour;
use linefeed::{DefaultTerminal, Interface, ReadResult, Signal, Terminal};
use std::fmt;
use std::io;
use std::path::PathBuf;

const PROMPT: &str = "> ";
const CONTINUATION_PROMPT: &str = "# ";
const VALUE_MARK: &str = ">>>>>";
const ERROR_MARK: &str = "~~~~~";

const EXIT_CMD: &str = ":exit";
const HELP_CMD: &str = ":help";
const INFO_CMD: &str = ":info";
const VERSION_CMD: &str = ":version";

const DEFAULT_VERBOSITY: &str = "error";
const VERBOSITY_LEVELS: &[(&str, &str)] = &[
    ("error", "error"),
    ("warning", "warn"),
    ("info", "info"),
    ("debug", "debug"),
];

const USAGE: &str = "usage: csvi [-h] [--version] [-v {error,warning,info,debug}] [SCRIPT]

Inspect csv files using a lisp like language.

positional arguments:
  SCRIPT                script file to execute; starts the REPL if omitted

optional arguments:
  -h, --help            show this help message and exit
  --version             show the program's version number and exit
  -v, --verbosity LEVEL logging level (default: error, or RUST_LOG when set)";

const BANNER: &str = "Welcome to the csv-inspector Read-Eval-Print-Loop.
Inspect csv files effortlessly

Tips:
\t* the REPL waits for parentheses to balance or an empty line
\t* type :exit to exit the REPL
\t* type :info to get information of any expression
";

const HELP: &str = "This interpreter uses a lisp like syntax, some expressions you
can play with to get used to it are:
\t* Arithmetic operations:
\t  (+ 3 5), (* 5 -9), (/ 2 5.0), ...
\t* Bind values to names:
\t  (let a 3) (let b 5) (+ a b)
\t* Load a table:
\t  (let t (read_csv \"people.csv\"))

Additionally the REPL supports the following special instructions:
\t* :exit: exit the REPL
\t* :info: prints information of any expression
\t* :help: prints this message
\t* :version: prints the system version";

#[derive(Debug)]
pub enum Error {
    Usage(String),
    Logging(log::SetLoggerError),
    Io(io::Error),
    Interpreter(interpreter::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Usage(msg) => write!(f, "{}\n\n{}", msg, USAGE),
            Error::Logging(e) => write!(f, "could not set up logging: {}", e),
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Interpreter(e) => write!(f, "{}", e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<interpreter::Error> for Error {
    fn from(e: interpreter::Error) -> Self {
        Self::Interpreter(e)
    }
}

#[derive(Debug, PartialEq)]
pub enum Mode {
    Repl,
    Script(PathBuf),
    Version,
    Usage,
}

#[derive(Debug, PartialEq)]
pub struct Options {
    /// A filter understood by the logger, already translated from the
    /// command line level name.
    pub verbosity: Option<String>,
    pub mode: Mode,
}

/// Parses the arguments that follow the program name.
pub fn parse_options(args: &[String]) -> Result<Options, Error> {
    let mut verbosity = None;
    let mut script = None;
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Ok(Options {
                    verbosity,
                    mode: Mode::Usage,
                })
            }
            "--version" => {
                return Ok(Options {
                    verbosity,
                    mode: Mode::Version,
                })
            }
            "-v" | "--verbosity" => {
                let level = args
                    .next()
                    .ok_or_else(|| Error::Usage(format!("{} expects a level", arg)))?;
                verbosity = Some(verbosity_filter(level)?.to_string());
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(Error::Usage(format!("unrecognised option {}", flag)))
            }
            path => match script {
                None => script = Some(PathBuf::from(path)),
                Some(_) => return Err(Error::Usage(format!("unexpected argument {}", path))),
            },
        }
    }
    let mode = match script {
        Some(path) => Mode::Script(path),
        None => Mode::Repl,
    };
    Ok(Options { verbosity, mode })
}

fn verbosity_filter(level: &str) -> Result<&'static str, Error> {
    VERBOSITY_LEVELS
        .iter()
        .find(|(name, _)| *name == level)
        .map(|(_, filter)| *filter)
        .ok_or_else(|| Error::Usage(format!("invalid verbosity level {}", level)))
}

pub fn init_logging(verbosity: Option<&str>) -> Result<(), Error> {
    let filters = match verbosity {
        Some(filter) => filter.to_string(),
        None => std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_VERBOSITY.to_string()),
    };
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .try_init()
        .map_err(Error::Logging)
}

pub fn version() -> String {
    format!("csvi {}", env!("CARGO_PKG_VERSION"))
}

pub fn launch(args: Vec<String>) -> Result<(), Error> {
    let options = parse_options(args.get(1..).unwrap_or(&[]))?;
    init_logging(options.verbosity.as_deref())?;
    match options.mode {
        Mode::Usage => println!("{}", USAGE),
        Mode::Version => println!("{}", version()),
        Mode::Script(path) => {
            let mut interpreter = Interpreter::new()?;
            interpreter.run_file(&path)?;
        }
        Mode::Repl => {
            let mut interpreter = Interpreter::new()?;
            let interface = setup()?;
            writeln!(interface, "{}", BANNER)?;
            repl(&interface, &mut interpreter)?;
            save_history(&interface)?;
        }
    }
    Ok(())
}

pub fn setup() -> io::Result<Interface<DefaultTerminal>> {
    let interface = linefeed::Interface::new("csvi")?;
    interface.set_report_signal(Signal::Interrupt, true);
    if let Some(path) = history_path() {
        interface.load_history(path).ok();
    };
    Ok(interface)
}

fn history_path() -> Option<PathBuf> {
    match dirs::data_dir() {
        Some(mut path) => {
            path.push(".csvi_history");
            Some(path)
        }
        None => None,
    }
}

pub fn save_history<T: Terminal>(interface: &Interface<T>) -> io::Result<()> {
    match history_path() {
        Some(path) => interface.save_history(path),
        None => Ok(()),
    }
}

#[derive(Debug, PartialEq)]
pub enum Command<'a> {
    Exit,
    Help,
    Version,
    Info(&'a str),
    Evaluate(&'a str),
}

pub fn parse_command(input: &str) -> Command<'_> {
    match input {
        EXIT_CMD => Command::Exit,
        HELP_CMD => Command::Help,
        VERSION_CMD => Command::Version,
        _ if input.starts_with(INFO_CMD) => Command::Info(&input[INFO_CMD.len()..]),
        _ => Command::Evaluate(input),
    }
}

/// Opening minus closing parentheses. String literals are not special.
pub fn parentheses_balance(text: &str) -> isize {
    text.chars().fold(0, |balance, c| match c {
        '(' => balance + 1,
        ')' => balance - 1,
        _ => balance,
    })
}

struct Painter {
    colour: bool,
}

impl Painter {
    fn detect() -> Self {
        Self {
            colour: atty::is(atty::Stream::Stdout),
        }
    }

    fn paint(&self, colour: Colour, text: String) -> String {
        match self.colour {
            true => colour.paint(text).to_string(),
            false => text,
        }
    }

    fn value(&self, value: &Expression) -> String {
        self.paint(Colour::Green, format!("{} {}", VALUE_MARK, value))
    }

    fn error(&self, error: &interpreter::Error) -> String {
        self.paint(Colour::Red, format!("{} {}", ERROR_MARK, error))
    }
}

// None when the user ended the session.
fn read_line<T: Terminal>(interface: &Interface<T>) -> io::Result<Option<String>> {
    match interface.read_line()? {
        ReadResult::Input(line) => Ok(Some(line)),
        ReadResult::Eof => {
            log::info!("EOF found, leaving the REPL");
            Ok(None)
        }
        ReadResult::Signal(sig) => {
            log::info!("Received signal {:?}, leaving the REPL", sig);
            Ok(None)
        }
    }
}

/// Accumulates lines until the parentheses balance or an empty line is entered.
fn read_input<T: Terminal>(interface: &Interface<T>) -> io::Result<Option<String>> {
    interface.set_prompt(PROMPT)?;
    let mut line = match read_line(interface)? {
        Some(line) => line,
        None => return Ok(None),
    };
    let mut balance = parentheses_balance(&line);
    let mut buffer = line.clone();

    interface.set_prompt(CONTINUATION_PROMPT)?;
    while !line.is_empty() && balance != 0 {
        line = match read_line(interface)? {
            Some(line) => line,
            None => return Ok(None),
        };
        buffer.push('\n');
        buffer.push_str(&line);
        balance += parentheses_balance(&line);
    }
    Ok(Some(buffer.trim().to_string()))
}

pub fn repl<T: Terminal>(interface: &Interface<T>, interpreter: &mut Interpreter) -> io::Result<()> {
    let painter = Painter::detect();
    while let Some(input) = read_input(interface)? {
        if !input.is_empty() {
            interface.add_history_unique(input.clone());
        }
        match parse_command(&input) {
            Command::Exit => break,
            Command::Help => writeln!(interface, "{}", HELP)?,
            Command::Version => writeln!(interface, "{}", version())?,
            Command::Info(text) => match interpreter.process(text) {
                Ok(value) => writeln!(interface, "{}", value.info())?,
                Err(e) => writeln!(interface, "{}", painter.error(&e))?,
            },
            Command::Evaluate(text) => match interpreter.process(text) {
                Ok(value) if value.is_nil() => {}
                Ok(value) => writeln!(interface, "{}", painter.value(&value))?,
                Err(e) => writeln!(interface, "{}", painter.error(&e))?,
            },
        }
    }
    writeln!(interface, "Exiting... Bye!")
}
