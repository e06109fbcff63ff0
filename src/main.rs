// minic: lexer and parser driver for a small C subset

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser as _, ValueEnum};
use crossterm::style::{Color, Stylize};
use crossterm::tty::IsTty;
use thiserror::Error;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use minic::parser::{Lexer, Parser, Scanner, SourceError, TokenClass};

const FILE_NOT_FOUND: u8 = 2;
const LEXER_FAIL: u8 = 250;
const PARSER_FAIL: u8 = 245;

/// Lex or parse a C source file and report every error found.
#[derive(Debug, clap::Parser)]
#[command(name = "minic", version, about)]
struct Cli {
    /// What to run
    #[arg(value_enum)]
    mode: Mode,

    /// Source file
    input: PathBuf,

    /// Write the AST here instead of stdout (ast mode only)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// When to colour the report
    #[arg(long, value_enum, value_name = "WHEN", default_value_t = ColorWhen::Auto)]
    color: ColorWhen,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Print the token stream
    Lexer,
    /// Check the syntax
    Parser,
    /// Check the syntax and print the tree
    Ast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorWhen {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Error)]
enum DriverError {
    #[error("cannot open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),
}

/// Report writer with optional colour
struct Console<W> {
    out: W,
    color: bool,
}

impl<W: Write> Console<W> {
    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn diagnostic(&mut self, kind: &str, error: &dyn fmt::Display) -> io::Result<()> {
        let prefix = self.paint(&format!("{kind} error:"), Color::Red);
        writeln!(self.out, "{prefix} {error}")
    }

    /// `Lexing: pass` or `Lexing: failed (3 errors)`
    fn summary(&mut self, phase: &str, errors: usize) -> io::Result<()> {
        let verdict = if errors == 0 {
            self.paint("pass", Color::Green)
        } else {
            self.paint(&format!("failed ({errors} errors)"), Color::Red)
        };
        writeln!(self.out, "{phase}: {verdict}")
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "minic=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            error!(%err, "aborting");
            eprintln!("minic: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, DriverError> {
    if !cli.input.exists() {
        println!("File {} does not exist.", cli.input.display());
        return Ok(ExitCode::from(FILE_NOT_FOUND));
    }

    let scanner = Scanner::open(&cli.input).map_err(|source| DriverError::Open {
        path: cli.input.clone(),
        source,
    })?;
    let lexer = Lexer::new(scanner);

    let stdout = io::stdout();
    let color = match cli.color {
        ColorWhen::Always => true,
        ColorWhen::Never => false,
        ColorWhen::Auto => stdout.is_tty(),
    };
    let mut console = Console {
        out: stdout.lock(),
        color,
    };

    debug!(mode = ?cli.mode, input = %cli.input.display(), "starting");

    match cli.mode {
        Mode::Lexer => lex(lexer, &mut console),
        Mode::Parser => parse(lexer, &mut console, None),
        Mode::Ast => parse(lexer, &mut console, Some(cli.output.as_deref())),
    }
}

fn lex<R: BufRead, W: Write>(
    mut lexer: Lexer<R>,
    console: &mut Console<W>,
) -> Result<ExitCode, DriverError> {
    loop {
        let token = lexer.next_token();
        if token.is(TokenClass::Eof) {
            break;
        }
        writeln!(console.out, "{token}")?;
    }

    let errors = lexer.finish()?;
    for err in &errors {
        console.diagnostic("Lexing", err)?;
    }
    console.summary("Lexing", errors.len())?;

    Ok(exit_code(errors.len(), LEXER_FAIL))
}

/// Parse, report, and in ast mode print the tree to `ast_output` (stdout
/// when the inner option is empty).
fn parse<R: BufRead, W: Write>(
    lexer: Lexer<R>,
    console: &mut Console<W>,
    ast_output: Option<Option<&Path>>,
) -> Result<ExitCode, DriverError> {
    let output = Parser::new(lexer).parse()?;

    for err in &output.lex_errors {
        console.diagnostic("Lexing", err)?;
    }
    for err in &output.errors {
        console.diagnostic("Parsing", err)?;
    }
    console.summary("Parsing", output.error_count())?;

    if !output.is_ok() {
        return Ok(ExitCode::from(PARSER_FAIL));
    }

    match ast_output {
        None => {}
        Some(None) => {
            writeln!(console.out, "Printing out AST:")?;
            writeln!(console.out, "{}", output.program)?;
        }
        Some(Some(path)) => {
            writeln!(console.out, "Printing out AST:")?;
            let mut file = BufWriter::new(File::create(path)?);
            writeln!(file, "{}", output.program)?;
            file.flush()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn exit_code(errors: usize, failure: u8) -> ExitCode {
    if errors == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(failure)
    }
}
