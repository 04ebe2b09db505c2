use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::error::{Diagnostics, LoxError};
use rox::parser::Parser;
use rox::scanner::{scan_tokens, Scanner};
use rox::session::Session;
use rox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to a file
    #[arg(long, global = true)]
    log: bool,

    /// File the log is written to when --log is given
    #[arg(long, global = true, default_value = "app.log")]
    log_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: PathBuf },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs input from a file as a Lox program
    Run { filename: PathBuf },

    /// Reads and runs one line at a time
    Repl,
}

/// Static errors exit with 65, runtime errors with 70.
const EXIT_STATIC: i32 = 65;
const EXIT_RUNTIME: i32 = 70;

/// Reads a whole source file as UTF-8.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .with_context(|| format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf)
        .map_err(LoxError::from)
        .with_context(|| format!("File {:?} is not valid UTF-8", filename))
}

fn init_logger(path: &Path) -> Result<()> {
    let log_file =
        File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;

    Builder::new()
        .format(|buf, record| {
            let module_path = record.module_path().unwrap_or("<unnamed>");
            let module = module_path.strip_prefix("rox::").unwrap_or(module_path);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to {:?}", path);
    Ok(())
}

/// Prints every diagnostic to stderr and picks the exit code they call for.
fn report(diagnostics: &Diagnostics) -> Option<i32> {
    for e in diagnostics {
        debug!("Diagnostic on line {:?}: {}", e.line(), e.message());
        eprintln!("{}", e);
    }

    if diagnostics.had_runtime_error() {
        Some(EXIT_RUNTIME)
    } else if diagnostics.has_errors() {
        Some(EXIT_STATIC)
    } else {
        None
    }
}

fn tokenize(source: &str, json: bool) -> Result<Option<i32>> {
    let mut tokens: Vec<Token<'_>> = Vec::new();
    let mut tokenized = true;

    for token in Scanner::new(source) {
        match token {
            Ok(token) => {
                debug!("Scanned token: {}", token);

                if !json {
                    println!("{}", token);
                }
                tokens.push(token);
            }

            Err(e) => {
                tokenized = false;
                debug!("Tokenization debug: {}", e);
                eprintln!("{}", e);
            }
        }
    }

    if json {
        let text = serde_json::to_string_pretty(&tokens).context("Failed to encode tokens")?;
        println!("{}", text);
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code {}", EXIT_STATIC);
        return Ok(Some(EXIT_STATIC));
    }

    info!("Tokenization completed successfully");
    Ok(None)
}

fn parse(source: &str) -> Option<i32> {
    let mut diagnostics = Diagnostics::new();
    let tokens = scan_tokens(source, &mut diagnostics);
    let expr = Parser::new(&tokens).parse_expression(&mut diagnostics);

    if let Some(code) = report(&diagnostics) {
        return Some(code);
    }

    if let Some(expr) = expr {
        let ast_str = AstPrinter.print(&expr);
        debug!("AST: {}", ast_str);
        println!("{}", ast_str);
    }

    None
}

fn evaluate(source: &str) -> Option<i32> {
    let mut session = Session::new();
    let (value, diagnostics) = session.evaluate(source);

    if let Some(code) = report(&diagnostics) {
        return Some(code);
    }

    if let Some(value) = value {
        debug!("Evaluated to: {}", value);
        println!("{}", value);
    }

    None
}

fn repl() -> Result<()> {
    let mut session = Session::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        line.clear();
        let read = lines
            .read_line(&mut line)
            .context("Failed to read from stdin")?;

        if read == 0 {
            println!();
            break;
        }

        debug!("REPL input: {:?}", line);

        // Errors are shown but never end the session.
        report(&session.run(&line));
    }

    info!("REPL finished");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger(&args.log_file)?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        Builder::new().filter_level(log::LevelFilter::Off).init();
    }

    info!("CLI arguments: {:?}", args);

    let exit_code: Option<i32> = match args.commands {
        Commands::Tokenize { filename, json } => {
            info!("Running Tokenize subcommand");
            tokenize(&read_file(&filename)?, json)?
        }

        Commands::Parse { filename } => {
            info!("Running Parse subcommand");
            parse(&read_file(&filename)?)
        }

        Commands::Evaluate { filename } => {
            info!("Running Evaluate subcommand");
            evaluate(&read_file(&filename)?)
        }

        Commands::Run { filename } => {
            info!("Running Run subcommand");
            let source = read_file(&filename)?;
            debug!("Provided input:\n{}", source);

            report(&Session::new().run(&source))
        }

        Commands::Repl => {
            info!("Running Repl subcommand");
            repl()?;
            None
        }
    };

    if let Some(code) = exit_code {
        debug!("Exiting with code {}", code);
        process::exit(code);
    }

    Ok(())
}
