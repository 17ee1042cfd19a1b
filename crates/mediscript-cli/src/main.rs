use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use mediscript_eval::{Interpreter, InterpreterOptions, Scope};
use mediscript_types::SourceFile;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod builtins;
mod error;
mod repl;

use error::CliError;

/// MediScript - a small scripting language with a clinical vocabulary
#[derive(Parser, Debug)]
#[command(name = "mediscript")]
#[command(about = "Run MediScript programs or start an interactive session", long_about = None)]
struct Args {
    /// Write tokens.json and ast.json after lexing and parsing
    #[arg(long)]
    dbg: bool,

    /// Directory the --dbg dumps are written to
    #[arg(long, default_value = ".")]
    dump_dir: PathBuf,

    /// Maximum number of nested function calls
    #[arg(long, default_value_t = InterpreterOptions::default().max_call_depth)]
    max_call_depth: usize,

    /// Program to run (starts the REPL if omitted)
    path: Option<PathBuf>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let options = InterpreterOptions {
        max_call_depth: args.max_call_depth,
    };

    match &args.path {
        Some(path) => run_file(path, &args, options),
        None => match repl::run(options) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_file(path: &Path, args: &Args, options: InterpreterOptions) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}: {}", path.display(), CliError::from(e));
            return ExitCode::FAILURE;
        }
    };
    let file = SourceFile::new(path.display().to_string(), source);

    match execute(&file, args, options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.render(&file));
            ExitCode::FAILURE
        }
    }
}

fn execute(file: &SourceFile, args: &Args, options: InterpreterOptions) -> Result<(), CliError> {
    debug!(path = %file.name, "running file");

    let tokens = mediscript_lexer::tokenize(&file.source)?;
    debug!(tokens = tokens.len(), "lexed");
    if args.dbg {
        dump(&args.dump_dir.join("tokens.json"), &tokens)?;
    }

    let program = mediscript_parser::parse(&tokens)?;
    debug!(statements = program.len(), "parsed");
    if args.dbg {
        dump(&args.dump_dir.join("ast.json"), &program)?;
    }

    let scope = Scope::new();
    builtins::install(&scope);
    Interpreter::with_options(options).run(&program, scope)?;
    debug!("finished");
    Ok(())
}

/// Write `value` as pretty JSON to `path`.
fn dump(path: &Path, value: &impl Serialize) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    info!(path = %path.display(), "wrote dump");
    Ok(())
}
