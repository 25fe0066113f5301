pub mod ast;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod services;
pub mod types;
pub mod value;

use std::sync::Once;

use ast::Command;
use environment::Environment;
use error::MintResult;
use interpreter::Interpreter;
use lexer::Lexer;
use parser::Parser;
use services::Services;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Only installs a subscriber when `RUST_LOG` is set, e.g.
/// `RUST_LOG=mint=debug mint program.mint`. Logs go to stderr and never mix
/// with program output.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

/// Scans and parses `source`, returning the program and the scope chain
/// built while parsing.
pub fn parse_program(source: &str) -> MintResult<(Command, Environment)> {
    let tokens = Lexer::new(source).tokenize();
    let mut parser = Parser::new(tokens);
    let program = parser.parse()?;
    Ok((program, parser.into_environment()))
}

/// Parses and runs `source` against `services`, handing the services back
/// so captured output can be inspected.
pub fn run_source(source: &str, services: Services) -> MintResult<Services> {
    let (program, environment) = parse_program(source)?;
    let mut interpreter = Interpreter::new(environment, services);
    interpreter.run(&program)?;
    Ok(interpreter.into_services())
}

/// Runs `source` with queued input lines and a fixed random seed, returning
/// everything it printed.
pub fn run_with_input<I, S>(source: &str, input: I, seed: u64) -> MintResult<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let services = run_source(source, Services::buffered(input, seed))?;
    Ok(services.output.output().to_string())
}
