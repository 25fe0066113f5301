use clap::{Arg, ArgAction, Command as ClapCommand};
use std::fs;

use mint::error::{Diagnostic, MintError};
use mint::lexer::Lexer;
use mint::services::Services;

fn main() {
    mint::init_tracing();

    let matches = ClapCommand::new("mint")
        .version("0.1.0")
        .about("Mint scripting language interpreter")
        .arg(
            Arg::new("input")
                .help("Input .mint file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Seed for random(); defaults to the clock")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("tokens")
                .long("tokens")
                .help("Print the token stream and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("error-format")
                .long("error-format")
                .help("How errors are reported on stderr")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .get_matches();

    let json_errors = matches
        .get_one::<String>("error-format")
        .is_some_and(|format| format == "json");

    if let Err(err) = run(&matches) {
        report(&err, json_errors);
        std::process::exit(err.exit_code());
    }
}

fn run(matches: &clap::ArgMatches) -> Result<(), MintError> {
    // `input` is required, clap rejects the command line without it
    let input_file = matches
        .get_one::<String>("input")
        .ok_or_else(|| mint::error::InternalError("missing input argument".to_string()))?;
    let source = fs::read_to_string(input_file)?;

    if matches.get_flag("tokens") {
        for token in Lexer::new(&source).tokenize() {
            println!("{}", token);
        }
        return Ok(());
    }

    let seed = matches.get_one::<u64>("seed").copied();
    mint::run_source(&source, Services::stdio(seed))?;
    Ok(())
}

fn report(err: &MintError, json: bool) {
    if json {
        match serde_json::to_string(&Diagnostic::from(err)) {
            Ok(text) => eprintln!("{}", text),
            Err(_) => eprintln!("{}", err),
        }
    } else {
        eprintln!("{}", err);
    }
}
