use std::path::PathBuf;
use std::process;

use clap::Parser;

mod repl;

/// Interpreter for the Monkey programming language
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// Script to evaluate; starts an interactive session when omitted
    #[clap(value_parser)]
    file: Option<PathBuf>,

    /// Prompt shown before each line in the interactive session
    #[clap(long, value_parser, default_value = ">> ")]
    prompt: String,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        let filter = EnvFilter::from_default_env();
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(filter)
            .init();
    }
}

fn main() {
    init_tracing();

    let args = Args::parse();

    match args.file {
        Some(path) => {
            let source = match std::fs::read_to_string(&path) {
                Ok(source) => source,
                Err(err) => {
                    eprintln!("could not read {}: {}", path.display(), err);
                    process::exit(1);
                }
            };

            if !repl::run_script(&source) {
                process::exit(1);
            }
        }
        None => repl::repl(&args.prompt),
    }
}
