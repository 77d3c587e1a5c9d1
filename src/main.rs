//! Brace Template CLI
//!
//! Usage:
//!   brace-template [OPTIONS] compile <TEMPLATE>
//!   brace-template [OPTIONS] rewrite [FILE]
//!
//! Options:
//!   -c, --config <FILE>  Configuration file (TOML format)
//!   -v, --verbose        Log each compiled node
//!   -h, --help           Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use brace_template::host::HostFactory;
use brace_template::{build_template, compile_with, rewrite_source_with_config, Config, Error};

#[derive(Parser)]
#[command(name = "brace-template")]
#[command(about = "Compile string templates into concatenation expressions")]
struct Cli {
    /// Configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log each compiled node
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile one template and print the resulting expression
    Compile {
        /// Template text, without surrounding quotes
        template: String,
    },
    /// Rewrite annotated elements of a host source file
    ///
    /// Rewriting is not idempotent across runs: a string literal produced by
    /// a placeholder (e.g. `{"{x}"}`) is printed as an ordinary literal, and
    /// rewriting the printed output again compiles it as a template. Run
    /// `rewrite` and `rewrite --check` on original sources only.
    Rewrite {
        /// Input file (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Exit with status 1 if any diagnostic was reported (original sources only)
        #[arg(long)]
        check: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config
    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Command::Compile { template } => match compile_with(&template, &config.template) {
            Ok(expr) => println!("{}", build_template(&expr, &mut HostFactory::new(0..0))),
            Err(e) => {
                eprint!("{}", e.format(&template, "template"));
                std::process::exit(1);
            }
        },
        Command::Rewrite { input, check } => {
            let (source, filename) = read_input(input.as_ref());
            match rewrite_source_with_config(&source, &config) {
                Ok(output) => {
                    for diagnostic in &output.diagnostics {
                        eprint!("{}", diagnostic.format(&source, &filename));
                    }
                    print!("{}", output.source());
                    if check && !output.diagnostics.is_empty() {
                        std::process::exit(1);
                    }
                }
                Err(Error::Parse(errors)) => {
                    for e in &errors {
                        eprint!("{}", e.format(&source, &filename));
                    }
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn read_input(input: Option<&PathBuf>) -> (String, String) {
    match input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
