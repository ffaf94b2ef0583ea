//! Playstub CLI: Playwright command stand-in
//!
//! ## Usage
//!
//! ```bash
//! playstub install --with-deps chromium   # Skips the download
//! playstub eval "setMutedState(false)" \
//!     "() => window.__testState.recognitionStartCalls"
//! ```

use clap::Parser;
use playstub_cli::{handlers, logging, Cli, CliConfig, CliResult, Commands, Verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = CliConfig::new().with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose));
    logging::init(&config)?;

    match cli.command {
        Some(Commands::Install(args)) => println!("{}", handlers::run_install(&args)),
        Some(Commands::Eval(args)) => {
            for line in handlers::run_eval(&args)? {
                println!("{line}");
            }
        }
        Some(Commands::Other(argv)) => println!("{}", handlers::run_passthrough(&argv)),
        None => println!("{}", handlers::run_passthrough(&[])),
    }
    Ok(())
}
