//! CLI command definitions using clap

use clap::{Parser, Subcommand};

/// Playstub: stands in for the `playwright` command where no browser exists
#[derive(Parser, Debug)]
#[command(name = "playstub")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (log errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run; none is accepted and reported
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pretend to install browsers
    Install(InstallArgs),

    /// Evaluate snippets against a fresh stub page
    Eval(EvalArgs),

    /// Any other playwright command is accepted and ignored
    #[command(external_subcommand)]
    Other(Vec<String>),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Arguments a real install would take (e.g. `--with-deps chromium`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for the eval command
#[derive(Parser, Debug)]
pub struct EvalArgs {
    /// Navigate here before evaluating
    #[arg(long)]
    pub url: Option<String>,

    /// Snippets, evaluated in order on the same page
    #[arg(required = true)]
    pub snippets: Vec<String>,
}
