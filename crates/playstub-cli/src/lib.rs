//! Playstub CLI Library
//!
//! Command-line front end for playstub. CI calls it in place of the real
//! `playwright` command, so browser installation and other tooling commands
//! succeed without touching the network.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;

pub use commands::{Cli, Commands, EvalArgs, InstallArgs};
pub use config::{CliConfig, Verbosity};
pub use error::{CliError, CliResult};
