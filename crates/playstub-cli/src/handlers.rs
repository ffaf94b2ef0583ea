//! Command handlers.
//!
//! Each handler returns the lines to print so the binary stays a thin shell
//! and the behaviour is testable without spawning a process.

use crate::commands::{EvalArgs, InstallArgs};
use crate::error::{CliError, CliResult};
use playstub::{EvalValue, LoadState, Page};
use tracing::{debug, info};

const NO_ARGUMENTS: &str = "<no arguments>";

fn format_args(args: &[String]) -> String {
    if args.is_empty() {
        NO_ARGUMENTS.to_string()
    } else {
        args.join(" ")
    }
}

/// `playstub install ...`: no browsers are ever downloaded
#[must_use]
pub fn run_install(args: &InstallArgs) -> String {
    info!(args = ?args.args, "skipping browser installation");
    format!(
        "Playwright stub: skipping browser installation for arguments: {}",
        format_args(&args.args)
    )
}

/// Any other invocation, including none at all
#[must_use]
pub fn run_passthrough(argv: &[String]) -> String {
    format!(
        "Playwright stub: no CLI actions required for arguments: {}",
        format_args(argv)
    )
}

/// `playstub eval`: run every snippet on one page, one JSON line each
pub fn run_eval(args: &EvalArgs) -> CliResult<Vec<String>> {
    let mut page = Page::new();
    if let Some(url) = &args.url {
        page.goto(url, LoadState::Load)?;
    }

    let mut lines = Vec::with_capacity(args.snippets.len());
    for snippet in &args.snippets {
        let value = page
            .evaluate(snippet)
            .map_err(|source| CliError::evaluation(snippet.as_str(), source))?;
        debug!(snippet = %snippet, result = %value, "evaluated");
        lines.push(render_value(&value)?);
    }
    Ok(lines)
}

/// `undefined` for no value, compact JSON otherwise
pub fn render_value(value: &EvalValue) -> CliResult<String> {
    if value.is_undefined() {
        return Ok(String::from("undefined"));
    }
    let json = value.to_json()?;
    Ok(json.to_string())
}
