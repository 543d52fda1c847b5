//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::error::Error as _;
use std::process::ExitCode;

use covend_cli::CliError;

fn main() -> ExitCode {
    match covend_cli::run() {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("covend: {err}");
            let mut cause = err.source();
            while let Some(inner) = cause {
                eprintln!("  caused by: {inner}");
                cause = inner.source();
            }
            ExitCode::FAILURE
        }
    }
}
