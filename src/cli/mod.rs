//! CLI module for MindFlow.
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing
//! - Version and usage display
//! - Terminal output of a streaming search
//!
//! # Usage
//!
//! ```ignore
//! use mindflow::cli::{parse_args, run_cli_command, CliCommand};
//!
//! let command = parse_args(std::env::args());
//! if let Some(result) = run_cli_command(command.clone()) {
//!     return result;
//! }
//! // CliCommand::Search, run the search
//! ```

pub mod args;
pub mod console;
pub mod version;

pub use args::{parse_args, CliCommand};
pub use console::{ConsoleListener, SearchOutcome};
pub use version::{handle_version_command, VERSION};

use color_eyre::eyre::eyre;
use color_eyre::Result;

/// Usage text printed for `--help`.
pub const USAGE: &str = "\
Usage: mindflow [--version|-V] [--help|-h] <query...>

Streams an AI answer for <query> from the MindFlow search backend.

Environment:
  MINDFLOW_ENV                development | staging | production
  MINDFLOW_BASE_URL           override the backend base URL
  MINDFLOW_LANGUAGE           Accept-Language sent with the search
  MINDFLOW_AUTH_TOKEN         bearer token sent as Authorization
  MINDFLOW_IDLE_TIMEOUT_SECS  give up after this many silent seconds
  RUST_LOG                    log filter (logs go to stderr)";

/// Run a CLI command if applicable.
///
/// # Returns
///
/// * `None` - If the command is `Search` (the caller runs the search)
/// * `Some(Ok(()))` - If a CLI command executed successfully
/// * `Some(Err(e))` - If the arguments were unusable
///
/// # Note
///
/// The `Version` command never returns as it calls `std::process::exit(0)`.
pub fn run_cli_command(command: CliCommand) -> Option<Result<()>> {
    match command {
        CliCommand::Version => {
            // This function never returns (calls exit)
            handle_version_command();
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Some(Ok(()))
        }
        CliCommand::MissingQuery => {
            eprintln!("{}", USAGE);
            Some(Err(eyre!("no search query given")))
        }
        CliCommand::Search(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_returns_none() {
        let result = run_cli_command(CliCommand::Search("rust".to_string()));
        assert!(result.is_none());
    }

    #[test]
    fn test_missing_query_is_an_error() {
        let result = run_cli_command(CliCommand::MissingQuery);
        assert!(matches!(result, Some(Err(_))));
    }
}
