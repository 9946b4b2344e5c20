//! Command-line argument parsing for the MindFlow CLI.
//!
//! This module handles parsing command-line arguments and determining
//! which CLI command to execute.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Run a streaming search for the joined positional arguments
    Search(String),
    /// No query was given
    MissingQuery,
}

/// Parse command-line arguments and return the appropriate command.
///
/// Flags win over positional arguments; everything else is joined with
/// single spaces into the query.
///
/// # Examples
///
/// ```
/// use mindflow::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["mindflow".to_string(), "what".to_string(), "is".to_string(), "sse".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Search("what is sse".to_string()));
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut words = Vec::new();
    // Skip the program name
    for arg in args.skip(1) {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            _ => words.push(arg),
        }
    }

    let query = words.join(" ");
    if query.trim().is_empty() {
        CliCommand::MissingQuery
    } else {
        CliCommand::Search(query)
    }
}
