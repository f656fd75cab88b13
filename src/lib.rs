//! Core library entry for the `repocard` CLI.
//!
//! Repositories are read through the [`ports::source_host::SourceHost`]
//! port and summaries come from the [`ports::llm::LlmClient`] port, so the
//! whole pipeline runs the same against GitHub, an in-memory host, or
//! replayed cassettes.

pub mod adapters;
pub mod analyze;
pub mod cancel;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod detect;
pub mod fetch;
pub mod ports;
pub mod profile;
pub mod rank;
pub mod report;
pub mod select;
pub mod summarize;

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// `--help` and `--version` print to stdout and succeed.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    commands::dispatch(&cli.command)
}
