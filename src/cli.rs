//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::summarize::SummaryFormat;

/// Top-level CLI parser for `repocard`.
#[derive(Debug, Parser)]
#[command(name = "repocard", version, about = "Profile repositories and summarize them into a report")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze repositories and write a report.
    ///
    /// Ctrl-C skips the repository in progress; pressing it twice within
    /// two seconds stops the run.
    Analyze {
        /// Maximum number of repositories to analyze (oldest first).
        #[arg(long)]
        limit: Option<usize>,
        /// Skip the language model and use the built-in summary.
        #[arg(long)]
        no_llm: bool,
        /// Analyze an organization's repositories instead of your own.
        #[arg(long)]
        org: Option<String>,
        /// Comma-separated repository names (`name` or `owner/name`).
        #[arg(long)]
        repos: Option<String>,
        /// Report format.
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
        /// Output file (defaults to `github_repo_analysis.md` or `.json`).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Score the projects of a markdown report and list the best ones.
    Rank {
        /// Markdown report to read.
        #[arg(long, default_value = "github_repo_analysis.md")]
        file: PathBuf,
        /// Number of projects to list.
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// List the projects without scoring them.
        #[arg(long)]
        no_evaluate: bool,
    },
}

/// Report format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Markdown project cards.
    #[default]
    Text,
    /// JSON array of structured summaries.
    Json,
}

impl From<ReportFormat> for SummaryFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Text => SummaryFormat::Text,
            ReportFormat::Json => SummaryFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, ReportFormat};
    use clap::Parser;

    #[test]
    fn parses_analyze_flags() {
        let cli = Cli::parse_from([
            "repocard", "analyze", "--limit", "3", "--no-llm", "--repos", "a,b", "--format", "json",
        ]);
        match cli.command {
            Command::Analyze { limit, no_llm, repos, format, org, output } => {
                assert_eq!(limit, Some(3));
                assert!(no_llm);
                assert_eq!(repos.as_deref(), Some("a,b"));
                assert_eq!(format, ReportFormat::Json);
                assert!(org.is_none());
                assert!(output.is_none());
            }
            Command::Rank { .. } => panic!("expected analyze"),
        }
    }

    #[test]
    fn rank_defaults() {
        let cli = Cli::parse_from(["repocard", "rank"]);
        match cli.command {
            Command::Rank { file, top, no_evaluate } => {
                assert_eq!(file.to_str(), Some("github_repo_analysis.md"));
                assert_eq!(top, 10);
                assert!(!no_evaluate);
            }
            Command::Analyze { .. } => panic!("expected rank"),
        }
    }
}
