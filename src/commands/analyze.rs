//! `repocard analyze` command.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use crate::analyze::analyze_all;
use crate::cancel::CancelToken;
use crate::cli::ReportFormat;
use crate::context::ServiceContext;
use crate::ports::source_host::RepoScope;
use crate::report::{self, json, markdown};
use crate::select::select;
use crate::summarize::{SummarizationMode, Summarizer, SummaryFormat};

/// Parsed `analyze` arguments.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Keep at most this many repositories.
    pub limit: Option<usize>,
    /// Force the built-in summary.
    pub no_llm: bool,
    /// Organization to list instead of the account.
    pub org: Option<String>,
    /// Requested repository names; empty means all.
    pub repos: Vec<String>,
    /// Report format.
    pub format: ReportFormat,
    /// Output path override.
    pub output: Option<PathBuf>,
}

/// Execute the `analyze` command against `ctx`.
///
/// A Ctrl-C skips the repository being analyzed; a second one within
/// [`EXIT_WINDOW`] exits the process.
///
/// # Errors
///
/// Returns an error string if the repositories cannot be listed or the
/// report cannot be written.
pub async fn run_with_context(
    ctx: &ServiceContext,
    model: &str,
    options: &Options,
) -> Result<(), String> {
    let scope = match &options.org {
        Some(org) => RepoScope::Organization(org.clone()),
        None => RepoScope::Account,
    };
    let listing = ctx
        .host
        .list_repositories(&scope)
        .await
        .map_err(|e| format!("Failed to list repositories: {e}"))?;
    tracing::info!(count = listing.len(), "found repositories");
    let repos = select(listing, &options.repos, options.limit);

    let mode = if options.no_llm {
        SummarizationMode::FallbackOnly
    } else if !ctx.llm_enabled {
        tracing::warn!("no language model configured, using fallback summaries");
        SummarizationMode::FallbackOnly
    } else {
        SummarizationMode::Remote
    };
    let format = SummaryFormat::from(options.format);
    let summarizer = Summarizer::new(ctx.llm.as_ref(), model, mode, format);

    let cancel = CancelToken::new();
    let watcher = watch_interrupts(cancel.clone());
    let analyses = analyze_all(ctx.host.as_ref(), &repos, &summarizer, &cancel).await;
    watcher.abort();

    if analyses.is_empty() {
        println!("No repositories were analyzed; no report written.");
        return Ok(());
    }

    let (contents, default_output) = match format {
        SummaryFormat::Text => (markdown::render(&analyses), markdown::DEFAULT_OUTPUT),
        SummaryFormat::Json => (json::render(&analyses)?, json::DEFAULT_OUTPUT),
    };
    let path = options.output.clone().unwrap_or_else(|| PathBuf::from(default_output));
    report::write(&path, &contents)?;
    println!("Analyzed {} repositories; report written to {}", analyses.len(), path.display());
    Ok(())
}

/// A second Ctrl-C within this window ends the whole run.
pub const EXIT_WINDOW: Duration = Duration::from_secs(2);

/// Whether an interrupt at `now` follows the previous one closely enough
/// to stop the batch instead of skipping a repository.
#[must_use]
pub fn is_repeated_interrupt(previous: Option<Instant>, now: Instant) -> bool {
    previous.is_some_and(|at| now.saturating_duration_since(at) <= EXIT_WINDOW)
}

fn watch_interrupts(cancel: CancelToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut previous = None;
        while tokio::signal::ctrl_c().await.is_ok() {
            let now = Instant::now();
            if is_repeated_interrupt(previous, now) {
                tracing::warn!("second interrupt received, stopping");
                std::process::exit(130);
            }
            previous = Some(now);
            tracing::warn!("interrupt received, skipping current repository (press again to stop)");
            cancel.cancel();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::adapters::memory::{MemoryHost, MemoryRepo};
    use crate::adapters::replaying::ReplayingLlmClient;
    use crate::ports::source_host::RepoRef;

    fn repo(name: &str, year: i32) -> RepoRef {
        RepoRef {
            name: name.into(),
            full_name: format!("octo/{name}"),
            created_at: Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn context() -> ServiceContext {
        let host = MemoryHost::new()
            .with_repo(
                MemoryRepo::new(repo("alpha", 2019))
                    .with_language("Rust", 900)
                    .with_file("README.md", "Alpha parses things.\n")
                    .with_file("src/main.rs", "fn main() {}\n"),
            )
            .with_repo(MemoryRepo::new(repo("beta", 2022)).with_file("index.js", "x\n"));
        ServiceContext {
            host: Box::new(host),
            // Never called: the context reports no usable model.
            llm: Box::new(ReplayingLlmClient::unconfigured()),
            llm_enabled: false,
        }
    }

    fn temp_output(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("repocard_analyze_cmd_test");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[tokio::test]
    async fn writes_markdown_report_newest_first() {
        let output = temp_output("report.md");
        let options = Options { output: Some(output.clone()), ..Options::default() };
        run_with_context(&context(), "m", &options).await.unwrap();

        let report = std::fs::read_to_string(&output).unwrap();
        assert!(report.starts_with("# My GitHub Projects"));
        assert!(report.find("## beta").unwrap() < report.find("## alpha").unwrap());
        assert!(report.contains("`Rust`"));
        let _ = std::fs::remove_file(&output);
    }

    #[tokio::test]
    async fn json_report_for_selected_repository() {
        let output = temp_output("report.json");
        let options = Options {
            repos: vec!["alpha".into(), "missing".into()],
            format: ReportFormat::Json,
            output: Some(output.clone()),
            ..Options::default()
        };
        run_with_context(&context(), "m", &options).await.unwrap();

        let records: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "alpha");
        assert_eq!(records[0]["purpose"], "Alpha parses things.");
        let _ = std::fs::remove_file(&output);
    }

    #[test]
    fn only_a_quick_second_interrupt_stops_the_run() {
        let first = Instant::now();
        assert!(!is_repeated_interrupt(None, first));
        assert!(is_repeated_interrupt(Some(first), first + Duration::from_millis(500)));
        assert!(!is_repeated_interrupt(Some(first), first + EXIT_WINDOW + Duration::from_millis(1)));
    }

    #[tokio::test]
    async fn unknown_organization_is_an_error() {
        let options = Options { org: Some("nobody".into()), ..Options::default() };
        let err = run_with_context(&context(), "m", &options).await.unwrap_err();
        assert!(err.contains("Failed to list repositories"));
    }
}
