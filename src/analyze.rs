//! Per-repository analysis pipeline.
//!
//! Steps run strictly in sequence (detector, README, profiler, summarizer)
//! with a cancellation checkpoint before each one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::detect::{self, FrameworkProfile};
use crate::fetch;
use crate::ports::source_host::{RepoRef, SourceHost};
use crate::profile::{self, CodeProfile};
use crate::summarize::Summarizer;

/// Everything known about one repository before summarization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryProfile {
    /// Bare repository name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Languages and manifest dependencies.
    pub frameworks: FrameworkProfile,
    /// README text, if one was found.
    pub readme: Option<String>,
    /// Tree walk statistics.
    pub code_analysis: CodeProfile,
}

/// A repository profile paired with its summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoAnalysis {
    /// The gathered profile.
    pub profile: RepositoryProfile,
    /// Text or JSON summary, depending on the summarizer format.
    pub summary: String,
}

/// Analyzes one repository.
///
/// Returns `None` if `cancel` was raised at any checkpoint.
pub async fn analyze_repository(
    host: &dyn SourceHost,
    repo: &RepoRef,
    summarizer: &Summarizer<'_>,
    cancel: &CancelToken,
) -> Option<RepoAnalysis> {
    tracing::info!(repo = %repo.full_name, "analyzing repository");

    checkpoint(repo, cancel)?;
    let frameworks = detect::detect(host, repo).await;

    checkpoint(repo, cancel)?;
    let readme = fetch::fetch_readme(host, repo).await;

    checkpoint(repo, cancel)?;
    let code_analysis = profile::profile(host, repo, cancel).await;
    tracing::info!(
        repo = %repo.full_name,
        files = code_analysis.total_files,
        lines = code_analysis.total_lines,
        "code profile complete"
    );

    checkpoint(repo, cancel)?;
    let profile = RepositoryProfile {
        name: repo.name.clone(),
        created_at: repo.created_at,
        frameworks,
        readme,
        code_analysis,
    };
    let summary = summarizer.summarize(&profile).await;

    Some(RepoAnalysis { profile, summary })
}

fn checkpoint(repo: &RepoRef, cancel: &CancelToken) -> Option<()> {
    if cancel.is_cancelled() {
        tracing::warn!(repo = %repo.full_name, "skipping repository on request");
        return None;
    }
    Some(())
}

/// Analyzes `repos` in order, one at a time.
///
/// A cancelled repository is dropped from the results and the token is
/// reset so the next repository starts clean.
pub async fn analyze_all(
    host: &dyn SourceHost,
    repos: &[RepoRef],
    summarizer: &Summarizer<'_>,
    cancel: &CancelToken,
) -> Vec<RepoAnalysis> {
    let mut analyses = Vec::with_capacity(repos.len());
    for (index, repo) in repos.iter().enumerate() {
        tracing::info!(repo = %repo.full_name, index = index + 1, total = repos.len(), "starting");
        if let Some(analysis) = analyze_repository(host, repo, summarizer, cancel).await {
            analyses.push(analysis);
        }
        cancel.reset();
    }
    if analyses.is_empty() {
        tracing::warn!("no repositories were successfully analyzed");
    }
    analyses
}
