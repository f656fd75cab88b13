//! Choosing which repositories to analyze.

use crate::ports::source_host::RepoRef;

/// Filters, orders and truncates a repository listing.
///
/// A requested name matches a repository whose `full_name` or bare `name`
/// equals it. Requests that match nothing are logged and ignored. The
/// result is ordered oldest first and cut to `limit` entries.
#[must_use]
pub fn select(mut repos: Vec<RepoRef>, requested: &[String], limit: Option<usize>) -> Vec<RepoRef> {
    if !requested.is_empty() {
        for name in requested {
            if !repos.iter().any(|r| matches(r, name)) {
                tracing::warn!(repo = %name, "requested repository not found");
            }
        }
        repos.retain(|r| requested.iter().any(|name| matches(r, name)));
    }

    repos.sort_by_key(|r| r.created_at);

    if let Some(limit) = limit {
        if repos.len() > limit {
            tracing::info!(limit, "limiting analysis");
            repos.truncate(limit);
        }
    }
    repos
}

fn matches(repo: &RepoRef, name: &str) -> bool {
    repo.full_name == name || repo.name == name
}

/// Splits a comma-separated `--repos` value, dropping blanks.
#[must_use]
pub fn parse_names(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}
