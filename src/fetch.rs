//! Content fetching: the single path through which repository bytes are read.

use thiserror::Error;

use crate::ports::source_host::{HostError, PathContents, RepoRef, SourceHost};

/// README file names tried in order by [`fetch_readme`].
pub const README_CANDIDATES: [&str; 6] =
    ["README.md", "README.MD", "Readme.md", "readme.md", "README", "readme"];

/// Why a path produced no text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The path does not exist. Expected and silent.
    #[error("not found")]
    NotFound,
    /// The path is a directory, not a file.
    #[error("path is a directory")]
    IsDirectory,
    /// The host failed to serve the path.
    #[error("fetch failed: {0}")]
    Transient(String),
    /// The bytes are not valid UTF-8.
    #[error("not valid UTF-8")]
    Decode,
}

/// Fetches `path` and decodes it as UTF-8, classifying every failure.
///
/// # Errors
///
/// Returns a [`FetchError`] describing why no text is available.
pub async fn try_fetch_text(
    host: &dyn SourceHost,
    repo: &RepoRef,
    path: &str,
) -> Result<String, FetchError> {
    match host.path_contents(repo, path).await {
        Ok(PathContents::File(bytes)) => String::from_utf8(bytes).map_err(|_| FetchError::Decode),
        Ok(PathContents::Directory) => Err(FetchError::IsDirectory),
        Err(HostError::NotFound) => Err(FetchError::NotFound),
        Err(HostError::Remote(msg)) => Err(FetchError::Transient(msg)),
    }
}

/// Fetches `path` as text, returning `None` on any failure.
///
/// Not-found and directory paths are silent; remote errors and undecodable
/// bytes are logged with distinct messages.
pub async fn fetch_text(host: &dyn SourceHost, repo: &RepoRef, path: &str) -> Option<String> {
    match try_fetch_text(host, repo, path).await {
        Ok(text) => Some(text),
        Err(FetchError::NotFound | FetchError::IsDirectory) => None,
        Err(FetchError::Transient(msg)) => {
            tracing::warn!(repo = %repo.full_name, path, error = %msg, "failed to fetch file");
            None
        }
        Err(FetchError::Decode) => {
            tracing::warn!(repo = %repo.full_name, path, "could not decode file as UTF-8");
            None
        }
    }
}

/// Returns the first non-empty README among [`README_CANDIDATES`].
pub async fn fetch_readme(host: &dyn SourceHost, repo: &RepoRef) -> Option<String> {
    for name in README_CANDIDATES {
        if let Some(text) = fetch_text(host, repo, name).await {
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}
