//! Source host port for reading remote repositories.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed future type alias used by [`SourceHost`] to keep the trait dyn-compatible.
pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, HostError>> + Send + 'a>>;

/// Failure reported by a source host.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostError {
    /// The requested repository or path does not exist.
    #[error("not found")]
    NotFound,
    /// Any other failure (network, auth, rate limit, malformed payload).
    #[error("{0}")]
    Remote(String),
}

/// Identifies one remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    /// Bare repository name (e.g. `"repocard"`).
    pub name: String,
    /// Owner-qualified name (e.g. `"octocat/repocard"`).
    pub full_name: String,
    /// When the repository was created on the host.
    pub created_at: DateTime<Utc>,
}

/// Which set of repositories to enumerate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoScope {
    /// Every repository visible to the authenticated account.
    Account,
    /// Every repository of the named organization.
    Organization(String),
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    /// File or directory.
    pub kind: EntryKind,
    /// Reported size in bytes (0 for directories).
    pub size: u64,
}

/// Result of fetching a path: either a file's raw bytes or a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathContents {
    /// The path is a file; holds its undecoded bytes.
    File(Vec<u8>),
    /// The path resolved to a directory listing.
    Directory,
}

/// Read access to a source-control host.
///
/// Authentication and rate limiting are the implementation's concern.
pub trait SourceHost: Send + Sync {
    /// Lists the repositories in the given scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing request fails.
    fn list_repositories(&self, scope: &RepoScope) -> HostFuture<'_, Vec<RepoRef>>;

    /// Returns the declared languages with their byte counts, in host order.
    ///
    /// # Errors
    ///
    /// Returns an error if the languages cannot be queried.
    fn languages(&self, repo: &RepoRef) -> HostFuture<'_, Vec<(String, u64)>>;

    /// Lists the immediate entries of a directory (`""` is the root).
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotFound`] if the directory does not exist.
    fn list_directory(&self, repo: &RepoRef, path: &str) -> HostFuture<'_, Vec<FileEntry>>;

    /// Fetches the raw contents at a path.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotFound`] if the path does not exist.
    fn path_contents(&self, repo: &RepoRef, path: &str) -> HostFuture<'_, PathContents>;
}
