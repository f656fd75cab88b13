//! In-memory source host for tests and offline runs.

use std::collections::{BTreeMap, BTreeSet};

use crate::ports::source_host::{
    EntryKind, FileEntry, HostError, HostFuture, PathContents, RepoRef, RepoScope, SourceHost,
};

/// A repository held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryRepo {
    /// Repository identity.
    pub repo: RepoRef,
    /// Declared languages in host order.
    pub languages: Vec<(String, u64)>,
    files: BTreeMap<String, Vec<u8>>,
    failing: BTreeSet<String>,
}

impl MemoryRepo {
    /// Creates an empty repository.
    #[must_use]
    pub fn new(repo: RepoRef) -> Self {
        Self { repo, languages: Vec::new(), files: BTreeMap::new(), failing: BTreeSet::new() }
    }

    /// Adds a declared language.
    #[must_use]
    pub fn with_language(mut self, name: &str, bytes: u64) -> Self {
        self.languages.push((name.to_string(), bytes));
        self
    }

    /// Adds a text file. Parent directories are implied.
    #[must_use]
    pub fn with_file(self, path: &str, contents: &str) -> Self {
        self.with_bytes(path, contents.as_bytes().to_vec())
    }

    /// Adds a file with raw bytes.
    #[must_use]
    pub fn with_bytes(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(path.trim_matches('/').to_string(), bytes);
        self
    }

    /// Makes every request for `path` fail with a remote error.
    #[must_use]
    pub fn failing_at(mut self, path: &str) -> Self {
        self.failing.insert(path.trim_matches('/').to_string());
        self
    }

    fn check_failure(&self, path: &str) -> Result<(), HostError> {
        if self.failing.contains(path) {
            return Err(HostError::Remote(format!("injected failure at {path:?}")));
        }
        Ok(())
    }

    fn is_dir(&self, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }
        let prefix = format!("{path}/");
        self.files.keys().any(|f| f.starts_with(&prefix))
    }

    fn list(&self, path: &str) -> Result<Vec<FileEntry>, HostError> {
        self.check_failure(path)?;
        if !self.is_dir(path) {
            return Err(HostError::NotFound);
        }
        let prefix = if path.is_empty() { String::new() } else { format!("{path}/") };

        let mut children: BTreeMap<String, FileEntry> = BTreeMap::new();
        for (file, bytes) in &self.files {
            let Some(rest) = file.strip_prefix(&prefix) else {
                continue;
            };
            let entry = match rest.split_once('/') {
                Some((dir, _)) => FileEntry {
                    path: format!("{prefix}{dir}"),
                    kind: EntryKind::Dir,
                    size: 0,
                },
                None => FileEntry {
                    path: file.clone(),
                    kind: EntryKind::File,
                    size: bytes.len() as u64,
                },
            };
            children.entry(entry.path.clone()).or_insert(entry);
        }
        Ok(children.into_values().collect())
    }

    fn contents(&self, path: &str) -> Result<PathContents, HostError> {
        self.check_failure(path)?;
        if let Some(bytes) = self.files.get(path) {
            return Ok(PathContents::File(bytes.clone()));
        }
        if self.is_dir(path) {
            return Ok(PathContents::Directory);
        }
        Err(HostError::NotFound)
    }
}

/// Source host serving a fixed set of [`MemoryRepo`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    repos: Vec<MemoryRepo>,
    /// Organization name to full names of its repositories.
    orgs: BTreeMap<String, Vec<String>>,
}

impl MemoryHost {
    /// Creates a host with no repositories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a repository to the account scope.
    #[must_use]
    pub fn with_repo(mut self, repo: MemoryRepo) -> Self {
        self.repos.push(repo);
        self
    }

    /// Adds a repository that is also listed under `org`.
    #[must_use]
    pub fn with_org_repo(mut self, org: &str, repo: MemoryRepo) -> Self {
        self.orgs.entry(org.to_string()).or_default().push(repo.repo.full_name.clone());
        self.with_repo(repo)
    }

    fn repo(&self, repo: &RepoRef) -> Result<&MemoryRepo, HostError> {
        self.repos.iter().find(|r| r.repo.full_name == repo.full_name).ok_or(HostError::NotFound)
    }

    fn list_scope(&self, scope: &RepoScope) -> Result<Vec<RepoRef>, HostError> {
        match scope {
            RepoScope::Account => Ok(self.repos.iter().map(|r| r.repo.clone()).collect()),
            RepoScope::Organization(org) => {
                let names = self.orgs.get(org).ok_or(HostError::NotFound)?;
                Ok(self
                    .repos
                    .iter()
                    .filter(|r| names.contains(&r.repo.full_name))
                    .map(|r| r.repo.clone())
                    .collect())
            }
        }
    }
}

impl SourceHost for MemoryHost {
    fn list_repositories(&self, scope: &RepoScope) -> HostFuture<'_, Vec<RepoRef>> {
        let result = self.list_scope(scope);
        Box::pin(async move { result })
    }

    fn languages(&self, repo: &RepoRef) -> HostFuture<'_, Vec<(String, u64)>> {
        let result = self.repo(repo).map(|r| r.languages.clone());
        Box::pin(async move { result })
    }

    fn list_directory(&self, repo: &RepoRef, path: &str) -> HostFuture<'_, Vec<FileEntry>> {
        let result = self.repo(repo).and_then(|r| r.list(path.trim_matches('/')));
        Box::pin(async move { result })
    }

    fn path_contents(&self, repo: &RepoRef, path: &str) -> HostFuture<'_, PathContents> {
        let result = self.repo(repo).and_then(|r| r.contents(path.trim_matches('/')));
        Box::pin(async move { result })
    }
}
