//! Recording adapter for the `SourceHost` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::source_host::{
    FileEntry, HostError, HostFuture, PathContents, RepoRef, RepoScope, SourceHost,
};

/// Records host interactions while delegating to an inner implementation.
pub struct RecordingSourceHost {
    inner: Box<dyn SourceHost>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSourceHost {
    /// Creates a new recording host wrapping the given implementation.
    pub fn new(inner: Box<dyn SourceHost>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }

    fn record<T: Serialize, I: Serialize>(
        &self,
        method: &str,
        input: &I,
        result: &Result<T, HostError>,
    ) {
        record_result(&self.recorder, "host", method, input, result, |e| {
            serde_json::to_value(e).unwrap_or(serde_json::Value::Null)
        });
    }
}

#[derive(Serialize)]
struct PathInput<'a> {
    repo: &'a str,
    path: &'a str,
}

#[derive(Serialize)]
struct RepoInput<'a> {
    repo: &'a str,
}

impl SourceHost for RecordingSourceHost {
    fn list_repositories(&self, scope: &RepoScope) -> HostFuture<'_, Vec<RepoRef>> {
        let scope = scope.clone();
        Box::pin(async move {
            let result = self.inner.list_repositories(&scope).await;
            self.record("list_repositories", &scope, &result);
            result
        })
    }

    fn languages(&self, repo: &RepoRef) -> HostFuture<'_, Vec<(String, u64)>> {
        let repo = repo.clone();
        Box::pin(async move {
            let result = self.inner.languages(&repo).await;
            self.record("languages", &RepoInput { repo: &repo.full_name }, &result);
            result
        })
    }

    fn list_directory(&self, repo: &RepoRef, path: &str) -> HostFuture<'_, Vec<FileEntry>> {
        let repo = repo.clone();
        let path = path.to_string();
        Box::pin(async move {
            let result = self.inner.list_directory(&repo, &path).await;
            self.record("list_directory", &PathInput { repo: &repo.full_name, path: &path }, &result);
            result
        })
    }

    fn path_contents(&self, repo: &RepoRef, path: &str) -> HostFuture<'_, PathContents> {
        let repo = repo.clone();
        let path = path.to_string();
        Box::pin(async move {
            let result = self.inner.path_contents(&repo, &path).await;
            self.record("path_contents", &PathInput { repo: &repo.full_name, path: &path }, &result);
            result
        })
    }
}
