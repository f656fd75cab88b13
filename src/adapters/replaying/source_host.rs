//! Replaying adapter for the `SourceHost` port.

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;

use super::{next_output, split_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::source_host::{
    FileEntry, HostError, HostFuture, PathContents, RepoRef, RepoScope, SourceHost,
};

/// Serves recorded host responses from a cassette.
pub struct ReplayingSourceHost {
    replayer: Option<Arc<Mutex<CassetteReplayer>>>,
}

impl ReplayingSourceHost {
    /// Create a replaying host backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer: Some(replayer) }
    }

    /// Create a replaying host with no cassette. Panics when called.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self { replayer: None }
    }

    fn replay<T>(&self, method: &'static str) -> HostFuture<'_, T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let output = next_output(self.replayer.as_ref(), "host", method);
        Box::pin(async move { decode(method, output) })
    }
}

fn decode<T: DeserializeOwned>(method: &str, output: serde_json::Value) -> Result<T, HostError> {
    let malformed = |e: serde_json::Error| {
        HostError::Remote(format!("host::{method}: failed to deserialize recording: {e}"))
    };
    match split_result(output) {
        Ok(value) => serde_json::from_value(value).map_err(malformed),
        Err(err) => Err(serde_json::from_value(err).map_err(malformed)?),
    }
}

impl SourceHost for ReplayingSourceHost {
    fn list_repositories(&self, _scope: &RepoScope) -> HostFuture<'_, Vec<RepoRef>> {
        self.replay("list_repositories")
    }

    fn languages(&self, _repo: &RepoRef) -> HostFuture<'_, Vec<(String, u64)>> {
        self.replay("languages")
    }

    fn list_directory(&self, _repo: &RepoRef, _path: &str) -> HostFuture<'_, Vec<FileEntry>> {
        self.replay("list_directory")
    }

    fn path_contents(&self, _repo: &RepoRef, _path: &str) -> HostFuture<'_, PathContents> {
        self.replay("path_contents")
    }
}
