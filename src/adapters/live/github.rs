//! Live adapter for the `SourceHost` port using the GitHub REST API.

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::ports::source_host::{
    EntryKind, FileEntry, HostError, HostFuture, PathContents, RepoRef, RepoScope, SourceHost,
};

/// Default REST endpoint.
pub const GITHUB_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;

/// Source host backed by GitHub.
pub struct GitHubHost {
    client: Client,
    base_url: Url,
    token: String,
}

impl GitHubHost {
    /// Creates a host client for `base_url`, authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid absolute URL.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, String> {
        let base_url =
            Url::parse(base_url).map_err(|e| format!("Invalid GitHub API URL {base_url}: {e}"))?;
        Ok(Self { client: Client::new(), base_url, token: token.into() })
    }

    fn url<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Result<Url, HostError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| HostError::Remote(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments.into_iter().filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn repo_url(&self, repo: &RepoRef, tail: &[&str]) -> Result<Url, HostError> {
        let owner_and_name = repo.full_name.split('/');
        let tail = tail.iter().copied().flat_map(|part| part.split('/'));
        self.url(std::iter::once("repos").chain(owner_and_name).chain(tail))
    }

    fn get(&self, url: Url) -> RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(&self.token)
            .header("User-Agent", "repocard")
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, HostError> {
        let response = request
            .send()
            .await
            .map_err(|e| HostError::Remote(format!("GitHub request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(HostError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body).map(|e| e.message).unwrap_or(body);
            return Err(HostError::Remote(format!(
                "GitHub API error ({}): {message}",
                status.as_u16()
            )));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, HostError> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| HostError::Remote(format!("Failed to parse GitHub response: {e}")))
    }

    async fn paginate(&self, url: Url) -> Result<Vec<RepoRef>, HostError> {
        let mut repos = Vec::new();
        for page in 1.. {
            let request = self
                .get(url.clone())
                .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())]);
            let batch: Vec<ApiRepo> = self.get_json(request).await?;
            let done = batch.len() < PER_PAGE;
            repos.extend(batch.into_iter().map(|r| RepoRef {
                name: r.name,
                full_name: r.full_name,
                created_at: r.created_at,
            }));
            if done {
                break;
            }
        }
        Ok(repos)
    }
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Deserialize)]
struct ApiRepo {
    name: String,
    full_name: String,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ApiEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    download_url: Option<String>,
}

/// The contents endpoint answers with an array for directories and an
/// object for everything else.
#[derive(Deserialize)]
#[serde(untagged)]
enum ApiContents {
    Listing(Vec<ApiEntry>),
    Single(ApiEntry),
}

fn entry_kind(kind: &str) -> Option<EntryKind> {
    match kind {
        "file" => Some(EntryKind::File),
        "dir" => Some(EntryKind::Dir),
        // Symlinks and submodules are not walked.
        _ => None,
    }
}

impl SourceHost for GitHubHost {
    fn list_repositories(&self, scope: &RepoScope) -> HostFuture<'_, Vec<RepoRef>> {
        let scope = scope.clone();
        Box::pin(async move {
            let url = match &scope {
                RepoScope::Account => self.url(["user", "repos"])?,
                RepoScope::Organization(org) => self.url(["orgs", org.as_str(), "repos"])?,
            };
            self.paginate(url).await
        })
    }

    fn languages(&self, repo: &RepoRef) -> HostFuture<'_, Vec<(String, u64)>> {
        let repo = repo.clone();
        Box::pin(async move {
            let url = self.repo_url(&repo, &["languages"])?;
            let map: serde_json::Map<String, serde_json::Value> =
                self.get_json(self.get(url)).await?;
            Ok(map.into_iter().map(|(name, bytes)| (name, bytes.as_u64().unwrap_or(0))).collect())
        })
    }

    fn list_directory(&self, repo: &RepoRef, path: &str) -> HostFuture<'_, Vec<FileEntry>> {
        let repo = repo.clone();
        let path = path.to_string();
        Box::pin(async move {
            let url = self.repo_url(&repo, &["contents", &path])?;
            let contents: ApiContents = self.get_json(self.get(url)).await?;
            match contents {
                ApiContents::Listing(entries) => Ok(entries
                    .into_iter()
                    .filter_map(|e| {
                        let kind = entry_kind(&e.kind)?;
                        let size = if kind == EntryKind::Dir { 0 } else { e.size };
                        Some(FileEntry { path: e.path, kind, size })
                    })
                    .collect()),
                ApiContents::Single(_) => {
                    Err(HostError::Remote(format!("{path} is not a directory")))
                }
            }
        })
    }

    fn path_contents(&self, repo: &RepoRef, path: &str) -> HostFuture<'_, PathContents> {
        let repo = repo.clone();
        let path = path.to_string();
        Box::pin(async move {
            let url = self.repo_url(&repo, &["contents", &path])?;
            let contents: ApiContents = self.get_json(self.get(url)).await?;
            let entry = match contents {
                ApiContents::Listing(_) => return Ok(PathContents::Directory),
                ApiContents::Single(entry) => entry,
            };
            if entry.kind == "dir" {
                return Ok(PathContents::Directory);
            }
            let raw = entry
                .download_url
                .ok_or_else(|| HostError::Remote(format!("{path} has no downloadable content")))?;
            let raw = Url::parse(&raw)
                .map_err(|e| HostError::Remote(format!("Bad download URL for {path}: {e}")))?;
            let bytes = self
                .send(self.get(raw))
                .await?
                .bytes()
                .await
                .map_err(|e| HostError::Remote(format!("Failed to read {path}: {e}")))?;
            Ok(PathContents::File(bytes.to_vec()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn repo() -> RepoRef {
        RepoRef {
            name: "demo".into(),
            full_name: "octo/demo".into(),
            created_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn builds_contents_urls_segment_by_segment() {
        let host = GitHubHost::new("https://ghe.example.com/api/v3/", "t").unwrap();
        let url = host.repo_url(&repo(), &["contents", "src/lib dir/a.rs"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/octo/demo/contents/src/lib%20dir/a.rs"
        );

        let root = host.repo_url(&repo(), &["contents", ""]).unwrap();
        assert_eq!(root.as_str(), "https://ghe.example.com/api/v3/repos/octo/demo/contents");
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(GitHubHost::new("not a url", "t").is_err());
    }

    #[test]
    fn contents_payload_shapes() {
        let listing: ApiContents = serde_json::from_str(
            r#"[{"path":"src","type":"dir","size":0},{"path":"a.rs","type":"file","size":12}]"#,
        )
        .unwrap();
        assert!(matches!(listing, ApiContents::Listing(ref v) if v.len() == 2));

        let single: ApiContents = serde_json::from_str(
            r#"{"path":"a.rs","type":"file","size":12,"download_url":"https://raw.example/a.rs"}"#,
        )
        .unwrap();
        assert!(matches!(single, ApiContents::Single(ref e) if e.download_url.is_some()));

        assert_eq!(entry_kind("symlink"), None);
        assert_eq!(entry_kind("dir"), Some(EntryKind::Dir));
    }
}
