//! Breadth-first code profiling of a repository's file tree.
//!
//! The walk keeps an explicit FIFO worklist instead of recursing, so deep
//! trees never grow the call stack and `structure_overview` comes out in
//! breadth-first order.

use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::fetch::fetch_text;
use crate::ports::source_host::{EntryKind, FileEntry, RepoRef, SourceHost};

/// Top-level directories never descended into.
pub const SKIP_DIRS: &[&str] =
    &[".git", "node_modules", "venv", ".venv", "__pycache__", "dist", "build"];

/// File suffixes that count toward `total_files` but nothing else.
pub const SKIP_SUFFIXES: &[&str] = &[".pyc", ".pyo", ".min.js", ".min.css", ".map", ".log", ".md"];

/// Extensions whose contents are line-counted and sampled.
pub const SAMPLED_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".java", ".c", ".cpp", ".h", ".cs", ".php", ".rb", ".go", ".ts", ".html", ".css",
    ".sql",
];

/// Files at or above this size are never fetched.
pub const MAX_SAMPLED_FILE_BYTES: u64 = 100_000;
/// Lines kept in each sample.
pub const SAMPLE_LINES: usize = 20;
/// Samples kept per extension.
pub const SAMPLES_PER_EXTENSION: usize = 5;
/// Structure entries kept before truncation.
pub const STRUCTURE_LIMIT: usize = 50;
/// Entry appended when the structure overview was truncated.
pub const STRUCTURE_TRUNCATED: &str = "... (more files/directories)";
/// Number of extensions reported in `main_file_types`.
pub const MAIN_FILE_TYPES: usize = 3;

/// The opening lines of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Path of the sampled file.
    pub path: String,
    /// Up to [`SAMPLE_LINES`] leading lines.
    pub text: String,
    /// Total lines in the file.
    pub line_count: usize,
}

/// Aggregate statistics gathered from one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeProfile {
    /// File count per extension, excluding skipped suffixes.
    pub file_type_counts: BTreeMap<String, usize>,
    /// First samples encountered per sampled extension.
    pub code_samples: BTreeMap<String, Vec<Sample>>,
    /// Every file outside skipped directories.
    pub total_files: usize,
    /// Lines across all sampled-extension files that were fetched.
    pub total_lines: usize,
    /// Top extensions by count, descending.
    pub main_file_types: Vec<(String, usize)>,
    /// Visited entries in traversal order, capped.
    pub structure_overview: Vec<String>,
}

impl CodeProfile {
    /// `main_file_types` rendered as `".py (2 files)"`.
    #[must_use]
    pub fn main_file_type_labels(&self) -> Vec<String> {
        self.main_file_types.iter().map(|(ext, count)| format!("{ext} ({count} files)")).collect()
    }

    fn record_file(&mut self, entry: &FileEntry) -> Option<String> {
        self.total_files += 1;

        let name = entry.path.rsplit('/').next().unwrap_or(&entry.path);
        if SKIP_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            return None;
        }

        let ext = extension(name);
        if !ext.is_empty() {
            *self.file_type_counts.entry(ext.clone()).or_default() += 1;
        }
        self.structure_overview.push(format!("File: {}", entry.path));
        Some(ext)
    }

    fn record_content(&mut self, ext: &str, path: &str, text: &str) {
        let line_count = text.matches('\n').count() + 1;
        self.total_lines += line_count;

        let samples = self.code_samples.entry(ext.to_string()).or_default();
        if samples.len() < SAMPLES_PER_EXTENSION {
            let head: Vec<&str> = text.split('\n').take(SAMPLE_LINES).collect();
            samples.push(Sample { path: path.to_string(), text: head.join("\n"), line_count });
        }
    }

    fn finish(&mut self) {
        let mut ranked: Vec<(String, usize)> =
            self.file_type_counts.iter().map(|(ext, count)| (ext.clone(), *count)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(MAIN_FILE_TYPES);
        self.main_file_types = ranked;

        if self.structure_overview.len() > STRUCTURE_LIMIT {
            self.structure_overview.truncate(STRUCTURE_LIMIT);
            self.structure_overview.push(STRUCTURE_TRUNCATED.to_string());
        }
    }
}

/// Extension of a file name including the dot, or `""`.
///
/// Dotfiles such as `.gitignore` have no extension.
fn extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

fn is_skipped_dir(path: &str) -> bool {
    let top = path.split('/').next().unwrap_or(path);
    SKIP_DIRS.contains(&top)
}

/// Walks `repo` breadth-first and builds its [`CodeProfile`].
///
/// Never fails. A failed directory listing ends the walk and the partial
/// profile is returned; a failed file fetch skips only that file. Checks
/// `cancel` before each worklist entry.
pub async fn profile(host: &dyn SourceHost, repo: &RepoRef, cancel: &CancelToken) -> CodeProfile {
    let mut profile = CodeProfile::default();

    let mut worklist: VecDeque<FileEntry> = match host.list_directory(repo, "").await {
        Ok(entries) => entries.into(),
        Err(e) => {
            tracing::error!(repo = %repo.full_name, error = %e, "failed to list repository root");
            return profile;
        }
    };

    while let Some(entry) = worklist.pop_front() {
        if cancel.is_cancelled() {
            tracing::info!(repo = %repo.full_name, "profiling interrupted");
            break;
        }
        if is_skipped_dir(&entry.path) {
            continue;
        }

        match entry.kind {
            EntryKind::Dir => {
                profile.structure_overview.push(format!("Directory: {}", entry.path));
                match host.list_directory(repo, &entry.path).await {
                    Ok(children) => worklist.extend(children),
                    Err(e) => {
                        tracing::error!(
                            repo = %repo.full_name,
                            path = %entry.path,
                            error = %e,
                            "failed to list directory, keeping partial profile"
                        );
                        break;
                    }
                }
            }
            EntryKind::File => {
                let Some(ext) = profile.record_file(&entry) else {
                    continue;
                };
                if !SAMPLED_EXTENSIONS.contains(&ext.as_str())
                    || entry.size >= MAX_SAMPLED_FILE_BYTES
                {
                    continue;
                }
                // Empty files contribute no lines and no sample.
                let text = fetch_text(host, repo, &entry.path).await.filter(|t| !t.is_empty());
                if let Some(text) = text {
                    profile.record_content(&ext, &entry.path, &text);
                }
            }
        }
    }

    profile.finish();
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryHost, MemoryRepo};
    use chrono::{TimeZone, Utc};

    fn repo_ref() -> RepoRef {
        RepoRef {
            name: "walk".into(),
            full_name: "octo/walk".into(),
            created_at: Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn lines(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    async fn run(repo: MemoryRepo) -> CodeProfile {
        let host = MemoryHost::new().with_repo(repo);
        profile(&host, &repo_ref(), &CancelToken::new()).await
    }

    #[test]
    fn extension_rules() {
        assert_eq!(extension("a.py"), ".py");
        assert_eq!(extension("app.min.js"), ".js");
        assert_eq!(extension("Makefile"), "");
        assert_eq!(extension(".gitignore"), "");
    }

    #[tokio::test]
    async fn small_python_repo_with_skipped_dependency_cache() {
        let repo = MemoryRepo::new(repo_ref())
            .with_file("README.md", "Hello world.")
            .with_file("src/a.py", &lines(10))
            .with_file("src/b.py", &lines(5))
            .with_file("node_modules/x.js", "module.exports = 1;\n");

        let profile = run(repo).await;

        // README.md counts as a file but `.md` is excluded from type counts and the overview.
        assert_eq!(profile.total_files, 3);
        assert_eq!(profile.total_lines, 15);
        assert_eq!(profile.file_type_counts, BTreeMap::from([(".py".to_string(), 2)]));
        assert_eq!(profile.main_file_types, vec![(".py".to_string(), 2)]);
        assert_eq!(
            profile.structure_overview,
            vec!["Directory: src", "File: src/a.py", "File: src/b.py"]
        );
        assert!(profile.structure_overview.iter().all(|s| !s.contains("node_modules")));

        let samples = &profile.code_samples[".py"];
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].path, "src/a.py");
        assert_eq!(samples[0].line_count, 10);
        assert_eq!(samples[1].line_count, 5);
    }

    #[tokio::test]
    async fn breadth_first_order() {
        let repo = MemoryRepo::new(repo_ref())
            .with_file("a/deep/x.txt", "x")
            .with_file("a/y.txt", "y")
            .with_file("b/z.txt", "z")
            .with_file("top.txt", "t");

        let profile = run(repo).await;
        assert_eq!(
            profile.structure_overview,
            vec![
                "Directory: a",
                "Directory: b",
                "File: top.txt",
                "Directory: a/deep",
                "File: a/y.txt",
                "File: b/z.txt",
                "File: a/deep/x.txt",
            ]
        );
        assert_eq!(profile.file_type_counts[".txt"], 4);
        // .txt is counted but never sampled or line-counted.
        assert_eq!(profile.total_lines, 0);
        assert!(profile.code_samples.is_empty());
    }

    #[tokio::test]
    async fn samples_capped_per_extension_and_truncated_to_twenty_lines() {
        let mut repo = MemoryRepo::new(repo_ref());
        for i in 0..8 {
            repo = repo.with_file(&format!("f{i}.go"), &lines(30));
        }

        let profile = run(repo).await;
        let samples = &profile.code_samples[".go"];
        assert_eq!(samples.len(), SAMPLES_PER_EXTENSION);
        assert_eq!(samples[0].path, "f0.go");
        assert_eq!(samples[0].text.split('\n').count(), SAMPLE_LINES);
        assert_eq!(samples[0].line_count, 30);
        // Lines are counted for every eligible file, not only sampled ones.
        assert_eq!(profile.total_lines, 8 * 30);
        assert_eq!(profile.file_type_counts[".go"], 8);
    }

    #[tokio::test]
    async fn line_count_is_newlines_plus_one() {
        let repo = MemoryRepo::new(repo_ref())
            .with_file("empty.py", "")
            .with_file("trailing.py", "a\nb\n");

        let profile = run(repo).await;
        assert_eq!(profile.total_lines, 3);
        assert_eq!(profile.code_samples[".py"].len(), 1);
        assert_eq!(profile.code_samples[".py"][0].path, "trailing.py");
    }

    #[tokio::test]
    async fn empty_package_markers_are_counted_but_not_sampled() {
        let repo = MemoryRepo::new(repo_ref())
            .with_file("pkg/__init__.py", "")
            .with_file("pkg/sub/__init__.py", "");

        let profile = run(repo).await;
        assert_eq!(profile.total_files, 2);
        assert_eq!(profile.file_type_counts[".py"], 2);
        assert_eq!(profile.total_lines, 0);
        assert!(profile.code_samples.get(".py").is_none());
    }

    #[tokio::test]
    async fn large_and_undecodable_files_are_not_line_counted() {
        let big = "x".repeat(usize::try_from(MAX_SAMPLED_FILE_BYTES).unwrap());
        let repo = MemoryRepo::new(repo_ref())
            .with_file("big.js", &big)
            .with_bytes("bad.js", vec![0xc3, 0x28])
            .with_file("ok.js", "1");

        let profile = run(repo).await;
        assert_eq!(profile.total_files, 3);
        assert_eq!(profile.file_type_counts[".js"], 3);
        assert_eq!(profile.total_lines, 1);
        assert_eq!(profile.code_samples[".js"].len(), 1);
        assert_eq!(profile.code_samples[".js"][0].path, "ok.js");
    }

    #[tokio::test]
    async fn skip_suffixes_count_only_toward_total_files() {
        let repo = MemoryRepo::new(repo_ref())
            .with_file("app.min.js", "x")
            .with_file("cache.pyc", "x")
            .with_file("run.log", "x")
            .with_file("notes.md", "x")
            .with_file("Makefile", "all:\n");

        let profile = run(repo).await;
        assert_eq!(profile.total_files, 5);
        assert!(profile.file_type_counts.is_empty());
        assert_eq!(profile.structure_overview, vec!["File: Makefile"]);
    }

    #[tokio::test]
    async fn skip_dirs_only_match_top_level_segment() {
        let repo = MemoryRepo::new(repo_ref())
            .with_file("build/out.c", "int x;")
            .with_file(".git/config", "[core]")
            .with_file("src/build/gen.c", "int y;");

        let profile = run(repo).await;
        assert_eq!(profile.total_files, 1);
        assert_eq!(
            profile.structure_overview,
            vec!["Directory: src", "Directory: src/build", "File: src/build/gen.c"]
        );
    }

    #[tokio::test]
    async fn structure_overview_truncated_after_fifty_entries() {
        let mut repo = MemoryRepo::new(repo_ref());
        for i in 0..60 {
            repo = repo.with_file(&format!("file{i:02}.txt"), "x");
        }

        let profile = run(repo).await;
        assert_eq!(profile.total_files, 60);
        assert_eq!(profile.structure_overview.len(), STRUCTURE_LIMIT + 1);
        assert_eq!(profile.structure_overview.last().unwrap(), STRUCTURE_TRUNCATED);
    }

    #[tokio::test]
    async fn exactly_fifty_entries_are_not_marked() {
        let mut repo = MemoryRepo::new(repo_ref());
        for i in 0..50 {
            repo = repo.with_file(&format!("file{i:02}.txt"), "x");
        }

        let profile = run(repo).await;
        assert_eq!(profile.structure_overview.len(), STRUCTURE_LIMIT);
        assert_ne!(profile.structure_overview.last().unwrap(), STRUCTURE_TRUNCATED);
    }

    #[tokio::test]
    async fn main_file_types_top_three_descending() {
        let repo = MemoryRepo::new(repo_ref())
            .with_file("a.rs", "")
            .with_file("b.ts", "")
            .with_file("c.ts", "")
            .with_file("d.py", "")
            .with_file("e.py", "")
            .with_file("f.py", "")
            .with_file("g.c", "")
            .with_file("h.c", "");

        let profile = run(repo).await;
        assert_eq!(
            profile.main_file_types,
            vec![(".py".to_string(), 3), (".c".to_string(), 2), (".ts".to_string(), 2)]
        );
        assert_eq!(profile.main_file_type_labels()[0], ".py (3 files)");
    }

    #[tokio::test]
    async fn failing_file_does_not_abort_walk() {
        let repo = MemoryRepo::new(repo_ref())
            .with_file("a.py", "1")
            .with_file("b.py", "1\n2")
            .failing_at("a.py");

        let profile = run(repo).await;
        assert_eq!(profile.total_files, 2);
        assert_eq!(profile.total_lines, 2);
        assert_eq!(profile.code_samples[".py"].len(), 1);
    }

    #[tokio::test]
    async fn failing_directory_returns_partial_profile() {
        let repo = MemoryRepo::new(repo_ref())
            .with_file("a/x.py", "1")
            .with_file("b/y.py", "1")
            .with_file("z.py", "1")
            .failing_at("a");

        let profile = run(repo).await;
        assert_eq!(profile.structure_overview, vec!["Directory: a"]);
        assert_eq!(profile.total_files, 0);
    }

    #[tokio::test]
    async fn root_listing_failure_yields_empty_profile() {
        let host = MemoryHost::new();
        let profile = profile(&host, &repo_ref(), &CancelToken::new()).await;
        assert_eq!(profile, CodeProfile::default());
    }

    #[tokio::test]
    async fn cancelled_token_stops_walk() {
        let repo = MemoryRepo::new(repo_ref()).with_file("a.py", "1");
        let host = MemoryHost::new().with_repo(repo);
        let cancel = CancelToken::new();
        cancel.cancel();

        let profile = profile(&host, &repo_ref(), &cancel).await;
        assert_eq!(profile.total_files, 0);
    }
}
