//! Framework detection from declared languages and well-known manifest files.

use serde::{Deserialize, Serialize};

use crate::fetch::fetch_text;
use crate::ports::source_host::{EntryKind, RepoRef, SourceHost};

/// How a manifest's dependencies are extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    /// JSON object; dependency names are the keys under each listed key.
    Json(&'static [&'static str]),
    /// Flat `requirements.txt`-style list, one package per line.
    Requirements,
    /// Detected by presence only; no extraction.
    PresenceOnly,
}

/// How a manifest is located in the repository root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestName {
    /// Exact file name.
    Exact(&'static str),
    /// Any root file ending with this suffix (first match wins).
    Suffix(&'static str),
}

/// One entry of the manifest table.
#[derive(Debug, Clone, Copy)]
pub struct ManifestPattern {
    /// Manifest location.
    pub name: ManifestName,
    /// Extraction strategy.
    pub format: ManifestFormat,
    /// Ecosystem label the dependencies are filed under.
    pub ecosystem: &'static str,
}

/// Known manifests, probed in order.
pub const MANIFESTS: &[ManifestPattern] = &[
    ManifestPattern {
        name: ManifestName::Exact("package.json"),
        format: ManifestFormat::Json(&["dependencies", "devDependencies"]),
        ecosystem: "JavaScript/Node.js",
    },
    ManifestPattern {
        name: ManifestName::Exact("requirements.txt"),
        format: ManifestFormat::Requirements,
        ecosystem: "Python",
    },
    // TOML, XML, YAML and free-form text manifests are presence-only.
    ManifestPattern {
        name: ManifestName::Exact("pyproject.toml"),
        format: ManifestFormat::PresenceOnly,
        ecosystem: "Python",
    },
    ManifestPattern {
        name: ManifestName::Exact("Gemfile"),
        format: ManifestFormat::PresenceOnly,
        ecosystem: "Ruby",
    },
    ManifestPattern {
        name: ManifestName::Exact("pom.xml"),
        format: ManifestFormat::PresenceOnly,
        ecosystem: "Java/Maven",
    },
    ManifestPattern {
        name: ManifestName::Exact("build.gradle"),
        format: ManifestFormat::PresenceOnly,
        ecosystem: "Java/Gradle",
    },
    ManifestPattern {
        name: ManifestName::Exact("composer.json"),
        format: ManifestFormat::Json(&["require", "require-dev"]),
        ecosystem: "PHP",
    },
    ManifestPattern {
        name: ManifestName::Exact("go.mod"),
        format: ManifestFormat::PresenceOnly,
        ecosystem: "Go",
    },
    ManifestPattern {
        name: ManifestName::Exact("Cargo.toml"),
        format: ManifestFormat::PresenceOnly,
        ecosystem: "Rust",
    },
    ManifestPattern {
        name: ManifestName::Suffix(".csproj"),
        format: ManifestFormat::PresenceOnly,
        ecosystem: "C#/.NET",
    },
    ManifestPattern {
        name: ManifestName::Exact("pubspec.yaml"),
        format: ManifestFormat::PresenceOnly,
        ecosystem: "Dart/Flutter",
    },
];

/// Dependencies declared for one ecosystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ecosystem {
    /// Ecosystem label (e.g. `"Python"`).
    pub label: String,
    /// Dependency names in manifest order; empty for presence-only manifests.
    pub dependencies: Vec<String>,
}

/// Languages and per-ecosystem dependencies of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkProfile {
    /// Declared languages in host order.
    pub languages: Vec<String>,
    /// One entry per ecosystem whose manifest was found, in table order.
    pub ecosystems: Vec<Ecosystem>,
}

impl FrameworkProfile {
    /// Returns the dependency list for `label`, creating the ecosystem if needed.
    fn ecosystem_mut(&mut self, label: &str) -> &mut Vec<String> {
        let index = match self.ecosystems.iter().position(|e| e.label == label) {
            Some(index) => index,
            None => {
                self.ecosystems.push(Ecosystem { label: label.to_string(), dependencies: Vec::new() });
                self.ecosystems.len() - 1
            }
        };
        &mut self.ecosystems[index].dependencies
    }

    /// Looks up an ecosystem by label.
    #[must_use]
    pub fn ecosystem(&self, label: &str) -> Option<&Ecosystem> {
        self.ecosystems.iter().find(|e| e.label == label)
    }

    /// Ecosystems that declared at least one dependency, rendered as `"label: a, b"`.
    #[must_use]
    pub fn listing(&self) -> Vec<String> {
        self.ecosystems
            .iter()
            .filter(|e| !e.dependencies.is_empty())
            .map(|e| format!("{}: {}", e.label, e.dependencies.join(", ")))
            .collect()
    }
}

/// Detects languages and manifest dependencies for `repo`.
///
/// Never fails: a languages query error leaves `languages` empty, and a
/// manifest that cannot be parsed leaves its ecosystem present but empty.
pub async fn detect(host: &dyn SourceHost, repo: &RepoRef) -> FrameworkProfile {
    let mut profile = FrameworkProfile::default();

    match host.languages(repo).await {
        Ok(languages) => profile.languages = languages.into_iter().map(|(name, _)| name).collect(),
        Err(e) => tracing::error!(repo = %repo.full_name, error = %e, "failed to fetch languages"),
    }

    let root_files = if MANIFESTS.iter().any(|m| matches!(m.name, ManifestName::Suffix(_))) {
        root_file_names(host, repo).await
    } else {
        Vec::new()
    };

    for pattern in MANIFESTS {
        let Some(path) = resolve_manifest(pattern.name, &root_files) else {
            continue;
        };
        let Some(content) = fetch_text(host, repo, &path).await else {
            continue;
        };
        tracing::debug!(repo = %repo.full_name, manifest = %path, "found manifest");

        let deps = profile.ecosystem_mut(pattern.ecosystem);
        match pattern.format {
            ManifestFormat::Json(keys) => match parse_json_dependencies(&content, keys) {
                Ok(names) => deps.extend(names),
                Err(e) => tracing::warn!(
                    repo = %repo.full_name,
                    manifest = %path,
                    error = %e,
                    "could not parse manifest as JSON"
                ),
            },
            ManifestFormat::Requirements => deps.extend(parse_requirements(&content)),
            ManifestFormat::PresenceOnly => {}
        }
    }

    profile
}

async fn root_file_names(host: &dyn SourceHost, repo: &RepoRef) -> Vec<String> {
    match host.list_directory(repo, "").await {
        Ok(entries) => entries
            .into_iter()
            .filter(|e| e.kind == EntryKind::File)
            .map(|e| e.path)
            .collect(),
        Err(e) => {
            tracing::warn!(repo = %repo.full_name, error = %e, "failed to list root for manifests");
            Vec::new()
        }
    }
}

fn resolve_manifest(name: ManifestName, root_files: &[String]) -> Option<String> {
    match name {
        ManifestName::Exact(file) => Some(file.to_string()),
        ManifestName::Suffix(suffix) => root_files.iter().find(|f| f.ends_with(suffix)).cloned(),
    }
}

/// Extracts the keys of each object found under `keys`.
///
/// Keys that are missing or not objects contribute nothing.
///
/// # Errors
///
/// Returns the parse error if `content` is not valid JSON.
pub fn parse_json_dependencies(
    content: &str,
    keys: &[&str],
) -> Result<Vec<String>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let mut names = Vec::new();
    for key in keys {
        if let Some(section) = value.get(key).and_then(serde_json::Value::as_object) {
            names.extend(section.keys().cloned());
        }
    }
    Ok(names)
}

/// Extracts bare package names from a requirements list.
///
/// Blank and `#` comment lines are skipped; anything from the first
/// `=`, `<`, `>` or `~` on is dropped.
#[must_use]
pub fn parse_requirements(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let name = line.split(['=', '<', '>', '~']).next().unwrap_or(line).trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}
