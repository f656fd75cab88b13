//! Markdown project cards.

use std::fmt::Write as _;

use crate::analyze::RepoAnalysis;
use crate::detect::FrameworkProfile;

/// Report heading.
pub const TITLE: &str = "# My GitHub Projects";
/// Default output file.
pub const DEFAULT_OUTPUT: &str = "github_repo_analysis.md";

const DESCRIPTION_CHARS: usize = 150;
const LANGUAGE_TAGS: usize = 3;
const LIBRARIES_PER_ECOSYSTEM: usize = 2;
const MAX_TAGS: usize = 5;

/// Renders one card per analysis, newest repository first.
#[must_use]
pub fn render(analyses: &[RepoAnalysis]) -> String {
    let mut sorted: Vec<&RepoAnalysis> = analyses.iter().collect();
    sorted.sort_by(|a, b| b.profile.created_at.cmp(&a.profile.created_at));

    let mut out = format!("{TITLE}\n\n");
    for analysis in sorted {
        let profile = &analysis.profile;
        let _ = write!(out, "## {}\n\n", profile.name);
        let _ = write!(out, "**{}**\n\n", profile.created_at.format("%Y"));
        let _ = write!(out, "{}\n\n", short_description(&analysis.summary));
        let _ = write!(out, "{}\n\n", tags(&profile.frameworks).join(" "));
        out.push_str("---\n\n");
    }
    out
}

/// First sentence of `summary`, capped at 150 characters.
#[must_use]
pub fn short_description(summary: &str) -> String {
    if summary.is_empty() {
        return String::new();
    }
    let first = summary.split('.').next().unwrap_or_default();
    let sentence = format!("{first}.");
    if sentence.chars().count() > DESCRIPTION_CHARS {
        let cut: String = sentence.chars().take(DESCRIPTION_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        sentence
    }
}

/// Backticked tags: up to three languages, then up to two libraries per
/// ecosystem while the total stays within five.
#[must_use]
pub fn tags(frameworks: &FrameworkProfile) -> Vec<String> {
    let languages = frameworks.languages.iter().take(LANGUAGE_TAGS);
    let library_budget = MAX_TAGS.saturating_sub(frameworks.languages.len());
    let libraries = frameworks
        .ecosystems
        .iter()
        .flat_map(|e| e.dependencies.iter().take(LIBRARIES_PER_ECOSYSTEM))
        .take(library_budget);
    languages.chain(libraries).map(|tag| format!("`{tag}`")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::RepositoryProfile;
    use crate::detect::Ecosystem;
    use crate::profile::CodeProfile;
    use chrono::{TimeZone, Utc};

    fn analysis(name: &str, year: i32, summary: &str, frameworks: FrameworkProfile) -> RepoAnalysis {
        RepoAnalysis {
            profile: RepositoryProfile {
                name: name.into(),
                created_at: Utc.with_ymd_and_hms(year, 3, 1, 0, 0, 0).unwrap(),
                frameworks,
                readme: None,
                code_analysis: CodeProfile::default(),
            },
            summary: summary.into(),
        }
    }

    fn frameworks(languages: &[&str], ecosystems: &[(&str, &[&str])]) -> FrameworkProfile {
        FrameworkProfile {
            languages: languages.iter().map(|s| (*s).to_string()).collect(),
            ecosystems: ecosystems
                .iter()
                .map(|(label, deps)| Ecosystem {
                    label: (*label).to_string(),
                    dependencies: deps.iter().map(|s| (*s).to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn cards_are_newest_first() {
        let report = render(&[
            analysis("old", 2015, "Old thing. More.", FrameworkProfile::default()),
            analysis("new", 2023, "New thing.", frameworks(&["Rust"], &[])),
        ]);
        assert!(report.starts_with("# My GitHub Projects\n\n## new\n\n**2023**\n\nNew thing.\n\n`Rust`\n\n---\n\n"));
        assert!(report.contains("## old\n\n**2015**\n\nOld thing.\n\n"));
        assert!(report.find("## new").unwrap() < report.find("## old").unwrap());
    }

    #[test]
    fn description_is_first_sentence_capped() {
        assert_eq!(short_description(""), "");
        assert_eq!(short_description("No period here"), "No period here.");
        let long = "a".repeat(200);
        let short = short_description(&long);
        assert_eq!(short.chars().count(), 150);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn tag_budget_counts_all_languages() {
        let fw = frameworks(
            &["Python", "Shell", "Dockerfile", "Makefile"],
            &[("Python", &["flask", "requests", "numpy"]), ("JavaScript/Node.js", &["react"])],
        );
        assert_eq!(tags(&fw), vec!["`Python`", "`Shell`", "`Dockerfile`", "`flask`"]);

        let fw = frameworks(&["Go"], &[("Go", &["a", "b", "c"]), ("Ruby", &["d", "e"])]);
        assert_eq!(tags(&fw), vec!["`Go`", "`a`", "`b`", "`d`", "`e`"]);
    }
}
