//! Ranking the projects of a generated markdown report.

use std::sync::LazyLock;

use regex::Regex;

use crate::ports::llm::{CompletionRequest, LlmClient};

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(\d{4})\*\*").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));
static SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Score:\s*(\d+(?:\.\d+)?)").expect("valid regex"));

const SYSTEM_PROMPT: &str = "You are an expert project evaluator.";

/// One project card read back from a report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Project {
    /// Heading text.
    pub name: String,
    /// Four-digit year, if the card had one.
    pub year: Option<String>,
    /// First non-empty line after the year.
    pub description: Option<String>,
    /// Backticked tags.
    pub tags: Vec<String>,
}

/// A project with its evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    /// The evaluated project.
    pub project: Project,
    /// Score from 0 to 10; 0 when the evaluation had none.
    pub score: f64,
    /// Explanation given with the score.
    pub reason: String,
}

/// Splits a markdown report into its project cards.
///
/// Each `## ` heading starts a project. The first `**YYYY**` line sets
/// the year, the next non-empty line the description, and later lines
/// with backticks the tags.
#[must_use]
pub fn split_projects(markdown: &str) -> Vec<Project> {
    let mut projects = Vec::new();
    let mut current: Option<Project> = None;

    for line in markdown.split('\n') {
        if let Some(name) = line.strip_prefix("## ") {
            projects.extend(current.take());
            current = Some(Project { name: name.trim().to_string(), ..Project::default() });
            continue;
        }
        let Some(project) = current.as_mut() else {
            continue;
        };
        if line.starts_with("**") && project.year.is_none() {
            if let Some(caps) = YEAR.captures(line) {
                project.year = Some(caps[1].to_string());
            }
        } else if !line.is_empty() && project.year.is_some() && project.description.is_none() {
            project.description = Some(line.trim().to_string());
        } else if line.contains('`') && project.description.is_some() {
            project.tags = TAG.captures_iter(line).map(|c| c[1].to_string()).collect();
        }
    }
    projects.extend(current);
    projects
}

/// Builds the evaluation prompt for one project.
#[must_use]
pub fn evaluation_prompt(project: &Project) -> String {
    format!(
        "You are an expert project evaluator. Assess the following GitHub project and rate how \
         impressive it is on a scale of 1 (not impressive) to 10 (extremely impressive), \
         considering technical complexity, uniqueness, and potential impact.\n\n\
         After the rating, briefly explain why you gave that score in 2-3 sentences.\n\n\
         Project Name: {}\nYear: {}\nDescription: {}\nTechnologies: {}\n\n\
         Respond in the following format:\nScore: <number>\nReason: <your explanation>\n",
        project.name,
        project.year.as_deref().unwrap_or("None"),
        project.description.as_deref().unwrap_or("None"),
        project.tags.join(", "),
    )
}

/// Extracts the numeric score, or 0 when the text has none.
#[must_use]
pub fn extract_score(evaluation: &str) -> f64 {
    SCORE
        .captures(evaluation)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0.0)
}

/// Text following the first `Reason:` marker, trimmed.
#[must_use]
pub fn extract_reason(evaluation: &str) -> String {
    evaluation
        .split_once("Reason:")
        .map(|(_, rest)| rest.split("Reason:").next().unwrap_or_default().trim().to_string())
        .unwrap_or_default()
}

/// Asks `llm` to score one project.
///
/// A service failure scores 0 and carries the error as its reason.
pub async fn evaluate(llm: &dyn LlmClient, model: &str, project: &Project) -> Ranked {
    let request = CompletionRequest {
        model: model.to_string(),
        system: Some(SYSTEM_PROMPT.to_string()),
        prompt: evaluation_prompt(project),
        max_tokens: 300,
        temperature: 0.7,
        json_mode: false,
    };
    let evaluation = match llm.complete(&request).await {
        Ok(response) => response.text.trim().to_string(),
        Err(e) => {
            tracing::error!(project = %project.name, error = %e, "evaluation failed");
            return Ranked {
                project: project.clone(),
                score: 0.0,
                reason: format!("Error evaluating project: {e}"),
            };
        }
    };
    Ranked {
        project: project.clone(),
        score: extract_score(&evaluation),
        reason: extract_reason(&evaluation),
    }
}

/// Evaluates every project and returns the best `top`, highest score first.
///
/// Equal scores keep report order.
pub async fn rank(llm: &dyn LlmClient, model: &str, projects: &[Project], top: usize) -> Vec<Ranked> {
    let mut results = Vec::with_capacity(projects.len());
    for (index, project) in projects.iter().enumerate() {
        tracing::info!(project = %project.name, index = index + 1, "evaluating project");
        results.push(evaluate(llm, model, project).await);
    }
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top);
    results
}

/// Plain-text listing of one project, optionally with its evaluation.
#[must_use]
pub fn format_listing(project: &Project, evaluation: Option<&Ranked>) -> String {
    let mut lines = vec![match &project.year {
        Some(year) => format!("{} ({year})", project.name),
        None => project.name.clone(),
    }];
    if let Some(description) = &project.description {
        lines.push(format!("  {description}"));
    }
    if !project.tags.is_empty() {
        lines.push(format!("  Tags: {}", project.tags.join(" ")));
    }
    if let Some(ranked) = evaluation {
        lines.push(format!("  Score: {}/10", ranked.score));
        if !ranked.reason.is_empty() {
            lines.push(format!("  Reason: {}", ranked.reason));
        }
    }
    lines.join("\n")
}
