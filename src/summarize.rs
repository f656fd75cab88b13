//! Repository summarization with a deterministic local fallback.
//!
//! The remote tier asks a language model to describe the repository. Any
//! failure there (transport, service error, empty or malformed output) is
//! absorbed and the fallback tier synthesizes a summary from the profile.

use std::fmt::Write as _;

use serde::{Deserialize, Deserializer, Serialize};

use crate::analyze::RepositoryProfile;
use crate::ports::llm::{CompletionRequest, LlmClient};

/// Samples per extension embedded in the prompt.
pub const PROMPT_SAMPLES_PER_EXTENSION: usize = 1;
/// Structure overview entries embedded in the prompt.
pub const PROMPT_STRUCTURE_ENTRIES: usize = 30;
/// README characters embedded in the prompt.
pub const PROMPT_README_CHARS: usize = 1000;
/// Characters kept from the README's first line in the fallback.
pub const EXCERPT_CHARS: usize = 100;

const SYSTEM_PROMPT: &str =
    "You are a helpful technical documentation writer with expertise in code analysis.";
const NO_LANGUAGES: &str = "no languages detected";
const NO_FRAMEWORKS: &str = "no specific frameworks detected";
const NO_README: &str = "no README available";
const NONE_DETECTED: &str = "none detected";

/// Whether to try the remote service before falling back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummarizationMode {
    /// Call the language model, falling back on any failure.
    #[default]
    Remote,
    /// Never call the language model.
    FallbackOnly,
}

/// Shape of the produced summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryFormat {
    /// Free-form prose.
    #[default]
    Text,
    /// A single [`StructuredSummary`] JSON object.
    Json,
}

/// Machine-readable description of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredSummary {
    /// Repository name.
    pub name: String,
    /// Creation year.
    #[serde(deserialize_with = "string_or_number")]
    pub year: String,
    /// What the project is for.
    pub purpose: String,
    /// Languages, frameworks and libraries.
    pub technologies: Vec<String>,
    /// Notable features.
    pub features: Vec<String>,
    /// How the code is organized.
    pub architecture: String,
    /// Rough complexity rating.
    pub complexity: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// Two-tier summarizer over an [`LlmClient`].
pub struct Summarizer<'a> {
    llm: &'a dyn LlmClient,
    model: String,
    mode: SummarizationMode,
    format: SummaryFormat,
}

impl<'a> Summarizer<'a> {
    /// Creates a summarizer that uses `model` on `llm` unless `mode` is fallback-only.
    pub fn new(
        llm: &'a dyn LlmClient,
        model: impl Into<String>,
        mode: SummarizationMode,
        format: SummaryFormat,
    ) -> Self {
        Self { llm, model: model.into(), mode, format }
    }

    /// The configured output format.
    #[must_use]
    pub fn format(&self) -> SummaryFormat {
        self.format
    }

    /// Produces a summary; never fails.
    pub async fn summarize(&self, profile: &RepositoryProfile) -> String {
        if self.mode == SummarizationMode::FallbackOnly {
            return fallback_summary(profile, self.format);
        }
        match self.remote_summary(profile).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(repo = %profile.name, error = %e, "LLM summary failed, using fallback");
                fallback_summary(profile, self.format)
            }
        }
    }

    async fn remote_summary(&self, profile: &RepositoryProfile) -> Result<String, String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: Some(SYSTEM_PROMPT.to_string()),
            prompt: build_prompt(profile, self.format),
            max_tokens: match self.format {
                SummaryFormat::Text => 500,
                SummaryFormat::Json => 800,
            },
            temperature: 0.7,
            json_mode: self.format == SummaryFormat::Json,
        };

        let response = self.llm.complete(&request).await.map_err(|e| e.to_string())?;
        let text = response.text.trim();
        if text.is_empty() {
            return Err("empty completion".into());
        }
        if self.format == SummaryFormat::Json {
            let value: serde_json::Value =
                serde_json::from_str(text).map_err(|e| format!("malformed JSON summary: {e}"))?;
            if !value.is_object() {
                return Err("JSON summary is not an object".into());
            }
            serde_json::from_value::<StructuredSummary>(value)
                .map_err(|e| format!("JSON summary has the wrong shape: {e}"))?;
        }
        Ok(text.to_string())
    }
}

/// Builds the bounded prompt describing `profile`.
#[must_use]
pub fn build_prompt(profile: &RepositoryProfile, format: SummaryFormat) -> String {
    let frameworks = &profile.frameworks;
    let code = &profile.code_analysis;
    let listing = frameworks.listing();

    let mut prompt = String::new();
    prompt.push_str(
        "You are a technical documentation assistant. Given the following repository details, \
         generate a concise and informative summary:\n\n",
    );
    let _ = writeln!(prompt, "Repository Name: {}", profile.name);
    let _ = writeln!(prompt, "Created On: {}", profile.created_at.format("%Y-%m-%d"));
    let _ = writeln!(prompt, "Languages: {}", join_or(&frameworks.languages, NO_LANGUAGES));
    let _ = writeln!(prompt, "Frameworks and Libraries:\n{}\n", lines_or(&listing, NO_FRAMEWORKS));

    prompt.push_str("Code Analysis:\n");
    let _ = writeln!(prompt, "- Total Files: {}", code.total_files);
    let _ = writeln!(prompt, "- Total Lines of Code: {}", code.total_lines);
    let _ = writeln!(
        prompt,
        "- Main File Types: {}\n",
        join_or(&code.main_file_type_labels(), NONE_DETECTED)
    );

    prompt.push_str("File Structure Overview:\n");
    for entry in code.structure_overview.iter().take(PROMPT_STRUCTURE_ENTRIES) {
        let _ = writeln!(prompt, "{entry}");
    }

    for (ext, samples) in &code.code_samples {
        for sample in samples.iter().take(PROMPT_SAMPLES_PER_EXTENSION) {
            let _ =
                write!(prompt, "\nSample {ext} code from {}:\n```\n{}\n```\n", sample.path, sample.text);
        }
    }

    let readme = profile
        .readme
        .as_deref()
        .map_or_else(|| NO_README.to_string(), |r| r.chars().take(PROMPT_README_CHARS).collect());
    let _ = write!(prompt, "\nREADME Excerpt:\n{readme}\n\n");

    match format {
        SummaryFormat::Text => prompt.push_str(
            "Provide a clear, well-structured summary highlighting:\n\
             1. The repository's purpose and main functionality\n\
             2. Key technologies and programming languages used\n\
             3. Code organization and architecture\n\
             4. Notable features or patterns observed in the code\n\
             5. Any other relevant insights from the code analysis\n",
        ),
        SummaryFormat::Json => prompt.push_str(
            "Respond with a single JSON object (no markdown fences) with these keys:\n\
             {\n  \
               \"name\": \"<repository name>\",\n  \
               \"year\": \"<creation year>\",\n  \
               \"purpose\": \"<one or two sentences>\",\n  \
               \"technologies\": [\"<language or library>\", ...],\n  \
               \"features\": [\"<notable feature>\", ...],\n  \
               \"architecture\": \"<how the code is organized>\",\n  \
               \"complexity\": \"Low\" | \"Medium\" | \"High\"\n\
             }\n",
        ),
    }

    prompt
}

/// Deterministic summary built from the profile alone.
///
/// Pure and total: missing parts render as explicit placeholders.
#[must_use]
pub fn fallback_summary(profile: &RepositoryProfile, format: SummaryFormat) -> String {
    match format {
        SummaryFormat::Text => fallback_text(profile),
        SummaryFormat::Json => serde_json::to_string_pretty(&fallback_structured(profile))
            .unwrap_or_else(|_| fallback_text(profile)),
    }
}

fn fallback_text(profile: &RepositoryProfile) -> String {
    let code = &profile.code_analysis;
    let mut summary = format!(
        "This repository is named '{}' and was created on {}. ",
        profile.name,
        profile.created_at.format("%Y-%m-%d")
    );
    let _ = write!(
        summary,
        "It primarily uses {}. ",
        join_or(&profile.frameworks.languages, NO_LANGUAGES)
    );
    let _ = write!(
        summary,
        "Frameworks and libraries: {}. ",
        join_or(&profile.frameworks.listing(), NO_FRAMEWORKS)
    );
    let _ = write!(
        summary,
        "The codebase consists of {} files with approximately {} lines of code. ",
        code.total_files, code.total_lines
    );
    let _ = write!(
        summary,
        "The main file types are {}. ",
        join_or(&code.main_file_type_labels(), NONE_DETECTED)
    );
    let _ = write!(
        summary,
        "README excerpt: {}",
        readme_excerpt(profile.readme.as_deref()).unwrap_or_else(|| NO_README.to_string())
    );
    summary
}

/// Structured fallback used for the JSON format and for unparseable summaries.
#[must_use]
pub fn fallback_structured(profile: &RepositoryProfile) -> StructuredSummary {
    let code = &profile.code_analysis;

    let mut technologies = profile.frameworks.languages.clone();
    for ecosystem in &profile.frameworks.ecosystems {
        if !technologies.contains(&ecosystem.label) {
            technologies.push(ecosystem.label.clone());
        }
    }
    if technologies.is_empty() {
        technologies.push(NO_LANGUAGES.to_string());
    }

    let mut features = profile.frameworks.listing();
    if features.is_empty() {
        features.push(NO_FRAMEWORKS.to_string());
    }

    StructuredSummary {
        name: profile.name.clone(),
        year: profile.created_at.format("%Y").to_string(),
        purpose: readme_excerpt(profile.readme.as_deref()).unwrap_or_else(|| NO_README.to_string()),
        technologies,
        features,
        architecture: format!(
            "{} files with approximately {} lines of code; main file types: {}",
            code.total_files,
            code.total_lines,
            join_or(&code.main_file_type_labels(), NONE_DETECTED)
        ),
        complexity: complexity(code.total_lines).to_string(),
    }
}

fn complexity(total_lines: usize) -> &'static str {
    match total_lines {
        0..=999 => "Low",
        1_000..=9_999 => "Medium",
        _ => "High",
    }
}

/// First non-blank README line, cut to [`EXCERPT_CHARS`] with `...` appended.
#[must_use]
pub fn readme_excerpt(readme: Option<&str>) -> Option<String> {
    let line = readme?.lines().find(|line| !line.trim().is_empty())?;
    if line.chars().count() > EXCERPT_CHARS {
        Some(format!("{}...", line.chars().take(EXCERPT_CHARS).collect::<String>()))
    } else {
        Some(line.to_string())
    }
}

fn join_or(items: &[String], placeholder: &str) -> String {
    if items.is_empty() {
        placeholder.to_string()
    } else {
        items.join(", ")
    }
}

fn lines_or(items: &[String], placeholder: &str) -> String {
    if items.is_empty() {
        placeholder.to_string()
    } else {
        items.join("\n")
    }
}
