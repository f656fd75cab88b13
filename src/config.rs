//! Runtime settings read from the environment.

use crate::adapters::live::github::GITHUB_API_URL;
use crate::adapters::live::openai::OPENAI_BASE_URL;

/// Model used when `REPOCARD_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Credentials and endpoints for the live adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `GITHUB_TOKEN`.
    pub github_token: Option<String>,
    /// `GITHUB_API_URL`.
    pub github_api_url: String,
    /// `OPENAI_API_KEY`. Without it summaries come from the fallback.
    pub openai_api_key: Option<String>,
    /// `OPENAI_BASE_URL`.
    pub openai_base_url: String,
    /// `REPOCARD_MODEL`.
    pub model: String,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// `.env.local` and then `.env` are loaded first if present; variables
    /// already set in the environment win.
    #[must_use]
    pub fn from_env() -> Self {
        for file in [".env.local", ".env"] {
            if dotenvy::from_filename(file).is_ok() {
                tracing::debug!(file, "loaded environment file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            github_token: var("GITHUB_TOKEN"),
            github_api_url: var("GITHUB_API_URL").unwrap_or_else(|| GITHUB_API_URL.to_string()),
            openai_api_key: var("OPENAI_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            model: var("REPOCARD_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Returns the GitHub token.
    ///
    /// # Errors
    ///
    /// Returns an error if `GITHUB_TOKEN` is not set.
    pub fn require_github_token(&self) -> Result<&str, String> {
        self.github_token
            .as_deref()
            .ok_or_else(|| "GITHUB_TOKEN is not set; add it to the environment or .env".to_string())
    }
}
