//! Service context bundling the port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::live::github::GitHubHost;
use crate::adapters::live::openai::OpenAiClient;
use crate::adapters::recording::{RecordingLlmClient, RecordingSourceHost};
use crate::adapters::replaying::{ReplayingLlmClient, ReplayingSourceHost};
use crate::cassette::config::CassetteConfig;
use crate::cassette::session::RecordingSession;
use crate::config::Settings;
use crate::ports::llm::{CompletionFuture, CompletionRequest, LlmClient};
use crate::ports::source_host::SourceHost;

/// Bundles the port trait objects into a single context.
///
/// Constructors wire up different adapter implementations (live,
/// recording, replaying).
pub struct ServiceContext {
    /// Repository source host.
    pub host: Box<dyn SourceHost>,
    /// Generative text service.
    pub llm: Box<dyn LlmClient>,
    /// Whether `llm` can actually answer. When `false` summaries use the
    /// deterministic fallback and ranking skips evaluation.
    pub llm_enabled: bool,
}

impl ServiceContext {
    /// Creates a live context talking to GitHub and OpenAI.
    ///
    /// Without an API key the LLM port answers every request with an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured GitHub API URL is invalid.
    pub fn live(settings: &Settings) -> Result<Self, String> {
        let token = settings.github_token.clone().unwrap_or_default();
        let host = GitHubHost::new(&settings.github_api_url, token)?;
        let (llm, llm_enabled): (Box<dyn LlmClient>, bool) = match &settings.openai_api_key {
            Some(key) => (Box::new(OpenAiClient::new(&settings.openai_base_url, key.clone())), true),
            None => (Box::new(DisabledLlmClient), false),
        };
        Ok(Self { host: Box::new(host), llm, llm_enabled })
    }

    /// Creates a recording context around the live adapters.
    ///
    /// Every port interaction is captured; call
    /// [`RecordingSession::finish`] after dropping the context.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be built or the
    /// directory cannot be created.
    pub fn recording_at(
        dir: &Path,
        settings: &Settings,
    ) -> Result<(Self, RecordingSession), String> {
        let live = Self::live(settings)?;
        let session = RecordingSession::at(dir)?;
        let ctx = Self {
            host: Box::new(RecordingSourceHost::new(live.host, Arc::clone(&session.host))),
            llm: Box::new(RecordingLlmClient::new(live.llm, Arc::clone(&session.llm))),
            llm_enabled: live.llm_enabled,
        };
        Ok((ctx, session))
    }

    /// Creates a replaying context from the cassettes in a recording directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a cassette file cannot be read or parsed.
    pub fn replaying(dir: &Path) -> Result<Self, String> {
        Self::replaying_from(&CassetteConfig::from_dir(dir))
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// Ports without a configured cassette panic with a clear message when
    /// called. The LLM counts as enabled only if it has a cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig) -> Result<Self, String> {
        let replayers = config.load_all()?;
        let shared = |r| Arc::new(Mutex::new(r));

        let host = match replayers.host {
            Some(r) => ReplayingSourceHost::new(shared(r)),
            None => ReplayingSourceHost::unconfigured(),
        };
        let llm_enabled = replayers.llm.is_some();
        let llm = match replayers.llm {
            Some(r) => ReplayingLlmClient::new(shared(r)),
            None => ReplayingLlmClient::unconfigured(),
        };
        Ok(Self { host: Box::new(host), llm: Box::new(llm), llm_enabled })
    }
}

/// Stands in for the LLM when no API key is configured.
struct DisabledLlmClient;

impl LlmClient for DisabledLlmClient {
    fn complete(&self, _request: &CompletionRequest) -> CompletionFuture<'_> {
        let err: Box<dyn std::error::Error + Send + Sync> = "OPENAI_API_KEY is not set".into();
        Box::pin(async move { Err(err) })
    }
}
