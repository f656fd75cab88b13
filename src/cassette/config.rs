//! Per-port cassette configuration for replay.

use std::path::{Path, PathBuf};

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// File name of the source host cassette inside a session directory.
pub const HOST_CASSETTE: &str = "host.cassette.yaml";
/// File name of the LLM cassette inside a session directory.
pub const LLM_CASSETTE: &str = "llm.cassette.yaml";

/// Per-port cassette file paths. Ports without a cassette panic if called
/// during replay.
#[derive(Debug, Clone, Default)]
pub struct CassetteConfig {
    /// Path to the source host cassette file.
    pub host: Option<PathBuf>,
    /// Path to the LLM cassette file.
    pub llm: Option<PathBuf>,
}

/// Loaded per-port replayers.
#[derive(Debug)]
pub struct PortReplayers {
    /// Replayer for the source host port.
    pub host: Option<CassetteReplayer>,
    /// Replayer for the LLM port.
    pub llm: Option<CassetteReplayer>,
}

impl CassetteConfig {
    /// Picks up whichever per-port cassettes exist in a recording directory.
    #[must_use]
    pub fn from_dir(dir: &Path) -> Self {
        let existing = |name: &str| Some(dir.join(name)).filter(|p| p.exists());
        Self { host: existing(HOST_CASSETTE), llm: existing(LLM_CASSETTE) }
    }

    /// Load every configured cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn load_all(&self) -> Result<PortReplayers, String> {
        let load = |path: &PathBuf| Cassette::load(path).map(|c| CassetteReplayer::new(&c));
        Ok(PortReplayers {
            host: self.host.as_ref().map(load).transpose()?,
            llm: self.llm.as_ref().map(load).transpose()?,
        })
    }
}
