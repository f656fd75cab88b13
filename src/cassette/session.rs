//! Recording session managing per-port cassette recorders.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::config::{HOST_CASSETTE, LLM_CASSETTE};
use super::recorder::CassetteRecorder;

/// Owns one recorder per port; all cassettes land in one directory.
pub struct RecordingSession {
    /// Recorder for source host interactions.
    pub host: Arc<Mutex<CassetteRecorder>>,
    /// Recorder for LLM interactions.
    pub llm: Arc<Mutex<CassetteRecorder>>,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Create a session writing into `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn at(output_dir: &Path) -> Result<Self, String> {
        std::fs::create_dir_all(output_dir).map_err(|e| {
            format!("Failed to create cassette directory {}: {e}", output_dir.display())
        })?;

        let make_recorder = |file: &str, port: &str| {
            let recorder = CassetteRecorder::new(output_dir.join(file), format!("repocard-{port}"));
            Arc::new(Mutex::new(recorder))
        };

        Ok(Self {
            host: make_recorder(HOST_CASSETTE, "host"),
            llm: make_recorder(LLM_CASSETTE, "llm"),
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Write every non-empty cassette to disk.
    ///
    /// The recording adapters must have been dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if an adapter still holds a recorder or a file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        fn finish_one(arc: Arc<Mutex<CassetteRecorder>>, port: &str) -> Result<(), String> {
            let recorder = Arc::try_unwrap(arc)
                .map_err(|_| format!("Recording adapter for {port} still has references"))?
                .into_inner()
                .map_err(|e| format!("Recorder lock for {port} poisoned: {e}"))?;
            if recorder.is_empty() {
                return Ok(());
            }
            recorder.finish().map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
            Ok(())
        }

        finish_one(self.host, "host")?;
        finish_one(self.llm, "llm")?;
        Ok(self.output_dir)
    }
}
