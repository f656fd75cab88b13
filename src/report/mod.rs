//! Report assemblers for a batch of analyses.

pub mod json;
pub mod markdown;

use std::path::Path;

/// Writes a rendered report to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write(path: &Path, contents: &str) -> Result<(), String> {
    std::fs::write(path, contents)
        .map_err(|e| format!("Failed to write report {}: {e}", path.display()))?;
    tracing::info!(path = %path.display(), "report generated");
    Ok(())
}
