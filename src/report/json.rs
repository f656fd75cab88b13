//! JSON report of structured summaries.

use chrono::Datelike;

use crate::analyze::RepoAnalysis;
use crate::summarize::{fallback_structured, StructuredSummary};

/// Default output file.
pub const DEFAULT_OUTPUT: &str = "github_repo_analysis.json";

/// Parses each analysis summary into a record.
///
/// A summary that is not a valid structured object is replaced by the
/// record the fallback would build from the profile. Empty `name` and
/// `year` fields are filled from the profile.
#[must_use]
pub fn records(analyses: &[RepoAnalysis]) -> Vec<StructuredSummary> {
    analyses
        .iter()
        .map(|analysis| {
            let profile = &analysis.profile;
            let mut record = match serde_json::from_str::<StructuredSummary>(&analysis.summary) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(repo = %profile.name, error = %e, "summary is not structured, using placeholder");
                    fallback_structured(profile)
                }
            };
            if record.name.is_empty() {
                record.name.clone_from(&profile.name);
            }
            if record.year.is_empty() {
                record.year = profile.created_at.year().to_string();
            }
            record
        })
        .collect()
}

/// Renders the records as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render(analyses: &[RepoAnalysis]) -> Result<String, String> {
    serde_json::to_string_pretty(&records(analyses))
        .map_err(|e| format!("Failed to serialize report: {e}"))
}
