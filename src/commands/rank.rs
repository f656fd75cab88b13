//! `repocard rank` command.

use std::fmt::Write as _;
use std::path::Path;

use crate::context::ServiceContext;
use crate::rank::{self, format_listing, split_projects, Project, Ranked};

/// Execute the `rank` command against `ctx`.
///
/// Without a usable language model the projects are listed unscored.
///
/// # Errors
///
/// Returns an error string if the report cannot be read.
pub async fn run_with_context(
    ctx: &ServiceContext,
    model: &str,
    file: &Path,
    top: usize,
    no_evaluate: bool,
) -> Result<(), String> {
    tracing::info!(file = %file.display(), "loading report");
    let markdown = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to load markdown file {}: {e}", file.display()))?;
    let projects = split_projects(&markdown);
    tracing::info!(count = projects.len(), "extracted projects");

    if !no_evaluate && !ctx.llm_enabled {
        tracing::warn!("no language model configured, listing projects without scores");
    }
    if no_evaluate || !ctx.llm_enabled {
        print!("{}", render_unscored(&projects));
        return Ok(());
    }

    let ranked = rank::rank(ctx.llm.as_ref(), model, &projects, top).await;
    print!("{}", render_ranked(&ranked));
    Ok(())
}

fn render_unscored(projects: &[Project]) -> String {
    let mut out = format!("\n--- My GitHub Projects ({}) ---\n\n", projects.len());
    for project in projects {
        let _ = write!(out, "{}\n\n", format_listing(project, None));
    }
    out
}

fn render_ranked(ranked: &[Ranked]) -> String {
    let mut out = format!("\n--- Top {} Most Impressive Projects ---\n\n", ranked.len());
    for entry in ranked {
        let _ = write!(out, "{}\n\n", format_listing(&entry.project, Some(entry)));
    }
    out
}
