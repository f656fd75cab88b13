//! Command dispatch and handlers.

pub mod analyze;
pub mod rank;

use std::env;
use std::path::PathBuf;

use crate::cassette::session::RecordingSession;
use crate::cli::Command;
use crate::config::Settings;
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler.
///
/// When `REPOCARD_REPLAY` is set to a directory, ports are served from the
/// cassettes in it. Otherwise, when `REPOCARD_RECORD` is set, live
/// interactions are recorded to per-port cassettes in that directory.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let settings = Settings::from_env();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;

    if let Ok(dir) = env::var("REPOCARD_REPLAY") {
        let ctx = ServiceContext::replaying(&PathBuf::from(dir))?;
        return runtime.block_on(dispatch_with_context(command, &ctx, &settings));
    }

    if matches!(command, Command::Analyze { .. }) {
        settings.require_github_token()?;
    }

    let (ctx, session) = if let Ok(dir) = env::var("REPOCARD_RECORD") {
        let (ctx, session) = ServiceContext::recording_at(&PathBuf::from(dir), &settings)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&settings)?, None)
    };

    let result = runtime.block_on(dispatch_with_context(command, &ctx, &settings));

    // Finish recording after command completes (even on error)
    if let Some(session) = session {
        // Drop context first to release Arc references
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

/// Dispatch a command with the given service context.
async fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    settings: &Settings,
) -> Result<(), String> {
    match command {
        Command::Analyze { limit, no_llm, org, repos, format, output } => {
            let options = analyze::Options {
                limit: *limit,
                no_llm: *no_llm,
                org: org.clone(),
                repos: repos.as_deref().map(crate::select::parse_names).unwrap_or_default(),
                format: *format,
                output: output.clone(),
            };
            analyze::run_with_context(ctx, &settings.model, &options).await
        }
        Command::Rank { file, top, no_evaluate } => {
            rank::run_with_context(ctx, &settings.model, file, *top, *no_evaluate).await
        }
    }
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}
