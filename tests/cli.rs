//! Integration tests for top-level CLI behavior.

use std::process::Command;

fn repocard(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_repocard"));
    // Run outside the crate so a developer's .env is not picked up.
    cmd.args(args)
        .current_dir(std::env::temp_dir())
        .env_remove("REPOCARD_RECORD")
        .env_remove("REPOCARD_REPLAY")
        .env_remove("GITHUB_TOKEN")
        .env_remove("OPENAI_API_KEY");
    cmd
}

fn run_repocard(args: &[&str]) -> std::process::Output {
    repocard(args).output().expect("failed to run repocard binary")
}

#[test]
fn help_lists_subcommands() {
    let output = run_repocard(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("rank"));
}

#[test]
fn analyze_help_shows_flags() {
    let output = run_repocard(&["analyze", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    for flag in ["--limit", "--no-llm", "--org", "--repos", "--format", "--output"] {
        assert!(stdout.contains(flag), "missing {flag}");
    }
}

#[test]
fn analyze_without_token_fails_before_any_request() {
    let output = run_repocard(&["analyze", "--no-llm"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("GITHUB_TOKEN"));
}

#[test]
fn unknown_subcommand_fails() {
    let output = run_repocard(&["unknown"]);
    assert!(!output.status.success());
}

#[test]
fn rank_without_evaluation_lists_projects() {
    let dir = std::env::temp_dir().join("repocard_cli_rank_test");
    std::fs::create_dir_all(&dir).unwrap();
    let report = dir.join("report.md");
    std::fs::write(
        &report,
        "# My GitHub Projects\n\n## tool\n\n**2022**\n\nA tool.\n\n`Rust` `serde`\n\n---\n\n\
         ## site\n\n**2019**\n\nA site.\n\n`HTML`\n\n---\n\n",
    )
    .unwrap();

    let output = run_repocard(&["rank", "--no-evaluate", "--file", report.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("--- My GitHub Projects (2) ---"));
    assert!(stdout.contains("tool (2022)"));
    assert!(stdout.contains("Tags: Rust serde"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rank_missing_file_fails() {
    let output = run_repocard(&["rank", "--file", "/nonexistent/report.md"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("Failed to load markdown file"));
}
