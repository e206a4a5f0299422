//! Pure formatting functions for UI output.
//!
//! `format_*` functions build the text, `display_*` functions print it.
//! Styling goes through `console`, which drops colors when the stream is not a terminal.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::domain::Version;
use crate::github::PublishedRelease;
use crate::rewriter::PendingRewrite;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Summary of the versions involved in a release.
pub fn format_versions(latest_tag: &str, current: &Version, release: &Version) -> String {
    format!(
        "{}\n  Last tag:        {}\n  Current version: {}\n  Release:         {}",
        style("Versions:").bold(),
        style(latest_tag).dim(),
        current,
        style(release).green()
    )
}

pub fn display_versions(latest_tag: &str, current: &Version, release: &Version) {
    println!("\n{}\n", format_versions(latest_tag, current, release));
}

/// Numbered list of the steps a release would take.
pub fn format_plan(steps: &[String]) -> String {
    let mut text = style("Release plan (dry run):").bold().to_string();
    for (i, step) in steps.iter().enumerate() {
        text.push_str(&format!("\n  {}. {}", i + 1, step));
    }
    text
}

pub fn display_plan(steps: &[String]) {
    println!("\n{}\n", format_plan(steps));
}

/// One line per rewritten file.
pub fn format_rewrites(rewrites: &[PendingRewrite], version: &Version) -> String {
    rewrites
        .iter()
        .map(|rewrite| {
            let state = if rewrite.changes_file() {
                style("updated").green()
            } else {
                style("unchanged").dim()
            };
            format!(
                "  {} → {} ({})",
                rewrite.relative_path.display(),
                version,
                state
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn display_rewrites(rewrites: &[PendingRewrite], version: &Version) {
    if !rewrites.is_empty() {
        println!("{}", format_rewrites(rewrites, version));
    }
}

/// Display the published release and its assets.
pub fn display_published(release: &PublishedRelease) {
    display_success(&format!("Published release {}", style(&release.html_url).cyan()));
    for url in &release.uploaded {
        println!("  {}", url);
    }
}
