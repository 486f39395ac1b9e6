//! Pure formatting functions for UI output.
//!
//! Everything here returns strings so the wording can be tested; printing
//! happens in the parent module.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::domain::SemanticVersion;
use crate::error::FailureKind;
use crate::workflow::{PostActionFailure, TagPlan, WorkflowFailure, WorkflowReport};

fn version_or_none(version: Option<SemanticVersion>) -> String {
    match version {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}

pub fn format_error(message: &str) -> String {
    format!("{} {}", style("ERROR:").red().bold(), message)
}

pub fn format_success(message: &str) -> String {
    format!("{} {}", style("✓").green().bold(), message)
}

pub fn format_status(message: &str) -> String {
    format!("{} {}", style("→").yellow(), message)
}

pub fn format_warning(warning: &BoundaryWarning) -> String {
    format!("{} {}", style("⚠ WARNING:").yellow().bold(), warning)
}

/// Lines describing what a dry run would do.
pub fn format_plan(
    plan: &TagPlan,
    pull: bool,
    push: bool,
    post_tag_action: Option<&str>,
) -> Vec<String> {
    let mut lines = vec![
        format!("{}", style("Dry run, nothing was changed:").bold()),
        format!("  Previous version: {}", version_or_none(plan.previous)),
        format!(
            "  Next version:     {} ({})",
            style(plan.spec.version).green(),
            plan.step
        ),
        format!("  Tag name:         {}", style(&plan.spec.name).green()),
        format!("  Tag message:      {}", plan.spec.message),
    ];
    if pull {
        lines.push("  Would pull before tagging (plan uses local tags only)".to_string());
    }
    if let Some(command) = post_tag_action {
        lines.push(format!("  Would run:        {}", command));
    }
    if push {
        lines.push("  Would push the tag".to_string());
    }
    lines
}

/// Lines describing a run in which the tag was created.
pub fn format_report(report: &WorkflowReport, remote: &str) -> Vec<String> {
    let mut lines = Vec::new();
    match report.previous {
        Some(previous) => lines.push(format!(
            "  From: {}  To: {}",
            style(previous).red(),
            style(report.spec.version).green()
        )),
        None => lines.push(format!("  Initial version: {}", style(report.spec.version).green())),
    }
    lines.push(format!("  Message: {}", report.spec.message));

    if let Some(output) = &report.post_action {
        let trimmed = output.output.trim_end();
        if !trimmed.is_empty() {
            lines.push("  Post-tag command output:".to_string());
            lines.extend(trimmed.lines().map(|line| format!("    {}", line)));
        }
    }

    if report.pushed {
        lines.push(format!("  Pushed to {}", remote));
    }
    lines
}

pub fn format_post_action_failure(failure: &PostActionFailure) -> String {
    format!(
        "{}: post-tag command `{}` {}; tag '{}' was created but later steps were skipped",
        failure_kind_label(FailureKind::PostAction.name()),
        failure.command,
        failure.reason,
        failure.tag
    )
}

/// Lines describing a fatal failure: kind, stage and whatever was known.
pub fn format_failure(failure: &WorkflowFailure) -> Vec<String> {
    let mut lines = vec![format!(
        "{} during {}: {}",
        failure_kind_label(failure.kind().name()),
        failure.stage,
        failure.source
    )];
    lines.push(format!(
        "  Previous version: {}",
        version_or_none(failure.previous)
    ));
    if let Some(attempted) = &failure.attempted {
        lines.push(format!(
            "  Attempted tag:    {} ({})",
            attempted.name, attempted.version
        ));
    }
    if failure.tag_created() {
        if let Some(attempted) = &failure.attempted {
            lines.push(format!(
                "  Tag '{}' exists locally; push it manually with: git push <remote> {}",
                attempted.name, attempted.name
            ));
        }
    }
    lines
}

fn failure_kind_label(kind: &str) -> String {
    style(kind).red().bold().to_string()
}
