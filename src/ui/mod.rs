//! User interface module.
//!
//! - `formatter` - pure string formatting
//! - this module - printing to stdout/stderr
//!
//! Results go to stdout, problems to stderr.

pub mod formatter;

use crate::boundary::BoundaryWarning;
use crate::workflow::{TagPlan, WorkflowFailure, WorkflowReport};

pub use formatter::{
    format_error, format_failure, format_plan, format_post_action_failure, format_report,
    format_status, format_success, format_warning,
};

pub fn display_error(message: &str) {
    eprintln!("{}", format_error(message));
}

pub fn display_success(message: &str) {
    println!("{}", format_success(message));
}

pub fn display_status(message: &str) {
    println!("{}", format_status(message));
}

pub fn display_warning(warning: &BoundaryWarning) {
    eprintln!("{}", format_warning(warning));
}

/// Print the outcome of a dry run
pub fn display_plan(plan: &TagPlan, pull: bool, push: bool, post_tag_action: Option<&str>) {
    for warning in &plan.warnings {
        display_warning(warning);
    }
    for line in format_plan(plan, pull, push, post_tag_action) {
        println!("{}", line);
    }
}

/// Print a run that created a tag, including a failed post-tag command.
pub fn display_report(report: &WorkflowReport, remote: &str) {
    for warning in &report.warnings {
        display_warning(warning);
    }
    display_success(&format!("Created tag {}", report.spec.name));
    for line in format_report(report, remote) {
        println!("{}", line);
    }
    if let Some(failure) = &report.post_action_failure {
        eprintln!("{}", format_post_action_failure(failure));
    }
}

pub fn display_failure(failure: &WorkflowFailure) {
    for line in format_failure(failure) {
        eprintln!("{}", line);
    }
}
