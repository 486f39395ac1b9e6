//! Glue between the command line and the tagging workflow
//!
//! Opens the repository, resolves configuration, runs (or plans) the
//! workflow, prints the outcome and turns it into an exit code.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::exit_codes;
use super::CommonArgs;
use crate::config::{load_config, WorkflowConfig};
use crate::domain::Step;
use crate::error::AutotagError;
use crate::git::Git2Repository;
use crate::ui;
use crate::workflow::TagWorkflow;

/// Run one invocation and return the process exit code.
///
/// `step` is the step implied by the command line, if any; otherwise the
/// configured step is used.
pub fn execute(args: &CommonArgs, step: Option<Step>) -> i32 {
    let (repo, config) = match prepare(args) {
        Ok(prepared) => prepared,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            return exit_code_for(&e);
        }
    };

    let step = step.unwrap_or(config.step);
    let workflow = TagWorkflow::new(&config, &repo);

    if args.dry_run {
        return match workflow.plan(step) {
            Ok(plan) => {
                ui::display_plan(
                    &plan,
                    config.pull_before_tagging,
                    config.push_after_tagging,
                    config.post_tag_action.as_deref(),
                );
                exit_codes::SUCCESS
            }
            Err(failure) => {
                ui::display_failure(&failure);
                exit_codes::for_kind(failure.kind())
            }
        };
    }

    if config.pull_before_tagging {
        ui::display_status(&format!("Pulling from {}...", config.remote_name));
    }

    match workflow.run(step) {
        Ok(report) => {
            ui::display_report(&report, &config.remote_name);
            if report.is_complete() {
                exit_codes::SUCCESS
            } else {
                exit_codes::POST_ACTION_ERROR
            }
        }
        Err(failure) => {
            ui::display_failure(&failure);
            exit_codes::for_kind(failure.kind())
        }
    }
}

fn prepare(args: &CommonArgs) -> Result<(Git2Repository, WorkflowConfig)> {
    let repo = open_repository(args.repo.as_deref())?;
    let config = load_config(repo.git2(), args.config.as_deref(), args.config_overrides())
        .context("Cannot load configuration")?;
    Ok((repo, config))
}

fn open_repository(path: Option<&Path>) -> Result<Git2Repository> {
    let repo = match path {
        Some(path) => Git2Repository::open(path)?,
        None => {
            let cwd = std::env::current_dir().context("Cannot determine current directory")?;
            Git2Repository::discover(cwd)?
        }
    };
    debug!(workdir = ?repo.workdir(), "opened repository");
    Ok(repo)
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<AutotagError>() {
        Some(e) => exit_codes::for_kind(e.kind()),
        None => exit_codes::ERROR,
    }
}
