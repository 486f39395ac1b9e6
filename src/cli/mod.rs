//! Command line definition shared by all binaries

pub mod exit_codes;
pub mod orchestration;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::ConfigLayer;
use crate::domain::Step;

/// Create the next semantic-version tag from the existing ones
#[derive(Debug, Parser)]
#[command(name = "git-autotag", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Step requested on the command line; `None` means use the configured one
    pub fn requested_step(&self) -> Option<Step> {
        match &self.command {
            Some(Command::Major) => Some(Step::Major),
            Some(Command::Minor) => Some(Step::Minor),
            Some(Command::Patch) => Some(Step::Patch),
            Some(Command::Autotag { step }) => *step,
            None => None,
        }
    }
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Tag the next major version
    Major,
    /// Tag the next minor version
    Minor,
    /// Tag the next patch version
    Patch,
    /// Tag with an explicit or the configured step
    Autotag {
        #[arg(long, value_enum)]
        step: Option<Step>,
    },
}

/// Arguments for binaries whose step is fixed by their name (`git-major` etc.)
#[derive(Debug, Parser)]
#[command(version, about = "Create the next semantic-version tag")]
pub struct FixedStepCli {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct CommonArgs {
    /// Repository to tag (default: discovered from the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Literal tag message, replaces the message template
    #[arg(short, long, global = true)]
    pub message: Option<String>,

    /// Configuration file (default: .autotag.toml, then the user config dir)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Remote used for pull and push
    #[arg(long, global = true, value_name = "NAME")]
    pub remote: Option<String>,

    /// Pull from the remote before tagging
    #[arg(long, global = true, overrides_with = "no_pull")]
    pub pull: bool,

    /// Do not pull, even if configured to
    #[arg(long, global = true, overrides_with = "pull")]
    pub no_pull: bool,

    /// Push the new tag after tagging
    #[arg(long, global = true, overrides_with = "no_push")]
    pub push: bool,

    /// Do not push, even if configured to
    #[arg(long, global = true, overrides_with = "push")]
    pub no_push: bool,

    /// Command run after the tag was created; supports {tagname}, {version}, ...
    #[arg(long, global = true, value_name = "CMD")]
    pub post_tag_action: Option<String>,

    /// Show the tag that would be created without changing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CommonArgs {
    /// Highest precedence configuration layer. Unset flags leave lower layers alone.
    pub fn config_overrides(&self) -> ConfigLayer {
        ConfigLayer {
            posttagaction: self.post_tag_action.clone(),
            pull_before_tagging: switch(self.pull, self.no_pull),
            push_after_tagging: switch(self.push, self.no_push),
            remote_name: self.remote.clone(),
            message: self.message.clone(),
            ..Default::default()
        }
    }
}

fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Send logs to stderr. `RUST_LOG` wins over the verbosity flag.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_uses_configured_step() {
        let cli = Cli::try_parse_from(["git-autotag"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.requested_step(), None);
    }

    #[test]
    fn test_subcommands_select_step() {
        let cli = Cli::try_parse_from(["git-autotag", "major"]).unwrap();
        assert_eq!(cli.requested_step(), Some(Step::Major));

        let cli = Cli::try_parse_from(["git-autotag", "autotag", "--step", "patch"]).unwrap();
        assert_eq!(cli.requested_step(), Some(Step::Patch));

        let cli = Cli::try_parse_from(["git-autotag", "autotag"]).unwrap();
        assert_eq!(cli.requested_step(), None);
    }

    #[test]
    fn test_common_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "git-autotag",
            "patch",
            "--push",
            "--remote",
            "upstream",
            "-m",
            "Hotfix",
            "-vv",
        ])
        .unwrap();
        assert!(cli.common.push);
        assert_eq!(cli.common.remote.as_deref(), Some("upstream"));
        assert_eq!(cli.common.message.as_deref(), Some("Hotfix"));
        assert_eq!(cli.common.verbose, 2);
    }

    #[test]
    fn test_invalid_step_is_usage_error() {
        let err = Cli::try_parse_from(["git-autotag", "autotag", "--step", "build"]).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::USAGE);
    }

    #[test]
    fn test_config_overrides_leave_unset_flags_alone() {
        let args = CommonArgs {
            push: true,
            ..Default::default()
        };
        let layer = args.config_overrides();
        assert_eq!(layer.push_after_tagging, Some(true));
        assert_eq!(layer.pull_before_tagging, None);
        assert_eq!(layer.remote_name, None);
    }

    #[test]
    fn test_negated_flags_turn_config_off() {
        let cli = Cli::try_parse_from(["git-autotag", "minor", "--no-push", "--no-pull"]).unwrap();
        let layer = cli.common.config_overrides();
        assert_eq!(layer.push_after_tagging, Some(false));
        assert_eq!(layer.pull_before_tagging, Some(false));
    }

    #[test]
    fn test_last_of_push_and_no_push_wins() {
        let cli = Cli::try_parse_from(["git-autotag", "--push", "--no-push"]).unwrap();
        assert_eq!(cli.common.config_overrides().push_after_tagging, Some(false));

        let cli = Cli::try_parse_from(["git-autotag", "--no-push", "--push"]).unwrap();
        assert_eq!(cli.common.config_overrides().push_after_tagging, Some(true));
    }

    #[test]
    fn test_fixed_step_cli_rejects_subcommands() {
        assert!(FixedStepCli::try_parse_from(["git-major", "--dry-run"]).is_ok());
        assert!(FixedStepCli::try_parse_from(["git-major", "minor"]).is_err());
    }
}
