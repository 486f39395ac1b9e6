use clap::Parser;

use git_autotag::cli::{self, orchestration, FixedStepCli};
use git_autotag::domain::Step;

fn main() {
    let cli = FixedStepCli::parse();
    cli::init_tracing(cli.common.verbose);

    std::process::exit(orchestration::execute(&cli.common, Some(Step::Patch)));
}
