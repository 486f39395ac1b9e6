use clap::Parser;

use git_autotag::cli::{self, orchestration, Cli};

fn main() {
    let cli = Cli::parse();
    cli::init_tracing(cli.common.verbose);

    let code = orchestration::execute(&cli.common, cli.requested_step());
    std::process::exit(code);
}
