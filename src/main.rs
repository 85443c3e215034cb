use clap::Parser;
use dirsort::cli::{Cli, Outcome, run};
use dirsort::logging;
use dirsort::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match run(&cli.command) {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::PartialFailure) => ExitCode::from(1),
        Err(e) => {
            OutputFormatter::error(&format!("{:#}", e));
            ExitCode::from(2)
        }
    }
}
