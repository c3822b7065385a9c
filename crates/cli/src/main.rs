use std::process::ExitCode;

use clap::Parser;

mod commands;
mod printer;

use commands::{Cli, Command};
use dirbase_runtime::logging;

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Baseline(args) => commands::baseline::run(args),
        Command::Diff(args) => commands::diff::run(args),
        Command::Info(args) => commands::info::run(args),
    }
}
