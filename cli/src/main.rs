use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let args = notewell_lib::cli::Args::parse();
    notewell_lib::run(args)
}
