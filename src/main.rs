use clap::Parser;
use tradedash::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
