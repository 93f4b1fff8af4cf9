//! `opt` command-line tool for planning OPT filing deadlines.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
