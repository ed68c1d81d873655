//! `reqdoc` turns a structure table and a requirement table into a validated
//! `AsciiDoc` requirements document.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
