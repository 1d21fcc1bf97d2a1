use anyhow::Result;
use clap::Parser;
use env_logger::init;
use fontvault_cli::cli::Cli;

fn main() -> Result<()> {
    init();
    Cli::parse().run()
}
