//! Binary entry point for skyview CLI

use anyhow::Result;
use clap::Parser;
use skyview_cli::{Cli, Main};

fn main() -> Result<()> {
    Cli::parse().main()
}
