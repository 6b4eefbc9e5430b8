//! Provides the main entry point to the program.
use anyhow::Result;

fn main() -> Result<()> {
    baseload_sim::cli::run_cli()
}
