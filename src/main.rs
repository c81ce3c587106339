//! relaypipe CLI: run integers through concurrent stages; Ctrl+C or a timeout cancels the chain.

use anyhow::Result;
use clap::Parser;
use relaypipe::engine::Cli;
use relaypipe::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    // Lets RUST_LOG live in a local .env.
    let _ = dotenvy::dotenv();
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
