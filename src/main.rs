//! zipcrack CLI: wordlist or brute-force attack on a zip archive.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use zipcrack::engine::arg_parser::Cli;
use zipcrack::engine::handle_run;

fn main() -> Result<ExitCode> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let code = handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(code)
}
