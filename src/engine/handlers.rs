//! Command handlers for the attack, generate and estimate subcommands

use anyhow::{Context, Result};
use log::{info, warn};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use crate::engine::archive::ZipOpener;
use crate::engine::charset::{estimate_count, resolve_charset};
use crate::engine::cli::RunSettings;
use crate::engine::progress::{create_attack_bar, finish_bar, progress_callback, refresh_bar};
use crate::engine::report::{group_thousands, print_result, print_result_json};
use crate::error::CrackError;
use crate::pipeline::{CandidateSource, Cracker};
use crate::utils::config::CombinationThresholds;
use crate::utils::write_wordlist;
use crate::AttackPlan;

/// Handle wordlist command
pub fn handle_wordlist(archive: &Path, wordlist: &Path, settings: &RunSettings) -> Result<ExitCode> {
    let plan = AttackPlan::Wordlist(wordlist.to_path_buf());
    run_attack(archive, &plan, None, settings)
}

/// Handle bruteforce command. Large search spaces are confirmed first unless quiet or --yes.
pub fn handle_bruteforce(archive: &Path, length: usize, settings: &RunSettings) -> Result<ExitCode> {
    // Invalid length/charset is left to the run, which reports it as a failed result.
    let total = match describe_bruteforce(length, &settings.charset) {
        Ok(total) => Some(total),
        Err(CrackError::Overflow) => {
            warn!("Combination count does not fit in 128 bits");
            None
        }
        Err(_) => None,
    };
    if let Some(total) = total
        && !confirm_large_run(total, settings)?
    {
        info!("Cancelled");
        return Ok(ExitCode::SUCCESS);
    }
    let plan = AttackPlan::Bruteforce {
        max_length: length,
        charset: settings.charset.clone(),
    };
    run_attack(archive, &plan, total, settings)
}

/// Handle generate command: write every brute-force candidate to `output`.
pub fn handle_generate(length: usize, output: &Path, settings: &RunSettings) -> Result<ExitCode> {
    let total = describe_bruteforce(length, &settings.charset)?;
    if !confirm_large_run(total, settings)? {
        info!("Cancelled");
        return Ok(ExitCode::SUCCESS);
    }
    let source = CandidateSource::from_bruteforce(length, &settings.charset)?;
    let written = write_wordlist(output, source)?;
    info!(
        "Saved {} passwords to {}",
        group_thousands(written as u128),
        output.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Handle estimate command: print the exact combination count.
pub fn handle_estimate(length: usize, settings: &RunSettings) -> Result<ExitCode> {
    let total = estimate_count(length, &settings.charset)?;
    println!("{}", group_thousands(total));
    Ok(ExitCode::SUCCESS)
}

/// Log charset details and return the combination count.
fn describe_bruteforce(length: usize, charset: &str) -> Result<u128, CrackError> {
    let alphabet = resolve_charset(charset)?;
    let total = estimate_count(length, charset)?;
    info!("Using character set: {}", alphabet.iter().collect::<String>());
    info!("Character count: {}", alphabet.len());
    info!("Max password length: {}", length);
    info!("Total combinations: {}", group_thousands(total));
    Ok(total)
}

/// Warn above [`CombinationThresholds::WARN`]; above [`CombinationThresholds::CONFIRM`] ask on stdin.
/// Returns false when the user declines.
fn confirm_large_run(total: u128, settings: &RunSettings) -> Result<bool> {
    if !settings.interactive() {
        return Ok(true);
    }
    if total > CombinationThresholds::WARN {
        warn!("Over {} combinations!", group_thousands(CombinationThresholds::WARN));
    }
    if total <= CombinationThresholds::CONFIRM || settings.assume_yes {
        return Ok(true);
    }
    eprint!("[?] Continue? (y/N): ");
    std::io::stderr().flush().context("flush prompt")?;
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("read confirmation")?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Run one attack against `archive` with progress, Ctrl+C handling and a printed report.
fn run_attack(
    archive: &Path,
    plan: &AttackPlan,
    total: Option<u128>,
    settings: &RunSettings,
) -> Result<ExitCode> {
    std::fs::create_dir_all(&settings.extract_path).with_context(|| {
        format!(
            "create extraction directory {}",
            settings.extract_path.display()
        )
    })?;

    let mut cracker = Cracker::new(ZipOpener::new(archive), settings.opts.clone())
        .extract_to(&settings.extract_path);
    info!("Using {} threads", cracker.opts().worker_count());
    info!(
        "Target: {}",
        archive
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| archive.to_string_lossy())
    );

    let bar = settings.interactive().then(|| create_attack_bar(total));
    if let Some(ref b) = bar {
        refresh_bar(b);
        cracker = cracker.on_progress(progress_callback(b));
    }

    let stop = cracker.stop_handle();
    ctrlc::set_handler(move || stop.stop()).context("set Ctrl+C handler")?;

    let result = cracker.crack(plan);
    if let Some(ref b) = bar {
        finish_bar(b);
    }
    if settings.json {
        print_result_json(&result)?;
    } else {
        print_result(&result, &settings.extract_path);
    }
    Ok(ExitCode::from(result.status.exit_code()))
}
