//! Human-readable and JSON result reports.

use colored::Colorize;
use std::path::Path;

use crate::{CrackResult, RunStatus};

const RULE_WIDTH: usize = 60;

/// Format an integer with thousands separators.
pub fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Print the result block to stdout.
pub fn print_result(result: &CrackResult, extract_path: &Path) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{rule}");
    if result.success {
        let ok = "[✓]".green().bold();
        println!("{ok} SUCCESS!");
        if let Some(ref pw) = result.password {
            println!("{ok} Password: {}", pw.bold());
        }
        if let Some(id) = result.worker_id {
            println!("{ok} Found by worker: {id}");
        }
        println!("{ok} Time: {:.2} seconds", result.elapsed.as_secs_f64());
        println!("{ok} Attempts: {}", group_thousands(result.attempts.into()));
        if result.elapsed.as_secs_f64() > 0.0 {
            println!("{ok} Speed: {:.0} attempts/sec", result.rate_per_second());
        }
        match (&result.extracted_to, &result.error) {
            (Some(dir), _) => {
                let shown = dir.canonicalize().unwrap_or_else(|_| dir.clone());
                println!("{ok} Extracted to: {}", shown.display());
            }
            (None, Some(err)) => println!("{} {}", "[!]".yellow().bold(), err),
            (None, None) => println!("{ok} Extract path: {}", extract_path.display()),
        }
    } else {
        let bad = "[✗]".red().bold();
        let label = match result.status {
            RunStatus::Cancelled => "CANCELLED",
            RunStatus::TimedOut => "TIMED OUT",
            RunStatus::Exhausted => "PASSWORD NOT FOUND",
            _ => "FAILED",
        };
        println!("{bad} {label}");
        if let Some(ref err) = result.error {
            println!("{bad} Error: {err}");
        }
        if result.attempts > 0 {
            println!("{bad} Attempts: {}", group_thousands(result.attempts.into()));
            println!("{bad} Time: {:.2} seconds", result.elapsed.as_secs_f64());
        }
    }
    println!("{rule}");
}

/// Print the result as one JSON object.
pub fn print_result_json(result: &CrackResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
