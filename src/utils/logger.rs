use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Initialise logging once for the CLI. Verbose shows debug lines tagged with the emitting thread
/// (`producer`, `worker-N`); quiet keeps warnings and errors only.
pub fn setup_logging(verbose: bool, quiet: bool) {
    let level = match (verbose, quiet) {
        (true, _) => LevelFilter::Debug,
        (false, true) => LevelFilter::Warn,
        _ => LevelFilter::Info,
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // dependencies: warnings only
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(move |buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            let tag = match record.level() {
                Level::Error => Some("ERROR".red()),
                Level::Warn => Some("WARN".yellow()),
                Level::Debug | Level::Trace => Some("DEBUG".dimmed()),
                Level::Info => None,
            };
            let thread = std::thread::current();
            let line = match (tag, verbose) {
                (Some(tag), true) => format!(
                    "[{} {} {}] {}",
                    name,
                    tag,
                    thread.name().unwrap_or("main").white(),
                    record.args()
                ),
                (Some(tag), false) => format!(
                    "[{} {} {}] {}",
                    name,
                    tag,
                    record.target().white(),
                    record.args()
                ),
                (None, _) => format!("[{}] {}", name, record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
