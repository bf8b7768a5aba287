//! Engine module: archive capability, charsets, CLI handling and reporting

pub mod archive;
pub mod arg_parser;
pub mod charset;
pub mod cli;
pub mod handlers;
pub mod progress;
pub mod report;

// Re-export commonly used functions
pub use archive::{
    ArchiveOpener, CheckOutcome, PasswordCheck, ZipHandle, ZipOpener, read_failure_outcome,
};
pub use arg_parser::{Cli, Commands, CommonArgs};
pub use charset::{PRESET_NAMES, combination_count, estimate_count, preset, resolve_charset};
pub use cli::{RunSettings, handle_run};
pub use report::group_thousands;
