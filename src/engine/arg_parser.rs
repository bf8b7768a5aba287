use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::charset::PRESET_NAMES;

/// Multi-threaded zip password recovery.
#[derive(Clone, Parser)]
#[command(name = "zipcrack")]
#[command(about = "Recover a zip password from a wordlist or by brute force.")]
#[command(after_help = after_help())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

fn after_help() -> String {
    format!(
        "Examples:\n  zipcrack wordlist archive.zip passwords.txt -t 8\n  zipcrack bruteforce archive.zip 4 -C alphanum\n  zipcrack generate 3 list.txt -C lower\n\nCharset presets: {}. Any other value is used as a literal alphabet.",
        PRESET_NAMES.join(", ")
    )
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Try every non-blank line of a wordlist file.
    Wordlist {
        /// Zip archive to crack.
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,
        /// Wordlist file, one candidate per line.
        #[arg(value_name = "WORDLIST")]
        wordlist: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Try every string over a charset up to a maximum length.
    Bruteforce {
        /// Zip archive to crack.
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,
        /// Maximum password length.
        #[arg(value_name = "LENGTH")]
        length: usize,
        /// Character set: preset name or literal characters. Default: MiniASCII.
        #[arg(long, short = 'C')]
        charset: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Write every brute-force candidate to a wordlist file.
    Generate {
        /// Maximum password length.
        #[arg(value_name = "LENGTH")]
        length: usize,
        /// Output wordlist file.
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
        /// Character set: preset name or literal characters. Default: MiniASCII.
        #[arg(long, short = 'C')]
        charset: Option<String>,
        /// Do not ask for confirmation on large outputs.
        #[arg(long, short = 'y')]
        yes: bool,
        /// Verbose output.
        #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
        verbose: Option<bool>,
    },
    /// Print how many candidates brute force would try.
    Estimate {
        /// Maximum password length.
        #[arg(value_name = "LENGTH")]
        length: usize,
        /// Character set: preset name or literal characters. Default: MiniASCII.
        #[arg(long, short = 'C')]
        charset: Option<String>,
    },
}

/// Flags shared by the attack subcommands.
#[derive(Clone, Args)]
pub struct CommonArgs {
    /// Extraction directory, created if missing. Default: current directory.
    #[arg(long = "extract-path", short = 'e')]
    pub extract_path: Option<PathBuf>,

    /// Number of worker threads. Default: all available cores.
    #[arg(long, short = 't')]
    pub threads: Option<usize>,

    /// Producer batch size; the candidate queue holds twice this many. Default: 1000.
    #[arg(long, short = 'b')]
    pub buffer: Option<usize>,

    /// Give up after this many seconds. Default: 24 hours.
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,

    /// Quiet mode: warnings only, no progress bar, no confirmation prompt.
    #[arg(long, short = 'q', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub quiet: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Do not ask for confirmation on very large brute-force runs.
    #[arg(long, short = 'y')]
    pub yes: bool,
}
