//! zipcrack: multi-threaded zip password recovery.
//!
//! A producer thread streams candidates (wordlist lines or brute-force strings) into a bounded
//! queue; a pool of workers, each with its own archive handle, tries them until one opens the
//! archive or the candidates run out. The first success wins and everything else is cancelled.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::{CrackError, ErrorKind};
pub use pipeline::{CandidateSource, Cracker, StopHandle};
pub use types::*;

use std::path::Path;

use engine::archive::ZipOpener;

/// Result alias used by the public zipcrack API.
pub type Result<T> = std::result::Result<T, CrackError>;

fn opts_for(threads: Option<usize>, buffer_size: usize) -> CrackOpts {
    CrackOpts {
        threads,
        buffer_size,
        ..CrackOpts::default()
    }
}

/// Try every non-blank line of `wordlist_path` against the zip at `archive_path`; extract into
/// `extract_path` on success. `threads: None` uses all available cores.
///
/// For cancellation or progress reporting, build a [`Cracker`] instead and keep its [`StopHandle`].
pub fn run_wordlist_attack(
    archive_path: &Path,
    extract_path: &Path,
    wordlist_path: &Path,
    threads: Option<usize>,
    buffer_size: usize,
) -> CrackResult {
    Cracker::new(ZipOpener::new(archive_path), opts_for(threads, buffer_size))
        .extract_to(extract_path)
        .crack(&AttackPlan::Wordlist(wordlist_path.to_path_buf()))
}

/// Try every string of length 1..=`max_length` over `charset` (preset name or literal alphabet).
pub fn run_bruteforce_attack(
    archive_path: &Path,
    extract_path: &Path,
    max_length: usize,
    charset: &str,
    threads: Option<usize>,
    buffer_size: usize,
) -> CrackResult {
    Cracker::new(ZipOpener::new(archive_path), opts_for(threads, buffer_size))
        .extract_to(extract_path)
        .crack(&AttackPlan::Bruteforce {
            max_length,
            charset: charset.to_string(),
        })
}

/// Exact number of candidates [`run_bruteforce_attack`] would try.
///
/// ```
/// assert_eq!(zipcrack::estimate_combinations(3, "ab").unwrap(), 14);
/// ```
pub fn estimate_combinations(max_length: usize, charset: &str) -> Result<u128> {
    engine::charset::estimate_count(max_length, charset)
}
