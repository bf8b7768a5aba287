//! Candidate sources: one streaming iterator type for wordlist files, brute-force generation and in-memory lists.
//!
//! Every variant yields `Result<Candidate, CrackError>`; an `Err` item is a mid-stream read failure
//! after which the source is finished. Sources are `Send` so the producer thread can own them.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::engine::charset::{combination_count, resolve_charset};
use crate::error::CrackError;
use crate::{AttackPlan, Candidate};

/// Lazy, non-restartable sequence of candidates.
pub enum CandidateSource {
    Wordlist(WordlistReader),
    Bruteforce(BruteforceGenerator),
    List(std::vec::IntoIter<Candidate>),
}

impl CandidateSource {
    /// Open the source for `plan`. Fails before yielding anything if the file cannot be opened
    /// or the brute-force parameters are invalid.
    pub fn from_plan(plan: &AttackPlan) -> Result<Self, CrackError> {
        match plan {
            AttackPlan::Wordlist(path) => Self::from_wordlist_file(path),
            AttackPlan::Bruteforce {
                max_length,
                charset,
            } => Self::from_bruteforce(*max_length, charset),
        }
    }

    pub fn from_wordlist_file(path: &Path) -> Result<Self, CrackError> {
        WordlistReader::open(path).map(CandidateSource::Wordlist)
    }

    pub fn from_bruteforce(max_length: usize, charset: &str) -> Result<Self, CrackError> {
        BruteforceGenerator::new(max_length, charset).map(CandidateSource::Bruteforce)
    }

    /// In-memory candidates. Entries are trimmed and blank ones dropped, same as wordlist lines.
    pub fn from_list<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list: Vec<Candidate> = candidates
            .into_iter()
            .filter_map(|c| non_blank(c.as_ref()))
            .collect();
        CandidateSource::List(list.into_iter())
    }

    /// Total number of candidates when known up front (brute force and lists).
    pub fn total_hint(&self) -> Option<u128> {
        match self {
            CandidateSource::Wordlist(_) => None,
            CandidateSource::Bruteforce(g) => Some(g.total()),
            CandidateSource::List(it) => Some(it.len() as u128),
        }
    }
}

impl Iterator for CandidateSource {
    type Item = Result<Candidate, CrackError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            CandidateSource::Wordlist(r) => r.next(),
            CandidateSource::Bruteforce(g) => g.next().map(Ok),
            CandidateSource::List(it) => it.next().map(Ok),
        }
    }
}

fn non_blank(line: &str) -> Option<Candidate> {
    let trimmed = line.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Decode a raw line, dropping bytes that are not valid UTF-8. Valid characters, including an
/// encoded U+FFFD, are kept.
pub fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()),
    }
}

/// Read one line into `buf` (terminator excluded). `\n`, `\r\n` and a bare `\r` all end a line;
/// `\r\n` leaves an empty line behind, which callers skip as blank. False at end of input.
fn read_line_any_ending(reader: &mut impl BufRead, buf: &mut Vec<u8>) -> std::io::Result<bool> {
    loop {
        let available = match reader.fill_buf() {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            return Ok(!buf.is_empty());
        }
        match available.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(end) => {
                buf.extend_from_slice(&available[..end]);
                reader.consume(end + 1);
                return Ok(true);
            }
            None => {
                let n = available.len();
                buf.extend_from_slice(available);
                reader.consume(n);
            }
        }
    }
}

// ---- Wordlist ----

/// Reads a wordlist file line by line: any of `\n`, `\r\n`, `\r` ends a line; trimmed, blank lines
/// skipped, invalid bytes dropped.
pub struct WordlistReader {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
    done: bool,
}

impl WordlistReader {
    pub fn open(path: &Path) -> Result<Self, CrackError> {
        let file = File::open(path).map_err(|e| CrackError::from_io(path, e))?;
        if file.metadata().is_ok_and(|m| m.is_dir()) {
            return Err(CrackError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other("is a directory"),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            buf: Vec::with_capacity(64),
            done: false,
        })
    }
}

impl Iterator for WordlistReader {
    type Item = Result<Candidate, CrackError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match read_line_any_ending(&mut self.reader, &mut self.buf) {
                Ok(false) => self.done = true,
                Ok(true) => {
                    if let Some(candidate) = non_blank(&decode_line(&self.buf)) {
                        return Some(Ok(candidate));
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(CrackError::from_io(&self.path, e)));
                }
            }
        }
        None
    }
}

// ---- Brute force ----

/// Every string of length 1..=max_length over an alphabet: shorter first, then product order
/// (leftmost character varies slowest).
pub struct BruteforceGenerator {
    alphabet: Vec<char>,
    max_length: usize,
    /// Alphabet index per position of the next candidate; empty once exhausted.
    digits: Vec<usize>,
    total: u128,
}

impl BruteforceGenerator {
    pub fn new(max_length: usize, charset: &str) -> Result<Self, CrackError> {
        if max_length == 0 {
            return Err(CrackError::InvalidLength(max_length));
        }
        let alphabet = resolve_charset(charset)?;
        // Saturate: the total is only a hint for progress display.
        let total = combination_count(alphabet.len(), max_length).unwrap_or(u128::MAX);
        Ok(Self {
            alphabet,
            max_length,
            digits: vec![0],
            total,
        })
    }

    pub fn total(&self) -> u128 {
        self.total
    }

    /// Move `digits` to the next candidate, growing the length when all positions wrap.
    fn advance(&mut self) {
        let base = self.alphabet.len();
        for d in self.digits.iter_mut().rev() {
            *d += 1;
            if *d < base {
                return;
            }
            *d = 0;
        }
        let next_len = self.digits.len() + 1;
        if next_len > self.max_length {
            self.digits.clear();
        } else {
            self.digits = vec![0; next_len];
        }
    }
}

impl Iterator for BruteforceGenerator {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.digits.is_empty() {
            return None;
        }
        let candidate: String = self.digits.iter().map(|&i| self.alphabet[i]).collect();
        self.advance();
        Some(candidate)
    }
}
